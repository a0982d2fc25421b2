use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use toon_codec::{
    from_str, ordered_fields, to_string, toon_enum, toon_record, toon_scalar, Decoded, Error,
    Node, Record, RecordInfo, ScalarKind, Toon, TypeInfo,
};

toon_record! {
    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct Empty {}
}

toon_record! {
    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct Animal {
        #[toon(order = 0)]
        pub name: String,
        #[toon(order = 9, comment = "legs")]
        pub legs: u8,
    }
}

toon_record! {
    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct Pet extends Animal as animal {
        #[toon(order = 1)]
        pub owner: String,
    }
}

toon_record! {
    /// A pet with a say in how many legs it reports.
    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct Dog extends Pet as pet {
        #[toon(order = 20, comment = "as claimed")]
        pub legs: u8,
        #[toon(order = 1)]
        pub breed: Option<String>,
    }
}

toon_record! {
    #[derive(Debug, Default, Clone, PartialEq)]
    struct Trailing {
        #[toon(order = 1)]
        a: i32,
        #[toon(order = 2)]
        b: i32,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Color {
    DeepRed,
    Blue,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
enum Size {
    S,
    M,
}

toon_enum!(Color, Size);

#[derive(Debug, Clone, PartialEq)]
struct Celsius(f64);

impl fmt::Display for Celsius {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}C", self.0)
    }
}

impl FromStr for Celsius {
    type Err = std::num::ParseFloatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim_end_matches('C').parse().map(Celsius)
    }
}

toon_scalar!(Celsius, from_str);

#[derive(Debug, Clone, PartialEq)]
struct Handle(u32);
toon_scalar!(Handle);

fn names<T: Record>() -> Vec<&'static str> {
    ordered_fields(&RecordInfo::of::<T>())
        .iter()
        .map(|f| f.name)
        .collect()
}

#[test]
fn test_empty_record() {
    assert!(names::<Empty>().is_empty());
    assert_eq!(to_string("e", &Empty {}).unwrap(), "e{}: ");
    assert_eq!(from_str::<Empty>("e{}: ").unwrap(), Some(Empty {}));

    let many = vec![Empty {}, Empty {}];
    let toon = to_string("es", &many).unwrap();
    assert_eq!(toon, "es(2){}: \n  ;\n  ;");
    assert_eq!(from_str::<Vec<Empty>>(&toon).unwrap(), Some(many));
}

#[test]
fn test_inherited_fields_follow_order() {
    assert_eq!(names::<Pet>(), vec!["name", "owner", "legs"]);
}

#[test]
fn test_shadowing_keeps_nearest_declaration() {
    assert_eq!(names::<Dog>(), vec!["name", "breed", "owner", "legs"]);
    let fields = ordered_fields(&RecordInfo::of::<Dog>());
    let legs = fields.iter().find(|f| f.name == "legs").unwrap();
    assert_eq!(legs.order, 20);
    assert_eq!(legs.comment, "as claimed");
}

#[test]
fn test_three_level_round_trip() {
    let dog = Dog {
        pet: Pet {
            animal: Animal {
                name: "Rex".into(),
                legs: 4,
            },
            owner: "Sam".into(),
        },
        legs: 3,
        breed: Some("Beagle".into()),
    };
    let toon = to_string("dog", &dog).unwrap();
    assert_eq!(
        toon,
        "dog{name,breed,owner,legs#as claimed}: \n  name: Rex\n  breed: Beagle\n  owner: Sam\n  legs: 3"
    );

    // the shadowed ancestor field is not written and keeps its value on decode
    let back: Dog = from_str(&toon).unwrap().unwrap();
    assert_eq!(back.legs, 3);
    assert_eq!(back.pet.animal.legs, 0);
    assert_eq!(back.pet.animal.name, "Rex");
    assert_eq!(back.pet.owner, "Sam");
}

#[test]
fn test_field_access_through_record_trait() {
    let mut pet = Pet::default();
    pet.set_field("name", Decoded::Scalar(Box::new("Tom".to_string())))
        .unwrap();
    assert_eq!(pet.animal.name, "Tom");
    assert!(matches!(pet.field("legs"), Some(Node::Scalar(..))));
    assert!(matches!(
        pet.set_field("wings", Decoded::Null),
        Err(Error::Reflection { .. })
    ));
    assert_eq!(pet.record_info().type_id(), std::any::TypeId::of::<Pet>());
}

#[test]
fn test_trailing_comma_and_private_fields() {
    let value = Trailing { a: 1, b: 2 };
    let toon = to_string("t", &value).unwrap();
    assert_eq!(from_str::<Trailing>(&toon).unwrap(), Some(value));
}

#[test]
fn test_enum_macro_accepts_several_types() {
    assert_eq!(to_string("c", &Color::DeepRed).unwrap(), "c: deep_red");
    assert_eq!(from_str::<Color>("c: blue").unwrap(), Some(Color::Blue));
    assert_eq!(to_string("s", &vec![Size::S, Size::M]).unwrap(), "s(2){}: \n  S;\n  M;");

    let err = from_str::<Color>("c: Purple").unwrap_err();
    assert!(matches!(err, Error::TypeConvert { ref value, .. } if value == "Purple"));

    match Color::type_info() {
        TypeInfo::Scalar(info) => assert!(matches!(info.kind(), ScalarKind::Enum { .. })),
        other => panic!("expected scalar, got {:?}", other),
    }
}

#[test]
fn test_scalar_macro_with_from_str() {
    let readings = vec![Celsius(21.5), Celsius(-3.0)];
    let toon = to_string("temps", &readings).unwrap();
    assert_eq!(toon, "temps(2){}: \n  21.5C;\n  -3C;");
    assert_eq!(from_str::<Vec<Celsius>>(&toon).unwrap(), Some(readings));
}

#[test]
fn test_scalar_macro_without_text_form() {
    match Handle::type_info() {
        TypeInfo::Scalar(info) => {
            assert!(info.is::<Handle>());
            assert!(matches!(info.kind(), ScalarKind::Opaque));
        }
        other => panic!("expected scalar, got {:?}", other),
    }
    assert!(matches!(
        to_string("h", &Handle(1)).unwrap_err(),
        Error::Reflection { .. }
    ));
}
