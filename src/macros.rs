//! Declarative helpers that implement [`Record`](crate::Record) and
//! [`Toon`](crate::Toon) for user types.
//!
//! - [`toon_record!`] defines a struct and describes its fields
//! - [`toon_enum!`] makes a serde unit enum a scalar named by its variants
//! - [`toon_scalar!`] makes any other type a scalar, either through a
//!   registered converter or through `Display`/`FromStr`

/// Defines a struct that encodes as a TOON record.
///
/// Every field carries `#[toon(order = N)]` or
/// `#[toon(order = N, comment = "...")]`. Fields are written in ascending
/// `order`, ties in declaration order. The struct must implement `Default`,
/// which serves as the zero-argument constructor for decoding.
///
/// `extends Parent as field` adds a `field: Parent` member whose record
/// fields are inherited: they are listed, read and written as if declared
/// here, and a field declared here shadows an inherited one of the same name.
///
/// # Examples
///
/// ```rust
/// use toon_codec::{from_str, to_string, toon_record};
///
/// toon_record! {
///     #[derive(Debug, Default, PartialEq)]
///     pub struct Entity {
///         #[toon(order = 0, comment = "primary key")]
///         pub id: u64,
///     }
/// }
///
/// toon_record! {
///     #[derive(Debug, Default, PartialEq)]
///     pub struct Tag extends Entity as entity {
///         #[toon(order = 1)]
///         pub label: String,
///     }
/// }
///
/// let tag = Tag { entity: Entity { id: 9 }, label: "rust".into() };
/// let text = to_string("tag", &tag).unwrap();
/// assert_eq!(text, "tag{id#primary key,label}: \n  id: 9\n  label: rust");
/// assert_eq!(from_str::<Tag>(&text).unwrap(), Some(tag));
/// ```
#[macro_export]
macro_rules! toon_record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident $(extends $base_ty:ty as $base:ident)? {
            $(
                #[toon(order = $order:expr $(, comment = $comment:expr)?)]
                $fvis:vis $field:ident : $fty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $($vis $base: $base_ty,)?
            $($fvis $field: $fty,)*
        }

        impl $crate::Record for $name {
            fn declared_fields() -> ::std::vec::Vec<$crate::FieldDescriptor> {
                ::std::vec![
                    $(
                        $crate::FieldDescriptor::new(
                            ::std::stringify!($field),
                            $order,
                            <$fty as $crate::Toon>::type_info,
                        )$(.with_comment($comment))?,
                    )*
                ]
            }

            $(
                fn parent() -> ::std::option::Option<$crate::RecordInfo> {
                    ::std::option::Option::Some($crate::RecordInfo::of::<$base_ty>())
                }
            )?

            fn construct() -> ::std::option::Option<Self> {
                ::std::option::Option::Some(<Self as ::std::default::Default>::default())
            }

            fn record_info(&self) -> $crate::RecordInfo {
                $crate::RecordInfo::of::<Self>()
            }

            #[allow(unreachable_code, unused_variables)]
            fn field(&self, name: &str) -> ::std::option::Option<$crate::Node<'_>> {
                $(
                    if name == ::std::stringify!($field) {
                        return ::std::option::Option::Some($crate::Toon::to_node(&self.$field));
                    }
                )*
                $(return $crate::Record::field(&self.$base, name);)?
                ::std::option::Option::None
            }

            #[allow(unreachable_code, unused_variables)]
            fn set_field(&mut self, name: &str, value: $crate::Decoded) -> $crate::Result<()> {
                $(
                    if name == ::std::stringify!($field) {
                        self.$field = $crate::Toon::from_decoded(value)
                            .map_err(|e| e.in_field(::std::stringify!($field)))?;
                        return ::std::result::Result::Ok(());
                    }
                )*
                $(return $crate::Record::set_field(&mut self.$base, name, value);)?
                ::std::result::Result::Err($crate::Error::reflection(
                    ::std::any::type_name::<Self>(),
                    ::std::format!("no field named `{}`", name),
                ))
            }

            fn into_any(self: ::std::boxed::Box<Self>) -> ::std::boxed::Box<dyn ::std::any::Any> {
                self
            }
        }

        impl $crate::Toon for $name {
            fn type_info() -> $crate::TypeInfo {
                $crate::TypeInfo::Record($crate::RecordInfo::of::<Self>())
            }

            fn to_node(&self) -> $crate::Node<'_> {
                $crate::Node::Record(self)
            }

            fn from_decoded(value: $crate::Decoded) -> $crate::Result<Self> {
                value.into_record::<Self>()
            }
        }
    };
}

/// Makes a unit-only enum a TOON scalar written as its serde variant name.
///
/// The enum must implement `Serialize` and `Deserialize`.
///
/// # Examples
///
/// ```rust
/// use serde::{Deserialize, Serialize};
/// use toon_codec::{from_str, to_string, toon_enum};
///
/// #[derive(Debug, PartialEq, Serialize, Deserialize)]
/// enum Status {
///     Active,
///     #[serde(rename = "OFF")]
///     Inactive,
/// }
/// toon_enum!(Status);
///
/// assert_eq!(to_string("status", &Status::Inactive).unwrap(), "status: OFF");
/// assert_eq!(from_str::<Status>("status: Active").unwrap(), Some(Status::Active));
/// ```
#[macro_export]
macro_rules! toon_enum {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Toon for $ty {
                fn type_info() -> $crate::TypeInfo {
                    $crate::TypeInfo::Scalar($crate::ScalarInfo::enumeration::<Self>())
                }

                fn to_node(&self) -> $crate::Node<'_> {
                    $crate::Node::Scalar(self, $crate::ScalarInfo::enumeration::<Self>())
                }

                fn from_decoded(value: $crate::Decoded) -> $crate::Result<Self> {
                    value.into_scalar::<Self>()
                }
            }
        )+
    };
}

/// Makes a type a TOON scalar.
///
/// `toon_scalar!(T)` requires a converter for `T` to be registered on the
/// serializer and deserializer. `toon_scalar!(T, from_str)` uses `T`'s
/// `Display` and `FromStr` impls when no converter claims it.
///
/// # Examples
///
/// ```rust
/// use toon_codec::{from_str, to_string, toon_scalar};
/// use std::fmt;
/// use std::str::FromStr;
///
/// #[derive(Debug, PartialEq)]
/// struct Cents(i64);
///
/// impl fmt::Display for Cents {
///     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
///         write!(f, "{}c", self.0)
///     }
/// }
///
/// impl FromStr for Cents {
///     type Err = std::num::ParseIntError;
///     fn from_str(s: &str) -> Result<Self, Self::Err> {
///         s.trim_end_matches('c').parse().map(Cents)
///     }
/// }
///
/// toon_scalar!(Cents, from_str);
///
/// assert_eq!(to_string("price", &Cents(250)).unwrap(), "price: 250c");
/// assert_eq!(from_str::<Cents>("price: 250c").unwrap(), Some(Cents(250)));
/// ```
#[macro_export]
macro_rules! toon_scalar {
    (@impl $ty:ty, $ctor:ident) => {
        impl $crate::Toon for $ty {
            fn type_info() -> $crate::TypeInfo {
                $crate::TypeInfo::Scalar($crate::ScalarInfo::$ctor::<Self>())
            }

            fn to_node(&self) -> $crate::Node<'_> {
                $crate::Node::Scalar(self, $crate::ScalarInfo::$ctor::<Self>())
            }

            fn from_decoded(value: $crate::Decoded) -> $crate::Result<Self> {
                value.into_scalar::<Self>()
            }
        }
    };
    ($ty:ty, from_str) => {
        $crate::toon_scalar!(@impl $ty, primitive);
    };
    ($ty:ty) => {
        $crate::toon_scalar!(@impl $ty, opaque);
    };
}

#[cfg(test)]
mod tests {
    use crate::{Decoded, Error, Node, Record, RecordInfo, Toon, TypeInfo};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    enum Mood {
        Calm,
        Busy,
    }
    toon_enum!(Mood);

    toon_record! {
        #[derive(Debug, Default, Clone, PartialEq)]
        pub struct Base {
            #[toon(order = 1, comment = "who")]
            pub owner: String,
        }
    }

    toon_record! {
        #[derive(Debug, Default, Clone, PartialEq)]
        pub struct Task extends Base as base {
            #[toon(order = 0)]
            pub title: String,
            #[toon(order = 2)]
            pub mood: Option<Mood>,
        }
    }

    #[test]
    fn test_record_reads_own_and_inherited_fields() {
        let task = Task {
            base: Base {
                owner: "kim".into(),
            },
            title: "write".into(),
            mood: None,
        };
        assert!(matches!(task.field("owner"), Some(Node::Scalar(..))));
        assert!(matches!(task.field("mood"), Some(Node::Null)));
        assert!(task.field("base").is_none());
        assert!(task.field("missing").is_none());
    }

    #[test]
    fn test_record_writes_inherited_fields() {
        let mut task = Task::default();
        task.set_field("owner", Decoded::Scalar(Box::new("lee".to_string())))
            .unwrap();
        task.set_field("mood", Decoded::Scalar(Box::new(Mood::Busy)))
            .unwrap();
        assert_eq!(task.base.owner, "lee");
        assert_eq!(task.mood, Some(Mood::Busy));
    }

    #[test]
    fn test_set_field_errors() {
        let mut task = Task::default();
        let err = task.set_field("nope", Decoded::Null).unwrap_err();
        assert!(matches!(err, Error::Reflection { .. }));

        let err = task.set_field("title", Decoded::Null).unwrap_err();
        assert!(matches!(err, Error::TypeConvert { ref field, .. } if field == "title"));
    }

    #[test]
    fn test_record_type_info_and_parent() {
        assert!(matches!(Task::type_info(), TypeInfo::Record(_)));
        let parent = RecordInfo::of::<Task>().parent().unwrap();
        assert_eq!(parent.type_id(), std::any::TypeId::of::<Base>());
        assert!(RecordInfo::of::<Base>().parent().is_none());
    }

    #[test]
    fn test_enum_scalar_info() {
        match Mood::type_info() {
            TypeInfo::Scalar(info) => assert!(info.is::<Mood>()),
            _ => panic!("expected scalar"),
        }
        assert_eq!(
            Mood::from_decoded(Decoded::Scalar(Box::new(Mood::Calm))).unwrap(),
            Mood::Calm
        );
    }
}
