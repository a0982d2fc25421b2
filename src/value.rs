//! Type descriptors and value views shared by the encoder and decoder.
//!
//! Every type that can appear in TOON text implements [`Toon`], which gives
//! three things:
//!
//! - a [`TypeInfo`] describing its declared shape (scalar, record, or
//!   collection) so the decoder knows what to build before it has a value;
//! - a borrowed [`Node`] view the encoder walks;
//! - reconstruction from the [`Decoded`] value the parser produced.
//!
//! Implementations are provided for the std primitives, `String`, `Option`,
//! `Box`, the common collections, chrono date-times and `BigInt`. Records use
//! [`toon_record!`](crate::toon_record); enumerations use
//! [`toon_enum!`](crate::toon_enum).
//!
//! ## Examples
//!
//! ```rust
//! use toon_codec::{Toon, TypeInfo, CollectionKind};
//! use std::collections::HashSet;
//!
//! match <HashSet<u32> as Toon>::type_info() {
//!     TypeInfo::Collection(info) => {
//!         assert_eq!(info.kind(), CollectionKind::Set);
//!         assert!(matches!(info.element(), TypeInfo::Scalar(_)));
//!     }
//!     _ => unreachable!(),
//! }
//!
//! // Option is transparent: it only adds the possibility of null.
//! assert!(matches!(<Option<String> as Toon>::type_info(), TypeInfo::Scalar(_)));
//! ```

use crate::reflect::{Record, RecordInfo};
use crate::variant::VariantNameSerializer;
use crate::{Error, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use num_bigint::BigInt;
use serde::de::value::{Error as ValueError, StrDeserializer};
use serde::de::{DeserializeOwned, IntoDeserializer};
use serde::Serialize;
use std::any::{type_name, Any, TypeId};
use std::collections::{BTreeSet, HashSet, VecDeque};
use std::fmt::{self, Display};
use std::hash::Hash;
use std::str::FromStr;

/// The declared shape of a type.
#[derive(Clone, Copy, Debug)]
pub enum TypeInfo {
    Scalar(ScalarInfo),
    Record(RecordInfo),
    Collection(CollectionInfo),
}

impl TypeInfo {
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            TypeInfo::Scalar(info) => info.type_name,
            TypeInfo::Record(info) => info.type_name(),
            TypeInfo::Collection(info) => info.type_name,
        }
    }

    pub(crate) fn shape(&self) -> &'static str {
        match self {
            TypeInfo::Scalar(_) => "scalar",
            TypeInfo::Record(_) => "record",
            TypeInfo::Collection(_) => "collection",
        }
    }
}

/// How a scalar type turns into text and back.
#[derive(Clone, Copy)]
pub enum ScalarKind {
    /// Built-in handling through `Display` and `FromStr`.
    Primitive {
        display: fn(&dyn Any) -> Option<String>,
        parse: fn(&str) -> Option<Box<dyn Any>>,
    },
    /// A unit-only enumeration named through serde.
    Enum {
        name_of: fn(&dyn Any) -> Option<String>,
        from_name: fn(&str) -> Option<Box<dyn Any>>,
    },
    /// No built-in text form; a converter must be registered.
    Opaque,
}

/// Descriptor of a leaf type.
#[derive(Clone, Copy)]
pub struct ScalarInfo {
    type_id: TypeId,
    type_name: &'static str,
    kind: ScalarKind,
}

impl ScalarInfo {
    pub fn primitive<T: FromStr + Display + Any>() -> Self {
        ScalarInfo {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            kind: ScalarKind::Primitive {
                display: display_any::<T>,
                parse: parse_any::<T>,
            },
        }
    }

    pub fn enumeration<T: Serialize + DeserializeOwned + Any>() -> Self {
        ScalarInfo {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            kind: ScalarKind::Enum {
                name_of: variant_name::<T>,
                from_name: variant_from_name::<T>,
            },
        }
    }

    pub fn opaque<T: Any>() -> Self {
        ScalarInfo {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            kind: ScalarKind::Opaque,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn kind(&self) -> &ScalarKind {
        &self.kind
    }

    /// True when this describes exactly `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }
}

impl fmt::Debug for ScalarInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            ScalarKind::Primitive { .. } => "primitive",
            ScalarKind::Enum { .. } => "enum",
            ScalarKind::Opaque => "opaque",
        };
        write!(f, "ScalarInfo({}, {})", self.type_name, kind)
    }
}

fn display_any<T: Display + Any>(value: &dyn Any) -> Option<String> {
    value.downcast_ref::<T>().map(ToString::to_string)
}

fn parse_any<T: FromStr + Any>(text: &str) -> Option<Box<dyn Any>> {
    text.parse::<T>().ok().map(|v| Box::new(v) as Box<dyn Any>)
}

fn variant_name<T: Serialize + Any>(value: &dyn Any) -> Option<String> {
    value.downcast_ref::<T>()?.serialize(VariantNameSerializer).ok()
}

fn variant_from_name<T: DeserializeOwned + Any>(name: &str) -> Option<Box<dyn Any>> {
    let de: StrDeserializer<'_, ValueError> = name.into_deserializer();
    T::deserialize(de)
        .ok()
        .map(|v| Box::new(v) as Box<dyn Any>)
}

/// Whether a collection keeps input order or de-duplicates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CollectionKind {
    Sequence,
    Set,
}

/// Descriptor of a homogeneous collection type.
#[derive(Clone, Copy)]
pub struct CollectionInfo {
    type_id: TypeId,
    type_name: &'static str,
    kind: CollectionKind,
    element: fn() -> TypeInfo,
}

impl CollectionInfo {
    pub fn of<C: Any, E: Toon>(kind: CollectionKind) -> Self {
        CollectionInfo {
            type_id: TypeId::of::<C>(),
            type_name: type_name::<C>(),
            kind,
            element: E::type_info,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn kind(&self) -> CollectionKind {
        self.kind
    }

    /// The declared element type.
    pub fn element(&self) -> TypeInfo {
        (self.element)()
    }
}

impl fmt::Debug for CollectionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CollectionInfo({}, {:?})", self.type_name, self.kind)
    }
}

/// Borrowed view of a value for the encoder.
pub enum Node<'a> {
    Null,
    Scalar(&'a dyn Any, ScalarInfo),
    Record(&'a dyn Record),
    Collection(Vec<Node<'a>>),
}

/// Owned value produced by the decoder, consumed by [`Toon::from_decoded`].
pub enum Decoded {
    Null,
    Scalar(Box<dyn Any>),
    Record(Box<dyn Record>),
    Collection(Vec<Decoded>),
}

impl Decoded {
    pub fn is_null(&self) -> bool {
        matches!(self, Decoded::Null)
    }

    /// Unwraps a scalar of type `T`.
    pub fn into_scalar<T: Any>(self) -> Result<T> {
        match self {
            Decoded::Scalar(boxed) => boxed.downcast::<T>().map(|b| *b).map_err(|_| {
                Error::reflection(type_name::<T>(), "decoded scalar has a different type")
            }),
            other => Err(other.mismatch(type_name::<T>())),
        }
    }

    /// Unwraps a record of type `T`.
    pub fn into_record<T: Record>(self) -> Result<T> {
        match self {
            Decoded::Record(boxed) => boxed.into_any().downcast::<T>().map(|b| *b).map_err(|_| {
                Error::reflection(type_name::<T>(), "decoded record has a different type")
            }),
            other => Err(other.mismatch(type_name::<T>())),
        }
    }

    /// Unwraps the elements of a collection destined for `target`.
    pub fn into_items(self, target: &str) -> Result<Vec<Decoded>> {
        match self {
            Decoded::Collection(items) => Ok(items),
            other => Err(other.mismatch(target)),
        }
    }

    fn shape(&self) -> &'static str {
        match self {
            Decoded::Null => "null",
            Decoded::Scalar(_) => "scalar",
            Decoded::Record(_) => "record",
            Decoded::Collection(_) => "collection",
        }
    }

    fn mismatch(&self, target: &str) -> Error {
        match self {
            Decoded::Null => Error::type_convert("", target, "null"),
            other => Error::reflection(
                target,
                format!("cannot be built from a decoded {}", other.shape()),
            ),
        }
    }
}

impl fmt::Debug for Decoded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decoded::Null => f.write_str("Null"),
            Decoded::Scalar(_) => f.write_str("Scalar(..)"),
            Decoded::Record(record) => write!(f, "Record({})", record.record_info().type_name()),
            Decoded::Collection(items) => f.debug_tuple("Collection").field(items).finish(),
        }
    }
}

/// A type that can be written to and read from TOON text.
pub trait Toon: Sized + 'static {
    fn type_info() -> TypeInfo;

    fn to_node(&self) -> Node<'_>;

    fn from_decoded(value: Decoded) -> Result<Self>;
}

macro_rules! impl_primitive {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Toon for $ty {
                fn type_info() -> TypeInfo {
                    TypeInfo::Scalar(ScalarInfo::primitive::<$ty>())
                }

                fn to_node(&self) -> Node<'_> {
                    Node::Scalar(self, ScalarInfo::primitive::<$ty>())
                }

                fn from_decoded(value: Decoded) -> Result<Self> {
                    value.into_scalar::<$ty>()
                }
            }
        )*
    };
}

impl_primitive!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, String,
);

macro_rules! impl_opaque {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Toon for $ty {
                fn type_info() -> TypeInfo {
                    TypeInfo::Scalar(ScalarInfo::opaque::<$ty>())
                }

                fn to_node(&self) -> Node<'_> {
                    Node::Scalar(self, ScalarInfo::opaque::<$ty>())
                }

                fn from_decoded(value: Decoded) -> Result<Self> {
                    value.into_scalar::<$ty>()
                }
            }
        )*
    };
}

impl_opaque!(NaiveDateTime, DateTime<Utc>, BigInt);

impl<T: Toon> Toon for Option<T> {
    fn type_info() -> TypeInfo {
        T::type_info()
    }

    fn to_node(&self) -> Node<'_> {
        match self {
            Some(value) => value.to_node(),
            None => Node::Null,
        }
    }

    fn from_decoded(value: Decoded) -> Result<Self> {
        match value {
            Decoded::Null => Ok(None),
            other => T::from_decoded(other).map(Some),
        }
    }
}

impl<T: Toon> Toon for Box<T> {
    fn type_info() -> TypeInfo {
        T::type_info()
    }

    fn to_node(&self) -> Node<'_> {
        (**self).to_node()
    }

    fn from_decoded(value: Decoded) -> Result<Self> {
        T::from_decoded(value).map(Box::new)
    }
}

macro_rules! impl_collection {
    ($kind:expr, $coll:ident<T $(: $bound:ident $(+ $more:ident)*)?>) => {
        impl<T: Toon $(+ $bound $(+ $more)*)?> Toon for $coll<T> {
            fn type_info() -> TypeInfo {
                TypeInfo::Collection(CollectionInfo::of::<Self, T>($kind))
            }

            fn to_node(&self) -> Node<'_> {
                Node::Collection(self.iter().map(Toon::to_node).collect())
            }

            fn from_decoded(value: Decoded) -> Result<Self> {
                value
                    .into_items(type_name::<Self>())?
                    .into_iter()
                    .map(T::from_decoded)
                    .collect()
            }
        }
    };
}

impl_collection!(CollectionKind::Sequence, Vec<T>);
impl_collection!(CollectionKind::Sequence, VecDeque<T>);
impl_collection!(CollectionKind::Set, HashSet<T: Eq + Hash>);
impl_collection!(CollectionKind::Set, BTreeSet<T: Ord>);
