//! Pluggable text conversion for scalar values.
//!
//! A [`TypeConverter`] turns one family of scalar types into TOON text and
//! back. Converters live in a [`ConverterRegistry`]; the most recently added
//! converter that supports a type wins, and a type no converter supports
//! falls back to its built-in `Display`/`FromStr` handling.
//!
//! A new registry already holds these built-ins, at the lowest priority:
//!
//! | Converter | Types | Text |
//! |-----------|-------|------|
//! | [`NaiveDateTimeConverter`] | `chrono::NaiveDateTime` | `2024-01-01T10:30:00` |
//! | [`UtcDateTimeConverter`] | `chrono::DateTime<Utc>` | `2024-01-01T10:30:00Z` |
//! | [`EnumConverter`] | any [`toon_enum!`](crate::toon_enum) type | variant name |
//! | [`BigIntConverter`] | `num_bigint::BigInt` | decimal digits |
//!
//! ## Examples
//!
//! ```rust
//! use toon_codec::{FnConverter, Serializer, ToonOptions};
//!
//! let mut serializer = Serializer::new(ToonOptions::new());
//! serializer.add_converter(FnConverter::<bool>::new(
//!     |b| if *b { "yes".into() } else { "no".into() },
//!     |text| match text {
//!         "yes" => Some(true),
//!         "no" => Some(false),
//!         _ => None,
//!     },
//! ));
//!
//! assert_eq!(serializer.serialize("flag", &true).unwrap(), "flag: yes");
//! ```

use crate::value::{ScalarInfo, ScalarKind};
use crate::{Error, Result};
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use num_bigint::BigInt;
use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

const LOCAL_DATE_TIME: &str = "%Y-%m-%dT%H:%M:%S%.f";
const LOCAL_DATE_TIME_MINUTES: &str = "%Y-%m-%dT%H:%M";

/// Converts scalar values of the supported types to and from text.
///
/// Implementations must be `Send + Sync` so registries can be shared
/// between threads once configured.
pub trait TypeConverter: Send + Sync {
    fn supports(&self, ty: &ScalarInfo) -> bool;

    /// Renders `value` (of the type described by `ty`) as unescaped text.
    fn serialize(&self, value: &dyn Any, ty: &ScalarInfo) -> Result<String>;

    /// Parses unescaped, trimmed text into a value of the type described by `ty`.
    fn parse(&self, text: &str, ty: &ScalarInfo) -> Result<Box<dyn Any>>;
}

/// Ordered set of converters; earlier entries take priority.
#[derive(Clone)]
pub struct ConverterRegistry {
    converters: Vec<Arc<dyn TypeConverter>>,
}

impl ConverterRegistry {
    /// Creates a registry holding the built-in converters.
    #[must_use]
    pub fn new() -> Self {
        ConverterRegistry {
            converters: vec![
                Arc::new(NaiveDateTimeConverter),
                Arc::new(UtcDateTimeConverter),
                Arc::new(EnumConverter),
                Arc::new(BigIntConverter),
            ],
        }
    }

    /// Creates a registry without any converters.
    #[must_use]
    pub fn empty() -> Self {
        ConverterRegistry {
            converters: Vec::new(),
        }
    }

    /// Adds a converter ahead of every converter already registered.
    pub fn add_converter<C: TypeConverter + 'static>(&mut self, converter: C) {
        log::debug!(
            "registering converter `{}` at highest priority",
            std::any::type_name::<C>()
        );
        self.converters.insert(0, Arc::new(converter));
    }

    /// The highest-priority converter supporting `ty`, if any.
    pub fn find_converter(&self, ty: &ScalarInfo) -> Option<&dyn TypeConverter> {
        self.converters
            .iter()
            .find(|c| c.supports(ty))
            .map(|c| c.as_ref())
    }

    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterRegistry")
            .field("converters", &self.converters.len())
            .finish()
    }
}

fn downcast<'a, T: Any>(value: &'a dyn Any, ty: &ScalarInfo) -> Result<&'a T> {
    value
        .downcast_ref::<T>()
        .ok_or_else(|| Error::reflection(ty.type_name(), "value does not match its declared type"))
}

/// ISO-8601 local date-times without offset.
///
/// Writes seconds (and a fraction only when non-zero); reads either that form
/// or the minute-precision form `2024-01-01T10:30`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NaiveDateTimeConverter;

impl TypeConverter for NaiveDateTimeConverter {
    fn supports(&self, ty: &ScalarInfo) -> bool {
        ty.is::<NaiveDateTime>()
    }

    fn serialize(&self, value: &dyn Any, ty: &ScalarInfo) -> Result<String> {
        Ok(downcast::<NaiveDateTime>(value, ty)?
            .format(LOCAL_DATE_TIME)
            .to_string())
    }

    fn parse(&self, text: &str, ty: &ScalarInfo) -> Result<Box<dyn Any>> {
        NaiveDateTime::parse_from_str(text, LOCAL_DATE_TIME)
            .or_else(|_| NaiveDateTime::parse_from_str(text, LOCAL_DATE_TIME_MINUTES))
            .map(|dt| Box::new(dt) as Box<dyn Any>)
            .map_err(|_| Error::type_convert("", ty.type_name(), text))
    }
}

/// RFC 3339 timestamps in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct UtcDateTimeConverter;

impl TypeConverter for UtcDateTimeConverter {
    fn supports(&self, ty: &ScalarInfo) -> bool {
        ty.is::<DateTime<Utc>>()
    }

    fn serialize(&self, value: &dyn Any, ty: &ScalarInfo) -> Result<String> {
        Ok(downcast::<DateTime<Utc>>(value, ty)?.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    fn parse(&self, text: &str, ty: &ScalarInfo) -> Result<Box<dyn Any>> {
        DateTime::parse_from_rfc3339(text)
            .map(|dt| Box::new(dt.with_timezone(&Utc)) as Box<dyn Any>)
            .map_err(|_| Error::type_convert("", ty.type_name(), text))
    }
}

/// Unit enumerations, named by their serde variant names.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnumConverter;

impl TypeConverter for EnumConverter {
    fn supports(&self, ty: &ScalarInfo) -> bool {
        matches!(ty.kind(), ScalarKind::Enum { .. })
    }

    fn serialize(&self, value: &dyn Any, ty: &ScalarInfo) -> Result<String> {
        match ty.kind() {
            ScalarKind::Enum { name_of, .. } => name_of(value).ok_or_else(|| {
                Error::reflection(ty.type_name(), "value is not a unit variant of this enum")
            }),
            _ => Err(Error::reflection(ty.type_name(), "not an enumeration")),
        }
    }

    fn parse(&self, text: &str, ty: &ScalarInfo) -> Result<Box<dyn Any>> {
        match ty.kind() {
            ScalarKind::Enum { from_name, .. } => {
                from_name(text).ok_or_else(|| Error::type_convert("", ty.type_name(), text))
            }
            _ => Err(Error::reflection(ty.type_name(), "not an enumeration")),
        }
    }
}

/// Arbitrary-precision integers as decimal text.
#[derive(Debug, Clone, Copy, Default)]
pub struct BigIntConverter;

impl TypeConverter for BigIntConverter {
    fn supports(&self, ty: &ScalarInfo) -> bool {
        ty.is::<BigInt>()
    }

    fn serialize(&self, value: &dyn Any, ty: &ScalarInfo) -> Result<String> {
        Ok(downcast::<BigInt>(value, ty)?.to_string())
    }

    fn parse(&self, text: &str, ty: &ScalarInfo) -> Result<Box<dyn Any>> {
        text.parse::<BigInt>()
            .map(|n| Box::new(n) as Box<dyn Any>)
            .map_err(|_| Error::type_convert("", ty.type_name(), text))
    }
}

type ToText<T> = Box<dyn Fn(&T) -> String + Send + Sync>;
type FromText<T> = Box<dyn Fn(&str) -> Option<T> + Send + Sync>;

/// A converter for exactly `T`, built from two closures.
pub struct FnConverter<T> {
    to_text: ToText<T>,
    from_text: FromText<T>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Any> FnConverter<T> {
    pub fn new<S, P>(to_text: S, from_text: P) -> Self
    where
        S: Fn(&T) -> String + Send + Sync + 'static,
        P: Fn(&str) -> Option<T> + Send + Sync + 'static,
    {
        FnConverter {
            to_text: Box::new(to_text),
            from_text: Box::new(from_text),
            _marker: PhantomData,
        }
    }
}

impl<T: Any> TypeConverter for FnConverter<T> {
    fn supports(&self, ty: &ScalarInfo) -> bool {
        ty.is::<T>()
    }

    fn serialize(&self, value: &dyn Any, ty: &ScalarInfo) -> Result<String> {
        Ok((self.to_text)(downcast::<T>(value, ty)?))
    }

    fn parse(&self, text: &str, ty: &ScalarInfo) -> Result<Box<dyn Any>> {
        (self.from_text)(text)
            .map(|v| Box::new(v) as Box<dyn Any>)
            .ok_or_else(|| Error::type_convert("", ty.type_name(), text))
    }
}
