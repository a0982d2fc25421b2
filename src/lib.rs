//! # toon_codec
//!
//! A reflective codec for TOON, a compact line-oriented text format for typed
//! records and homogeneous collections.
//!
//! ## What is TOON?
//!
//! TOON writes the field names of a record once, in a header, and the values
//! below it. Collections of records become tables: one header listing the
//! columns, then one `;`-terminated row per element. The result is much
//! smaller than JSON for repetitive data while staying easy to read.
//!
//! ```text
//! users(2){id#unique id,name}:
//!   1,Alice;
//!   2,Bob;
//! ```
//!
//! ## Key Features
//!
//! - **Field metadata**: records describe their fields with an order and an
//!   optional comment that is written into headers
//! - **Inheritance**: a record can extend another and inherit its fields
//! - **Tabular collections**: nested records are flattened into dotted
//!   columns, nested collections into parenthesized sub-lists
//! - **Pluggable converters**: dates, big integers and enums are handled by
//!   built-in [`TypeConverter`]s; register your own for any other type
//! - **Line-numbered errors**: malformed input reports the offending line
//!
//! ## Quick Start
//!
//! ```rust
//! use toon_codec::{from_str, to_string, toon_record};
//!
//! toon_record! {
//!     #[derive(Debug, Default, PartialEq)]
//!     pub struct User {
//!         #[toon(order = 1, comment = "unique id")]
//!         pub id: u32,
//!         #[toon(order = 2)]
//!         pub name: String,
//!     }
//! }
//!
//! let users = vec![
//!     User { id: 1, name: "Alice".into() },
//!     User { id: 2, name: "Bob".into() },
//! ];
//!
//! let text = to_string("users", &users).unwrap();
//! assert_eq!(text, "users(2){id#unique id,name}: \n  1,Alice;\n  2,Bob;");
//!
//! let back: Vec<User> = from_str(&text).unwrap().unwrap();
//! assert_eq!(back, users);
//! ```
//!
//! ## Format Reference
//!
//! The [`grammar`] module documents every construct of the format.
//!
//! ## Demos
//!
//! See the `demos/` directory:
//!
//! - **`simple.rs`** - a single record, written and read back
//! - **`tabular_arrays.rs`** - collections of nested records as tables
//! - **`custom_converter.rs`** - plugging in a converter for a domain type
//! - **`token_efficiency.rs`** - TOON next to JSON for the same data
//!
//! Run any demo with: `cargo run --example <name>`

pub mod converter;
pub mod de;
pub mod error;
pub mod escape;
pub mod grammar;
pub mod macros;
mod map;
pub mod options;
pub mod reflect;
pub mod ser;
pub mod value;
mod variant;

pub use converter::{
    BigIntConverter, ConverterRegistry, EnumConverter, FnConverter, NaiveDateTimeConverter,
    TypeConverter, UtcDateTimeConverter,
};
pub use de::Deserializer;
pub use error::{Error, Result};
pub use escape::{escape, unescape};
pub use options::ToonOptions;
pub use reflect::{ordered_fields, FieldDescriptor, Record, RecordInfo};
pub use ser::Serializer;
pub use value::{
    CollectionInfo, CollectionKind, Decoded, Node, ScalarInfo, ScalarKind, Toon, TypeInfo,
};

use std::io;

/// Encodes `value` as a TOON document whose root node is called `root_name`.
///
/// # Examples
///
/// ```rust
/// use toon_codec::to_string;
///
/// assert_eq!(to_string("count", &3).unwrap(), "count: 3");
/// assert_eq!(to_string("nums", &vec![1, 2]).unwrap(), "nums(2){}: \n  1;\n  2;");
/// ```
///
/// # Errors
///
/// Returns an error if `root_name` is not a plain identifier, a scalar has no
/// text form, or nesting exceeds the depth limit.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T: Toon>(root_name: &str, value: &T) -> Result<String> {
    to_string_with_options(root_name, value, ToonOptions::default())
}

/// Encodes `value` with custom options.
///
/// # Errors
///
/// Same as [`to_string`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_options<T: Toon>(
    root_name: &str,
    value: &T,
    options: ToonOptions,
) -> Result<String> {
    Serializer::new(options).serialize(root_name, value)
}

/// Encodes `value` into a writer.
///
/// # Examples
///
/// ```rust
/// use toon_codec::to_writer;
///
/// let mut buffer = Vec::new();
/// to_writer(&mut buffer, "flag", &true).unwrap();
/// assert_eq!(buffer, b"flag: true");
/// ```
///
/// # Errors
///
/// Returns an error if encoding fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W, T>(mut writer: W, root_name: &str, value: &T) -> Result<()>
where
    W: io::Write,
    T: Toon,
{
    let text = to_string(root_name, value)?;
    writer
        .write_all(text.as_bytes())
        .map_err(|e| Error::io(&e.to_string()))?;
    Ok(())
}

/// Decodes a TOON document into a `T`.
///
/// Returns `Ok(None)` for blank input or a `null` root.
///
/// # Examples
///
/// ```rust
/// use toon_codec::from_str;
///
/// let nums: Vec<i64> = from_str("nums(2){}: \n  4;\n  5;").unwrap().unwrap();
/// assert_eq!(nums, vec![4, 5]);
/// assert_eq!(from_str::<i64>("").unwrap(), None);
/// ```
///
/// # Errors
///
/// Returns an error if the input is not valid TOON or does not fit `T`.
/// Format errors carry the 1-based line number where parsing failed.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str<T: Toon>(s: &str) -> Result<Option<T>> {
    Deserializer::default().deserialize(s)
}

/// Decodes a TOON document from bytes.
///
/// # Errors
///
/// Returns an error if the bytes are not valid UTF-8, or as [`from_str`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice<T: Toon>(v: &[u8]) -> Result<Option<T>> {
    let s = std::str::from_utf8(v).map_err(|e| Error::custom(e.to_string()))?;
    from_str(s)
}

/// Decodes a TOON document from an I/O stream.
///
/// # Examples
///
/// ```rust
/// use std::io::Cursor;
/// use toon_codec::from_reader;
///
/// let name: String = from_reader(Cursor::new(b"name: Ann")).unwrap().unwrap();
/// assert_eq!(name, "Ann");
/// ```
///
/// # Errors
///
/// Returns an error if reading fails, or as [`from_str`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R, T>(mut reader: R) -> Result<Option<T>>
where
    R: io::Read,
    T: Toon,
{
    let mut string = String::new();
    reader
        .read_to_string(&mut string)
        .map_err(|e| Error::io(&e.to_string()))?;
    from_str(&string)
}
