//! Error types for TOON encoding and decoding.
//!
//! Every failure aborts the whole call; there is no partial result. Errors
//! fall into three families:
//!
//! - **Format errors**: the text does not match the grammar, a collection's
//!   declared size disagrees with its element lines, or the requested target
//!   shape cannot hold what the text describes
//! - **Reflection errors**: field metadata could not be read or applied (no
//!   accessor, no zero-argument constructor, a value of an unexpected type)
//! - **Type conversion errors**: a textual token could not be turned into the
//!   field's declared type
//!
//! ## Examples
//!
//! ```rust
//! use toon_codec::{from_str, Error};
//!
//! let result = from_str::<Vec<i32>>("nums(3){}: \n  1;\n  2;");
//! match result {
//!     Err(Error::Format { line, msg }) => {
//!         assert_eq!(line, Some(1));
//!         assert!(msg.contains("declares 3"));
//!     }
//!     other => panic!("expected a format error, got {:?}", other),
//! }
//! ```

use std::fmt;
use thiserror::Error;

/// Represents all possible errors raised while encoding or decoding TOON.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// The text does not match the grammar or disagrees with the target shape.
    #[error("Format error{}: {msg}", at_line(.line))]
    Format { line: Option<usize>, msg: String },

    /// Field metadata for a record type could not be read or applied.
    #[error("Reflection error on `{type_name}`: {msg}")]
    Reflection { type_name: String, msg: String },

    /// A token could not be converted to the declared field type.
    #[error("Cannot convert `{value}` to `{target}` for field `{field}`")]
    TypeConvert {
        field: String,
        target: String,
        value: String,
    },

    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

fn at_line(line: &Option<usize>) -> String {
    line.map(|l| format!(" at line {}", l)).unwrap_or_default()
}

impl Error {
    /// Creates a format error that is not tied to an input line.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use toon_codec::Error;
    ///
    /// let err = Error::format("nesting exceeds 64 levels");
    /// assert_eq!(err.to_string(), "Format error: nesting exceeds 64 levels");
    /// ```
    pub fn format<T: fmt::Display>(msg: T) -> Self {
        Error::Format {
            line: None,
            msg: msg.to_string(),
        }
    }

    /// Creates a format error pointing at a 1-based input line.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use toon_codec::Error;
    ///
    /// let err = Error::format_at(3, "expected `field: value`");
    /// assert!(err.to_string().contains("line 3"));
    /// ```
    pub fn format_at<T: fmt::Display>(line: usize, msg: T) -> Self {
        Error::Format {
            line: Some(line),
            msg: msg.to_string(),
        }
    }

    /// Creates a reflection error for the named type.
    pub fn reflection<T: fmt::Display>(type_name: &str, msg: T) -> Self {
        Error::Reflection {
            type_name: type_name.to_string(),
            msg: msg.to_string(),
        }
    }

    /// Creates a conversion error naming the field, the target type and the raw text.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use toon_codec::Error;
    ///
    /// let err = Error::type_convert("age", "i32", "abc");
    /// assert_eq!(err.to_string(), "Cannot convert `abc` to `i32` for field `age`");
    /// ```
    pub fn type_convert(field: &str, target: &str, value: &str) -> Self {
        Error::TypeConvert {
            field: field.to_string(),
            target: target.to_string(),
            value: value.to_string(),
        }
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error for reader/writer failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Attaches a field name to a conversion error raised without one.
    ///
    /// Converters only see the token and the target type, so the decoder
    /// fills in the field it was populating.
    #[must_use]
    pub fn in_field(self, name: &str) -> Self {
        match self {
            Error::TypeConvert {
                field,
                target,
                value,
            } if field.is_empty() => Error::TypeConvert {
                field: name.to_string(),
                target,
                value,
            },
            other => other,
        }
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
