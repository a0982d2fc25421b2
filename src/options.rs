//! Configuration options for TOON encoding and decoding.
//!
//! [`ToonOptions`] is shared by the [`Serializer`](crate::Serializer) and the
//! [`Deserializer`](crate::Deserializer). It derives serde traits with field
//! defaults, so it can be embedded in an application's own configuration file.
//!
//! ## Examples
//!
//! ```rust
//! use toon_codec::{to_string_with_options, toon_record, ToonOptions};
//!
//! toon_record! {
//!     #[derive(Default)]
//!     pub struct Point {
//!         #[toon(order = 1, comment = "horizontal")]
//!         pub x: i32,
//!         #[toon(order = 2)]
//!         pub y: i32,
//!     }
//! }
//!
//! let point = Point { x: 1, y: 2 };
//!
//! let annotated = to_string_with_options("p", &point, ToonOptions::new()).unwrap();
//! assert!(annotated.starts_with("p{x#horizontal,y}: "));
//!
//! let compact = to_string_with_options("p", &point, ToonOptions::compact()).unwrap();
//! assert!(compact.starts_with("p{x,y}: "));
//! ```

use serde::{Deserialize, Serialize};

/// Default limit on record and collection nesting.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Configuration options for TOON encoding and decoding.
///
/// # Examples
///
/// ```rust
/// use toon_codec::ToonOptions;
///
/// let options = ToonOptions::new().with_max_depth(8);
/// assert!(options.include_comments);
/// assert_eq!(options.max_depth, 8);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToonOptions {
    /// Write `#comment` annotations after field names in headers.
    pub include_comments: bool,
    /// Deepest record/collection nesting accepted by either direction.
    pub max_depth: usize,
}

impl Default for ToonOptions {
    fn default() -> Self {
        ToonOptions {
            include_comments: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ToonOptions {
    /// Creates default options (comments on, depth limit 64).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options that leave field comments out of headers.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use toon_codec::ToonOptions;
    ///
    /// assert!(!ToonOptions::compact().include_comments);
    /// ```
    #[must_use]
    pub fn compact() -> Self {
        ToonOptions {
            include_comments: false,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_comments(mut self, include_comments: bool) -> Self {
        self.include_comments = include_comments;
        self
    }

    /// Sets the nesting limit; exceeding it is a format error.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
