//! TOON Format Reference
//!
//! This module documents the TOON text format as read and written by this
//! library. It contains no code.
//!
//! # Overview
//!
//! A document holds exactly one root node. Nodes are written one per line;
//! children are indented two spaces deeper than their parent. Blank lines are
//! ignored on input and never produced on output.
//!
//! # Headers
//!
//! ## Records
//!
//! ```text
//! name{field#comment,field,...}:
//! ```
//!
//! The brace list names the record's fields in declared order. A field may
//! carry a `#comment`, written when comments are enabled and skipped on input.
//! Each field follows on its own line, one level deeper:
//!
//! ```text
//! user{id#unique id,name,address}:
//!   id: 7
//!   name: Ann
//!   address{street,city}:
//!     street: Elm
//!     city: Oslo
//! ```
//!
//! A scalar field is `field: value`; an absent value is `field: null`. A
//! record or collection field is written as its own header, named after the
//! field. Input may also spell it `field: header{...}:` on one line.
//!
//! ## Collections
//!
//! ```text
//! name(N){column,column,...}:
//! ```
//!
//! `N` is the element count; decoding fails unless exactly `N` elements follow.
//! Each element is one line terminated by `;`.
//!
//! | Element type | Column list | Element line |
//! |--------------|-------------|--------------|
//! | Scalar | empty | `value;` |
//! | Collection | empty | `(item,item);` |
//! | Record | flattened fields | `cell,cell,...;` |
//!
//! # Rows
//!
//! A record element is a row of comma-separated cells, one per column.
//!
//! - **Nested records** are flattened: their leaves become dotted columns such
//!   as `address.city`. The nested record itself is listed as
//!   `address[$object]`, a marker that takes no cell.
//! - **Collections** inside a row are written as `(a,b)`, with `()` for an
//!   empty collection. Items that are records are parenthesized groups of
//!   their leaves: `((1,x),(2,y))`.
//! - **Absent values** are written as `null`. An empty cell is an empty string.
//! - **Absent elements** are a row holding only `null`. With a single column
//!   that row is read as a record whose one leaf is absent.
//!
//! ```text
//! users(2){id,address[$object],address.city,tags}:
//!   1,Oslo,(a,b);
//!   2,null,();
//! ```
//!
//! On input a nested record may also be given as a parenthesized group in a
//! single cell, `(Elm,Oslo)`, or as a full header indented below its row. A
//! marker may also follow the entry's comment, as in `address#home[$object]`.
//!
//! # Escaping
//!
//! Values and field names escape `\`, `,`, `;`, `{`, `}` and newline with a
//! backslash (newline becomes `\n`). Cells inside rows additionally escape
//! `(` and `)`. A space or tab at the start or end of a value is written
//! behind a backslash, so it is not taken for indentation or trimmed away.
//!
//! Unescaping is a single left-to-right pass: `\n` becomes a newline, and a
//! backslash before one of the escaped characters above (including space and
//! tab) yields that character. Any other pair, such as `\t`, is kept verbatim,
//! as is a backslash at the very end of a token.
//!
//! # Scalars
//!
//! | Type | Text |
//! |------|------|
//! | Integers, floats, `bool`, `char`, `String` | `Display` / `FromStr` |
//! | Unit enums | serde variant name |
//! | `NaiveDateTime` | `2024-01-15T10:30:00` |
//! | `DateTime<Utc>` | `2024-01-15T10:30:00Z` |
//! | `BigInt` | decimal digits |
//!
//! Any other type needs a registered [`TypeConverter`](crate::TypeConverter).
//!
//! # Root
//!
//! A scalar root is written as `name: value`, a null root as `name: null`.
//! Both decode back; blank input decodes to nothing.
//!
//! # Limitations
//!
//! - The string `"null"` cannot be told apart from an absent value.
//! - A sub-list holding a single empty string reads back as empty.
//! - Rows are flattened by type, so a record that contains itself, even
//!   behind `Option<Box<_>>`, cannot be an element of a collection.
