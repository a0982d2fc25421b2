//! TOON encoding.
//!
//! This module provides the [`Serializer`], which walks a value through its
//! [`Node`] view and writes TOON text.
//!
//! ## Overview
//!
//! - **Records** become a header listing their fields, followed by one
//!   `field: value` line per field, one indent deeper
//! - **Collections** become a header carrying the element count and the
//!   element record's flattened field list, followed by one compact row per
//!   element, terminated by `;`
//! - **Nested records** inside a record nest as their own header; inside a
//!   row they contribute their leaf values inline
//! - **Scalars** go through the converter registry, falling back to their
//!   `Display` form, and are escaped
//!
//! ## Usage
//!
//! Most users should use the high-level functions in the crate root:
//!
//! ```rust
//! use toon_codec::{to_string, toon_record};
//!
//! toon_record! {
//!     #[derive(Default)]
//!     pub struct User {
//!         #[toon(order = 1)]
//!         pub id: i32,
//!         #[toon(order = 2)]
//!         pub name: String,
//!     }
//! }
//!
//! let users = vec![
//!     User { id: 1, name: "Alice".into() },
//!     User { id: 2, name: "Bo,b".into() },
//! ];
//! let toon = to_string("users", &users).unwrap();
//! assert_eq!(toon, "users(2){id,name}: \n  1,Alice;\n  2,Bo\\,b;");
//! ```
//!
//! ## Direct Serializer Usage
//!
//! A [`Serializer`] owns its converter registry, so converters added to one
//! serializer do not affect any other:
//!
//! ```rust
//! use toon_codec::{FnConverter, Serializer, ToonOptions};
//!
//! let mut serializer = Serializer::new(ToonOptions::new());
//! serializer.add_converter(FnConverter::<f64>::new(|v| format!("{:.2}", v), |t| t.parse().ok()));
//! assert_eq!(serializer.serialize("price", &9.5).unwrap(), "price: 9.50");
//! ```

use crate::converter::{ConverterRegistry, TypeConverter};
use crate::escape::{escape_cell, escape_token};
use crate::reflect::{flatten_fields, ordered_fields_checked, Record, RecordInfo, OBJECT_MARKER};
use crate::value::{CollectionInfo, Node, ScalarInfo, ScalarKind, Toon, TypeInfo};
use crate::{Error, Result, ToonOptions};
use std::any::Any;

const INDENT: &str = "  ";

/// The TOON encoder.
///
/// Created via [`Serializer::new`]; reusable for any number of values.
#[derive(Debug, Clone, Default)]
pub struct Serializer {
    registry: ConverterRegistry,
    options: ToonOptions,
}

impl Serializer {
    /// Creates a serializer with the built-in converters.
    pub fn new(options: ToonOptions) -> Self {
        Self::with_registry(ConverterRegistry::new(), options)
    }

    pub fn with_registry(registry: ConverterRegistry, options: ToonOptions) -> Self {
        Serializer { registry, options }
    }

    /// Registers a converter ahead of all existing ones.
    pub fn add_converter<C: TypeConverter + 'static>(&mut self, converter: C) -> &mut Self {
        self.registry.add_converter(converter);
        self
    }

    pub fn registry(&self) -> &ConverterRegistry {
        &self.registry
    }

    pub fn options(&self) -> &ToonOptions {
        &self.options
    }

    /// Encodes `value` under `root_name`.
    ///
    /// # Errors
    ///
    /// Fails with a format error for an invalid root name or nesting beyond
    /// `max_depth`, and with a reflection error when a field cannot be read
    /// or a scalar has no text form.
    pub fn serialize<T: Toon>(&self, root_name: &str, value: &T) -> Result<String> {
        self.serialize_node(root_name, value.to_node(), T::type_info())
    }

    /// Encodes an already-built node whose declared type is `info`.
    pub fn serialize_node(&self, root_name: &str, node: Node<'_>, info: TypeInfo) -> Result<String> {
        validate_root_name(root_name)?;

        let mut out = String::with_capacity(256);
        match node {
            Node::Null => {
                out.push_str(root_name);
                out.push_str(": null");
            }
            Node::Scalar(value, scalar) => {
                out.push_str(root_name);
                out.push_str(": ");
                out.push_str(&escape_token(&self.scalar_text(value, &scalar)?));
            }
            Node::Record(record) => self.write_record(&mut out, root_name, record, 0)?,
            Node::Collection(items) => self.write_collection(&mut out, root_name, &items, &info, 0)?,
        }

        Ok(out.trim_start().trim_end_matches('\n').to_string())
    }

    fn write_record(
        &self,
        out: &mut String,
        name: &str,
        record: &dyn Record,
        indent: usize,
    ) -> Result<()> {
        self.check_depth(indent)?;
        let info = record.record_info();
        let fields = ordered_fields_checked(&info)?;
        log::trace!("encoding record `{}` as `{}`", info.type_name(), name);

        push_indent(out, indent);
        out.push_str(name);
        out.push('{');
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            out.push_str(field.name);
            self.push_comment(out, field.comment);
        }
        out.push_str("}: \n");

        let child = indent + 1;
        for field in fields.iter() {
            let node = record
                .field(field.name)
                .ok_or_else(|| unreadable(&info, field.name))?;
            match node {
                Node::Null => {
                    push_indent(out, child);
                    out.push_str(field.name);
                    out.push_str(": null\n");
                }
                Node::Scalar(value, scalar) => {
                    push_indent(out, child);
                    out.push_str(field.name);
                    out.push_str(": ");
                    out.push_str(&escape_token(&self.scalar_text(value, &scalar)?));
                    out.push('\n');
                }
                Node::Record(nested) => self.write_record(out, field.name, nested, child)?,
                Node::Collection(items) => {
                    self.write_collection(out, field.name, &items, &field.type_info(), child)?
                }
            }
        }
        Ok(())
    }

    fn write_collection(
        &self,
        out: &mut String,
        name: &str,
        items: &[Node<'_>],
        info: &TypeInfo,
        indent: usize,
    ) -> Result<()> {
        self.check_depth(indent)?;
        push_indent(out, indent);
        out.push_str(name);
        if items.is_empty() {
            out.push_str("(0){}: \n");
            return Ok(());
        }

        let TypeInfo::Collection(collection) = info else {
            return Err(Error::reflection(
                info.type_name(),
                "yields a collection but is not declared as one",
            ));
        };
        let element = collection.element();
        log::trace!(
            "encoding {} `{}` elements as `{}`",
            items.len(),
            element.type_name(),
            name
        );

        out.push('(');
        out.push_str(&items.len().to_string());
        out.push_str("){");
        if let TypeInfo::Record(record) = &element {
            let flat = flatten_fields(record, self.options.max_depth)?;
            for (i, entry) in flat.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&entry.path);
                if entry.marker {
                    out.push_str(OBJECT_MARKER);
                }
                self.push_comment(out, entry.comment);
            }
        }
        out.push_str("}: \n");

        let child = indent + 1;
        for item in items {
            let row = match (&element, item) {
                (_, Node::Null) => "null".to_string(),
                (TypeInfo::Record(record), _) => {
                    let mut cells = Vec::new();
                    self.collect_cells(item, record, &mut cells, child)?;
                    cells.join(",")
                }
                (TypeInfo::Collection(nested), _) => self.sublist(item, nested, child)?,
                (TypeInfo::Scalar(_), Node::Scalar(value, scalar)) => {
                    escape_token(&self.scalar_text(*value, scalar)?)
                }
                (TypeInfo::Scalar(scalar), _) => {
                    return Err(Error::reflection(scalar.type_name(), "element is not a scalar"))
                }
            };
            push_indent(out, child);
            out.push_str(&row);
            out.push_str(";\n");
        }
        Ok(())
    }

    /// Appends the leaf cells of a record (or of a null record) to `cells`.
    fn collect_cells(
        &self,
        node: &Node<'_>,
        info: &RecordInfo,
        cells: &mut Vec<String>,
        depth: usize,
    ) -> Result<()> {
        self.check_depth(depth)?;
        let record = match node {
            Node::Record(record) => Some(*record),
            Node::Null => None,
            _ => return Err(Error::reflection(info.type_name(), "element is not a record")),
        };

        for field in ordered_fields_checked(info)?.iter() {
            let value = match record {
                Some(record) => record
                    .field(field.name)
                    .ok_or_else(|| unreadable(info, field.name))?,
                None => Node::Null,
            };
            match field.type_info() {
                TypeInfo::Record(nested) => self.collect_cells(&value, &nested, cells, depth + 1)?,
                TypeInfo::Collection(nested) => cells.push(self.sublist(&value, &nested, depth + 1)?),
                TypeInfo::Scalar(_) => cells.push(self.cell(&value)?),
            }
        }
        Ok(())
    }

    /// Renders a collection value inside a row as `(item,item,...)`.
    fn sublist(&self, node: &Node<'_>, info: &CollectionInfo, depth: usize) -> Result<String> {
        self.check_depth(depth)?;
        let items = match node {
            Node::Null => return Ok("null".to_string()),
            Node::Collection(items) => items,
            _ => return Err(Error::reflection(info.type_name(), "value is not a collection")),
        };

        let element = info.element();
        let mut parts = Vec::with_capacity(items.len());
        for item in items {
            let part = match (&element, item) {
                (_, Node::Null) => "null".to_string(),
                (TypeInfo::Record(record), _) => {
                    let mut cells = Vec::new();
                    self.collect_cells(item, record, &mut cells, depth + 1)?;
                    format!("({})", cells.join(","))
                }
                (TypeInfo::Collection(nested), _) => self.sublist(item, nested, depth + 1)?,
                (TypeInfo::Scalar(_), _) => self.cell(item)?,
            };
            parts.push(part);
        }
        Ok(format!("({})", parts.join(",")))
    }

    fn cell(&self, node: &Node<'_>) -> Result<String> {
        match node {
            Node::Null => Ok("null".to_string()),
            Node::Scalar(value, scalar) => Ok(escape_cell(&self.scalar_text(*value, scalar)?)),
            Node::Record(record) => Err(Error::reflection(
                record.record_info().type_name(),
                "record found where a scalar was declared",
            )),
            Node::Collection(_) => Err(Error::format(
                "collection found where a scalar was declared",
            )),
        }
    }

    /// Unescaped text of a scalar: converter first, then the built-in form.
    fn scalar_text(&self, value: &dyn Any, info: &ScalarInfo) -> Result<String> {
        if let Some(converter) = self.registry.find_converter(info) {
            return converter.serialize(value, info);
        }
        let text = match info.kind() {
            ScalarKind::Primitive { display, .. } => display(value),
            ScalarKind::Enum { name_of, .. } => name_of(value),
            ScalarKind::Opaque => {
                return Err(Error::reflection(
                    info.type_name(),
                    "no converter registered for this type",
                ))
            }
        };
        text.ok_or_else(|| Error::reflection(info.type_name(), "value does not match its declared type"))
    }

    fn push_comment(&self, out: &mut String, comment: &str) {
        if self.options.include_comments && !comment.is_empty() {
            out.push('#');
            out.push_str(&escape_cell(comment));
        }
    }

    fn check_depth(&self, depth: usize) -> Result<()> {
        if depth > self.options.max_depth {
            return Err(Error::format(format!(
                "nesting exceeds the maximum depth of {}",
                self.options.max_depth
            )));
        }
        Ok(())
    }
}

#[inline]
fn push_indent(out: &mut String, level: usize) {
    for _ in 0..level {
        out.push_str(INDENT);
    }
}

fn unreadable(info: &RecordInfo, field: &str) -> Error {
    Error::reflection(info.type_name(), format!("cannot read field `{}`", field))
}

fn validate_root_name(name: &str) -> Result<()> {
    if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return Err(Error::format(format!(
            "root name `{}` must be a non-empty run of letters, digits and underscores",
            name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{toon_record, toon_scalar};

    toon_record! {
        #[derive(Debug, Default, Clone, PartialEq)]
        struct Address {
            #[toon(order = 1)]
            street: String,
            #[toon(order = 2)]
            city: String,
        }
    }

    toon_record! {
        #[derive(Debug, Default, Clone, PartialEq)]
        struct Person {
            #[toon(order = 1, comment = "unique id")]
            id: i32,
            #[toon(order = 2)]
            name: Option<String>,
            #[toon(order = 3)]
            address: Option<Address>,
            #[toon(order = 4)]
            tags: Vec<String>,
        }
    }

    toon_record! {
        #[derive(Debug, Default)]
        struct Chain {
            #[toon(order = 1)]
            next: Option<Box<Chain>>,
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Secret(u64);
    toon_scalar!(Secret);

    fn ann() -> Person {
        Person {
            id: 1,
            name: Some("Ann".into()),
            address: Some(Address {
                street: "1 Main St, Apt 4".into(),
                city: "Springfield".into(),
            }),
            tags: vec!["a".into(), "b".into()],
        }
    }

    fn encode<T: Toon>(name: &str, value: &T) -> String {
        Serializer::default().serialize(name, value).unwrap()
    }

    #[test]
    fn test_null_root() {
        assert_eq!(encode("user", &None::<Person>), "user: null");
    }

    #[test]
    fn test_empty_collection_root() {
        assert_eq!(encode("users", &Vec::<Person>::new()), "users(0){}: ");
        assert_eq!(encode("users", &Vec::<i32>::new()), "users(0){}: ");
    }

    #[test]
    fn test_scalar_root() {
        assert_eq!(encode("answer", &42u8), "answer: 42");
        assert_eq!(encode("text", &"a;b".to_string()), "text: a\\;b");
    }

    #[test]
    fn test_record_with_nesting() {
        let expected = "person{id#unique id,name,address,tags}: \n  id: 1\n  name: Ann\n  address{street,city}: \n    street: 1 Main St\\, Apt 4\n    city: Springfield\n  tags(2){}: \n    a;\n    b;";
        assert_eq!(encode("person", &ann()), expected);
    }

    #[test]
    fn test_null_fields_and_empty_collection_field() {
        let person = Person {
            id: 2,
            ..Person::default()
        };
        let expected = "p{id#unique id,name,address,tags}: \n  id: 2\n  name: null\n  address: null\n  tags(0){}: ";
        assert_eq!(encode("p", &person), expected);
    }

    #[test]
    fn test_collection_rows_flatten_nested_records() {
        let mut bob = ann();
        bob.id = 2;
        bob.name = None;
        bob.address = None;
        bob.tags = vec!["x(1)".into()];
        let expected = "people(2){id#unique id,name,address[$object],address.street,address.city,tags}: \n  1,Ann,1 Main St\\, Apt 4,Springfield,(a,b);\n  2,null,null,null,(x\\(1\\));";
        assert_eq!(encode("people", &vec![ann(), bob]), expected);
    }

    #[test]
    fn test_comments_can_be_left_out() {
        let serializer = Serializer::new(ToonOptions::compact());
        let text = serializer.serialize("p", &ann()).unwrap();
        assert!(text.starts_with("p{id,name,address,tags}: "));
    }

    #[test]
    fn test_nested_collections_as_sublists() {
        let grid = vec![vec![1, 2], vec![], vec![3]];
        assert_eq!(encode("grid", &grid), "grid(3){}: \n  (1,2);\n  ();\n  (3);");
    }

    #[test]
    fn test_opaque_scalar_needs_converter() {
        let err = Serializer::default()
            .serialize("secret", &Secret(7))
            .unwrap_err();
        assert!(matches!(err, Error::Reflection { .. }));
    }

    #[test]
    fn test_invalid_root_name() {
        let err = Serializer::default().serialize("bad name", &1).unwrap_err();
        assert!(matches!(err, Error::Format { .. }));
        assert!(Serializer::default().serialize("", &1).is_err());
    }

    #[test]
    fn test_depth_limit() {
        let chain = Chain {
            next: Some(Box::new(Chain {
                next: Some(Box::new(Chain::default())),
            })),
        };
        let shallow = Serializer::new(ToonOptions::new().with_max_depth(1));
        assert!(matches!(
            shallow.serialize("c", &chain).unwrap_err(),
            Error::Format { .. }
        ));
        assert!(Serializer::default().serialize("c", &chain).is_ok());
    }
}
