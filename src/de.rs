//! TOON decoding.
//!
//! This module provides the [`Deserializer`], a recursive-descent parser over
//! the lines of a TOON document.
//!
//! ## Overview
//!
//! - **Line model**: the text is split into lines once; each keeps its
//!   1-based line number, its indentation in two-space units and its
//!   trimmed content. Blank lines are dropped.
//! - **Classification**: a line is a collection header (`name(N){...}:`), a
//!   record header (`name{...}:`), or plain content.
//! - **Skip-ahead**: a node owns every following line indented deeper than
//!   its own first line; each parse step reports how many lines it consumed.
//! - **Typed targets**: the caller names the target type up front, so every
//!   token is converted against a declared [`TypeInfo`] as it is read.
//!
//! ## Usage
//!
//! ```rust
//! use toon_codec::{from_str, toon_record};
//!
//! toon_record! {
//!     #[derive(Debug, Default, PartialEq)]
//!     pub struct User {
//!         #[toon(order = 1)]
//!         pub id: i32,
//!         #[toon(order = 2)]
//!         pub name: String,
//!     }
//! }
//!
//! let text = "users(2){id,name}: \n  1,Alice;\n  2,Bo\\,b;";
//! let users: Vec<User> = from_str(text).unwrap().unwrap();
//! assert_eq!(users[1].name, "Bo,b");
//!
//! // Blank input decodes to nothing.
//! assert!(from_str::<Vec<User>>("  \n").unwrap().is_none());
//! ```

use crate::converter::{ConverterRegistry, TypeConverter};
use crate::escape::{
    find_unescaped, split_cells, split_unescaped, strip_parens, strip_terminator, trim_token,
    unescape,
};
use crate::map::{FieldMap, Pending};
use crate::reflect::{flatten_fields, ordered_fields_checked, RecordInfo, OBJECT_MARKER};
use crate::value::{CollectionInfo, Decoded, ScalarInfo, ScalarKind, Toon, TypeInfo};
use crate::{Error, Result, ToonOptions};
use once_cell::sync::Lazy;
use regex::Regex;

static COLLECTION_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\w+)\((\d+)\)\{(.*)\}:$").expect("collection header pattern is valid")
});

static RECORD_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\w+)\{(.*)\}:$").expect("record header pattern is valid"));

/// One non-blank input line.
#[derive(Debug, Clone, Copy)]
struct Line<'a> {
    number: usize,
    indent: usize,
    content: &'a str,
}

fn split_lines(text: &str) -> Vec<Line<'_>> {
    text.lines()
        .enumerate()
        .filter_map(|(idx, raw)| {
            let content = trim_token(raw);
            (!content.is_empty()).then(|| Line {
                number: idx + 1,
                indent: indent_level(raw),
                content,
            })
        })
        .collect()
}

/// Whole two-space units at the start of `raw`.
fn indent_level(raw: &str) -> usize {
    (raw.len() - raw.trim_start_matches("  ").len()) / 2
}

/// A header entry with its comment removed.
#[derive(Debug, Clone, PartialEq)]
struct FieldMeta {
    path: String,
    marker: bool,
}

#[derive(Debug)]
enum Header<'a> {
    Collection {
        name: &'a str,
        size: usize,
        fields: Vec<FieldMeta>,
    },
    Record {
        name: &'a str,
    },
}

impl<'a> Header<'a> {
    fn parse(text: &'a str, line: usize) -> Result<Option<Self>> {
        if let Some(caps) = COLLECTION_HEADER.captures(text) {
            let (Some(name), Some(size), Some(fields)) = (caps.get(1), caps.get(2), caps.get(3))
            else {
                return Ok(None);
            };
            let size = size.as_str().parse::<usize>().map_err(|_| {
                Error::format_at(line, format!("collection size `{}` is out of range", size.as_str()))
            })?;
            return Ok(Some(Header::Collection {
                name: name.as_str(),
                size,
                fields: parse_field_list(fields.as_str()),
            }));
        }
        if let Some(name) = RECORD_HEADER.captures(text).and_then(|caps| caps.get(1)) {
            return Ok(Some(Header::Record {
                name: name.as_str(),
            }));
        }
        Ok(None)
    }

    fn name(&self) -> &'a str {
        match self {
            Header::Collection { name, .. } | Header::Record { name } => *name,
        }
    }
}

/// Parses `a#comment,b[$object],b.c` into entries, dropping comments.
///
/// The marker is accepted on either side of a comment: `b[$object]#home` and
/// `b#home[$object]` name the same entry.
fn parse_field_list(list: &str) -> Vec<FieldMeta> {
    split_unescaped(list, ',')
        .into_iter()
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (key, after_comment) = match find_unescaped(entry, '#') {
                Some(idx) => (
                    entry[..idx].trim_end(),
                    entry.trim_end().ends_with(OBJECT_MARKER),
                ),
                None => (entry, false),
            };
            let (key, marker) = match key.strip_suffix(OBJECT_MARKER) {
                Some(stripped) => (stripped, true),
                None => (key, after_comment),
            };
            FieldMeta {
                path: unescape(key),
                marker,
            }
        })
        .collect()
}

/// The TOON decoder.
///
/// Created via [`Deserializer::new`]; reusable for any number of documents.
#[derive(Debug, Clone, Default)]
pub struct Deserializer {
    registry: ConverterRegistry,
    options: ToonOptions,
}

impl Deserializer {
    /// Creates a deserializer with the built-in converters.
    pub fn new(options: ToonOptions) -> Self {
        Self::with_registry(ConverterRegistry::new(), options)
    }

    pub fn with_registry(registry: ConverterRegistry, options: ToonOptions) -> Self {
        Deserializer { registry, options }
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

    /// Decodes `text` into a `T`.
    ///
    /// Returns `Ok(None)` for blank input and for a root written as
    /// `name: null`.
    ///
    /// # Errors
    ///
    /// Fails with a format error when the text does not match the grammar or
    /// the shape of `T`, with a conversion error when a token does not parse
    /// as its field's type, and with a reflection error when a record cannot
    /// be constructed.
    pub fn deserialize<T: Toon>(&self, text: &str) -> Result<Option<T>> {
        match self.deserialize_node(text, T::type_info())? {
            None => Ok(None),
            Some(decoded) => T::from_decoded(decoded).map(Some),
        }
    }

    /// Decodes `text` against a declared type without naming it statically.
    pub fn deserialize_node(&self, text: &str, target: TypeInfo) -> Result<Option<Decoded>> {
        let lines = split_lines(text);
        if lines.is_empty() {
            return Ok(None);
        }
        Parser {
            lines: &lines,
            registry: &self.registry,
            options: &self.options,
        }
        .parse_root(target)
    }
}

struct Parser<'p, 'a> {
    lines: &'p [Line<'a>],
    registry: &'p ConverterRegistry,
    options: &'p ToonOptions,
}

impl<'p, 'a> Parser<'p, 'a> {
    fn parse_root(&self, target: TypeInfo) -> Result<Option<Decoded>> {
        let first = self.lines[0];
        let extent = self.extent(0);
        if extent < self.lines.len() {
            let stray = self.lines[extent];
            return Err(Error::format_at(
                stray.number,
                "unexpected content after the root node",
            ));
        }

        if let Some(header) = Header::parse(first.content, first.number)? {
            let (decoded, _) = self.parse_node(header, 0, target, 0)?;
            return Ok(Some(decoded));
        }

        if extent > 1 {
            return Err(Error::format_at(
                self.lines[1].number,
                "a scalar root cannot have indented lines",
            ));
        }
        let raw = match find_unescaped(first.content, ':') {
            Some(idx) => trim_token(&first.content[idx + 1..]),
            None => first.content,
        };
        if raw == "null" {
            return Ok(None);
        }
        match target {
            TypeInfo::Scalar(scalar) => self.convert_scalar(&unescape(raw), &scalar, "", first.number),
            other => Err(Error::format_at(
                first.number,
                format!(
                    "expected a header for {} `{}`, found a scalar line",
                    other.shape(),
                    other.type_name()
                ),
            )),
        }
    }

    /// Number of lines owned by the node starting at `start`.
    fn extent(&self, start: usize) -> usize {
        let indent = self.lines[start].indent;
        1 + self.lines[start + 1..]
            .iter()
            .take_while(|line| line.indent > indent)
            .count()
    }

    fn check_depth(&self, depth: usize, line: usize) -> Result<()> {
        if depth > self.options.max_depth {
            return Err(Error::format_at(
                line,
                format!("nesting exceeds the maximum depth of {}", self.options.max_depth),
            ));
        }
        Ok(())
    }

    /// Decodes the node headed by line `start`; returns the value and the lines consumed.
    fn parse_node(
        &self,
        header: Header<'a>,
        start: usize,
        target: TypeInfo,
        depth: usize,
    ) -> Result<(Decoded, usize)> {
        let line = self.lines[start].number;
        self.check_depth(depth, line)?;
        match header {
            Header::Collection { name, size, fields } => match target {
                TypeInfo::Collection(info) => {
                    self.parse_collection(name, size, &fields, start, &info, depth)
                }
                other => Err(Error::format_at(
                    line,
                    format!(
                        "cannot resolve an element type for collection `{}`: target `{}` is a {}",
                        name,
                        other.type_name(),
                        other.shape()
                    ),
                )),
            },
            Header::Record { name } => match target {
                TypeInfo::Record(info) => self.parse_record(start, &info, depth),
                other => Err(Error::format_at(
                    line,
                    format!(
                        "record `{}` cannot be decoded into {} `{}`",
                        name,
                        other.shape(),
                        other.type_name()
                    ),
                )),
            },
        }
    }

    fn parse_collection(
        &self,
        name: &str,
        size: usize,
        fields: &[FieldMeta],
        start: usize,
        info: &CollectionInfo,
        depth: usize,
    ) -> Result<(Decoded, usize)> {
        let header_line = self.lines[start].number;
        let element_indent = self.lines[start].indent + 1;
        let element = info.element();
        let columns: Vec<&str> = fields
            .iter()
            .filter(|f| !f.marker)
            .map(|f| f.path.as_str())
            .collect();
        log::trace!(
            "line {}: collection `{}` of {} declares {} elements",
            header_line,
            name,
            element.type_name(),
            size
        );

        let end = start + self.extent(start);
        let mut items = Vec::with_capacity(size.min(end - start));
        let mut idx = start + 1;
        while idx < end {
            let line = self.lines[idx];
            if line.indent != element_indent {
                return Err(Error::format_at(
                    line.number,
                    format!("element of `{}` is not indented one level below its header", name),
                ));
            }
            let used = self.extent(idx);
            let text = trim_token(strip_terminator(line.content));
            let item = match &element {
                TypeInfo::Scalar(scalar) => {
                    if used > 1 {
                        return Err(Error::format_at(
                            self.lines[idx + 1].number,
                            "a scalar element cannot have indented lines",
                        ));
                    }
                    if text == "null" {
                        Decoded::Null
                    } else {
                        self.convert_scalar(&unescape(text), scalar, name, line.number)?
                            .unwrap_or(Decoded::Null)
                    }
                }
                TypeInfo::Collection(nested) => {
                    self.parse_sublist(text, nested, name, line.number, depth + 1)?
                }
                // A lone `null` is a null element unless it can be the only cell.
                TypeInfo::Record(_) if text == "null" && used == 1 && columns.len() != 1 => {
                    Decoded::Null
                }
                TypeInfo::Record(record) => {
                    self.parse_row(text, &columns, record, idx, used, depth + 1)?
                }
            };
            items.push(item);
            idx += used;
        }

        if items.len() != size {
            return Err(Error::format_at(
                header_line,
                format!(
                    "collection `{}` declares {} elements but {} were found",
                    name,
                    size,
                    items.len()
                ),
            ));
        }
        Ok((Decoded::Collection(items), end - start))
    }

    /// Builds one record element from its row and any nested blocks below it.
    fn parse_row(
        &self,
        text: &str,
        columns: &[&str],
        info: &RecordInfo,
        idx: usize,
        used: usize,
        depth: usize,
    ) -> Result<Decoded> {
        let line = self.lines[idx];
        self.check_depth(depth, line.number)?;
        let cells = if columns.is_empty() && text.is_empty() {
            Vec::new()
        } else {
            split_cells(text)
                .ok_or_else(|| Error::format_at(line.number, "unbalanced parentheses in row"))?
        };
        if cells.len() != columns.len() {
            return Err(Error::format_at(
                line.number,
                format!(
                    "row has {} values but the header declares {} fields",
                    cells.len(),
                    columns.len()
                ),
            ));
        }

        let mut fields = FieldMap::new();
        for (path, cell) in columns.iter().zip(cells) {
            if !fields.insert_path(path, trim_token(cell)) {
                return Err(Error::format_at(
                    line.number,
                    format!("header path `{}` conflicts with another column", path),
                ));
            }
        }

        // Nested blocks: headers one level below the row, named by field.
        let mut child = idx + 1;
        while child < idx + used {
            let nested = self.lines[child];
            let span = self.extent(child);
            if nested.indent == line.indent + 1 {
                if let Some(header) = Header::parse(nested.content, nested.number)? {
                    let field = header.name();
                    match info.field_type(field)? {
                        Some(ty) => {
                            let (decoded, _) = self.parse_node(header, child, ty, depth + 1)?;
                            fields.insert(field, Pending::Parsed(decoded));
                        }
                        None => log::warn!(
                            "line {}: skipping block `{}` unknown to `{}`",
                            nested.number,
                            field,
                            info.type_name()
                        ),
                    }
                    child += span;
                    continue;
                }
            }
            return Err(Error::format_at(
                nested.number,
                "expected a nested header below the element row",
            ));
        }

        self.instantiate(info, fields, line.number, depth)
    }

    fn parse_record(&self, start: usize, info: &RecordInfo, depth: usize) -> Result<(Decoded, usize)> {
        let field_indent = self.lines[start].indent + 1;
        let end = start + self.extent(start);
        log::trace!(
            "line {}: record `{}`",
            self.lines[start].number,
            info.type_name()
        );

        let mut fields = FieldMap::new();
        let mut idx = start + 1;
        while idx < end {
            let line = self.lines[idx];
            if line.indent != field_indent {
                return Err(Error::format_at(
                    line.number,
                    "field line is not indented one level below its record header",
                ));
            }
            let used = self.extent(idx);

            if let Some(header) = Header::parse(line.content, line.number)? {
                let name = header.name();
                self.parse_field_node(header, name, idx, info, &mut fields, depth)?;
                idx += used;
                continue;
            }

            let colon = find_unescaped(line.content, ':').ok_or_else(|| {
                Error::format_at(line.number, "expected `field: value` or a nested header")
            })?;
            let name = line.content[..colon].trim();
            let raw = trim_token(&line.content[colon + 1..]);

            if let Some(header) = Header::parse(raw, line.number)? {
                self.parse_field_node(header, name, idx, info, &mut fields, depth)?;
                idx += used;
                continue;
            }
            if used > 1 {
                return Err(Error::format_at(
                    self.lines[idx + 1].number,
                    format!("field `{}` is a scalar but has indented lines", name),
                ));
            }
            fields.insert(name, Pending::Token(raw.to_string()));
            idx += 1;
        }

        let record = self.instantiate(info, fields, self.lines[start].number, depth)?;
        Ok((record, end - start))
    }

    fn parse_field_node(
        &self,
        header: Header<'a>,
        field: &str,
        idx: usize,
        info: &RecordInfo,
        fields: &mut FieldMap,
        depth: usize,
    ) -> Result<()> {
        match info.field_type(field)? {
            Some(ty) => {
                let (decoded, _) = self.parse_node(header, idx, ty, depth + 1)?;
                fields.insert(field, Pending::Parsed(decoded));
            }
            None => log::warn!(
                "line {}: skipping nested node `{}` unknown to `{}`",
                self.lines[idx].number,
                field,
                info.type_name()
            ),
        }
        Ok(())
    }

    /// Constructs a record and applies every collected field in declared order.
    fn instantiate(
        &self,
        info: &RecordInfo,
        mut fields: FieldMap,
        line: usize,
        depth: usize,
    ) -> Result<Decoded> {
        self.check_depth(depth, line)?;
        let mut record = info.construct()?;
        for field in ordered_fields_checked(info)?.iter() {
            let Some(pending) = fields.remove(field.name) else {
                continue;
            };
            let value = match pending {
                Pending::Parsed(decoded) => Some(decoded),
                Pending::Token(raw) => {
                    self.convert_token(&raw, field.type_info(), field.name, line, depth + 1)?
                }
                Pending::Group(group) => match field.type_info() {
                    TypeInfo::Record(nested) if group.is_all_null() => {
                        log::trace!("line {}: `{}` of `{}` is null", line, field.name, nested.type_name());
                        None
                    }
                    TypeInfo::Record(nested) => {
                        Some(self.instantiate(&nested, group, line, depth + 1)?)
                    }
                    other => {
                        return Err(Error::format_at(
                            line,
                            format!(
                                "field `{}` is a {} but the header nests fields below it",
                                field.name,
                                other.shape()
                            ),
                        ))
                    }
                },
            };
            if let Some(value) = value.filter(|v| !v.is_null()) {
                record.set_field(field.name, value)?;
            }
        }

        if !fields.is_empty() {
            for unknown in fields.keys() {
                log::warn!(
                    "line {}: ignoring field `{}` unknown to `{}`",
                    line,
                    unknown,
                    info.type_name()
                );
            }
        }
        Ok(Decoded::Record(record))
    }

    /// Converts one raw (escaped) token against a declared type; `None` means absent.
    fn convert_token(
        &self,
        raw: &str,
        ty: TypeInfo,
        field: &str,
        line: usize,
        depth: usize,
    ) -> Result<Option<Decoded>> {
        let raw = trim_token(raw);
        if raw == "null" {
            return Ok(None);
        }
        match ty {
            TypeInfo::Scalar(scalar) => self.convert_scalar(&unescape(raw), &scalar, field, line),
            _ if raw.is_empty() => Ok(None),
            TypeInfo::Collection(info) => self
                .parse_sublist(raw, &info, field, line, depth)
                .map(Some),
            TypeInfo::Record(info) => self.parse_group(raw, &info, field, line, depth).map(Some),
        }
    }

    /// Converts unescaped text to a scalar; empty text that fails to convert is absent.
    fn convert_scalar(
        &self,
        text: &str,
        info: &ScalarInfo,
        field: &str,
        line: usize,
    ) -> Result<Option<Decoded>> {
        let parsed = match self.registry.find_converter(info) {
            Some(converter) => converter.parse(text, info).map_err(|e| e.in_field(field)),
            None => {
                let parsed = match info.kind() {
                    ScalarKind::Primitive { parse, .. } => parse(text),
                    ScalarKind::Enum { from_name, .. } => from_name(text),
                    ScalarKind::Opaque => {
                        return Err(Error::reflection(
                            info.type_name(),
                            format!("no converter registered (field `{}`, line {})", field, line),
                        ))
                    }
                };
                parsed.ok_or_else(|| Error::type_convert(field, info.type_name(), text))
            }
        };
        match parsed {
            Ok(value) => Ok(Some(Decoded::Scalar(value))),
            Err(_) if text.is_empty() => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Parses a `(item,item,...)` collection value from inside a row.
    fn parse_sublist(
        &self,
        raw: &str,
        info: &CollectionInfo,
        field: &str,
        line: usize,
        depth: usize,
    ) -> Result<Decoded> {
        self.check_depth(depth, line)?;
        if raw == "null" {
            return Ok(Decoded::Null);
        }
        let inner = strip_parens(raw)
            .ok_or_else(|| Error::type_convert(field, info.type_name(), raw))?;
        let items = if inner.trim().is_empty() {
            Vec::new()
        } else {
            split_cells(inner)
                .ok_or_else(|| Error::format_at(line, "unbalanced parentheses in row"))?
        };

        let element = info.element();
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            let decoded = self
                .convert_token(item, element, field, line, depth + 1)?
                .unwrap_or(Decoded::Null);
            out.push(decoded);
        }
        Ok(Decoded::Collection(out))
    }

    /// Parses a `(leaf,leaf,...)` record value from inside a row.
    fn parse_group(
        &self,
        raw: &str,
        info: &RecordInfo,
        field: &str,
        line: usize,
        depth: usize,
    ) -> Result<Decoded> {
        self.check_depth(depth, line)?;
        let inner = strip_parens(raw)
            .ok_or_else(|| Error::type_convert(field, info.type_name(), raw))?;
        let columns: Vec<String> = flatten_fields(info, self.options.max_depth)?
            .into_iter()
            .filter(|f| !f.marker)
            .map(|f| f.path)
            .collect();
        let cells = if columns.is_empty() && inner.trim().is_empty() {
            Vec::new()
        } else {
            split_cells(inner)
                .ok_or_else(|| Error::format_at(line, "unbalanced parentheses in row"))?
        };
        if cells.len() != columns.len() {
            return Err(Error::format_at(
                line,
                format!(
                    "nested `{}` has {} values but `{}` has {} fields",
                    field,
                    cells.len(),
                    info.type_name(),
                    columns.len()
                ),
            ));
        }

        let mut fields = FieldMap::new();
        for (path, cell) in columns.iter().zip(cells) {
            fields.insert_path(path, trim_token(cell));
        }
        if fields.is_all_null() {
            return Ok(Decoded::Null);
        }
        self.instantiate(info, fields, line, depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{toon_enum, toon_record, FnConverter};
    use serde::{Deserialize, Serialize};
    use std::collections::BTreeSet;

    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    enum Role {
        Admin,
        Guest,
    }
    toon_enum!(Role);

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
        struct User {
            #[toon(order = 1)]
            id: i32,
            #[toon(order = 2)]
            name: Option<String>,
            #[toon(order = 3)]
            address: Option<Address>,
            #[toon(order = 4)]
            roles: Vec<Role>,
        }
    }

    fn decode<T: Toon>(text: &str) -> Result<Option<T>> {
        Deserializer::default().deserialize::<T>(text)
    }

    #[test]
    fn test_indent_level() {
        assert_eq!(indent_level("name: x"), 0);
        assert_eq!(indent_level("  name: x"), 1);
        assert_eq!(indent_level("   name: x"), 1);
        assert_eq!(indent_level("    name: x"), 2);
        assert_eq!(indent_level("\tname: x"), 0);
    }

    #[test]
    fn test_split_lines_drops_blanks_and_keeps_numbers() {
        let lines = split_lines("a{x}: \n\n  x: 1\n   \n");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].number, 3);
        assert_eq!(lines[1].indent, 1);
        assert_eq!(lines[1].content, "x: 1");
    }

    #[test]
    fn test_header_classification() {
        match Header::parse("users(2){id#key,name}:", 1).unwrap() {
            Some(Header::Collection { name, size, fields }) => {
                assert_eq!(name, "users");
                assert_eq!(size, 2);
                assert_eq!(fields.len(), 2);
                assert_eq!(fields[0].path, "id");
            }
            other => panic!("expected collection header, got {:?}", other),
        }
        assert!(matches!(
            Header::parse("user{id,name}:", 1).unwrap(),
            Some(Header::Record { name: "user" })
        ));
        assert!(Header::parse("name: Bob", 1).unwrap().is_none());
        assert!(Header::parse("x\\{a\\}:", 1).unwrap().is_none());
    }

    #[test]
    fn test_field_list_parsing() {
        let fields = parse_field_list("id#the\\, key,address[$object]#home,address.city, ");
        assert_eq!(
            fields,
            vec![
                FieldMeta {
                    path: "id".into(),
                    marker: false
                },
                FieldMeta {
                    path: "address".into(),
                    marker: true
                },
                FieldMeta {
                    path: "address.city".into(),
                    marker: false
                },
            ]
        );

        let trailing = parse_field_list("address#home[$object],address.city#town");
        assert!(trailing[0].marker);
        assert_eq!(trailing[0].path, "address");
        assert!(!trailing[1].marker);
        assert_eq!(trailing[1].path, "address.city");
    }

    #[test]
    fn test_blank_input_is_none() {
        assert!(decode::<User>("").unwrap().is_none());
        assert!(decode::<Vec<User>>(" \n\n ").unwrap().is_none());
    }

    #[test]
    fn test_null_root_is_none() {
        assert!(decode::<User>("user: null").unwrap().is_none());
        assert!(decode::<Vec<User>>("users: null").unwrap().is_none());
    }

    #[test]
    fn test_users_example() {
        let users = decode::<Vec<User>>("users(2){id,name}: \n  1,Alice;\n  2,Bo\\,b;")
            .unwrap()
            .unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].name.as_deref(), Some("Alice"));
        assert_eq!(users[1].name.as_deref(), Some("Bo,b"));
        assert!(users[1].address.is_none());
    }

    #[test]
    fn test_size_mismatch_is_format_error() {
        let err = decode::<Vec<User>>("users(3){id,name}: \n  1,Alice;\n  2,Bob;").unwrap_err();
        match err {
            Error::Format { line, msg } => {
                assert_eq!(line, Some(1));
                assert!(msg.contains("`users`"));
                assert!(msg.contains("declares 3"));
                assert!(msg.contains("2 were found"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_row_width_mismatch() {
        let err = decode::<Vec<User>>("users(1){id,name}: \n  1;").unwrap_err();
        assert!(matches!(err, Error::Format { line: Some(2), .. }));
    }

    #[test]
    fn test_collection_header_into_record_target() {
        let err = decode::<User>("users(1){id}: \n  1;").unwrap_err();
        assert!(matches!(err, Error::Format { ref msg, .. } if msg.contains("element type")));
    }

    #[test]
    fn test_scalar_line_into_record_target() {
        let err = decode::<User>("user: 42").unwrap_err();
        assert!(matches!(err, Error::Format { .. }));
    }

    #[test]
    fn test_numeric_parse_error_names_field() {
        let err = decode::<User>("user{id}: \n  id: abc").unwrap_err();
        match err {
            Error::TypeConvert {
                field,
                target,
                value,
            } => {
                assert_eq!(field, "id");
                assert_eq!(target, "i32");
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_record_fields_in_any_order_and_unknown_ignored() {
        let text = "user{id,name}: \n  nickname: zed\n  name: Zed\n  id: 5";
        let user = decode::<User>(text).unwrap().unwrap();
        assert_eq!(user.id, 5);
        assert_eq!(user.name.as_deref(), Some("Zed"));
    }

    #[test]
    fn test_nested_record_and_enum_collection() {
        let text = "user{id,name,address,roles}: \n  id: 1\n  name: null\n  address{street,city}: \n    street: 1 Main St\\, Apt 4\n    city: Springfield\n  roles(2){}: \n    Admin;\n    Guest;";
        let user = decode::<User>(text).unwrap().unwrap();
        assert_eq!(user.name, None);
        assert_eq!(
            user.address,
            Some(Address {
                street: "1 Main St, Apt 4".into(),
                city: "Springfield".into()
            })
        );
        assert_eq!(user.roles, vec![Role::Admin, Role::Guest]);
    }

    #[test]
    fn test_field_value_header_form() {
        let text = "user{id,address}: \n  id: 1\n  address: address{street,city}: \n    street: Elm\n    city: Oslo";
        let user = decode::<User>(text).unwrap().unwrap();
        assert_eq!(user.address.unwrap().city, "Oslo");
    }

    #[test]
    fn test_flattened_rows_with_nested_records() {
        let text = "users(2){id,name,address[$object],address.street,address.city,roles}: \n  1,Ann,Elm,Oslo,(Admin);\n  2,null,null,null,();";
        let users = decode::<Vec<User>>(text).unwrap().unwrap();
        assert_eq!(users[0].address.as_ref().unwrap().street, "Elm");
        assert_eq!(users[0].roles, vec![Role::Admin]);
        assert_eq!(users[1].name, None);
        assert_eq!(users[1].address, None);
        assert!(users[1].roles.is_empty());
    }

    #[test]
    fn test_marker_after_comment() {
        let text = "users(1){id,name,address#home[$object],address.street,address.city#town,roles}: \n  1,Ann,Elm,Oslo,();";
        let users = decode::<Vec<User>>(text).unwrap().unwrap();
        assert_eq!(users[0].address.as_ref().unwrap().city, "Oslo");
    }

    #[test]
    fn test_null_record_elements() {
        let text = "addresses(3){street,city}: \n  Elm,Oslo;\n  null;\n  null,null;";
        let addresses = decode::<Vec<Option<Address>>>(text).unwrap().unwrap();
        assert_eq!(addresses[1], None);
        assert_eq!(addresses[2], Some(Address::default()));

        // with one column, `null` is the only cell of a record
        toon_record! {
            #[derive(Debug, Default, PartialEq)]
            struct Tag {
                #[toon(order = 1)]
                label: Option<String>,
            }
        }
        let tags = decode::<Vec<Option<Tag>>>("tags(1){label}: \n  null;")
            .unwrap()
            .unwrap();
        assert_eq!(tags, vec![Some(Tag { label: None })]);
    }

    #[test]
    fn test_parenthesized_nested_record_cell() {
        let text = "users(1){id,name,address,roles}: \n  1,Ann,(Elm,Oslo),();";
        let users = decode::<Vec<User>>(text).unwrap().unwrap();
        assert_eq!(users[0].address.as_ref().unwrap().city, "Oslo");
    }

    #[test]
    fn test_nested_block_below_row() {
        let text = "users(2){id,name,address,roles}: \n  1,Ann,,();\n    address{street,city}: \n      street: Elm\n      city: Oslo\n  2,Bob,,();";
        let users = decode::<Vec<User>>(text).unwrap().unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].address.as_ref().unwrap().city, "Oslo");
        assert_eq!(users[1].address, None);
    }

    #[test]
    fn test_scalar_collections_and_sets() {
        let tags = decode::<Vec<String>>("tags(3){}: \n  a\\;b;\n  ;\n  c,d;");
        // an unescaped comma inside a scalar element is kept as text
        assert_eq!(
            tags.unwrap().unwrap(),
            vec!["a;b".to_string(), String::new(), "c,d".to_string()]
        );

        let set = decode::<BTreeSet<i32>>("ids(3){}: \n  2;\n  1;\n  2;")
            .unwrap()
            .unwrap();
        assert_eq!(set.into_iter().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_nested_collection_elements() {
        let grid = decode::<Vec<Vec<i32>>>("grid(3){}: \n  (1,2);\n  ();\n  (3);")
            .unwrap()
            .unwrap();
        assert_eq!(grid, vec![vec![1, 2], vec![], vec![3]]);
    }

    #[test]
    fn test_deeper_stray_line_is_error() {
        let err = decode::<User>("user{id}: \n  id: 1\n      oops: 2").unwrap_err();
        assert!(matches!(err, Error::Format { line: Some(3), .. }));
    }

    #[test]
    fn test_trailing_root_content_is_error() {
        let err = decode::<User>("user{id}: \n  id: 1\nother: 2").unwrap_err();
        assert!(matches!(err, Error::Format { line: Some(3), .. }));
    }

    #[test]
    fn test_field_line_without_colon() {
        let err = decode::<User>("user{id}: \n  id 1").unwrap_err();
        assert!(matches!(err, Error::Format { line: Some(2), .. }));
    }

    #[test]
    fn test_custom_converter_applies_on_decode() {
        let mut de = Deserializer::default();
        de.add_converter(FnConverter::<i32>::new(
            |n| n.to_string(),
            |text| text.strip_prefix('#').and_then(|n| n.parse().ok()),
        ));
        let user = de.deserialize::<User>("user{id}: \n  id: #12").unwrap().unwrap();
        assert_eq!(user.id, 12);
    }

    #[test]
    fn test_depth_limit_on_decode() {
        let de = Deserializer::new(ToonOptions::new().with_max_depth(0));
        let err = de
            .deserialize::<User>("user{address}: \n  address{street}: \n    street: x")
            .unwrap_err();
        assert!(matches!(err, Error::Format { .. }));
    }
}
