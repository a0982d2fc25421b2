//! Field metadata for record types.
//!
//! A record is any type implementing [`Record`]: it names its fields with a
//! sort order and an optional comment, reads and writes them by name, and may
//! inherit the fields of a parent record. The [`toon_record!`](crate::toon_record)
//! macro writes the impl for ordinary structs.
//!
//! [`ordered_fields`] merges a type's own fields with its ancestors', sorts
//! them, and caches the result for the life of the process.
//!
//! ## Examples
//!
//! ```rust
//! use toon_codec::{ordered_fields, toon_record, RecordInfo};
//!
//! toon_record! {
//!     #[derive(Debug, Default)]
//!     pub struct Entity {
//!         #[toon(order = 0)]
//!         pub id: i64,
//!     }
//! }
//!
//! toon_record! {
//!     #[derive(Debug, Default)]
//!     pub struct Account extends Entity as base {
//!         #[toon(order = 1, comment = "login")]
//!         pub login: String,
//!     }
//! }
//!
//! let names: Vec<_> = ordered_fields(&RecordInfo::of::<Account>())
//!     .iter()
//!     .map(|f| f.name)
//!     .collect();
//! assert_eq!(names, vec!["id", "login"]);
//! ```

use crate::value::{Decoded, Node, TypeInfo};
use crate::{Error, Result};
use once_cell::sync::Lazy;
use std::any::{type_name, Any, TypeId};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

const MAX_ANCESTRY: usize = 64;

/// Marker appended to a collection-header entry that announces a flattened nested record.
pub(crate) const OBJECT_MARKER: &str = "[$object]";

/// One serializable field of a record type.
#[derive(Clone, Copy)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub order: i32,
    pub comment: &'static str,
    ty: fn() -> TypeInfo,
}

impl FieldDescriptor {
    /// Describes a field; `ty` yields the declared type of the field.
    pub fn new(name: &'static str, order: i32, ty: fn() -> TypeInfo) -> Self {
        FieldDescriptor {
            name,
            order,
            comment: "",
            ty,
        }
    }

    #[must_use]
    pub fn with_comment(mut self, comment: &'static str) -> Self {
        self.comment = comment;
        self
    }

    /// The declared type of this field.
    pub fn type_info(&self) -> TypeInfo {
        (self.ty)()
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("order", &self.order)
            .field("comment", &self.comment)
            .finish()
    }
}

/// A type whose values encode as TOON records.
pub trait Record: Any {
    /// Fields declared directly on this type, in declaration order.
    fn declared_fields() -> Vec<FieldDescriptor>
    where
        Self: Sized;

    /// The record this type inherits fields from.
    fn parent() -> Option<RecordInfo>
    where
        Self: Sized,
    {
        None
    }

    /// Builds an empty value for the decoder to fill in.
    fn construct() -> Option<Self>
    where
        Self: Sized,
    {
        None
    }

    fn record_info(&self) -> RecordInfo;

    /// Reads a field (own or inherited) by name.
    fn field(&self, name: &str) -> Option<Node<'_>>;

    /// Writes a field (own or inherited) by name.
    fn set_field(&mut self, name: &str, value: Decoded) -> Result<()>;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

/// Type-erased handle on a [`Record`] implementation.
#[derive(Clone, Copy)]
pub struct RecordInfo {
    type_id: TypeId,
    type_name: &'static str,
    declared: fn() -> Vec<FieldDescriptor>,
    parent: fn() -> Option<RecordInfo>,
    construct: fn() -> Option<Box<dyn Record>>,
}

fn construct_boxed<T: Record>() -> Option<Box<dyn Record>> {
    T::construct().map(|r| Box::new(r) as Box<dyn Record>)
}

impl RecordInfo {
    pub fn of<T: Record>() -> Self {
        RecordInfo {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            declared: T::declared_fields,
            parent: T::parent,
            construct: construct_boxed::<T>,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn parent(&self) -> Option<RecordInfo> {
        (self.parent)()
    }

    /// Creates an empty instance through the type's zero-argument constructor.
    pub fn construct(&self) -> Result<Box<dyn Record>> {
        (self.construct)()
            .ok_or_else(|| Error::reflection(self.type_name, "no zero-argument constructor"))
    }

    /// The declared type of the named field, own or inherited.
    pub fn field_type(&self, name: &str) -> Result<Option<TypeInfo>> {
        Ok(ordered_fields_checked(self)?
            .iter()
            .find(|f| f.name == name)
            .map(FieldDescriptor::type_info))
    }
}

impl fmt::Debug for RecordInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordInfo({})", self.type_name)
    }
}

type FieldCache = RwLock<HashMap<TypeId, Arc<[FieldDescriptor]>>>;

static FIELD_CACHE: Lazy<FieldCache> = Lazy::new(|| RwLock::new(HashMap::new()));

/// All fields of a record type in serialization order.
///
/// Own fields come before inherited ones, the list is stable-sorted by
/// `order`, and a name shadowed by a nearer declaration appears once. The
/// result is cached per type; if two threads race on the first lookup both
/// compute the list and the first one stored wins.
///
/// A parent chain that loops yields the fields gathered before the loop; use
/// [`RecordInfo::field_type`] or the codecs to have it reported as an error.
pub fn ordered_fields(info: &RecordInfo) -> Arc<[FieldDescriptor]> {
    ordered_fields_checked(info).unwrap_or_else(|_| collect_fields(info).0.into())
}

pub(crate) fn ordered_fields_checked(info: &RecordInfo) -> Result<Arc<[FieldDescriptor]>> {
    if let Some(hit) = FIELD_CACHE
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&info.type_id)
    {
        return Ok(Arc::clone(hit));
    }

    let (fields, complete) = collect_fields(info);
    if !complete {
        return Err(Error::reflection(
            info.type_name,
            "parent chain loops or is deeper than 64 levels",
        ));
    }
    log::debug!(
        "caching {} ordered fields for `{}`",
        fields.len(),
        info.type_name
    );

    let fields: Arc<[FieldDescriptor]> = fields.into();
    let mut cache = FIELD_CACHE.write().unwrap_or_else(PoisonError::into_inner);
    Ok(Arc::clone(cache.entry(info.type_id).or_insert(fields)))
}

fn collect_fields(info: &RecordInfo) -> (Vec<FieldDescriptor>, bool) {
    let mut all = Vec::new();
    let mut seen_types = HashSet::new();
    let mut current = Some(*info);
    let mut complete = true;

    while let Some(record) = current {
        if !seen_types.insert(record.type_id) || seen_types.len() > MAX_ANCESTRY {
            complete = false;
            break;
        }
        all.extend((record.declared)());
        current = record.parent();
    }

    // Subtype fields come first, so the nearest declaration survives.
    let mut names = HashSet::new();
    all.retain(|f| names.insert(f.name));
    all.sort_by_key(|f| f.order);
    (all, complete)
}

/// One entry of a collection header: a leaf column or a nested-record marker.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FlatField {
    pub path: String,
    pub comment: &'static str,
    pub marker: bool,
}

/// Flattens a record's fields depth-first for a collection header.
///
/// Scalar and collection fields are leaf columns named by dotted path; a
/// record-typed field yields a marker entry followed by its own fields.
pub(crate) fn flatten_fields(info: &RecordInfo, max_depth: usize) -> Result<Vec<FlatField>> {
    let mut out = Vec::new();
    flatten_into(info, "", 0, max_depth, &mut out)?;
    Ok(out)
}

fn flatten_into(
    info: &RecordInfo,
    prefix: &str,
    depth: usize,
    max_depth: usize,
    out: &mut Vec<FlatField>,
) -> Result<()> {
    if depth > max_depth {
        return Err(Error::format(format!(
            "nested records of `{}` exceed the maximum depth of {}",
            info.type_name, max_depth
        )));
    }
    for field in ordered_fields_checked(info)?.iter() {
        let path = if prefix.is_empty() {
            field.name.to_string()
        } else {
            format!("{}.{}", prefix, field.name)
        };
        match field.type_info() {
            TypeInfo::Record(nested) => {
                out.push(FlatField {
                    path: path.clone(),
                    comment: field.comment,
                    marker: true,
                });
                flatten_into(&nested, &path, depth + 1, max_depth, out)?;
            }
            _ => out.push(FlatField {
                path,
                comment: field.comment,
                marker: false,
            }),
        }
    }
    Ok(())
}
