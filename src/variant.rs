//! Serde bridge that reads the textual name of a unit enum variant.
//!
//! Enumerations take part in TOON through their serde representation, so a
//! `#[serde(rename = "...")]` on a variant also renames it in TOON text.
//! Anything other than a unit variant (or a plain string) is rejected.

use crate::{Error, Result};
use serde::ser::{self, Impossible};
use serde::Serialize;

pub(crate) struct VariantNameSerializer;

fn not_a_name() -> Error {
    Error::custom("only unit enum variants have a TOON name")
}

impl ser::Serializer for VariantNameSerializer {
    type Ok = String;
    type Error = Error;

    type SerializeSeq = Impossible<String, Error>;
    type SerializeTuple = Impossible<String, Error>;
    type SerializeTupleStruct = Impossible<String, Error>;
    type SerializeTupleVariant = Impossible<String, Error>;
    type SerializeMap = Impossible<String, Error>;
    type SerializeStruct = Impossible<String, Error>;
    type SerializeStructVariant = Impossible<String, Error>;

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<String> {
        Ok(variant.to_string())
    }

    fn serialize_str(self, v: &str) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<String>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_bool(self, _v: bool) -> Result<String> {
        Err(not_a_name())
    }

    fn serialize_i8(self, _v: i8) -> Result<String> {
        Err(not_a_name())
    }

    fn serialize_i16(self, _v: i16) -> Result<String> {
        Err(not_a_name())
    }

    fn serialize_i32(self, _v: i32) -> Result<String> {
        Err(not_a_name())
    }

    fn serialize_i64(self, _v: i64) -> Result<String> {
        Err(not_a_name())
    }

    fn serialize_u8(self, _v: u8) -> Result<String> {
        Err(not_a_name())
    }

    fn serialize_u16(self, _v: u16) -> Result<String> {
        Err(not_a_name())
    }

    fn serialize_u32(self, _v: u32) -> Result<String> {
        Err(not_a_name())
    }

    fn serialize_u64(self, _v: u64) -> Result<String> {
        Err(not_a_name())
    }

    fn serialize_f32(self, _v: f32) -> Result<String> {
        Err(not_a_name())
    }

    fn serialize_f64(self, _v: f64) -> Result<String> {
        Err(not_a_name())
    }

    fn serialize_char(self, _v: char) -> Result<String> {
        Err(not_a_name())
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<String> {
        Err(not_a_name())
    }

    fn serialize_none(self) -> Result<String> {
        Err(not_a_name())
    }

    fn serialize_some<T>(self, _value: &T) -> Result<String>
    where
        T: ?Sized + Serialize,
    {
        Err(not_a_name())
    }

    fn serialize_unit(self) -> Result<String> {
        Err(not_a_name())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<String> {
        Err(not_a_name())
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<String>
    where
        T: ?Sized + Serialize,
    {
        Err(not_a_name())
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Err(not_a_name())
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Err(not_a_name())
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Err(not_a_name())
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(not_a_name())
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(not_a_name())
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Err(not_a_name())
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(not_a_name())
    }
}
