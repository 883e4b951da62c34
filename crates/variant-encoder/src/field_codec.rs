//! Decodes one ABI-typed field at a time from a [`BinaryReader`], given the
//! owning descriptor (for alias and array-element resolution).
//!
//! Any type this codec doesn't recognize aborts the whole decode by
//! returning `None` rather than guessing a byte width — a wrong guess would
//! silently desynchronize every field that follows it, which is worse than
//! falling back to the opaque form.

use std::time::Instant;

use serde_json::Value;

use abi_cache::AbiDescriptor;

use crate::binary_reader::BinaryReader;

/// Decodes `struct_name` field-by-field, aborting with `None` if `deadline`
/// passes before the struct (and any nested structs/arrays) finishes
/// decoding — the deserializer time budget configured at orchestrator
/// initialization.
pub fn decode_struct(descriptor: &AbiDescriptor, struct_name: &str, reader: &mut BinaryReader, deadline: Instant) -> Option<Value> {
    if Instant::now() >= deadline {
        return None;
    }
    let fields = descriptor.flattened_fields(struct_name)?;
    let mut object = serde_json::Map::new();
    for field in fields {
        let value = decode_field(descriptor, &field.type_name, reader, deadline)?;
        object.insert(field.name.clone(), value);
    }
    Some(Value::Object(object))
}

fn decode_field(descriptor: &AbiDescriptor, type_name: &str, reader: &mut BinaryReader, deadline: Instant) -> Option<Value> {
    if Instant::now() >= deadline {
        return None;
    }
    if let Some(inner) = type_name.strip_suffix("[]") {
        let count = reader.read_varuint32()?;
        let mut items = Vec::with_capacity((count as usize).min(reader.remaining()));
        for _ in 0..count {
            if Instant::now() >= deadline {
                return None;
            }
            items.push(decode_field(descriptor, inner, reader, deadline)?);
        }
        return Some(Value::Array(items));
    }
    if let Some(inner) = type_name.strip_suffix('?') {
        let present = reader.read_bool()?;
        return if present {
            decode_field(descriptor, inner, reader, deadline)
        } else {
            Some(Value::Null)
        };
    }

    let resolved = descriptor.resolve_type_alias(type_name);
    if resolved != type_name {
        return decode_field(descriptor, resolved, reader, deadline);
    }

    match resolved {
        "bool" => reader.read_bool().map(Value::Bool),
        "int8" | "uint8" => reader.read_u8().map(|v| Value::from(v)),
        "int16" | "uint16" => reader.read_u16_le().map(Value::from),
        "int32" | "uint32" | "varuint32" => reader.read_varuint32_or_fixed(resolved).map(Value::from),
        "int64" | "uint64" => reader.read_u64_le().map(Value::from),
        "string" => reader.read_string().map(Value::from),
        "bytes" => reader.read_bytes().map(|b| Value::from(hex::encode(b))),
        struct_name => decode_struct(descriptor, struct_name, reader, deadline),
    }
}

impl<'a> BinaryReader<'a> {
    /// `int32`/`uint32` are fixed 4-byte little-endian; `varuint32` is
    /// LEB128. Same decoded type, different wire width.
    fn read_varuint32_or_fixed(&mut self, type_name: &str) -> Option<u32> {
        if type_name == "varuint32" {
            self.read_varuint32()
        } else {
            self.read_u32_le()
        }
    }
}
