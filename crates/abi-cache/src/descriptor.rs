//! The decoded binary-interface descriptor shape.
//!
//! An account's ABI describes the struct layout of every action and table
//! the account's contract defines, plus a set of type aliases. The wire
//! form stored on the `accounts` document's `abi` field is the descriptor's
//! own JSON serialization; decoding is therefore a parse, not a schema-less
//! guess, and a malformed payload fails cleanly rather than partially.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One field of a struct: name plus ABI type string (e.g. `"string"`,
/// `"uint64"`, `"asset[]"`, `"checksum256?"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbiField {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

/// A struct definition, optionally extending a base struct by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbiStruct {
    pub name: String,
    #[serde(default)]
    pub base: String,
    pub fields: Vec<AbiField>,
}

/// An action-name-to-struct-name binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbiActionDef {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

/// A type alias: `new_type_name` decodes exactly like `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbiTypeAlias {
    pub new_type_name: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

/// A decoded account ABI: the set of type aliases, structs, and actions a
/// contract account defines. Mirrors the on-chain ABI JSON schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AbiDescriptor {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub types: Vec<AbiTypeAlias>,
    #[serde(default)]
    pub structs: Vec<AbiStruct>,
    #[serde(default)]
    pub actions: Vec<AbiActionDef>,
}

impl AbiDescriptor {
    /// Resolves a type alias chain down to its underlying type name.
    /// Stops after `types.len()` hops to guard against a cyclic alias.
    pub fn resolve_type_alias<'a>(&'a self, type_name: &'a str) -> &'a str {
        let mut current = type_name;
        for _ in 0..self.types.len() {
            match self.types.iter().find(|t| t.new_type_name == current) {
                Some(alias) => current = &alias.type_name,
                None => return current,
            }
        }
        current
    }

    pub fn find_struct(&self, name: &str) -> Option<&AbiStruct> {
        self.structs.iter().find(|s| s.name == name)
    }

    pub fn find_action_struct(&self, action_name: &str) -> Option<&AbiStruct> {
        let action = self.actions.iter().find(|a| a.name == action_name)?;
        let resolved = self.resolve_type_alias(&action.type_name);
        self.find_struct(resolved)
    }

    /// Every field of `struct_name`, walking the base-struct chain from the
    /// root outward so inherited fields appear before the struct's own.
    pub fn flattened_fields(&self, struct_name: &str) -> Option<Vec<&AbiField>> {
        let mut chain = Vec::new();
        let mut current = self.find_struct(struct_name)?;
        loop {
            chain.push(current);
            if current.base.is_empty() {
                break;
            }
            current = self.find_struct(&current.base)?;
        }
        let mut fields = Vec::new();
        for s in chain.into_iter().rev() {
            fields.extend(s.fields.iter());
        }
        Some(fields)
    }
}

/// Decodes an account's stored `abi` bytes (the descriptor's own JSON
/// serialization) into an [`AbiDescriptor`]. Returns `None` on any
/// malformed payload — a decode failure caches nothing and leaves the
/// affected field in opaque byte form upstream.
pub fn decode_descriptor_bytes(raw: &[u8]) -> Option<AbiDescriptor> {
    serde_json::from_slice(raw).ok()
}

/// Re-encodes a descriptor back to the JSON bytes form stored on an
/// `accounts` document. Used when seeding the system account's bootstrap
/// ABI and when persisting a freshly observed `setabi`.
pub fn encode_descriptor(descriptor: &AbiDescriptor) -> Value {
    serde_json::to_value(descriptor).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AbiDescriptor {
        AbiDescriptor {
            version: "eosio::abi/1.1".to_string(),
            types: vec![AbiTypeAlias {
                new_type_name: "account_name".to_string(),
                type_name: "name".to_string(),
            }],
            structs: vec![
                AbiStruct {
                    name: "base_row".to_string(),
                    base: String::new(),
                    fields: vec![AbiField {
                        name: "id".to_string(),
                        type_name: "uint64".to_string(),
                    }],
                },
                AbiStruct {
                    name: "actor_blacklist".to_string(),
                    base: "base_row".to_string(),
                    fields: vec![AbiField {
                        name: "accounts".to_string(),
                        type_name: "string[]".to_string(),
                    }],
                },
            ],
            actions: vec![AbiActionDef {
                name: "setblklst".to_string(),
                type_name: "actor_blacklist".to_string(),
            }],
        }
    }

    #[test]
    fn decode_rejects_malformed_json() {
        assert!(decode_descriptor_bytes(b"not json").is_none());
    }

    #[test]
    fn decode_round_trips_through_encode() {
        let descriptor = sample();
        let bytes = serde_json::to_vec(&descriptor).unwrap();
        let decoded = decode_descriptor_bytes(&bytes).unwrap();
        assert_eq!(decoded, descriptor);
    }

    #[test]
    fn resolve_type_alias_follows_one_hop() {
        let descriptor = sample();
        assert_eq!(descriptor.resolve_type_alias("account_name"), "name");
        assert_eq!(descriptor.resolve_type_alias("uint64"), "uint64");
    }

    #[test]
    fn flattened_fields_includes_base_struct_fields_first() {
        let descriptor = sample();
        let fields = descriptor.flattened_fields("actor_blacklist").unwrap();
        let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["id", "accounts"]);
    }

    #[test]
    fn find_action_struct_resolves_through_the_actions_table() {
        let descriptor = sample();
        let found = descriptor.find_action_struct("setblklst").unwrap();
        assert_eq!(found.name, "actor_blacklist");
    }
}
