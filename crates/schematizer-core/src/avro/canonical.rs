// crates/schematizer-core/src/avro/canonical.rs
// ============================================================================
// Module: Avro Canonical Form
// Description: Normalization of validated Avro schemas for equality checks.
// Purpose: Make semantically identical schemas compare equal as strings.
// Dependencies: crate::avro::schema, crate::core::hashing, serde_json
// ============================================================================

//! ## Overview
//! Canonicalization rewrites a validated schema so that formatting and
//! spelling choices disappear:
//! - named types carry their fullname in `name` and drop `namespace`, except
//!   for an explicit `""` under a namespaced parent;
//! - references to named types become the fullname string;
//! - `{"type": "<name>"}` without other attributes collapses to `"<name>"`;
//! - the result is serialized as RFC 8785 JSON (sorted keys, no whitespace).
//!
//! Array order (fields, union branches, enum symbols) is significant and kept.
//! Non-structural attributes (`doc`, `default`, metadata) are preserved, so
//! two schemas differing only in documentation are distinct versions.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use serde_json::Map;
use serde_json::Value;

use crate::avro::schema::AvroSchema;
use crate::avro::schema::declared_namespace;
use crate::avro::schema::is_primitive;
use crate::avro::schema::qualify;
use crate::avro::schema::resolve_reference;
use crate::core::hashing::DEFAULT_HASH_ALGORITHM;
use crate::core::hashing::HashDigest;
use crate::core::hashing::canonical_json_string;
use crate::core::hashing::hash_bytes;

// ============================================================================
// SECTION: Canonical Schema
// ============================================================================

/// Canonical text of a schema plus its digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalSchema {
    /// Canonical document text.
    pub text: String,
    /// Digest of `text` under the default hash algorithm.
    pub digest: HashDigest,
}

impl AvroSchema {
    /// Returns the canonical form of this schema.
    #[must_use]
    pub fn canonical_form(&self) -> CanonicalSchema {
        canonicalize(self)
    }
}

/// Canonicalizes a validated schema.
///
/// Total: every [`AvroSchema`] has exactly one canonical form.
#[must_use]
pub fn canonicalize(schema: &AvroSchema) -> CanonicalSchema {
    let mut walker = Canonicalizer::default();
    let normalized = walker.node(schema.document(), "");
    // serde_json values only hold finite numbers, so JCS cannot reject them;
    // the compact BTreeMap rendering is already key-sorted.
    let text = canonical_json_string(&normalized).unwrap_or_else(|_| normalized.to_string());
    let digest = hash_bytes(DEFAULT_HASH_ALGORITHM, text.as_bytes());
    CanonicalSchema {
        text,
        digest,
    }
}

// ============================================================================
// SECTION: Walker
// ============================================================================

/// Rewrites schema nodes, tracking named definitions already emitted.
#[derive(Debug, Default)]
struct Canonicalizer {
    /// Fullnames defined so far.
    defined: BTreeSet<String>,
}

impl Canonicalizer {
    /// Canonicalizes one schema node.
    fn node(&mut self, node: &Value, namespace: &str) -> Value {
        match node {
            Value::String(name) => Value::String(self.reference(name, namespace)),
            Value::Array(branches) => {
                Value::Array(branches.iter().map(|branch| self.node(branch, namespace)).collect())
            }
            Value::Object(object) => self.object(object, namespace),
            other => other.clone(),
        }
    }

    /// Resolves a primitive or named reference to its canonical spelling.
    fn reference(&self, name: &str, namespace: &str) -> String {
        if is_primitive(name) {
            return name.to_string();
        }
        resolve_reference(name, namespace, &|candidate| self.defined.contains(candidate))
            .unwrap_or_else(|| name.to_string())
    }

    /// Canonicalizes an object-form node.
    fn object(&mut self, object: &Map<String, Value>, namespace: &str) -> Value {
        let Some(type_value) = object.get("type") else {
            return Value::Object(object.clone());
        };
        let Value::String(type_name) = type_value else {
            let mut out = object.clone();
            out.insert("type".to_string(), self.node(type_value, namespace));
            return collapse(out);
        };
        match type_name.as_str() {
            "record" | "error" | "enum" | "fixed" => self.named(object, namespace),
            "array" => self.with_child(object, "items", namespace),
            "map" => self.with_child(object, "values", namespace),
            other => {
                let mut out = object.clone();
                out.insert("type".to_string(), Value::String(self.reference(other, namespace)));
                collapse(out)
            }
        }
    }

    /// Canonicalizes a complex type with a single child schema attribute.
    fn with_child(&mut self, object: &Map<String, Value>, key: &str, namespace: &str) -> Value {
        let mut out = object.clone();
        if let Some(child) = object.get(key) {
            out.insert(key.to_string(), self.node(child, namespace));
        }
        Value::Object(out)
    }

    /// Canonicalizes a named type definition.
    fn named(&mut self, object: &Map<String, Value>, namespace: &str) -> Value {
        let name = object.get("name").and_then(Value::as_str).unwrap_or_default();
        let (fullname, type_ns) = qualify(name, declared_namespace(object, namespace));
        self.defined.insert(fullname.clone());
        let mut out = object.clone();
        out.remove("namespace");
        // A null-namespace name nested under a namespace would otherwise
        // inherit the enclosing namespace when the output is parsed again.
        if type_ns.is_empty() && !namespace.is_empty() {
            out.insert("namespace".to_string(), Value::String(String::new()));
        }
        out.insert("name".to_string(), Value::String(fullname));
        if let Some(Value::Array(fields)) = object.get("fields") {
            let fields = fields.iter().map(|field| self.field(field, &type_ns)).collect();
            out.insert("fields".to_string(), Value::Array(fields));
        }
        Value::Object(out)
    }

    /// Canonicalizes a record field.
    fn field(&mut self, field: &Value, namespace: &str) -> Value {
        let Value::Object(field) = field else {
            return field.clone();
        };
        let mut out = field.clone();
        if let Some(field_type) = field.get("type") {
            out.insert("type".to_string(), self.node(field_type, namespace));
        }
        Value::Object(out)
    }
}

/// Collapses `{"type": "<name>"}` into the bare name.
fn collapse(object: Map<String, Value>) -> Value {
    if object.len() == 1
        && let Some(Value::String(name)) = object.get("type")
    {
        return Value::String(name.clone());
    }
    Value::Object(object)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions.")]

    use serde_json::json;

    use super::*;

    fn canonical(value: Value) -> String {
        canonicalize(&AvroSchema::parse(value).unwrap()).text
    }

    #[test]
    fn primitive_object_collapses() {
        assert_eq!(canonical(json!({"type": "int"})), "\"int\"");
    }

    #[test]
    fn logical_type_attributes_survive() {
        let text = canonical(json!({"type": "int", "logicalType": "date"}));
        assert_eq!(text, r#"{"logicalType":"date","type":"int"}"#);
    }

    #[test]
    fn namespace_folds_into_fullname() {
        let text = canonical(json!({
            "type": "record",
            "namespace": "com.acme",
            "name": "User",
            "fields": [{"name": "self", "type": ["null", "User"]}]
        }));
        assert_eq!(
            text,
            r#"{"fields":[{"name":"self","type":["null","com.acme.User"]}],"name":"com.acme.User","type":"record"}"#
        );
    }

    #[test]
    fn dotted_name_and_namespace_attribute_agree() {
        let dotted = canonical(json!({"type": "fixed", "name": "a.b.Hash", "size": 16}));
        let split = canonical(json!({"type": "fixed", "namespace": "a.b", "name": "Hash", "size": 16}));
        assert_eq!(dotted, split);
    }

    #[test]
    fn null_namespace_under_namespaced_parent_is_kept() {
        let text = canonical(json!({
            "type": "record",
            "name": "Outer",
            "namespace": "com.acme",
            "fields": [
                {"name": "h", "type": {"type": "fixed", "name": "H", "namespace": "", "size": 4}},
                {"name": "g", "type": "H"}
            ]
        }));
        assert_eq!(
            text,
            r#"{"fields":[{"name":"h","type":{"name":"H","namespace":"","size":4,"type":"fixed"}},{"name":"g","type":"H"}],"name":"com.acme.Outer","type":"record"}"#
        );
        let again: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(canonical(again), text);
    }
}
