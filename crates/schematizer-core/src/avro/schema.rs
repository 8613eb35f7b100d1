// crates/schematizer-core/src/avro/schema.rs
// ============================================================================
// Module: Avro Schema Validation
// Description: Grammar validation for Avro schema documents.
// Purpose: Accept only well-formed Avro before canonicalization and storage.
// Dependencies: serde_json, thiserror
// ============================================================================

//! ## Overview
//! [`AvroSchema::parse`] walks a JSON document and enforces the Avro schema
//! grammar: primitive names, named types (`record`, `error`, `enum`, `fixed`)
//! with namespace resolution, complex types (`array`, `map`), unions, and
//! field defaults checked against the first union branch. A successfully
//! parsed [`AvroSchema`] is the only input the canonicalizer accepts.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Avro primitive type names.
pub const PRIMITIVE_TYPES: [&str; 8] =
    ["null", "boolean", "int", "long", "float", "double", "bytes", "string"];

/// Maximum nesting depth accepted while walking a schema.
const MAX_DEPTH: usize = 128;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Avro grammar violation, located by a JSON path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid avro schema at {path}: {reason}")]
pub struct AvroSchemaError {
    /// JSON path of the offending node (e.g. `$.fields[1].type`).
    pub path: String,
    /// Human-readable reason.
    pub reason: String,
}

impl AvroSchemaError {
    /// Builds an error for the given path.
    fn at(path: &str, reason: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

// ============================================================================
// SECTION: Validated Schema
// ============================================================================

/// Avro schema document that passed grammar validation.
#[derive(Debug, Clone, PartialEq)]
pub struct AvroSchema {
    /// Validated document, exactly as supplied.
    document: Value,
}

impl AvroSchema {
    /// Parses and validates Avro schema JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`AvroSchemaError`] when the text is not JSON or violates the
    /// Avro grammar.
    pub fn parse_str(text: &str) -> Result<Self, AvroSchemaError> {
        let document: Value = serde_json::from_str(text)
            .map_err(|err| AvroSchemaError::at("$", format!("malformed json: {err}")))?;
        Self::parse(document)
    }

    /// Validates an Avro schema document.
    ///
    /// # Errors
    ///
    /// Returns [`AvroSchemaError`] when the document violates the Avro grammar.
    pub fn parse(document: Value) -> Result<Self, AvroSchemaError> {
        let mut validator = Validator::default();
        validator.validate(&document, "", "$", 0)?;
        Ok(Self {
            document,
        })
    }

    /// Returns the validated document.
    #[must_use]
    pub const fn document(&self) -> &Value {
        &self.document
    }

    /// Consumes the schema and returns the validated document.
    #[must_use]
    pub fn into_document(self) -> Value {
        self.document
    }
}

// ============================================================================
// SECTION: Names
// ============================================================================

/// Returns true when `name` is a valid Avro simple name.
#[must_use]
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

/// Returns true when `namespace` is empty or a dotted sequence of valid names.
#[must_use]
pub fn is_valid_namespace(namespace: &str) -> bool {
    namespace.is_empty() || namespace.split('.').all(is_valid_name)
}

/// Returns true when `name` is an Avro primitive type name.
#[must_use]
pub fn is_primitive(name: &str) -> bool {
    PRIMITIVE_TYPES.contains(&name)
}

/// Resolves a declared name against an enclosing namespace.
///
/// Returns `(fullname, namespace)`; dotted names carry their own namespace.
pub(crate) fn qualify(name: &str, namespace: &str) -> (String, String) {
    if let Some((ns, _)) = name.rsplit_once('.') {
        return (name.to_string(), ns.to_string());
    }
    if namespace.is_empty() {
        (name.to_string(), String::new())
    } else {
        (format!("{namespace}.{name}"), namespace.to_string())
    }
}

/// Returns the namespace a named-type definition establishes.
pub(crate) fn declared_namespace<'a>(object: &'a Map<String, Value>, enclosing: &'a str) -> &'a str {
    match object.get("namespace") {
        Some(Value::String(ns)) => ns.as_str(),
        _ => enclosing,
    }
}

/// Resolves a type reference against defined names, falling back to the bare name.
pub(crate) fn resolve_reference(
    reference: &str,
    namespace: &str,
    defined: &dyn Fn(&str) -> bool,
) -> Option<String> {
    let (qualified, _) = qualify(reference, namespace);
    if defined(&qualified) {
        return Some(qualified);
    }
    if defined(reference) {
        return Some(reference.to_string());
    }
    None
}

// ============================================================================
// SECTION: Shapes
// ============================================================================

/// Structural summary of a validated type, used to check defaults.
#[derive(Debug, Clone)]
enum Shape {
    /// A primitive type.
    Primitive(&'static str),
    /// Reference to a named type by fullname.
    Named(String),
    /// Array of items.
    Array(Box<Self>),
    /// Map of values.
    Map(Box<Self>),
    /// Union of branches.
    Union(Vec<Self>),
}

/// Field summary kept for record default checks.
#[derive(Debug, Clone)]
struct FieldShape {
    /// Field name.
    name: String,
    /// Field type shape.
    shape: Shape,
    /// Whether the field declares its own default.
    has_default: bool,
}

/// Named type definitions recorded during validation.
#[derive(Debug, Clone)]
enum NamedDef {
    /// Record with its fields (filled after the fields validate).
    Record(Vec<FieldShape>),
    /// Enum with its symbols.
    Enum(Vec<String>),
    /// Fixed with its size.
    Fixed(u64),
}

// ============================================================================
// SECTION: Validator
// ============================================================================

/// Schema walker tracking named definitions.
#[derive(Debug, Default)]
struct Validator {
    /// Named types defined so far, keyed by fullname.
    named: BTreeMap<String, NamedDef>,
}

impl Validator {
    /// Validates a schema node and returns its shape.
    fn validate(
        &mut self,
        node: &Value,
        namespace: &str,
        path: &str,
        depth: usize,
    ) -> Result<Shape, AvroSchemaError> {
        if depth > MAX_DEPTH {
            return Err(AvroSchemaError::at(path, "schema nesting too deep"));
        }
        match node {
            Value::String(name) => self.validate_reference(name, namespace, path),
            Value::Array(branches) => self.validate_union(branches, namespace, path, depth),
            Value::Object(object) => self.validate_object(object, namespace, path, depth),
            _ => Err(AvroSchemaError::at(
                path,
                "schema node must be a string, array, or object",
            )),
        }
    }

    /// Validates a primitive name or named-type reference.
    fn validate_reference(
        &self,
        name: &str,
        namespace: &str,
        path: &str,
    ) -> Result<Shape, AvroSchemaError> {
        if let Some(primitive) = PRIMITIVE_TYPES.iter().copied().find(|p| *p == name) {
            return Ok(Shape::Primitive(primitive));
        }
        resolve_reference(name, namespace, &|candidate| self.named.contains_key(candidate))
            .map(Shape::Named)
            .ok_or_else(|| AvroSchemaError::at(path, format!("unknown type: {name}")))
    }

    /// Validates a union.
    fn validate_union(
        &mut self,
        branches: &[Value],
        namespace: &str,
        path: &str,
        depth: usize,
    ) -> Result<Shape, AvroSchemaError> {
        if branches.is_empty() {
            return Err(AvroSchemaError::at(path, "union must have at least one branch"));
        }
        let mut seen = BTreeSet::new();
        let mut shapes = Vec::with_capacity(branches.len());
        for (index, branch) in branches.iter().enumerate() {
            let branch_path = format!("{path}[{index}]");
            let shape = self.validate(branch, namespace, &branch_path, depth + 1)?;
            let key = match &shape {
                Shape::Union(_) => {
                    return Err(AvroSchemaError::at(
                        &branch_path,
                        "unions may not immediately contain other unions",
                    ));
                }
                Shape::Primitive(name) => (*name).to_string(),
                Shape::Named(fullname) => fullname.clone(),
                Shape::Array(_) => "array".to_string(),
                Shape::Map(_) => "map".to_string(),
            };
            if !seen.insert(key.clone()) {
                return Err(AvroSchemaError::at(
                    &branch_path,
                    format!("duplicate union branch: {key}"),
                ));
            }
            shapes.push(shape);
        }
        Ok(Shape::Union(shapes))
    }

    /// Validates an object-form schema node.
    fn validate_object(
        &mut self,
        object: &Map<String, Value>,
        namespace: &str,
        path: &str,
        depth: usize,
    ) -> Result<Shape, AvroSchemaError> {
        let Some(type_value) = object.get("type") else {
            return Err(AvroSchemaError::at(path, "missing required attribute: type"));
        };
        let type_path = format!("{path}.type");
        let Value::String(type_name) = type_value else {
            return self.validate(type_value, namespace, &type_path, depth + 1);
        };
        match type_name.as_str() {
            "record" | "error" => self.validate_record(object, namespace, path, depth),
            "enum" => self.validate_enum(object, namespace, path),
            "fixed" => self.validate_fixed(object, namespace, path),
            "array" => {
                let items = required(object, "items", path)?;
                let shape = self.validate(items, namespace, &format!("{path}.items"), depth + 1)?;
                Ok(Shape::Array(Box::new(shape)))
            }
            "map" => {
                let values = required(object, "values", path)?;
                let shape =
                    self.validate(values, namespace, &format!("{path}.values"), depth + 1)?;
                Ok(Shape::Map(Box::new(shape)))
            }
            other => {
                let shape = self.validate_reference(other, namespace, &type_path)?;
                if let Shape::Primitive(primitive) = &shape {
                    validate_logical_type(object, primitive, path)?;
                }
                Ok(shape)
            }
        }
    }

    /// Validates and registers a named type's name, returning `(fullname, namespace)`.
    fn declare(
        &self,
        object: &Map<String, Value>,
        namespace: &str,
        path: &str,
    ) -> Result<(String, String), AvroSchemaError> {
        let Some(Value::String(name)) = object.get("name") else {
            return Err(AvroSchemaError::at(path, "named type requires a string name"));
        };
        if let Some(ns) = object.get("namespace") {
            let Value::String(ns) = ns else {
                return Err(AvroSchemaError::at(path, "namespace must be a string"));
            };
            if !is_valid_namespace(ns) {
                return Err(AvroSchemaError::at(path, format!("invalid namespace: {ns}")));
            }
        }
        let declared_ns = declared_namespace(object, namespace);
        let (fullname, type_ns) = qualify(name, declared_ns);
        let simple = fullname.rsplit('.').next().unwrap_or(fullname.as_str());
        if !is_valid_name(simple) || !is_valid_namespace(&type_ns) {
            return Err(AvroSchemaError::at(path, format!("invalid name: {name}")));
        }
        if is_primitive(simple) && type_ns.is_empty() {
            return Err(AvroSchemaError::at(
                path,
                format!("named type may not redefine primitive: {name}"),
            ));
        }
        if self.named.contains_key(&fullname) {
            return Err(AvroSchemaError::at(path, format!("duplicate named type: {fullname}")));
        }
        Ok((fullname, type_ns))
    }

    /// Validates a record or error definition.
    fn validate_record(
        &mut self,
        object: &Map<String, Value>,
        namespace: &str,
        path: &str,
        depth: usize,
    ) -> Result<Shape, AvroSchemaError> {
        let (fullname, record_ns) = self.declare(object, namespace, path)?;
        validate_doc(object, path)?;
        validate_aliases(object, path)?;
        self.named.insert(fullname.clone(), NamedDef::Record(Vec::new()));
        let Some(Value::Array(fields)) = object.get("fields") else {
            return Err(AvroSchemaError::at(path, "record requires a fields array"));
        };
        let mut names = BTreeSet::new();
        let mut shapes = Vec::with_capacity(fields.len());
        for (index, field) in fields.iter().enumerate() {
            let field_path = format!("{path}.fields[{index}]");
            let Value::Object(field) = field else {
                return Err(AvroSchemaError::at(&field_path, "field must be an object"));
            };
            let Some(Value::String(name)) = field.get("name") else {
                return Err(AvroSchemaError::at(&field_path, "field requires a string name"));
            };
            if !is_valid_name(name) {
                return Err(AvroSchemaError::at(&field_path, format!("invalid field name: {name}")));
            }
            if !names.insert(name.clone()) {
                return Err(AvroSchemaError::at(
                    &field_path,
                    format!("duplicate field name: {name}"),
                ));
            }
            let field_type = required(field, "type", &field_path)?;
            let shape =
                self.validate(field_type, &record_ns, &format!("{field_path}.type"), depth + 1)?;
            if let Some(default) = field.get("default") {
                self.check_default(&shape, default, &format!("{field_path}.default"))?;
            }
            if let Some(order) = field.get("order")
                && !matches!(order.as_str(), Some("ascending" | "descending" | "ignore"))
            {
                return Err(AvroSchemaError::at(
                    &field_path,
                    "order must be ascending, descending, or ignore",
                ));
            }
            validate_doc(field, &field_path)?;
            validate_aliases(field, &field_path)?;
            shapes.push(FieldShape {
                name: name.clone(),
                shape,
                has_default: field.contains_key("default"),
            });
        }
        self.named.insert(fullname.clone(), NamedDef::Record(shapes));
        Ok(Shape::Named(fullname))
    }

    /// Validates an enum definition.
    fn validate_enum(
        &mut self,
        object: &Map<String, Value>,
        namespace: &str,
        path: &str,
    ) -> Result<Shape, AvroSchemaError> {
        let (fullname, _) = self.declare(object, namespace, path)?;
        validate_doc(object, path)?;
        validate_aliases(object, path)?;
        let Some(Value::Array(raw_symbols)) = object.get("symbols") else {
            return Err(AvroSchemaError::at(path, "enum requires a symbols array"));
        };
        let mut symbols = Vec::with_capacity(raw_symbols.len());
        for symbol in raw_symbols {
            let Some(symbol) = symbol.as_str() else {
                return Err(AvroSchemaError::at(path, "enum symbols must be strings"));
            };
            if !is_valid_name(symbol) {
                return Err(AvroSchemaError::at(path, format!("invalid enum symbol: {symbol}")));
            }
            if symbols.iter().any(|existing| existing == symbol) {
                return Err(AvroSchemaError::at(path, format!("duplicate enum symbol: {symbol}")));
            }
            symbols.push(symbol.to_string());
        }
        if let Some(default) = object.get("default") {
            let known = default.as_str().is_some_and(|d| symbols.iter().any(|s| s == d));
            if !known {
                return Err(AvroSchemaError::at(path, "enum default must be one of its symbols"));
            }
        }
        self.named.insert(fullname.clone(), NamedDef::Enum(symbols));
        Ok(Shape::Named(fullname))
    }

    /// Validates a fixed definition.
    fn validate_fixed(
        &mut self,
        object: &Map<String, Value>,
        namespace: &str,
        path: &str,
    ) -> Result<Shape, AvroSchemaError> {
        let (fullname, _) = self.declare(object, namespace, path)?;
        validate_aliases(object, path)?;
        let Some(size) = object.get("size").and_then(Value::as_u64) else {
            return Err(AvroSchemaError::at(path, "fixed requires a non-negative integer size"));
        };
        let fixed = Shape::Named(fullname.clone());
        self.named.insert(fullname, NamedDef::Fixed(size));
        validate_logical_type(object, "fixed", path)?;
        Ok(fixed)
    }

    /// Checks a default value against a type shape (first branch for unions).
    fn check_default(&self, shape: &Shape, value: &Value, path: &str) -> Result<(), AvroSchemaError> {
        let ok = match shape {
            Shape::Primitive(name) => primitive_accepts(name, value),
            Shape::Union(branches) => {
                return match branches.first() {
                    Some(first) => self.check_default(first, value, path),
                    None => Err(AvroSchemaError::at(path, "union must have at least one branch")),
                };
            }
            Shape::Array(items) => {
                let Value::Array(elements) = value else {
                    return Err(AvroSchemaError::at(path, "array default must be a json array"));
                };
                for (index, element) in elements.iter().enumerate() {
                    self.check_default(items, element, &format!("{path}[{index}]"))?;
                }
                true
            }
            Shape::Map(values) => {
                let Value::Object(entries) = value else {
                    return Err(AvroSchemaError::at(path, "map default must be a json object"));
                };
                for (key, entry) in entries {
                    self.check_default(values, entry, &format!("{path}.{key}"))?;
                }
                true
            }
            Shape::Named(fullname) => match self.named.get(fullname) {
                Some(NamedDef::Enum(symbols)) => {
                    value.as_str().is_some_and(|v| symbols.iter().any(|s| s == v))
                }
                Some(NamedDef::Fixed(size)) => value
                    .as_str()
                    .is_some_and(|v| u64::try_from(v.chars().count()).is_ok_and(|n| n == *size)),
                Some(NamedDef::Record(fields)) => {
                    let Value::Object(entries) = value else {
                        return Err(AvroSchemaError::at(path, "record default must be an object"));
                    };
                    for field in fields {
                        match entries.get(&field.name) {
                            Some(entry) => self.check_default(
                                &field.shape,
                                entry,
                                &format!("{path}.{}", field.name),
                            )?,
                            None if field.has_default => {}
                            None => {
                                return Err(AvroSchemaError::at(
                                    path,
                                    format!("record default missing field: {}", field.name),
                                ));
                            }
                        }
                    }
                    true
                }
                None => false,
            },
        };
        if ok {
            Ok(())
        } else {
            Err(AvroSchemaError::at(path, "default value does not match field type"))
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns a required attribute or a grammar error.
fn required<'a>(
    object: &'a Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<&'a Value, AvroSchemaError> {
    object
        .get(key)
        .ok_or_else(|| AvroSchemaError::at(path, format!("missing required attribute: {key}")))
}

/// Returns true when `value` is a legal default for the primitive type.
fn primitive_accepts(name: &str, value: &Value) -> bool {
    match name {
        "null" => value.is_null(),
        "boolean" => value.is_boolean(),
        "int" => value.as_i64().is_some_and(|v| i32::try_from(v).is_ok()),
        "long" => value.is_i64(),
        "float" | "double" => value.is_number(),
        "bytes" | "string" => value.is_string(),
        _ => false,
    }
}

/// Validates an optional `doc` attribute.
fn validate_doc(object: &Map<String, Value>, path: &str) -> Result<(), AvroSchemaError> {
    match object.get("doc") {
        None | Some(Value::String(_)) => Ok(()),
        Some(_) => Err(AvroSchemaError::at(path, "doc must be a string")),
    }
}

/// Validates an optional `aliases` attribute.
fn validate_aliases(object: &Map<String, Value>, path: &str) -> Result<(), AvroSchemaError> {
    match object.get("aliases") {
        None => Ok(()),
        Some(Value::Array(aliases)) if aliases.iter().all(Value::is_string) => Ok(()),
        Some(_) => Err(AvroSchemaError::at(path, "aliases must be an array of strings")),
    }
}

/// Validates the attributes a known logical type requires.
///
/// Unknown logical types are ignored, as Avro requires.
fn validate_logical_type(
    object: &Map<String, Value>,
    base: &str,
    path: &str,
) -> Result<(), AvroSchemaError> {
    let Some(logical) = object.get("logicalType") else {
        return Ok(());
    };
    let Some(logical) = logical.as_str() else {
        return Err(AvroSchemaError::at(path, "logicalType must be a string"));
    };
    if logical != "decimal" {
        return Ok(());
    }
    if base != "bytes" && base != "fixed" {
        return Err(AvroSchemaError::at(path, "decimal logical type requires bytes or fixed"));
    }
    let precision = object.get("precision").and_then(Value::as_u64).unwrap_or(0);
    if precision == 0 {
        return Err(AvroSchemaError::at(path, "decimal precision must be a positive integer"));
    }
    let scale = match object.get("scale") {
        None => 0,
        Some(scale) => scale.as_u64().ok_or_else(|| {
            AvroSchemaError::at(path, "decimal scale must be a non-negative integer")
        })?,
    };
    if scale > precision {
        return Err(AvroSchemaError::at(path, "decimal scale may not exceed precision"));
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
