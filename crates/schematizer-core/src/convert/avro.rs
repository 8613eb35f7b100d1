// crates/schematizer-core/src/convert/avro.rs
// ============================================================================
// Module: Table-to-Avro Converter
// Description: Builds an Avro record schema from a resolved table model.
// Purpose: Deterministic, mapping-driven conversion of relational tables.
// Dependencies: crate::{avro, convert::mapping, convert::defaults, ddl}, serde_json
// ============================================================================

//! ## Overview
//! [`AvroConverter`] turns a [`TableModel`] into an Avro `record` document:
//! one field per column in column order, nullable columns as unions with
//! `"null"`, defaults re-encoded for the mapped type, and primary-key
//! membership recorded as `"pkey"` metadata. The converter holds no state
//! beyond its mapping table, so equal inputs produce byte-identical output.
//!
//! Metadata conventions on the mapped type object: `maxlen`, `fixlen`,
//! `unsigned`, `zerofill`, plus the Avro `logicalType` attributes. Field-level
//! metadata: `doc` (column comment) and `pkey` (1-based key position).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use serde_json::Map;
use serde_json::Value;

use crate::avro::AvroSchema;
use crate::convert::defaults::encode_default;
use crate::convert::mapping::AvroType;
use crate::convert::mapping::ColumnMapping;
use crate::convert::mapping::LogicalType;
use crate::convert::mapping::MappingEntry;
use crate::ddl::ConversionError;
use crate::ddl::SqlDialect;
use crate::ddl::parse_table;
use crate::ddl::table::Column;
use crate::ddl::table::DefaultValue;
use crate::ddl::table::TableModel;

// ============================================================================
// SECTION: Converter
// ============================================================================

/// Mapping-driven table-to-Avro converter.
#[derive(Debug, Clone, Default)]
pub struct AvroConverter {
    /// Column mapping table.
    mapping: ColumnMapping,
}

impl AvroConverter {
    /// Creates a converter over the given mapping.
    #[must_use]
    pub const fn new(mapping: ColumnMapping) -> Self {
        Self {
            mapping,
        }
    }

    /// Returns the mapping table.
    #[must_use]
    pub const fn mapping(&self) -> &ColumnMapping {
        &self.mapping
    }

    /// Parses DDL statements and converts the resulting table.
    ///
    /// The produced document is checked against the Avro grammar before it is
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError`] from parsing or conversion.
    pub fn convert_statements<S: AsRef<str>>(
        &self,
        statements: &[S],
        dialect: SqlDialect,
        namespace: Option<&str>,
    ) -> Result<Value, ConversionError> {
        let table = parse_table(statements, dialect)?;
        let document = self.convert(&table, namespace)?;
        AvroSchema::parse(document)
            .map(AvroSchema::into_document)
            .map_err(|err| ConversionError::conflict(format!("table `{}`: {err}", table.name)))
    }

    /// Converts a resolved table into an Avro record document.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::UnsupportedType`] when a column type has no
    /// mapping entry and [`ConversionError::SemanticConflict`] when names
    /// collide after sanitizing or a default cannot be encoded.
    pub fn convert(
        &self,
        table: &TableModel,
        namespace: Option<&str>,
    ) -> Result<Value, ConversionError> {
        let mut record = Map::new();
        record.insert("type".to_string(), Value::String("record".to_string()));
        let record_name = sanitize_name(&table.name);
        record.insert("name".to_string(), Value::String(record_name.clone()));
        if let Some(namespace) = namespace.map(sanitize_namespace).filter(|ns| !ns.is_empty()) {
            record.insert("namespace".to_string(), Value::String(namespace));
        }
        let mut field_names = BTreeSet::new();
        let mut type_names = BTreeSet::from([record_name]);
        let mut fields = Vec::with_capacity(table.columns.len());
        for column in &table.columns {
            let field_name = sanitize_name(&column.name);
            if !field_names.insert(field_name.clone()) {
                return Err(ConversionError::conflict(format!(
                    "column `{}` collides with another column as avro field `{field_name}`",
                    column.name
                )));
            }
            fields.push(self.field(table, column, field_name, &mut type_names)?);
        }
        record.insert("fields".to_string(), Value::Array(fields));
        if !table.primary_key.is_empty() {
            let keys = table
                .primary_key
                .iter()
                .map(|key| Value::String(sanitize_name(key)))
                .collect();
            record.insert("pkey".to_string(), Value::Array(keys));
        }
        Ok(Value::Object(record))
    }

    /// Builds one record field.
    fn field(
        &self,
        table: &TableModel,
        column: &Column,
        field_name: String,
        type_names: &mut BTreeSet<String>,
    ) -> Result<Value, ConversionError> {
        let entry = self
            .mapping
            .lookup(&column.sql_type)
            .ok_or_else(|| ConversionError::UnsupportedType(column.sql_type.to_sql()))?;
        let mapped = mapped_type(entry, column, &field_name, type_names);
        let mut field = Map::new();
        field.insert("name".to_string(), Value::String(field_name));
        let default = match &column.default {
            None => None,
            Some(DefaultValue::Null) if column.nullable => None,
            Some(DefaultValue::Null) => {
                return Err(ConversionError::conflict(format!(
                    "NOT NULL column `{}` declares DEFAULT NULL",
                    column.name
                )));
            }
            Some(default) => encode_default(column, entry, default)?,
        };
        match (column.nullable, default) {
            (true, Some(default)) => {
                field.insert("type".to_string(), Value::Array(vec![mapped, null_type()]));
                field.insert("default".to_string(), default);
            }
            (true, None) => {
                field.insert("type".to_string(), Value::Array(vec![null_type(), mapped]));
                field.insert("default".to_string(), Value::Null);
            }
            (false, Some(default)) => {
                field.insert("type".to_string(), mapped);
                field.insert("default".to_string(), default);
            }
            (false, None) => {
                field.insert("type".to_string(), mapped);
            }
        }
        if let Some(comment) = &column.comment {
            field.insert("doc".to_string(), Value::String(comment.clone()));
        }
        if let Some(position) = table.primary_key_position(&column.name) {
            field.insert("pkey".to_string(), Value::from(position));
        }
        Ok(Value::Object(field))
    }
}

// ============================================================================
// SECTION: Type Construction
// ============================================================================

/// Returns the `"null"` union branch.
fn null_type() -> Value {
    Value::String("null".to_string())
}

/// Builds the mapped Avro type for a column, collapsing to a bare name when
/// no attributes apply.
///
/// `type_names` holds the named types already declared in the record.
fn mapped_type(
    entry: &MappingEntry,
    column: &Column,
    field_name: &str,
    type_names: &mut BTreeSet<String>,
) -> Value {
    let sql_type = &column.sql_type;
    let mut object = Map::new();
    if entry.avro_type == AvroType::Enum {
        object.insert("type".to_string(), Value::String("enum".to_string()));
        object.insert("name".to_string(), Value::String(enum_name(field_name, type_names)));
        let symbols = sql_type.values.iter().cloned().map(Value::String).collect();
        object.insert("symbols".to_string(), Value::Array(symbols));
        return Value::Object(object);
    }
    object.insert("type".to_string(), Value::String(entry.avro_type.name().to_string()));
    if let Some(logical_type) = entry.logical_type {
        object.insert("logicalType".to_string(), Value::String(logical_type.name().to_string()));
        if logical_type == LogicalType::Decimal {
            let (precision, scale) = sql_type.decimal_digits();
            object.insert("precision".to_string(), Value::from(precision));
            object.insert("scale".to_string(), Value::from(scale));
        }
    }
    if let (Some(attribute), Some(width)) = (entry.length_attribute, sql_type.width) {
        object.insert(attribute.key().to_string(), Value::from(width));
    }
    if entry.sign_metadata {
        if sql_type.unsigned {
            object.insert("unsigned".to_string(), Value::Bool(true));
        }
        if sql_type.zerofill {
            object.insert("zerofill".to_string(), Value::Bool(true));
        }
    }
    if object.len() == 1 {
        return Value::String(entry.avro_type.name().to_string());
    }
    Value::Object(object)
}

// ============================================================================
// SECTION: Names
// ============================================================================

/// Maps an SQL identifier onto a valid Avro name.
///
/// Characters outside `[A-Za-z0-9_]` become `_`; a leading digit (or an empty
/// name) gains a `_` prefix.
#[must_use]
pub fn sanitize_name(raw: &str) -> String {
    let mut name: String = raw
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() || ch == '_' { ch } else { '_' })
        .collect();
    if !name.chars().next().is_some_and(|ch| ch.is_ascii_alphabetic() || ch == '_') {
        name.insert(0, '_');
    }
    name
}

/// Picks `<field>_enum`, adding a numeric suffix while the name is taken.
fn enum_name(field_name: &str, type_names: &mut BTreeSet<String>) -> String {
    let base = format!("{field_name}_enum");
    let mut candidate = base.clone();
    let mut suffix = 2_u32;
    while !type_names.insert(candidate.clone()) {
        candidate = format!("{base}_{suffix}");
        suffix += 1;
    }
    candidate
}

/// Maps a dotted namespace onto a valid Avro namespace.
fn sanitize_namespace(raw: &str) -> String {
    raw.split('.').filter(|part| !part.is_empty()).map(sanitize_name).collect::<Vec<_>>().join(".")
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions.")]

    use serde_json::json;

    use super::*;

    fn convert(statements: &[&str]) -> Result<Value, ConversionError> {
        AvroConverter::default().convert_statements(statements, SqlDialect::MySql, Some("ns1"))
    }

    #[test]
    fn sanitizes_identifiers() {
        assert_eq!(sanitize_name("order-items"), "order_items");
        assert_eq!(sanitize_name("2fa"), "_2fa");
        assert_eq!(sanitize_name(""), "_");
        assert_eq!(sanitize_namespace("yelp.main-db"), "yelp.main_db");
    }

    #[test]
    fn nullable_default_puts_type_first() {
        let document = convert(&["CREATE TABLE t (a INT DEFAULT 3, b INT)"]).unwrap();
        assert_eq!(document["fields"][0]["type"], json!(["int", "null"]));
        assert_eq!(document["fields"][0]["default"], json!(3));
        assert_eq!(document["fields"][1]["type"], json!(["null", "int"]));
        assert_eq!(document["fields"][1]["default"], Value::Null);
    }

    #[test]
    fn metadata_attributes_are_attached() {
        let document = convert(&[
            "CREATE TABLE t (id BIGINT UNSIGNED NOT NULL COMMENT 'row id', \
             code CHAR(4) NOT NULL, price DECIMAL(6,2) NOT NULL DEFAULT '1.50', \
             state ENUM('on', 'off') NOT NULL DEFAULT 'off', PRIMARY KEY (id, code))",
        ])
        .unwrap();
        let fields = &document["fields"];
        assert_eq!(
            fields[0]["type"],
            json!({"type": "bytes", "logicalType": "decimal", "precision": 20, "scale": 0,
                   "unsigned": true})
        );
        assert_eq!(fields[0]["doc"], json!("row id"));
        assert_eq!(fields[0]["pkey"], json!(1));
        assert_eq!(fields[1]["type"], json!({"type": "string", "fixlen": 4}));
        assert_eq!(fields[1]["pkey"], json!(2));
        assert_eq!(fields[2]["default"], json!("\u{0}\u{96}"));
        assert_eq!(fields[3]["type"]["symbols"], json!(["on", "off"]));
        assert_eq!(fields[3]["default"], json!("off"));
        assert_eq!(document["pkey"], json!(["id", "code"]));
    }

    #[test]
    fn sanitized_collision_conflicts() {
        let err = convert(&["CREATE TABLE t (`a-b` INT, `a_b` INT)"]).unwrap_err();
        assert!(matches!(err, ConversionError::SemanticConflict(_)));
    }

    #[test]
    fn not_null_default_null_conflicts() {
        let err = convert(&["CREATE TABLE t (a INT NOT NULL DEFAULT NULL)"]).unwrap_err();
        assert!(matches!(err, ConversionError::SemanticConflict(_)));
    }

    #[test]
    fn enum_name_avoids_record_name() {
        let document = convert(&["CREATE TABLE a_enum (a ENUM('x', 'y') NOT NULL)"]).unwrap();
        assert_eq!(document["name"], json!("a_enum"));
        assert_eq!(document["fields"][0]["type"]["name"], json!("a_enum_2"));
    }

    #[test]
    fn wide_decimal_defaults_convert() {
        let literal = format!("1{}", "0".repeat(41));
        let document =
            convert(&[format!("CREATE TABLE t (d DECIMAL(50,0) NOT NULL DEFAULT '{literal}')").as_str()])
                .unwrap();
        assert_eq!(document["fields"][0]["type"]["precision"], json!(50));
        assert!(document["fields"][0]["default"].is_string());
    }

    #[test]
    fn set_columns_are_unsupported() {
        let err = convert(&["CREATE TABLE t (s SET('a','b'))"]).unwrap_err();
        assert_eq!(err, ConversionError::UnsupportedType("SET('a','b')".to_string()));
    }
}
