// crates/schematizer-core/src/convert/mapping.rs
// ============================================================================
// Module: Column Mapping
// Description: Static table from relational type families to Avro types.
// Purpose: Keep type mapping data-driven and injectable into the converter.
// Dependencies: crate::ddl::types
// ============================================================================

//! ## Overview
//! A [`ColumnMapping`] is an ordered list of [`MappingEntry`] values. Lookup
//! returns the first entry whose family list contains the column's family and
//! whose validity predicate accepts the descriptor, so narrower entries (e.g.
//! signed `INT`) must precede broader ones. A descriptor no entry accepts is an
//! unsupported type.

use crate::ddl::types::SqlType;
use crate::ddl::types::TypeFamily;

// ============================================================================
// SECTION: Mapping Vocabulary
// ============================================================================

/// Avro base type produced by a mapping entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvroType {
    /// `boolean`.
    Boolean,
    /// `int`.
    Int,
    /// `long`.
    Long,
    /// `float`.
    Float,
    /// `double`.
    Double,
    /// `bytes`.
    Bytes,
    /// `string`.
    String,
    /// Named `enum` built from the column's value list.
    Enum,
}

impl AvroType {
    /// Returns the Avro type name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::Bytes => "bytes",
            Self::String => "string",
            Self::Enum => "enum",
        }
    }
}

/// Avro logical type annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalType {
    /// `decimal` with `precision`/`scale` from the descriptor.
    Decimal,
    /// `date`: days since the Unix epoch.
    Date,
    /// `time-millis`: milliseconds after midnight.
    TimeMillis,
    /// `timestamp-millis`: milliseconds since the Unix epoch, UTC.
    TimestampMillis,
}

impl LogicalType {
    /// Returns the Avro `logicalType` value.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Decimal => "decimal",
            Self::Date => "date",
            Self::TimeMillis => "time-millis",
            Self::TimestampMillis => "timestamp-millis",
        }
    }
}

/// How a column default is re-encoded as an Avro default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultEncoding {
    /// JSON boolean (accepts `0`/`1`, `TRUE`/`FALSE`, `b'0'`/`b'1'`).
    Boolean,
    /// JSON integer within the Avro base type's range.
    Integer,
    /// JSON number.
    Float,
    /// JSON string.
    String,
    /// Raw bytes as a JSON string of code points 0-255.
    Bytes,
    /// Two's-complement unscaled decimal bytes.
    DecimalBytes,
    /// Enum symbol.
    EnumSymbol,
    /// `YYYY-MM-DD` to days since the epoch.
    Date,
    /// `HH:MM:SS[.fff]` to milliseconds after midnight.
    TimeMillis,
    /// `YYYY-MM-DD HH:MM:SS[.fff]` to epoch milliseconds.
    TimestampMillis,
}

/// Optional length metadata attached to a mapped type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthAttribute {
    /// `maxlen`: upper bound on the value length.
    MaxLen,
    /// `fixlen`: exact value length.
    FixLen,
}

impl LengthAttribute {
    /// Returns the metadata key.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::MaxLen => "maxlen",
            Self::FixLen => "fixlen",
        }
    }
}

/// Validity predicate over a type descriptor.
pub type TypePredicate = fn(&SqlType) -> bool;

/// One row of the mapping table.
#[derive(Debug, Clone)]
pub struct MappingEntry {
    /// Families this entry covers.
    pub families: &'static [TypeFamily],
    /// Avro base type.
    pub avro_type: AvroType,
    /// Logical type annotation, if any.
    pub logical_type: Option<LogicalType>,
    /// Default value encoding.
    pub default_encoding: DefaultEncoding,
    /// Length metadata taken from the descriptor width.
    pub length_attribute: Option<LengthAttribute>,
    /// Whether `unsigned`/`zerofill` flags are carried as metadata.
    pub sign_metadata: bool,
    /// Additional acceptance test on the descriptor.
    pub accepts: TypePredicate,
}

impl MappingEntry {
    /// Creates an entry accepting every descriptor of the given families.
    #[must_use]
    pub const fn new(
        families: &'static [TypeFamily],
        avro_type: AvroType,
        default_encoding: DefaultEncoding,
    ) -> Self {
        Self {
            families,
            avro_type,
            logical_type: None,
            default_encoding,
            length_attribute: None,
            sign_metadata: false,
            accepts: any_type,
        }
    }

    /// Sets the logical type annotation.
    #[must_use]
    pub const fn with_logical_type(mut self, logical_type: LogicalType) -> Self {
        self.logical_type = Some(logical_type);
        self
    }

    /// Sets the length metadata attribute.
    #[must_use]
    pub const fn with_length(mut self, attribute: LengthAttribute) -> Self {
        self.length_attribute = Some(attribute);
        self
    }

    /// Carries `unsigned`/`zerofill` as metadata.
    #[must_use]
    pub const fn with_sign_metadata(mut self) -> Self {
        self.sign_metadata = true;
        self
    }

    /// Restricts the entry with a validity predicate.
    #[must_use]
    pub const fn when(mut self, accepts: TypePredicate) -> Self {
        self.accepts = accepts;
        self
    }

    /// Returns true when this entry maps the descriptor.
    #[must_use]
    pub fn matches(&self, sql_type: &SqlType) -> bool {
        self.families.contains(&sql_type.family) && (self.accepts)(sql_type)
    }
}

// ============================================================================
// SECTION: Mapping Table
// ============================================================================

/// Ordered mapping from relational types to Avro types.
#[derive(Debug, Clone)]
pub struct ColumnMapping {
    /// Entries in lookup order.
    entries: Vec<MappingEntry>,
}

impl ColumnMapping {
    /// Creates a mapping from explicit entries.
    #[must_use]
    pub const fn new(entries: Vec<MappingEntry>) -> Self {
        Self {
            entries,
        }
    }

    /// Returns the entries in lookup order.
    #[must_use]
    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    /// Returns the first entry that maps the descriptor.
    #[must_use]
    pub fn lookup(&self, sql_type: &SqlType) -> Option<&MappingEntry> {
        self.entries.iter().find(|entry| entry.matches(sql_type))
    }

    /// Returns the standard MySQL mapping.
    ///
    /// `SET` columns and `BIT(64)` have no entry.
    #[must_use]
    pub fn mysql_default() -> Self {
        use AvroType as A;
        use DefaultEncoding as D;
        use TypeFamily as F;
        Self::new(vec![
            MappingEntry::new(&[F::Bool], A::Boolean, D::Boolean),
            MappingEntry::new(&[F::Bit], A::Boolean, D::Boolean).when(single_bit),
            MappingEntry::new(&[F::Bit], A::Long, D::Integer).when(fits_signed_long),
            MappingEntry::new(&[F::TinyInt, F::SmallInt, F::MediumInt], A::Int, D::Integer)
                .with_sign_metadata(),
            MappingEntry::new(&[F::Int], A::Int, D::Integer).with_sign_metadata().when(is_signed),
            MappingEntry::new(&[F::Int], A::Long, D::Integer).with_sign_metadata(),
            MappingEntry::new(&[F::BigInt], A::Long, D::Integer)
                .with_sign_metadata()
                .when(is_signed),
            MappingEntry::new(&[F::BigInt], A::Bytes, D::DecimalBytes)
                .with_logical_type(LogicalType::Decimal)
                .with_sign_metadata(),
            MappingEntry::new(&[F::Float], A::Float, D::Float).with_sign_metadata(),
            MappingEntry::new(&[F::Double], A::Double, D::Float).with_sign_metadata(),
            MappingEntry::new(&[F::Decimal], A::Bytes, D::DecimalBytes)
                .with_logical_type(LogicalType::Decimal)
                .with_sign_metadata(),
            MappingEntry::new(&[F::Char], A::String, D::String).with_length(LengthAttribute::FixLen),
            MappingEntry::new(&[F::VarChar], A::String, D::String)
                .with_length(LengthAttribute::MaxLen),
            MappingEntry::new(
                &[F::TinyText, F::Text, F::MediumText, F::LongText, F::Json],
                A::String,
                D::String,
            ),
            MappingEntry::new(&[F::Binary], A::Bytes, D::Bytes).with_length(LengthAttribute::FixLen),
            MappingEntry::new(&[F::VarBinary], A::Bytes, D::Bytes)
                .with_length(LengthAttribute::MaxLen),
            MappingEntry::new(&[F::TinyBlob, F::Blob, F::MediumBlob, F::LongBlob], A::Bytes, D::Bytes),
            MappingEntry::new(&[F::Date], A::Int, D::Date).with_logical_type(LogicalType::Date),
            MappingEntry::new(&[F::Time], A::Int, D::TimeMillis)
                .with_logical_type(LogicalType::TimeMillis),
            MappingEntry::new(&[F::DateTime, F::Timestamp], A::Long, D::TimestampMillis)
                .with_logical_type(LogicalType::TimestampMillis),
            MappingEntry::new(&[F::Year], A::Int, D::Integer),
            MappingEntry::new(&[F::Enum], A::Enum, D::EnumSymbol).when(symbols_are_names),
        ])
    }
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self::mysql_default()
    }
}

// ============================================================================
// SECTION: Predicates
// ============================================================================

/// Accepts every descriptor.
const fn any_type(_: &SqlType) -> bool {
    true
}

/// Accepts signed descriptors.
const fn is_signed(sql_type: &SqlType) -> bool {
    !sql_type.unsigned
}

/// Accepts `BIT` and `BIT(1)`.
fn single_bit(sql_type: &SqlType) -> bool {
    sql_type.width.is_none_or(|width| width == 1)
}

/// Accepts `BIT(n)` whose values fit a signed 64-bit integer.
fn fits_signed_long(sql_type: &SqlType) -> bool {
    sql_type.width.is_some_and(|width| width <= 63)
}

/// Accepts enums whose values are all valid, distinct Avro symbols.
fn symbols_are_names(sql_type: &SqlType) -> bool {
    !sql_type.values.is_empty()
        && sql_type.values.iter().all(|value| crate::avro::is_valid_name(value))
        && sql_type
            .values
            .iter()
            .enumerate()
            .all(|(index, value)| !sql_type.values.iter().take(index).any(|prior| prior == value))
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions.")]

    use super::*;

    fn descriptor(family: TypeFamily, unsigned: bool) -> SqlType {
        let mut sql_type = SqlType::new(family);
        sql_type.unsigned = unsigned;
        sql_type
    }

    #[test]
    fn unsigned_widths_widen() {
        let mapping = ColumnMapping::mysql_default();
        let int = mapping.lookup(&descriptor(TypeFamily::Int, false)).unwrap();
        let uint = mapping.lookup(&descriptor(TypeFamily::Int, true)).unwrap();
        let ubig = mapping.lookup(&descriptor(TypeFamily::BigInt, true)).unwrap();
        assert_eq!(int.avro_type, AvroType::Int);
        assert_eq!(uint.avro_type, AvroType::Long);
        assert_eq!(ubig.logical_type, Some(LogicalType::Decimal));
    }

    #[test]
    fn bit_width_selects_entry() {
        let mapping = ColumnMapping::mysql_default();
        let mut bit = SqlType::new(TypeFamily::Bit);
        assert_eq!(mapping.lookup(&bit).unwrap().avro_type, AvroType::Boolean);
        bit.width = Some(8);
        assert_eq!(mapping.lookup(&bit).unwrap().avro_type, AvroType::Long);
        bit.width = Some(64);
        assert!(mapping.lookup(&bit).is_none());
    }

    #[test]
    fn set_and_invalid_enums_are_unmapped() {
        let mapping = ColumnMapping::mysql_default();
        let mut set = SqlType::new(TypeFamily::Set);
        set.values = vec!["a".to_string()];
        assert!(mapping.lookup(&set).is_none());
        let mut enumeration = SqlType::new(TypeFamily::Enum);
        enumeration.values = vec!["in stock".to_string()];
        assert!(mapping.lookup(&enumeration).is_none());
    }
}
