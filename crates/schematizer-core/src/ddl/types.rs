// crates/schematizer-core/src/ddl/types.rs
// ============================================================================
// Module: Relational Types
// Description: Canonical descriptors for SQL column types.
// Purpose: Normalize vendor width/precision/sign qualifiers into one shape.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Every column type is reduced to an [`SqlType`]: a [`TypeFamily`] plus the
//! qualifiers that matter for conversion. Aliases (`INTEGER`, `NUMERIC`,
//! `BOOLEAN`, ...) collapse onto their family during parsing, so the mapping
//! table never sees vendor spellings.

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Families
// ============================================================================

/// Relational type family, independent of width and sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeFamily {
    /// `BOOL` / `BOOLEAN`.
    Bool,
    /// `BIT(n)`.
    Bit,
    /// `TINYINT`.
    TinyInt,
    /// `SMALLINT`.
    SmallInt,
    /// `MEDIUMINT`.
    MediumInt,
    /// `INT` / `INTEGER`.
    Int,
    /// `BIGINT`.
    BigInt,
    /// `FLOAT`.
    Float,
    /// `DOUBLE` / `REAL` / `DOUBLE PRECISION`.
    Double,
    /// `DECIMAL` / `NUMERIC` / `DEC` / `FIXED`.
    Decimal,
    /// `CHAR(n)`.
    Char,
    /// `VARCHAR(n)`.
    VarChar,
    /// `TINYTEXT`.
    TinyText,
    /// `TEXT`.
    Text,
    /// `MEDIUMTEXT`.
    MediumText,
    /// `LONGTEXT`.
    LongText,
    /// `BINARY(n)`.
    Binary,
    /// `VARBINARY(n)`.
    VarBinary,
    /// `TINYBLOB`.
    TinyBlob,
    /// `BLOB`.
    Blob,
    /// `MEDIUMBLOB`.
    MediumBlob,
    /// `LONGBLOB`.
    LongBlob,
    /// `DATE`.
    Date,
    /// `TIME`.
    Time,
    /// `DATETIME`.
    DateTime,
    /// `TIMESTAMP`.
    Timestamp,
    /// `YEAR`.
    Year,
    /// `ENUM('a', ...)`.
    Enum,
    /// `SET('a', ...)`.
    Set,
    /// `JSON`.
    Json,
}

impl TypeFamily {
    /// Resolves a type keyword (any case) to its family.
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let family = match keyword.to_ascii_uppercase().as_str() {
            "BOOL" | "BOOLEAN" => Self::Bool,
            "BIT" => Self::Bit,
            "TINYINT" | "INT1" => Self::TinyInt,
            "SMALLINT" | "INT2" => Self::SmallInt,
            "MEDIUMINT" | "INT3" | "MIDDLEINT" => Self::MediumInt,
            "INT" | "INTEGER" | "INT4" => Self::Int,
            "BIGINT" | "INT8" => Self::BigInt,
            "FLOAT" | "FLOAT4" => Self::Float,
            "DOUBLE" | "REAL" | "FLOAT8" => Self::Double,
            "DECIMAL" | "DEC" | "NUMERIC" | "FIXED" => Self::Decimal,
            "CHAR" | "CHARACTER" | "NCHAR" => Self::Char,
            "VARCHAR" | "NVARCHAR" | "VARCHARACTER" => Self::VarChar,
            "TINYTEXT" => Self::TinyText,
            "TEXT" => Self::Text,
            "MEDIUMTEXT" | "LONG" => Self::MediumText,
            "LONGTEXT" => Self::LongText,
            "BINARY" => Self::Binary,
            "VARBINARY" => Self::VarBinary,
            "TINYBLOB" => Self::TinyBlob,
            "BLOB" => Self::Blob,
            "MEDIUMBLOB" => Self::MediumBlob,
            "LONGBLOB" => Self::LongBlob,
            "DATE" => Self::Date,
            "TIME" => Self::Time,
            "DATETIME" => Self::DateTime,
            "TIMESTAMP" => Self::Timestamp,
            "YEAR" => Self::Year,
            "ENUM" => Self::Enum,
            "SET" => Self::Set,
            "JSON" => Self::Json,
            _ => return None,
        };
        Some(family)
    }

    /// Returns the canonical SQL spelling of the family.
    #[must_use]
    pub const fn sql_name(self) -> &'static str {
        match self {
            Self::Bool => "BOOL",
            Self::Bit => "BIT",
            Self::TinyInt => "TINYINT",
            Self::SmallInt => "SMALLINT",
            Self::MediumInt => "MEDIUMINT",
            Self::Int => "INT",
            Self::BigInt => "BIGINT",
            Self::Float => "FLOAT",
            Self::Double => "DOUBLE",
            Self::Decimal => "DECIMAL",
            Self::Char => "CHAR",
            Self::VarChar => "VARCHAR",
            Self::TinyText => "TINYTEXT",
            Self::Text => "TEXT",
            Self::MediumText => "MEDIUMTEXT",
            Self::LongText => "LONGTEXT",
            Self::Binary => "BINARY",
            Self::VarBinary => "VARBINARY",
            Self::TinyBlob => "TINYBLOB",
            Self::Blob => "BLOB",
            Self::MediumBlob => "MEDIUMBLOB",
            Self::LongBlob => "LONGBLOB",
            Self::Date => "DATE",
            Self::Time => "TIME",
            Self::DateTime => "DATETIME",
            Self::Timestamp => "TIMESTAMP",
            Self::Year => "YEAR",
            Self::Enum => "ENUM",
            Self::Set => "SET",
            Self::Json => "JSON",
        }
    }

    /// Returns the shape of the parenthesized arguments this family accepts.
    #[must_use]
    pub const fn arguments(self) -> TypeArguments {
        match self {
            Self::Float | Self::Double | Self::Decimal => TypeArguments::PrecisionScale,
            Self::Time | Self::DateTime | Self::Timestamp => TypeArguments::FractionalSeconds,
            Self::Enum | Self::Set => TypeArguments::Values,
            Self::Bool
            | Self::TinyText
            | Self::MediumText
            | Self::LongText
            | Self::TinyBlob
            | Self::MediumBlob
            | Self::LongBlob
            | Self::Date
            | Self::Json => TypeArguments::None,
            _ => TypeArguments::Width,
        }
    }

    /// Returns true for integer families that accept `UNSIGNED`/`ZEROFILL`.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::TinyInt
                | Self::SmallInt
                | Self::MediumInt
                | Self::Int
                | Self::BigInt
                | Self::Float
                | Self::Double
                | Self::Decimal
        )
    }

    /// Returns true when the family requires an explicit width.
    #[must_use]
    pub const fn requires_width(self) -> bool {
        matches!(self, Self::VarChar | Self::VarBinary)
    }
}

/// Parenthesized argument shape accepted after a type keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeArguments {
    /// No arguments.
    None,
    /// `(width)` display or storage width.
    Width,
    /// `(precision[, scale])`.
    PrecisionScale,
    /// `(fsp)` fractional seconds precision.
    FractionalSeconds,
    /// `('a', 'b', ...)` literal values.
    Values,
}

// ============================================================================
// SECTION: Descriptor
// ============================================================================

/// Maximum `DECIMAL` precision.
pub const MAX_DECIMAL_PRECISION: u32 = 65;
/// Maximum `DECIMAL` scale.
pub const MAX_DECIMAL_SCALE: u32 = 30;
/// Default `DECIMAL` precision when omitted.
pub const DEFAULT_DECIMAL_PRECISION: u32 = 10;

/// Canonical relational type descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SqlType {
    /// Type family.
    pub family: TypeFamily,
    /// Display or storage width (`VARCHAR(10)`, `INT(11)`, `BIT(8)`).
    pub width: Option<u32>,
    /// Numeric precision or fractional-seconds precision.
    pub precision: Option<u32>,
    /// Numeric scale.
    pub scale: Option<u32>,
    /// `UNSIGNED` qualifier.
    pub unsigned: bool,
    /// `ZEROFILL` qualifier (implies unsigned).
    pub zerofill: bool,
    /// `ENUM`/`SET` values in declared order.
    pub values: Vec<String>,
}

impl SqlType {
    /// Creates an unqualified descriptor for a family.
    #[must_use]
    pub const fn new(family: TypeFamily) -> Self {
        Self {
            family,
            width: None,
            precision: None,
            scale: None,
            unsigned: false,
            zerofill: false,
            values: Vec::new(),
        }
    }

    /// Returns `(precision, scale)` for exact numeric representations.
    ///
    /// `DECIMAL` defaults to `(10, 0)`; integer families report the digits
    /// needed for their full range.
    #[must_use]
    pub fn decimal_digits(&self) -> (u32, u32) {
        match self.family {
            TypeFamily::Decimal => {
                (self.precision.unwrap_or(DEFAULT_DECIMAL_PRECISION), self.scale.unwrap_or(0))
            }
            TypeFamily::BigInt => (if self.unsigned { 20 } else { 19 }, 0),
            TypeFamily::Int => (10, 0),
            TypeFamily::MediumInt => (8, 0),
            TypeFamily::SmallInt => (5, 0),
            TypeFamily::TinyInt => (3, 0),
            _ => (self.precision.unwrap_or(DEFAULT_DECIMAL_PRECISION), self.scale.unwrap_or(0)),
        }
    }

    /// Renders the descriptor as SQL, e.g. `DECIMAL(10,2) UNSIGNED`.
    #[must_use]
    pub fn to_sql(&self) -> String {
        let mut sql = self.family.sql_name().to_string();
        if !self.values.is_empty() {
            let values: Vec<String> =
                self.values.iter().map(|value| format!("'{}'", value.replace('\'', "''"))).collect();
            sql.push_str(&format!("({})", values.join(",")));
        } else if let Some(width) = self.width {
            sql.push_str(&format!("({width})"));
        } else if let Some(precision) = self.precision {
            match self.scale {
                Some(scale) => sql.push_str(&format!("({precision},{scale})")),
                None => sql.push_str(&format!("({precision})")),
            }
        }
        if self.unsigned {
            sql.push_str(" UNSIGNED");
        }
        if self.zerofill {
            sql.push_str(" ZEROFILL");
        }
        sql
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_collapse_onto_families() {
        assert_eq!(TypeFamily::from_keyword("integer"), Some(TypeFamily::Int));
        assert_eq!(TypeFamily::from_keyword("NUMERIC"), Some(TypeFamily::Decimal));
        assert_eq!(TypeFamily::from_keyword("Boolean"), Some(TypeFamily::Bool));
        assert_eq!(TypeFamily::from_keyword("GEOMETRY"), None);
    }

    #[test]
    fn renders_qualified_sql() {
        let mut decimal = SqlType::new(TypeFamily::Decimal);
        decimal.precision = Some(12);
        decimal.scale = Some(4);
        decimal.unsigned = true;
        assert_eq!(decimal.to_sql(), "DECIMAL(12,4) UNSIGNED");
        assert_eq!(decimal.decimal_digits(), (12, 4));
    }
}
