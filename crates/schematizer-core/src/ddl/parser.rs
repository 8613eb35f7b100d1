// crates/schematizer-core/src/ddl/parser.rs
// ============================================================================
// Module: DDL Parser
// Description: CREATE TABLE / ALTER TABLE grammar over the token cursor.
// Purpose: Fold ordered DDL statements into a single table model.
// Dependencies: crate::ddl::{lexer, table, types}
// ============================================================================

//! ## Overview
//! The parser accepts the MySQL table-definition subset needed to track a
//! table's shape: column definitions, primary keys, secondary indexes, and the
//! column-level `ALTER TABLE` operations. Foreign keys, checks, and table
//! options are accepted and ignored. Anything else is a malformed statement.

// ============================================================================
// SECTION: Imports
// ============================================================================

use sqlparser::tokenizer::Token;

use crate::ddl::ConversionError;
use crate::ddl::SqlDialect;
use crate::ddl::lexer::TokenCursor;
use crate::ddl::table::Column;
use crate::ddl::table::DefaultValue;
use crate::ddl::table::Index;
use crate::ddl::table::IndexKind;
use crate::ddl::table::Placement;
use crate::ddl::table::TableModel;
use crate::ddl::types::MAX_DECIMAL_PRECISION;
use crate::ddl::types::MAX_DECIMAL_SCALE;
use crate::ddl::types::SqlType;
use crate::ddl::types::TypeArguments;
use crate::ddl::types::TypeFamily;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// Folds ordered DDL statements for one table into a [`TableModel`].
///
/// The first statement must be `CREATE TABLE`; later statements must be
/// `ALTER TABLE` against the same table (following renames).
///
/// # Errors
///
/// Returns [`ConversionError::MalformedStatement`] for grammar failures,
/// [`ConversionError::SemanticConflict`] when a statement contradicts the
/// accumulated state, and [`ConversionError::UnsupportedType`] for unknown
/// column types.
pub fn parse_table<S: AsRef<str>>(
    statements: &[S],
    dialect: SqlDialect,
) -> Result<TableModel, ConversionError> {
    let mut table: Option<TableModel> = None;
    for statement in statements {
        let mut parser = StatementParser::new(statement.as_ref(), dialect)?;
        table = Some(parser.apply(table)?);
    }
    table.ok_or_else(|| ConversionError::MalformedStatement {
        statement: String::new(),
        reason: "no CREATE TABLE statement".to_string(),
    })
}

// ============================================================================
// SECTION: Statement Parser
// ============================================================================

/// Key declarations attached to a column definition.
#[derive(Debug, Default)]
struct InlineKeys {
    /// `PRIMARY KEY` / `KEY` on the column.
    primary: bool,
    /// `UNIQUE [KEY]` on the column.
    unique: bool,
}

/// Table-level key constraint.
#[derive(Debug)]
enum Constraint {
    /// `PRIMARY KEY (cols)`.
    PrimaryKey(Vec<String>),
    /// Secondary index; the name is derived when absent.
    Index {
        /// Declared name.
        name: Option<String>,
        /// Index kind.
        kind: IndexKind,
        /// Key columns.
        columns: Vec<String>,
    },
    /// Accepted but not modelled (foreign keys, checks).
    Ignored,
}

/// Parser for a single statement.
struct StatementParser<'a> {
    /// Token cursor for the statement.
    cursor: TokenCursor<'a>,
}

impl<'a> StatementParser<'a> {
    /// Tokenizes the statement.
    fn new(statement: &'a str, dialect: SqlDialect) -> Result<Self, ConversionError> {
        Ok(Self {
            cursor: TokenCursor::new(statement, dialect)?,
        })
    }

    /// Applies the statement to the accumulated table state.
    fn apply(&mut self, table: Option<TableModel>) -> Result<TableModel, ConversionError> {
        let table = if self.cursor.eat_keyword("CREATE") {
            self.cursor.eat_keyword("TEMPORARY");
            self.cursor.expect_keyword("TABLE")?;
            if let Some(existing) = table {
                return Err(ConversionError::conflict(format!(
                    "table `{}` is already created",
                    existing.name
                )));
            }
            self.create_table()?
        } else if self.cursor.eat_keyword("ALTER") {
            self.cursor.eat_keyword("IGNORE");
            self.cursor.expect_keyword("TABLE")?;
            let name = self.cursor.object_name("table name")?;
            let Some(mut table) = table else {
                return Err(ConversionError::conflict(format!(
                    "ALTER TABLE `{name}` precedes CREATE TABLE"
                )));
            };
            if !name.eq_ignore_ascii_case(&table.name) {
                return Err(ConversionError::conflict(format!(
                    "ALTER TABLE targets `{name}` but the statements define `{}`",
                    table.name
                )));
            }
            self.alter_table(&mut table)?;
            table
        } else {
            return Err(self.cursor.expected("CREATE TABLE or ALTER TABLE"));
        };
        self.cursor.eat_token(&Token::SemiColon);
        if let Some(token) = self.cursor.peek() {
            return Err(self.cursor.malformed(format!("unexpected trailing token `{token}`")));
        }
        Ok(table)
    }

    // ------------------------------------------------------------------------
    // CREATE TABLE
    // ------------------------------------------------------------------------

    /// Parses the remainder of `CREATE TABLE`.
    fn create_table(&mut self) -> Result<TableModel, ConversionError> {
        self.cursor.eat_keywords(&["IF", "NOT", "EXISTS"]);
        let name = self.cursor.object_name("table name")?;
        if self.cursor.peek_keyword("LIKE") || self.cursor.peek_keyword("AS") {
            return Err(self.cursor.malformed("CREATE TABLE must list column definitions"));
        }
        self.cursor.expect_token(&Token::LParen)?;
        let mut table = TableModel::new(name);
        let mut constraints = Vec::new();
        loop {
            if self.starts_constraint() {
                constraints.push(self.constraint()?);
            } else {
                let name = self.cursor.identifier("column name")?;
                let (column, keys) = self.column_definition(name)?;
                let column_name = column.name.clone();
                table.add_column(column, &Placement::Default)?;
                constraints.extend(inline_constraints(&column_name, &keys));
            }
            if !self.cursor.eat_token(&Token::Comma) {
                break;
            }
        }
        if !self.cursor.eat_token(&Token::RParen) {
            return Err(self.cursor.expected("`,` or `)`"));
        }
        // Constraints may reference columns declared after them.
        for constraint in constraints {
            apply_constraint(&mut table, constraint)?;
        }
        self.skip_table_options();
        Ok(table)
    }

    /// Skips trailing table options (`ENGINE=...`, `DEFAULT CHARSET=...`).
    fn skip_table_options(&mut self) {
        while let Some(token) = self.cursor.peek() {
            if *token == Token::SemiColon {
                break;
            }
            self.cursor.next_token();
        }
    }

    /// Returns true when the next tokens open a table-level constraint.
    fn starts_constraint(&self) -> bool {
        ["CONSTRAINT", "PRIMARY", "UNIQUE", "INDEX", "KEY", "FULLTEXT", "SPATIAL", "FOREIGN", "CHECK"]
            .iter()
            .any(|keyword| self.cursor.peek_keyword(keyword))
    }

    /// Parses a table-level constraint definition.
    fn constraint(&mut self) -> Result<Constraint, ConversionError> {
        if self.cursor.eat_keyword("CONSTRAINT")
            && !["PRIMARY", "UNIQUE", "FOREIGN", "CHECK"]
                .iter()
                .any(|keyword| self.cursor.peek_keyword(keyword))
        {
            self.cursor.identifier("constraint name")?;
        }
        if self.cursor.eat_keywords(&["PRIMARY", "KEY"]) {
            self.index_type();
            let columns = self.cursor.identifier_list()?;
            self.cursor.skip_clause()?;
            return Ok(Constraint::PrimaryKey(columns));
        }
        if self.cursor.eat_keyword("FOREIGN") || self.cursor.eat_keyword("CHECK") {
            self.cursor.skip_clause()?;
            return Ok(Constraint::Ignored);
        }
        let kind = if self.cursor.eat_keyword("UNIQUE") {
            IndexKind::Unique
        } else if self.cursor.eat_keyword("FULLTEXT") {
            IndexKind::FullText
        } else if self.cursor.eat_keyword("SPATIAL") {
            IndexKind::Spatial
        } else {
            IndexKind::Index
        };
        let keyword_required = kind == IndexKind::Index;
        let has_keyword = self.cursor.eat_keyword("INDEX") || self.cursor.eat_keyword("KEY");
        if keyword_required && !has_keyword {
            return Err(self.cursor.expected("INDEX or KEY"));
        }
        let name = match self.cursor.peek() {
            Some(Token::Word(_)) if !self.cursor.peek_keyword("USING") => {
                Some(self.cursor.identifier("index name")?)
            }
            _ => None,
        };
        self.index_type();
        let columns = self.cursor.identifier_list()?;
        self.cursor.skip_clause()?;
        Ok(Constraint::Index {
            name,
            kind,
            columns,
        })
    }

    /// Skips an optional `USING {BTREE|HASH}` clause.
    fn index_type(&mut self) {
        if self.cursor.eat_keyword("USING") {
            self.cursor.next_token();
        }
    }

    // ------------------------------------------------------------------------
    // Column definitions
    // ------------------------------------------------------------------------

    /// Parses a column definition following its name.
    fn column_definition(&mut self, name: String) -> Result<(Column, InlineKeys), ConversionError> {
        let sql_type = self.column_type()?;
        let mut column = Column::new(name, sql_type);
        let mut keys = InlineKeys::default();
        loop {
            if self.cursor.eat_keywords(&["NOT", "NULL"]) {
                column.nullable = false;
            } else if self.cursor.eat_keyword("NULL") {
                column.nullable = true;
            } else if self.cursor.eat_keyword("DEFAULT") {
                column.default = Some(self.default_value()?);
            } else if self.cursor.eat_keyword("AUTO_INCREMENT") {
                column.auto_increment = true;
            } else if self.cursor.eat_keyword("UNIQUE") {
                if !self.cursor.eat_keyword("KEY") {
                    self.cursor.eat_keyword("INDEX");
                }
                keys.unique = true;
            } else if self.cursor.eat_keywords(&["PRIMARY", "KEY"]) || self.cursor.eat_keyword("KEY")
            {
                keys.primary = true;
            } else if self.cursor.eat_keyword("COMMENT") {
                column.comment = Some(self.cursor.string_literal("comment text")?);
            } else if self.cursor.eat_keywords(&["ON", "UPDATE"]) {
                if self.default_value()? != DefaultValue::CurrentTimestamp {
                    return Err(self.cursor.malformed("ON UPDATE requires CURRENT_TIMESTAMP"));
                }
            } else if self.cursor.eat_keywords(&["CHARACTER", "SET"])
                || self.cursor.eat_keyword("CHARSET")
                || self.cursor.eat_keyword("COLLATE")
                || self.cursor.eat_keyword("COLUMN_FORMAT")
                || self.cursor.eat_keyword("STORAGE")
            {
                self.cursor.identifier("attribute value")?;
            } else if self.cursor.eat_keyword("BINARY")
                || self.cursor.eat_keyword("VISIBLE")
                || self.cursor.eat_keyword("INVISIBLE")
            {
                // No effect on the converted schema.
            } else if self.cursor.peek_keyword("REFERENCES") {
                self.cursor.skip_clause()?;
            } else {
                break;
            }
        }
        Ok((column, keys))
    }

    /// Parses a column type with its arguments and sign qualifiers.
    fn column_type(&mut self) -> Result<SqlType, ConversionError> {
        let keyword = match self.cursor.peek() {
            Some(Token::Word(word)) if word.quote_style.is_none() => word.value.clone(),
            _ => return Err(self.cursor.expected("column type")),
        };
        self.cursor.next_token();
        let family = self.type_family(&keyword)?;
        let mut sql_type = SqlType::new(family);
        if self.cursor.eat_token(&Token::LParen) {
            self.type_arguments(&mut sql_type)?;
            self.cursor.expect_token(&Token::RParen)?;
        } else if family.arguments() == TypeArguments::Values {
            return Err(self.cursor.malformed(format!("{} requires a value list", family.sql_name())));
        }
        if family.requires_width() && sql_type.width.is_none() {
            return Err(self.cursor.malformed(format!("{} requires a length", family.sql_name())));
        }
        loop {
            if self.cursor.eat_keyword("UNSIGNED") {
                self.require_numeric(family, "UNSIGNED")?;
                sql_type.unsigned = true;
            } else if self.cursor.eat_keyword("SIGNED") {
                self.require_numeric(family, "SIGNED")?;
            } else if self.cursor.eat_keyword("ZEROFILL") {
                self.require_numeric(family, "ZEROFILL")?;
                sql_type.zerofill = true;
                sql_type.unsigned = true;
            } else {
                break;
            }
        }
        Ok(sql_type)
    }

    /// Resolves a type keyword, consuming multi-word spellings.
    fn type_family(&mut self, keyword: &str) -> Result<TypeFamily, ConversionError> {
        let upper = keyword.to_ascii_uppercase();
        match upper.as_str() {
            "DOUBLE" => {
                self.cursor.eat_keyword("PRECISION");
                Ok(TypeFamily::Double)
            }
            "NATIONAL" => {
                let next = self.cursor.identifier("column type")?;
                self.type_family(&next)
            }
            "CHAR" | "CHARACTER" if self.cursor.eat_keyword("VARYING") => Ok(TypeFamily::VarChar),
            "LONG" if self.cursor.eat_keyword("VARBINARY") => Ok(TypeFamily::MediumBlob),
            "LONG" => {
                self.cursor.eat_keyword("VARCHAR");
                Ok(TypeFamily::MediumText)
            }
            _ => TypeFamily::from_keyword(&upper).ok_or(ConversionError::UnsupportedType(upper)),
        }
    }

    /// Parses parenthesized type arguments after the opening parenthesis.
    fn type_arguments(&mut self, sql_type: &mut SqlType) -> Result<(), ConversionError> {
        let family = sql_type.family;
        match family.arguments() {
            TypeArguments::None => Err(self
                .cursor
                .malformed(format!("{} does not take arguments", family.sql_name()))),
            TypeArguments::Width => {
                let width = self.cursor.unsigned_integer("type width")?;
                if family == TypeFamily::Bit && !(1..=64).contains(&width) {
                    return Err(self.cursor.malformed(format!("BIT width {width} out of range")));
                }
                sql_type.width = Some(width);
                Ok(())
            }
            TypeArguments::PrecisionScale => {
                let precision = self.cursor.unsigned_integer("type precision")?;
                let scale = if self.cursor.eat_token(&Token::Comma) {
                    Some(self.cursor.unsigned_integer("type scale")?)
                } else {
                    None
                };
                if family == TypeFamily::Decimal
                    && (precision == 0
                        || precision > MAX_DECIMAL_PRECISION
                        || scale.is_some_and(|scale| scale > MAX_DECIMAL_SCALE || scale > precision))
                {
                    return Err(self.cursor.malformed(format!(
                        "invalid DECIMAL precision/scale ({precision},{})",
                        scale.unwrap_or(0)
                    )));
                }
                sql_type.precision = Some(precision);
                sql_type.scale = scale;
                Ok(())
            }
            TypeArguments::FractionalSeconds => {
                let precision = self.cursor.unsigned_integer("fractional seconds precision")?;
                if precision > 6 {
                    return Err(self
                        .cursor
                        .malformed(format!("fractional seconds precision {precision} exceeds 6")));
                }
                sql_type.precision = Some(precision);
                Ok(())
            }
            TypeArguments::Values => {
                loop {
                    let value = self.cursor.string_literal("quoted value")?;
                    if sql_type.values.iter().any(|existing| existing.eq_ignore_ascii_case(&value)) {
                        return Err(ConversionError::conflict(format!(
                            "duplicate value '{value}' in {}",
                            family.sql_name()
                        )));
                    }
                    sql_type.values.push(value);
                    if !self.cursor.eat_token(&Token::Comma) {
                        break;
                    }
                }
                Ok(())
            }
        }
    }

    /// Rejects sign qualifiers on non-numeric families.
    fn require_numeric(&self, family: TypeFamily, qualifier: &str) -> Result<(), ConversionError> {
        if family.is_numeric() {
            Ok(())
        } else {
            Err(self.cursor.malformed(format!("{qualifier} is not valid for {}", family.sql_name())))
        }
    }

    /// Parses a `DEFAULT` value.
    fn default_value(&mut self) -> Result<DefaultValue, ConversionError> {
        let Some(token) = self.cursor.next_token() else {
            return Err(self.cursor.expected("default value"));
        };
        match token {
            Token::Number(text, _) => Ok(DefaultValue::Number(text)),
            Token::Minus => self.signed_number("-"),
            Token::Plus => self.signed_number(""),
            Token::SingleQuotedString(text) | Token::DoubleQuotedString(text) => {
                Ok(DefaultValue::String(text))
            }
            Token::SingleQuotedByteStringLiteral(bits) => self.bit_literal(bits),
            Token::Word(word) if word.quote_style.is_none() => {
                let upper = word.value.to_ascii_uppercase();
                match upper.as_str() {
                    "NULL" => Ok(DefaultValue::Null),
                    "TRUE" => Ok(DefaultValue::Boolean(true)),
                    "FALSE" => Ok(DefaultValue::Boolean(false)),
                    "B" => match self.cursor.next_token() {
                        Some(Token::SingleQuotedString(bits)) => self.bit_literal(bits),
                        _ => Err(self.cursor.malformed("expected bit literal after b")),
                    },
                    "CURRENT_TIMESTAMP" | "NOW" | "LOCALTIME" | "LOCALTIMESTAMP" => {
                        if self.cursor.eat_token(&Token::LParen) {
                            if !self.cursor.eat_token(&Token::RParen) {
                                self.cursor.unsigned_integer("fractional seconds precision")?;
                                self.cursor.expect_token(&Token::RParen)?;
                            }
                        } else if upper == "NOW" {
                            return Err(self.cursor.expected("`(`"));
                        }
                        Ok(DefaultValue::CurrentTimestamp)
                    }
                    _ => Err(self.cursor.malformed(format!("unsupported default `{}`", word.value))),
                }
            }
            Token::LParen => Err(self.cursor.malformed("expression defaults are not supported")),
            other => Err(self.cursor.malformed(format!("unsupported default `{other}`"))),
        }
    }

    /// Parses the number following a sign in a default value.
    fn signed_number(&mut self, sign: &str) -> Result<DefaultValue, ConversionError> {
        match self.cursor.next_token() {
            Some(Token::Number(text, _)) => Ok(DefaultValue::Number(format!("{sign}{text}"))),
            _ => Err(self.cursor.malformed("expected a number after sign in DEFAULT")),
        }
    }

    /// Validates a `b'...'` bit literal.
    fn bit_literal(&self, bits: String) -> Result<DefaultValue, ConversionError> {
        if bits.chars().all(|ch| ch == '0' || ch == '1') {
            Ok(DefaultValue::Bits(bits))
        } else {
            Err(self.cursor.malformed(format!("invalid bit literal b'{bits}'")))
        }
    }

    /// Parses an optional `FIRST` / `AFTER col` placement.
    fn placement(&mut self) -> Result<Placement, ConversionError> {
        if self.cursor.eat_keyword("FIRST") {
            return Ok(Placement::First);
        }
        if self.cursor.eat_keyword("AFTER") {
            return Ok(Placement::After(self.cursor.identifier("column name")?));
        }
        Ok(Placement::Default)
    }

    // ------------------------------------------------------------------------
    // ALTER TABLE
    // ------------------------------------------------------------------------

    /// Applies comma-separated alter specifications.
    fn alter_table(&mut self, table: &mut TableModel) -> Result<(), ConversionError> {
        loop {
            self.alter_specification(table)?;
            if !self.cursor.eat_token(&Token::Comma) {
                return Ok(());
            }
        }
    }

    /// Applies one alter specification.
    fn alter_specification(&mut self, table: &mut TableModel) -> Result<(), ConversionError> {
        if self.cursor.eat_keyword("ADD") {
            return self.alter_add(table);
        }
        if self.cursor.eat_keyword("DROP") {
            return self.alter_drop(table);
        }
        if self.cursor.eat_keyword("MODIFY") {
            self.cursor.eat_keyword("COLUMN");
            let name = self.cursor.identifier("column name")?;
            return self.redefine_column(table, &name, name.clone());
        }
        if self.cursor.eat_keyword("CHANGE") {
            self.cursor.eat_keyword("COLUMN");
            let old_name = self.cursor.identifier("column name")?;
            let new_name = self.cursor.identifier("new column name")?;
            return self.redefine_column(table, &old_name, new_name);
        }
        if self.cursor.eat_keyword("RENAME") {
            return self.alter_rename(table);
        }
        if self.cursor.eat_keyword("ALTER") {
            return self.alter_column_default(table);
        }
        let table_option = [
            "ENGINE",
            "DEFAULT",
            "CHARACTER",
            "CHARSET",
            "COLLATE",
            "COMMENT",
            "AUTO_INCREMENT",
            "ROW_FORMAT",
            "CONVERT",
            "ALGORITHM",
            "LOCK",
            "FORCE",
        ]
        .iter()
        .any(|keyword| self.cursor.peek_keyword(keyword));
        if table_option {
            return self.cursor.skip_clause();
        }
        Err(self.cursor.expected("ALTER TABLE operation"))
    }

    /// Handles `ADD ...`.
    fn alter_add(&mut self, table: &mut TableModel) -> Result<(), ConversionError> {
        let column_keyword = self.cursor.eat_keyword("COLUMN");
        if !column_keyword && self.starts_constraint() {
            let constraint = self.constraint()?;
            return apply_constraint(table, constraint);
        }
        if self.cursor.eat_token(&Token::LParen) {
            loop {
                let name = self.cursor.identifier("column name")?;
                self.add_column(table, name, false)?;
                if !self.cursor.eat_token(&Token::Comma) {
                    break;
                }
            }
            return self.cursor.expect_token(&Token::RParen);
        }
        let name = self.cursor.identifier("column name")?;
        self.add_column(table, name, true)
    }

    /// Parses and adds one column, with placement when allowed.
    fn add_column(
        &mut self,
        table: &mut TableModel,
        name: String,
        allow_placement: bool,
    ) -> Result<(), ConversionError> {
        let (column, keys) = self.column_definition(name)?;
        let placement = if allow_placement { self.placement()? } else { Placement::Default };
        let column_name = column.name.clone();
        table.add_column(column, &placement)?;
        for constraint in inline_constraints(&column_name, &keys) {
            apply_constraint(table, constraint)?;
        }
        Ok(())
    }

    /// Handles `MODIFY` and `CHANGE`.
    fn redefine_column(
        &mut self,
        table: &mut TableModel,
        old_name: &str,
        new_name: String,
    ) -> Result<(), ConversionError> {
        let (column, keys) = self.column_definition(new_name)?;
        let placement = self.placement()?;
        let column_name = column.name.clone();
        table.replace_column(old_name, column, &placement)?;
        for constraint in inline_constraints(&column_name, &keys) {
            apply_constraint(table, constraint)?;
        }
        Ok(())
    }

    /// Handles `DROP ...`.
    fn alter_drop(&mut self, table: &mut TableModel) -> Result<(), ConversionError> {
        if self.cursor.eat_keywords(&["PRIMARY", "KEY"]) {
            return table.drop_primary_key();
        }
        if self.cursor.eat_keyword("INDEX") || self.cursor.eat_keyword("KEY") {
            let name = self.cursor.identifier("index name")?;
            return table.drop_index(&name);
        }
        if self.cursor.eat_keywords(&["FOREIGN", "KEY"])
            || self.cursor.eat_keyword("CHECK")
            || self.cursor.eat_keyword("CONSTRAINT")
        {
            self.cursor.identifier("constraint name")?;
            return Ok(());
        }
        self.cursor.eat_keyword("COLUMN");
        let name = self.cursor.identifier("column name")?;
        table.drop_column(&name)
    }

    /// Handles `RENAME ...`.
    fn alter_rename(&mut self, table: &mut TableModel) -> Result<(), ConversionError> {
        if self.cursor.eat_keyword("COLUMN") {
            let old_name = self.cursor.identifier("column name")?;
            self.cursor.expect_keyword("TO")?;
            let new_name = self.cursor.identifier("new column name")?;
            return table.rename_column(&old_name, &new_name);
        }
        if self.cursor.eat_keyword("INDEX") || self.cursor.eat_keyword("KEY") {
            let old_name = self.cursor.identifier("index name")?;
            self.cursor.expect_keyword("TO")?;
            let new_name = self.cursor.identifier("new index name")?;
            return table.rename_index(&old_name, &new_name);
        }
        if !self.cursor.eat_keyword("TO") {
            self.cursor.eat_keyword("AS");
        }
        table.name = self.cursor.object_name("new table name")?;
        Ok(())
    }

    /// Handles `ALTER [COLUMN] col {SET DEFAULT v | DROP DEFAULT}`.
    fn alter_column_default(&mut self, table: &mut TableModel) -> Result<(), ConversionError> {
        if self.cursor.eat_keyword("INDEX") {
            self.cursor.identifier("index name")?;
            if !self.cursor.eat_keyword("VISIBLE") {
                self.cursor.expect_keyword("INVISIBLE")?;
            }
            return Ok(());
        }
        self.cursor.eat_keyword("COLUMN");
        let name = self.cursor.identifier("column name")?;
        if self.cursor.eat_keywords(&["SET", "DEFAULT"]) {
            let default = self.default_value()?;
            return table.set_default(&name, Some(default));
        }
        if self.cursor.eat_keywords(&["DROP", "DEFAULT"]) {
            return table.set_default(&name, None);
        }
        Err(self.cursor.expected("SET DEFAULT or DROP DEFAULT"))
    }
}

// ============================================================================
// SECTION: Constraint Helpers
// ============================================================================

/// Converts inline column keys into table constraints.
fn inline_constraints(column: &str, keys: &InlineKeys) -> Vec<Constraint> {
    let mut constraints = Vec::new();
    if keys.primary {
        constraints.push(Constraint::PrimaryKey(vec![column.to_string()]));
    }
    if keys.unique {
        constraints.push(Constraint::Index {
            name: None,
            kind: IndexKind::Unique,
            columns: vec![column.to_string()],
        });
    }
    constraints
}

/// Applies a constraint to the table.
fn apply_constraint(table: &mut TableModel, constraint: Constraint) -> Result<(), ConversionError> {
    match constraint {
        Constraint::PrimaryKey(columns) => table.set_primary_key(columns),
        Constraint::Index {
            name,
            kind,
            columns,
        } => {
            let name = match name {
                Some(name) => name,
                None => {
                    let first = columns.first().map_or("index", String::as_str);
                    table.unused_index_name(first)
                }
            };
            table.add_index(Index {
                name,
                kind,
                columns,
            })
        }
        Constraint::Ignored => Ok(()),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic, reason = "Test-only assertions.")]

    use super::*;

    fn parse(statements: &[&str]) -> Result<TableModel, ConversionError> {
        parse_table(statements, SqlDialect::MySql)
    }

    #[test]
    fn type_qualifiers_normalize() {
        let table = parse(&[
            "CREATE TABLE `t` (`a` int(11) unsigned zerofill, b DECIMAL(8, 2) NOT NULL, \
             c enum('x','y') DEFAULT 'x', d DOUBLE PRECISION, e VARCHAR(20) CHARACTER SET utf8 \
             COLLATE utf8_bin)",
        ])
        .unwrap();
        let a = &table.columns[0].sql_type;
        assert_eq!((a.family, a.width, a.unsigned, a.zerofill), (TypeFamily::Int, Some(11), true, true));
        let b = &table.columns[1].sql_type;
        assert_eq!((b.precision, b.scale), (Some(8), Some(2)));
        assert!(!table.columns[1].nullable);
        assert_eq!(table.columns[2].sql_type.values, ["x", "y"]);
        assert_eq!(table.columns[3].sql_type.family, TypeFamily::Double);
        assert_eq!(table.columns[4].sql_type.width, Some(20));
    }

    #[test]
    fn constraints_may_precede_columns() {
        let table = parse(&["CREATE TABLE t (PRIMARY KEY (id), KEY ix_name (name(4)), \
                            id INT NOT NULL AUTO_INCREMENT, name TEXT) ENGINE=InnoDB"])
        .unwrap();
        assert_eq!(table.primary_key, ["id"]);
        assert_eq!(table.indexes[0].name, "ix_name");
        assert!(table.columns[0].auto_increment);
    }

    #[test]
    fn defaults_are_captured() {
        let table = parse(&["CREATE TABLE t (a INT DEFAULT -5, b TIMESTAMP NOT NULL DEFAULT \
                            CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP, c BIT(1) DEFAULT b'1', \
                            d TEXT DEFAULT NULL, e BOOL DEFAULT TRUE)"])
        .unwrap();
        let defaults: Vec<_> = table.columns.iter().map(|column| column.default.clone()).collect();
        assert_eq!(
            defaults,
            [
                Some(DefaultValue::Number("-5".to_string())),
                Some(DefaultValue::CurrentTimestamp),
                Some(DefaultValue::Bits("1".to_string())),
                Some(DefaultValue::Null),
                Some(DefaultValue::Boolean(true)),
            ]
        );
    }

    #[test]
    fn alter_operations_fold_in_order() {
        let table = parse(&[
            "CREATE TABLE t (id INT, a INT, b INT)",
            "ALTER TABLE t ADD COLUMN c INT FIRST, DROP COLUMN a",
            "ALTER TABLE t CHANGE b bee BIGINT NOT NULL AFTER c",
            "ALTER TABLE t MODIFY id INT NOT NULL DEFAULT 0",
            "ALTER TABLE t RENAME TO t2",
            "ALTER TABLE t2 ADD PRIMARY KEY (id), ALTER COLUMN id DROP DEFAULT",
        ])
        .unwrap();
        let names: Vec<_> = table.columns.iter().map(|column| column.name.as_str()).collect();
        assert_eq!(names, ["c", "bee", "id"]);
        assert_eq!(table.name, "t2");
        assert_eq!(table.primary_key, ["id"]);
        assert_eq!(table.columns[2].default, None);
        assert!(!table.columns[2].nullable);
    }

    #[test]
    fn statement_ordering_errors() {
        let alter_first = parse(&["ALTER TABLE t ADD c INT"]).unwrap_err();
        assert!(matches!(alter_first, ConversionError::SemanticConflict(_)));
        let double_create = parse(&["CREATE TABLE t (a INT)", "CREATE TABLE t (a INT)"]).unwrap_err();
        assert!(matches!(double_create, ConversionError::SemanticConflict(_)));
        let other_table = parse(&["CREATE TABLE t (a INT)", "ALTER TABLE u ADD b INT"]).unwrap_err();
        assert!(matches!(other_table, ConversionError::SemanticConflict(_)));
    }

    #[test]
    fn unknown_type_names_the_type() {
        let err = parse(&["CREATE TABLE t (g GEOMETRY)"]).unwrap_err();
        assert_eq!(err, ConversionError::UnsupportedType("GEOMETRY".to_string()));
    }

    #[test]
    fn malformed_statement_reports_token() {
        let err = parse(&["CREATE TABLE t (a INT,, b INT)"]).unwrap_err();
        let ConversionError::MalformedStatement { reason, .. } = err else {
            panic!("expected malformed statement");
        };
        assert!(reason.contains("column name"), "{reason}");
    }
}
