// crates/schematizer-core/src/ddl/table.rs
// ============================================================================
// Module: Table Model
// Description: In-memory relational table state built from DDL.
// Purpose: Apply CREATE/ALTER effects with semantic conflict detection.
// Dependencies: crate::ddl::{types, ConversionError}, serde
// ============================================================================

//! ## Overview
//! [`TableModel`] holds ordered columns, the primary key, and secondary
//! indexes. Every mutation validates against the current state and fails with
//! [`ConversionError::SemanticConflict`] instead of silently ignoring a
//! reference to something that does not exist.
//!
//! Column and index names compare case-insensitively; declared case is kept.
//! Declaring a primary key does not change column nullability.

use serde::Deserialize;
use serde::Serialize;

use crate::ddl::ConversionError;
use crate::ddl::types::SqlType;

// ============================================================================
// SECTION: Columns
// ============================================================================

/// Column default value as written in DDL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DefaultValue {
    /// `DEFAULT NULL`.
    Null,
    /// Numeric literal, kept as written (sign included).
    Number(String),
    /// Quoted string literal, unescaped.
    String(String),
    /// `TRUE` / `FALSE`.
    Boolean(bool),
    /// Bit-value literal (`b'101'`), binary digits only.
    Bits(String),
    /// `CURRENT_TIMESTAMP` / `NOW()` and synonyms.
    CurrentTimestamp,
}

/// Column definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name in declared case.
    pub name: String,
    /// Normalized type descriptor.
    pub sql_type: SqlType,
    /// Whether the column accepts NULL.
    pub nullable: bool,
    /// Declared default, if any.
    pub default: Option<DefaultValue>,
    /// `AUTO_INCREMENT` flag.
    pub auto_increment: bool,
    /// `COMMENT '...'` text.
    pub comment: Option<String>,
}

impl Column {
    /// Creates a nullable column without default or comment.
    #[must_use]
    pub const fn new(name: String, sql_type: SqlType) -> Self {
        Self {
            name,
            sql_type,
            nullable: true,
            default: None,
            auto_increment: false,
            comment: None,
        }
    }
}

/// Where an added or redefined column lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// Keep the current position (append when new).
    Default,
    /// Move to the first position.
    First,
    /// Place directly after the named column.
    After(String),
}

// ============================================================================
// SECTION: Indexes
// ============================================================================

/// Secondary index kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexKind {
    /// Plain `INDEX`/`KEY`.
    Index,
    /// `UNIQUE`.
    Unique,
    /// `FULLTEXT`.
    FullText,
    /// `SPATIAL`.
    Spatial,
}

/// Secondary index over one or more columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    /// Index name; derived from the first column when not declared.
    pub name: String,
    /// Index kind.
    pub kind: IndexKind,
    /// Indexed column names in key order.
    pub columns: Vec<String>,
}

// ============================================================================
// SECTION: Table Model
// ============================================================================

/// Resolved table state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableModel {
    /// Table name.
    pub name: String,
    /// Columns in table order.
    pub columns: Vec<Column>,
    /// Primary key column names in key order; empty when none.
    pub primary_key: Vec<String>,
    /// Secondary indexes in declaration order.
    pub indexes: Vec<Index>,
}

impl TableModel {
    /// Creates an empty table.
    #[must_use]
    pub const fn new(name: String) -> Self {
        Self {
            name,
            columns: Vec::new(),
            primary_key: Vec::new(),
            indexes: Vec::new(),
        }
    }

    /// Returns the column position by case-insensitive name.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.name.eq_ignore_ascii_case(name))
    }

    /// Returns the column by case-insensitive name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.position(name).and_then(|index| self.columns.get(index))
    }

    /// Returns the 1-based primary key position of a column.
    #[must_use]
    pub fn primary_key_position(&self, name: &str) -> Option<usize> {
        self.primary_key.iter().position(|key| key.eq_ignore_ascii_case(name)).map(|index| index + 1)
    }

    /// Appends or inserts a new column.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::SemanticConflict`] when the name already
    /// exists or the placement anchor is absent.
    pub fn add_column(&mut self, column: Column, placement: &Placement) -> Result<(), ConversionError> {
        if self.position(&column.name).is_some() {
            return Err(ConversionError::conflict(format!(
                "column `{}` already exists in table `{}`",
                column.name, self.name
            )));
        }
        let index = self.insertion_index(placement, self.columns.len())?;
        self.columns.insert(index, column);
        Ok(())
    }

    /// Removes a column and every key reference to it.
    ///
    /// Indexes left without columns are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::SemanticConflict`] when the column is absent.
    pub fn drop_column(&mut self, name: &str) -> Result<(), ConversionError> {
        let index = self.require(name)?;
        self.columns.remove(index);
        self.primary_key.retain(|key| !key.eq_ignore_ascii_case(name));
        for entry in &mut self.indexes {
            entry.columns.retain(|column| !column.eq_ignore_ascii_case(name));
        }
        self.indexes.retain(|entry| !entry.columns.is_empty());
        Ok(())
    }

    /// Replaces the definition of `old_name` with `column`, optionally moving it.
    ///
    /// Covers both `MODIFY` (same name) and `CHANGE` (rename + redefine).
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::SemanticConflict`] when `old_name` is absent,
    /// the new name collides with another column, or the anchor is absent.
    pub fn replace_column(
        &mut self,
        old_name: &str,
        column: Column,
        placement: &Placement,
    ) -> Result<(), ConversionError> {
        let index = self.require(old_name)?;
        if let Some(existing) = self.position(&column.name)
            && existing != index
        {
            return Err(ConversionError::conflict(format!(
                "column `{}` already exists in table `{}`",
                column.name, self.name
            )));
        }
        let new_name = column.name.clone();
        if *placement == Placement::Default {
            if let Some(slot) = self.columns.get_mut(index) {
                *slot = column;
            }
        } else {
            if let Placement::After(anchor) = placement
                && (anchor.eq_ignore_ascii_case(old_name) || self.position(anchor).is_none())
            {
                return Err(self.missing_column(anchor));
            }
            self.columns.remove(index);
            let target = self.insertion_index(placement, index)?;
            self.columns.insert(target, column);
        }
        self.rename_key_references(old_name, &new_name);
        Ok(())
    }

    /// Renames a column in place, keeping its definition.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::SemanticConflict`] when `old_name` is absent
    /// or `new_name` is taken by another column.
    pub fn rename_column(&mut self, old_name: &str, new_name: &str) -> Result<(), ConversionError> {
        let Some(column) = self.column(old_name).cloned() else {
            return Err(self.missing_column(old_name));
        };
        let mut renamed = column;
        renamed.name = new_name.to_string();
        self.replace_column(old_name, renamed, &Placement::Default)
    }

    /// Sets or clears a column default.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::SemanticConflict`] when the column is absent.
    pub fn set_default(
        &mut self,
        name: &str,
        default: Option<DefaultValue>,
    ) -> Result<(), ConversionError> {
        let index = self.require(name)?;
        if let Some(column) = self.columns.get_mut(index) {
            column.default = default;
        }
        Ok(())
    }

    /// Declares the primary key.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::SemanticConflict`] when a primary key already
    /// exists, a column is absent, or a column repeats.
    pub fn set_primary_key(&mut self, columns: Vec<String>) -> Result<(), ConversionError> {
        if !self.primary_key.is_empty() {
            return Err(ConversionError::conflict(format!(
                "multiple primary keys defined for table `{}`",
                self.name
            )));
        }
        self.check_key_columns(&columns)?;
        self.primary_key = columns;
        Ok(())
    }

    /// Removes the primary key.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::SemanticConflict`] when no primary key exists.
    pub fn drop_primary_key(&mut self) -> Result<(), ConversionError> {
        if self.primary_key.is_empty() {
            return Err(ConversionError::conflict(format!(
                "table `{}` has no primary key to drop",
                self.name
            )));
        }
        self.primary_key.clear();
        Ok(())
    }

    /// Adds a secondary index.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::SemanticConflict`] when the index name is
    /// taken, a column is absent, or a column repeats.
    pub fn add_index(&mut self, index: Index) -> Result<(), ConversionError> {
        if self.index_position(&index.name).is_some() {
            return Err(ConversionError::conflict(format!(
                "duplicate index `{}` on table `{}`",
                index.name, self.name
            )));
        }
        self.check_key_columns(&index.columns)?;
        self.indexes.push(index);
        Ok(())
    }

    /// Removes a secondary index by name.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::SemanticConflict`] when the index is absent.
    pub fn drop_index(&mut self, name: &str) -> Result<(), ConversionError> {
        let Some(index) = self.index_position(name) else {
            return Err(ConversionError::conflict(format!(
                "index `{name}` does not exist on table `{}`",
                self.name
            )));
        };
        self.indexes.remove(index);
        Ok(())
    }

    /// Renames a secondary index.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::SemanticConflict`] when `old_name` is absent
    /// or `new_name` is taken by another index.
    pub fn rename_index(&mut self, old_name: &str, new_name: &str) -> Result<(), ConversionError> {
        let Some(index) = self.index_position(old_name) else {
            return Err(ConversionError::conflict(format!(
                "index `{old_name}` does not exist on table `{}`",
                self.name
            )));
        };
        if self.index_position(new_name).is_some_and(|existing| existing != index) {
            return Err(ConversionError::conflict(format!(
                "duplicate index `{new_name}` on table `{}`",
                self.name
            )));
        }
        if let Some(entry) = self.indexes.get_mut(index) {
            entry.name = new_name.to_string();
        }
        Ok(())
    }

    /// Derives an unused index name from a column name (`col`, `col_2`, ...).
    #[must_use]
    pub fn unused_index_name(&self, column: &str) -> String {
        if self.index_position(column).is_none() {
            return column.to_string();
        }
        let mut suffix = 2_usize;
        loop {
            let candidate = format!("{column}_{suffix}");
            if self.index_position(&candidate).is_none() {
                return candidate;
            }
            suffix += 1;
        }
    }

    /// Returns the index position by case-insensitive name.
    fn index_position(&self, name: &str) -> Option<usize> {
        self.indexes.iter().position(|index| index.name.eq_ignore_ascii_case(name))
    }

    /// Returns the position of an existing column or a conflict error.
    fn require(&self, name: &str) -> Result<usize, ConversionError> {
        self.position(name).ok_or_else(|| self.missing_column(name))
    }

    /// Builds the error for a reference to an absent column.
    fn missing_column(&self, name: &str) -> ConversionError {
        ConversionError::conflict(format!("column `{name}` does not exist in table `{}`", self.name))
    }

    /// Resolves a placement to an insertion index.
    fn insertion_index(
        &self,
        placement: &Placement,
        default: usize,
    ) -> Result<usize, ConversionError> {
        match placement {
            Placement::Default => Ok(default),
            Placement::First => Ok(0),
            Placement::After(anchor) => self.require(anchor).map(|index| index + 1),
        }
    }

    /// Validates key columns exist and do not repeat.
    fn check_key_columns(&self, columns: &[String]) -> Result<(), ConversionError> {
        for (index, column) in columns.iter().enumerate() {
            self.require(column)?;
            if columns.iter().take(index).any(|prior| prior.eq_ignore_ascii_case(column)) {
                return Err(ConversionError::conflict(format!(
                    "column `{column}` repeats in key definition"
                )));
            }
        }
        Ok(())
    }

    /// Rewrites key references after a column rename.
    fn rename_key_references(&mut self, old_name: &str, new_name: &str) {
        let rename = |key: &mut String| {
            if key.eq_ignore_ascii_case(old_name) {
                *key = new_name.to_string();
            }
        };
        self.primary_key.iter_mut().for_each(rename);
        for index in &mut self.indexes {
            index.columns.iter_mut().for_each(rename);
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions.")]

    use super::*;
    use crate::ddl::types::TypeFamily;

    fn column(name: &str) -> Column {
        Column::new(name.to_string(), SqlType::new(TypeFamily::Int))
    }

    fn table(names: &[&str]) -> TableModel {
        let mut table = TableModel::new("t".to_string());
        for name in names {
            table.add_column(column(name), &Placement::Default).unwrap();
        }
        table
    }

    fn names(table: &TableModel) -> Vec<&str> {
        table.columns.iter().map(|column| column.name.as_str()).collect()
    }

    #[test]
    fn placement_first_and_after() {
        let mut table = table(&["a", "b"]);
        table.add_column(column("z"), &Placement::First).unwrap();
        table.add_column(column("m"), &Placement::After("A".to_string())).unwrap();
        assert_eq!(names(&table), ["z", "a", "m", "b"]);
    }

    #[test]
    fn drop_column_cleans_keys() {
        let mut table = table(&["a", "b"]);
        table.set_primary_key(vec!["a".to_string(), "b".to_string()]).unwrap();
        table
            .add_index(Index {
                name: "ix".to_string(),
                kind: IndexKind::Index,
                columns: vec!["B".to_string()],
            })
            .unwrap();
        table.drop_column("b").unwrap();
        assert_eq!(table.primary_key, ["a"]);
        assert!(table.indexes.is_empty());
    }

    #[test]
    fn change_column_renames_key_references() {
        let mut table = table(&["a", "b"]);
        table.set_primary_key(vec!["a".to_string()]).unwrap();
        table.replace_column("a", column("id"), &Placement::After("b".to_string())).unwrap();
        assert_eq!(names(&table), ["b", "id"]);
        assert_eq!(table.primary_key, ["id"]);
    }

    #[test]
    fn rename_onto_existing_column_conflicts() {
        let mut table = table(&["a", "b"]);
        let err = table.rename_column("a", "B").unwrap_err();
        assert!(matches!(err, ConversionError::SemanticConflict(_)));
    }

    #[test]
    fn second_primary_key_conflicts() {
        let mut table = table(&["a"]);
        table.set_primary_key(vec!["a".to_string()]).unwrap();
        assert!(table.set_primary_key(vec!["a".to_string()]).is_err());
        table.drop_primary_key().unwrap();
        assert!(table.drop_primary_key().is_err());
    }
}
