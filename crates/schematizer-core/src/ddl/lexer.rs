// crates/schematizer-core/src/ddl/lexer.rs
// ============================================================================
// Module: DDL Lexer
// Description: Token cursor over the sqlparser tokenizer output.
// Purpose: Give the DDL grammar keyword-level lookahead with precise errors.
// Dependencies: sqlparser (tokenizer), crate::ddl
// ============================================================================

//! ## Overview
//! Statements are tokenized with the `sqlparser` tokenizer for the requested
//! dialect. Whitespace and comments are dropped; the remaining tokens feed a
//! [`TokenCursor`] that compares keywords case-insensitively and only treats
//! unquoted words as keywords, so a backtick-quoted `` `key` `` is an
//! identifier.

// ============================================================================
// SECTION: Imports
// ============================================================================

use sqlparser::dialect::MySqlDialect;
use sqlparser::tokenizer::Token;
use sqlparser::tokenizer::Tokenizer;
use sqlparser::tokenizer::Whitespace;

use crate::ddl::ConversionError;
use crate::ddl::SqlDialect;

// ============================================================================
// SECTION: Tokenizing
// ============================================================================

/// Tokenizes one statement, keeping whitespace tokens.
fn tokenize_raw(statement: &str, dialect: SqlDialect) -> Result<Vec<Token>, ConversionError> {
    let result = match dialect {
        SqlDialect::MySql => Tokenizer::new(&MySqlDialect {}, statement).tokenize(),
    };
    result.map_err(|err| ConversionError::MalformedStatement {
        statement: statement.to_string(),
        reason: err.to_string(),
    })
}

/// Splits a script into individual statements on top-level `;` tokens.
///
/// Semicolons inside string literals, quoted identifiers, and comments do not
/// split. Comments are replaced by a space and empty statements are dropped.
///
/// # Errors
///
/// Returns [`ConversionError::MalformedStatement`] when the script cannot be
/// tokenized (for example an unterminated string literal).
pub fn split_statements(script: &str, dialect: SqlDialect) -> Result<Vec<String>, ConversionError> {
    let tokens = tokenize_raw(script, dialect)?;
    let mut statements = Vec::new();
    let mut current = String::new();
    for token in tokens {
        match token {
            Token::SemiColon => flush(&mut current, &mut statements),
            Token::EOF => {}
            Token::Whitespace(
                Whitespace::SingleLineComment {
                    ..
                }
                | Whitespace::MultiLineComment(_),
            ) => current.push(' '),
            other => current.push_str(&other.to_string()),
        }
    }
    flush(&mut current, &mut statements);
    Ok(statements)
}

/// Moves the buffered statement into `statements` when it has content.
fn flush(current: &mut String, statements: &mut Vec<String>) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        statements.push(trimmed.to_string());
    }
    current.clear();
}

// ============================================================================
// SECTION: Cursor
// ============================================================================

/// Forward-only cursor over the significant tokens of one statement.
#[derive(Debug)]
pub(crate) struct TokenCursor<'a> {
    /// Statement text, reported in errors.
    statement: &'a str,
    /// Tokens with whitespace and comments removed.
    tokens: Vec<Token>,
    /// Index of the next unread token.
    position: usize,
}

impl<'a> TokenCursor<'a> {
    /// Tokenizes `statement` for the given dialect.
    pub(crate) fn new(statement: &'a str, dialect: SqlDialect) -> Result<Self, ConversionError> {
        let tokens = tokenize_raw(statement, dialect)?
            .into_iter()
            .filter(|token| !matches!(token, Token::Whitespace(_) | Token::EOF))
            .collect();
        Ok(Self {
            statement,
            tokens,
            position: 0,
        })
    }

    /// Builds a malformed-statement error for this statement.
    pub(crate) fn malformed(&self, reason: impl Into<String>) -> ConversionError {
        ConversionError::MalformedStatement {
            statement: self.statement.to_string(),
            reason: reason.into(),
        }
    }

    /// Builds an "expected X" error naming the next token.
    pub(crate) fn expected(&self, what: &str) -> ConversionError {
        match self.peek() {
            Some(token) => self.malformed(format!("expected {what}, found `{token}`")),
            None => self.malformed(format!("expected {what}, found end of statement")),
        }
    }

    /// Returns the next token without consuming it.
    pub(crate) fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    /// Returns the token `offset` positions ahead without consuming anything.
    pub(crate) fn peek_nth(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.position + offset)
    }

    /// Consumes and returns the next token.
    pub(crate) fn next_token(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    /// Returns true when the token `offset` ahead is the unquoted keyword.
    pub(crate) fn peek_keyword_at(&self, offset: usize, keyword: &str) -> bool {
        self.peek_nth(offset).is_some_and(|token| is_keyword(token, keyword))
    }

    /// Returns true when the next token is the unquoted keyword.
    pub(crate) fn peek_keyword(&self, keyword: &str) -> bool {
        self.peek_keyword_at(0, keyword)
    }

    /// Consumes the keyword when it is next.
    pub(crate) fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.peek_keyword(keyword) {
            self.position += 1;
            return true;
        }
        false
    }

    /// Consumes a keyword sequence when it appears in full.
    pub(crate) fn eat_keywords(&mut self, keywords: &[&str]) -> bool {
        let matched =
            keywords.iter().enumerate().all(|(offset, keyword)| self.peek_keyword_at(offset, keyword));
        if matched {
            self.position += keywords.len();
        }
        matched
    }

    /// Consumes the keyword or fails.
    pub(crate) fn expect_keyword(&mut self, keyword: &str) -> Result<(), ConversionError> {
        if self.eat_keyword(keyword) { Ok(()) } else { Err(self.expected(keyword)) }
    }

    /// Consumes `token` when it is next.
    pub(crate) fn eat_token(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.position += 1;
            return true;
        }
        false
    }

    /// Consumes `token` or fails.
    pub(crate) fn expect_token(&mut self, token: &Token) -> Result<(), ConversionError> {
        if self.eat_token(token) { Ok(()) } else { Err(self.expected(&format!("`{token}`"))) }
    }

    /// Consumes an identifier (quoted or unquoted word) and returns its text.
    pub(crate) fn identifier(&mut self, what: &str) -> Result<String, ConversionError> {
        match self.peek() {
            Some(Token::Word(word)) => {
                let value = word.value.clone();
                self.position += 1;
                Ok(value)
            }
            _ => Err(self.expected(what)),
        }
    }

    /// Consumes a possibly qualified name (`db.table`) and returns the last part.
    pub(crate) fn object_name(&mut self, what: &str) -> Result<String, ConversionError> {
        let mut name = self.identifier(what)?;
        while self.eat_token(&Token::Period) {
            name = self.identifier(what)?;
        }
        Ok(name)
    }

    /// Consumes an unsigned integer literal.
    pub(crate) fn unsigned_integer(&mut self, what: &str) -> Result<u32, ConversionError> {
        match self.peek() {
            Some(Token::Number(text, _)) => {
                let value = text.parse::<u32>().map_err(|_| self.expected(what))?;
                self.position += 1;
                Ok(value)
            }
            _ => Err(self.expected(what)),
        }
    }

    /// Consumes a quoted string literal and returns its unescaped value.
    pub(crate) fn string_literal(&mut self, what: &str) -> Result<String, ConversionError> {
        match self.peek() {
            Some(Token::SingleQuotedString(value) | Token::DoubleQuotedString(value)) => {
                let value = value.clone();
                self.position += 1;
                Ok(value)
            }
            _ => Err(self.expected(what)),
        }
    }

    /// Consumes a parenthesized, comma-separated identifier list.
    ///
    /// Index prefix lengths (`col(10)`) and ordering (`ASC`/`DESC`) are
    /// accepted and discarded.
    pub(crate) fn identifier_list(&mut self) -> Result<Vec<String>, ConversionError> {
        self.expect_token(&Token::LParen)?;
        let mut names = Vec::new();
        loop {
            names.push(self.identifier("column name")?);
            if self.eat_token(&Token::LParen) {
                self.unsigned_integer("prefix length")?;
                self.expect_token(&Token::RParen)?;
            }
            if !self.eat_keyword("ASC") {
                self.eat_keyword("DESC");
            }
            if !self.eat_token(&Token::Comma) {
                break;
            }
        }
        self.expect_token(&Token::RParen)?;
        Ok(names)
    }

    /// Skips tokens up to (not including) the next top-level comma or the
    /// closing parenthesis of the enclosing list.
    pub(crate) fn skip_clause(&mut self) -> Result<(), ConversionError> {
        let mut depth = 0_usize;
        while let Some(token) = self.peek() {
            match token {
                Token::LParen => depth += 1,
                Token::RParen if depth == 0 => return Ok(()),
                Token::RParen => depth -= 1,
                Token::Comma | Token::SemiColon if depth == 0 => return Ok(()),
                _ => {}
            }
            self.position += 1;
        }
        if depth == 0 { Ok(()) } else { Err(self.expected("`)`")) }
    }
}

/// Returns true when `token` is the given keyword written without quotes.
fn is_keyword(token: &Token, keyword: &str) -> bool {
    match token {
        Token::Word(word) => word.quote_style.is_none() && word.value.eq_ignore_ascii_case(keyword),
        _ => false,
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions.")]

    use super::*;

    #[test]
    fn split_ignores_semicolons_in_literals_and_comments() {
        let script = "CREATE TABLE t (a VARCHAR(3) DEFAULT 'x;y'); -- c;\nALTER TABLE t DROP a;";
        let statements = split_statements(script, SqlDialect::MySql).unwrap();
        assert_eq!(statements.len(), 2);
        assert!(statements[0].starts_with("CREATE TABLE t"));
        assert!(statements[0].contains("'x;y'"));
        assert_eq!(statements[1], "ALTER TABLE t DROP a");
    }

    #[test]
    fn comment_only_script_has_no_statements() {
        let statements = split_statements("-- header;
/* note; */
", SqlDialect::MySql).unwrap();
        assert!(statements.is_empty());
    }

    #[test]
    fn quoted_words_are_not_keywords() {
        let mut cursor = TokenCursor::new("`key` KEY", SqlDialect::MySql).unwrap();
        assert!(!cursor.peek_keyword("KEY"));
        assert_eq!(cursor.identifier("name").unwrap(), "key");
        assert!(cursor.eat_keyword("key"));
        assert!(cursor.peek().is_none());
    }

    #[test]
    fn unterminated_literal_is_malformed() {
        let err = TokenCursor::new("CREATE TABLE t (a INT DEFAULT 'x)", SqlDialect::MySql)
            .unwrap_err();
        assert!(matches!(err, ConversionError::MalformedStatement { .. }));
    }
}
