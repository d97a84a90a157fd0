//! Column value filters
//!
//! Encoding and parsing of server-side scan filters.
//!
//! ## Filter String Format
//! ```text
//! SingleColumnValueFilter ('<family>', '<qualifier>', <op>, 'binary:<value>', <ifMissing>, <latest>)
//! ```
//! Several filters are joined with ` AND `. Quotes inside a quoted field are
//! doubled. `<op>` is one of `=`, `!=`, `<`, `<=`, `>`, `>=`.

use std::cmp::Ordering;
use crate::error::{CrawlError, Result};
use super::Cells;

const FILTER_NAME: &str = "SingleColumnValueFilter";
const BINARY_PREFIX: &str = "binary:";
const CONJUNCTION: &str = "AND";

/// Comparison applied between the cell value and the filter value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
}

impl CompareOp {
    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Equal => "=",
            CompareOp::NotEqual => "!=",
            CompareOp::Less => "<",
            CompareOp::LessOrEqual => "<=",
            CompareOp::Greater => ">",
            CompareOp::GreaterOrEqual => ">=",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Some(match symbol {
            "=" => CompareOp::Equal,
            "!=" => CompareOp::NotEqual,
            "<" => CompareOp::Less,
            "<=" => CompareOp::LessOrEqual,
            ">" => CompareOp::Greater,
            ">=" => CompareOp::GreaterOrEqual,
            _ => return None,
        })
    }

    /// `ordering` is `cell.cmp(filter_value)`
    fn holds(self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Equal => ordering == Ordering::Equal,
            CompareOp::NotEqual => ordering != Ordering::Equal,
            CompareOp::Less => ordering == Ordering::Less,
            CompareOp::LessOrEqual => ordering != Ordering::Greater,
            CompareOp::Greater => ordering == Ordering::Greater,
            CompareOp::GreaterOrEqual => ordering != Ordering::Less,
        }
    }
}

/// One single-column value predicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnValueFilter {
    pub family: String,
    pub qualifier: String,
    pub op: CompareOp,
    pub value: String,
    /// Drop rows that lack the column entirely
    pub filter_if_missing: bool,
}

impl ColumnValueFilter {
    pub fn new(
        family: impl Into<String>,
        qualifier: impl Into<String>,
        op: CompareOp,
        value: impl Into<String>,
    ) -> Self {
        Self {
            family: family.into(),
            qualifier: qualifier.into(),
            op,
            value: value.into(),
            filter_if_missing: true,
        }
    }

    pub fn equals(
        family: impl Into<String>,
        qualifier: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::new(family, qualifier, CompareOp::Equal, value)
    }

    fn column(&self) -> String {
        format!("{}:{}", self.family, self.qualifier)
    }

    /// Byte-wise comparison of the row's cell against the filter value
    pub fn matches(&self, cells: &Cells) -> bool {
        match cells.get(&self.column()) {
            Some(cell) => self.op.holds(cell.as_ref().cmp(self.value.as_bytes())),
            None => !self.filter_if_missing,
        }
    }
}

fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Build a filter string; an empty slice yields an empty string
pub fn build_filter_string(specs: &[ColumnValueFilter]) -> String {
    specs
        .iter()
        .map(|f| {
            format!(
                "{} ({}, {}, {}, {}, {}, true)",
                FILTER_NAME,
                quote(&f.family),
                quote(&f.qualifier),
                f.op.symbol(),
                quote(&format!("{}{}", BINARY_PREFIX, f.value)),
                f.filter_if_missing
            )
        })
        .collect::<Vec<_>>()
        .join(&format!(" {} ", CONJUNCTION))
}

// =============================================================================
// Parsing
// =============================================================================

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn skip_ws(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.src.len() - trimmed.len();
    }

    fn at_end(&mut self) -> bool {
        self.skip_ws();
        self.pos == self.src.len()
    }

    fn error(&self, expected: &str) -> CrawlError {
        CrawlError::InvalidFilter(format!(
            "expected {} at offset {} in {:?}",
            expected, self.pos, self.src
        ))
    }

    fn expect(&mut self, literal: &str) -> Result<()> {
        self.skip_ws();
        if self.rest().starts_with(literal) {
            self.pos += literal.len();
            Ok(())
        } else {
            Err(self.error(&format!("{:?}", literal)))
        }
    }

    fn quoted(&mut self) -> Result<String> {
        self.expect("'")?;
        let mut out = String::new();
        loop {
            let mut chars = self.rest().chars();
            match chars.next() {
                Some('\'') if chars.next() == Some('\'') => {
                    out.push('\'');
                    self.pos += 2;
                }
                Some('\'') => {
                    self.pos += 1;
                    return Ok(out);
                }
                Some(c) => {
                    out.push(c);
                    self.pos += c.len_utf8();
                }
                None => return Err(self.error("closing quote")),
            }
        }
    }

    /// Bare token up to the next ',' or ')'
    fn bare(&mut self) -> Result<&'a str> {
        self.skip_ws();
        let rest = self.rest();
        let end = rest.find([',', ')']).ok_or_else(|| self.error("',' or ')'"))?;
        self.pos += end;
        Ok(rest[..end].trim())
    }

    fn boolean(&mut self) -> Result<bool> {
        match self.bare()? {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(self.error("true or false")),
        }
    }

    fn filter(&mut self) -> Result<ColumnValueFilter> {
        self.expect(FILTER_NAME)?;
        self.expect("(")?;
        let family = self.quoted()?;
        self.expect(",")?;
        let qualifier = self.quoted()?;
        self.expect(",")?;
        let op_token = self.bare()?;
        let op = CompareOp::from_symbol(op_token).ok_or_else(|| self.error("comparison operator"))?;
        self.expect(",")?;
        let comparand = self.quoted()?;
        let value = comparand
            .strip_prefix(BINARY_PREFIX)
            .ok_or_else(|| self.error("'binary:' comparator"))?
            .to_string();
        self.expect(",")?;
        let filter_if_missing = self.boolean()?;
        self.expect(",")?;
        self.boolean()?;
        self.expect(")")?;
        Ok(ColumnValueFilter {
            family,
            qualifier,
            op,
            value,
            filter_if_missing,
        })
    }
}

/// Parse a filter string built by [`build_filter_string`]
pub fn parse_filter_string(src: &str) -> Result<Vec<ColumnValueFilter>> {
    let mut cursor = Cursor::new(src);
    let mut filters = Vec::new();
    if cursor.at_end() {
        return Ok(filters);
    }
    loop {
        filters.push(cursor.filter()?);
        if cursor.at_end() {
            return Ok(filters);
        }
        cursor.expect(CONJUNCTION)?;
    }
}
