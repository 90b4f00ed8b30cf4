//! A single line of a VCF stream.
//!
//! Records borrow the reader's line buffer as raw bytes. Lines are only
//! decoded as UTF-8 when a predicate asks for text or for a column, so a
//! stray Latin-1 byte never stops a header or a substring match from going
//! through. The column view is computed on demand so substring predicates
//! never pay for tab splitting.

use bstr::ByteSlice;

use crate::error::EvalError;

/// The fixed VCF columns in file order.
pub const FIXED_COLUMNS: [&str; 8] = ["CHROM", "POS", "ID", "REF", "ALT", "QUAL", "FILTER", "INFO"];

/// One entry of the INFO column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InfoEntry<'a> {
    /// A key with no value (e.g. `DB`).
    Flag,
    /// A `key=value` pair.
    Value(&'a str),
}

/// One input line, header or data.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    raw: &'a [u8],
    line_number: u64,
}

impl<'a> Record<'a> {
    /// Wrap a raw line (terminator included, if present).
    pub fn new<B: AsRef<[u8]> + ?Sized>(raw: &'a B, line_number: u64) -> Self {
        Self {
            raw: raw.as_ref(),
            line_number,
        }
    }

    /// The line exactly as read, including its terminator.
    pub fn raw(&self) -> &'a [u8] {
        self.raw
    }

    /// The line without its `\n` or `\r\n` terminator.
    pub fn bytes(&self) -> &'a [u8] {
        let line = self.raw.strip_suffix(b"\n").unwrap_or(self.raw);
        line.strip_suffix(b"\r").unwrap_or(line)
    }

    /// The line without its terminator, decoded as UTF-8.
    pub fn text(&self) -> Result<&'a str, EvalError> {
        self.bytes()
            .to_str()
            .map_err(|_| EvalError::InvalidUtf8 { field: "LINE" })
    }

    /// 1-based position of the line in the input.
    pub fn line_number(&self) -> u64 {
        self.line_number
    }

    /// True iff the line starts with `prefix`.
    pub fn is_header(&self, prefix: &str) -> bool {
        self.raw.starts_with(prefix.as_bytes())
    }

    /// Number of tab-separated columns.
    pub fn column_count(&self) -> usize {
        self.bytes().split_str("\t").count()
    }

    /// The column at `index`, if the line has that many.
    pub fn column(&self, index: usize) -> Option<&'a [u8]> {
        self.bytes().split_str("\t").nth(index)
    }

    /// Look up one of the fixed columns by name.
    ///
    /// Returns `Ok(None)` when the column holds the missing marker `.`, and
    /// an error when the line is too short to have the column at all.
    pub fn fixed(&self, name: &str) -> Result<Option<&'a str>, EvalError> {
        let index = FIXED_COLUMNS
            .iter()
            .position(|c| *c == name)
            .ok_or_else(|| EvalError::UnknownField(name.to_string()))?;

        match self.column(index) {
            Some(b".") => Ok(None),
            Some(value) => value.to_str().map(Some).map_err(|_| EvalError::InvalidUtf8 {
                field: FIXED_COLUMNS[index],
            }),
            None => Err(EvalError::TooFewColumns {
                column: FIXED_COLUMNS[index],
                needed: index + 1,
                found: self.column_count(),
            }),
        }
    }

    /// Look up `key` in the INFO column.
    pub fn info(&self, key: &str) -> Result<Option<InfoEntry<'a>>, EvalError> {
        let info = match self.fixed("INFO")? {
            Some(info) => info,
            None => return Ok(None),
        };

        for field in info.split(';') {
            match field.split_once('=') {
                Some((k, v)) if k == key => return Ok(Some(InfoEntry::Value(v))),
                None if field == key => return Ok(Some(InfoEntry::Flag)),
                _ => {}
            }
        }

        Ok(None)
    }
}
