//! The single-pass record filter.
//!
//! Reads lines one at a time into a reused buffer, writes every header line
//! and every data line the predicate accepts, and never rewrites a byte.

use std::io::{BufRead, Write};

use bstr::ByteSlice;
use log::{debug, trace, warn};

use crate::cancel::CancelToken;
use crate::error::{Result, SieveError};
use crate::predicate::{Contains, Predicate};
use crate::record::Record;

/// Default marker for header lines.
pub const DEFAULT_HEADER_PREFIX: &str = "#";

/// Settings for a filter pass other than the predicate.
#[derive(Debug, Clone)]
pub struct FilterOptions {
    /// Lines starting with this are headers and always written.
    pub header_prefix: String,
    /// Checked before every read; when set the pass stops early.
    pub cancel: Option<CancelToken>,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            header_prefix: DEFAULT_HEADER_PREFIX.to_string(),
            cancel: None,
        }
    }
}

/// Counts collected during one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterSummary {
    pub lines_read: u64,
    pub headers: u64,
    pub kept: u64,
    pub dropped: u64,
    pub cancelled: bool,
}

impl FilterSummary {
    /// Lines written to the output: headers plus kept data lines.
    pub fn written(&self) -> u64 {
        self.headers + self.kept
    }
}

/// A predicate bundled with its options.
///
/// ```rust
/// use vcf_sieve::RecordFilter;
///
/// let input = "#CHROM\tPOS\nchr1\t100\tPASS\nchr1\t200\tFAIL\n";
/// let mut output = Vec::new();
/// let summary = RecordFilter::default().run(input.as_bytes(), &mut output).unwrap();
///
/// assert_eq!(summary.written(), 2);
/// assert_eq!(output, b"#CHROM\tPOS\nchr1\t100\tPASS\n");
/// ```
#[derive(Debug, Clone)]
pub struct RecordFilter<P> {
    predicate: P,
    options: FilterOptions,
}

impl Default for RecordFilter<Contains> {
    fn default() -> Self {
        Self::new(Contains::pass())
    }
}

impl<P: Predicate> RecordFilter<P> {
    pub fn new(predicate: P) -> Self {
        Self::with_options(predicate, FilterOptions::default())
    }

    pub fn with_options(predicate: P, options: FilterOptions) -> Self {
        Self { predicate, options }
    }

    pub fn header_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.options.header_prefix = prefix.into();
        self
    }

    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.options.cancel = Some(token);
        self
    }

    /// Filter `input` into `output` in one forward pass.
    ///
    /// The output is flushed before returning. On error, whatever was already
    /// written stays on the sink.
    pub fn run<R: BufRead, W: Write>(&self, mut input: R, mut output: W) -> Result<FilterSummary> {
        debug!(
            "filtering with header prefix {:?}",
            self.options.header_prefix
        );

        let mut summary = FilterSummary::default();
        let mut line = Vec::new();

        loop {
            if self.is_cancelled() {
                debug!("cancelled after {} lines", summary.lines_read);
                summary.cancelled = true;
                break;
            }

            line.clear();
            let line_number = summary.lines_read + 1;
            let read = input
                .read_until(b'\n', &mut line)
                .map_err(|e| SieveError::io(format!("reading line {}", line_number), e))?;
            if read == 0 {
                break;
            }
            summary.lines_read = line_number;

            let record = Record::new(&line, line_number);
            if record.is_header(&self.options.header_prefix) {
                summary.headers += 1;
            } else {
                match self.predicate.test(&record) {
                    Ok(true) => summary.kept += 1,
                    Ok(false) => {
                        trace!("dropping line {}", line_number);
                        summary.dropped += 1;
                        continue;
                    }
                    Err(source) => {
                        if let Err(e) = output.flush() {
                            warn!("could not flush partial output: {}", e);
                        }
                        return Err(SieveError::Predicate {
                            line_number,
                            line: record.bytes().to_str_lossy().into_owned(),
                            source,
                        });
                    }
                }
            }

            output
                .write_all(&line)
                .map_err(|e| SieveError::io(format!("writing line {}", line_number), e))?;
        }

        output
            .flush()
            .map_err(|e| SieveError::io("flushing output", e))?;

        debug!("{:?}", summary);
        Ok(summary)
    }

    fn is_cancelled(&self) -> bool {
        self.options
            .cancel
            .as_ref()
            .is_some_and(CancelToken::is_cancelled)
    }
}

/// Filter `input` into `output` with `#` headers, returning the number of
/// lines written.
pub fn filter<R, W, P>(input: R, output: W, predicate: P) -> Result<u64>
where
    R: BufRead,
    W: Write,
    P: Predicate,
{
    RecordFilter::new(predicate)
        .run(input, output)
        .map(|summary| summary.written())
}
