//! # VCF Sieve
//!
//! A streaming filter for VCF (Variant Call Format) files. Header lines are
//! always kept; data lines are kept when a predicate accepts them. Lines are
//! written byte-for-byte, in input order, in a single pass.
//!
//! ## Example
//!
//! ```rust
//! use vcf_sieve::{Contains, Not, filter};
//!
//! let input = "#h\na LOWQUAL\nb OK\n";
//! let mut output = Vec::new();
//!
//! // Keep data lines that do NOT contain LOWQUAL
//! let written = filter(input.as_bytes(), &mut output, Not(Contains::new("LOWQUAL"))).unwrap();
//!
//! assert_eq!(written, 2);
//! assert_eq!(output, b"#h\nb OK\n");
//! ```
//!
//! ## Predicates
//!
//! - [`Contains`]: substring anywhere in the line; `Contains::pass()` is the default
//! - [`FilterColumn`]: exact token in the FILTER column (column 7)
//! - [`Not`]: inverts another predicate
//! - [`Rule`]: a declarative rule expression
//! - [`from_fn`] / [`try_from_fn`]: plain functions
//!
//! ## Rule Syntax
//!
//! ### Fields
//! - `LINE` - The whole line, without its terminator
//! - `CHROM`, `POS`, `ID`, `REF`, `ALT`, `QUAL`, `FILTER`, `INFO` - Fixed columns
//! - `INFO.DP` - A key of the INFO column (bare flags read as `true`)
//!
//! ### Operators
//! - `==`, `!=`, `<`, `>`, `<=`, `>=`, `contains`
//! - `&&`, `||`, `!`, parentheses
//! - `exists(field)` - The field is present and not `.`
//!
//! ```rust
//! use vcf_sieve::{Rule, RecordFilter};
//!
//! let rule = Rule::parse(r#"FILTER == "PASS" && QUAL >= 30"#).unwrap();
//! let input = "#CHROM\nchr1\t1\t.\tA\tG\t50\tPASS\t.\nchr1\t2\t.\tA\tG\t10\tPASS\t.\n";
//! let mut output = Vec::new();
//! let summary = RecordFilter::new(rule).run(input.as_bytes(), &mut output).unwrap();
//!
//! assert_eq!(summary.kept, 1);
//! assert_eq!(summary.dropped, 1);
//! ```

pub mod cancel;
pub mod error;
pub mod eval;
pub mod output;
pub mod predicate;
pub mod record;
pub mod rule;
pub mod stream;
pub mod value;

pub use cancel::CancelToken;
pub use error::{EvalError, Result, SieveError};
pub use output::filter_path;
pub use predicate::{Contains, FilterColumn, Not, Predicate, Rule, from_fn, try_from_fn};
pub use record::{InfoEntry, Record};
pub use rule::{BinaryOp, Expr, Field, UnaryOp};
pub use stream::{FilterOptions, FilterSummary, RecordFilter, filter};
pub use value::Value;
