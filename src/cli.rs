use std::path::PathBuf;

use clap::Parser;
use clap::builder::NonEmptyStringValueParser;
use vcf_sieve::{Contains, FilterColumn, Not, Predicate, Rule, stream::DEFAULT_HEADER_PREFIX};

#[derive(Parser, Debug)]
#[command(name = "vcf-sieve")]
#[command(about = "Keep VCF header lines and the data lines matching a predicate")]
#[command(author, version)]
pub struct Cli {
    /// Input VCF file ('-' for stdin)
    #[arg(help_heading = Some("I/O Options"))]
    pub input: PathBuf,
    /// Output file ('-' for stdout)
    #[arg(help_heading = Some("I/O Options"))]
    pub output: PathBuf,
    /// Write to a temporary file and rename it over the output on success
    #[arg(long, help_heading = Some("I/O Options"))]
    pub atomic: bool,

    /// Keep data lines containing this text
    #[arg(short, long, default_value = "PASS", help_heading = Some("Filter Options"))]
    pub pattern: String,
    /// Match the pattern against the FILTER column instead of the whole line
    #[arg(long, conflicts_with = "expr", help_heading = Some("Filter Options"))]
    pub filter_column: bool,
    /// Keep data lines matching a rule, e.g. 'FILTER == "PASS" && QUAL >= 30'
    #[arg(short, long, conflicts_with = "pattern", help_heading = Some("Filter Options"))]
    pub expr: Option<String>,
    /// Keep the data lines the predicate rejects instead
    #[arg(short = 'v', long, help_heading = Some("Filter Options"))]
    pub invert: bool,
    /// Lines starting with this are headers and always kept
    #[arg(
        long,
        default_value = DEFAULT_HEADER_PREFIX,
        value_parser = NonEmptyStringValueParser::new(),
        help_heading = Some("Filter Options")
    )]
    pub header_prefix: String,
}

impl Cli {
    /// Build the predicate selected by the options.
    pub fn predicate(&self) -> vcf_sieve::Result<Box<dyn Predicate>> {
        let base: Box<dyn Predicate> = match (&self.expr, self.filter_column) {
            (Some(expr), _) => Box::new(Rule::parse(expr)?),
            (None, true) => Box::new(FilterColumn::new(self.pattern.as_str())),
            (None, false) => Box::new(Contains::new(self.pattern.as_str())),
        };

        let predicate: Box<dyn Predicate> = if self.invert {
            Box::new(Not(base))
        } else {
            base
        };
        Ok(predicate)
    }
}

pub fn parse_cli() -> Cli {
    Cli::parse()
}
