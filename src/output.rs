//! Path-level entry point: open the input and output, run the filter, and
//! optionally replace the output atomically.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter};
use std::path::Path;

use log::{debug, warn};
use tempfile::NamedTempFile;

use crate::error::{Result, SieveError};
use crate::predicate::Predicate;
use crate::stream::{FilterSummary, RecordFilter};

/// Path meaning stdin for the input and stdout for the output.
pub const STDIO_PATH: &str = "-";

fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == STDIO_PATH
}

fn open_input(path: &Path) -> Result<Box<dyn BufRead>> {
    if is_stdio(path) {
        return Ok(Box::new(io::stdin().lock()));
    }
    let file = File::open(path)
        .map_err(|e| SieveError::io(format!("opening {}", path.display()), e))?;
    Ok(Box::new(BufReader::new(file)))
}

/// True when both paths resolve to the same existing file.
fn same_file(input: &Path, output: &Path) -> bool {
    if is_stdio(input) || is_stdio(output) {
        return false;
    }
    match (fs::canonicalize(input), fs::canonicalize(output)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Filter the file at `input` into `output`.
///
/// The input is opened first, so a missing input never truncates an existing
/// output. With `atomic`, lines go to a temporary file next to `output` that
/// is renamed over it only once the whole pass succeeded; on failure the
/// temporary file is removed and `output` is left as it was. `atomic` has no
/// effect when writing to stdout.
///
/// When `output` resolves to the input file, atomic mode is always used. A
/// replaced output keeps the permissions it had before.
pub fn filter_path<P: Predicate>(
    input: &Path,
    output: &Path,
    filter: &RecordFilter<P>,
    atomic: bool,
) -> Result<FilterSummary> {
    let reader = open_input(input)?;

    if is_stdio(output) {
        let stdout = io::stdout();
        return filter.run(reader, BufWriter::new(stdout.lock()));
    }

    let atomic = atomic || {
        let same = same_file(input, output);
        if same {
            warn!(
                "{} is both input and output, writing through a temporary file",
                output.display()
            );
        }
        same
    };

    if !atomic {
        let file = File::create(output)
            .map_err(|e| SieveError::io(format!("creating {}", output.display()), e))?;
        return filter.run(reader, BufWriter::new(file));
    }

    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(dir).map_err(|e| {
        SieveError::io(format!("creating temporary file in {}", dir.display()), e)
    })?;
    debug!("writing to temporary file {}", temp.path().display());

    let summary = filter.run(reader, BufWriter::new(&mut temp))?;

    if let Ok(meta) = fs::metadata(output) {
        temp.as_file()
            .set_permissions(meta.permissions())
            .map_err(|e| {
                SieveError::io(format!("copying permissions of {}", output.display()), e)
            })?;
    }

    temp.persist(output).map_err(|e| SieveError::Persist {
        path: output.to_path_buf(),
        source: e.error,
    })?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::predicate::{Contains, FilterColumn};

    const VCF: &str = "##fileformat=VCFv4.2\n#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\nchr1\t100\t.\tA\tG\t50\tPASS\tDP=30\nchr1\t200\t.\tC\tT\t5\tLowQual\tDP=3\n";

    #[test]
    fn test_filter_path() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.vcf");
        let output = dir.path().join("out.vcf");
        fs::write(&input, VCF).unwrap();

        let summary = filter_path(&input, &output, &RecordFilter::default(), false).unwrap();

        assert_eq!(summary.written(), 3);
        assert_eq!(
            fs::read_to_string(&output).unwrap(),
            "##fileformat=VCFv4.2\n#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\nchr1\t100\t.\tA\tG\t50\tPASS\tDP=30\n"
        );
    }

    #[test]
    fn test_missing_input_leaves_output_alone() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.vcf");
        fs::write(&output, "previous\n").unwrap();

        let err = filter_path(
            &dir.path().join("absent.vcf"),
            &output,
            &RecordFilter::default(),
            false,
        )
        .unwrap_err();

        assert!(matches!(err, SieveError::Io { .. }));
        assert!(err.to_string().contains("absent.vcf"));
        assert_eq!(fs::read_to_string(&output).unwrap(), "previous\n");
    }

    #[test]
    fn test_unwritable_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.vcf");
        fs::write(&input, VCF).unwrap();

        let err = filter_path(
            &input,
            &dir.path().join("no_such_dir").join("out.vcf"),
            &RecordFilter::default(),
            false,
        )
        .unwrap_err();
        assert!(matches!(err, SieveError::Io { .. }));
    }

    #[test]
    fn test_atomic_success_replaces_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.vcf");
        let output = dir.path().join("out.vcf");
        fs::write(&input, VCF).unwrap();
        fs::write(&output, "previous\n").unwrap();

        let summary = filter_path(&input, &output, &RecordFilter::default(), true).unwrap();

        assert_eq!(summary.kept, 1);
        assert!(fs::read_to_string(&output).unwrap().ends_with("PASS\tDP=30\n"));
        // Only the input and the output remain in the directory.
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn test_atomic_failure_keeps_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.vcf");
        let output = dir.path().join("out.vcf");
        fs::write(&input, "#h\nchr1\t1\t.\tA\tG\t9\tPASS\t.\nbroken PASS\n").unwrap();
        fs::write(&output, "previous\n").unwrap();

        let filter = RecordFilter::new(FilterColumn::new("PASS"));
        let err = filter_path(&input, &output, &filter, true).unwrap_err();

        assert!(matches!(err, SieveError::Predicate { line_number: 3, .. }));
        assert_eq!(fs::read_to_string(&output).unwrap(), "previous\n");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn test_non_atomic_failure_keeps_partial_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.vcf");
        let output = dir.path().join("out.vcf");
        fs::write(&input, "#h\nbroken PASS\n").unwrap();

        let filter = RecordFilter::new(FilterColumn::new("PASS"));
        assert!(filter_path(&input, &output, &filter, false).is_err());
        assert_eq!(fs::read_to_string(&output).unwrap(), "#h\n");
    }

    #[test]
    fn test_custom_needle_through_paths() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.vcf");
        let output = dir.path().join("out.vcf");
        fs::write(&input, VCF).unwrap();

        let summary =
            filter_path(&input, &output, &RecordFilter::new(Contains::new("LowQual")), false)
                .unwrap();
        assert_eq!(summary.kept, 1);
        assert_eq!(summary.dropped, 1);
    }

    #[test]
    fn test_output_same_as_input_is_filtered_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("calls.vcf");
        fs::write(&path, VCF).unwrap();
        let alias = dir.path().join(".").join("calls.vcf");

        let summary = filter_path(&path, &alias, &RecordFilter::default(), false).unwrap();

        assert_eq!(summary.lines_read, 4);
        assert_eq!(summary.written(), 3);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "##fileformat=VCFv4.2\n#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\nchr1\t100\t.\tA\tG\t50\tPASS\tDP=30\n"
        );
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_same_file_detection() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.vcf");
        fs::write(&input, VCF).unwrap();

        assert!(same_file(&input, &dir.path().join("./in.vcf")));
        assert!(!same_file(&input, &dir.path().join("out.vcf")));
        assert!(!same_file(Path::new("-"), Path::new("-")));
    }

    #[cfg(unix)]
    #[test]
    fn test_atomic_keeps_output_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.vcf");
        let output = dir.path().join("out.vcf");
        fs::write(&input, VCF).unwrap();
        fs::write(&output, "previous\n").unwrap();
        fs::set_permissions(&output, fs::Permissions::from_mode(0o644)).unwrap();

        filter_path(&input, &output, &RecordFilter::default(), true).unwrap();

        let mode = fs::metadata(&output).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }
}
