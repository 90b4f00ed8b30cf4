//! Expression evaluator for rules.
//!
//! Evaluates parsed rule ASTs against a single record. Columns are read
//! lazily, so a rule that only looks at `LINE` never splits the line.

use crate::error::EvalError;
use crate::record::{InfoEntry, Record};
use crate::rule::{BinaryOp, Expr, Field, UnaryOp};
use crate::value::Value;

/// Evaluate a rule expression against a record.
pub fn evaluate<'a>(expr: &'a Expr, record: &Record<'a>) -> Result<Value<'a>, EvalError> {
    match expr {
        Expr::Number(n) => Ok(Value::Number(*n)),
        Expr::String(s) => Ok(Value::Str(s)),
        Expr::Bool(b) => Ok(Value::Bool(*b)),
        Expr::Field(field) => resolve_field(field, record),
        Expr::Binary(left, op, right) => evaluate_binary(left, op, right, record),
        Expr::Unary(UnaryOp::Not, inner) => Ok(Value::Bool(!evaluate(inner, record)?.truthy())),
        Expr::Exists(field) => Ok(Value::Bool(!resolve_field(field, record)?.is_missing())),
    }
}

/// Read a field from the record.
fn resolve_field<'a>(field: &Field, record: &Record<'a>) -> Result<Value<'a>, EvalError> {
    match field {
        Field::Line => Ok(Value::Str(record.text()?)),
        Field::Column(name) => {
            let raw = match record.fixed(name)? {
                Some(raw) => raw,
                None => return Ok(Value::Missing),
            };
            Ok(match name.as_str() {
                "POS" | "QUAL" => raw
                    .parse::<f64>()
                    .map(Value::Number)
                    .unwrap_or(Value::Str(raw)),
                "ALT" => Value::split(raw, ','),
                "FILTER" => Value::split(raw, ';'),
                _ => Value::Str(raw),
            })
        }
        Field::Info(key) => Ok(match record.info(key)? {
            Some(InfoEntry::Flag) => Value::Bool(true),
            Some(InfoEntry::Value(".")) | None => Value::Missing,
            Some(InfoEntry::Value(raw)) => raw
                .parse::<f64>()
                .map(Value::Number)
                .unwrap_or_else(|_| Value::split(raw, ',')),
        }),
    }
}

/// Evaluate a binary operation.
fn evaluate_binary<'a>(
    left: &'a Expr,
    op: &BinaryOp,
    right: &'a Expr,
    record: &Record<'a>,
) -> Result<Value<'a>, EvalError> {
    // Short-circuit so the right side is never read when it cannot matter.
    match op {
        BinaryOp::And => {
            if !evaluate(left, record)?.truthy() {
                return Ok(Value::Bool(false));
            }
            return Ok(Value::Bool(evaluate(right, record)?.truthy()));
        }
        BinaryOp::Or => {
            if evaluate(left, record)?.truthy() {
                return Ok(Value::Bool(true));
            }
            return Ok(Value::Bool(evaluate(right, record)?.truthy()));
        }
        _ => {}
    }

    let left_val = evaluate(left, record)?;
    let right_val = evaluate(right, record)?;

    // Multi-valued column on the left: any element may match
    if let Value::Array(ref arr) = left_val {
        let result = match op {
            BinaryOp::Eq => arr.iter().any(|v| values_equal(v, &right_val)),
            BinaryOp::NotEq => arr.iter().all(|v| !values_equal(v, &right_val)),
            BinaryOp::Contains => arr.iter().any(|v| value_contains(v, &right_val)),
            _ => arr
                .iter()
                .any(|v| compare_values(v, op, &right_val).unwrap_or(false)),
        };
        return Ok(Value::Bool(result));
    }

    let result = match op {
        BinaryOp::Eq => values_equal(&left_val, &right_val),
        BinaryOp::NotEq => !values_equal(&left_val, &right_val),
        BinaryOp::Contains => value_contains(&left_val, &right_val),
        _ => compare_values(&left_val, op, &right_val)?,
    };
    Ok(Value::Bool(result))
}

/// Check if two values are equal.
fn values_equal(left: &Value<'_>, right: &Value<'_>) -> bool {
    match (left, right) {
        (Value::Str(l), Value::Str(r)) => l == r,
        (Value::Number(l), Value::Number(r)) => (l - r).abs() < f64::EPSILON,
        (Value::Bool(l), Value::Bool(r)) => l == r,
        (Value::Missing, Value::Missing) => true,
        (Value::Str(s), Value::Number(n)) | (Value::Number(n), Value::Str(s)) => s
            .parse::<f64>()
            .map(|sn| (sn - n).abs() < f64::EPSILON)
            .unwrap_or(false),
        _ => false,
    }
}

/// Check if left contains right (substring).
fn value_contains(left: &Value<'_>, right: &Value<'_>) -> bool {
    match (left, right) {
        (Value::Str(l), Value::Str(r)) => l.contains(r),
        _ => false,
    }
}

/// Compare two values with an ordering operator.
fn compare_values(left: &Value<'_>, op: &BinaryOp, right: &Value<'_>) -> Result<bool, EvalError> {
    if left.is_missing() || right.is_missing() {
        return Ok(false);
    }

    let ordering = match (left.as_number(), right.as_number(), left, right) {
        (Some(l), Some(r), _, _) => l.partial_cmp(&r),
        (_, _, Value::Str(l), Value::Str(r)) => Some(l.cmp(r)),
        _ => {
            return Err(EvalError::TypeMismatch {
                left: left.type_name().to_string(),
                right: right.type_name().to_string(),
            });
        }
    };

    let ordering = match ordering {
        Some(ordering) => ordering,
        // NaN on either side
        None => return Ok(false),
    };

    Ok(match op {
        BinaryOp::Lt => ordering.is_lt(),
        BinaryOp::Gt => ordering.is_gt(),
        BinaryOp::LtEq => ordering.is_le(),
        BinaryOp::GtEq => ordering.is_ge(),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::parse_rule;

    const ROW: &str = "chr1\t100\trs1\tA\tG,T\t50\tPASS\tDP=30;DB;AF=0.25,0.5\n";

    fn eval_rule(rule: &str, line: &str) -> Result<bool, EvalError> {
        let expr = parse_rule(rule).unwrap();
        let record = Record::new(line, 1);
        evaluate(&expr, &record).map(|v| v.truthy())
    }

    #[test]
    fn test_line_contains() {
        assert!(eval_rule(r#"LINE contains "PASS""#, ROW).unwrap());
        assert!(!eval_rule(r#"LINE contains "LOWQUAL""#, ROW).unwrap());
    }

    #[test]
    fn test_filter_column() {
        assert!(eval_rule(r#"FILTER == "PASS""#, ROW).unwrap());
        let failed = "chr1\t100\t.\tA\tG\t50\tq10;s50\t.";
        assert!(!eval_rule(r#"FILTER == "PASS""#, failed).unwrap());
        assert!(eval_rule(r#"FILTER == "s50""#, failed).unwrap());
        assert!(eval_rule(r#"FILTER != "PASS""#, failed).unwrap());
    }

    #[test]
    fn test_filter_column_ignores_pass_elsewhere() {
        let row = "chr1\t100\tPASS_ID\tA\tG\t50\tLowQual\t.";
        assert!(eval_rule(r#"LINE contains "PASS""#, row).unwrap());
        assert!(!eval_rule(r#"FILTER == "PASS""#, row).unwrap());
    }

    #[test]
    fn test_numeric_columns() {
        assert!(eval_rule("QUAL > 30", ROW).unwrap());
        assert!(eval_rule("QUAL >= 50", ROW).unwrap());
        assert!(!eval_rule("QUAL > 50", ROW).unwrap());
        assert!(eval_rule("POS == 100", ROW).unwrap());
    }

    #[test]
    fn test_missing_qual_comparison_is_false() {
        let row = "chr1\t100\t.\tA\tG\t.\tPASS\t.";
        assert!(!eval_rule("QUAL > 10", row).unwrap());
        assert!(!eval_rule("QUAL <= 10", row).unwrap());
        assert!(!eval_rule("exists(QUAL)", row).unwrap());
    }

    #[test]
    fn test_alt_any_match() {
        assert!(eval_rule(r#"ALT == "T""#, ROW).unwrap());
        assert!(!eval_rule(r#"ALT == "C""#, ROW).unwrap());
    }

    #[test]
    fn test_info_values() {
        assert!(eval_rule("INFO.DP >= 30", ROW).unwrap());
        assert!(eval_rule("INFO.AF > 0.4", ROW).unwrap());
        assert!(eval_rule("INFO.DB", ROW).unwrap());
        assert!(eval_rule("exists(INFO.DB) && !exists(INFO.SOMATIC)", ROW).unwrap());
    }

    #[test]
    fn test_logical_operators() {
        assert!(eval_rule(r#"QUAL > 30 && FILTER == "PASS""#, ROW).unwrap());
        assert!(eval_rule(r#"QUAL > 60 || INFO.DP == 30"#, ROW).unwrap());
        assert!(!eval_rule(r#"!(LINE contains "PASS")"#, ROW).unwrap());
    }

    #[test]
    fn test_short_circuit_skips_short_line_error() {
        let short = "a LOWQUAL\n";
        assert!(!eval_rule(r#"LINE contains "PASS" && FILTER == "PASS""#, short).unwrap());
    }

    #[test]
    fn test_too_few_columns() {
        let err = eval_rule(r#"FILTER == "PASS""#, "chr1\t100\tPASS\n").unwrap_err();
        assert!(matches!(err, EvalError::TooFewColumns { column: "FILTER", .. }));
    }

    #[test]
    fn test_invalid_utf8_only_fails_the_field_read() {
        let expr = parse_rule(r#"FILTER == "PASS""#).unwrap();
        let line: &[u8] = b"chr1\t1\tcaf\xe9\tA\tG\t5\tPASS\t.\n";
        assert!(evaluate(&expr, &Record::new(line, 1)).unwrap().truthy());

        let expr = parse_rule(r#"LINE contains "PASS""#).unwrap();
        assert_eq!(
            evaluate(&expr, &Record::new(line, 1)),
            Err(EvalError::InvalidUtf8 { field: "LINE" })
        );
    }

    #[test]
    fn test_type_mismatch() {
        let err = eval_rule("INFO.DB > 3", ROW).unwrap_err();
        assert_eq!(
            err,
            EvalError::TypeMismatch {
                left: "bool".to_string(),
                right: "number".to_string()
            }
        );
    }

    #[test]
    fn test_string_ordering() {
        assert!(eval_rule(r#"CHROM < "chr2""#, ROW).unwrap());
    }
}
