//! Rule expression parser using chumsky.
//!
//! Parses rule expressions like:
//! - `LINE contains "PASS"`
//! - `FILTER == "PASS"`
//! - `QUAL >= 30 && INFO.DP > 10`
//! - `!(LINE contains "LOWQUAL")`
//! - `exists(INFO.DB) || ALT == "T"`

use chumsky::prelude::*;

use crate::record::FIXED_COLUMNS;

/// Binary operators for comparisons and logic.
#[derive(Debug, Clone, PartialEq)]
pub enum BinaryOp {
    // Comparison
    Eq,       // ==
    NotEq,    // !=
    Lt,       // <
    Gt,       // >
    LtEq,     // <=
    GtEq,     // >=
    Contains, // contains (substring)

    // Logical
    And, // &&
    Or,  // ||
}

/// Unary operators.
#[derive(Debug, Clone, PartialEq)]
pub enum UnaryOp {
    Not, // !
}

/// Something a rule can read from a record.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    /// The whole line, without its terminator.
    Line,
    /// One of the eight fixed VCF columns, by name.
    Column(String),
    /// A key inside the INFO column (`INFO.DP`).
    Info(String),
}

/// A rule expression AST node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A numeric literal.
    Number(f64),
    /// A string literal.
    String(String),
    /// A boolean literal.
    Bool(bool),
    /// A field read from the record.
    Field(Field),
    /// A binary operation.
    Binary(Box<Expr>, BinaryOp, Box<Expr>),
    /// A unary operation.
    Unary(UnaryOp, Box<Expr>),
    /// Check if a field is present and not `.`.
    Exists(Field),
}

/// Field reference: `LINE`, a fixed column name, or `INFO.<key>`.
fn field() -> impl Parser<char, Field, Error = Simple<char>> + Clone {
    let info_key = filter(|c: &char| c.is_ascii_alphanumeric() || *c == '_')
        .repeated()
        .at_least(1)
        .collect::<String>();

    text::ident()
        .then(just('.').ignore_then(info_key).or_not())
        .try_map(
            |(name, key): (String, Option<String>), span| match key {
                Some(key) if name == "INFO" => Ok(Field::Info(key)),
                None if name == "LINE" => Ok(Field::Line),
                None if FIXED_COLUMNS.contains(&name.as_str()) => Ok(Field::Column(name)),
                Some(key) => Err(Simple::custom(
                    span,
                    format!("unknown field `{}.{}`", name, key),
                )),
                None => Err(Simple::custom(span, format!("unknown field `{}`", name))),
            },
        )
        .padded()
}

/// Create the rule expression parser.
pub fn parser() -> impl Parser<char, Expr, Error = Simple<char>> {
    recursive(|full_expr| {
        // Number literal, optionally negative
        let number = just('-')
            .or_not()
            .chain::<char, _, _>(text::int(10))
            .chain::<char, _, _>(just('.').chain(text::digits(10)).or_not().flatten())
            .collect::<String>()
            .try_map(|s, span| {
                s.parse()
                    .map(Expr::Number)
                    .map_err(|e| Simple::custom(span, format!("invalid number `{}`: {}", s, e)))
            })
            .padded();

        // String literal (double-quoted)
        let string = just('"')
            .ignore_then(filter(|c| *c != '"').repeated())
            .then_ignore(just('"'))
            .collect::<String>()
            .map(Expr::String)
            .padded();

        // Boolean literal
        let boolean = choice((
            text::keyword("true").to(Expr::Bool(true)),
            text::keyword("false").to(Expr::Bool(false)),
        ))
        .padded();

        // exists(field) function
        let exists_fn = text::keyword("exists")
            .padded()
            .ignore_then(
                field()
                    .delimited_by(just('(').padded(), just(')').padded()),
            )
            .map(Expr::Exists);

        // Parenthesized expression (uses full_expr recursively)
        let paren_expr = just('(')
            .padded()
            .ignore_then(full_expr)
            .then_ignore(just(')').padded());

        let atom = choice((
            exists_fn,
            boolean,
            number,
            string,
            paren_expr,
            field().map(Expr::Field),
        ));

        // Unary operators (!)
        let unary = just('!')
            .padded()
            .repeated()
            .then(atom)
            .foldr(|_op, expr| Expr::Unary(UnaryOp::Not, Box::new(expr)));

        // Comparison operators
        let cmp_op = choice((
            just("==").to(BinaryOp::Eq),
            just("!=").to(BinaryOp::NotEq),
            just("<=").to(BinaryOp::LtEq),
            just(">=").to(BinaryOp::GtEq),
            just("<").to(BinaryOp::Lt),
            just(">").to(BinaryOp::Gt),
            text::keyword("contains").to(BinaryOp::Contains),
        ))
        .padded();

        let comparison = unary
            .clone()
            .then(cmp_op.then(unary).repeated())
            .foldl(|left, (op, right)| Expr::Binary(Box::new(left), op, Box::new(right)));

        let and_op = just("&&").padded().to(BinaryOp::And);
        let and_expr = comparison
            .clone()
            .then(and_op.then(comparison).repeated())
            .foldl(|left, (op, right)| Expr::Binary(Box::new(left), op, Box::new(right)));

        let or_op = just("||").padded().to(BinaryOp::Or);
        and_expr
            .clone()
            .then(or_op.then(and_expr).repeated())
            .foldl(|left, (op, right)| Expr::Binary(Box::new(left), op, Box::new(right)))
    })
    .then_ignore(end())
}

/// Parse a rule expression string into an AST.
pub fn parse_rule(rule: &str) -> Result<Expr, Vec<Simple<char>>> {
    parser().parse(rule)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line_contains() {
        let expr = parse_rule(r#"LINE contains "PASS""#).unwrap();
        assert_eq!(
            expr,
            Expr::Binary(
                Box::new(Expr::Field(Field::Line)),
                BinaryOp::Contains,
                Box::new(Expr::String("PASS".to_string()))
            )
        );
    }

    #[test]
    fn test_parse_column_comparison() {
        let expr = parse_rule(r#"FILTER == "PASS""#).unwrap();
        if let Expr::Binary(left, BinaryOp::Eq, _) = expr {
            assert_eq!(*left, Expr::Field(Field::Column("FILTER".to_string())));
        } else {
            panic!("Expected Binary");
        }
    }

    #[test]
    fn test_parse_info_key() {
        let expr = parse_rule("INFO.DP > 10").unwrap();
        if let Expr::Binary(left, BinaryOp::Gt, right) = expr {
            assert_eq!(*left, Expr::Field(Field::Info("DP".to_string())));
            assert_eq!(*right, Expr::Number(10.0));
        } else {
            panic!("Expected Binary");
        }
    }

    #[test]
    fn test_parse_info_key_starting_with_digit() {
        let expr = parse_rule("exists(INFO.1000G)").unwrap();
        assert_eq!(expr, Expr::Exists(Field::Info("1000G".to_string())));
    }

    #[test]
    fn test_parse_negative_and_float_numbers() {
        assert_eq!(parse_rule("-1.5").unwrap(), Expr::Number(-1.5));
        assert_eq!(parse_rule("42").unwrap(), Expr::Number(42.0));
    }

    #[test]
    fn test_parse_logical_precedence() {
        // && binds tighter than ||
        let expr = parse_rule(r#"QUAL > 30 || FILTER == "PASS" && INFO.DP > 5"#).unwrap();
        if let Expr::Binary(_, BinaryOp::Or, right) = expr {
            assert!(matches!(*right, Expr::Binary(_, BinaryOp::And, _)));
        } else {
            panic!("Expected Or at the root");
        }
    }

    #[test]
    fn test_parse_negated_group() {
        let expr = parse_rule(r#"!(LINE contains "LOWQUAL")"#).unwrap();
        assert!(matches!(expr, Expr::Unary(UnaryOp::Not, _)));
    }

    #[test]
    fn test_parse_boolean_literal() {
        assert_eq!(parse_rule("true").unwrap(), Expr::Bool(true));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        assert!(parse_rule(r#"GENE == "BRCA1""#).is_err());
        assert!(parse_rule("FORMAT.GT == 1").is_err());
    }

    #[test]
    fn test_trailing_garbage_is_rejected() {
        assert!(parse_rule(r#"FILTER == "PASS" extra"#).is_err());
        assert!(parse_rule(r#"FILTER == "PASS"#).is_err());
    }
}
