#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! A parser for the DIMACS CNF file format.
//!
//! Input is read line by line:
//! - Lines starting with `c` are comments and may appear anywhere.
//! - A single problem line `p cnf <num_variables> <num_clauses>` must precede the first
//!   clause.
//! - Clauses are whitespace-separated integers terminated by `0`. A clause may span several
//!   lines, and a line may hold several clauses.
//! - A line starting with `%` ends the data, as in the SATLIB benchmark files.
//!
//! A final clause missing its terminating `0` is still accepted. The declared counts are
//! checked by [`Problem`] validation, so a file whose clause count disagrees with its
//! header is rejected.

use crate::sat::error::{Error, Result};
use crate::sat::literal::Literal;
use crate::sat::problem::Problem;
use log::debug;
use std::io::{self, BufRead};
use std::path::Path;

/// Header values from the `p cnf` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Header {
    num_variables: usize,
    num_clauses: usize,
}

fn parse_error(line: usize, message: impl Into<String>) -> Error {
    Error::Parse {
        line,
        message: message.into(),
    }
}

fn parse_header(line_no: usize, mut parts: std::str::SplitWhitespace<'_>) -> Result<Header> {
    if parts.next() != Some("cnf") {
        return Err(parse_error(line_no, "expected `p cnf <variables> <clauses>`"));
    }
    let mut count = |what: &str| -> Result<usize> {
        let token = parts
            .next()
            .ok_or_else(|| parse_error(line_no, format!("missing {what} count")))?;
        token
            .parse()
            .map_err(|_| parse_error(line_no, format!("invalid {what} count '{token}'")))
    };
    let num_variables = count("variable")?;
    let num_clauses = count("clause")?;
    if let Some(extra) = parts.next() {
        return Err(parse_error(
            line_no,
            format!("unexpected token '{extra}' after problem line"),
        ));
    }
    Ok(Header {
        num_variables,
        num_clauses,
    })
}

/// Parses DIMACS data from `reader` into a validated [`Problem`].
///
/// # Errors
///
/// - [`Error::Io`] if reading fails.
/// - [`Error::Parse`] for a missing, repeated or malformed problem line, a clause before the
///   problem line, or a token that is not an integer.
/// - Any [`Problem`] validation error, including clauses wider than `max_clause_width`.
pub fn parse_dimacs<R: BufRead>(reader: R, max_clause_width: usize) -> Result<Problem> {
    let mut header: Option<Header> = None;
    let mut clauses: Vec<Vec<Literal>> = Vec::new();
    let mut current: Vec<Literal> = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;
        let mut parts = line.split_whitespace();

        match line.trim_start().chars().next() {
            None | Some('c') => continue,
            Some('%') => break,
            Some('p') => {
                parts.next();
                if header.is_some() {
                    return Err(parse_error(line_no, "duplicate problem line"));
                }
                header = Some(parse_header(line_no, parts)?);
                continue;
            }
            Some(_) => {}
        }

        if header.is_none() {
            return Err(parse_error(line_no, "clause before `p cnf` problem line"));
        }

        for token in parts {
            let literal: Literal = token
                .parse()
                .map_err(|_| parse_error(line_no, format!("invalid literal '{token}'")))?;
            if literal == 0 {
                clauses.push(std::mem::take(&mut current));
            } else {
                current.push(literal);
            }
        }
    }

    if !current.is_empty() {
        clauses.push(current);
    }

    let header = header.ok_or_else(|| parse_error(0, "missing `p cnf` problem line"))?;
    debug!(
        "parsed header {} vars / {} clauses, found {} clauses",
        header.num_variables,
        header.num_clauses,
        clauses.len()
    );
    Problem::with_max_clause_width(
        header.num_variables,
        header.num_clauses,
        clauses,
        max_clause_width,
    )
}

/// Opens `path` and parses it with [`parse_dimacs`].
///
/// # Errors
///
/// [`Error::Io`] if the file cannot be opened, otherwise as [`parse_dimacs`].
pub fn parse_file(path: impl AsRef<Path>, max_clause_width: usize) -> Result<Problem> {
    let file = std::fs::File::open(path)?;
    parse_dimacs(io::BufReader::new(file), max_clause_width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::problem::DEFAULT_MAX_CLAUSE_WIDTH;
    use std::io::Cursor;

    fn parse(text: &str) -> Result<Problem> {
        parse_dimacs(Cursor::new(text), DEFAULT_MAX_CLAUSE_WIDTH)
    }

    fn literals(problem: &Problem) -> Vec<Vec<i32>> {
        problem.iter().map(|c| c.literals().to_vec()).collect()
    }

    #[test]
    fn test_parse_simple_dimacs() {
        let problem = parse(
            "c This is a comment\n\
             p cnf 3 2\n\
             1 -2 0\n\
             2 3 0\n",
        )
        .unwrap();

        assert_eq!(problem.num_variables(), 3);
        assert_eq!(literals(&problem), vec![vec![1, -2], vec![2, 3]]);
    }

    #[test]
    fn test_clauses_may_span_and_share_lines() {
        let problem = parse("p cnf 3 3\n1 -2\n 3 0 -1 0\n2 0\n").unwrap();
        assert_eq!(literals(&problem), vec![vec![1, -2, 3], vec![-1], vec![2]]);
    }

    #[test]
    fn test_end_marker_and_blank_lines() {
        let problem = parse(
            "p cnf 2 2\n\
             \n\
             1 0\n\
             \n\
             -2 0\n\
             %\n\
             0\n\
             c this should be ignored",
        )
        .unwrap();
        assert_eq!(literals(&problem), vec![vec![1], vec![-2]]);
    }

    #[test]
    fn test_final_clause_without_terminator() {
        let problem = parse("p cnf 2 2\n1 2 0\n-1 -2").unwrap();
        assert_eq!(literals(&problem), vec![vec![1, 2], vec![-1, -2]]);
    }

    #[test]
    fn test_missing_header() {
        assert!(matches!(parse("1 2 0\n"), Err(Error::Parse { line: 1, .. })));
        assert!(matches!(parse("c only\n"), Err(Error::Parse { .. })));
    }

    #[test]
    fn test_malformed_header() {
        assert!(matches!(parse("p dnf 2 1\n1 0\n"), Err(Error::Parse { line: 1, .. })));
        assert!(matches!(parse("p cnf x 1\n1 0\n"), Err(Error::Parse { .. })));
        assert!(matches!(
            parse("p cnf 2 1\np cnf 2 1\n1 0\n"),
            Err(Error::Parse { line: 2, .. })
        ));
    }

    #[test]
    fn test_malformed_literal() {
        let err = parse("p cnf 2 1\n1 abc 0\n").unwrap_err();
        assert!(matches!(err, Error::Parse { line: 2, .. }));
        assert!(err.to_string().contains("abc"));
    }

    #[test]
    fn test_validation_errors_surface() {
        assert!(matches!(
            parse("p cnf 2 3\n1 0\n2 0\n"),
            Err(Error::ClauseCountMismatch {
                declared: 3,
                found: 2
            })
        ));
        assert!(matches!(
            parse("p cnf 2 1\n1 3 0\n"),
            Err(Error::LiteralOutOfRange { literal: 3, .. })
        ));
        assert!(matches!(
            parse("p cnf 1 1\n0\n"),
            Err(Error::EmptyClause { clause: 0 })
        ));
        assert!(matches!(parse("p cnf 0 0\n"), Err(Error::NoVariables)));
    }

    #[test]
    fn test_huge_declared_clause_count() {
        assert!(matches!(
            parse("p cnf 1 1000000000000\n1 0\n"),
            Err(Error::ClauseCountMismatch {
                declared: 1_000_000_000_000,
                found: 1
            })
        ));
    }

    #[test]
    fn test_clause_width_bound() {
        let text = "p cnf 6 1\n1 2 3 4 5 6 0\n";
        assert!(matches!(
            parse(text),
            Err(Error::ClauseTooWide { width: 6, max: 5, .. })
        ));
        assert!(parse_dimacs(Cursor::new(text), 6).is_ok());
    }

    #[test]
    fn test_parse_missing_file() {
        assert!(matches!(
            parse_file("/nonexistent/path/to.cnf", 5),
            Err(Error::Io(_))
        ));
    }
}
