//! Numbered selection prompt.
//!
//! Shows candidates as a 1-based list and turns one line of free-form input
//! into the chosen subset:
//!
//! | Input        | 5 candidates → selected positions |
//! |--------------|-----------------------------------|
//! | `all`, `ALL` | 1 2 3 4 5                         |
//! | `1 3 5`      | 1 3 5                             |
//! | `3,1`        | 3 1                               |
//! | `2 2`        | 2 2                               |
//! | `1 7`        | 1                                 |
//! | `7`          | nothing, "no valid selection"     |
//! | `1,abc`      | nothing, "invalid input"          |
//!
//! Out-of-range numbers are dropped silently, but a single token that is not
//! a number rejects the whole line. Selections keep the order the numbers
//! were typed in, duplicates included.

use crate::workspace::Candidate;
use std::fmt::Display;
use std::io::{BufRead, Write};
use std::num::IntErrorKind;
use thiserror::Error;
use tracing::{debug, warn};

const RULE_WIDTH: usize = 40;

/// Why a line of input selected nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("Invalid input: '{token}' is not a number. Please enter numbers only.")]
    InvalidToken { token: String },

    #[error("No valid selection was made.")]
    NothingSelected,
}

/// Parse `input` against a list of `count` items into 0-based indices.
pub fn parse_selection(input: &str, count: usize) -> Result<Vec<usize>, SelectionError> {
    let input = input.trim();
    if input.eq_ignore_ascii_case("all") {
        return if count == 0 {
            Err(SelectionError::NothingSelected)
        } else {
            Ok((0..count).collect())
        };
    }

    let mut indices = Vec::new();
    for token in input.split(|c: char| c == ',' || c.is_whitespace()) {
        if token.is_empty() {
            continue;
        }
        match token.parse::<i64>() {
            Ok(n) if n >= 1 && (n as u64) <= count as u64 => indices.push(n as usize - 1),
            Ok(n) => debug!("Ignoring out-of-range selection {n}"),
            // Too many digits for i64: out of range for any real list.
            Err(e) if matches!(e.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) => {
                debug!("Ignoring out-of-range selection {token}")
            }
            Err(_) => {
                return Err(SelectionError::InvalidToken {
                    token: token.to_string(),
                })
            }
        }
    }

    if indices.is_empty() {
        return Err(SelectionError::NothingSelected);
    }
    Ok(indices)
}

/// Print `items` as a numbered list under a heading.
pub fn render_list<W: Write, T: Display>(out: &mut W, items: &[T], label: &str) -> std::io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Found {label}:")?;
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;
    for (idx, item) in items.iter().enumerate() {
        writeln!(out, " [{}] {}", idx + 1, item)?;
    }
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))
}

/// Show `candidates`, read one line from `input` and return the chosen ones.
///
/// Never fails: an empty list, bad input, end of input and I/O errors all
/// produce an empty selection, with a message written to `output`.
pub fn prompt_selection<R: BufRead, W: Write>(
    candidates: &[Candidate],
    label: &str,
    input: &mut R,
    output: &mut W,
) -> Vec<Candidate> {
    match try_prompt(candidates, label, input, output) {
        Ok(selected) => selected,
        Err(e) => {
            warn!("Selection prompt failed: {e}");
            Vec::new()
        }
    }
}

fn try_prompt<R: BufRead, W: Write>(
    candidates: &[Candidate],
    label: &str,
    input: &mut R,
    output: &mut W,
) -> std::io::Result<Vec<Candidate>> {
    if candidates.is_empty() {
        writeln!(output, "✗ No {label} available.")?;
        return Ok(Vec::new());
    }

    render_list(output, candidates, label)?;
    writeln!(output, "Enter the numbers to process.")?;
    writeln!(
        output,
        "  (e.g. '1' or '1 3 5', separated by spaces or commas; 'all' for everything)"
    )?;
    write!(output, "Input > ")?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        // End of input: nothing was typed.
        writeln!(output)?;
    }

    match parse_selection(&line, candidates.len()) {
        Ok(indices) => Ok(indices.into_iter().map(|i| candidates[i].clone()).collect()),
        Err(e) => {
            writeln!(output, "✗ {e}")?;
            Ok(Vec::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn files(n: usize) -> Vec<Candidate> {
        (1..=n)
            .map(|i| Candidate::file(format!("/ws/doc{i}.pdf")))
            .collect()
    }

    fn run(candidates: &[Candidate], typed: &str) -> (Vec<String>, String) {
        let mut input = Cursor::new(typed.as_bytes().to_vec());
        let mut output = Vec::new();
        let selected = prompt_selection(candidates, "PDF files", &mut input, &mut output);
        (
            selected.into_iter().map(|c| c.name).collect(),
            String::from_utf8(output).unwrap(),
        )
    }

    #[test]
    fn all_selects_everything_in_order() {
        assert_eq!(parse_selection("all", 4), Ok(vec![0, 1, 2, 3]));
        assert_eq!(parse_selection("  ALL \n", 2), Ok(vec![0, 1]));
    }

    #[test]
    fn listed_numbers_keep_typed_order() {
        assert_eq!(parse_selection("1 3 5", 5), Ok(vec![0, 2, 4]));
        assert_eq!(parse_selection("5 1", 5), Ok(vec![4, 0]));
    }

    #[test]
    fn commas_count_as_separators() {
        assert_eq!(parse_selection("1,2", 3), Ok(vec![0, 1]));
        assert_eq!(parse_selection(" 3 ,, 1\t2 ", 3), Ok(vec![2, 0, 1]));
    }

    #[test]
    fn duplicates_are_preserved() {
        assert_eq!(parse_selection("2 2 1 2", 3), Ok(vec![1, 1, 0, 1]));
    }

    #[test]
    fn out_of_range_is_dropped_silently() {
        assert_eq!(parse_selection("0 1 6 -2 5", 5), Ok(vec![0, 4]));
        assert_eq!(
            parse_selection("99999999999999999999999 2", 3),
            Ok(vec![1])
        );
    }

    #[test]
    fn only_out_of_range_selects_nothing() {
        assert_eq!(parse_selection("7", 5), Err(SelectionError::NothingSelected));
    }

    #[test]
    fn one_bad_token_rejects_the_line() {
        assert_eq!(
            parse_selection("1,abc", 5),
            Err(SelectionError::InvalidToken {
                token: "abc".into()
            })
        );
        assert!(matches!(
            parse_selection("1 2 3.5", 5),
            Err(SelectionError::InvalidToken { .. })
        ));
        assert!(matches!(
            parse_selection("all 1", 5),
            Err(SelectionError::InvalidToken { .. })
        ));
    }

    #[test]
    fn blank_line_selects_nothing() {
        assert_eq!(parse_selection("", 3), Err(SelectionError::NothingSelected));
        assert_eq!(parse_selection(" , ", 3), Err(SelectionError::NothingSelected));
    }

    #[test]
    fn prompt_lists_and_selects() {
        let (selected, out) = run(&files(5), "1 3 5\n");
        assert_eq!(selected, vec!["doc1.pdf", "doc3.pdf", "doc5.pdf"]);
        assert!(out.contains("Found PDF files:"), "got: {out}");
        assert!(out.contains(" [1] doc1.pdf"));
        assert!(out.contains(" [5] doc5.pdf"));
        assert!(out.contains("Input > "));
    }

    #[test]
    fn prompt_reports_invalid_input() {
        let (selected, out) = run(&files(5), "1,abc\n");
        assert!(selected.is_empty());
        assert!(out.contains("Invalid input"), "got: {out}");
    }

    #[test]
    fn prompt_reports_empty_selection() {
        let (selected, out) = run(&files(5), "7\n");
        assert!(selected.is_empty());
        assert!(out.contains("No valid selection"), "got: {out}");
    }

    #[test]
    fn prompt_with_no_candidates_reads_nothing() {
        let mut input = Cursor::new(b"1\n".to_vec());
        let mut output = Vec::new();
        let selected = prompt_selection(&[], "image folders", &mut input, &mut output);

        assert!(selected.is_empty());
        assert_eq!(input.position(), 0, "input must not be consumed");
        let out = String::from_utf8(output).unwrap();
        assert!(out.contains("No image folders available."), "got: {out}");
    }

    #[test]
    fn prompt_at_end_of_input_selects_nothing() {
        let (selected, out) = run(&files(2), "");
        assert!(selected.is_empty());
        assert!(out.contains("No valid selection"));
    }

    #[test]
    fn folders_show_image_counts() {
        let folders = vec![
            Candidate::directory("/ws/report", 3),
            Candidate::directory("/ws/cover", 1),
        ];
        let (selected, out) = run(&folders, "all\n");
        assert_eq!(selected, vec!["report", "cover"]);
        assert!(out.contains(" [1] report (3 images)"), "got: {out}");
        assert!(out.contains(" [2] cover (1 image)"), "got: {out}");
    }
}
