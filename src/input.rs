//! Interactive prompt helpers for the shell. Invalid entries re-prompt
//! rather than fail; only closed stdin and misuse (min > max) are errors.

use anyhow::{Context, Result, bail};
use std::io::{self, BufRead, Write};

/// Inclusive-range misuse: the caller passed min > max.
#[derive(Debug, thiserror::Error)]
#[error("Minimum value {min} is greater than maximum value {max}")]
pub struct RangeError {
    pub min: i64,
    pub max: i64,
}

/// Print a prompt and read one line, without the trailing newline.
/// Fails if stdin is closed.
fn prompt_line(prompt: &str) -> Result<String> {
    print!("{prompt}");
    io::stdout().flush().context("Failed to flush stdout")?;

    let mut line = String::new();
    let bytes = io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    if bytes == 0 {
        bail!("Standard input closed");
    }
    Ok(line.trim_end_matches(['\n', '\r']).to_string())
}

/// Read a non-empty line of text, re-prompting on empty input.
pub fn read_text(prompt: &str) -> Result<String> {
    loop {
        let line = prompt_line(prompt)?;
        if line.trim().is_empty() {
            println!("Please do not leave empty");
            continue;
        }
        return Ok(line);
    }
}

/// Read a floating point number, re-prompting on anything unparseable.
pub fn read_float(prompt: &str) -> Result<f64> {
    loop {
        let line = read_text(prompt)?;
        match line.trim().parse() {
            Ok(value) => return Ok(value),
            Err(_) => println!("Please enter a number"),
        }
    }
}

/// Read an integer within an inclusive range, re-prompting on unparseable
/// or out-of-range input. Fails with [`RangeError`] if min > max.
pub fn read_int_ranged(prompt: &str, min: i64, max: i64) -> Result<i64> {
    if min > max {
        return Err(RangeError { min, max }.into());
    }
    loop {
        let line = read_text(prompt)?;
        match line.trim().parse::<i64>() {
            Ok(value) if value < min => {
                println!("Number is lower than the minimum value {min}")
            }
            Ok(value) if value > max => {
                println!("Number is greater than the maximum value {max}")
            }
            Ok(value) => return Ok(value),
            Err(_) => println!("Please enter an integer number"),
        }
    }
}

/// Ask a yes/no question; any answer starting with `y`/`Y` counts as yes.
pub fn ask_to_continue(prompt: &str) -> Result<bool> {
    let line = prompt_line(prompt)?;
    Ok(parse_yes(&line))
}

fn parse_yes(input: &str) -> bool {
    input.trim().to_lowercase().starts_with('y')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yes() {
        assert!(parse_yes("y"));
        assert!(parse_yes(" Yes "));
        assert!(parse_yes("YEAH"));
        assert!(!parse_yes("n"));
        assert!(!parse_yes("no"));
        assert!(!parse_yes(""));
    }

    #[test]
    fn test_inverted_range_is_rejected_before_reading() {
        let result = read_int_ranged("pick: ", 5, 1);
        let err = result.unwrap_err();
        assert!(err.downcast_ref::<RangeError>().is_some());
    }
}
