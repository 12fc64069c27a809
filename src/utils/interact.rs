//! Helpers for interacting with the user and timing work.

use std::io;
use std::io::BufRead;
use std::io::Write;
use std::time::Instant;

use tracing::info;

/// Prompts with `message` until the user answers `y`/`yes` or `n`/`no`
/// (case-insensitive). Reaching the end of input is an error.
///
/// ```
/// use recipes::utils::interact::yes_or_no;
///
/// let mut output = Vec::new();
/// let answer = yes_or_no(&b"maybe\nYES\n"[..], &mut output, "Continue? ").unwrap();
/// assert!(answer);
/// assert_eq!(String::from_utf8(output).unwrap(), "Continue? Continue? ");
/// ```
pub fn yes_or_no<R, W>(mut input: R, mut output: W, message: &str) -> io::Result<bool>
where
    R: BufRead,
    W: Write,
{
    let mut reply = String::new();

    loop {
        output.write_all(message.as_bytes())?;
        output.flush()?;

        reply.clear();
        if input.read_line(&mut reply)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "no answer was given",
            ));
        }

        match reply.trim().to_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => continue,
        }
    }
}

/// Runs `f` and logs how long it took under `label`.
pub fn time_block<T, F>(label: &str, f: F) -> T
where
    F: FnOnce() -> T,
{
    let start = Instant::now();
    let result = f();
    info!("{}: {:.3?}", label, start.elapsed());
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yes_or_no_accepts_no() {
        let answer = yes_or_no(&b" n \n"[..], io::sink(), "? ").unwrap();
        assert!(!answer);
    }

    #[test]
    fn test_yes_or_no_eof_is_an_error() {
        let result = yes_or_no(&b"what\n"[..], io::sink(), "? ");
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_time_block_returns_value() {
        assert_eq!(time_block("adding", || 1 + 1), 2);
    }
}
