//! User confirmation prompts for destructive operations

use std::io::{self, BufRead, Write};

use crate::config::defaults;

/// Ask a question on stderr and read the answer from `input`
///
/// Only the exact answer `yes` (ignoring case and surrounding whitespace)
/// counts as confirmation. A read error or end of input declines.
pub fn confirm_action<R: BufRead + ?Sized>(input: &mut R, question: &str) -> bool {
    eprint!(
        "{} (only '{}' will be accepted): ",
        question,
        defaults::CONFIRM_ANSWER
    );
    let _ = io::stderr().flush();

    let mut answer = String::new();
    match input.read_line(&mut answer) {
        Ok(_) => is_confirmation(&answer),
        Err(_) => false,
    }
}

fn is_confirmation(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case(defaults::CONFIRM_ANSWER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_is_confirmation() {
        assert!(is_confirmation("yes"));
        assert!(is_confirmation("YES\n"));
        assert!(is_confirmation("  Yes \r\n"));
        assert!(!is_confirmation("y"));
        assert!(!is_confirmation("no"));
        assert!(!is_confirmation("yes please"));
        assert!(!is_confirmation(""));
    }

    #[test]
    fn test_confirm_action_reads_one_line() {
        let mut input = Cursor::new("yes\nno\n");
        assert!(confirm_action(&mut input, "Proceed?"));
        assert!(!confirm_action(&mut input, "Proceed?"));
    }

    #[test]
    fn test_confirm_action_eof_declines() {
        let mut input = Cursor::new("");
        assert!(!confirm_action(&mut input, "Proceed?"));
    }
}
