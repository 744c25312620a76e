//! Splitting of one input line into words.
//!
//! Words are separated by whitespace. A word starting with `'` (or `$'`) is a
//! quoted literal that may contain whitespace and runs to the next unpaired
//! `'`; a doubled `''` inside it stands for a single quote character. The
//! opening marker and the closing quote stay part of the word, the dispatch
//! step decides what they mean. A `#` at the start of a word comments out the
//! rest of the line.

/// One word extracted from a line, with the byte offset it started at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub column: usize,
}

/// Errors that can occur while splitting a line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexingError {
    /// The line ended before the closing quote of a literal.
    #[error("input ended unexpectedly: unterminated literal")]
    UnterminatedLiteral { column: usize },
    /// A closing quote was followed by something other than whitespace.
    #[error("input after quote is not whitespace")]
    TrailingAfterQuote { column: usize },
}

impl LexingError {
    /// Byte offset in the line where the offending word started.
    pub fn column(&self) -> usize {
        match self {
            LexingError::UnterminatedLiteral { column } => *column,
            LexingError::TrailingAfterQuote { column } => *column,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexingState {
    Normal,
    SingleQuote,
}

// Matches C `isspace`, vertical tab included.
fn is_space(b: u8) -> bool {
    b.is_ascii_whitespace() || b == 0x0b
}

/// Extract the word starting at or after `cursor`.
///
/// Returns the word and the cursor of the following word, or `None` when the
/// rest of the line is blank or a comment.
pub fn next_token(line: &str, cursor: usize) -> Result<Option<(Token, usize)>, LexingError> {
    let input = line.as_bytes();
    let mut pos = cursor;
    if pos >= input.len() {
        return Ok(None);
    }

    while pos < input.len() && is_space(input[pos]) {
        pos += 1;
    }
    if pos >= input.len() || input[pos] == b'#' {
        return Ok(None);
    }

    let column = pos;
    let mut word = Vec::new();
    let mut state = LexingState::Normal;
    if input[pos] == b'\'' {
        state = LexingState::SingleQuote;
        word.push(b'\'');
        pos += 1;
    } else if input[pos] == b'$' && input.get(pos + 1) == Some(&b'\'') {
        state = LexingState::SingleQuote;
        word.extend_from_slice(b"$'");
        pos += 2;
    }

    match state {
        LexingState::Normal => {
            while pos < input.len() && !is_space(input[pos]) {
                word.push(input[pos]);
                pos += 1;
            }
        }
        LexingState::SingleQuote => {
            loop {
                match input.get(pos) {
                    None => return Err(LexingError::UnterminatedLiteral { column }),
                    Some(b'\'') if input.get(pos + 1) == Some(&b'\'') => {
                        word.push(b'\'');
                        pos += 2;
                    }
                    Some(b'\'') => {
                        word.push(b'\'');
                        pos += 1;
                        break;
                    }
                    Some(&b) => {
                        word.push(b);
                        pos += 1;
                    }
                }
            }
            if let Some(&b) = input.get(pos) {
                if !is_space(b) {
                    return Err(LexingError::TrailingAfterQuote { column });
                }
            }
        }
    }

    while pos < input.len() && is_space(input[pos]) {
        pos += 1;
    }

    // Only ASCII bytes were split on or dropped, so the word is still UTF-8.
    let text = String::from_utf8_lossy(&word).into_owned();
    Ok(Some((Token { text, column }, pos)))
}

/// Iterator over the words of a line. Stops after the first error.
pub struct Tokens<'a> {
    line: &'a str,
    cursor: usize,
    done: bool,
}

impl Iterator for Tokens<'_> {
    type Item = Result<Token, LexingError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match next_token(self.line, self.cursor) {
            Ok(Some((token, cursor))) => {
                self.cursor = cursor;
                Some(Ok(token))
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Lazily split `line` into words.
pub fn tokens(line: &str) -> Tokens<'_> {
    Tokens {
        line,
        cursor: 0,
        done: false,
    }
}

/// Split a whole line at once; fails if any part of it is malformed.
pub fn split_into_tokens(line: &str) -> Result<Vec<String>, LexingError> {
    tokens(line).map(|t| t.map(|t| t.text)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_words() {
        let words = split_into_tokens("3 4\t+  .\n").unwrap();
        assert_eq!(words, vec!["3", "4", "+", "."]);
    }

    #[test]
    fn test_comment_suppresses_rest() {
        assert_eq!(split_into_tokens("a b # comment").unwrap(), vec!["a", "b"]);
        assert_eq!(split_into_tokens("# only a comment\n").unwrap(), Vec::<String>::new());
        // not at the start of a word, so not a comment
        assert_eq!(split_into_tokens("a#b").unwrap(), vec!["a#b"]);
    }

    #[test]
    fn test_blank_lines() {
        assert_eq!(split_into_tokens("").unwrap(), Vec::<String>::new());
        assert_eq!(split_into_tokens(" \t \n").unwrap(), Vec::<String>::new());
        assert_eq!(next_token("abc", 3), Ok(None));
        assert_eq!(next_token("abc", 10), Ok(None));
    }

    #[test]
    fn test_quoted_literal_with_escaped_quote() {
        let words = split_into_tokens("'it''s fine' next").unwrap();
        assert_eq!(words, vec!["'it's fine'", "next"]);
    }

    #[test]
    fn test_dollar_quote_keeps_marker() {
        let words = split_into_tokens("$'HOME dir' x").unwrap();
        assert_eq!(words, vec!["$'HOME dir'", "x"]);
    }

    #[test]
    fn test_empty_quoted_literal() {
        assert_eq!(split_into_tokens("'' x").unwrap(), vec!["''", "x"]);
    }

    #[test]
    fn test_quote_inside_plain_word_is_literal() {
        assert_eq!(split_into_tokens("don't").unwrap(), vec!["don't"]);
    }

    #[test]
    fn test_cursor_advances_past_whitespace() {
        let (token, cursor) = next_token("  foo   bar", 0).unwrap().unwrap();
        assert_eq!(token.text, "foo");
        assert_eq!(token.column, 2);
        assert_eq!(cursor, 8);
        let (token, cursor) = next_token("  foo   bar", cursor).unwrap().unwrap();
        assert_eq!(token.text, "bar");
        assert_eq!(cursor, 11);
        assert_eq!(next_token("  foo   bar", cursor), Ok(None));
    }

    #[test]
    fn test_quote_may_end_the_line() {
        assert_eq!(split_into_tokens("'a b'").unwrap(), vec!["'a b'"]);
        assert_eq!(split_into_tokens("'a b'\n").unwrap(), vec!["'a b'"]);
    }

    #[test]
    fn test_unterminated_literal() {
        assert_eq!(
            split_into_tokens("x 'never closed\n"),
            Err(LexingError::UnterminatedLiteral { column: 2 })
        );
    }

    #[test]
    fn test_garbage_after_quote() {
        let err = split_into_tokens("'abc'def").unwrap_err();
        assert_eq!(err, LexingError::TrailingAfterQuote { column: 0 });
        assert_eq!(err.column(), 0);
    }

    #[test]
    fn test_iterator_stops_after_error() {
        let mut it = tokens("a b 'oops c d");
        assert_eq!(it.next().unwrap().unwrap().text, "a");
        assert_eq!(it.next().unwrap().unwrap().text, "b");
        assert!(it.next().unwrap().is_err());
        assert!(it.next().is_none());
    }

    #[test]
    fn test_non_ascii_survives() {
        assert_eq!(split_into_tokens("héllo 'wörld x'").unwrap(), vec!["héllo", "'wörld x'"]);
    }
}
