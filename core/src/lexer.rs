//! Splits argument-file text into word tokens.
//!
//! Words are separated by space, tab, CR and LF. A `#` outside a word starts
//! a comment that runs to the end of the line. There is no quoting; reserved
//! symbols are written escaped (`\{`) and decoded later by the viewer.

use crate::symbols::COMMENT;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexState {
    Start,
    InSpace,
    InWord,
    InComment,
}

fn is_separator(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\r' | '\n')
}

fn is_line_end(ch: char) -> bool {
    matches!(ch, '\n' | '\r')
}

/// Tokenizes `text` into whitespace- and comment-delimited words.
///
/// # Examples
///
/// ```
/// use argview_core::tokenize;
///
/// let tokens = tokenize("--size 4 # window size\n--group { --n 3 }");
/// assert_eq!(tokens, vec!["--size", "4", "--group", "{", "--n", "3", "}"]);
/// ```
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut state = LexState::Start;

    for ch in text.chars() {
        state = match state {
            LexState::InComment => {
                if is_line_end(ch) {
                    LexState::Start
                } else {
                    LexState::InComment
                }
            }
            LexState::InWord => {
                if is_separator(ch) {
                    tokens.push(std::mem::take(&mut current));
                    LexState::InSpace
                } else {
                    current.push(ch);
                    LexState::InWord
                }
            }
            LexState::Start | LexState::InSpace => {
                if is_separator(ch) {
                    LexState::InSpace
                } else if ch == COMMENT {
                    LexState::InComment
                } else {
                    current.push(ch);
                    LexState::InWord
                }
            }
        };
    }

    if state == LexState::InWord {
        tokens.push(current);
    }

    tokens
}
