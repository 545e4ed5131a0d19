//! Matches a flat token sequence against a schema tree.
//!
//! Each scope (the root list, or the inside of a context's brackets) is
//! matched by greedy assignment: at every position the still-unused entries
//! are tried in name order, the first one that matches consumes its tokens
//! and is retired for the rest of the scope. There is no backtracking.
//!
//! Matching never mutates a caller's position. Node matchers take a start
//! index and report where the next token begins, so a failed or erroneous
//! attempt leaves the caller exactly where it was.

use tracing::{debug, trace};

use crate::error::MatchError;
use crate::schema::{ArgumentList, SchemaNode};
use crate::symbols::{CONTEXT_BEGIN, CONTEXT_END};

/// Result of trying one entry at one position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    /// The entry starts here; the next unconsumed token is at `next`.
    Matched { next: usize },
    /// The entry does not start here.
    NoMatch,
}

/// Matches the whole of `tokens` against the root scope `schema`.
///
/// # Errors
///
/// Returns the first structural problem found in scan order.
///
/// # Examples
///
/// ```
/// use argview_core::{ArgumentList, SchemaNode, Value, match_all};
///
/// let mut schema = ArgumentList::new();
/// schema.register(SchemaNode::flag("--verbose", "")).unwrap();
/// schema.register(SchemaNode::scalar("--count", Value::I32(0), "")).unwrap();
///
/// let tokens: Vec<String> = ["--count", "5", "--verbose"].map(String::from).to_vec();
/// assert!(match_all(&schema, &tokens).is_ok());
///
/// let tokens: Vec<String> = ["--count", "x"].map(String::from).to_vec();
/// assert!(match_all(&schema, &tokens).is_err());
/// ```
pub fn match_all(schema: &ArgumentList, tokens: &[String]) -> Result<(), MatchError> {
    debug!(entries = schema.len(), tokens = tokens.len(), "matching arguments");
    let end = match_scope(schema, tokens, 0, None)?;
    debug_assert_eq!(end, tokens.len());
    Ok(())
}

/// Matches one scope starting at `start` and returns the index where it
/// stopped.
///
/// With `context` set to `None` the scope runs to the end of `tokens`.
/// Inside a context it stops at the first `}` that no entry consumed; the
/// returned index then points at that `}` (or past the end when it is
/// missing, which the caller reports).
pub fn match_scope(
    schema: &ArgumentList,
    tokens: &[String],
    start: usize,
    context: Option<&str>,
) -> Result<usize, MatchError> {
    let at_scope_end = |index: usize| {
        index >= tokens.len() || (context.is_some() && tokens[index] == CONTEXT_END)
    };

    let mut unused: Vec<&SchemaNode> = schema.iter().collect();
    let mut index = start;

    while !at_scope_end(index) {
        if unused.is_empty() {
            let remaining = tokens[index..]
                .iter()
                .take_while(|token| context.is_none() || *token != CONTEXT_END)
                .cloned()
                .collect();
            return Err(MatchError::UnmatchedTrailing {
                context: context.map(String::from),
                index,
                remaining,
            });
        }

        let mut matched = None;
        for (slot, node) in unused.iter().enumerate() {
            if let MatchOutcome::Matched { next } = match_node(node, tokens, index)? {
                trace!(argument = node.name(), from = index, to = next, "matched");
                matched = Some((slot, next));
                break;
            }
        }

        let Some((slot, next)) = matched else {
            return Err(MatchError::UnmatchedArgument {
                context: context.map(String::from),
                argument: tokens[index].clone(),
                index,
            });
        };
        unused.remove(slot);
        index = next;
    }

    Ok(index)
}

/// Tries a single entry at `start`.
///
/// A plain mismatch is [`MatchOutcome::NoMatch`]. Once the name has matched,
/// anything malformed after it is a hard error.
pub fn match_node(
    node: &SchemaNode,
    tokens: &[String],
    start: usize,
) -> Result<MatchOutcome, MatchError> {
    let name = node.name();
    if tokens.get(start).map(String::as_str) != Some(name) {
        return Ok(MatchOutcome::NoMatch);
    }

    let next = match node {
        SchemaNode::Flag { .. } => start + 1,
        SchemaNode::Scalar { default, .. } => {
            let expected = default.kind();
            match tokens.get(start + 1) {
                None => {
                    return Err(MatchError::MissingValue {
                        name: name.to_string(),
                        index: start,
                        expected,
                    });
                }
                Some(value) if !expected.accepts(value) => {
                    return Err(MatchError::InvalidValue {
                        name: name.to_string(),
                        index: start,
                        expected,
                        found: value.clone(),
                    });
                }
                Some(_) => start + 2,
            }
        }
        SchemaNode::Vector { value_kind, .. } => {
            let mut next = start + 1;
            while tokens.get(next).is_some_and(|token| value_kind.accepts(token)) {
                next += 1;
            }
            next
        }
        SchemaNode::StringVector { .. } => {
            let body = expect_context_begin(name, tokens, start)?;
            let close = tokens[body..]
                .iter()
                .position(|token| token == CONTEXT_END)
                .map(|offset| body + offset);
            match close {
                Some(close) => close + 1,
                None => return Err(unterminated(name, start)),
            }
        }
        SchemaNode::Context { children, .. } => {
            let body = expect_context_begin(name, tokens, start)?;
            let close = match_scope(children, tokens, body, Some(name))?;
            if close >= tokens.len() {
                return Err(unterminated(name, start));
            }
            close + 1
        }
    };

    Ok(MatchOutcome::Matched { next })
}

/// Checks that `{` follows the name at `start` and returns the index of the
/// first token inside the brackets.
fn expect_context_begin(name: &str, tokens: &[String], start: usize) -> Result<usize, MatchError> {
    match tokens.get(start + 1) {
        Some(token) if token == CONTEXT_BEGIN => Ok(start + 2),
        found => Err(MatchError::MissingContextBegin {
            name: name.to_string(),
            index: start,
            found: found.cloned(),
        }),
    }
}

fn unterminated(name: &str, start: usize) -> MatchError {
    MatchError::UnterminatedContext {
        name: name.to_string(),
        index: start,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Value, ValueKind};

    fn words(text: &str) -> Vec<String> {
        text.split_whitespace().map(String::from).collect()
    }

    fn schema(nodes: Vec<SchemaNode>) -> ArgumentList {
        let mut list = ArgumentList::new();
        for node in nodes {
            list.register(node).unwrap();
        }
        list
    }

    #[test]
    fn test_flag_consumes_one_token() {
        let node = SchemaNode::flag("--verbose", "");
        let tokens = words("--verbose --other");
        assert_eq!(
            match_node(&node, &tokens, 0).unwrap(),
            MatchOutcome::Matched { next: 1 }
        );
        assert_eq!(match_node(&node, &tokens, 1).unwrap(), MatchOutcome::NoMatch);
    }

    #[test]
    fn test_scalar_consumes_name_and_value() {
        let node = SchemaNode::scalar("--count", Value::I32(0), "");
        assert_eq!(
            match_node(&node, &words("--count 5"), 0).unwrap(),
            MatchOutcome::Matched { next: 2 }
        );
    }

    #[test]
    fn test_scalar_missing_value_is_hard_error() {
        let node = SchemaNode::scalar("--count", Value::I32(0), "");
        let err = match_node(&node, &words("--count"), 0).unwrap_err();
        assert!(matches!(err, MatchError::MissingValue { index: 0, .. }));
    }

    #[test]
    fn test_scalar_wrong_type_is_hard_error() {
        let node = SchemaNode::scalar("--count", Value::I32(0), "");
        let err = match_node(&node, &words("a --count x"), 1).unwrap_err();
        assert_eq!(
            err,
            MatchError::InvalidValue {
                name: "--count".into(),
                index: 1,
                expected: ValueKind::I32,
                found: "x".into(),
            }
        );
    }

    #[test]
    fn test_vector_is_greedy_and_type_homogeneous() {
        let node = SchemaNode::vector("--ids", ValueKind::I32, vec![], "");
        assert_eq!(
            match_node(&node, &words("--ids 1 2 x"), 0).unwrap(),
            MatchOutcome::Matched { next: 3 }
        );
        assert_eq!(
            match_node(&node, &words("--ids"), 0).unwrap(),
            MatchOutcome::Matched { next: 1 }
        );
    }

    #[test]
    fn test_string_vector_runs_to_closing_bracket() {
        let node = SchemaNode::string_vector("--files", vec![], "");
        assert_eq!(
            match_node(&node, &words("--files { a 1 --x } tail"), 0).unwrap(),
            MatchOutcome::Matched { next: 6 }
        );
    }

    #[test]
    fn test_string_vector_bracket_errors() {
        let node = SchemaNode::string_vector("--files", vec![], "");
        let err = match_node(&node, &words("--files a"), 0).unwrap_err();
        assert!(matches!(err, MatchError::MissingContextBegin { found: Some(ref f), .. } if f == "a"));

        let err = match_node(&node, &words("--files"), 0).unwrap_err();
        assert!(matches!(err, MatchError::MissingContextBegin { found: None, .. }));

        let err = match_node(&node, &words("--files { a b"), 0).unwrap_err();
        assert!(matches!(err, MatchError::UnterminatedContext { index: 0, .. }));
    }

    #[test]
    fn test_context_matches_children_inside_brackets() {
        let node = SchemaNode::context("--group", "")
            .with_child(SchemaNode::scalar("--n", Value::I32(0), ""));
        assert_eq!(
            match_node(&node, &words("--group { --n 3 }"), 0).unwrap(),
            MatchOutcome::Matched { next: 5 }
        );
    }

    #[test]
    fn test_context_missing_close_is_hard_error() {
        let node = SchemaNode::context("--group", "")
            .with_child(SchemaNode::scalar("--n", Value::I32(0), ""));
        let err = match_node(&node, &words("--group { --n 3"), 0).unwrap_err();
        assert_eq!(
            err,
            MatchError::UnterminatedContext {
                name: "--group".into(),
                index: 0,
            }
        );
    }

    #[test]
    fn test_empty_context_body() {
        let node = SchemaNode::context("--group", "");
        assert_eq!(
            match_node(&node, &words("--group { }"), 0).unwrap(),
            MatchOutcome::Matched { next: 3 }
        );
    }

    #[test]
    fn test_context_rejects_foreign_argument() {
        let node = SchemaNode::context("--group", "")
            .with_child(SchemaNode::flag("--a", ""));
        let err = match_node(&node, &words("--group { --b }"), 0).unwrap_err();
        assert_eq!(
            err,
            MatchError::UnmatchedArgument {
                context: Some("--group".into()),
                argument: "--b".into(),
                index: 2,
            }
        );
    }

    #[test]
    fn test_nested_contexts() {
        let inner = SchemaNode::context("--inner", "").with_child(SchemaNode::flag("--x", ""));
        let outer = SchemaNode::context("--outer", "")
            .with_child(inner)
            .with_child(SchemaNode::flag("--y", ""));
        let list = schema(vec![outer]);
        assert!(match_all(&list, &words("--outer { --inner { --x } --y }")).is_ok());
    }

    #[test]
    fn test_order_of_distinct_entries_is_irrelevant() {
        let list = schema(vec![
            SchemaNode::flag("--verbose", ""),
            SchemaNode::scalar("--count", Value::U32(0), ""),
            SchemaNode::vector("--ids", ValueKind::I32, vec![], ""),
        ]);
        assert!(match_all(&list, &words("--verbose --ids 1 2 --count 4")).is_ok());
        assert!(match_all(&list, &words("--count 4 --ids --verbose")).is_ok());
    }

    #[test]
    fn test_same_flag_twice_cannot_be_matched() {
        let list = schema(vec![
            SchemaNode::flag("--verbose", ""),
            SchemaNode::flag("--quiet", ""),
        ]);
        let err = match_all(&list, &words("--verbose --verbose")).unwrap_err();
        assert_eq!(
            err,
            MatchError::UnmatchedArgument {
                context: None,
                argument: "--verbose".into(),
                index: 1,
            }
        );
    }

    #[test]
    fn test_trailing_tokens_after_all_entries_used() {
        let list = schema(vec![SchemaNode::flag("--verbose", "")]);
        let err = match_all(&list, &words("--verbose extra more")).unwrap_err();
        assert_eq!(
            err,
            MatchError::UnmatchedTrailing {
                context: None,
                index: 1,
                remaining: words("extra more"),
            }
        );
    }

    #[test]
    fn test_trailing_tokens_inside_context_stop_at_closing_bracket() {
        let list = schema(vec![
            SchemaNode::context("--group", "").with_child(SchemaNode::flag("--a", "")),
            SchemaNode::flag("--b", ""),
        ]);
        let err = match_all(&list, &words("--group { --a x y } --b")).unwrap_err();
        assert_eq!(
            err,
            MatchError::UnmatchedTrailing {
                context: Some("--group".into()),
                index: 3,
                remaining: words("x y"),
            }
        );
        assert_eq!(
            err.to_string(),
            "following arguments in context: --group cannot be matched: x y"
        );
    }

    #[test]
    fn test_empty_schema_and_empty_tokens() {
        let list = ArgumentList::new();
        assert!(match_all(&list, &[]).is_ok());
        assert!(match_all(&list, &words("x")).is_err());
    }

    #[test]
    fn test_vector_leaves_mistyped_token_for_scope() {
        let list = schema(vec![
            SchemaNode::vector("--ids", ValueKind::I32, vec![], ""),
            SchemaNode::flag("x", ""),
        ]);
        assert!(match_all(&list, &words("--ids 1 2 x")).is_ok());
    }

    #[test]
    fn test_stray_closing_bracket_at_top_level() {
        let list = schema(vec![SchemaNode::flag("--a", "")]);
        let err = match_all(&list, &words("--a }")).unwrap_err();
        assert!(matches!(err, MatchError::UnmatchedTrailing { index: 1, .. }));
    }

    #[test]
    fn test_matching_is_deterministic() {
        let list = schema(vec![
            SchemaNode::flag("--a", ""),
            SchemaNode::scalar("--b", Value::I32(0), ""),
        ]);
        let tokens = words("--b 1 --a --c");
        let first = match_all(&list, &tokens).unwrap_err();
        let second = match_all(&list, &tokens).unwrap_err();
        assert_eq!(first, second);
        assert_eq!(first.to_string(), second.to_string());
    }
}
