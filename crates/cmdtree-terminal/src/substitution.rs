//! Nested-call expansion: `$(command args)` inside another command line.
//!
//! The scan walks tokens from last to first. Expanding a call only splices
//! tokens at or after the current index, so indices still to be visited are
//! never disturbed. `$$(` is the escaped form and loses one `$` when seen.

use crate::data::Data;
use crate::handler::Handler;
use crate::tokenizer::{join_tokens, tokenize};

pub(crate) const CALL_OPEN: &str = "$(";
pub(crate) const CALL_CLOSE: char = ')';

/// A `$(...)` span found in a token sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CallSpan {
    /// Index of the opening token.
    pub start: usize,
    /// One past the last consumed token.
    pub end: usize,
    /// Command text with the markers stripped.
    pub inner: String,
    /// Whether a closing `)` was found.
    pub terminated: bool,
}

/// Locate the call opened at `start`, if the token there opens one.
///
/// Tokens are consumed until one ends in `)` or the sequence runs out.
pub(crate) fn call_span(tokens: &[String], start: usize) -> Option<CallSpan> {
    let first = tokens.get(start)?.strip_prefix(CALL_OPEN)?;

    let mut parts: Vec<&str> = Vec::new();
    let mut end = start;
    let mut current = first;
    let terminated = loop {
        end += 1;
        if let Some(body) = current.strip_suffix(CALL_CLOSE) {
            parts.push(body);
            break true;
        }
        parts.push(current);
        match tokens.get(end) {
            Some(next) => current = next,
            None => break false,
        }
    };

    parts.retain(|p| !p.is_empty());
    Some(CallSpan {
        start,
        end,
        inner: join_tokens(&parts),
        terminated,
    })
}

/// Strip one level of escaping from `$$(`-prefixed tokens (`$$$(` becomes
/// `$$(`, and so on).
pub(crate) fn unescape_call(token: &str) -> Option<String> {
    let dollars = token.bytes().take_while(|&b| b == b'$').count();
    let escaped = dollars >= 2 && token[dollars..].starts_with('(');
    escaped.then(|| token[1..].to_string())
}

impl Data {
    /// Replace every `$(...)` span with the result of evaluating it.
    ///
    /// Errors and warnings from each nested call are appended here. A call
    /// that reports errors keeps its original tokens and the scan moves on
    /// to the token before it.
    pub fn expand_nested_calls(&mut self, handler: &Handler) {
        let mut index = self.token_count();
        while index > 0 {
            index -= 1;

            if let Some(literal) = unescape_call(&self.tokens()[index]) {
                self.tokens_mut()[index] = literal;
                continue;
            }

            let Some(span) = call_span(self.tokens(), index) else {
                continue;
            };

            if !span.terminated {
                let text = self.tokens_joined(span.start, span.end);
                log::warn!("unterminated nested call at token {index}: {text}");
                self.add_warning(format!(
                    "unterminated nested call '{text}' starting at token {index}"
                ));
            }

            log::trace!("nested call [{}..{}): {}", span.start, span.end, span.inner);
            let nested = handler.evaluate(&span.inner);
            self.absorb_diagnostics(&nested);
            if nested.has_errors() {
                continue;
            }

            let replacement = tokenize(nested.result());
            self.tokens_mut().splice(span.start..span.end, replacement);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(raw: &str) -> Vec<String> {
        tokenize(raw)
    }

    #[test]
    fn not_a_call() {
        assert_eq!(call_span(&toks("echo hi"), 0), None);
        assert_eq!(call_span(&toks("x$(y)"), 0), None);
        assert_eq!(call_span(&toks("a"), 3), None);
    }

    #[test]
    fn single_token_call() {
        let span = call_span(&toks("echo $(now)"), 1).unwrap();
        assert_eq!(span.start, 1);
        assert_eq!(span.end, 2);
        assert_eq!(span.inner, "now");
        assert!(span.terminated);
    }

    #[test]
    fn multi_token_call() {
        let span = call_span(&toks("$(math add 1 2) tail"), 0).unwrap();
        assert_eq!((span.start, span.end), (0, 4));
        assert_eq!(span.inner, "math add 1 2");
    }

    #[test]
    fn detached_markers() {
        let span = call_span(&toks("$( echo hi )"), 0).unwrap();
        assert_eq!((span.start, span.end), (0, 4));
        assert_eq!(span.inner, "echo hi");
        assert!(span.terminated);
    }

    #[test]
    fn call_at_end_of_sequence() {
        let span = call_span(&toks("a b $(c d)"), 2).unwrap();
        assert_eq!((span.start, span.end), (2, 4));
    }

    #[test]
    fn unterminated_runs_to_end() {
        let span = call_span(&toks("cmd $(sub x"), 1).unwrap();
        assert_eq!((span.start, span.end), (1, 3));
        assert_eq!(span.inner, "sub x");
        assert!(!span.terminated);
    }

    #[test]
    fn stops_at_first_close() {
        let span = call_span(&toks("$(a b) c)"), 0).unwrap();
        assert_eq!(span.end, 2);
        assert_eq!(span.inner, "a b");
    }

    #[test]
    fn only_one_close_is_stripped() {
        let span = call_span(&toks("$(x))"), 0).unwrap();
        assert_eq!(span.inner, "x)");
    }

    #[test]
    fn escape() {
        assert_eq!(unescape_call("$$(x"), Some("$(x".to_string()));
        assert_eq!(unescape_call("$$$(x"), Some("$$(x".to_string()));
        assert_eq!(unescape_call("$$x"), None);
        assert_eq!(unescape_call("$(x"), None);
        assert_eq!(call_span(&toks("$$(x)"), 0), None);
    }
}
