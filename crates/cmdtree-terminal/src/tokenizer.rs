//! Whitespace tokenizer.
//!
//! There is no quoting: a token never contains ASCII whitespace.

/// Split `raw` on runs of ASCII whitespace.
pub fn tokenize(raw: &str) -> Vec<String> {
    raw.split_ascii_whitespace().map(str::to_string).collect()
}

/// Join tokens back together with single spaces.
pub fn join_tokens<S: AsRef<str>>(tokens: &[S]) -> String {
    let mut out = String::new();
    for (i, token) in tokens.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(token.as_ref());
    }
    out
}
