//! Invocation context passed to every command.

use cmdtree_types::color::{Color, Severity};

use crate::args::FromToken;
use crate::tokenizer::{join_tokens, tokenize};

/// Mutable state for one command evaluation.
///
/// Holds the token sequence (the command's arguments once the path has been
/// resolved), the result text, and the warnings and errors collected along
/// the way. A fresh `Data` is built for every top-level invocation and every
/// nested `$(...)` call.
#[derive(Debug, Clone, Default)]
pub struct Data {
    tokens: Vec<String>,
    result: String,
    warnings: Vec<String>,
    errors: Vec<String>,
    color: Option<Color>,
    invalid_input: bool,
}

impl Data {
    /// Tokenize `raw` into a fresh context.
    pub fn new(raw: &str) -> Self {
        Self::from_tokens(tokenize(raw))
    }

    pub fn from_tokens(tokens: Vec<String>) -> Self {
        Self {
            tokens,
            ..Self::default()
        }
    }

    // -- Tokens --

    pub fn set_tokens(&mut self, raw: &str) {
        self.tokens = tokenize(raw);
    }

    pub fn set_token_list(&mut self, tokens: Vec<String>) {
        self.tokens = tokens;
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub(crate) fn tokens_mut(&mut self) -> &mut Vec<String> {
        &mut self.tokens
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// Token at `index`, or `""` when out of range.
    pub fn token(&self, index: usize) -> &str {
        self.tokens.get(index).map_or("", String::as_str)
    }

    /// Tokens in `begin..end` joined with spaces. The range is clamped.
    pub fn tokens_joined(&self, begin: usize, end: usize) -> String {
        let end = end.min(self.tokens.len());
        let begin = begin.min(end);
        join_tokens(&self.tokens[begin..end])
    }

    /// All tokens from `begin` onward joined with spaces.
    pub fn tokens_from(&self, begin: usize) -> String {
        self.tokens_joined(begin, self.tokens.len())
    }

    // -- Diagnostics --

    pub fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    pub fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Fold another context's diagnostics into this one.
    pub(crate) fn absorb_diagnostics(&mut self, other: &Data) {
        self.errors.extend(other.errors.iter().cloned());
        self.warnings.extend(other.warnings.iter().cloned());
    }

    /// Worst severity recorded so far.
    pub fn severity(&self) -> Severity {
        if self.has_errors() {
            Severity::Error
        } else if self.has_warnings() {
            Severity::Warning
        } else {
            Severity::Normal
        }
    }

    // -- Result --

    pub fn result(&self) -> &str {
        &self.result
    }

    pub fn set_result(&mut self, text: impl Into<String>) {
        self.result = text.into();
    }

    /// Append `text` on a new line (no leading break when the result is empty).
    pub fn append_result_line(&mut self, text: &str) {
        if !self.result.is_empty() {
            self.result.push('\n');
        }
        self.result.push_str(text);
    }

    pub fn append_result(&mut self, text: &str) {
        self.result.push_str(text);
    }

    /// Override the color a front-end should use for the result.
    pub fn set_color(&mut self, color: Color) {
        self.color = Some(color);
    }

    /// The explicit color if one was set, otherwise the severity default.
    pub fn color(&self) -> Color {
        self.color.unwrap_or_else(|| self.severity().default_color())
    }

    // -- Arguments --

    /// Whether an argument conversion failed during this evaluation.
    pub fn invalid_input(&self) -> bool {
        self.invalid_input
    }

    pub fn mark_invalid(&mut self) {
        self.invalid_input = true;
    }

    /// Parse the argument at `index`, recording an error and returning
    /// `default` when it is missing or malformed.
    pub fn arg<T: FromToken>(&mut self, index: usize, default: T) -> T {
        let Some(token) = self.tokens.get(index) else {
            self.add_error(format!("argument {}: missing {}", index + 1, T::KIND));
            self.mark_invalid();
            return default;
        };
        match T::from_token(token) {
            Some(value) => value,
            None => {
                let msg = format!("argument {}: expected {}, got '{token}'", index + 1, T::KIND);
                self.add_error(msg);
                self.mark_invalid();
                default
            },
        }
    }

    /// Like [`Data::arg`], but a missing argument silently yields `default`.
    pub fn arg_or<T: FromToken>(&mut self, index: usize, default: T) -> T {
        if index >= self.tokens.len() {
            return default;
        }
        self.arg(index, default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_out_of_range_is_empty() {
        let data = Data::new("a b");
        assert_eq!(data.token(1), "b");
        assert_eq!(data.token(5), "");
    }

    #[test]
    fn tokens_joined_clamps() {
        let data = Data::new("a b c d");
        assert_eq!(data.tokens_joined(1, 3), "b c");
        assert_eq!(data.tokens_joined(2, 99), "c d");
        assert_eq!(data.tokens_joined(5, 2), "");
        assert_eq!(data.tokens_from(1), "b c d");
    }

    #[test]
    fn set_tokens_retokenizes() {
        let mut data = Data::new("x");
        data.set_tokens("  one   two ");
        assert_eq!(data.tokens(), ["one", "two"]);
    }

    #[test]
    fn append_result_line() {
        let mut data = Data::default();
        data.append_result_line("first");
        data.append_result_line("second");
        data.append_result("!");
        assert_eq!(data.result(), "first\nsecond!");
    }

    #[test]
    fn severity_follows_diagnostics() {
        let mut data = Data::default();
        assert_eq!(data.severity(), Severity::Normal);
        data.add_warning("careful");
        assert_eq!(data.severity(), Severity::Warning);
        assert!(!data.has_errors());
        data.add_error("broken");
        assert_eq!(data.severity(), Severity::Error);
        assert_eq!(data.color(), Color::RED);
    }

    #[test]
    fn explicit_color_wins() {
        let mut data = Data::default();
        data.add_error("broken");
        data.set_color(Color::GREY);
        assert_eq!(data.color(), Color::GREY);
    }

    #[test]
    fn arg_parses() {
        let mut data = Data::new("5 2.5 yes");
        assert_eq!(data.arg::<i32>(0, 0), 5);
        assert_eq!(data.arg::<f64>(1, 0.0), 2.5);
        assert!(data.arg::<bool>(2, false));
        assert!(!data.invalid_input());
        assert!(!data.has_errors());
    }

    #[test]
    fn arg_malformed_falls_back() {
        let mut data = Data::new("seven");
        assert_eq!(data.arg::<i32>(0, -1), -1);
        assert!(data.invalid_input());
        assert_eq!(data.errors(), ["argument 1: expected integer, got 'seven'"]);
    }

    #[test]
    fn arg_missing_is_an_error() {
        let mut data = Data::new("");
        assert_eq!(data.arg::<u32>(0, 3), 3);
        assert_eq!(data.errors(), ["argument 1: missing unsigned integer"]);
    }

    #[test]
    fn arg_or_missing_is_silent() {
        let mut data = Data::new("1");
        assert_eq!(data.arg_or::<u32>(1, 4), 4);
        assert!(!data.invalid_input());
        assert_eq!(data.arg_or::<u32>(0, 4), 1);
    }

    #[test]
    fn absorb_diagnostics_appends() {
        let mut outer = Data::default();
        outer.add_warning("w0");
        let mut inner = Data::default();
        inner.add_error("e1");
        inner.add_warning("w1");
        outer.absorb_diagnostics(&inner);
        assert_eq!(outer.errors(), ["e1"]);
        assert_eq!(outer.warnings(), ["w0", "w1"]);
    }
}
