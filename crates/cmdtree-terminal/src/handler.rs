//! The root scope and dispatch.
//!
//! Supports nested `$(...)` calls, longest-prefix command resolution, a
//! built-in `help`, bounded command and output-line histories, and history
//! change notifications. Command names are case-insensitive unless the
//! configuration says otherwise.

use std::sync::{Arc, Mutex};

use cmdtree_types::color::Severity;
use cmdtree_types::config::HandlerConfig;
use cmdtree_types::error::{CmdError, Result};

use crate::data::Data;
use crate::definition::{Definition, HELP_COMMAND};
use crate::history::{BoundedHistory, OutputLine};
use crate::name::CaseSensitivity;
use crate::notify::{HistoryEvent, Notifier, lock};
use crate::tokenizer::join_tokens;

/// Description of the root node.
pub const BASE_SCOPE: &str = "Base Scope";

const HELP_HINT: &str = "Type 'help' to list commands, or 'help <command>' for details.";
const NOT_FOUND_HINT: &str = "Type 'help' to list available commands.";

/// Registry of commands with dispatch.
///
/// Registration needs `&mut self`; invocation, autocomplete and history
/// access work through `&self`, so a handler can be shared once the tree is
/// built.
pub struct Handler {
    root: Definition,
    config: HandlerConfig,
    command_history: Mutex<BoundedHistory<String>>,
    line_history: Mutex<BoundedHistory<OutputLine>>,
    notifier: Notifier,
}

impl Handler {
    /// Create an empty handler with default configuration.
    pub fn new() -> Self {
        Self::with_config(HandlerConfig::default())
    }

    pub fn with_config(config: HandlerConfig) -> Self {
        let config = config.validate();
        let mut root = Definition::new(BASE_SCOPE).with_callback(report_unknown);
        root.set_case(CaseSensitivity::from_flag(config.case_sensitive));
        Self {
            root,
            command_history: Mutex::new(BoundedHistory::new(config.command_history_limit)),
            line_history: Mutex::new(BoundedHistory::new(config.line_history_limit)),
            notifier: Notifier::new(config.deferred_notifications),
            config,
        }
    }

    pub fn config(&self) -> &HandlerConfig {
        &self.config
    }

    pub fn case(&self) -> CaseSensitivity {
        self.root.case()
    }

    // -- Registration --

    /// Register `def` as a top-level command.
    pub fn add(&mut self, name: &str, def: Definition, replace: bool) {
        log::debug!("register: {name} (replace={replace})");
        self.root.add_child(name, def, replace);
    }

    /// Register `def` as `name` under the existing command at `parent`.
    pub fn add_at<S: AsRef<str>>(
        &mut self,
        parent: &[S],
        name: &str,
        def: Definition,
        replace: bool,
    ) -> Result<()> {
        let node = self
            .root
            .find_exact_mut(parent)
            .ok_or_else(|| CmdError::NotFound(join_tokens(parent)))?;
        log::debug!("register: {} {name} (replace={replace})", join_tokens(parent));
        node.add_child(name, def, replace);
        Ok(())
    }

    /// Remove a top-level command and everything under it.
    pub fn remove(&mut self, name: &str) -> Option<Definition> {
        log::debug!("unregister: {name}");
        self.root.remove_child(name)
    }

    /// Remove the command at `path` and everything under it.
    pub fn remove_path<S: AsRef<str>>(&mut self, path: &[S]) -> Option<Definition> {
        log::debug!("unregister: {}", join_tokens(path));
        self.root.remove_subtree(path)
    }

    /// Exact lookup from the root.
    pub fn find_command<S: AsRef<str>>(&self, path: &[S]) -> Option<&Definition> {
        self.root.find_exact(path)
    }

    pub fn root(&self) -> &Definition {
        &self.root
    }

    // -- Invocation --

    /// Run a line of user input and record it in the histories.
    pub fn invoke(&self, input: &str) -> Data {
        log::debug!("invoke: {input}");
        let data = self.evaluate(input);
        if input.split_ascii_whitespace().next().is_some() {
            self.record(input.trim(), &data);
        }
        data
    }

    /// Run a line of input without touching the histories. Nested calls go
    /// through here.
    pub fn evaluate(&self, input: &str) -> Data {
        let mut data = Data::new(input);
        if data.token_count() == 0 {
            data.set_result(HELP_HINT);
            return data;
        }
        if self.case().equals(data.token(0), HELP_COMMAND) {
            self.help(&mut data);
            return data;
        }

        let matched = self.root.find_closest(data.tokens());
        log::trace!(
            "resolved '{}' ({} segment(s)), {} argument(s)",
            matched.prefix,
            matched.depth,
            data.token_count() - matched.depth
        );
        let depth = matched.depth;
        let node = matched.node;
        data.tokens_mut().drain(..depth);
        node.invoke(self, &mut data);
        data
    }

    fn help(&self, data: &mut Data) {
        let width = self.config.description_width;

        if data.token_count() == 1 {
            let lines: Vec<String> = self
                .root
                .children()
                .map(|(name, def)| def.describe(name, width))
                .collect();
            if lines.is_empty() {
                data.set_result("No commands registered.");
            } else {
                data.set_result(lines.join("\n"));
            }
            return;
        }

        match self.resolve_named(&data.tokens()[1..]) {
            None => {
                let typed = data.tokens_from(1);
                data.add_error(format!("command not found: {typed}"));
                data.set_result(NOT_FOUND_HINT);
            },
            Some((name, node)) => {
                data.set_result(node.describe(&name, usize::MAX));
                let children = node.describe_children(width, 1);
                if !children.is_empty() {
                    data.append_result_line(&children);
                }
            },
        }
    }

    /// Exact lookup that also returns the path spelled as registered.
    fn resolve_named(&self, path: &[String]) -> Option<(String, &Definition)> {
        let mut node = &self.root;
        let mut names = Vec::with_capacity(path.len());
        for segment in path {
            let (name, child) = node.child_entry(segment)?;
            names.push(name);
            node = child;
        }
        Some((join_tokens(&names), node))
    }

    /// Suggestions for partially typed input. Unsorted.
    pub fn autocomplete(&self, partial: &str) -> Vec<String> {
        let mut suggestions = self.root.autocomplete(partial);
        let mut words = partial.split_ascii_whitespace();
        let single_word = match (words.next(), words.next()) {
            (Some(word), None) => Some(word),
            _ => None,
        };
        let still_typing = !partial.ends_with(|c: char| c.is_ascii_whitespace());
        if let Some(word) = single_word
            && still_typing
            && self.case().starts_with(HELP_COMMAND, word)
        {
            suggestions.push(format!("{HELP_COMMAND} "));
        }
        suggestions
    }

    // -- History --

    fn record(&self, input: &str, data: &Data) {
        let command_changed = lock(&self.command_history).push_front_unique(input.to_string());
        {
            let mut lines = lock(&self.line_history);
            for error in data.errors() {
                lines.push_front(OutputLine::new(error.as_str(), Severity::Error));
            }
            for warning in data.warnings() {
                lines.push_front(OutputLine::new(warning.as_str(), Severity::Warning));
            }
            lines.push_front(OutputLine::new(
                format!("{}{input}", self.config.echo_prefix),
                Severity::Normal,
            ));
            if !data.result().is_empty() {
                lines.push_front(OutputLine::new(data.result(), Severity::Normal));
            }
        }

        if command_changed {
            self.notifier.emit(HistoryEvent::CommandHistoryChanged);
        }
        self.notifier.emit(HistoryEvent::LineHistoryChanged);
    }

    /// Commands run so far, newest first.
    pub fn command_history(&self) -> Vec<String> {
        lock(&self.command_history).to_vec()
    }

    /// Console output lines, newest first.
    pub fn line_history(&self) -> Vec<OutputLine> {
        lock(&self.line_history).to_vec()
    }

    /// Console output lines as plain text, newest first.
    pub fn line_history_text(&self) -> Vec<String> {
        lock(&self.line_history)
            .iter()
            .map(|line| line.text.clone())
            .collect()
    }

    pub fn command_history_limit(&self) -> usize {
        lock(&self.command_history).limit()
    }

    pub fn line_history_limit(&self) -> usize {
        lock(&self.line_history).limit()
    }

    pub fn set_command_history_limit(&self, limit: usize) {
        let (limit, dropped) = {
            let mut history = lock(&self.command_history);
            let dropped = history.set_limit(limit);
            (history.limit(), dropped)
        };
        self.notifier.emit(HistoryEvent::CommandLimitChanged(limit));
        if dropped {
            self.notifier.emit(HistoryEvent::CommandHistoryChanged);
        }
    }

    pub fn set_line_history_limit(&self, limit: usize) {
        let (limit, dropped) = {
            let mut history = lock(&self.line_history);
            let dropped = history.set_limit(limit);
            (history.limit(), dropped)
        };
        self.notifier.emit(HistoryEvent::LineLimitChanged(limit));
        if dropped {
            self.notifier.emit(HistoryEvent::LineHistoryChanged);
        }
    }

    pub fn clear_command_history(&self) {
        if lock(&self.command_history).clear() {
            self.notifier.emit(HistoryEvent::CommandHistoryChanged);
        }
    }

    pub fn clear_line_history(&self) {
        if lock(&self.line_history).clear() {
            self.notifier.emit(HistoryEvent::LineHistoryChanged);
        }
    }

    // -- Notifications --

    /// Call `listener` on every history change.
    pub fn subscribe<F>(&self, listener: F)
    where
        F: Fn(&HistoryEvent) + Send + Sync + 'static,
    {
        self.notifier.subscribe(Arc::new(listener));
    }

    /// In deferred mode events wait for [`Handler::drain_notifications`].
    pub fn set_deferred_notifications(&self, deferred: bool) {
        self.notifier.set_deferred(deferred);
    }

    pub fn deferred_notifications(&self) -> bool {
        self.notifier.is_deferred()
    }

    /// Deliver queued notifications. Returns how many were delivered.
    pub fn drain_notifications(&self) -> usize {
        self.notifier.drain()
    }

    pub fn pending_notifications(&self) -> usize {
        self.notifier.pending()
    }
}

impl Default for Handler {
    fn default() -> Self {
        Self::new()
    }
}

/// Root callback: runs when no command name matched.
///
/// The result echoes the line as evaluated, so escaped markers show up in
/// their literal form.
fn report_unknown(data: &mut Data) {
    if data.token_count() == 0 {
        return;
    }
    let name = data.token(0).to_string();
    data.add_error(format!("unknown command: {name}"));
    let line = data.tokens_from(0);
    data.set_result(line);
    data.append_result_line(NOT_FOUND_HINT);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn echo() -> Definition {
        Definition::new("Print the arguments").with_callback(|data| {
            let text = data.tokens_from(0);
            data.set_result(text);
        })
    }

    fn fail() -> Definition {
        Definition::new("Always fails").with_callback(|data| data.add_error("fail was called"))
    }

    fn counting(hits: &Arc<AtomicUsize>) -> Definition {
        let hits = Arc::clone(hits);
        Definition::new("Count invocations").with_callback(move |data| {
            hits.fetch_add(1, Ordering::SeqCst);
            data.set_result("counted");
        })
    }

    fn handler() -> Handler {
        let mut h = Handler::new();
        h.add("echo", echo(), false);
        h.add("fail", fail(), false);
        h.add(
            "cp",
            Definition::new("Command parameters").with_child(
                "getRandom",
                Definition::new("Random integer").with_callback(|data| {
                    let args = data.tokens_from(0);
                    data.set_result(format!("args={args}"));
                }),
            ),
            false,
        );
        h
    }

    #[test]
    fn empty_input_gives_hint() {
        let h = handler();
        let data = h.invoke("   ");
        assert_eq!(data.result(), HELP_HINT);
        assert!(h.command_history().is_empty());
        assert!(h.line_history().is_empty());
    }

    #[test]
    fn resolves_path_and_passes_arguments() {
        let h = handler();
        assert_eq!(h.invoke("cp getRandom 5 7").result(), "args=5 7");
        assert_eq!(h.invoke("CP GETRANDOM 1").result(), "args=1");
    }

    #[test]
    fn unknown_command() {
        let h = handler();
        let data = h.invoke("frobnicate now");
        assert_eq!(data.errors(), ["unknown command: frobnicate"]);
        assert_eq!(data.severity(), Severity::Error);
        assert_eq!(data.result(), format!("frobnicate now\n{NOT_FOUND_HINT}"));
    }

    #[test]
    fn bare_escaped_marker_is_echoed_literally() {
        let h = Handler::new();
        let data = h.invoke("$$( not a call )");
        assert!(data.result().contains("$( not a call )"));
        assert_eq!(data.errors(), ["unknown command: $("]);
        assert!(data.warnings().is_empty());
    }

    #[test]
    fn help_lists_top_level() {
        let h = handler();
        let data = h.invoke("help");
        assert_eq!(
            data.result(),
            "**cp** - Command parameters\n**echo** - Print the arguments\n**fail** - Always fails"
        );
    }

    #[test]
    fn help_for_path() {
        let h = handler();
        let data = h.invoke("help cp");
        assert_eq!(
            data.result(),
            "**cp** - Command parameters\n\t~ **getRandom** - Random integer"
        );
        let data = h.invoke("HELP cp getrandom");
        assert_eq!(data.result(), "**cp getRandom** - Random integer");
    }

    #[test]
    fn help_not_found() {
        let h = handler();
        let data = h.invoke("help cp nothing");
        assert_eq!(data.errors(), ["command not found: cp nothing"]);
        assert_eq!(data.result(), NOT_FOUND_HINT);
    }

    #[test]
    fn help_empty_registry() {
        let h = Handler::new();
        assert_eq!(h.invoke("help").result(), "No commands registered.");
    }

    #[test]
    fn nested_call_is_spliced() {
        let h = handler();
        assert_eq!(h.invoke("echo a $(echo b c) d").result(), "a b c d");
        assert_eq!(h.invoke("echo $(echo x) $(echo y)").result(), "x y");
        assert_eq!(h.invoke("echo $(echo $(echo deep))").result(), "deep");
    }

    #[test]
    fn path_resolves_before_expansion() {
        let h = handler();
        let data = h.invoke("$(echo echo) hi");
        assert_eq!(data.errors(), ["unknown command: echo"]);
        assert_eq!(data.tokens(), ["echo", "hi"]);
    }

    #[test]
    fn handler_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Handler>();
    }

    #[test]
    fn nested_errors_block_outer_command() {
        let mut h = handler();
        let hits = Arc::new(AtomicUsize::new(0));
        h.add("count", counting(&hits), false);
        let data = h.invoke("count $(fail)");
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(data.errors(), ["fail was called"]);
        assert_eq!(data.tokens(), ["$(fail)"]);
    }

    #[test]
    fn warnings_do_not_block() {
        let mut h = handler();
        let hits = Arc::new(AtomicUsize::new(0));
        h.add("count", counting(&hits), false);
        let data = h.invoke("count $(echo x");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(data.warnings().len(), 1);
        assert!(data.warnings()[0].contains("starting at token 0"));
    }

    #[test]
    fn nested_calls_skip_history() {
        let h = handler();
        h.invoke("echo $(echo a)");
        assert_eq!(h.command_history(), vec!["echo $(echo a)"]);
    }

    #[test]
    fn command_history_dedups_repeats() {
        let h = handler();
        h.invoke("echo a");
        h.invoke("echo a");
        assert_eq!(h.command_history().len(), 1);
        h.invoke("echo b");
        h.invoke("echo a");
        assert_eq!(h.command_history(), vec!["echo a", "echo b", "echo a"]);
    }

    #[test]
    fn line_history_order() {
        let h = handler();
        h.invoke("echo $(echo x");
        let lines = h.line_history();
        // Newest first: result, echo, warnings, errors.
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], OutputLine::new("x", Severity::Normal));
        assert_eq!(lines[1].text, "> echo $(echo x");
        assert_eq!(lines[2].severity, Severity::Warning);

        h.invoke("fail");
        let lines = h.line_history();
        assert_eq!(lines[0].text, "> fail");
        assert_eq!(lines[1], OutputLine::new("fail was called", Severity::Error));
    }

    #[test]
    fn result_is_newest_line() {
        let h = handler();
        h.invoke("echo hello");
        assert_eq!(h.line_history_text(), vec!["hello", "> echo hello"]);
    }

    #[test]
    fn history_limits() {
        let h = Handler::with_config(HandlerConfig {
            command_history_limit: 2,
            line_history_limit: 3,
            ..HandlerConfig::default()
        });
        for word in ["a", "b", "c"] {
            h.invoke(word);
        }
        assert_eq!(h.command_history(), vec!["c", "b"]);
        assert_eq!(h.line_history().len(), 3);

        h.set_command_history_limit(1);
        assert_eq!(h.command_history(), vec!["c"]);
        assert_eq!(h.command_history_limit(), 1);
        h.set_line_history_limit(10);
        assert_eq!(h.line_history_limit(), 10);
    }

    #[test]
    fn limit_changes_notify() {
        let h = handler();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        h.subscribe(move |e| lock(&sink).push(*e));
        h.set_line_history_limit(7);
        assert_eq!(*lock(&seen), vec![HistoryEvent::LineLimitChanged(7)]);
    }

    #[test]
    fn deferred_notifications_queue() {
        let h = handler();
        let seen = Arc::new(AtomicUsize::new(0));
        let sink = Arc::clone(&seen);
        h.subscribe(move |_| {
            sink.fetch_add(1, Ordering::SeqCst);
        });
        h.set_deferred_notifications(true);
        h.invoke("echo a");
        assert_eq!(seen.load(Ordering::SeqCst), 0);
        assert_eq!(h.pending_notifications(), 2);
        assert_eq!(h.drain_notifications(), 2);
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn repeat_only_notifies_line_history() {
        let h = handler();
        h.invoke("echo a");
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        h.subscribe(move |e| lock(&sink).push(*e));
        h.invoke("echo a");
        assert_eq!(*lock(&seen), vec![HistoryEvent::LineHistoryChanged]);
    }

    #[test]
    fn clear_histories() {
        let h = handler();
        h.invoke("echo a");
        h.clear_command_history();
        h.clear_line_history();
        assert!(h.command_history().is_empty());
        assert!(h.line_history().is_empty());
    }

    #[test]
    fn add_at_and_remove_path() {
        let mut h = handler();
        h.add_at(&["cp"], "pick", Definition::new("Pick one"), false)
            .unwrap();
        assert!(h.find_command(&["cp", "pick"]).is_some());
        let err = h
            .add_at(&["nope"], "x", Definition::new(""), false)
            .unwrap_err();
        assert!(matches!(err, CmdError::NotFound(ref p) if p == "nope"));

        assert!(h.remove_path(&["cp", "pick"]).is_some());
        assert!(h.find_command(&["cp", "pick"]).is_none());
        assert!(h.remove("echo").is_some());
        assert!(h.remove("echo").is_none());
    }

    #[test]
    fn autocomplete_offers_help() {
        let h = handler();
        assert_eq!(h.autocomplete("he"), vec!["help "]);
        assert!(h.autocomplete("help ").contains(&"echo".to_string()));
        let mut top = h.autocomplete("");
        top.sort();
        assert_eq!(top, vec!["cp", "echo", "fail"]);
    }

    #[test]
    fn case_sensitive_config() {
        let mut h = Handler::with_config(HandlerConfig {
            case_sensitive: true,
            ..HandlerConfig::default()
        });
        h.add("Echo", echo(), false);
        assert_eq!(h.invoke("Echo x").result(), "x");
        assert!(h.invoke("echo x").has_errors());
        assert!(h.invoke("HELP").has_errors());
    }
}
