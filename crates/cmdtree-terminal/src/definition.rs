//! Command tree nodes.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::data::Data;
use crate::handler::Handler;
use crate::name::{CaseSensitivity, NameKey};
use crate::tokenizer::{join_tokens, tokenize};

/// Name of the built-in help command. Autocomplete skips over it.
pub const HELP_COMMAND: &str = "help";

/// A single executable command.
///
/// Implemented for every `Fn(&mut Data) + Send + Sync` closure, so most
/// commands are registered as plain closures.
pub trait Command: Send + Sync {
    /// Run against the resolved arguments in `data`.
    fn execute(&self, data: &mut Data);
}

impl<F> Command for F
where
    F: Fn(&mut Data) + Send + Sync,
{
    fn execute(&self, data: &mut Data) {
        self(data)
    }
}

/// A node in the command tree: a command plus its sub-commands.
///
/// Children are kept in an ordered map under the tree's case policy. Child
/// names are also autocomplete hints for this node.
pub struct Definition {
    description: String,
    command: Option<Box<dyn Command>>,
    possible_inputs: BTreeSet<String>,
    children: BTreeMap<NameKey, Definition>,
    case: CaseSensitivity,
}

/// Result of [`Definition::find_closest`].
#[derive(Debug)]
pub struct ClosestMatch<'a> {
    /// Matched path segments, space-joined as the caller spelled them.
    pub prefix: String,
    /// Number of path segments consumed.
    pub depth: usize,
    /// Deepest node reached (the starting node when nothing matched).
    pub node: &'a Definition,
}

impl Definition {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            command: None,
            possible_inputs: BTreeSet::new(),
            children: BTreeMap::new(),
            case: CaseSensitivity::default(),
        }
    }

    // -- Builder --

    pub fn with_callback<F>(self, callback: F) -> Self
    where
        F: Fn(&mut Data) + Send + Sync + 'static,
    {
        self.with_command(callback)
    }

    pub fn with_command(mut self, command: impl Command + 'static) -> Self {
        self.command = Some(Box::new(command));
        self
    }

    /// Add literal autocomplete hints for this command's arguments.
    pub fn with_inputs<I, S>(mut self, inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.possible_inputs
            .extend(inputs.into_iter().map(Into::into));
        self
    }

    /// Add a child, merging into an existing one of the same name.
    pub fn with_child(mut self, name: impl Into<String>, child: Definition) -> Self {
        self.add_child(name, child, false);
        self
    }

    // -- Accessors --

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn set_command(&mut self, command: impl Command + 'static) {
        self.command = Some(Box::new(command));
    }

    pub fn has_command(&self) -> bool {
        self.command.is_some()
    }

    /// Literal hints plus the names of all children, deduplicated.
    pub fn possible_inputs(&self) -> impl Iterator<Item = &str> {
        let mut all: BTreeSet<&str> = self.literal_inputs().collect();
        all.extend(self.children.keys().map(|key| key.name.as_str()));
        all.into_iter()
    }

    /// Hints added by the command author, without child names.
    pub fn literal_inputs(&self) -> impl Iterator<Item = &str> {
        self.possible_inputs.iter().map(String::as_str)
    }

    pub fn add_possible_input(&mut self, input: impl Into<String>) {
        self.possible_inputs.insert(input.into());
    }

    pub fn case(&self) -> CaseSensitivity {
        self.case
    }

    /// Switch this subtree to `case`, re-keying every child map. Children
    /// whose names collide under the new policy are merged.
    pub fn set_case(&mut self, case: CaseSensitivity) {
        self.case = case;
        let old = std::mem::take(&mut self.children);
        for (key, child) in old {
            self.add_child(key.name, child, false);
        }
    }

    /// Children in tree order.
    pub fn children(&self) -> impl Iterator<Item = (&str, &Definition)> {
        self.children.iter().map(|(k, v)| (k.name.as_str(), v))
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn child(&self, name: &str) -> Option<&Definition> {
        self.children.get(&NameKey::new(name, self.case))
    }

    /// The child `name` together with its name as registered.
    pub fn child_entry(&self, name: &str) -> Option<(&str, &Definition)> {
        self.children
            .get_key_value(&NameKey::new(name, self.case))
            .map(|(key, node)| (key.name.as_str(), node))
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut Definition> {
        self.children.get_mut(&NameKey::new(name, self.case))
    }

    // -- Structure --

    /// Insert `node` under `name`.
    ///
    /// With `replace` an existing child is overwritten wholesale. Without it
    /// the existing child keeps its description, command and hints, and only
    /// the grandchildren it is missing are merged in, recursively.
    pub fn add_child(&mut self, name: impl Into<String>, mut node: Definition, replace: bool) {
        if node.case != self.case {
            node.set_case(self.case);
        }
        let key = NameKey::new(name, self.case);

        if !self.children.contains_key(&key) {
            self.children.insert(key, node);
        } else if replace {
            // Drop the old entry first so the new spelling is kept.
            self.children.remove(&key);
            self.children.insert(key, node);
        } else if let Some(existing) = self.children.get_mut(&key) {
            for (child_key, grandchild) in node.children {
                existing.add_child(child_key.name, grandchild, false);
            }
        }
    }

    /// Remove the direct child `name` and its subtree.
    pub fn remove_child(&mut self, name: &str) -> Option<Definition> {
        self.children.remove(&NameKey::new(name, self.case))
    }

    /// Remove the node at `path` (relative to this node) and its subtree.
    pub fn remove_subtree<S: AsRef<str>>(&mut self, path: &[S]) -> Option<Definition> {
        let (last, parent_path) = path.split_last()?;
        self.find_exact_mut(parent_path)?
            .remove_child(last.as_ref())
    }

    // -- Lookup --

    /// Follow `path` by exact (policy-compared) name matches.
    pub fn find_exact<S: AsRef<str>>(&self, path: &[S]) -> Option<&Definition> {
        let mut node = self;
        for segment in path {
            node = node.child(segment.as_ref())?;
        }
        Some(node)
    }

    pub fn find_exact_mut<S: AsRef<str>>(&mut self, path: &[S]) -> Option<&mut Definition> {
        let mut node = self;
        for segment in path {
            node = node.child_mut(segment.as_ref())?;
        }
        Some(node)
    }

    /// Follow `path` as far as it matches. Never fails.
    pub fn find_closest<S: AsRef<str>>(&self, path: &[S]) -> ClosestMatch<'_> {
        let mut node = self;
        let mut depth = 0;
        for segment in path {
            match node.child(segment.as_ref()) {
                Some(child) => {
                    node = child;
                    depth += 1;
                },
                None => break,
            }
        }
        ClosestMatch {
            prefix: join_tokens(&path[..depth]),
            depth,
            node,
        }
    }

    // -- Help text --

    /// `**name** - description`, the description cut to `max_len` chars.
    pub fn describe(&self, name: &str, max_len: usize) -> String {
        format!("**{name}** - {}", truncate(&self.description, max_len))
    }

    /// One `~ ` line per descendant, indented one tab per level.
    pub fn describe_children(&self, max_len: usize, indent: usize) -> String {
        let mut lines = Vec::new();
        self.collect_child_lines(max_len, indent, &mut lines);
        lines.join("\n")
    }

    fn collect_child_lines(&self, max_len: usize, indent: usize, lines: &mut Vec<String>) {
        for (key, child) in &self.children {
            lines.push(format!(
                "{}~ {}",
                "\t".repeat(indent),
                child.describe(&key.name, max_len)
            ));
            child.collect_child_lines(max_len, indent + 1, lines);
        }
    }

    // -- Autocomplete --

    /// Suggestions for partially typed input, relative to this node.
    ///
    /// Trailing whitespace means "complete the next word": the scope's hints
    /// are returned verbatim. Otherwise child names starting with the last
    /// word are returned, each followed by a space. A leading `help` is
    /// skipped. Results are not sorted.
    pub fn autocomplete(&self, partial: &str) -> Vec<String> {
        let mut tokens = tokenize(partial);
        if tokens.is_empty() || partial.ends_with(|c: char| c.is_ascii_whitespace()) {
            tokens.push(String::new());
        }
        if tokens.len() > 1 && self.case.equals(&tokens[0], HELP_COMMAND) {
            tokens.remove(0);
        }

        let Some((last, scope_path)) = tokens.split_last() else {
            return Vec::new();
        };
        let scope = self.find_closest(scope_path).node;

        if last.is_empty() {
            return scope.possible_inputs().map(str::to_string).collect();
        }
        scope
            .children
            .keys()
            .filter(|key| self.case.starts_with(&key.name, last))
            .map(|key| format!("{} ", key.name))
            .collect()
    }

    // -- Execution --

    /// Expand nested calls in `data`, then run this node's command unless
    /// that produced errors.
    pub fn invoke(&self, handler: &Handler, data: &mut Data) {
        data.expand_nested_calls(handler);
        if data.has_errors() {
            log::trace!("command skipped: {} error(s)", data.errors().len());
            return;
        }
        if let Some(command) = &self.command {
            command.execute(data);
        }
    }
}

impl Default for Definition {
    fn default() -> Self {
        Self::new("")
    }
}

impl fmt::Debug for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Definition")
            .field("description", &self.description)
            .field("has_command", &self.command.is_some())
            .field("possible_inputs", &self.possible_inputs)
            .field(
                "children",
                &self.children.keys().map(|k| &k.name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

fn truncate(text: &str, max_len: usize) -> String {
    match text.char_indices().nth(max_len) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
