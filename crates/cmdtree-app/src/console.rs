//! Text rendering of handler results and console meta commands.

use std::io::{self, Write};

use cmdtree_terminal::{Data, Handler, Severity};

pub const PROMPT: &str = "> ";

/// Whether the read loop should keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Parsed `:`-prefixed console command.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Meta<'a> {
    Complete(&'a str),
    History,
    Lines,
    Quit,
    Unknown(&'a str),
}

fn parse_meta(line: &str) -> Option<Meta<'_>> {
    let rest = line.trim_start().strip_prefix(':')?;
    let (word, arg) = match rest.split_once(char::is_whitespace) {
        Some((word, arg)) => (word, arg),
        None => (rest, ""),
    };
    Some(match word {
        "complete" | "c" => Meta::Complete(arg),
        "history" => Meta::History,
        "lines" => Meta::Lines,
        "quit" | "q" => Meta::Quit,
        other => Meta::Unknown(other),
    })
}

pub struct Console<'h> {
    handler: &'h Handler,
}

impl<'h> Console<'h> {
    pub fn new(handler: &'h Handler) -> Self {
        Self { handler }
    }

    /// Handle one input line, writing everything it produces to `out`.
    pub fn submit(&self, line: &str, out: &mut impl Write) -> io::Result<Flow> {
        match parse_meta(line) {
            Some(meta) => self.run_meta(meta, out),
            None => {
                let data = self.handler.invoke(line);
                render(&data, out)?;
                Ok(Flow::Continue)
            },
        }
    }

    fn run_meta(&self, meta: Meta<'_>, out: &mut impl Write) -> io::Result<Flow> {
        match meta {
            Meta::Complete(partial) => {
                let mut suggestions = self.handler.autocomplete(partial);
                suggestions.sort();
                if suggestions.is_empty() {
                    writeln!(out, "(no suggestions)")?;
                }
                for s in &suggestions {
                    writeln!(out, "{}", s.trim_end())?;
                }
            },
            Meta::History => {
                let history = self.handler.command_history();
                if history.is_empty() {
                    writeln!(out, "(no history)")?;
                }
                // Oldest first, numbered like a shell.
                for (i, entry) in history.iter().rev().enumerate() {
                    writeln!(out, "  {:4}  {entry}", i + 1)?;
                }
            },
            Meta::Lines => {
                for line in self.handler.line_history().iter().rev() {
                    writeln!(out, "{line}")?;
                }
            },
            Meta::Quit => return Ok(Flow::Quit),
            Meta::Unknown(word) => {
                writeln!(out, "error: unknown console command ':{word}'")?;
            },
        }
        Ok(Flow::Continue)
    }
}

/// Write a result: errors, then warnings, then the result text.
pub fn render(data: &Data, out: &mut impl Write) -> io::Result<()> {
    for error in data.errors() {
        writeln!(out, "{}: {error}", Severity::Error.label())?;
    }
    for warning in data.warnings() {
        writeln!(out, "{}: {warning}", Severity::Warning.label())?;
    }
    if !data.result().is_empty() {
        writeln!(out, "{}", data.result())?;
    }
    Ok(())
}
