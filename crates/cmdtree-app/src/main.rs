//! cmdtree console entry point.
//!
//! Reads command lines from stdin and prints each result. Lines starting
//! with `:` are console meta commands (`:complete <partial>`, `:history`,
//! `:lines`, `:quit`). An optional first argument names a TOML config file;
//! `CMDTREE_CONFIG` is consulted otherwise.

mod console;

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};

use cmdtree_terminal::{Handler, HandlerConfig, register_builtins};

use console::{Console, Flow};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args()
        .nth(1)
        .or_else(|| std::env::var("CMDTREE_CONFIG").ok())
    {
        Some(path) => HandlerConfig::load(&path).with_context(|| format!("loading {path}"))?,
        None => HandlerConfig::default(),
    };

    let mut handler = Handler::with_config(config);
    register_builtins(&mut handler);
    handler.subscribe(|event| log::debug!("history event: {event:?}"));
    log::info!(
        "cmdtree console ready ({} top-level commands)",
        handler.root().child_count()
    );

    let console = Console::new(&handler);
    let stdin = io::stdin();
    let mut out = io::stdout().lock();

    write!(out, "{}", console::PROMPT)?;
    out.flush()?;
    for line in stdin.lock().lines() {
        let line = line?;
        let flow = console.submit(&line, &mut out)?;
        handler.drain_notifications();
        if flow == Flow::Quit {
            break;
        }
        write!(out, "{}", console::PROMPT)?;
        out.flush()?;
    }

    log::info!("cmdtree console shut down cleanly");
    Ok(())
}
