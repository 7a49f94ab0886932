//! Built-in commands.
//!
//! Small arithmetic and text helpers that make the console usable out of the
//! box and exercise argument parsing and nested calls.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::data::Data;
use crate::definition::Definition;
use crate::handler::Handler;

/// Register all built-in commands into a handler. Existing commands with the
/// same names are merged, not replaced.
pub fn register_builtins(handler: &mut Handler) {
    handler.add("echo", echo(), false);
    handler.add("round", round(), false);
    handler.add("math", math(), false);
    handler.add("cp", cp(), false);
    handler.add("bool", boolean(), false);
    handler.add("text", text(), false);
}

// ---------------------------------------------------------------------------
// echo
// ---------------------------------------------------------------------------

fn echo() -> Definition {
    Definition::new("Print the arguments").with_callback(|data| {
        let text = data.tokens_from(0);
        data.set_result(text);
    })
}

// ---------------------------------------------------------------------------
// round
// ---------------------------------------------------------------------------

/// Beyond this f64 stops carrying meaningful decimal digits.
const MAX_ROUND_DIGITS: u32 = 15;

fn round() -> Definition {
    Definition::new("Round a number: round <value> [digits]").with_callback(|data| {
        let value: f64 = data.arg(0, 0.0);
        let digits: u32 = data.arg_or(1, 0);
        if data.invalid_input() {
            return;
        }
        if digits > MAX_ROUND_DIGITS {
            data.add_error(format!("digits must be at most {MAX_ROUND_DIGITS}"));
            return;
        }
        let scale = 10f64.powi(digits as i32);
        let rounded = (value * scale).round() / scale;
        data.set_result(format!("{:.*}", digits as usize, rounded));
    })
}

// ---------------------------------------------------------------------------
// math
// ---------------------------------------------------------------------------

fn math() -> Definition {
    Definition::new("Arithmetic on two numbers")
        .with_child("add", binary_op("Add: math add <a> <b>", |a, b| Ok(a + b)))
        .with_child("sub", binary_op("Subtract: math sub <a> <b>", |a, b| Ok(a - b)))
        .with_child("mul", binary_op("Multiply: math mul <a> <b>", |a, b| Ok(a * b)))
        .with_child(
            "div",
            binary_op("Divide: math div <a> <b>", |a, b| {
                if b == 0.0 {
                    Err("division by zero")
                } else {
                    Ok(a / b)
                }
            }),
        )
}

fn binary_op<F>(description: &str, op: F) -> Definition
where
    F: Fn(f64, f64) -> Result<f64, &'static str> + Send + Sync + 'static,
{
    Definition::new(description).with_callback(move |data| {
        let a: f64 = data.arg(0, 0.0);
        let b: f64 = data.arg(1, 0.0);
        if data.invalid_input() {
            return;
        }
        match op(a, b) {
            Ok(value) => data.set_result(value.to_string()),
            Err(msg) => data.add_error(msg),
        }
    })
}

// ---------------------------------------------------------------------------
// cp (command parameters)
// ---------------------------------------------------------------------------

fn cp() -> Definition {
    Definition::new("Helpers that produce parameters for other commands")
        .with_child(
            "getRandom",
            Definition::new("Random integer in [min, max]: cp getRandom <min> <max>")
                .with_inputs(["0 100", "1 6"])
                .with_callback(get_random),
        )
        .with_child(
            "pick",
            Definition::new("Pick one of the arguments at random: cp pick <a> [b ...]")
                .with_callback(pick),
        )
}

fn get_random(data: &mut Data) {
    let min: i64 = data.arg(0, 0);
    let max: i64 = data.arg(1, 0);
    if data.invalid_input() {
        return;
    }
    if min > max {
        data.add_error(format!("min ({min}) is greater than max ({max})"));
        return;
    }
    let span = (max as i128 - min as i128 + 1) as u128;
    let offset = (next_random() as u128 % span) as i128;
    data.set_result((min as i128 + offset).to_string());
}

fn pick(data: &mut Data) {
    if data.token_count() == 0 {
        data.add_error("pick needs at least one argument");
        return;
    }
    let idx = (next_random() % data.token_count() as u64) as usize;
    let choice = data.token(idx).to_string();
    data.set_result(choice);
}

/// Time-seeded LCG. Good enough for console dice rolls.
fn next_random() -> u64 {
    static STATE: AtomicU64 = AtomicU64::new(0);
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    let seed = STATE.load(Ordering::Relaxed) ^ nanos;
    let next = seed
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407);
    STATE.store(next, Ordering::Relaxed);
    next >> 33
}

// ---------------------------------------------------------------------------
// bool
// ---------------------------------------------------------------------------

fn boolean() -> Definition {
    Definition::new("Boolean logic")
        .with_child(
            "not",
            Definition::new("Negate: bool not <value>")
                .with_inputs(["true", "false"])
                .with_callback(|data| {
                    let value: bool = data.arg(0, false);
                    if !data.invalid_input() {
                        data.set_result((!value).to_string());
                    }
                }),
        )
        .with_child("and", bool_op("Both true: bool and <a> <b>", |a, b| a && b))
        .with_child("or", bool_op("Either true: bool or <a> <b>", |a, b| a || b))
}

fn bool_op(description: &str, op: fn(bool, bool) -> bool) -> Definition {
    Definition::new(description)
        .with_inputs(["true", "false"])
        .with_callback(move |data| {
            let a: bool = data.arg(0, false);
            let b: bool = data.arg(1, false);
            if !data.invalid_input() {
                data.set_result(op(a, b).to_string());
            }
        })
}

// ---------------------------------------------------------------------------
// text
// ---------------------------------------------------------------------------

fn text() -> Definition {
    Definition::new("Text helpers")
        .with_child(
            "upper",
            Definition::new("Uppercase the arguments").with_callback(|data| {
                let text = data.tokens_from(0).to_uppercase();
                data.set_result(text);
            }),
        )
        .with_child(
            "lower",
            Definition::new("Lowercase the arguments").with_callback(|data| {
                let text = data.tokens_from(0).to_lowercase();
                data.set_result(text);
            }),
        )
        .with_child(
            "len",
            Definition::new("Character count of the arguments").with_callback(|data| {
                let count = data.tokens_from(0).chars().count();
                data.set_result(count.to_string());
            }),
        )
}
