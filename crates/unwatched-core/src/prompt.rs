//! Interactive input parsing. Malformed answers fall back to defaults with a
//! warning instead of failing the run.

use std::io;
use tracing::warn;

use crate::retention::Operator;

pub const DEFAULT_DAYS: u32 = 30;

/// Source of operator answers. The CLI reads stdin; tests script the answers.
pub trait Prompter {
    fn ask(&mut self, question: &str) -> io::Result<String>;
}

pub fn parse_days(input: &str) -> u32 {
    let input = input.trim();
    if input.is_empty() {
        return DEFAULT_DAYS;
    }
    match input.parse::<u32>() {
        Ok(days) if days > 0 => days,
        _ => {
            warn!(
                "Invalid input. Using default value of {} days.",
                DEFAULT_DAYS
            );
            DEFAULT_DAYS
        }
    }
}

pub fn parse_operator(input: &str) -> Operator {
    Operator::from_symbol(input).unwrap_or_else(|| {
        warn!("Invalid operator choice. Defaulting to <=.");
        Operator::AtMost
    })
}

/// Zero-based indices from a comma separated list of 1-based choices.
/// Non-numeric and out of range entries are dropped.
pub fn parse_library_selection(input: &str, count: usize) -> Vec<usize> {
    input
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty() && token.chars().all(|c| c.is_ascii_digit()))
        .filter_map(|token| token.parse::<usize>().ok())
        .filter(|choice| (1..=count).contains(choice))
        .map(|choice| choice - 1)
        .collect()
}

pub fn is_affirmative(answer: &str) -> bool {
    answer.trim().to_lowercase().starts_with('y')
}

pub fn prompt_confirm(
    prompter: &mut dyn Prompter,
    prompt: &str,
    default: Option<bool>,
) -> io::Result<bool> {
    let question = match default {
        Some(true) => format!("{} (Y/n): ", prompt),
        Some(false) | None => format!("{} (y/N): ", prompt),
    };

    loop {
        let input = prompter.ask(&question)?;
        match input.trim().to_uppercase().as_str() {
            "Y" | "YES" => return Ok(true),
            "N" | "NO" => return Ok(false),
            "" => match default {
                Some(default) => return Ok(default),
                None => continue,
            },
            _ => continue,
        }
    }
}
