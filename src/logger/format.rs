//! Console formatting with ANSI colors and text wrapping
//!
//! Handles:
//! - Colorized `[TAG] [LEVEL]` prefixes
//! - Text wrapping at word boundaries
//! - Broken pipe handling for piped commands

use super::levels::LogLevel;
use super::sink::LogEvent;
use super::tags::LogTag;
use chrono::Local;
use colored::*;
use std::io::{stdout, ErrorKind, Write};

/// Log format widths for alignment
const TAG_WIDTH: usize = 10;
const LOG_TYPE_WIDTH: usize = 8;
const BRACKET_SPACE_WIDTH: usize = 3;
const TOTAL_PREFIX_WIDTH: usize = TAG_WIDTH + LOG_TYPE_WIDTH + BRACKET_SPACE_WIDTH * 2;

/// Maximum line length before wrapping
const MAX_LINE_LENGTH: usize = 145;

/// Format an event and print it to stdout
pub fn print_event(event: &LogEvent) {
    for line in format_lines(event) {
        print_stdout_safe(&line);
    }
}

/// Build the colored console lines for one event (first line plus wrapped continuations)
pub fn format_lines(event: &LogEvent) -> Vec<String> {
    let time = event
        .timestamp
        .with_timezone(&Local)
        .format("%H:%M:%S")
        .to_string();
    let prefix = format!("{} ", time).dimmed().to_string();

    let base_line = format!(
        "{}[{}] [{}] ",
        prefix,
        format_tag(&event.tag),
        format_level(event.level)
    );

    let base_length = strip_ansi_codes(&base_line)
        .len()
        .max(TOTAL_PREFIX_WIDTH + strip_ansi_codes(&prefix).len());
    let available_space = if MAX_LINE_LENGTH > base_length {
        MAX_LINE_LENGTH - base_length
    } else {
        50
    };

    let chunks = wrap_text(&event.message, available_space);
    let mut lines = Vec::with_capacity(chunks.len());
    lines.push(format!("{}{}", base_line, chunks[0]));

    let continuation_prefix = " ".repeat(base_length);
    for chunk in &chunks[1..] {
        lines.push(format!("{}{}", continuation_prefix, chunk));
    }
    lines
}

/// Plain single-line rendering used by file-style destinations
pub fn format_plain(event: &LogEvent) -> String {
    format!(
        "{} [{}] [{}] {}",
        event.timestamp.format("%Y-%m-%d %H:%M:%S"),
        event.tag.to_plain_string(),
        event.level.as_str(),
        event.message
    )
}

fn format_tag(tag: &LogTag) -> ColoredString {
    let label = format!("{:<width$}", tag.to_plain_string(), width = TAG_WIDTH);
    match tag {
        LogTag::System => label.bright_yellow().bold(),
        LogTag::Api => label.bright_purple().bold(),
        LogTag::Receipts => label.bright_blue().bold(),
        LogTag::Holders => label.bright_cyan().bold(),
        LogTag::Transfers => label.bright_magenta().bold(),
        LogTag::Activity => label.bright_green().bold(),
        LogTag::Reconcile => label.bright_white().bold(),
        LogTag::Report => label.bright_green().bold(),
        LogTag::Config => label.bright_yellow().bold(),
    }
}

fn format_level(level: LogLevel) -> ColoredString {
    let label = format!("{:<width$}", level.as_str(), width = LOG_TYPE_WIDTH);
    match level {
        LogLevel::Error => label.bright_red().bold(),
        LogLevel::Warning => label.bright_yellow().bold(),
        LogLevel::Debug | LogLevel::Verbose => label.dimmed(),
        LogLevel::Info => label.white().bold(),
    }
}

/// Print to stdout but ignore broken pipe errors
fn print_stdout_safe(message: &str) {
    if let Err(e) = writeln!(stdout(), "{}", message) {
        if e.kind() == ErrorKind::BrokenPipe {
            std::process::exit(0);
        }
        let _ = writeln!(std::io::stderr(), "Logger stdout error: {}", e);
    }
    if let Err(e) = stdout().flush() {
        if e.kind() == ErrorKind::BrokenPipe {
            std::process::exit(0);
        }
    }
}

/// Remove ANSI color codes from text
fn strip_ansi_codes(text: &str) -> String {
    let mut result = String::new();
    let mut in_escape = false;

    for ch in text.chars() {
        if ch == '\x1b' {
            in_escape = true;
        } else if in_escape && ch == 'm' {
            in_escape = false;
        } else if !in_escape {
            result.push(ch);
        }
    }
    result
}

/// Wrap text at word boundaries, respecting existing newlines.
/// Words longer than the width are emitted on their own line unbroken.
fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    let mut result = Vec::new();

    for line in text.split('\n') {
        if line.chars().count() <= max_width {
            result.push(line.to_string());
            continue;
        }

        let mut current_line = String::new();
        for word in line.split_whitespace() {
            let current_len = current_line.chars().count();
            let word_len = word.chars().count();

            if current_line.is_empty() {
                current_line = word.to_string();
            } else if current_len + word_len + 1 <= max_width {
                current_line.push(' ');
                current_line.push_str(word);
            } else {
                result.push(std::mem::take(&mut current_line));
                current_line = word.to_string();
            }
        }

        if !current_line.is_empty() {
            result.push(current_line);
        }
    }

    if result.is_empty() {
        result.push(String::new());
    }

    result
}
