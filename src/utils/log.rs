// src/utils/log.rs

//! Console run report with timestamped, leveled lines.
//!
//! Diagnostics go through the `log` facade and `env_logger`; this module
//! prints the operator-facing report (progress, per-product changes and the
//! final summary). Levels reuse [`::log::Level`], and the threshold comes
//! from `[logging].level`.

use std::sync::OnceLock;

use ::log::{Level, LevelFilter};
use chrono::Local;

/// Console threshold, set once at startup.
static THRESHOLD: OnceLock<LevelFilter> = OnceLock::new();

/// Set the console threshold from a level name. Later calls are ignored.
///
/// Unknown names fall back to `info`.
pub fn init(level: &str) {
    let _ = THRESHOLD.set(parse_threshold(level));
}

fn parse_threshold(level: &str) -> LevelFilter {
    match level.trim().to_lowercase().as_str() {
        "warning" => LevelFilter::Warn,
        other => other.parse().unwrap_or(LevelFilter::Info),
    }
}

fn enabled(level: Level) -> bool {
    level <= THRESHOLD.get().copied().unwrap_or(LevelFilter::Info)
}

fn line(level: Level, message: &str) -> String {
    format!(
        "[{}] [{}] {}",
        Local::now().format("%Y-%m-%d %H:%M:%S"),
        level,
        message
    )
}

/// Print one report line. Warnings and errors go to stderr.
fn emit(level: Level, message: &str) {
    if !enabled(level) {
        return;
    }
    match level {
        Level::Error | Level::Warn => eprintln!("{}", line(level, message)),
        _ => println!("{}", line(level, message)),
    }
}

pub fn info(message: &str) {
    emit(Level::Info, message);
}

pub fn warn(message: &str) {
    emit(Level::Warn, message);
}

pub fn error(message: &str) {
    emit(Level::Error, message);
}

/// A completed action, marked with a check.
pub fn success(message: &str) {
    emit(Level::Info, &format!("✓ {message}"));
}

/// Numbered stage of a multi-step run.
pub fn step(current: usize, total: usize, message: &str) {
    emit(Level::Info, &format!("[STEP {current}/{total}] {message}"));
}

/// Banner opening a run.
pub fn header(title: &str) {
    let border = "═".repeat(60);
    emit(Level::Info, &border);
    emit(Level::Info, &format!("  {title}"));
    emit(Level::Info, &border);
}

pub fn sub_item(message: &str) {
    emit(Level::Info, &format!("    {message}"));
}

/// Titled block of `key: value` lines.
pub fn summary(title: &str, items: &[(&str, String)]) {
    if !enabled(Level::Info) {
        return;
    }
    println!();
    emit(Level::Info, &format!("[SUMMARY] {title}"));
    for (key, value) in items {
        emit(Level::Info, &format!("    {key}: {value}"));
    }
}
