//! Leveled progress logging for the pipeline.
//!
//! Thin wrappers around stdout printing so pipeline code reads as
//! `log_info(...)` / `log_success(...)` rather than raw `println!` calls.

/// Log level for console display
#[derive(Debug, Clone, Copy)]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

fn emit(level: LogLevel, message: &str) {
    let prefix = match level {
        LogLevel::Info => "   ",
        LogLevel::Success => "   ✓",
        LogLevel::Warning => "   ⚠️",
        LogLevel::Error => "   ❌",
    };
    println!("{} {}", prefix, message);
}

pub fn log_info(msg: impl Into<String>) {
    emit(LogLevel::Info, &msg.into());
}

pub fn log_success(msg: impl Into<String>) {
    emit(LogLevel::Success, &msg.into());
}

pub fn log_warning(msg: impl Into<String>) {
    emit(LogLevel::Warning, &msg.into());
}

pub fn log_error(msg: impl Into<String>) {
    emit(LogLevel::Error, &msg.into());
}
