// src/handlers/logs.rs

use std::{fs, sync::LazyLock};

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{config::Config, error::AppError};

/// Prefix of the daily rolling files written by the file layer in `main`.
pub const LOG_FILE_PREFIX: &str = "app.log";

/// `<timestamp> <LEVEL> <rest>` as written by the non-ANSI fmt layer.
static LOG_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\S+)\s+(TRACE|DEBUG|INFO|WARN|ERROR)\s+(.*)$").expect("valid log line regex")
});

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct LogParams {
    pub limit: Option<usize>,
}

/// Parses log text into entries, in file order. Lines that do not start a new
/// entry (multi-line messages) are appended to the previous one.
pub fn parse_log(content: &str) -> Vec<LogEntry> {
    let mut entries: Vec<LogEntry> = Vec::new();

    for line in content.lines().filter(|l| !l.trim().is_empty()) {
        if let Some(caps) = LOG_LINE.captures(line) {
            entries.push(LogEntry {
                timestamp: caps[1].to_string(),
                level: caps[2].to_string(),
                message: caps[3].to_string(),
            });
        } else if let Some(last) = entries.last_mut() {
            last.message.push('\n');
            last.message.push_str(line);
        }
    }

    entries
}

/// Shows the application log, newest entries first.
/// Admin only.
pub async fn view_logs(
    State(config): State<Config>,
    Query(params): Query<LogParams>,
) -> Result<impl IntoResponse, AppError> {
    let limit = params.limit.unwrap_or(200).min(2000);

    let mut files: Vec<_> = match fs::read_dir(&config.log_dir) {
        Ok(dir) => dir
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(LOG_FILE_PREFIX))
            })
            .collect(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
        Err(e) => return Err(AppError::InternalServerError(e.to_string())),
    };
    // Daily suffixes (YYYY-MM-DD) sort chronologically.
    files.sort();

    let mut entries = Vec::new();
    for path in files {
        let content = fs::read_to_string(&path)
            .map_err(|e| AppError::InternalServerError(format!("{}: {}", path.display(), e)))?;
        entries.extend(parse_log(&content));
    }

    entries.reverse();
    entries.truncate(limit);
    Ok(Json(entries))
}
