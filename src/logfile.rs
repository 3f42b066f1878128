//! Deducer log classification.
//!
//! The deducer's consistency checks write a plain-text log:
//!
//! ```text
//! # RCheckForbidden
//! 12 -> 40 $K_4$-free -> $planar$
//! **Free text banner
//! # end RCheckForbidden
//! ```
//!
//! Lines starting with `#` are section headers, lines starting with `**` are
//! banners, and lines with an `ID -> ID` pair are relation summaries that the
//! viewer can explain.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::class::{ClassId, RelationKey};
use crate::error::LogError;

static RELATION_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+) -> (\d+)(.*)").expect("valid relation regex"));

/// One classified log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogLine {
    /// `#`-prefixed section header, prefix kept.
    Header(String),
    /// `**`-prefixed banner, prefix stripped.
    Banner(String),
    /// A relation summary with the remaining text after the pair.
    Relation { key: RelationKey, rest: String },
    /// Anything else.
    Text(String),
}

impl LogLine {
    /// Classify a single line. Returns `None` for blank lines.
    pub fn classify(line: &str) -> Option<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return None;
        }
        if line.starts_with('#') {
            return Some(LogLine::Header(line.to_string()));
        }
        if let Some(banner) = line.strip_prefix("**") {
            return Some(LogLine::Banner(banner.to_string()));
        }
        if let Some(caps) = RELATION_LINE.captures(line) {
            let sub = caps[1].parse::<ClassId>();
            let sup = caps[2].parse::<ClassId>();
            // Numbers too large for an id fall through to plain text.
            if let (Ok(sub), Ok(sup)) = (sub, sup) {
                return Some(LogLine::Relation {
                    key: RelationKey { sub, sup },
                    rest: caps[3].trim().to_string(),
                });
            }
        }
        Some(LogLine::Text(line.to_string()))
    }

    /// Short kind name, used by the CLI listing.
    pub fn kind(&self) -> &'static str {
        match self {
            LogLine::Header(_) => "header",
            LogLine::Banner(_) => "banner",
            LogLine::Relation { .. } => "relation",
            LogLine::Text(_) => "text",
        }
    }
}

/// Classify every non-blank line of a log.
pub fn parse_log(content: &str) -> Vec<LogLine> {
    content.lines().filter_map(LogLine::classify).collect()
}

/// Read and classify a log file.
pub fn read_log(path: &Path) -> Result<Vec<LogLine>, LogError> {
    let content = std::fs::read_to_string(path).map_err(|source| LogError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let lines = parse_log(&content);
    tracing::debug!(path = %path.display(), lines = lines.len(), "read deducer log");
    Ok(lines)
}
