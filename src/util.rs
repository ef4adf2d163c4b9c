//! Small shared helpers: timestamp parsing, atomic file writes, and the
//! en-IN currency formatting used in auto-generated remarks and prompts.

use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};

/// Parse an entity timestamp. Accepts RFC 3339 and the space-separated
/// fallback some external writers produce.
pub fn parse_ts(ts: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(ts)
        .or_else(|_| {
            chrono::NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S")
                .map(|naive| naive.and_utc().fixed_offset())
        })
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Write a file atomically: temp file in the same directory, then rename.
/// A reader never observes a half-written blob.
pub fn atomic_write_str(path: &Path, content: &str) -> std::io::Result<()> {
    let tmp = path.with_extension("tmp");
    {
        let mut file = std::fs::File::create(&tmp)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
    }
    std::fs::rename(&tmp, path)
}

/// Format an amount with Indian digit grouping (en-IN): the last three
/// digits form one group, every two digits above that another, e.g.
/// `1234567` → `12,34,567`. Fractions are shown to two places when present.
pub fn format_inr(amount: f64) -> String {
    let negative = amount < 0.0;
    let abs = amount.abs();
    let whole = abs.trunc() as u64;
    let fract = abs.fract();

    let digits = whole.to_string();
    let mut grouped = String::new();
    let len = digits.len();
    for (i, ch) in digits.chars().enumerate() {
        let remaining = len - i;
        if i > 0 && (remaining == 3 || (remaining > 3 && (remaining - 3) % 2 == 0)) {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if fract > 1e-9 {
        out.push_str(&format!("{:.2}", fract)[1..]);
    }
    out
}
