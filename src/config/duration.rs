//! Duration parsing utilities.

use anyhow::Context;
use std::time::Duration;

/// Parse a pause or delay string like "300ms", "1s", "2m", "1h" or "300".
/// Supports:
/// - Plain numbers (interpreted as milliseconds): "300"
/// - Milliseconds suffix: "300ms"
/// - Seconds suffix: "1s"
/// - Minutes suffix: "2m"
/// - Hours suffix: "1h"
pub fn parse_duration(s: &str) -> anyhow::Result<Duration> {
    let s = s.trim();
    if s.is_empty() {
        anyhow::bail!("Empty duration string");
    }

    // "ms" must be checked before "m" and "s"
    if let Some(num_str) = s.strip_suffix("ms") {
        let millis: u64 = num_str
            .trim()
            .parse()
            .with_context(|| format!("Invalid milliseconds value: {num_str}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(num_str) = s.strip_suffix('h') {
        let hours: u64 = num_str
            .trim()
            .parse()
            .with_context(|| format!("Invalid hours value: {num_str}"))?;
        return Ok(Duration::from_secs(hours * 3600));
    }
    if let Some(num_str) = s.strip_suffix('m') {
        let minutes: u64 = num_str
            .trim()
            .parse()
            .with_context(|| format!("Invalid minutes value: {num_str}"))?;
        return Ok(Duration::from_secs(minutes * 60));
    }
    if let Some(num_str) = s.strip_suffix('s') {
        let secs: f64 = num_str
            .trim()
            .parse()
            .with_context(|| format!("Invalid seconds value: {num_str}"))?;
        if !secs.is_finite() || secs < 0.0 {
            anyhow::bail!("Invalid seconds value: {num_str}");
        }
        return Ok(Duration::from_secs_f64(secs));
    }

    // No suffix - treat as milliseconds
    let millis: u64 = s
        .parse()
        .with_context(|| format!("Invalid duration value: {s}"))?;
    Ok(Duration::from_millis(millis))
}
