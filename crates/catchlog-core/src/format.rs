//! Human-readable durations for session timers and summaries.

/// Format seconds as `HH:MM:SS`. Hours are not wrapped at 24.
pub fn format_elapsed(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Format minutes as `"45min"`, `"2h"` or `"1h 15min"`. Negative input has no
/// meaningful rendering.
pub fn format_duration_minutes(total_minutes: i64) -> Option<String> {
    if total_minutes < 0 {
        return None;
    }
    if total_minutes < 60 {
        return Some(format!("{total_minutes}min"));
    }

    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;
    Some(if minutes > 0 {
        format!("{hours}h {minutes}min")
    } else {
        format!("{hours}h")
    })
}
