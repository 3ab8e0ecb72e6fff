//! Text helpers for editing and displaying mirrored state

/// Join a string list into comma-delimited text for editing
#[must_use]
pub fn format_list(items: &[String]) -> String {
    items.join(", ")
}

/// Split comma-delimited text back into a list
///
/// Entries are trimmed; empty and whitespace-only entries are dropped.
#[must_use]
pub fn parse_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

/// Render a duration in seconds as `HH:MM:SS`
///
/// Hours are not wrapped, so long sessions render as e.g. `123:04:05`.
#[must_use]
pub fn format_elapsed(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}
