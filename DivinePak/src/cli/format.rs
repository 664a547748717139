//! Human-readable output helpers shared by the commands

const UNITS: [&str; 8] = ["", "Ki", "Mi", "Gi", "Ti", "Pi", "Ei", "Zi"];

/// Format a byte count with binary units, e.g. `512.0B` or `1.5KiB`
#[allow(clippy::cast_precision_loss)]
pub(crate) fn format_size(bytes: u64) -> String {
    let mut value = bytes as f64;
    for unit in UNITS {
        if value < 1024.0 {
            return format!("{value:.1}{unit}B");
        }
        value /= 1024.0;
    }
    format!("{value:.1}YiB")
}

/// Simple glob pattern matching (supports * and ?), ASCII case-insensitive
pub(crate) fn matches_glob(pattern: &str, text: &str) -> bool {
    let pattern_chars: Vec<char> = pattern.chars().collect();
    let text_chars: Vec<char> = text.chars().collect();
    matches_glob_recursive(&pattern_chars, &text_chars)
}

fn matches_glob_recursive(pattern: &[char], text: &[char]) -> bool {
    match pattern.split_first() {
        None => text.is_empty(),
        Some(('*', rest)) => (0..=text.len()).any(|i| matches_glob_recursive(rest, &text[i..])),
        Some(('?', rest)) => !text.is_empty() && matches_glob_recursive(rest, &text[1..]),
        Some((c, rest)) => match text.split_first() {
            Some((t, text_rest)) if t.eq_ignore_ascii_case(c) => matches_glob_recursive(rest, text_rest),
            _ => false,
        },
    }
}
