//! Product identifier normalization.

/// Grouping key for a raw product identifier: trimmed, `,` thousands
/// separators removed, a trailing `.0`/`.00`… stripped, and lowercased.
///
/// Only used for matching. Display code keeps the identifier as it appeared
/// in the file.
pub fn normalize_id(raw: &str) -> String {
    let without_separators: String = raw.trim().chars().filter(|c| *c != ',').collect();
    strip_zero_fraction(&without_separators).to_lowercase()
}

/// `"123.00"` → `"123"`; anything else is returned unchanged.
fn strip_zero_fraction(value: &str) -> &str {
    match value.rfind('.') {
        Some(dot) => {
            let fraction = &value[dot + 1..];
            if !fraction.is_empty() && fraction.bytes().all(|b| b == b'0') {
                &value[..dot]
            } else {
                value
            }
        }
        None => value,
    }
}
