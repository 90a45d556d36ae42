//! Canonical form for guesses and answer keys.
//!
//! Two strings name the same answer iff their normalized forms are equal.

/// Trim, lowercase, drop everything that is not a letter, digit or
/// whitespace, and collapse whitespace runs to a single space.
pub fn normalize(input: &str) -> String {
    let lowered = input.trim().to_lowercase();
    let kept: String = lowered
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();

    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}
