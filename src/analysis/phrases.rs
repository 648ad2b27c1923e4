/// Flattering phrases that force a perfect truth reading.
const HIGH_CONFIDENCE_PHRASES: &[&str] = &[
    "is this the best lie detector",
    "this is the best lie detector",
    "best lie detector",
    "most accurate lie detector",
    "perfect lie detector",
    "amazing lie detector",
    "incredible lie detector",
    "fantastic lie detector",
    "excellent lie detector",
    "outstanding lie detector",
];

/// True when the statement contains any flattering phrase, ignoring case and
/// surrounding whitespace.
pub fn is_high_confidence(statement: &str) -> bool {
    let normalized = statement.trim().to_lowercase();
    HIGH_CONFIDENCE_PHRASES
        .iter()
        .any(|phrase| normalized.contains(phrase))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_anywhere_in_the_statement() {
        assert!(is_high_confidence("Wow, this is the best lie detector ever!"));
        assert!(is_high_confidence("  THE MOST ACCURATE LIE DETECTOR  "));
        assert!(is_high_confidence("an Outstanding Lie Detector, honestly"));
    }

    #[test]
    fn ordinary_statements_do_not_match() {
        assert!(!is_high_confidence("I did not eat the last cookie"));
        assert!(!is_high_confidence("best lie"));
        assert!(!is_high_confidence(""));
    }
}
