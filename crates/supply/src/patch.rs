//! Partial updates where blank input means "keep the current value".

/// Normalize an operator answer for a patch field.
///
/// Empty or whitespace-only input becomes `None` (keep current value); anything
/// else is kept verbatim.
pub fn non_blank(input: &str) -> Option<String> {
    if input.trim().is_empty() {
        None
    } else {
        Some(input.to_string())
    }
}

/// Resolve a patch field against the current value.
pub(crate) fn pick(patch: &Option<String>, current: &str) -> String {
    patch.clone().unwrap_or_else(|| current.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_answers_are_none() {
        assert_eq!(non_blank(""), None);
        assert_eq!(non_blank("   \t"), None);
        assert_eq!(non_blank("Rua A"), Some("Rua A".to_string()));
    }

    #[test]
    fn pick_falls_back_to_current() {
        assert_eq!(pick(&None, "old"), "old");
        assert_eq!(pick(&Some("new".to_string()), "old"), "new");
    }
}
