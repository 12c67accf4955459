/// Separator between option labels on the `--predefined-options` argument
pub const OPTION_DELIMITER: &str = "|||";

const SELECTION_SEPARATOR: &str = "; ";
const SEGMENT_SEPARATOR: &str = "\n\n";

/// Split a `|||`-delimited option list. Empty segments are dropped, so both
/// `""` and `"a||||||b"` behave sensibly.
pub fn parse_predefined_options(raw: &str) -> Vec<String> {
    raw.split(OPTION_DELIMITER)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

/// Inverse of [`parse_predefined_options`] for non-empty labels
pub fn join_predefined_options<S: AsRef<str>>(options: &[S]) -> String {
    options
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(OPTION_DELIMITER)
}

/// Combine checked option labels and free text into the feedback string.
///
/// Labels (already in display order) are joined with `"; "`, the free text is
/// trimmed, and the two non-empty segments are joined by a blank line.
pub fn compose_feedback<S: AsRef<str>>(selected: &[S], text: &str) -> String {
    let mut segments: Vec<String> = Vec::with_capacity(2);

    if !selected.is_empty() {
        segments.push(
            selected
                .iter()
                .map(AsRef::as_ref)
                .collect::<Vec<_>>()
                .join(SELECTION_SEPARATOR),
        );
    }

    let text = text.trim();
    if !text.is_empty() {
        segments.push(text.to_string());
    }

    segments.join(SEGMENT_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_options() {
        assert_eq!(
            parse_predefined_options("Looks good|||Needs changes"),
            vec!["Looks good", "Needs changes"]
        );
    }

    #[test]
    fn test_parse_empty_options() {
        assert!(parse_predefined_options("").is_empty());
        assert!(parse_predefined_options("||||||").is_empty());
        assert_eq!(parse_predefined_options("a||||||b"), vec!["a", "b"]);
    }

    #[test]
    fn test_join_round_trips_with_parse() {
        let options = vec!["Yes".to_string(), "No, revert".to_string()];
        assert_eq!(
            parse_predefined_options(&join_predefined_options(&options)),
            options
        );
        assert_eq!(join_predefined_options::<&str>(&[]), "");
    }

    #[test]
    fn test_options_and_text() {
        assert_eq!(
            compose_feedback(&["Needs changes"], "please rename foo to bar"),
            "Needs changes\n\nplease rename foo to bar"
        );
    }

    #[test]
    fn test_options_only() {
        assert_eq!(compose_feedback(&["A", "C"], "   \n"), "A; C");
    }

    #[test]
    fn test_text_only_is_trimmed() {
        assert_eq!(
            compose_feedback::<&str>(&[], "\n  line one\nline two  \n"),
            "line one\nline two"
        );
    }

    #[test]
    fn test_nothing_gives_empty_string() {
        assert_eq!(compose_feedback::<&str>(&[], ""), "");
        assert_eq!(compose_feedback::<&str>(&[], " \t\n"), "");
    }
}
