/// Marker that introduces the commit instruction in returned feedback
pub const COMMIT_MARKER: &str = "[AUTO COMMIT REQUESTED] Create commit:";

/// Subject used when the feedback carries no usable first sentence
pub const FALLBACK_SUBJECT: &str = "feat: apply changes";

/// Commit subject derived from the feedback: `feat: ` plus the first sentence
/// of the first line.
pub fn commit_subject(feedback: &str) -> String {
    let first_sentence = feedback
        .trim()
        .lines()
        .next()
        .and_then(|line| line.split('.').next())
        .map(str::trim)
        .unwrap_or("");

    if first_sentence.is_empty() {
        FALLBACK_SUBJECT.to_string()
    } else {
        format!("feat: {}", first_sentence)
    }
}

/// Feedback with the commit instruction appended after a blank line
pub fn append_commit_instruction(feedback: &str) -> String {
    format!(
        "{}\n\n{} {}",
        feedback,
        COMMIT_MARKER,
        commit_subject(feedback)
    )
}
