//! Predefined option checkboxes and the commit checkbox state

/// Checked state for the dialog's predefined options.
///
/// Selection is reported in the order the options were given, never in
/// click order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionSelection {
    labels: Vec<String>,
    checked: Vec<bool>,
}

impl OptionSelection {
    /// All options start unchecked
    pub fn new(labels: Vec<String>) -> Self {
        let checked = vec![false; labels.len()];
        Self { labels, checked }
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn is_checked(&self, index: usize) -> bool {
        self.checked.get(index).copied().unwrap_or(false)
    }

    /// Flip one option; out-of-range indices are ignored
    pub fn toggle(&mut self, index: usize) {
        if let Some(checked) = self.checked.get_mut(index) {
            *checked = !*checked;
        }
    }

    pub fn set_checked(&mut self, index: usize, value: bool) {
        if let Some(checked) = self.checked.get_mut(index) {
            *checked = value;
        }
    }

    /// Labels of the checked options, in original order
    pub fn selected(&self) -> Vec<&str> {
        self.labels
            .iter()
            .zip(&self.checked)
            .filter(|(_, checked)| **checked)
            .map(|(label, _)| label.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::compose_feedback;

    fn selection() -> OptionSelection {
        OptionSelection::new(vec![
            "A".to_string(),
            "B".to_string(),
            "C".to_string(),
        ])
    }

    #[test]
    fn test_starts_unchecked() {
        let options = selection();
        assert_eq!(options.len(), 3);
        assert!((0..3).all(|i| !options.is_checked(i)));
        assert!(options.selected().is_empty());
    }

    #[test]
    fn test_selected_keeps_original_order() {
        let mut options = selection();
        options.toggle(2);
        options.toggle(0);
        assert_eq!(options.selected(), vec!["A", "C"]);
    }

    #[test]
    fn test_toggle_twice_unchecks() {
        let mut options = selection();
        options.toggle(1);
        options.toggle(1);
        assert!(options.selected().is_empty());
    }

    #[test]
    fn test_out_of_range_is_ignored() {
        let mut options = selection();
        options.toggle(10);
        options.set_checked(10, true);
        assert!(!options.is_checked(10));
        assert!(options.selected().is_empty());
    }

    #[test]
    fn test_no_options() {
        let options = OptionSelection::new(Vec::new());
        assert!(options.is_empty());
        assert_eq!(compose_feedback(&options.selected(), "just text"), "just text");
    }

    #[test]
    fn test_review_scenario() {
        let mut options =
            OptionSelection::new(vec!["Looks good".to_string(), "Needs changes".to_string()]);
        options.set_checked(1, true);
        assert_eq!(
            compose_feedback(&options.selected(), "please rename foo to bar"),
            "Needs changes\n\nplease rename foo to bar"
        );
    }
}
