//! Create-poll form state.

use serde::Serialize;

use crate::error::ValidationError;

/// Minimum number of non-blank options a poll needs.
pub const MIN_OPTIONS: usize = 2;

/// Editable create-poll form.
///
/// Starts with two empty option rows. Rows can be added freely but never
/// removed below [`MIN_OPTIONS`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollDraft {
    pub title: String,
    pub description: String,
    options: Vec<String>,
}

impl Default for PollDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            options: vec![String::new(); MIN_OPTIONS],
        }
    }
}

impl PollDraft {
    /// Empty draft with two option rows.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a draft from a title, description and option texts.
    ///
    /// Short option lists are padded with empty rows.
    #[must_use]
    pub fn with_fields(
        title: impl Into<String>,
        description: impl Into<String>,
        options: impl IntoIterator<Item = String>,
    ) -> Self {
        let mut options: Vec<String> = options.into_iter().collect();
        if options.len() < MIN_OPTIONS {
            options.resize(MIN_OPTIONS, String::new());
        }
        Self {
            title: title.into(),
            description: description.into(),
            options,
        }
    }

    /// Option rows, including blank ones.
    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Append an empty option row.
    pub fn add_option(&mut self) {
        self.options.push(String::new());
    }

    /// Remove the row at `index`. Returns `false` if that would leave fewer
    /// than two rows or the index is out of range.
    pub fn remove_option(&mut self, index: usize) -> bool {
        if self.options.len() <= MIN_OPTIONS || index >= self.options.len() {
            return false;
        }
        self.options.remove(index);
        true
    }

    /// Replace the text of the row at `index`. Returns `false` if out of range.
    pub fn update_option(&mut self, index: usize, text: impl Into<String>) -> bool {
        match self.options.get_mut(index) {
            Some(slot) => {
                *slot = text.into();
                true
            }
            None => false,
        }
    }

    /// Validate and normalize the draft into a create request.
    ///
    /// Title and description are trimmed and blank options are dropped.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyTitle` for a blank title and
    /// `ValidationError::TooFewOptions` when fewer than two options remain.
    pub fn validate(&self) -> Result<NewPoll, ValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }

        let options: Vec<String> = self
            .options
            .iter()
            .map(|o| o.trim())
            .filter(|o| !o.is_empty())
            .map(str::to_owned)
            .collect();
        if options.len() < MIN_OPTIONS {
            return Err(ValidationError::TooFewOptions {
                min: MIN_OPTIONS,
                got: options.len(),
            });
        }

        Ok(NewPoll {
            title: title.to_owned(),
            description: self.description.trim().to_owned(),
            options,
        })
    }
}

/// A validated create-poll request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPoll {
    pub title: String,
    pub description: String,
    pub options: Vec<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_draft_has_two_rows() {
        let draft = PollDraft::new();
        assert_eq!(draft.options().len(), 2);
    }

    #[test]
    fn test_cannot_remove_below_two() {
        let mut draft = PollDraft::new();
        assert!(!draft.remove_option(0));
        draft.add_option();
        assert!(draft.remove_option(2));
        assert_eq!(draft.options().len(), 2);
        assert!(!draft.remove_option(5));
    }

    #[test]
    fn test_validate_trims_and_drops_blank_options() {
        let mut draft = PollDraft::new();
        draft.title = "  Lunch?  ".to_string();
        draft.update_option(0, " Pizza ");
        draft.add_option();
        draft.update_option(2, "Sushi");

        let poll = draft.validate().unwrap();
        assert_eq!(poll.title, "Lunch?");
        assert_eq!(poll.options, vec!["Pizza".to_string(), "Sushi".to_string()]);
    }

    #[test]
    fn test_validate_rejects_blank_title() {
        let draft = PollDraft::with_fields("   ", "", ["a".to_string(), "b".to_string()]);
        assert_eq!(draft.validate(), Err(ValidationError::EmptyTitle));
    }

    #[test]
    fn test_validate_rejects_single_option() {
        let draft = PollDraft::with_fields("Title", "", ["only".to_string(), "  ".to_string()]);
        assert_eq!(
            draft.validate(),
            Err(ValidationError::TooFewOptions { min: 2, got: 1 })
        );
    }
}
