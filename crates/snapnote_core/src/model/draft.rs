//! In-progress note state owned by the notes screen.
//!
//! # Invariants
//! - A draft is never persisted; it is reset after a successful submit and
//!   discarded on cancel.
//! - Emptiness is checked on raw values: whitespace counts as content.

/// Composer visibility flag. Submit and cancel both return to `Idle`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DraftState {
    #[default]
    Idle,
    Composing,
}

/// Unsaved note fields being edited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: String,
    pub body: String,
    /// Object-store path of an already uploaded attachment.
    pub pending_media_path: Option<String>,
}

impl NoteDraft {
    /// Returns whether title, body and media are all empty.
    pub fn is_empty(&self) -> bool {
        self.title.is_empty()
            && self.body.is_empty()
            && self
                .pending_media_path
                .as_deref()
                .map_or(true, str::is_empty)
    }

    /// Drops all fields back to their defaults.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::NoteDraft;

    #[test]
    fn default_draft_is_empty() {
        assert!(NoteDraft::default().is_empty());
    }

    #[test]
    fn any_single_field_makes_draft_non_empty() {
        let title_only = NoteDraft {
            title: "t".to_string(),
            ..NoteDraft::default()
        };
        let body_only = NoteDraft {
            body: " ".to_string(),
            ..NoteDraft::default()
        };
        let media_only = NoteDraft {
            pending_media_path: Some("u/1-a.png".to_string()),
            ..NoteDraft::default()
        };
        assert!(!title_only.is_empty());
        assert!(!body_only.is_empty());
        assert!(!media_only.is_empty());
    }

    #[test]
    fn blank_media_path_counts_as_empty() {
        let draft = NoteDraft {
            pending_media_path: Some(String::new()),
            ..NoteDraft::default()
        };
        assert!(draft.is_empty());
    }
}
