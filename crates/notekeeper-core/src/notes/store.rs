use thiserror::Error;
use tracing::{debug, warn};

use crate::api::{ApiClient, ApiError};
use crate::models::Note;

/// A failed notes operation, with the text to show the user.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct NotesError {
    pub message: String,
    #[source]
    pub source: Option<ApiError>,
}

impl NotesError {
    fn api(source: ApiError, fallback: &str) -> Self {
        Self {
            message: source.user_message(fallback),
            source: Some(source),
        }
    }

    fn invalid(message: &str) -> Self {
        Self {
            message: message.to_string(),
            source: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotesState {
    /// Newest first.
    pub notes: Vec<Note>,
    pub loading: bool,
    pub error: Option<String>,
}

pub struct NotesStore {
    api: ApiClient,
    state: NotesState,
}

impl NotesStore {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            state: NotesState::default(),
        }
    }

    pub fn state(&self) -> &NotesState {
        &self.state
    }

    pub fn notes(&self) -> &[Note] {
        &self.state.notes
    }

    pub fn find(&self, id: &str) -> Option<&Note> {
        self.state.notes.iter().find(|n| n.id == id)
    }

    pub async fn fetch(&mut self) -> Result<(), NotesError> {
        self.state.loading = true;
        self.state.error = None;

        let result = self.api.fetch_notes().await;
        self.state.loading = false;

        match result {
            Ok(notes) => {
                debug!(count = notes.len(), "Fetched notes");
                self.state.notes = notes;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch notes");
                let err = NotesError::api(e, "Failed to fetch notes");
                self.state.error = Some(err.message.clone());
                Err(err)
            }
        }
    }

    pub async fn add(&mut self, content: &str) -> Result<&Note, NotesError> {
        let content = Self::check_content(content)?;
        let note = self
            .api
            .create_note(content)
            .await
            .map_err(|e| NotesError::api(e, "Failed to add note"))?;
        self.state.notes.insert(0, note);
        Ok(&self.state.notes[0])
    }

    pub async fn update(&mut self, id: &str, content: &str) -> Result<(), NotesError> {
        let content = Self::check_content(content)?;
        let updated = self
            .api
            .update_note(id, content)
            .await
            .map_err(|e| NotesError::api(e, "Failed to update note"))?;
        for note in self.state.notes.iter_mut().filter(|n| n.id == id) {
            *note = updated.clone();
        }
        Ok(())
    }

    pub async fn delete(&mut self, id: &str) -> Result<(), NotesError> {
        self.api
            .delete_note(id)
            .await
            .map_err(|e| NotesError::api(e, "Failed to delete note"))?;
        self.state.notes.retain(|n| n.id != id);
        Ok(())
    }

    fn check_content(content: &str) -> Result<&str, NotesError> {
        let content = content.trim();
        if content.is_empty() {
            Err(NotesError::invalid("Note cannot be empty"))
        } else {
            Ok(content)
        }
    }
}
