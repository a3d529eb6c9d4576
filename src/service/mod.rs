use crate::{
    dto::{CreateNoteParams, NoteResponse},
    error::ServiceError,
    repository::NoteRepository,
};

use std::sync::Arc;

#[derive(Clone)]
pub struct NoteService {
    repo: Arc<dyn NoteRepository>,
}

impl NoteService {
    pub fn new(repo: Arc<dyn NoteRepository>) -> Self {
        Self { repo }
    }

    pub async fn create_note(&self, request: CreateNoteParams) -> Result<(), ServiceError> {
        if request.author.trim().is_empty() {
            return Err(ServiceError::InvalidInput(
                "author must not be empty".to_string(),
            ));
        }
        if request.content.trim().is_empty() {
            return Err(ServiceError::InvalidInput(
                "content must not be empty".to_string(),
            ));
        }

        self.repo.insert(&request.author, &request.content).await?;

        tracing::info!("Note by '{}' created", request.author);

        Ok(())
    }

    pub async fn delete_note(&self, id: i64) -> Result<(), ServiceError> {
        self.repo.delete_by_id(id).await?;

        tracing::info!("Note {id} deleted");

        Ok(())
    }

    pub async fn get_note(&self, id: i64) -> Result<Vec<NoteResponse>, ServiceError> {
        let notes = self.repo.get_by_id(id).await?;

        Ok(notes.into_iter().map(NoteResponse::from).collect())
    }

    pub async fn get_recent_notes(&self) -> Result<Vec<NoteResponse>, ServiceError> {
        let notes = self.repo.list_recent().await?;

        Ok(notes.into_iter().map(NoteResponse::from).collect())
    }
}
