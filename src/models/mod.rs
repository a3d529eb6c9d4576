use chrono::{DateTime, Utc};

/// A note row as stored in `vault_notes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub id: i64,
    pub author: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
