use std::sync::Arc;

use tracing::{debug, trace};

use murmur_db::Database;
use murmur_types::api::Claims;
use murmur_types::models::Message;

use crate::error::CoreError;

/// Upper bound on how many messages a single read returns.
pub const RECENT_LIMIT: u32 = 100;

/// Append-only message store, read back newest first.
pub struct MessageLog {
    db: Arc<Database>,
}

impl MessageLog {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Persist `text` as written. Whitespace-only text is rejected.
    pub fn append(&self, author: &Claims, text: &str) -> Result<Message, CoreError> {
        if text.trim().is_empty() {
            return Err(CoreError::Validation("message must not be empty"));
        }

        let id = self.db.insert_message(text)?;
        debug!(message_id = id, author_id = author.sub, "Message appended");

        Ok(Message {
            id,
            text: text.to_string(),
        })
    }

    /// The `limit` most recent messages (capped at [`RECENT_LIMIT`]),
    /// newest first.
    pub fn recent(&self, reader: &Claims, limit: u32) -> Result<Vec<Message>, CoreError> {
        let limit = limit.min(RECENT_LIMIT);
        trace!(user_id = reader.sub, limit, "Listing recent messages");

        let rows = self.db.recent_messages(limit)?;
        Ok(rows
            .into_iter()
            .map(|row| Message {
                id: row.id,
                text: row.message,
            })
            .collect())
    }

    pub fn count(&self) -> Result<i64, CoreError> {
        Ok(self.db.message_count()?)
    }
}
