use rusqlite::params;

use momentz_shared::constants::{KEY_TOKEN, KEY_USERNAME, KEY_USER_ID};

use crate::database::Database;
use crate::error::Result;
use crate::models::StoredSession;

const SESSION_KEYS: [&str; 3] = [KEY_TOKEN, KEY_USER_ID, KEY_USERNAME];

impl Database {
    /// Write all three session values in one transaction.
    pub fn save_session(&mut self, session: &StoredSession) -> Result<()> {
        let tx = self.conn_mut().transaction()?;
        for (key, value) in [
            (KEY_TOKEN, &session.token),
            (KEY_USER_ID, &session.user_id),
            (KEY_USERNAME, &session.username),
        ] {
            tx.execute(
                "INSERT INTO kv (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                params![key, value],
            )?;
        }
        tx.commit()?;

        tracing::debug!(username = %session.username, "session persisted");
        Ok(())
    }

    /// The stored triple, or `None` unless all three values are present.
    pub fn load_session(&self) -> Result<Option<StoredSession>> {
        let token = self.get_value(KEY_TOKEN)?;
        let user_id = self.get_value(KEY_USER_ID)?;
        let username = self.get_value(KEY_USERNAME)?;

        match (token, user_id, username) {
            (Some(token), Some(user_id), Some(username))
                if !token.is_empty() && !user_id.is_empty() && !username.is_empty() =>
            {
                Ok(Some(StoredSession {
                    token,
                    user_id,
                    username,
                }))
            }
            _ => Ok(None),
        }
    }

    /// Remove exactly the three session values. Other preferences survive.
    pub fn clear_session(&mut self) -> Result<()> {
        let tx = self.conn_mut().transaction()?;
        for key in SESSION_KEYS {
            tx.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        }
        tx.commit()?;

        tracing::debug!("session cleared from disk");
        Ok(())
    }
}
