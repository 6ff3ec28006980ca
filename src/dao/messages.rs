use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Row};

use crate::dao::{new_id, DaoError, DaoResult};
use crate::db::models::{DeleteStatus, Message, NewMessage, UserSummary};
use crate::state::DbPool;

#[async_trait]
pub trait MessageDao: Send + Sync {
    async fn create_message(
        &self,
        sender: &str,
        recipient: &str,
        message: &NewMessage,
    ) -> DaoResult<Message>;

    async fn find_sent_messages(&self, uid: &str) -> DaoResult<Vec<Message>>;

    async fn find_received_messages(&self, uid: &str) -> DaoResult<Vec<Message>>;

    async fn delete_message(&self, mid: &str) -> DaoResult<DeleteStatus>;
}

pub type DynMessageDao = Arc<dyn MessageDao>;

const MESSAGE_SELECT: &str = "SELECT m.id, m.message, m.sent_on, \
     m.sender, COALESCE(s.username, ''), COALESCE(s.email, ''), \
     m.recipient, COALESCE(r.username, ''), COALESCE(r.email, '') \
     FROM messages m \
     LEFT JOIN users s ON s.id = m.sender \
     LEFT JOIN users r ON r.id = m.recipient";

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<Message> {
    Ok(Message {
        id: row.get(0)?,
        message: row.get(1)?,
        sent_on: row.get(2)?,
        sender: UserSummary {
            id: row.get(3)?,
            username: row.get(4)?,
            email: row.get(5)?,
        },
        recipient: UserSummary {
            id: row.get(6)?,
            username: row.get(7)?,
            email: row.get(8)?,
        },
    })
}

pub struct SqliteMessageDao {
    pool: DbPool,
}

impl SqliteMessageDao {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn select(&self, filter: &str, uid: &str) -> DaoResult<Vec<Message>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "{MESSAGE_SELECT} WHERE {filter} = ?1 ORDER BY m.sent_on DESC"
        ))?;
        let messages = stmt
            .query_map(params![uid], message_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(messages)
    }
}

#[async_trait]
impl MessageDao for SqliteMessageDao {
    async fn create_message(
        &self,
        sender: &str,
        recipient: &str,
        message: &NewMessage,
    ) -> DaoResult<Message> {
        let id = new_id();
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO messages (id, sender, recipient, message, sent_on)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, sender, recipient, message.message, Utc::now()],
        )?;

        tracing::debug!(message_id = %id, sender = %sender, recipient = %recipient, "sent message");

        conn.query_row(
            &format!("{MESSAGE_SELECT} WHERE m.id = ?1"),
            params![id],
            message_from_row,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => DaoError::NotFound(format!("message {id}")),
            other => other.into(),
        })
    }

    async fn find_sent_messages(&self, uid: &str) -> DaoResult<Vec<Message>> {
        self.select("m.sender", uid)
    }

    async fn find_received_messages(&self, uid: &str) -> DaoResult<Vec<Message>> {
        self.select("m.recipient", uid)
    }

    async fn delete_message(&self, mid: &str) -> DaoResult<DeleteStatus> {
        let conn = self.pool.get()?;
        let rows = conn.execute("DELETE FROM messages WHERE id = ?1", params![mid])?;
        Ok(DeleteStatus::from_rows(rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::{SqliteUserDao, UserDao};
    use crate::db;
    use crate::db::models::NewUser;
    use tempfile::TempDir;

    fn create_test_daos() -> (SqliteMessageDao, SqliteUserDao, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let pool = db::create_pool(&temp_dir.path().join("test.db")).unwrap();
        db::run_migrations(&pool).unwrap();
        (
            SqliteMessageDao::new(pool.clone()),
            SqliteUserDao::new(pool),
            temp_dir,
        )
    }

    fn text(body: &str) -> NewMessage {
        NewMessage {
            message: body.to_string(),
        }
    }

    #[tokio::test]
    async fn test_send_populates_both_ends() {
        let (messages, users, _temp) = create_test_daos();
        let alice = users
            .create_user(
                &NewUser {
                    username: "alice".into(),
                    email: "a@example.com".into(),
                    ..Default::default()
                },
                "h",
            )
            .await
            .unwrap();
        let bob = users
            .create_user(
                &NewUser {
                    username: "bob".into(),
                    ..Default::default()
                },
                "h",
            )
            .await
            .unwrap();

        let sent = messages
            .create_message(&alice.id, &bob.id, &text("hi bob"))
            .await
            .unwrap();
        assert_eq!(sent.message, "hi bob");
        assert_eq!(sent.sender, alice.summary());
        assert_eq!(sent.recipient, bob.summary());

        assert_eq!(messages.find_sent_messages(&alice.id).await.unwrap(), vec![sent.clone()]);
        assert_eq!(messages.find_received_messages(&bob.id).await.unwrap(), vec![sent]);
        assert!(messages.find_received_messages(&alice.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_recipient_is_stored_with_empty_summary() {
        let (messages, _users, _temp) = create_test_daos();
        let sent = messages
            .create_message("s1", "nobody", &text("hello?"))
            .await
            .unwrap();
        assert_eq!(sent.recipient.id, "nobody");
        assert_eq!(sent.recipient.username, "");
    }

    #[tokio::test]
    async fn test_delete_message() {
        let (messages, _users, _temp) = create_test_daos();
        let sent = messages.create_message("a", "b", &text("x")).await.unwrap();

        assert_eq!(messages.delete_message(&sent.id).await.unwrap().deleted_count, 1);
        assert_eq!(messages.delete_message(&sent.id).await.unwrap().deleted_count, 0);
        assert!(messages.find_sent_messages("a").await.unwrap().is_empty());
    }
}
