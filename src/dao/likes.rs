use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::{params, OptionalExtension};

use crate::dao::tuits::{tuit_from_row, TUIT_SELECT};
use crate::dao::{is_unique_violation, new_id, DaoError, DaoResult};
use crate::db::models::{DeleteStatus, Like, Tuit, UserSummary};
use crate::likes::domain::Relationship;
use crate::state::DbPool;

/// The Like collection: the source of truth for who likes or dislikes what.
///
/// Referenced user and tuit ids are stored as given; checking that they exist
/// is the caller's job.
#[async_trait]
pub trait LikeDao: Send + Sync {
    /// Current stance of `uid` on `tid`. No record means `Relationship::None`.
    async fn find_relationship(&self, uid: &str, tid: &str) -> DaoResult<Relationship>;

    /// Move the pair to `to`: create, flip or delete the single backing record.
    async fn set_relationship(&self, uid: &str, tid: &str, to: Relationship) -> DaoResult<()>;

    async fn count_likes(&self, tid: &str) -> DaoResult<i64>;

    async fn count_dislikes(&self, tid: &str) -> DaoResult<i64>;

    async fn find_like(&self, uid: &str, tid: &str) -> DaoResult<Option<Like>>;

    async fn find_tuits_user_liked(&self, uid: &str) -> DaoResult<Vec<Tuit>>;

    async fn find_tuits_user_disliked(&self, uid: &str) -> DaoResult<Vec<Tuit>>;

    async fn find_users_that_liked_tuit(&self, tid: &str) -> DaoResult<Vec<UserSummary>>;

    async fn find_users_that_disliked_tuit(&self, tid: &str) -> DaoResult<Vec<UserSummary>>;

    /// Insert a record directly, bypassing the toggle. Conflict if the pair already has one.
    async fn create_like(&self, uid: &str, tid: &str, is_dislike: bool) -> DaoResult<Like>;

    /// Remove the pair's record directly, bypassing the toggle.
    async fn delete_like(&self, uid: &str, tid: &str) -> DaoResult<DeleteStatus>;
}

pub type DynLikeDao = Arc<dyn LikeDao>;

pub struct SqliteLikeDao {
    pool: DbPool,
}

impl SqliteLikeDao {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn count(&self, tid: &str, is_dislike: bool) -> DaoResult<i64> {
        let conn = self.pool.get()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM likes WHERE tuit_id = ?1 AND is_dislike = ?2",
            params![tid, is_dislike],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn tuits_for_user(&self, uid: &str, is_dislike: bool) -> DaoResult<Vec<Tuit>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "{TUIT_SELECT} JOIN likes l ON l.tuit_id = t.id \
             WHERE l.liked_by = ?1 AND l.is_dislike = ?2 \
             ORDER BY l.created_at DESC"
        ))?;
        let tuits = stmt
            .query_map(params![uid, is_dislike], tuit_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tuits)
    }

    fn users_for_tuit(&self, tid: &str, is_dislike: bool) -> DaoResult<Vec<UserSummary>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT u.id, u.username, u.email FROM likes l
             JOIN users u ON u.id = l.liked_by
             WHERE l.tuit_id = ?1 AND l.is_dislike = ?2
             ORDER BY l.created_at DESC",
        )?;
        let users = stmt
            .query_map(params![tid, is_dislike], |row| {
                Ok(UserSummary {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    email: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }
}

#[async_trait]
impl LikeDao for SqliteLikeDao {
    async fn find_relationship(&self, uid: &str, tid: &str) -> DaoResult<Relationship> {
        let conn = self.pool.get()?;
        let flag: Option<bool> = conn
            .query_row(
                "SELECT is_dislike FROM likes WHERE liked_by = ?1 AND tuit_id = ?2",
                params![uid, tid],
                |row| row.get(0),
            )
            .optional()?;
        Ok(Relationship::from_is_dislike(flag))
    }

    async fn set_relationship(&self, uid: &str, tid: &str, to: Relationship) -> DaoResult<()> {
        let conn = self.pool.get()?;

        match to.is_dislike() {
            None => {
                conn.execute(
                    "DELETE FROM likes WHERE liked_by = ?1 AND tuit_id = ?2",
                    params![uid, tid],
                )?;
            }
            Some(is_dislike) => {
                // Upsert on the (liked_by, tuit_id) index keeps one record per pair
                conn.execute(
                    "INSERT INTO likes (id, tuit_id, liked_by, is_dislike)
                     VALUES (?1, ?2, ?3, ?4)
                     ON CONFLICT(liked_by, tuit_id) DO UPDATE SET
                       is_dislike = excluded.is_dislike",
                    params![new_id(), tid, uid, is_dislike],
                )?;
            }
        }

        Ok(())
    }

    async fn count_likes(&self, tid: &str) -> DaoResult<i64> {
        self.count(tid, false)
    }

    async fn count_dislikes(&self, tid: &str) -> DaoResult<i64> {
        self.count(tid, true)
    }

    async fn find_like(&self, uid: &str, tid: &str) -> DaoResult<Option<Like>> {
        let conn = self.pool.get()?;
        let like = conn
            .query_row(
                "SELECT id, tuit_id, liked_by, is_dislike FROM likes
                 WHERE liked_by = ?1 AND tuit_id = ?2",
                params![uid, tid],
                |row| {
                    Ok(Like {
                        id: row.get(0)?,
                        tuit: row.get(1)?,
                        liked_by: row.get(2)?,
                        is_dislike: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(like)
    }

    async fn find_tuits_user_liked(&self, uid: &str) -> DaoResult<Vec<Tuit>> {
        self.tuits_for_user(uid, false)
    }

    async fn find_tuits_user_disliked(&self, uid: &str) -> DaoResult<Vec<Tuit>> {
        self.tuits_for_user(uid, true)
    }

    async fn find_users_that_liked_tuit(&self, tid: &str) -> DaoResult<Vec<UserSummary>> {
        self.users_for_tuit(tid, false)
    }

    async fn find_users_that_disliked_tuit(&self, tid: &str) -> DaoResult<Vec<UserSummary>> {
        self.users_for_tuit(tid, true)
    }

    async fn create_like(&self, uid: &str, tid: &str, is_dislike: bool) -> DaoResult<Like> {
        let conn = self.pool.get()?;
        let id = new_id();

        conn.execute(
            "INSERT INTO likes (id, tuit_id, liked_by, is_dislike) VALUES (?1, ?2, ?3, ?4)",
            params![id, tid, uid, is_dislike],
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                DaoError::Conflict(format!("user {uid} already has a like record for tuit {tid}"))
            } else {
                e.into()
            }
        })?;

        Ok(Like {
            id,
            tuit: tid.to_string(),
            liked_by: uid.to_string(),
            is_dislike,
        })
    }

    async fn delete_like(&self, uid: &str, tid: &str) -> DaoResult<DeleteStatus> {
        let conn = self.pool.get()?;
        let rows = conn.execute(
            "DELETE FROM likes WHERE liked_by = ?1 AND tuit_id = ?2",
            params![uid, tid],
        )?;
        Ok(DeleteStatus::from_rows(rows))
    }
}
