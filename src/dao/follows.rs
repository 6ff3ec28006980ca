use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::params;

use crate::dao::{new_id, DaoResult};
use crate::db::models::{DeleteStatus, Follow, UserSummary};
use crate::state::DbPool;

#[async_trait]
pub trait FollowDao: Send + Sync {
    async fn follow_user(&self, follower: &str, followed: &str) -> DaoResult<Follow>;

    async fn unfollow_user(&self, fid: &str) -> DaoResult<DeleteStatus>;

    /// Users that `uid` follows.
    async fn find_followed(&self, uid: &str) -> DaoResult<Vec<UserSummary>>;

    /// Users following `uid`.
    async fn find_followers(&self, uid: &str) -> DaoResult<Vec<UserSummary>>;
}

pub type DynFollowDao = Arc<dyn FollowDao>;

pub struct SqliteFollowDao {
    pool: DbPool,
}

impl SqliteFollowDao {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn users(&self, sql: &str, uid: &str) -> DaoResult<Vec<UserSummary>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(sql)?;
        let users = stmt
            .query_map(params![uid], |row| {
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
impl FollowDao for SqliteFollowDao {
    async fn follow_user(&self, follower: &str, followed: &str) -> DaoResult<Follow> {
        let conn = self.pool.get()?;
        let follow = Follow {
            id: new_id(),
            follower: follower.to_string(),
            followed: followed.to_string(),
            followed_on: Utc::now(),
        };
        conn.execute(
            "INSERT INTO follows (id, follower, followed, followed_on) VALUES (?1, ?2, ?3, ?4)",
            params![follow.id, follow.follower, follow.followed, follow.followed_on],
        )?;
        tracing::debug!(follower = %follower, followed = %followed, "created follow");
        Ok(follow)
    }

    async fn unfollow_user(&self, fid: &str) -> DaoResult<DeleteStatus> {
        let conn = self.pool.get()?;
        let rows = conn.execute("DELETE FROM follows WHERE id = ?1", params![fid])?;
        Ok(DeleteStatus::from_rows(rows))
    }

    async fn find_followed(&self, uid: &str) -> DaoResult<Vec<UserSummary>> {
        self.users(
            "SELECT u.id, u.username, u.email FROM follows f
             JOIN users u ON u.id = f.followed
             WHERE f.follower = ?1
             ORDER BY f.followed_on DESC",
            uid,
        )
    }

    async fn find_followers(&self, uid: &str) -> DaoResult<Vec<UserSummary>> {
        self.users(
            "SELECT u.id, u.username, u.email FROM follows f
             JOIN users u ON u.id = f.follower
             WHERE f.followed = ?1
             ORDER BY f.followed_on DESC",
            uid,
        )
    }
}
