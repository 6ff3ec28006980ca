use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

use crate::dao::{new_id, DaoError, DaoResult};
use crate::db::models::{DeleteStatus, NewTuit, Tuit, TuitStats, UpdateStatus, UserSummary};
use crate::state::DbPool;

#[async_trait]
pub trait TuitDao: Send + Sync {
    async fn find_all_tuits(&self) -> DaoResult<Vec<Tuit>>;

    async fn find_tuit_by_id(&self, tid: &str) -> DaoResult<Tuit>;

    async fn find_tuits_by_author(&self, uid: &str) -> DaoResult<Vec<Tuit>>;

    async fn create_tuit(&self, uid: &str, tuit: &NewTuit) -> DaoResult<Tuit>;

    /// Overwrite the text body of a tuit.
    async fn update_tuit(&self, tid: &str, tuit: &NewTuit) -> DaoResult<UpdateStatus>;

    async fn delete_tuit(&self, tid: &str) -> DaoResult<DeleteStatus>;

    /// Overwrite the cached stats record. NotFound when the tuit is gone.
    async fn update_stats(&self, tid: &str, stats: TuitStats) -> DaoResult<()>;
}

pub type DynTuitDao = Arc<dyn TuitDao>;

/// Tuit columns with the author reference populated. Authors that no longer
/// exist come back with empty username/email.
pub(crate) const TUIT_SELECT: &str = "SELECT t.id, t.tuit, t.posted_by, \
     COALESCE(u.username, ''), COALESCE(u.email, ''), t.posted_on, \
     t.replies, t.retuits, t.likes, t.dislikes \
     FROM tuits t LEFT JOIN users u ON u.id = t.posted_by";

pub(crate) fn tuit_from_row(row: &Row<'_>) -> rusqlite::Result<Tuit> {
    Ok(Tuit {
        id: row.get(0)?,
        tuit: row.get(1)?,
        posted_by: UserSummary {
            id: row.get(2)?,
            username: row.get(3)?,
            email: row.get(4)?,
        },
        posted_on: row.get(5)?,
        stats: TuitStats {
            replies: row.get(6)?,
            retuits: row.get(7)?,
            likes: row.get(8)?,
            dislikes: row.get(9)?,
        },
    })
}

pub struct SqliteTuitDao {
    pool: DbPool,
}

impl SqliteTuitDao {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TuitDao for SqliteTuitDao {
    async fn find_all_tuits(&self) -> DaoResult<Vec<Tuit>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!("{TUIT_SELECT} ORDER BY t.posted_on DESC"))?;
        let tuits = stmt
            .query_map([], tuit_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tuits)
    }

    async fn find_tuit_by_id(&self, tid: &str) -> DaoResult<Tuit> {
        let conn = self.pool.get()?;
        conn.query_row(
            &format!("{TUIT_SELECT} WHERE t.id = ?1"),
            params![tid],
            tuit_from_row,
        )
        .optional()?
        .ok_or_else(|| DaoError::NotFound(format!("tuit {tid}")))
    }

    async fn find_tuits_by_author(&self, uid: &str) -> DaoResult<Vec<Tuit>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "{TUIT_SELECT} WHERE t.posted_by = ?1 ORDER BY t.posted_on DESC"
        ))?;
        let tuits = stmt
            .query_map(params![uid], tuit_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tuits)
    }

    async fn create_tuit(&self, uid: &str, tuit: &NewTuit) -> DaoResult<Tuit> {
        let id = new_id();
        {
            let conn = self.pool.get()?;
            conn.execute(
                "INSERT INTO tuits (id, tuit, posted_by, posted_on) VALUES (?1, ?2, ?3, ?4)",
                params![id, tuit.tuit, uid, Utc::now()],
            )?;
        }
        tracing::debug!(tuit_id = %id, author = %uid, "created tuit");
        self.find_tuit_by_id(&id).await
    }

    async fn update_tuit(&self, tid: &str, tuit: &NewTuit) -> DaoResult<UpdateStatus> {
        let conn = self.pool.get()?;
        let matched: i64 = conn.query_row(
            "SELECT COUNT(*) FROM tuits WHERE id = ?1",
            params![tid],
            |row| row.get(0),
        )?;
        let modified = conn.execute(
            "UPDATE tuits SET tuit = ?2 WHERE id = ?1 AND tuit IS NOT ?2",
            params![tid, tuit.tuit],
        )?;
        Ok(UpdateStatus::new(matched as usize, modified))
    }

    async fn delete_tuit(&self, tid: &str) -> DaoResult<DeleteStatus> {
        let conn = self.pool.get()?;
        let rows = conn.execute("DELETE FROM tuits WHERE id = ?1", params![tid])?;
        Ok(DeleteStatus::from_rows(rows))
    }

    async fn update_stats(&self, tid: &str, stats: TuitStats) -> DaoResult<()> {
        let conn = self.pool.get()?;
        let rows = conn.execute(
            "UPDATE tuits SET replies = ?2, retuits = ?3, likes = ?4, dislikes = ?5 WHERE id = ?1",
            params![tid, stats.replies, stats.retuits, stats.likes, stats.dislikes],
        )?;
        if rows == 0 {
            return Err(DaoError::NotFound(format!("tuit {tid}")));
        }
        Ok(())
    }
}
