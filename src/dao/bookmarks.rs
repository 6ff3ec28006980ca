use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::params;

use crate::dao::tuits::{tuit_from_row, TUIT_SELECT};
use crate::dao::{new_id, DaoResult};
use crate::db::models::{Bookmark, DeleteStatus, Tuit};
use crate::state::DbPool;

#[async_trait]
pub trait BookmarkDao: Send + Sync {
    async fn create_bookmark(&self, uid: &str, tid: &str) -> DaoResult<Bookmark>;

    async fn delete_bookmark(&self, bid: &str) -> DaoResult<DeleteStatus>;

    /// Tuits bookmarked by `uid`, newest bookmark first. Deleted tuits are skipped.
    async fn find_bookmarked_tuits(&self, uid: &str) -> DaoResult<Vec<Tuit>>;
}

pub type DynBookmarkDao = Arc<dyn BookmarkDao>;

pub struct SqliteBookmarkDao {
    pool: DbPool,
}

impl SqliteBookmarkDao {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookmarkDao for SqliteBookmarkDao {
    async fn create_bookmark(&self, uid: &str, tid: &str) -> DaoResult<Bookmark> {
        let conn = self.pool.get()?;
        let bookmark = Bookmark {
            id: new_id(),
            user: uid.to_string(),
            tuit: tid.to_string(),
            bookmarked_on: Utc::now(),
        };
        conn.execute(
            "INSERT INTO bookmarks (id, user_id, tuit_id, bookmarked_on) VALUES (?1, ?2, ?3, ?4)",
            params![bookmark.id, bookmark.user, bookmark.tuit, bookmark.bookmarked_on],
        )?;
        Ok(bookmark)
    }

    async fn delete_bookmark(&self, bid: &str) -> DaoResult<DeleteStatus> {
        let conn = self.pool.get()?;
        let rows = conn.execute("DELETE FROM bookmarks WHERE id = ?1", params![bid])?;
        Ok(DeleteStatus::from_rows(rows))
    }

    async fn find_bookmarked_tuits(&self, uid: &str) -> DaoResult<Vec<Tuit>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "{TUIT_SELECT} JOIN bookmarks b ON b.tuit_id = t.id \
             WHERE b.user_id = ?1 ORDER BY b.bookmarked_on DESC"
        ))?;
        let tuits = stmt
            .query_map(params![uid], tuit_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tuits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::{SqliteTuitDao, TuitDao};
    use crate::db;
    use crate::db::models::NewTuit;
    use tempfile::TempDir;

    fn create_test_daos() -> (SqliteBookmarkDao, SqliteTuitDao, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let pool = db::create_pool(&temp_dir.path().join("test.db")).unwrap();
        db::run_migrations(&pool).unwrap();
        (
            SqliteBookmarkDao::new(pool.clone()),
            SqliteTuitDao::new(pool),
            temp_dir,
        )
    }

    #[tokio::test]
    async fn test_bookmark_lists_tuits() {
        let (bookmarks, tuits, _temp) = create_test_daos();
        let tuit = tuits
            .create_tuit("author", &NewTuit { tuit: "save me".into() })
            .await
            .unwrap();

        let bookmark = bookmarks.create_bookmark("reader", &tuit.id).await.unwrap();
        assert_eq!(bookmark.user, "reader");
        assert_eq!(bookmark.tuit, tuit.id);

        let saved = bookmarks.find_bookmarked_tuits("reader").await.unwrap();
        assert_eq!(saved, vec![tuit]);
        assert!(bookmarks.find_bookmarked_tuits("author").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_bookmark_and_dangling_tuit() {
        let (bookmarks, tuits, _temp) = create_test_daos();
        let kept = tuits
            .create_tuit("a", &NewTuit { tuit: "kept".into() })
            .await
            .unwrap();
        let gone = tuits
            .create_tuit("a", &NewTuit { tuit: "gone".into() })
            .await
            .unwrap();

        let first = bookmarks.create_bookmark("r", &kept.id).await.unwrap();
        bookmarks.create_bookmark("r", &gone.id).await.unwrap();

        // The bookmark row survives tuit deletion but drops out of the list
        tuits.delete_tuit(&gone.id).await.unwrap();
        let saved = bookmarks.find_bookmarked_tuits("r").await.unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].id, kept.id);

        assert_eq!(bookmarks.delete_bookmark(&first.id).await.unwrap().deleted_count, 1);
        assert!(bookmarks.find_bookmarked_tuits("r").await.unwrap().is_empty());
    }
}
