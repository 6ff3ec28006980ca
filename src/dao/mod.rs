// Data access - every store side effect lives behind one of these traits
pub mod bookmarks;
pub mod follows;
pub mod likes;
pub mod messages;
pub mod tuits;
pub mod users;

use thiserror::Error;

pub use bookmarks::{BookmarkDao, DynBookmarkDao, SqliteBookmarkDao};
pub use follows::{DynFollowDao, FollowDao, SqliteFollowDao};
pub use likes::{DynLikeDao, LikeDao, SqliteLikeDao};
pub use messages::{DynMessageDao, MessageDao, SqliteMessageDao};
pub use tuits::{DynTuitDao, SqliteTuitDao, TuitDao};
pub use users::{DynUserDao, SqliteUserDao, UserDao};

#[derive(Debug, Error)]
pub enum DaoError {
    #[error("Database error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("SQL error: {0}")]
    Sql(#[from] rusqlite::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

pub type DaoResult<T> = Result<T, DaoError>;

/// True when an insert/update tripped a UNIQUE index.
pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    )
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::now_v7().to_string()
}
