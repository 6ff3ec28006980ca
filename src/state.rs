use std::sync::Arc;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::config::Config;
use crate::dao::{
    DynBookmarkDao, DynFollowDao, DynLikeDao, DynMessageDao, DynTuitDao, DynUserDao,
    SqliteBookmarkDao, SqliteFollowDao, SqliteLikeDao, SqliteMessageDao, SqliteTuitDao,
    SqliteUserDao,
};
use crate::likes::LikeToggler;

pub type DbPool = Pool<SqliteConnectionManager>;

/// Everything a handler needs, built once at startup and cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Arc<Config>,
    pub users: DynUserDao,
    pub tuits: DynTuitDao,
    pub likes: DynLikeDao,
    pub follows: DynFollowDao,
    pub bookmarks: DynBookmarkDao,
    pub messages: DynMessageDao,
    pub toggler: Arc<LikeToggler>,
}

impl AppState {
    pub fn new(db: DbPool, config: Config) -> Self {
        let users: DynUserDao = Arc::new(SqliteUserDao::new(db.clone()));
        let tuits: DynTuitDao = Arc::new(SqliteTuitDao::new(db.clone()));
        let likes: DynLikeDao = Arc::new(SqliteLikeDao::new(db.clone()));
        let toggler = Arc::new(LikeToggler::new(
            likes.clone(),
            tuits.clone(),
            users.clone(),
            config.likes.counter_policy,
        ));

        Self {
            follows: Arc::new(SqliteFollowDao::new(db.clone())),
            bookmarks: Arc::new(SqliteBookmarkDao::new(db.clone())),
            messages: Arc::new(SqliteMessageDao::new(db.clone())),
            users,
            tuits,
            likes,
            toggler,
            config: Arc::new(config),
            db,
        }
    }
}
