use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::types::Type;
use rusqlite::{params, OptionalExtension, Row};

use crate::dao::{is_unique_violation, new_id, DaoError, DaoResult};
use crate::db::models::{
    DeleteStatus, Location, NewUser, UnknownVariant, UpdateStatus, User,
};
use crate::state::DbPool;

#[async_trait]
pub trait UserDao: Send + Sync {
    async fn find_all_users(&self) -> DaoResult<Vec<User>>;

    async fn find_user_by_id(&self, uid: &str) -> DaoResult<User>;

    async fn find_user_by_username(&self, username: &str) -> DaoResult<Option<User>>;

    /// Store a new user. The caller hashes the password; a taken username is a Conflict.
    async fn create_user(&self, user: &NewUser, password_hash: &str) -> DaoResult<User>;

    /// Overwrite every profile field of an existing user. The stored password hash
    /// is kept when `password_hash` is `None`.
    async fn update_user(
        &self,
        uid: &str,
        user: &NewUser,
        password_hash: Option<&str>,
    ) -> DaoResult<UpdateStatus>;

    async fn delete_user(&self, uid: &str) -> DaoResult<DeleteStatus>;

    async fn delete_users_by_username(&self, username: &str) -> DaoResult<DeleteStatus>;
}

pub type DynUserDao = Arc<dyn UserDao>;

const USER_COLUMNS: &str = "id, username, password_hash, email, first_name, last_name, \
     profile_photo, header_image, account_type, marital_status, biography, date_of_birth, \
     joined, latitude, longitude";

/// Parse a stored enum column, surfacing unknown values as a conversion failure.
fn parse_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = UnknownVariant>,
{
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    let latitude: Option<f64> = row.get(13)?;
    let longitude: Option<f64> = row.get(14)?;

    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
        email: row.get(3)?,
        first_name: row.get(4)?,
        last_name: row.get(5)?,
        profile_photo: row.get(6)?,
        header_image: row.get(7)?,
        account_type: parse_column(row, 8)?,
        marital_status: parse_column(row, 9)?,
        biography: row.get(10)?,
        date_of_birth: row.get(11)?,
        joined: row.get(12)?,
        location: latitude
            .zip(longitude)
            .map(|(latitude, longitude)| Location {
                latitude,
                longitude,
            }),
    })
}

pub struct SqliteUserDao {
    pool: DbPool,
}

impl SqliteUserDao {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDao for SqliteUserDao {
    async fn find_all_users(&self) -> DaoResult<Vec<User>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY joined ASC"
        ))?;
        let users = stmt
            .query_map([], user_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    async fn find_user_by_id(&self, uid: &str) -> DaoResult<User> {
        let conn = self.pool.get()?;
        conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            params![uid],
            user_from_row,
        )
        .optional()?
        .ok_or_else(|| DaoError::NotFound(format!("user {uid}")))
    }

    async fn find_user_by_username(&self, username: &str) -> DaoResult<Option<User>> {
        let conn = self.pool.get()?;
        let user = conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"),
                params![username],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    async fn create_user(&self, user: &NewUser, password_hash: &str) -> DaoResult<User> {
        if self.find_user_by_username(&user.username).await?.is_some() {
            return Err(DaoError::Conflict(format!(
                "username {} is taken",
                user.username
            )));
        }

        let id = new_id();
        let conn = self.pool.get()?;
        let inserted = conn.execute(
            "INSERT INTO users (id, username, password_hash, email, first_name, last_name,
                profile_photo, header_image, account_type, marital_status, biography,
                date_of_birth, joined, latitude, longitude)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            params![
                id,
                user.username,
                password_hash,
                user.email,
                user.first_name,
                user.last_name,
                user.profile_photo,
                user.header_image,
                user.account_type.as_str(),
                user.marital_status.as_str(),
                user.biography,
                user.date_of_birth,
                Utc::now(),
                user.location.map(|l| l.latitude),
                user.location.map(|l| l.longitude),
            ],
        );

        match inserted {
            Ok(_) => {}
            // Lost a race with another signup between the pre-check and the insert
            Err(e) if is_unique_violation(&e) => {
                return Err(DaoError::Conflict(format!(
                    "username {} is taken",
                    user.username
                )))
            }
            Err(e) => return Err(e.into()),
        }

        drop(conn);
        tracing::debug!(user_id = %id, username = %user.username, "created user");
        self.find_user_by_id(&id).await
    }

    async fn update_user(
        &self,
        uid: &str,
        user: &NewUser,
        password_hash: Option<&str>,
    ) -> DaoResult<UpdateStatus> {
        let conn = self.pool.get()?;
        let matched: i64 = conn.query_row(
            "SELECT COUNT(*) FROM users WHERE id = ?1",
            params![uid],
            |row| row.get(0),
        )?;

        // Only rows whose stored values differ count as modified
        let modified = conn
            .execute(
                "UPDATE users SET username = ?2, password_hash = COALESCE(?3, password_hash),
                    email = ?4, first_name = ?5, last_name = ?6, profile_photo = ?7,
                    header_image = ?8, account_type = ?9, marital_status = ?10,
                    biography = ?11, date_of_birth = ?12, latitude = ?13, longitude = ?14
                 WHERE id = ?1 AND (
                    username IS NOT ?2 OR COALESCE(?3, password_hash) IS NOT password_hash
                    OR email IS NOT ?4 OR first_name IS NOT ?5 OR last_name IS NOT ?6
                    OR profile_photo IS NOT ?7 OR header_image IS NOT ?8
                    OR account_type IS NOT ?9 OR marital_status IS NOT ?10
                    OR biography IS NOT ?11 OR date_of_birth IS NOT ?12
                    OR latitude IS NOT ?13 OR longitude IS NOT ?14)",
                params![
                    uid,
                    user.username,
                    password_hash,
                    user.email,
                    user.first_name,
                    user.last_name,
                    user.profile_photo,
                    user.header_image,
                    user.account_type.as_str(),
                    user.marital_status.as_str(),
                    user.biography,
                    user.date_of_birth,
                    user.location.map(|l| l.latitude),
                    user.location.map(|l| l.longitude),
                ],
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    DaoError::Conflict(format!("username {} is taken", user.username))
                } else {
                    e.into()
                }
            })?;

        Ok(UpdateStatus::new(matched as usize, modified))
    }

    async fn delete_user(&self, uid: &str) -> DaoResult<DeleteStatus> {
        let conn = self.pool.get()?;
        let rows = conn.execute("DELETE FROM users WHERE id = ?1", params![uid])?;
        Ok(DeleteStatus::from_rows(rows))
    }

    async fn delete_users_by_username(&self, username: &str) -> DaoResult<DeleteStatus> {
        let conn = self.pool.get()?;
        let rows = conn.execute("DELETE FROM users WHERE username = ?1", params![username])?;
        Ok(DeleteStatus::from_rows(rows))
    }
}
