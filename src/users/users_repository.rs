use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::get_connection;
use crate::errors::{Error, Result};
use crate::schema::users;

use super::users_model::{NewUser, User, UserDB, UserUpdate};

/// Repository for user accounts.
pub struct UserRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
}

impl UserRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    pub fn create_in_transaction(
        conn: &mut SqliteConnection,
        new_user: &NewUser,
    ) -> Result<User> {
        let now = chrono::Utc::now().naive_utc();
        let user_db = UserDB {
            id: Uuid::new_v4().to_string(),
            email: new_user.email.clone(),
            name: new_user.name.clone(),
            phone: new_user.phone.clone(),
            password_hash: new_user.password_hash.clone(),
            created_at: now,
            updated_at: now,
        };

        diesel::insert_into(users::table)
            .values(&user_db)
            .execute(conn)?;

        Ok(user_db.into())
    }

    pub fn find_by_id_in_transaction(conn: &mut SqliteConnection, user_id: &str) -> Result<User> {
        users::table
            .find(user_id)
            .select(UserDB::as_select())
            .first::<UserDB>(conn)
            .optional()?
            .map(User::from)
            .ok_or_else(|| Error::NotFound("User not found".to_string()))
    }

    pub fn get_by_id(&self, user_id: &str) -> Result<User> {
        let mut conn = get_connection(&self.pool)?;
        Self::find_by_id_in_transaction(&mut conn, user_id)
    }

    pub fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let mut conn = get_connection(&self.pool)?;
        let row = users::table
            .filter(users::email.eq(email))
            .select(UserDB::as_select())
            .first::<UserDB>(&mut conn)
            .optional()?;

        Ok(row.map(User::from))
    }

    /// Writes a profile update; `None` fields keep their current value.
    pub fn update_profile(&self, user: &User, update: &UserUpdate) -> Result<User> {
        let mut conn = get_connection(&self.pool)?;

        let name = update.name.clone().unwrap_or_else(|| user.name.clone());
        let phone = update.phone.clone().or_else(|| user.phone.clone());
        let updated_at = chrono::Utc::now().naive_utc();

        diesel::update(users::table.find(&user.id))
            .set((
                users::name.eq(&name),
                users::phone.eq(&phone),
                users::updated_at.eq(updated_at),
            ))
            .execute(&mut conn)?;

        Ok(User {
            name,
            phone,
            updated_at,
            ..user.clone()
        })
    }
}
