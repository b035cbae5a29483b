//! User accounts

use super::deadline::{bounded, QueryCost};
use super::models::{NewUser, ProfileUpdate, Role, User, UserSummary};
use super::store::Store;
use crate::{Error, Result};
use tracing::info;
use uuid::Uuid;

const USER_COLUMNS: &str = "id, name, email, password_hash, created_at, course, faculty, \
                            year_joined, bio, avatar_url, role";

/// Maximum number of users returned by [`Store::search_users`]
pub const USER_SEARCH_LIMIT: i64 = 10;

impl Store {
    /// Create a user; a taken email yields [`Error::Conflict`]
    pub async fn create_user(&self, new_user: NewUser) -> Result<User> {
        let user = User {
            id: Uuid::new_v4(),
            name: new_user.name,
            email: new_user.email.trim().to_lowercase(),
            password_hash: new_user.password_hash,
            created_at: crate::time::now(),
            course: String::new(),
            faculty: String::new(),
            year_joined: String::new(),
            bio: String::new(),
            avatar_url: String::new(),
            role: Role::User,
        };

        let inserted = bounded(
            QueryCost::Point,
            "create_user",
            sqlx::query(
                "INSERT INTO users (id, name, email, password_hash, created_at, role) \
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(user.id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.created_at)
            .bind(user.role)
            .execute(self.pool()),
        )
        .await;

        match inserted {
            Ok(_) => {
                info!(user_id = %user.id, "Created user");
                Ok(user)
            }
            Err(Error::Database(e)) if Error::is_unique_violation(&e) => {
                Err(Error::Conflict("Email already registered".to_string()))
            }
            Err(e) => Err(e),
        }
    }

    pub async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS);
        bounded(
            QueryCost::Point,
            "find_user_by_id",
            sqlx::query_as::<_, User>(&sql).bind(id).fetch_optional(self.pool()),
        )
        .await
    }

    /// Lookup by email, case-insensitively
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE email = ?", USER_COLUMNS);
        bounded(
            QueryCost::Point,
            "find_user_by_email",
            sqlx::query_as::<_, User>(&sql)
                .bind(email.trim().to_lowercase())
                .fetch_optional(self.pool()),
        )
        .await
    }

    /// Apply owner-editable profile fields
    pub async fn update_profile(&self, id: Uuid, update: &ProfileUpdate) -> Result<()> {
        let result = bounded(
            QueryCost::Point,
            "update_profile",
            sqlx::query(
                "UPDATE users SET name = ?, course = ?, faculty = ?, bio = ?, \
                 year_joined = COALESCE(?, year_joined) WHERE id = ?",
            )
            .bind(&update.name)
            .bind(&update.course)
            .bind(&update.faculty)
            .bind(&update.bio)
            .bind(update.year_joined.as_deref())
            .bind(id)
            .execute(self.pool()),
        )
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("User {}", id)));
        }
        Ok(())
    }

    pub async fn update_avatar(&self, id: Uuid, avatar_url: &str) -> Result<()> {
        let result = bounded(
            QueryCost::Point,
            "update_avatar",
            sqlx::query("UPDATE users SET avatar_url = ? WHERE id = ?")
                .bind(avatar_url)
                .bind(id)
                .execute(self.pool()),
        )
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("User {}", id)));
        }
        Ok(())
    }

    /// Change a user's role, addressed by email
    pub async fn set_user_role(&self, email: &str, role: Role) -> Result<()> {
        let result = bounded(
            QueryCost::Point,
            "set_user_role",
            sqlx::query("UPDATE users SET role = ? WHERE email = ?")
                .bind(role)
                .bind(email.trim().to_lowercase())
                .execute(self.pool()),
        )
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("User {}", email)));
        }
        info!(email = %email, role = ?role, "Updated user role");
        Ok(())
    }

    /// Users whose name or email contains `query` (case-insensitive), excluding `exclude`
    pub async fn search_users(&self, query: &str, exclude: Uuid) -> Result<Vec<UserSummary>> {
        let pattern = format!("%{}%", escape_like(&query.to_lowercase()));
        bounded(
            QueryCost::List,
            "search_users",
            sqlx::query_as::<_, UserSummary>(
                "SELECT id, name, email, avatar_url FROM users \
                 WHERE id <> ? AND (lower(name) LIKE ? ESCAPE '\\' OR lower(email) LIKE ? ESCAPE '\\') \
                 ORDER BY name LIMIT ?",
            )
            .bind(exclude)
            .bind(&pattern)
            .bind(&pattern)
            .bind(USER_SEARCH_LIMIT)
            .fetch_all(self.pool()),
        )
        .await
    }
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
