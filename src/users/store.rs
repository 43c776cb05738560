//! User Storage
//! Mission: Persist user accounts; passwords only ever leave here hashed

use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::db::Database;
use crate::error::{ApiError, ApiResult};
use crate::users::models::{Role, RoleDetails, User};

/// The single hashing function every password write path routes through.
pub fn hash_password(plain: &str) -> ApiResult<String> {
    use anyhow::Context;
    Ok(bcrypt::hash(plain, bcrypt::DEFAULT_COST).context("Failed to hash password")?)
}

/// Fields required to create a user. The password arrives plaintext and is
/// hashed inside `create`.
pub struct NewUser {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: String,
    pub role: Role,
    pub details: RoleDetails,
}

#[derive(Clone)]
pub struct UserStore {
    conn: Arc<Mutex<Connection>>,
}

impl UserStore {
    pub fn new(db: &Database) -> Self {
        Self {
            conn: db.connection(),
        }
    }

    /// Create a new user. Duplicate email/phone surfaces as `Conflict`.
    pub fn create(&self, new: NewUser) -> ApiResult<User> {
        let password_hash = hash_password(&new.password)?;
        let now = Utc::now().to_rfc3339();

        let user = User {
            id: Uuid::new_v4(),
            name: new.name,
            email: new.email.map(normalize_email),
            phone: new.phone,
            password_hash,
            role: new.role,
            is_verified: false,
            details: new.details,
            additional_details: None,
            created_at: now.clone(),
            updated_at: now,
        };

        let details_json = encode_details(&user.details)?;

        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO users
             (id, name, email, phone, password_hash, role, is_verified, details_json,
              additional_details, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                user.id.to_string(),
                user.name,
                user.email,
                user.phone,
                user.password_hash,
                user.role.as_str(),
                user.is_verified,
                details_json,
                user.additional_details,
                user.created_at,
                user.updated_at,
            ],
        )?;

        info!(
            "✅ Created user: {} ({})",
            user.email.as_deref().unwrap_or(&user.name),
            user.role.as_str()
        );

        Ok(user)
    }

    pub fn find_by_email(&self, email: &str) -> ApiResult<Option<User>> {
        let email = normalize_email(email.to_string());
        let conn = self.conn.lock();

        let mut stmt = conn
            .prepare(&format!("{} WHERE email = ?1", SELECT_USER))
            .map_err(ApiError::from)?;

        match stmt.query_row(params![email], row_to_user) {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn find_by_id(&self, id: &Uuid) -> ApiResult<Option<User>> {
        let conn = self.conn.lock();

        let mut stmt = conn
            .prepare(&format!("{} WHERE id = ?1", SELECT_USER))
            .map_err(ApiError::from)?;

        match stmt.query_row(params![id.to_string()], row_to_user) {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Persist mutations to an existing user and bump `updated_at`.
    pub fn save(&self, user: &mut User) -> ApiResult<()> {
        user.updated_at = Utc::now().to_rfc3339();
        user.email = user.email.take().map(normalize_email);
        let details_json = encode_details(&user.details)?;

        let conn = self.conn.lock();
        conn.execute(
            "UPDATE users SET name = ?2, email = ?3, phone = ?4, password_hash = ?5,
             role = ?6, is_verified = ?7, details_json = ?8, additional_details = ?9,
             updated_at = ?10
             WHERE id = ?1",
            params![
                user.id.to_string(),
                user.name,
                user.email,
                user.phone,
                user.password_hash,
                user.role.as_str(),
                user.is_verified,
                details_json,
                user.additional_details,
                user.updated_at,
            ],
        )?;

        Ok(())
    }

}

const SELECT_USER: &str = "SELECT id, name, email, phone, password_hash, role, is_verified,
     details_json, additional_details, created_at, updated_at FROM users";

fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
    let id_str: String = row.get(0)?;
    let id = Uuid::parse_str(&id_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let role_str: String = row.get(5)?;
    let role = Role::from_str(&role_str).unwrap_or(Role::Student);
    let details_json: String = row.get(7)?;
    let details = serde_json::from_str(&details_json)
        .unwrap_or_else(|_| RoleDetails::rebuild(role, None, None, None, None));

    Ok(User {
        id,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        password_hash: row.get(4)?,
        role,
        is_verified: row.get(6)?,
        details,
        additional_details: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

fn encode_details(details: &RoleDetails) -> ApiResult<String> {
    use anyhow::Context;
    Ok(serde_json::to_string(details).context("Failed to encode role details")?)
}

fn normalize_email(email: String) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::models::StudentDetails;

    fn test_store() -> UserStore {
        let db = Database::open_in_memory().unwrap();
        UserStore::new(&db)
    }

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "New User".to_string(),
            email: Some(email.to_string()),
            phone: None,
            password: "tempPassword123".to_string(),
            role: Role::Student,
            details: RoleDetails::Student(StudentDetails::default()),
        }
    }

    #[test]
    fn test_password_is_hashed_on_create() {
        let store = test_store();
        let user = store.create(new_user("alice@example.com")).unwrap();

        assert_ne!(user.password_hash, "tempPassword123");
        assert!(user.password_hash.starts_with("$2"));
        assert!(bcrypt::verify("tempPassword123", &user.password_hash).unwrap());
    }

    #[test]
    fn test_duplicate_email_is_conflict() {
        let store = test_store();
        store.create(new_user("alice@example.com")).unwrap();

        match store.create(new_user("alice@example.com")) {
            Err(ApiError::Conflict(_)) => {}
            other => panic!("expected Conflict, got {:?}", other.map(|u| u.id)),
        }
    }

    #[test]
    fn test_duplicate_phone_is_conflict() {
        let store = test_store();
        let mut first = new_user("a@example.com");
        first.phone = Some("9876543210".to_string());
        store.create(first).unwrap();

        let mut second = new_user("b@example.com");
        second.phone = Some("9876543210".to_string());
        match store.create(second) {
            Err(ApiError::Conflict(_)) => {}
            other => panic!("expected Conflict, got {:?}", other.map(|u| u.id)),
        }
    }

    #[test]
    fn test_email_lookup_is_case_insensitive() {
        let store = test_store();
        store.create(new_user("Alice@Example.COM")).unwrap();

        let found = store.find_by_email("alice@example.com").unwrap();
        assert!(found.is_some());
        assert_eq!(found.unwrap().email.as_deref(), Some("alice@example.com"));

        assert!(store.find_by_email("ALICE@example.com").unwrap().is_some());
        assert!(store.find_by_email("bob@example.com").unwrap().is_none());
    }

    #[test]
    fn test_save_roundtrip() {
        let store = test_store();
        let mut user = store.create(new_user("alice@example.com")).unwrap();

        user.name = "Alice".to_string();
        user.role = Role::TeachingStaff;
        user.details = RoleDetails::rebuild(Role::TeachingStaff, None, None, None, None);
        store.save(&mut user).unwrap();

        let reloaded = store.find_by_id(&user.id).unwrap().unwrap();
        assert_eq!(reloaded.name, "Alice");
        assert_eq!(reloaded.role, Role::TeachingStaff);
        assert_eq!(reloaded.details, user.details);
    }

    #[test]
    fn test_find_by_unknown_id_is_none() {
        let store = test_store();
        store.create(new_user("alice@example.com")).unwrap();

        assert!(store.find_by_id(&Uuid::new_v4()).unwrap().is_none());
    }
}
