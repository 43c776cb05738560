//! Complaint Storage

use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use std::sync::Arc;
use uuid::Uuid;

use crate::complaints::models::{Complaint, ComplaintStatus, ComplaintView, CommentView};
use crate::db::Database;
use crate::error::ApiResult;
use crate::users::models::{OwnerRef, OwnerView, Role};

const COMMENT_KIND: &str = "complaint";

#[derive(Clone)]
pub struct ComplaintStore {
    conn: Arc<Mutex<Connection>>,
}

impl ComplaintStore {
    pub fn new(db: &Database) -> Self {
        Self {
            conn: db.connection(),
        }
    }

    pub fn create(
        &self,
        owner_id: &Uuid,
        subject: String,
        description: String,
        image: Option<String>,
    ) -> ApiResult<Complaint> {
        let now = Utc::now().to_rfc3339();
        let complaint = Complaint {
            id: Uuid::new_v4(),
            user_id: *owner_id,
            subject,
            description,
            image,
            status: ComplaintStatus::Pending,
            created_at: now.clone(),
            updated_at: now,
        };

        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO complaints (id, user_id, subject, description, image, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                complaint.id.to_string(),
                complaint.user_id.to_string(),
                complaint.subject,
                complaint.description,
                complaint.image,
                complaint.status.as_str(),
                complaint.created_at,
                complaint.updated_at,
            ],
        )?;

        Ok(complaint)
    }

    /// Raw row lookup used for ownership checks before mutation.
    pub fn find(&self, id: &Uuid) -> ApiResult<Option<Complaint>> {
        let conn = self.conn.lock();

        let mut stmt = conn.prepare(
            "SELECT id, user_id, subject, description, image, status, created_at, updated_at
             FROM complaints WHERE id = ?1",
        )?;

        match stmt.query_row(params![id.to_string()], row_to_complaint) {
            Ok(complaint) => Ok(Some(complaint)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All complaints, newest first, owner and commenters resolved.
    pub fn list(&self) -> ApiResult<Vec<ComplaintView>> {
        let conn = self.conn.lock();

        let mut stmt = conn.prepare(
            "SELECT c.id, c.user_id, c.subject, c.description, c.image, c.status,
                    c.created_at, c.updated_at, u.name, u.role
             FROM complaints c JOIN users u ON u.id = c.user_id
             ORDER BY c.created_at DESC, c.rowid DESC",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok((row_to_complaint(row)?, row_to_owner(row, 8)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut views = Vec::with_capacity(rows.len());
        for (complaint, owner) in rows {
            let comments = comments_for(&conn, &complaint.id.to_string())?;
            views.push(resolved_view(complaint, owner, comments));
        }

        Ok(views)
    }

    pub fn get_view(&self, id: &Uuid) -> ApiResult<Option<ComplaintView>> {
        let conn = self.conn.lock();

        let mut stmt = conn.prepare(
            "SELECT c.id, c.user_id, c.subject, c.description, c.image, c.status,
                    c.created_at, c.updated_at, u.name, u.role
             FROM complaints c JOIN users u ON u.id = c.user_id
             WHERE c.id = ?1",
        )?;

        let row = match stmt.query_row(params![id.to_string()], |row| {
            Ok((row_to_complaint(row)?, row_to_owner(row, 8)?))
        }) {
            Ok(row) => row,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let comments = comments_for(&conn, &row.0.id.to_string())?;
        Ok(Some(resolved_view(row.0, row.1, comments)))
    }

    pub fn save(&self, complaint: &mut Complaint) -> ApiResult<()> {
        complaint.updated_at = Utc::now().to_rfc3339();

        let conn = self.conn.lock();
        conn.execute(
            "UPDATE complaints SET subject = ?2, description = ?3, image = ?4, status = ?5,
             updated_at = ?6 WHERE id = ?1",
            params![
                complaint.id.to_string(),
                complaint.subject,
                complaint.description,
                complaint.image,
                complaint.status.as_str(),
                complaint.updated_at,
            ],
        )?;

        Ok(())
    }

    /// Hard delete; comments go with the complaint.
    pub fn delete(&self, id: &Uuid) -> ApiResult<()> {
        let conn = self.conn.lock();
        conn.execute(
            "DELETE FROM comments WHERE parent_kind = ?1 AND parent_id = ?2",
            params![COMMENT_KIND, id.to_string()],
        )?;
        conn.execute("DELETE FROM complaints WHERE id = ?1", params![id.to_string()])?;
        Ok(())
    }

    /// Append a comment, capturing the commenter's display name as it is now.
    pub fn add_comment(
        &self,
        complaint_id: &Uuid,
        commenter_id: &Uuid,
        commenter_name: &str,
        text: &str,
    ) -> ApiResult<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO comments (id, parent_kind, parent_id, user_id, name, text, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                Uuid::new_v4().to_string(),
                COMMENT_KIND,
                complaint_id.to_string(),
                commenter_id.to_string(),
                commenter_name,
                text,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }
}

fn row_to_complaint(row: &rusqlite::Row) -> rusqlite::Result<Complaint> {
    let id_str: String = row.get(0)?;
    let user_str: String = row.get(1)?;
    let status_str: String = row.get(5)?;

    Ok(Complaint {
        id: parse_uuid(&id_str, 0)?,
        user_id: parse_uuid(&user_str, 1)?,
        subject: row.get(2)?,
        description: row.get(3)?,
        image: row.get(4)?,
        status: ComplaintStatus::from_str(&status_str).unwrap_or(ComplaintStatus::Pending),
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

pub(crate) fn row_to_owner(row: &rusqlite::Row, offset: usize) -> rusqlite::Result<OwnerView> {
    let role_str: String = row.get(offset + 1)?;
    Ok(OwnerView {
        name: row.get(offset)?,
        role: Role::from_str(&role_str).unwrap_or(Role::Student),
    })
}

pub(crate) fn parse_uuid(s: &str, col: usize) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(col, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Comments for one parent, insertion order, commenter resolved.
pub(crate) fn comments_for(conn: &Connection, parent_id: &str) -> ApiResult<Vec<CommentView>> {
    comments_for_kind(conn, COMMENT_KIND, parent_id)
}

pub(crate) fn comments_for_kind(
    conn: &Connection,
    kind: &str,
    parent_id: &str,
) -> ApiResult<Vec<CommentView>> {
    let mut stmt = conn.prepare(
        "SELECT c.name, c.text, c.created_at, u.name, u.role
         FROM comments c JOIN users u ON u.id = c.user_id
         WHERE c.parent_kind = ?1 AND c.parent_id = ?2
         ORDER BY c.rowid",
    )?;

    let comments = stmt
        .query_map(params![kind, parent_id], |row| {
            Ok(CommentView {
                user: row_to_owner(row, 3)?,
                name: row.get(0)?,
                text: row.get(1)?,
                created_at: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(comments)
}

fn resolved_view(complaint: Complaint, owner: OwnerView, comments: Vec<CommentView>) -> ComplaintView {
    ComplaintView {
        id: complaint.id.to_string(),
        user: OwnerRef::Resolved(owner),
        subject: complaint.subject,
        description: complaint.description,
        image: complaint.image,
        status: complaint.status,
        comments,
        created_at: complaint.created_at,
        updated_at: complaint.updated_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::models::RoleDetails;
    use crate::users::store::{NewUser, UserStore};

    fn fixture() -> (ComplaintStore, UserStore, Uuid) {
        let db = Database::open_in_memory().unwrap();
        let users = UserStore::new(&db);
        let user = users
            .create(NewUser {
                name: "Alice".to_string(),
                email: Some("alice@example.com".to_string()),
                phone: None,
                password: "pw".to_string(),
                role: Role::Student,
                details: RoleDetails::rebuild(Role::Student, None, None, None, None),
            })
            .unwrap();
        (ComplaintStore::new(&db), users, user.id)
    }

    #[test]
    fn test_create_and_get_resolves_owner() {
        let (store, _users, owner) = fixture();

        let complaint = store
            .create(&owner, "Broken light".to_string(), "Hallway light out".to_string(), None)
            .unwrap();
        assert_eq!(complaint.status, ComplaintStatus::Pending);

        let view = store.get_view(&complaint.id).unwrap().unwrap();
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["user"]["name"], "Alice");
        assert_eq!(json["user"]["role"], "student");
    }

    #[test]
    fn test_list_is_newest_first() {
        let (store, _users, owner) = fixture();

        for subject in ["first", "second", "third"] {
            store
                .create(&owner, subject.to_string(), "desc".to_string(), None)
                .unwrap();
        }

        let views = store.list().unwrap();
        let subjects: Vec<_> = views.iter().map(|v| v.subject.as_str()).collect();
        assert_eq!(subjects, vec!["third", "second", "first"]);
    }

    #[test]
    fn test_comments_preserve_insertion_order() {
        let (store, _users, owner) = fixture();
        let complaint = store
            .create(&owner, "s".to_string(), "d".to_string(), None)
            .unwrap();

        for text in ["one", "two", "three"] {
            store
                .add_comment(&complaint.id, &owner, "Alice", text)
                .unwrap();
        }

        let view = store.get_view(&complaint.id).unwrap().unwrap();
        let texts: Vec<_> = view.comments.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
        assert_eq!(view.comments[0].user.name, "Alice");
    }

    #[test]
    fn test_delete_removes_complaint_and_comments() {
        let (store, _users, owner) = fixture();
        let complaint = store
            .create(&owner, "s".to_string(), "d".to_string(), None)
            .unwrap();
        store
            .add_comment(&complaint.id, &owner, "Alice", "gone soon")
            .unwrap();

        store.delete(&complaint.id).unwrap();

        assert!(store.find(&complaint.id).unwrap().is_none());
        let conn = store.conn.lock();
        let leftover: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM comments WHERE parent_id = ?1",
                params![complaint.id.to_string()],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(leftover, 0);
    }
}
