//! Lost/Found Storage

use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use std::sync::Arc;
use uuid::Uuid;

use crate::complaints::store::{comments_for_kind, parse_uuid, row_to_owner};
use crate::db::Database;
use crate::error::ApiResult;
use crate::lostfound::models::{LostFoundItem, LostFoundItemView};
use crate::users::models::{OwnerRef, OwnerView};

const COMMENT_KIND: &str = "lostfound";

#[derive(Clone)]
pub struct LostFoundStore {
    conn: Arc<Mutex<Connection>>,
}

impl LostFoundStore {
    pub fn new(db: &Database) -> Self {
        Self {
            conn: db.connection(),
        }
    }

    pub fn create(
        &self,
        owner_id: &Uuid,
        item_name: String,
        description: String,
        image: Option<String>,
    ) -> ApiResult<LostFoundItem> {
        let now = Utc::now().to_rfc3339();
        let item = LostFoundItem {
            id: Uuid::new_v4(),
            user_id: *owner_id,
            item_name,
            description,
            image,
            created_at: now.clone(),
            updated_at: now,
        };

        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO lostfound_items (id, user_id, item_name, description, image, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                item.id.to_string(),
                item.user_id.to_string(),
                item.item_name,
                item.description,
                item.image,
                item.created_at,
                item.updated_at,
            ],
        )?;

        Ok(item)
    }

    pub fn find(&self, id: &Uuid) -> ApiResult<Option<LostFoundItem>> {
        let conn = self.conn.lock();

        let mut stmt = conn.prepare(
            "SELECT id, user_id, item_name, description, image, created_at, updated_at
             FROM lostfound_items WHERE id = ?1",
        )?;

        match stmt.query_row(params![id.to_string()], row_to_item) {
            Ok(item) => Ok(Some(item)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list(&self) -> ApiResult<Vec<LostFoundItemView>> {
        let conn = self.conn.lock();

        let mut stmt = conn.prepare(
            "SELECT i.id, i.user_id, i.item_name, i.description, i.image,
                    i.created_at, i.updated_at, u.name, u.role
             FROM lostfound_items i JOIN users u ON u.id = i.user_id
             ORDER BY i.created_at DESC, i.rowid DESC",
        )?;

        let rows = stmt
            .query_map([], |row| Ok((row_to_item(row)?, row_to_owner(row, 7)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut views = Vec::with_capacity(rows.len());
        for (item, owner) in rows {
            let comments = comments_for_kind(&conn, COMMENT_KIND, &item.id.to_string())?;
            views.push(resolved_view(item, owner, comments));
        }

        Ok(views)
    }

    pub fn get_view(&self, id: &Uuid) -> ApiResult<Option<LostFoundItemView>> {
        let conn = self.conn.lock();

        let mut stmt = conn.prepare(
            "SELECT i.id, i.user_id, i.item_name, i.description, i.image,
                    i.created_at, i.updated_at, u.name, u.role
             FROM lostfound_items i JOIN users u ON u.id = i.user_id
             WHERE i.id = ?1",
        )?;

        let row = match stmt.query_row(params![id.to_string()], |row| {
            Ok((row_to_item(row)?, row_to_owner(row, 7)?))
        }) {
            Ok(row) => row,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let comments = comments_for_kind(&conn, COMMENT_KIND, &row.0.id.to_string())?;
        Ok(Some(resolved_view(row.0, row.1, comments)))
    }

    pub fn save(&self, item: &mut LostFoundItem) -> ApiResult<()> {
        item.updated_at = Utc::now().to_rfc3339();

        let conn = self.conn.lock();
        conn.execute(
            "UPDATE lostfound_items SET item_name = ?2, description = ?3, image = ?4, updated_at = ?5
             WHERE id = ?1",
            params![
                item.id.to_string(),
                item.item_name,
                item.description,
                item.image,
                item.updated_at,
            ],
        )?;

        Ok(())
    }

    pub fn delete(&self, id: &Uuid) -> ApiResult<()> {
        let conn = self.conn.lock();
        conn.execute(
            "DELETE FROM comments WHERE parent_kind = ?1 AND parent_id = ?2",
            params![COMMENT_KIND, id.to_string()],
        )?;
        conn.execute(
            "DELETE FROM lostfound_items WHERE id = ?1",
            params![id.to_string()],
        )?;
        Ok(())
    }
}

fn row_to_item(row: &rusqlite::Row) -> rusqlite::Result<LostFoundItem> {
    let id_str: String = row.get(0)?;
    let user_str: String = row.get(1)?;

    Ok(LostFoundItem {
        id: parse_uuid(&id_str, 0)?,
        user_id: parse_uuid(&user_str, 1)?,
        item_name: row.get(2)?,
        description: row.get(3)?,
        image: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

fn resolved_view(
    item: LostFoundItem,
    owner: OwnerView,
    comments: Vec<crate::complaints::models::CommentView>,
) -> LostFoundItemView {
    LostFoundItemView {
        id: item.id.to_string(),
        user: OwnerRef::Resolved(owner),
        item_name: item.item_name,
        description: item.description,
        image: item.image,
        comments,
        created_at: item.created_at,
        updated_at: item.updated_at,
    }
}
