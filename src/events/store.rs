//! Event Storage

use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use std::sync::Arc;
use uuid::Uuid;

use crate::complaints::store::{parse_uuid, row_to_owner};
use crate::db::Database;
use crate::error::ApiResult;
use crate::events::models::{Event, EventView};
use crate::users::models::{OwnerRef, OwnerView};

#[derive(Clone)]
pub struct EventStore {
    conn: Arc<Mutex<Connection>>,
}

impl EventStore {
    pub fn new(db: &Database) -> Self {
        Self {
            conn: db.connection(),
        }
    }

    pub fn create(
        &self,
        owner_id: &Uuid,
        title: String,
        description: Option<String>,
        poster: Option<String>,
        date: String,
        venue: String,
    ) -> ApiResult<Event> {
        let now = Utc::now().to_rfc3339();
        let event = Event {
            id: Uuid::new_v4(),
            user_id: *owner_id,
            title,
            description,
            poster,
            date,
            venue,
            created_at: now.clone(),
            updated_at: now,
        };

        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO events (id, user_id, title, description, poster, date, venue, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                event.id.to_string(),
                event.user_id.to_string(),
                event.title,
                event.description,
                event.poster,
                event.date,
                event.venue,
                event.created_at,
                event.updated_at,
            ],
        )?;

        Ok(event)
    }

    pub fn find(&self, id: &Uuid) -> ApiResult<Option<Event>> {
        let conn = self.conn.lock();

        let mut stmt = conn.prepare(
            "SELECT id, user_id, title, description, poster, date, venue, created_at, updated_at
             FROM events WHERE id = ?1",
        )?;

        match stmt.query_row(params![id.to_string()], row_to_event) {
            Ok(event) => Ok(Some(event)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All events ordered by event date descending, not creation time.
    pub fn list(&self) -> ApiResult<Vec<EventView>> {
        let conn = self.conn.lock();

        let mut stmt = conn.prepare(
            "SELECT e.id, e.user_id, e.title, e.description, e.poster, e.date, e.venue,
                    e.created_at, e.updated_at, u.name, u.role
             FROM events e JOIN users u ON u.id = e.user_id
             ORDER BY e.date DESC, e.rowid DESC",
        )?;

        let views = stmt
            .query_map([], |row| {
                Ok(resolved_view(row_to_event(row)?, row_to_owner(row, 9)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(views)
    }

    pub fn get_view(&self, id: &Uuid) -> ApiResult<Option<EventView>> {
        let conn = self.conn.lock();

        let mut stmt = conn.prepare(
            "SELECT e.id, e.user_id, e.title, e.description, e.poster, e.date, e.venue,
                    e.created_at, e.updated_at, u.name, u.role
             FROM events e JOIN users u ON u.id = e.user_id
             WHERE e.id = ?1",
        )?;

        match stmt.query_row(params![id.to_string()], |row| {
            Ok(resolved_view(row_to_event(row)?, row_to_owner(row, 9)?))
        }) {
            Ok(view) => Ok(Some(view)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, event: &mut Event) -> ApiResult<()> {
        event.updated_at = Utc::now().to_rfc3339();

        let conn = self.conn.lock();
        conn.execute(
            "UPDATE events SET title = ?2, description = ?3, poster = ?4, date = ?5, venue = ?6,
             updated_at = ?7 WHERE id = ?1",
            params![
                event.id.to_string(),
                event.title,
                event.description,
                event.poster,
                event.date,
                event.venue,
                event.updated_at,
            ],
        )?;

        Ok(())
    }

    pub fn delete(&self, id: &Uuid) -> ApiResult<()> {
        let conn = self.conn.lock();
        conn.execute("DELETE FROM events WHERE id = ?1", params![id.to_string()])?;
        Ok(())
    }
}

fn row_to_event(row: &rusqlite::Row) -> rusqlite::Result<Event> {
    let id_str: String = row.get(0)?;
    let user_str: String = row.get(1)?;

    Ok(Event {
        id: parse_uuid(&id_str, 0)?,
        user_id: parse_uuid(&user_str, 1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        poster: row.get(4)?,
        date: row.get(5)?,
        venue: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

fn resolved_view(event: Event, owner: OwnerView) -> EventView {
    EventView {
        id: event.id.to_string(),
        user: OwnerRef::Resolved(owner),
        title: event.title,
        description: event.description,
        poster: event.poster,
        date: event.date,
        venue: event.venue,
        created_at: event.created_at,
        updated_at: event.updated_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::models::parse_event_date;
    use crate::users::models::{Role, RoleDetails};
    use crate::users::store::{NewUser, UserStore};

    fn fixture() -> (EventStore, Uuid) {
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
        (EventStore::new(&db), user.id)
    }

    #[test]
    fn test_list_orders_by_event_date_not_creation() {
        let (store, owner) = fixture();

        // Created in a different order than their dates.
        for date in ["2024-01-01", "2024-06-01", "2024-03-01"] {
            store
                .create(
                    &owner,
                    format!("event {}", date),
                    None,
                    None,
                    parse_event_date(date).unwrap(),
                    "Auditorium".to_string(),
                )
                .unwrap();
        }

        let dates: Vec<_> = store
            .list()
            .unwrap()
            .into_iter()
            .map(|v| v.date[..10].to_string())
            .collect();
        assert_eq!(dates, vec!["2024-06-01", "2024-03-01", "2024-01-01"]);
    }

    #[test]
    fn test_save_and_delete() {
        let (store, owner) = fixture();
        let mut event = store
            .create(
                &owner,
                "Tech fest".to_string(),
                Some("Annual fest".to_string()),
                None,
                parse_event_date("2024-06-01").unwrap(),
                "Auditorium".to_string(),
            )
            .unwrap();

        event.venue = "Open grounds".to_string();
        store.save(&mut event).unwrap();
        assert_eq!(store.find(&event.id).unwrap().unwrap().venue, "Open grounds");

        store.delete(&event.id).unwrap();
        assert!(store.find(&event.id).unwrap().is_none());
        assert!(store.get_view(&event.id).unwrap().is_none());
    }
}
