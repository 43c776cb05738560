//! Event Models

use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::users::models::OwnerRef;

#[derive(Debug, Clone)]
pub struct Event {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub poster: Option<String>,
    pub date: String,
    pub venue: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Event {
    pub fn created_view(&self) -> EventView {
        EventView {
            id: self.id.to_string(),
            user: OwnerRef::Id(self.user_id.to_string()),
            title: self.title.clone(),
            description: self.description.clone(),
            poster: self.poster.clone(),
            date: self.date.clone(),
            venue: self.venue.clone(),
            created_at: self.created_at.clone(),
            updated_at: self.updated_at.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventView {
    pub id: String,
    pub user: OwnerRef,
    pub title: String,
    pub description: Option<String>,
    pub poster: Option<String>,
    pub date: String,
    pub venue: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Event patch; update is JSON-only (no poster file replacement), but the
/// poster path string itself may be patched.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub poster: Option<String>,
    pub date: Option<String>,
    pub venue: Option<String>,
}

/// Parse a submitted event date (RFC 3339 or plain `YYYY-MM-DD`) and
/// normalize to UTC RFC 3339 so stored values order lexicographically.
pub fn parse_event_date(raw: &str) -> Option<String> {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc).to_rfc3339());
    }
    if let Ok(d) = chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let midnight = d.and_hms_opt(0, 0, 0)?;
        return Some(Utc.from_utc_datetime(&midnight).to_rfc3339());
    }
    None
}
