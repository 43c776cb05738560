//! Complaint Models

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::users::models::{OwnerRef, OwnerView};

/// Complaint lifecycle status. No endpoint transitions it in the current
/// scope; new complaints start `pending`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ComplaintStatus {
    Pending,
    InProgress,
    Resolved,
}

impl ComplaintStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ComplaintStatus::Pending => "pending",
            ComplaintStatus::InProgress => "in_progress",
            ComplaintStatus::Resolved => "resolved",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ComplaintStatus::Pending),
            "in_progress" => Some(ComplaintStatus::InProgress),
            "resolved" => Some(ComplaintStatus::Resolved),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Complaint {
    pub id: Uuid,
    pub user_id: Uuid,
    pub subject: String,
    pub description: String,
    pub image: Option<String>,
    pub status: ComplaintStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl Complaint {
    /// View returned straight from create: owner as raw id, no comments yet.
    pub fn created_view(&self) -> ComplaintView {
        ComplaintView {
            id: self.id.to_string(),
            user: OwnerRef::Id(self.user_id.to_string()),
            subject: self.subject.clone(),
            description: self.description.clone(),
            image: self.image.clone(),
            status: self.status,
            comments: Vec::new(),
            created_at: self.created_at.clone(),
            updated_at: self.updated_at.clone(),
        }
    }
}

/// A comment with its commenter resolved to a name/role projection. `name`
/// is the denormalized display name captured at comment time.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub user: OwnerView,
    pub name: String,
    pub text: String,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintView {
    pub id: String,
    pub user: OwnerRef,
    pub subject: String,
    pub description: String,
    pub image: Option<String>,
    pub status: ComplaintStatus,
    pub comments: Vec<CommentView>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct AddCommentRequest {
    pub text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&ComplaintStatus::Pending).unwrap(),
            r#""pending""#
        );
        assert_eq!(
            serde_json::to_string(&ComplaintStatus::InProgress).unwrap(),
            r#""in_progress""#
        );
        assert_eq!(ComplaintStatus::from_str("resolved"), Some(ComplaintStatus::Resolved));
        assert_eq!(ComplaintStatus::from_str("closed"), None);
    }

    #[test]
    fn test_created_view_uses_raw_owner_id() {
        let complaint = Complaint {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            subject: "Broken light".to_string(),
            description: "Hallway light out".to_string(),
            image: None,
            status: ComplaintStatus::Pending,
            created_at: "2025-01-01T00:00:00+00:00".to_string(),
            updated_at: "2025-01-01T00:00:00+00:00".to_string(),
        };

        let json = serde_json::to_value(complaint.created_view()).unwrap();
        assert_eq!(json["user"], complaint.user_id.to_string());
        assert_eq!(json["status"], "pending");
        assert_eq!(json["comments"], serde_json::json!([]));
    }
}
