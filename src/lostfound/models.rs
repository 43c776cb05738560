//! Lost/Found Models

use serde::Serialize;
use uuid::Uuid;

use crate::complaints::models::CommentView;
use crate::users::models::OwnerRef;

#[derive(Debug, Clone)]
pub struct LostFoundItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub item_name: String,
    pub description: String,
    pub image: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl LostFoundItem {
    pub fn created_view(&self) -> LostFoundItemView {
        LostFoundItemView {
            id: self.id.to_string(),
            user: OwnerRef::Id(self.user_id.to_string()),
            item_name: self.item_name.clone(),
            description: self.description.clone(),
            image: self.image.clone(),
            comments: Vec::new(),
            created_at: self.created_at.clone(),
            updated_at: self.updated_at.clone(),
        }
    }
}

/// Comments are part of the shape but nothing writes them for lost/found
/// items; the list is always read back empty.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LostFoundItemView {
    pub id: String,
    pub user: OwnerRef,
    pub item_name: String,
    pub description: String,
    pub image: Option<String>,
    pub comments: Vec<CommentView>,
    pub created_at: String,
    pub updated_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_created_view_shape() {
        let item = LostFoundItem {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            item_name: "Blue backpack".to_string(),
            description: "Left in the library".to_string(),
            image: Some("/uploads/abc.jpg".to_string()),
            created_at: "2025-01-01T00:00:00+00:00".to_string(),
            updated_at: "2025-01-01T00:00:00+00:00".to_string(),
        };

        let json = serde_json::to_value(item.created_view()).unwrap();
        assert_eq!(json["itemName"], "Blue backpack");
        assert_eq!(json["user"], item.user_id.to_string());
        assert_eq!(json["image"], "/uploads/abc.jpg");
        assert_eq!(json["comments"], serde_json::json!([]));
    }
}
