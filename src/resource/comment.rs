use super::{EditField, ErrorMessages, ItemId, Resource, ResourceConfig};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Comment record (`{id, body, postId}`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: ItemId,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub post_id: u64,
}

impl Resource for Comment {
    const CONFIG: ResourceConfig = ResourceConfig {
        endpoint: "comments",
        list_key: "comments",
        title: "Comments",
        messages: ErrorMessages {
            load: "Failed to fetch comments",
            add: "Failed to add comment",
            update: "Failed to update comment",
            delete: "Failed to delete comment",
            toggle: None,
        },
    };

    fn id(&self) -> ItemId {
        self.id
    }

    fn set_id(&mut self, id: ItemId) {
        self.id = id;
    }

    // New comments are always filed under post 1
    fn from_seed(seed: &Self, id: ItemId) -> Self {
        Self {
            id,
            body: seed.body.clone(),
            post_id: 1,
        }
    }

    fn create_payload(&self) -> Value {
        json!({ "body": self.body, "postId": 1, "userId": 1 })
    }

    fn edit_fields(&self) -> Vec<EditField> {
        vec![EditField {
            label: "Edit comment",
            current: self.body.clone(),
        }]
    }

    fn edit_payload(answers: &[String]) -> Value {
        json!({ "body": answers.first().cloned().unwrap_or_default() })
    }

    fn columns() -> &'static [&'static str] {
        &["ID", "Post", "Comment"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.post_id.to_string(),
            self.body.clone(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_upstream_shape() {
        let comment: Comment = serde_json::from_value(json!({
            "id": 1,
            "body": "This is some awesome thinking!",
            "postId": 242,
            "likes": 3,
            "user": {"id": 105, "username": "emmac"}
        }))
        .unwrap();
        assert_eq!(comment.id, ItemId::Remote(1));
        assert_eq!(comment.post_id, 242);
    }

    #[test]
    fn test_seed_resets_post() {
        let seed = Comment {
            id: ItemId::Remote(4),
            body: "Nice".into(),
            post_id: 99,
        };
        let local = Comment::from_seed(&seed, ItemId::Local(1_700_000_000_000));
        assert_eq!(local.post_id, 1);
        assert_eq!(local.body, "Nice");
        assert_eq!(
            local.create_payload(),
            json!({"body": "Nice", "postId": 1, "userId": 1})
        );
    }
}
