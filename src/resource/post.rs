use super::{EditField, ErrorMessages, ItemId, Resource, ResourceConfig};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Post record (`{id, title, body}`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: ItemId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
}

impl Resource for Post {
    const CONFIG: ResourceConfig = ResourceConfig {
        endpoint: "posts",
        list_key: "posts",
        title: "Posts",
        messages: ErrorMessages {
            load: "Failed to fetch posts",
            add: "Failed to add post",
            update: "Failed to update post",
            delete: "Failed to delete post",
            toggle: None,
        },
    };

    fn id(&self) -> ItemId {
        self.id
    }

    fn set_id(&mut self, id: ItemId) {
        self.id = id;
    }

    fn from_seed(seed: &Self, id: ItemId) -> Self {
        Self {
            id,
            title: seed.title.clone(),
            body: seed.body.clone(),
        }
    }

    // posts/add rejects bodies without a userId
    fn create_payload(&self) -> Value {
        json!({ "title": self.title, "body": self.body, "userId": 1 })
    }

    fn edit_fields(&self) -> Vec<EditField> {
        vec![
            EditField {
                label: "Edit title",
                current: self.title.clone(),
            },
            EditField {
                label: "Edit body",
                current: self.body.clone(),
            },
        ]
    }

    fn edit_payload(answers: &[String]) -> Value {
        json!({
            "title": answers.first().cloned().unwrap_or_default(),
            "body": answers.get(1).cloned().unwrap_or_default(),
        })
    }

    fn columns() -> &'static [&'static str] {
        &["ID", "Title", "Body"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.id.to_string(), self.title.clone(), self.body.clone()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_payload_pairs_answers_with_fields() {
        let post = Post {
            id: ItemId::Remote(3),
            title: "Old".into(),
            body: "Text".into(),
        };
        let labels: Vec<_> = post.edit_fields().iter().map(|f| f.label).collect();
        assert_eq!(labels, ["Edit title", "Edit body"]);

        let payload = Post::edit_payload(&["New".to_string(), "Body".to_string()]);
        assert_eq!(payload, json!({"title": "New", "body": "Body"}));
    }

    #[test]
    fn test_missing_fields_default() {
        let post: Post = serde_json::from_value(json!({"id": 251})).unwrap();
        assert_eq!(post.id, ItemId::Local(251));
        assert!(post.title.is_empty());
    }
}
