use super::{EditField, ErrorMessages, ItemId, Resource, ResourceConfig};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Todo record (`{id, todo, completed, userId}`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: ItemId,
    #[serde(default)]
    pub todo: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<u64>,
}

impl Resource for Todo {
    const CONFIG: ResourceConfig = ResourceConfig {
        endpoint: "todos",
        list_key: "todos",
        title: "Todos",
        messages: ErrorMessages {
            load: "Failed to fetch todos",
            add: "Failed to add todo",
            update: "Failed to update todo",
            delete: "Failed to delete todo",
            toggle: Some("Failed to change the todo status"),
        },
    };

    fn id(&self) -> ItemId {
        self.id
    }

    fn set_id(&mut self, id: ItemId) {
        self.id = id;
    }

    // New todos start open and belong to user 1, whatever the seed says
    fn from_seed(seed: &Self, id: ItemId) -> Self {
        Self {
            id,
            todo: seed.todo.clone(),
            completed: false,
            user_id: Some(1),
        }
    }

    fn create_payload(&self) -> Value {
        json!({ "todo": self.todo, "completed": false, "userId": 1 })
    }

    fn edit_fields(&self) -> Vec<EditField> {
        vec![EditField {
            label: "Edit todo",
            current: self.todo.clone(),
        }]
    }

    // Editing the text reopens the todo
    fn edit_payload(answers: &[String]) -> Value {
        json!({
            "todo": answers.first().cloned().unwrap_or_default(),
            "completed": false,
        })
    }

    fn columns() -> &'static [&'static str] {
        &["ID", "Done", "Todo"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            if self.completed { "[x]" } else { "[ ]" }.to_string(),
            self.todo.clone(),
        ]
    }

    fn completed_mut(&mut self) -> Option<&mut bool> {
        Some(&mut self.completed)
    }
}
