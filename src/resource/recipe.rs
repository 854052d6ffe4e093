use super::{EditField, ErrorMessages, ItemId, Resource, ResourceConfig};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};

/// Recipe record (`{id, name, ingredients}`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: ItemId,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "list_or_csv")]
    pub ingredients: Vec<String>,
}

/// Upstream sends a list; older payloads and user edits use one CSV string
fn list_or_csv<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        List(Vec<String>),
        Csv(String),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::List(items) => items,
        Raw::Csv(text) => split_csv(&text),
    })
}

fn split_csv(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl Resource for Recipe {
    const CONFIG: ResourceConfig = ResourceConfig {
        endpoint: "recipes",
        list_key: "recipes",
        title: "Recipes",
        messages: ErrorMessages {
            load: "Failed to fetch recipes",
            add: "Failed to add recipe",
            update: "Failed to update recipe",
            delete: "Failed to remove recipe",
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
            name: seed.name.clone(),
            ingredients: seed.ingredients.clone(),
        }
    }

    fn create_payload(&self) -> Value {
        json!({ "name": self.name, "ingredients": self.ingredients })
    }

    fn edit_fields(&self) -> Vec<EditField> {
        vec![
            EditField {
                label: "Edit name",
                current: self.name.clone(),
            },
            EditField {
                label: "Edit ingredients (comma separated)",
                current: self.ingredients.join(", "),
            },
        ]
    }

    fn edit_payload(answers: &[String]) -> Value {
        let ingredients = answers.get(1).map(|s| split_csv(s)).unwrap_or_default();
        json!({
            "name": answers.first().cloned().unwrap_or_default(),
            "ingredients": ingredients,
        })
    }

    fn columns() -> &'static [&'static str] {
        &["ID", "Name", "Ingredients"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.ingredients.join(", "),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingredients_accept_list_or_string() {
        let from_list: Recipe = serde_json::from_value(json!({
            "id": 1,
            "name": "Classic Margherita Pizza",
            "ingredients": ["Pizza dough", "Tomato sauce"],
            "cuisine": "Italian"
        }))
        .unwrap();
        let from_csv: Recipe = serde_json::from_value(json!({
            "id": 1,
            "name": "Classic Margherita Pizza",
            "ingredients": "Pizza dough, Tomato sauce,"
        }))
        .unwrap();
        assert_eq!(from_list, from_csv);
        assert_eq!(from_list.ingredients.len(), 2);
    }

    #[test]
    fn test_edit_payload_splits_ingredients() {
        let payload = Recipe::edit_payload(&["Soup".to_string(), "water, salt".to_string()]);
        assert_eq!(
            payload,
            json!({"name": "Soup", "ingredients": ["water", "salt"]})
        );
    }
}
