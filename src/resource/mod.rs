//! Resource collections served by the demo API
//!
//! Each collection is a flat record type plus a small [`ResourceConfig`]
//! naming its endpoint, list key and user-facing messages. The generic
//! controller only ever talks to records through the [`Resource`] trait.

mod comment;
mod id;
mod post;
mod recipe;
mod todo;

pub use comment::Comment;
pub use id::{ItemId, LocalIdClock, REMOTE_ID_MAX};
pub use post::Post;
pub use recipe::Recipe;
pub use todo::Todo;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Shown when an edit targets an item that only exists locally
pub const LOCAL_ONLY_NOTICE: &str =
    "This data is only stored on the frontend and cannot be updated in the API";

/// User-visible error strings for one resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorMessages {
    pub load: &'static str,
    pub add: &'static str,
    pub update: &'static str,
    pub delete: &'static str,
    /// Only set for resources with a completion flag
    pub toggle: Option<&'static str>,
}

/// Static per-resource configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceConfig {
    /// Path segment, e.g. `todos`
    pub endpoint: &'static str,
    /// Key of the collection in the list response, e.g. `{"todos": [...]}`
    pub list_key: &'static str,
    /// Heading shown above the view
    pub title: &'static str,
    pub messages: ErrorMessages,
}

impl ResourceConfig {
    pub fn list_path(&self) -> String {
        self.endpoint.to_string()
    }

    pub fn item_path(&self, raw_id: u64) -> String {
        format!("{}/{}", self.endpoint, raw_id)
    }

    pub fn add_path(&self) -> String {
        format!("{}/add", self.endpoint)
    }
}

/// One editable field, with the value shown as the prompt default
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditField {
    pub label: &'static str,
    pub current: String,
}

/// A record type managed by the generic controller
pub trait Resource:
    Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    const CONFIG: ResourceConfig;

    fn id(&self) -> ItemId;

    fn set_id(&mut self, id: ItemId);

    /// Build the optimistic local item from a seed record
    fn from_seed(seed: &Self, id: ItemId) -> Self;

    /// Body of the create call for a freshly seeded item
    fn create_payload(&self) -> Value;

    /// Fields prompted for on edit, in prompt order
    fn edit_fields(&self) -> Vec<EditField>;

    /// Body of the update call, built from one answer per edit field
    fn edit_payload(answers: &[String]) -> Value;

    /// Column headings for rendering
    fn columns() -> &'static [&'static str];

    /// Cell values for rendering, one per column
    fn row(&self) -> Vec<String>;

    /// The completion flag, for resources that can be toggled
    fn completed_mut(&mut self) -> Option<&mut bool> {
        None
    }
}

/// The four collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum ResourceKind {
    Comments,
    Posts,
    Recipes,
    Todos,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Comments,
        ResourceKind::Posts,
        ResourceKind::Recipes,
        ResourceKind::Todos,
    ];

    pub fn config(self) -> ResourceConfig {
        match self {
            ResourceKind::Comments => Comment::CONFIG,
            ResourceKind::Posts => Post::CONFIG,
            ResourceKind::Recipes => Recipe::CONFIG,
            ResourceKind::Todos => Todo::CONFIG,
        }
    }

    pub fn as_str(self) -> &'static str {
        self.config().endpoint
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "comments" | "comment" => Ok(ResourceKind::Comments),
            "posts" | "post" => Ok(ResourceKind::Posts),
            "recipes" | "recipe" => Ok(ResourceKind::Recipes),
            "todos" | "todo" => Ok(ResourceKind::Todos),
            other => Err(format!(
                "Unknown resource '{}'. Expected one of: comments, posts, recipes, todos",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        let config = Todo::CONFIG;
        assert_eq!(config.list_path(), "todos");
        assert_eq!(config.item_path(7), "todos/7");
        assert_eq!(config.add_path(), "todos/add");
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("Todos".parse::<ResourceKind>(), Ok(ResourceKind::Todos));
        assert_eq!("post".parse::<ResourceKind>(), Ok(ResourceKind::Posts));
        assert!("users".parse::<ResourceKind>().is_err());
        for kind in ResourceKind::ALL {
            assert_eq!(kind.to_string().parse::<ResourceKind>(), Ok(kind));
        }
    }

    #[test]
    fn test_list_keys_match_endpoints() {
        for kind in ResourceKind::ALL {
            let config = kind.config();
            assert_eq!(config.list_key, config.endpoint);
        }
    }
}
