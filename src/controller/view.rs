//! Type-erased controller handle for renderers
//!
//! The shell mounts one resource at a time and does not care which record
//! type sits behind it; [`View`] exposes the controller actions plus a
//! render-ready [`ViewSnapshot`].

use super::{ActionOutcome, Prompter, ResourceController};
use crate::api::Transport;
use crate::config::ControllerConfig;
use crate::resource::{Comment, ItemId, Post, Recipe, Resource, ResourceKind, Todo};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::watch;

/// One rendered row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub id: ItemId,
    pub cells: Vec<String>,
}

/// Everything a renderer needs to draw a view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewSnapshot {
    pub title: &'static str,
    pub columns: &'static [&'static str],
    pub rows: Vec<Row>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Object-safe facade over [`ResourceController`]
#[async_trait]
pub trait View: Send + Sync {
    fn kind(&self) -> ResourceKind;
    async fn load(&self) -> ActionOutcome;
    async fn add(&self) -> ActionOutcome;
    async fn edit(&self, id: ItemId, prompter: &mut dyn Prompter) -> ActionOutcome;
    async fn delete(&self, id: ItemId) -> ActionOutcome;
    async fn toggle(&self, id: ItemId) -> ActionOutcome;
    fn snapshot(&self) -> ViewSnapshot;
    fn subscribe(&self) -> watch::Receiver<u64>;
}

struct Mounted<R> {
    kind: ResourceKind,
    controller: ResourceController<R>,
}

#[async_trait]
impl<R: Resource> View for Mounted<R> {
    fn kind(&self) -> ResourceKind {
        self.kind
    }

    async fn load(&self) -> ActionOutcome {
        self.controller.load().await
    }

    async fn add(&self) -> ActionOutcome {
        self.controller.add().await
    }

    async fn edit(&self, id: ItemId, prompter: &mut dyn Prompter) -> ActionOutcome {
        self.controller.edit(id, prompter).await
    }

    async fn delete(&self, id: ItemId) -> ActionOutcome {
        self.controller.delete(id).await
    }

    async fn toggle(&self, id: ItemId) -> ActionOutcome {
        self.controller.toggle(id).await
    }

    fn snapshot(&self) -> ViewSnapshot {
        let state = self.controller.snapshot();
        ViewSnapshot {
            title: R::CONFIG.title,
            columns: R::columns(),
            rows: state
                .items
                .iter()
                .map(|item| Row {
                    id: item.id(),
                    cells: item.row(),
                })
                .collect(),
            loading: state.loading,
            error: state.error,
        }
    }

    fn subscribe(&self) -> watch::Receiver<u64> {
        self.controller.subscribe()
    }
}

/// Build an (unloaded) view for `kind`
pub fn mount(
    kind: ResourceKind,
    transport: Arc<dyn Transport>,
    config: &ControllerConfig,
) -> Arc<dyn View> {
    fn boxed<R: Resource>(
        kind: ResourceKind,
        transport: Arc<dyn Transport>,
        config: &ControllerConfig,
    ) -> Arc<dyn View> {
        Arc::new(Mounted {
            kind,
            controller: ResourceController::<R>::new(transport, config.clone()),
        })
    }

    match kind {
        ResourceKind::Comments => boxed::<Comment>(kind, transport, config),
        ResourceKind::Posts => boxed::<Post>(kind, transport, config),
        ResourceKind::Recipes => boxed::<Recipe>(kind, transport, config),
        ResourceKind::Todos => boxed::<Todo>(kind, transport, config),
    }
}

#[cfg(all(test, feature = "test-sim"))]
mod tests {
    use super::*;
    use crate::api::{SimMethod, SimTransport};
    use serde_json::json;

    #[tokio::test]
    async fn test_mount_renders_rows() {
        let sim = SimTransport::new();
        sim.respond(
            SimMethod::Get,
            "recipes",
            json!({"recipes": [{"id": 2, "name": "Soup", "ingredients": ["water", "salt"]}]}),
        );
        let view = mount(
            ResourceKind::Recipes,
            Arc::new(sim),
            &ControllerConfig::default(),
        );
        assert_eq!(view.kind(), ResourceKind::Recipes);
        assert!(view.load().await.is_applied());

        let snap = view.snapshot();
        assert_eq!(snap.title, "Recipes");
        assert_eq!(snap.columns, &["ID", "Name", "Ingredients"]);
        assert_eq!(
            snap.rows,
            vec![Row {
                id: ItemId::Remote(2),
                cells: vec!["2".into(), "Soup".into(), "water, salt".into()],
            }]
        );
    }
}
