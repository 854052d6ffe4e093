//! crudboard: terminal CRUD board for the dummyjson demo API
//!
//! This library provides:
//! - An HTTP transport for the demo API plus a scripted in-memory simulator
//! - Typed records for comments, posts, recipes and todos
//! - A generic controller with optimistic adds and local-only item handling
//! - An interactive shell that renders one resource view at a time

pub mod api;
pub mod config;
pub mod controller;
pub mod resource;
pub mod shell;

pub use api::{ApiClient, ApiError, Transport};
pub use config::Config;
pub use controller::{mount, ActionOutcome, ResourceController, View};
pub use resource::{ItemId, Resource, ResourceKind};
pub use shell::Shell;
