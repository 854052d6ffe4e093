//! Scripted in-memory transport
//!
//! Answers calls from per-route queues, falls back to per-route defaults,
//! and records every call it sees. A response can be held behind a
//! [`Gate`] so a caller's intermediate (optimistic) state can be observed
//! while the call is still pending.
//!
//! Unscripted routes answer with HTTP 404.

use super::{ApiError, Operation, Transport};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Notify;

/// HTTP method of a simulated call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl SimMethod {
    fn operation(self) -> Operation {
        match self {
            SimMethod::Get => Operation::Fetch,
            SimMethod::Post => Operation::Create,
            SimMethod::Put => Operation::Update,
            SimMethod::Delete => Operation::Delete,
        }
    }
}

/// A call recorded by the simulator
#[derive(Debug, Clone, PartialEq)]
pub struct SimCall {
    pub method: SimMethod,
    /// Full relative path, including `/{id}` for PUT and DELETE
    pub path: String,
    pub body: Option<Value>,
}

/// Holds a scripted response until opened
#[derive(Debug, Clone, Default)]
pub struct Gate {
    notify: Arc<Notify>,
}

impl Gate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Release the held response. Opening before the call arrives is fine.
    pub fn open(&self) {
        self.notify.notify_one();
    }

    async fn wait(&self) {
        self.notify.notified().await;
    }
}

#[derive(Debug, Clone)]
enum Reply {
    Ok(Value),
    Status { status: u16, body: String },
}

#[derive(Debug, Clone)]
struct Scripted {
    reply: Reply,
    gate: Option<Gate>,
}

type Route = (SimMethod, String);

#[derive(Default)]
struct SimInner {
    queued: HashMap<Route, VecDeque<Scripted>>,
    defaults: HashMap<Route, Reply>,
    calls: Vec<SimCall>,
}

/// In-memory [`Transport`] with scripted replies
#[derive(Clone, Default)]
pub struct SimTransport {
    inner: Arc<Mutex<SimInner>>,
}

impl SimTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SimInner> {
        self.inner.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("SimTransport lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn push(&self, method: SimMethod, path: &str, reply: Reply, gate: Option<Gate>) {
        self.lock()
            .queued
            .entry((method, path.to_string()))
            .or_default()
            .push_back(Scripted { reply, gate });
    }

    /// Queue one successful reply
    pub fn respond(&self, method: SimMethod, path: &str, body: Value) -> &Self {
        self.push(method, path, Reply::Ok(body), None);
        self
    }

    /// Queue one failing reply with an empty body
    pub fn fail(&self, method: SimMethod, path: &str, status: u16) -> &Self {
        self.fail_with(method, path, status, "")
    }

    /// Queue one failing reply with a body (e.g. `{"message": ".."}`)
    pub fn fail_with(&self, method: SimMethod, path: &str, status: u16, body: &str) -> &Self {
        self.push(
            method,
            path,
            Reply::Status {
                status,
                body: body.to_string(),
            },
            None,
        );
        self
    }

    /// Queue one successful reply that is held until the returned gate opens
    pub fn respond_gated(&self, method: SimMethod, path: &str, body: Value) -> Gate {
        let gate = Gate::new();
        self.push(method, path, Reply::Ok(body), Some(gate.clone()));
        gate
    }

    /// Queue one failing reply that is held until the returned gate opens
    pub fn fail_gated(&self, method: SimMethod, path: &str, status: u16) -> Gate {
        let gate = Gate::new();
        self.push(
            method,
            path,
            Reply::Status {
                status,
                body: String::new(),
            },
            Some(gate.clone()),
        );
        gate
    }

    /// Reply used for a route whenever its queue is empty
    pub fn set_default(&self, method: SimMethod, path: &str, body: Value) -> &Self {
        self.lock()
            .defaults
            .insert((method, path.to_string()), Reply::Ok(body));
        self
    }

    /// Every call seen so far, in arrival order
    pub fn calls(&self) -> Vec<SimCall> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    /// Calls with the given method
    pub fn calls_with(&self, method: SimMethod) -> Vec<SimCall> {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.method == method)
            .cloned()
            .collect()
    }

    async fn dispatch(
        &self,
        method: SimMethod,
        path: String,
        body: Option<Value>,
    ) -> Result<Value, ApiError> {
        let scripted = {
            let mut inner = self.lock();
            inner.calls.push(SimCall {
                method,
                path: path.clone(),
                body,
            });
            let route = (method, path.clone());
            let queued = inner.queued.get_mut(&route).and_then(|q| q.pop_front());
            queued.or_else(|| {
                inner.defaults.get(&route).map(|reply| Scripted {
                    reply: reply.clone(),
                    gate: None,
                })
            })
        };

        let Some(scripted) = scripted else {
            tracing::debug!("sim: no reply scripted for {:?} {}", method, path);
            return Err(status_error(method, path, 404, ""));
        };

        if let Some(gate) = &scripted.gate {
            gate.wait().await;
        }

        match scripted.reply {
            Reply::Ok(value) => Ok(value),
            Reply::Status { status, body } => Err(status_error(method, path, status, &body)),
        }
    }
}

fn status_error(method: SimMethod, path: String, status: u16, body: &str) -> ApiError {
    match reqwest::StatusCode::from_u16(status) {
        Ok(code) => ApiError::from_http_status(method.operation(), path, code, body),
        Err(_) => ApiError::with_status(
            method.operation(),
            path,
            format!("HTTP {}", status),
            Some(status),
        ),
    }
}

#[async_trait]
impl Transport for SimTransport {
    async fn fetch(&self, path: &str) -> Result<Value, ApiError> {
        self.dispatch(SimMethod::Get, path.to_string(), None).await
    }

    async fn create(&self, path: &str, body: Value) -> Result<Value, ApiError> {
        self.dispatch(SimMethod::Post, path.to_string(), Some(body))
            .await
    }

    async fn update(&self, path: &str, id: u64, body: Value) -> Result<Value, ApiError> {
        self.dispatch(SimMethod::Put, format!("{}/{}", path, id), Some(body))
            .await
    }

    async fn delete(&self, path: &str, id: u64) -> Result<(), ApiError> {
        self.dispatch(SimMethod::Delete, format!("{}/{}", path, id), None)
            .await
            .map(|_| ())
    }
}
