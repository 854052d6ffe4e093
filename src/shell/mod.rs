//! Interactive terminal front-end
//!
//! Mounts one resource view at a time and redraws it whenever its state
//! changes. Add, delete, toggle and reload run on their own tasks so several
//! requests can be pending at once; edit runs inline because it reads its
//! answers from the same input as the command line.

mod commands;
mod prompt;
mod render;

pub use commands::{ShellCommand, HELP};
pub use prompt::LinePrompter;
pub use render::render;

use crate::api::Transport;
use crate::config::Config;
use crate::controller::{mount, ActionOutcome, View};
use crate::resource::{ItemId, ResourceKind};
use anyhow::Result;
use colored::Colorize;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tokio::task::{JoinHandle, JoinSet};

/// Coalesces bursts of state changes into one redraw
const REDRAW_DEBOUNCE: Duration = Duration::from_millis(30);

/// Whether the loop keeps reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Shell<I> {
    transport: Arc<dyn Transport>,
    config: Config,
    view: Arc<dyn View>,
    redraw: Option<JoinHandle<()>>,
    tasks: JoinSet<()>,
    lines: Lines<I>,
}

impl<I: AsyncBufRead + Unpin + Send> Shell<I> {
    /// Mount `kind` and start loading it
    pub fn new(kind: ResourceKind, transport: Arc<dyn Transport>, config: Config, input: I) -> Self {
        let view = mount(kind, Arc::clone(&transport), &config.controller);
        let mut shell = Self {
            transport,
            config,
            view,
            redraw: None,
            tasks: JoinSet::new(),
            lines: input.lines(),
        };
        shell.activate();
        shell
    }

    /// The currently mounted view
    pub fn view(&self) -> Arc<dyn View> {
        Arc::clone(&self.view)
    }

    /// Read commands until `quit` or end of input, then wait for pending actions
    pub async fn run(&mut self) -> Result<()> {
        println!("{}", HELP);
        loop {
            self.print_prompt();
            let Some(line) = self.lines.next_line().await? else {
                break;
            };
            match ShellCommand::parse(&line) {
                Ok(cmd) => {
                    if self.execute(cmd).await? == Flow::Quit {
                        break;
                    }
                }
                Err(message) => self.notice(&message),
            }
        }
        self.shutdown().await;
        Ok(())
    }

    /// Run one command
    pub async fn execute(&mut self, cmd: ShellCommand) -> Result<Flow> {
        tracing::debug!("Executing {:?} on {}", cmd, self.view.kind());
        match cmd {
            ShellCommand::Empty => {}
            ShellCommand::List => self.draw(),
            ShellCommand::Help => println!("{}", HELP),
            ShellCommand::Quit => return Ok(Flow::Quit),
            ShellCommand::Reload => {
                let view = self.view();
                self.spawn_action(async move { view.load().await });
            }
            ShellCommand::Add => {
                let view = self.view();
                self.spawn_action(async move { view.add().await });
            }
            ShellCommand::Delete(raw) => {
                let view = self.view();
                self.spawn_action(async move { view.delete(ItemId::from_raw(raw)).await });
            }
            ShellCommand::Toggle(raw) => {
                let view = self.view();
                self.spawn_action(async move { view.toggle(ItemId::from_raw(raw)).await });
            }
            ShellCommand::Edit(raw) => {
                let view = self.view();
                let color = self.config.shell.color;
                let mut prompter = LinePrompter::new(&mut self.lines, color);
                let outcome = view.edit(ItemId::from_raw(raw), &mut prompter).await;
                if let Some(message) = describe(&outcome, raw, view.kind()) {
                    self.notice(&message);
                }
            }
            ShellCommand::Open(kind) => {
                if kind == self.view.kind() {
                    self.draw();
                } else {
                    self.open(kind);
                }
            }
        }
        Ok(Flow::Continue)
    }

    /// Wait for every pending action, then stop redrawing
    pub async fn shutdown(&mut self) {
        if !self.tasks.is_empty() {
            tracing::info!("Waiting for {} pending actions", self.tasks.len());
        }
        while let Some(joined) = self.tasks.join_next().await {
            if let Err(e) = joined {
                tracing::warn!("Action task failed: {}", e);
            }
        }
        if let Some(handle) = self.redraw.take() {
            handle.abort();
        }
    }

    // ========== Private Helpers ==========

    /// Unmount the current view and mount `kind`
    ///
    /// Pending actions on the old view still settle against its own state;
    /// their error clears never touch the new view.
    fn open(&mut self, kind: ResourceKind) {
        tracing::info!("Switching view {} -> {}", self.view.kind(), kind);
        if let Some(handle) = self.redraw.take() {
            handle.abort();
        }
        self.view = mount(kind, Arc::clone(&self.transport), &self.config.controller);
        self.activate();
    }

    /// Start redrawing the mounted view and load it once
    fn activate(&mut self) {
        let view = self.view();
        let color = self.config.shell.color;
        let mut rx = view.subscribe();
        self.redraw = Some(tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                tokio::time::sleep(REDRAW_DEBOUNCE).await;
                let _ = rx.borrow_and_update();
                println!("\n{}", render(&view.snapshot(), color));
            }
        }));

        let view = self.view();
        self.spawn_action(async move { view.load().await });
    }

    fn spawn_action<F>(&mut self, action: F)
    where
        F: std::future::Future<Output = ActionOutcome> + Send + 'static,
    {
        let view = self.view();
        let color = self.config.shell.color;
        self.tasks.spawn(async move {
            let outcome = action.await;
            tracing::debug!("{} action finished: {:?}", view.kind(), outcome);
            if let Some(message) = describe_spawned(&outcome, view.kind()) {
                print_notice(&message, color);
            }
        });
        // Reap finished tasks so the set does not grow for the whole session
        while let Some(joined) = self.tasks.try_join_next() {
            if let Err(e) = joined {
                tracing::warn!("Action task failed: {}", e);
            }
        }
    }

    fn draw(&self) {
        println!("{}", render(&self.view.snapshot(), self.config.shell.color));
    }

    fn notice(&self, message: &str) {
        print_notice(message, self.config.shell.color);
    }

    fn print_prompt(&self) {
        print!("{}> ", self.view.kind());
        let _ = std::io::stdout().flush();
    }
}

fn print_notice(message: &str, color: bool) {
    if color {
        println!("{}", message.yellow());
    } else {
        println!("{}", message);
    }
}

/// User-facing note for an inline (edit) outcome
fn describe(outcome: &ActionOutcome, raw: u64, kind: ResourceKind) -> Option<String> {
    match outcome {
        ActionOutcome::Applied | ActionOutcome::Failed(_) | ActionOutcome::Rejected(_) => None,
        ActionOutcome::Cancelled => Some("Edit cancelled".to_string()),
        ActionOutcome::NotFound => Some(format!("No {} item with id {}", kind, raw)),
        ActionOutcome::Unsupported => Some(format!("{} cannot do that", kind)),
        ActionOutcome::Busy => Some(format!("Item {} has a pending request", raw)),
    }
}

/// User-facing note for a background outcome; failures show in the banner
fn describe_spawned(outcome: &ActionOutcome, kind: ResourceKind) -> Option<String> {
    match outcome {
        ActionOutcome::NotFound => Some(format!("No such {} item", kind)),
        ActionOutcome::Unsupported => Some(format!("Only todos can be toggled, not {}", kind)),
        ActionOutcome::Busy => Some("That item has a pending request".to_string()),
        ActionOutcome::Rejected(message) => Some(message.clone()),
        _ => None,
    }
}
