//! Line-based prompter over the shell's input

use crate::controller::Prompter;
use async_trait::async_trait;
use colored::Colorize;
use std::io::Write;
use tokio::io::{AsyncBufRead, Lines};

/// Prompts on stdout and reads the answer from the shell's input lines
///
/// An empty answer (or end of input) cancels.
pub struct LinePrompter<'a, I> {
    lines: &'a mut Lines<I>,
    color: bool,
}

impl<'a, I> LinePrompter<'a, I> {
    pub fn new(lines: &'a mut Lines<I>, color: bool) -> Self {
        Self { lines, color }
    }
}

#[async_trait]
impl<'a, I: AsyncBufRead + Unpin + Send> Prompter for LinePrompter<'a, I> {
    async fn prompt(&mut self, label: &str, default: &str) -> Option<String> {
        println!("{} (current: {})", label, default);
        print!("  new value, empty to cancel> ");
        let _ = std::io::stdout().flush();

        match self.lines.next_line().await {
            Ok(Some(line)) if !line.trim().is_empty() => Some(line.trim().to_string()),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!("Failed to read prompt answer: {}", e);
                None
            }
        }
    }

    async fn alert(&mut self, message: &str) {
        if self.color {
            println!("{}", message.yellow());
        } else {
            println!("{}", message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncBufReadExt;

    #[tokio::test]
    async fn test_answers_and_cancel() {
        let input: &[u8] = b"  New text  \n\n";
        let mut lines = tokio::io::BufReader::new(input).lines();
        let mut prompter = LinePrompter::new(&mut lines, false);

        assert_eq!(
            prompter.prompt("Edit todo", "old").await.as_deref(),
            Some("New text")
        );
        assert_eq!(prompter.prompt("Edit todo", "old").await, None);
        // End of input also cancels
        assert_eq!(prompter.prompt("Edit todo", "old").await, None);
    }
}
