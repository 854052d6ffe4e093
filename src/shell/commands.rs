//! Shell command parser

use crate::resource::ResourceKind;

/// A parsed shell line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellCommand {
    /// Redraw the current view
    List,
    Add,
    Edit(u64),
    Delete(u64),
    Toggle(u64),
    /// Unmount the current view and mount another
    Open(ResourceKind),
    /// Fetch the collection again
    Reload,
    Help,
    Quit,
    /// Blank line
    Empty,
}

pub const HELP: &str = "\
Commands:
  list | ls            redraw the current view
  add                  add an item seeded from a random upstream record
  edit <id>            edit an item (prompts for each field, empty to cancel)
  delete | rm <id>     delete an item
  toggle <id>          flip a todo's completed flag
  open <resource>      switch to comments, posts, recipes or todos
  reload               fetch the collection again
  help                 show this help
  quit | exit          leave (waits for pending requests)";

impl ShellCommand {
    /// Parse one input line
    pub fn parse(line: &str) -> Result<Self, String> {
        let mut parts = line.split_whitespace();
        let Some(head) = parts.next() else {
            return Ok(ShellCommand::Empty);
        };
        let arg = parts.next();
        if let Some(extra) = parts.next() {
            return Err(format!("Unexpected argument '{}'", extra));
        }

        let cmd = match head.to_ascii_lowercase().as_str() {
            "list" | "ls" => no_arg(ShellCommand::List, arg)?,
            "add" | "new" => no_arg(ShellCommand::Add, arg)?,
            "edit" | "e" => ShellCommand::Edit(id_arg(head, arg)?),
            "delete" | "rm" | "del" => ShellCommand::Delete(id_arg(head, arg)?),
            "toggle" | "t" => ShellCommand::Toggle(id_arg(head, arg)?),
            "open" | "cd" => {
                let name = arg.ok_or_else(|| format!("Usage: {} <resource>", head))?;
                ShellCommand::Open(name.parse()?)
            }
            "reload" | "refresh" => no_arg(ShellCommand::Reload, arg)?,
            "help" | "?" => ShellCommand::Help,
            "quit" | "exit" | "q" => ShellCommand::Quit,
            other => {
                return Err(format!(
                    "Unknown command '{}'. Type 'help' for a list of commands",
                    other
                ))
            }
        };
        Ok(cmd)
    }
}

fn no_arg(cmd: ShellCommand, arg: Option<&str>) -> Result<ShellCommand, String> {
    match arg {
        None => Ok(cmd),
        Some(extra) => Err(format!("Unexpected argument '{}'", extra)),
    }
}

fn id_arg(head: &str, arg: Option<&str>) -> Result<u64, String> {
    let raw = arg.ok_or_else(|| format!("Usage: {} <id>", head))?;
    raw.trim_start_matches('#')
        .parse::<u64>()
        .map_err(|_| format!("'{}' is not a valid id", raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_commands() {
        assert_eq!(ShellCommand::parse("ls"), Ok(ShellCommand::List));
        assert_eq!(ShellCommand::parse("  add "), Ok(ShellCommand::Add));
        assert_eq!(ShellCommand::parse("EDIT 5"), Ok(ShellCommand::Edit(5)));
        assert_eq!(ShellCommand::parse("rm #12"), Ok(ShellCommand::Delete(12)));
        assert_eq!(
            ShellCommand::parse("toggle 1700000000000"),
            Ok(ShellCommand::Toggle(1_700_000_000_000))
        );
        assert_eq!(
            ShellCommand::parse("open recipes"),
            Ok(ShellCommand::Open(ResourceKind::Recipes))
        );
        assert_eq!(ShellCommand::parse(""), Ok(ShellCommand::Empty));
        assert_eq!(ShellCommand::parse("exit"), Ok(ShellCommand::Quit));
    }

    #[test]
    fn test_parse_errors() {
        assert!(ShellCommand::parse("edit").unwrap_err().contains("Usage"));
        assert!(ShellCommand::parse("delete abc")
            .unwrap_err()
            .contains("not a valid id"));
        assert!(ShellCommand::parse("delete -1").is_err());
        assert!(ShellCommand::parse("add 3").is_err());
        assert!(ShellCommand::parse("edit 1 2").is_err());
        assert!(ShellCommand::parse("open users").is_err());
        assert!(ShellCommand::parse("frobnicate").unwrap_err().contains("help"));
    }
}
