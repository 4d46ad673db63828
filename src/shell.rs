use thiserror::Error;

use crate::form::EntryId;
use crate::session::Intent;

pub const HELP: &str = "\
Commands:
  add                      add an empty project
  rm <id>                  remove a project
  cap <amount>             set the budget capacity
  name <id> <text>         set a project's name
  cost <id> <amount>       set a project's cost
  gain <id> <amount>       set a project's expected gain
  show                     print the form
  calc                     validate and submit to the optimizer
  clear                    reset the form
  example                  load the example portfolio
  health                   probe the optimization service
  help                     show this text
  quit                     leave the shell";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Run(Intent),
    Show,
    Help,
    Quit,
    Nothing,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShellParseError {
    #[error("unknown command: {0} (try `help`)")]
    UnknownCommand(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("invalid project id: {0}")]
    InvalidId(String),
}

pub fn parse_line(line: &str) -> Result<ShellCommand, ShellParseError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(ShellCommand::Nothing);
    }
    let (command, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (trimmed, ""),
    };

    let intent = match command.to_ascii_lowercase().as_str() {
        "add" => Intent::AddEntry,
        "rm" | "remove" => Intent::RemoveEntry(parse_id(rest, "rm <id>")?),
        "cap" | "capacity" => Intent::SetCapacity(rest.to_string()),
        "name" => {
            let (id, value) = id_and_value(rest, "name <id> <text>")?;
            Intent::SetName(id, value)
        }
        "cost" => {
            let (id, value) = id_and_value(rest, "cost <id> <amount>")?;
            Intent::SetCost(id, value)
        }
        "gain" => {
            let (id, value) = id_and_value(rest, "gain <id> <amount>")?;
            Intent::SetExpectedGain(id, value)
        }
        "calc" | "calculate" => Intent::Calculate,
        "clear" => Intent::Clear,
        "example" => Intent::LoadExample,
        "health" => Intent::CheckHealth,
        "show" => return Ok(ShellCommand::Show),
        "help" | "?" => return Ok(ShellCommand::Help),
        "quit" | "exit" | "q" => return Ok(ShellCommand::Quit),
        other => return Err(ShellParseError::UnknownCommand(other.to_string())),
    };
    Ok(ShellCommand::Run(intent))
}

fn parse_id(raw: &str, usage: &'static str) -> Result<EntryId, ShellParseError> {
    if raw.is_empty() {
        return Err(ShellParseError::Usage(usage));
    }
    raw.parse::<EntryId>()
        .map_err(|_| ShellParseError::InvalidId(raw.to_string()))
}

/// Splits `<id> <value>`; the value may be empty to blank the field.
fn id_and_value(rest: &str, usage: &'static str) -> Result<(EntryId, String), ShellParseError> {
    let (id, value) = match rest.split_once(char::is_whitespace) {
        Some((id, value)) => (id, value.trim()),
        None => (rest, ""),
    };
    Ok((parse_id(id, usage)?, value.to_string()))
}
