use console_core::StrategyRequest;
use serde_json::{Map, Value};

#[derive(Debug, PartialEq)]
pub enum ConsoleCommand {
    Run(StrategyRequest),
    History,
    /// 1-based row in display order.
    Select(usize),
    Rerun,
    Status,
    Connect,
    Disconnect,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  run <name> [path|-] [json-params]   dispatch a strategy request
  history                             show issued requests, most recent first
  select <n>                          select the n-th history row
  rerun                               dispatch the selected request again
  status                              show the connection state
  connect | disconnect                drive the engine connection
  quit";

pub fn parse_command(line: &str) -> Result<ConsoleCommand, String> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    match verb {
        "run" => parse_run(rest).map(ConsoleCommand::Run),
        "history" | "h" => Ok(ConsoleCommand::History),
        "select" | "s" => rest
            .parse::<usize>()
            .ok()
            .filter(|n| *n > 0)
            .map(ConsoleCommand::Select)
            .ok_or_else(|| format!("select expects a row number, got {rest:?}")),
        "rerun" | "r" => Ok(ConsoleCommand::Rerun),
        "status" => Ok(ConsoleCommand::Status),
        "connect" => Ok(ConsoleCommand::Connect),
        "disconnect" => Ok(ConsoleCommand::Disconnect),
        "help" | "?" => Ok(ConsoleCommand::Help),
        "quit" | "exit" | "q" => Ok(ConsoleCommand::Quit),
        other => Err(format!("unknown command {other:?} (try `help`)")),
    }
}

fn parse_run(rest: &str) -> Result<StrategyRequest, String> {
    let mut parts = rest.splitn(3, char::is_whitespace);
    let name = parts
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| "run expects a strategy name".to_string())?;
    let mut request = StrategyRequest::new(name);

    if let Some(path) = parts.next().map(str::trim).filter(|s| !s.is_empty()) {
        if path != "-" {
            request = request.with_path(path);
        }
    }

    if let Some(raw) = parts.next().map(str::trim).filter(|s| !s.is_empty()) {
        let params: Map<String, Value> =
            serde_json::from_str(raw).map_err(|e| format!("invalid json params: {e}"))?;
        request = request.with_params(params);
    }

    Ok(request)
}
