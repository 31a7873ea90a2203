mod commands;

use crate::commands::{parse_command, ConsoleCommand, HELP};
use clap::Parser;
use console_core::logging::init_tracing;
use console_core::{
    ws_actor, ChannelSink, ClientConfig, CommandDispatcher, ConnectionStateSource, ConsoleSession,
    Notification, NotificationKind, NotificationSink, TracingSink,
};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "strategy-console")]
struct Args {
    /// Engine WebSocket URL (overrides STRATEGY_WS_URL).
    #[arg(long)]
    ws_url: Option<String>,

    /// Outbound frame queue size (overrides STRATEGY_OUTBOUND_CAP).
    #[arg(long)]
    outbound_cap: Option<usize>,

    /// Start disconnected; use `connect` at the prompt.
    #[arg(long, default_value_t = false)]
    no_connect: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();
    let args = Args::parse();

    let mut config = ClientConfig::from_env()?;
    if let Some(url) = args.ws_url.as_deref() {
        config = config.with_ws_url(url)?;
    }
    if let Some(cap) = args.outbound_cap {
        config = config.with_outbound_capacity(cap)?;
    }
    debug!(?config, "resolved client config");

    let (channel_sink, notifications) = ChannelSink::pair();
    let sink: Arc<dyn NotificationSink> = Arc::new(move |n: Notification| {
        TracingSink.notify(n.clone());
        channel_sink.notify(n);
    });

    let actor = ws_actor::spawn(
        config.ws_url.clone(),
        config.outbound_capacity,
        Arc::clone(&sink),
        !args.no_connect,
    );
    let state = actor.state();
    let dispatcher = CommandDispatcher::new(
        Arc::new(state.clone()),
        Arc::new(actor.transport()),
        Arc::clone(&sink),
    );
    let mut session = ConsoleSession::new(dispatcher);

    println!("strategy-console -> {}", config.ws_url);
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(Duration::from_millis(250));
    prompt();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    prompt();
                    continue;
                }
                match parse_command(&line) {
                    Ok(ConsoleCommand::Quit) => break,
                    Ok(ConsoleCommand::Run(request)) => session.issue(request),
                    Ok(ConsoleCommand::History) => print_lines(&session.render_history()),
                    Ok(ConsoleCommand::Select(n)) => {
                        if session.select_row(n - 1) {
                            print_lines(&session.render_history());
                        } else {
                            println!("no history row {n}");
                        }
                    }
                    Ok(ConsoleCommand::Rerun) => {
                        if !session.rerun_selected() {
                            println!("nothing selected (use `select <n>` first)");
                        }
                    }
                    Ok(ConsoleCommand::Status) => println!("connection: {}", state.current()),
                    Ok(ConsoleCommand::Connect) => actor.connect().await?,
                    Ok(ConsoleCommand::Disconnect) => actor.disconnect().await?,
                    Ok(ConsoleCommand::Help) => println!("{HELP}"),
                    Err(msg) => println!("{msg}"),
                }
                drain(&notifications);
                prompt();
            }
            _ = ticker.tick() => {
                if drain(&notifications) {
                    prompt();
                }
            }
        }
    }

    Ok(())
}

/// Prints pending notifications. Returns whether anything was printed.
fn drain(notifications: &crossbeam_channel::Receiver<Notification>) -> bool {
    let mut printed = false;
    for n in notifications.try_iter() {
        let tag = match n.kind {
            NotificationKind::Info => "info",
            NotificationKind::Error => "error",
        };
        println!("\n[{tag}] {}", n.message);
        printed = true;
    }
    printed
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}
