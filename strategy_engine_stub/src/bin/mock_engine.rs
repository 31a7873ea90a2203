use clap::Parser;
use std::fs;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};
use strategy_engine_stub::{spawn_engine, DEFAULT_ADDR};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "mock_engine")]
struct Args {
    #[arg(long, env = "STRATEGY_ENGINE_ADDR", default_value = DEFAULT_ADDR)]
    addr: String,

    /// Write the bound address here (useful with port 0).
    #[arg(long, value_name = "PATH")]
    addr_file: Option<PathBuf>,

    #[arg(long)]
    run_for_ms: Option<u64>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let run_for = args.run_for_ms.map(Duration::from_millis);

    let (net, mut recorder) = match spawn_engine(&args.addr) {
        Ok(pair) => pair,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    if let Some(path) = &args.addr_file {
        let _ = fs::write(path, net.listen_addr().to_string());
    }

    println!("mock_engine listening on ws://{}", net.listen_addr());

    let start = Instant::now();
    loop {
        recorder.tick();
        thread::sleep(Duration::from_millis(33));
        if let Some(max) = run_for {
            if start.elapsed() >= max {
                break;
            }
        }
    }

    println!("recorded {} command(s)", recorder.received().len());
    net.shutdown();
}
