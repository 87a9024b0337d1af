use anyhow::{Context, Result};
use clap::Parser;
use reverie_core::{KvStore, ReverieConfig};
use reverie_limbic::TickConfig;
use reverie_memory::{InMemoryStore, SqliteStore};
use reverie_perception::Perception;
use reverie_reasoning::{providers, Engine, Mind, Scheduler};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod render;

use render::Renderer;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to config file
    #[arg(short, long, default_value = "reverie.toml")]
    config: String,

    /// Text generator: openai, ollama or mock
    #[arg(long)]
    provider: Option<String>,

    #[arg(short, long)]
    model: Option<String>,

    /// Seconds between cycles
    #[arg(long)]
    tick_secs: Option<u64>,

    /// SQLite database path
    #[arg(long)]
    db: Option<String>,

    /// Keep state in process memory only
    #[arg(long)]
    in_memory: bool,

    /// Start with real web lookups enabled
    #[arg(long)]
    real_feed: bool,

    /// Fixed RNG seed
    #[arg(long, env = "REVERIE_SEED")]
    seed: Option<u64>,

    /// Stop after this many cycles
    #[arg(long)]
    cycles: Option<u64>,

    /// Print snapshots as JSON lines instead of text
    #[arg(long)]
    json: bool,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    /// Also write daily rolling log files into this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

impl Args {
    fn apply(&self, config: &mut ReverieConfig) {
        if let Some(p) = &self.provider {
            config.llm.provider = p.clone();
        }
        if let Some(m) = &self.model {
            config.llm.model = m.clone();
        }
        if let Some(t) = self.tick_secs {
            config.scheduler.tick_interval_secs = t;
        }
        if let Some(db) = &self.db {
            config.storage.db_path = db.clone();
        }
        if self.in_memory {
            config.storage.in_memory = true;
        }
        if self.real_feed {
            config.perception.real_feed = true;
        }
        if self.seed.is_some() {
            config.scheduler.seed = self.seed;
        }
    }
}

/// Console commands typed while the mind runs.
#[derive(Debug, PartialEq)]
enum Input {
    Feed(bool),
    Quit,
}

fn parse_input(line: &str) -> Option<Input> {
    match line.trim().to_lowercase().as_str() {
        "feed on" => Some(Input::Feed(true)),
        "feed off" => Some(Input::Feed(false)),
        "quit" | "exit" => Some(Input::Quit),
        _ => None,
    }
}

fn init_logging(json: bool, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "reverie.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_ansi(false).with_writer(writer)), Some(guard))
        }
        None => (None, None),
    };
    let json_layer = json.then(|| fmt::layer().json().with_writer(std::io::stderr));
    let text_layer = (!json).then(|| fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(file_layer)
        .init();
    guard
}

async fn open_store(config: &ReverieConfig) -> Result<Arc<dyn KvStore>> {
    if config.storage.in_memory {
        info!("Using in-memory store");
        return Ok(Arc::new(InMemoryStore::new()));
    }
    let store = SqliteStore::new(&config.storage.db_path)
        .await
        .with_context(|| format!("Failed to open database {}", config.storage.db_path))?;
    Ok(Arc::new(store))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    let _guard = init_logging(args.log_json, args.log_dir.as_deref());

    let mut config = ReverieConfig::load_or_default(&args.config);
    args.apply(&mut config);
    info!(
        "Starting Reverie (provider={}, tick={}s)",
        config.llm.provider, config.scheduler.tick_interval_secs
    );

    let store = open_store(&config).await?;
    let generator = providers::from_config(&config.llm)?;
    let perception = Perception::from_config(&config.perception);
    let mind = Mind::load(store.as_ref()).await;
    let engine = Engine::new(mind, generator, perception, config.scheduler.seed);

    let tick = TickConfig::from_secs(
        config.scheduler.tick_interval_secs,
        config.scheduler.dream_revert_secs,
    );
    let mut scheduler = Scheduler::new(engine, tick).with_store(store);
    if let Some(n) = args.cycles {
        scheduler = scheduler.with_max_cycles(n);
    }
    let handle = scheduler.spawn();
    let mut snapshots = handle.subscribe();

    if !args.json {
        println!("Reverie is thinking. Commands: feed on | feed off | quit");
    }

    let mut renderer = Renderer::default();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    // Scheduler stopped on its own (cycle limit).
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                let out = if args.json {
                    Some(format!("{}\n", serde_json::to_string(&snapshot)?))
                } else {
                    renderer.render(&snapshot)
                };
                if let Some(out) = out {
                    print!("{}", out);
                    std::io::stdout().flush()?;
                }
            }
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) => match parse_input(&line) {
                    Some(Input::Feed(on)) => {
                        if let Err(e) = handle.set_real_feed(on).await {
                            warn!("{}", e);
                        }
                    }
                    Some(Input::Quit) => break,
                    None if line.trim().is_empty() => {}
                    None => println!("Unknown command. Try: feed on | feed off | quit"),
                },
                Ok(None) => stdin_open = false,
                Err(e) => {
                    warn!("Failed to read stdin: {}", e);
                    stdin_open = false;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }

    let engine = handle.shutdown().await?;
    info!("Stopped after {} cycles", engine.cycles());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_input() {
        assert_eq!(parse_input("feed on"), Some(Input::Feed(true)));
        assert_eq!(parse_input("  FEED OFF "), Some(Input::Feed(false)));
        assert_eq!(parse_input("quit"), Some(Input::Quit));
        assert_eq!(parse_input("hello"), None);
    }

    #[test]
    fn test_args_override_config() {
        let args = Args::parse_from([
            "reverie",
            "--provider",
            "ollama",
            "--tick-secs",
            "3",
            "--in-memory",
            "--seed",
            "42",
        ]);
        let mut config = ReverieConfig::default();
        args.apply(&mut config);
        assert_eq!(config.llm.provider, "ollama");
        assert_eq!(config.scheduler.tick_interval_secs, 3);
        assert!(config.storage.in_memory);
        assert_eq!(config.scheduler.seed, Some(42));
        assert_eq!(config.llm.model, ReverieConfig::default().llm.model);
    }
}
