use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, bail};
use clap::Parser;
use tokio::sync::mpsc;
use tracing::{info, warn};

use uoscript_client::client::ClientAction;
use uoscript_client::config::{ConfigLoadError, UoScriptConfig};
use uoscript_events::{EventBus, EventSource, SystemEvent};
use uoscript_runner::logging::{default_filter, init_logging};
use uoscript_runner::{EventPump, LoggingConsumer, ReplayFeed, run_replay, run_session};
use uoscript_scripting_host::{
    ScriptEngine, builtin_script, builtin_script_ids, create_engine_from_config,
};

const SESSION_ID: u32 = 1;

#[derive(Parser)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enables debug mode
    #[arg(short, long, action = clap::ArgAction::Count)]
    debug: u8,

    /// Config file to use instead of the default location
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Also write logs to the data directory
    #[arg(long)]
    log_file: bool,

    /// Start a built-in script in addition to the autostart list
    #[arg(short, long = "script")]
    scripts: Vec<String>,

    /// Replay recorded host events from a TOML file instead of running live
    #[arg(short, long)]
    replay: Option<PathBuf>,

    /// Ticks to run when replaying (default: the feed's last tick plus 20)
    #[arg(short, long, requires = "replay")]
    ticks: Option<u64>,

    /// List the built-in scripts and exit
    #[arg(long)]
    list: bool,

    /// Write an example config file and exit
    #[arg(long)]
    init: bool,
}

fn example_config() -> &'static str {
    r#"# uoscript configuration

[engine]
tick_interval_ms = 50
journal_capacity = 250
find_distance = 18

[scripting]
enabled = true
autostart = ["hello_world"]

[scripting.config.bandage_rotation]
threshold_percent = 80

[scripting.config.journal_alert]
text = "You are frozen"
message = "Frozen!"
"#
}

fn create_example_config(path: &Path) -> anyhow::Result<()> {
    // Never overwrite an existing config file
    if path.exists() {
        bail!(
            "Config file already exists at {}. Edit it manually or delete it first.",
            path.display()
        );
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, example_config())?;
    eprintln!("Config file created at: {}", path.display());
    Ok(())
}

fn load_config(path: &Path) -> anyhow::Result<UoScriptConfig> {
    match UoScriptConfig::load_from(path) {
        Ok(config) => Ok(config),
        Err(ConfigLoadError::NotFound) => {
            info!("No config at {}, using defaults", path.display());
            Ok(UoScriptConfig::default())
        }
        Err(err) => Err(err).with_context(|| format!("Failed to load {}", path.display())),
    }
}

fn list_scripts() -> anyhow::Result<()> {
    for id in builtin_script_ids() {
        let script = builtin_script(id, None)?;
        println!("{:<18} {}", id, script.description());
    }
    Ok(())
}

fn start_extra_scripts(engine: &mut ScriptEngine, config: &UoScriptConfig, ids: &[String]) {
    for id in ids {
        let started = builtin_script(id, config.scripting.script_config(id))
            .and_then(|script| engine.spawn(script.as_ref()));
        if let Err(e) = started {
            warn!("Could not start {}: {}", id, e);
        }
    }
}

fn print_action(action: &ClientAction) {
    println!("-> {:?}", action);
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(UoScriptConfig::config_path);

    if cli.init {
        return create_example_config(&config_path);
    }
    if cli.list {
        return list_scripts();
    }

    let _log_guard = init_logging("uoscript", cli.log_file, default_filter(cli.debug))
        .context("Failed to initialize logging")?;

    let config = load_config(&config_path)?;

    let (bus, bus_rx) = EventBus::new(256);
    let mut pump = EventPump::new(bus_rx).with_consumer(LoggingConsumer::new());
    let mut events = bus.create_sender(SESSION_ID);
    events.publish_system(
        SystemEvent::SessionStarted {
            session_id: SESSION_ID,
        },
        EventSource::System,
    );

    let (action_tx, mut action_rx) = mpsc::unbounded_channel();
    let mut engine = create_engine_from_config(
        &config.engine,
        &config.scripting,
        action_tx,
        Some(bus.create_sender(SESSION_ID)),
    );
    start_extra_scripts(&mut engine, &config, &cli.scripts);
    pump.pump();

    if let Some(replay_path) = cli.replay {
        let feed = ReplayFeed::load(&replay_path)
            .with_context(|| format!("Failed to read replay {}", replay_path.display()))?;
        let ticks = cli
            .ticks
            .unwrap_or_else(|| feed.last_tick().unwrap_or(0) + 20);

        let summary = run_replay(&mut engine, &feed, ticks);
        engine.shutdown();
        pump.pump();

        while let Ok(action) = action_rx.try_recv() {
            print_action(&action);
        }
        info!(
            "Replayed {} event(s) over {} tick(s), {} task(s) finished",
            summary.host_events,
            summary.ticks,
            summary.finished.len()
        );
        return Ok(());
    }

    // Nothing decodes a live host here; embedders feed this channel
    let (_host_tx, host_rx) = mpsc::unbounded_channel();
    let printer = tokio::spawn(async move {
        while let Some(action) = action_rx.recv().await {
            print_action(&action);
        }
    });

    info!("Running live session, press Ctrl+C to stop");
    let summary = run_session(&mut engine, host_rx, None, Some(&mut pump)).await;

    events.publish_system(
        SystemEvent::Shutdown {
            session_id: SESSION_ID,
        },
        EventSource::System,
    );
    pump.pump();
    drop(engine);
    if tokio::time::timeout(Duration::from_millis(200), printer)
        .await
        .is_err()
    {
        info!("Action printer did not finish within timeout, continuing shutdown");
    }

    info!(
        "Session ended after {} tick(s), {} task(s) finished",
        summary.ticks,
        summary.finished.len()
    );
    Ok(())
}
