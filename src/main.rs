//! nobotd - bot detection and enforcement daemon.
//!
//! Reads group events from stdin (see [`nobot::script`]) and prints the
//! moderator's notices to stdout.

use nobot::config::{Config, validation};
use nobot::platform::ConsolePlatform;
use nobot::records::SystemClock;
use nobot::script::{ScriptLine, ScriptReader};
use nobot::Moderator;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinSet;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing; NOBOT_LOG_FORMAT=json switches to structured output
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    if std::env::var("NOBOT_LOG_FORMAT").is_ok_and(|format| format == "json") {
        builder.json().init();
    } else {
        builder.init();
    }

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "nobot.toml".to_string());
    let config = Config::load_or_default(&config_path);
    if let Err(errors) = validation::validate(&config) {
        for e in errors {
            warn!(path = %config_path, problem = %e, "Configuration problem");
        }
    }

    info!(
        self_id = %config.platform.self_id,
        probes = config.detection.probe_commands.len(),
        storage = %config.storage.path,
        "Starting nobotd"
    );

    nobot::metrics::init();

    // Load group records
    let store = nobot::storage::open(&config, Arc::new(SystemClock));

    if let Some(port) = config.metrics.port {
        tokio::spawn(nobot::http::run_http_server(port, Arc::clone(&store)));
    }

    let platform = Arc::new(ConsolePlatform::new());
    let moderator = Arc::new(Moderator::new(&config, store, platform.clone()));

    // One task per event so probes keep running while later lines arrive
    let mut reader = ScriptReader::new(config.platform.self_id.clone());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut tasks = JoinSet::new();
    while let Some(line) = lines.next_line().await? {
        match reader.parse_line(&line) {
            Ok(ScriptLine::Blank) => {}
            Ok(ScriptLine::Sleep(pause)) => tokio::time::sleep(pause).await,
            Ok(ScriptLine::Name { account, display }) => platform.set_name(account, display),
            Ok(ScriptLine::Message(event)) => {
                let moderator = Arc::clone(&moderator);
                tasks.spawn(async move { moderator.handle_message(&event).await });
            }
            Err(e) => warn!(error = %e, "Skipping input line"),
        }
        while tasks.try_join_next().is_some() {}
    }

    info!(pending = tasks.len(), "Input closed; waiting for running tasks");
    while tasks.join_next().await.is_some() {}
    info!("nobotd stopped");
    Ok(())
}
