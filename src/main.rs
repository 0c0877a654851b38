use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use ussd_registration::cli::{Cli, Command};
use ussd_registration::config::{DEFAULT_CONFIG_FILE, UssdConfig};
use ussd_registration::dialogue::Services;
use ussd_registration::directory::{Directory, StubDirectory, SwitchboardClient};
use ussd_registration::metrics::{InMemoryCounters, LogMetrics, Metrics};
use ussd_registration::notify::{LogOutbound, Notifier};
use ussd_registration::orchestrator::{InboundTurn, Orchestrator};
use ussd_registration::registration;
use ussd_registration::session::{InMemorySessionStore, JsonFileSessionStore, SessionStore};
use ussd_registration::ui::Terminal;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let config = UssdConfig::load(&path)
        .with_context(|| format!("failed to load {}", path.display()))?;

    match cli.command {
        Command::Simulate { from } => simulate(&config, &from).await,
        Command::Check => check(&config).await,
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn directory(config: &UssdConfig) -> Result<Arc<dyn Directory>> {
    match &config.directory {
        Some(live) => {
            tracing::info!(url = %live.url, "using live directory");
            let client = SwitchboardClient::new(
                live.url.clone(),
                live.username.clone(),
                live.password.clone(),
            )?;
            Ok(Arc::new(client))
        }
        None => {
            tracing::info!("using stub directory");
            Ok(Arc::new(StubDirectory::new()))
        }
    }
}

fn services(config: &UssdConfig, directory: Arc<dyn Directory>) -> Result<Services> {
    Ok(Services {
        directory,
        metrics: Metrics::new(
            config.metric_store.clone(),
            Arc::new(LogMetrics),
            Arc::new(InMemoryCounters::new()),
        ),
        notifier: Notifier::new(config.sms_tag(), Arc::new(LogOutbound)),
        address_policy: config.address_policy()?,
        qa: config.qa,
        default_lang: config.default_lang.clone(),
    })
}

async fn simulate(config: &UssdConfig, from: &str) -> Result<()> {
    let store: Arc<dyn SessionStore> = match &config.session_dir {
        Some(dir) => Arc::new(JsonFileSessionStore::new(dir)),
        None => Arc::new(InMemorySessionStore::new()),
    };
    let graph = Arc::new(registration::build_graph()?);
    let orch = Orchestrator::new(graph, services(config, directory(config)?)?, store)
        .with_lifecycle(registration::lifecycle());

    let term = Terminal::new();
    term.banner(from);

    let mut turn = Some(InboundTurn::start(from));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        if let Some(turn) = turn.take() {
            match orch.handle_turn(turn).await {
                Ok(Some(reply)) => term.reply(&reply),
                Ok(None) => term.closed(),
                Err(e) => term.turn_failed(&e),
            }
        }

        let Some(line) = lines.next_line().await? else {
            break;
        };
        turn = Some(match line.trim() {
            ":quit" => break,
            ":close" => InboundTurn::close(from),
            "" => InboundTurn::start(from),
            content => InboundTurn::reply(from, content),
        });
    }
    Ok(())
}

async fn check(config: &UssdConfig) -> Result<()> {
    let graph = Arc::new(registration::build_graph()?);
    let reachable = graph.reachable_from(graph.start().id);
    let unreachable: Vec<_> = graph
        .ids()
        .into_iter()
        .filter(|id| !reachable.contains(id))
        .collect();
    if !unreachable.is_empty() {
        tracing::info!(?unreachable, "nodes kept only for stored sessions");
    }

    // Budget checks run against the canned data so they never touch the API.
    let services = services(config, Arc::new(StubDirectory::new()))?;
    let rendered = registration::render_every_node(graph.clone(), services).await?;
    if !Terminal::new().render_report(&rendered) {
        bail!("dialogue does not fit the reply budget");
    }
    Ok(())
}
