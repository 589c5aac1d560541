use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

use scrimboard_core::{BoardRefresh, ScrimConfig};
use scrimboard_discord::{DiscordAdapter, DiscordAppContext, DiscordChannel};
use scrimboard_gateway::{app, ensure_parent_dir};
use scrimboard_scheduler::{BoardRenderer, Reconciler, ReminderEngine};
use scrimboard_store::ScrimStore;

/// Queued board refreshes beyond this are coalesced into the pending one.
const REFRESH_QUEUE: usize = 16;

#[derive(Subcommand)]
enum Command {
    /// Run the web API, the reminder loop and the Discord bot (default)
    Serve,
    /// Create the database schema and seed the roster, then exit
    InitDb,
}

#[derive(Parser)]
#[command(author, version, about = "Scrim schedule board and reminder bot", long_about = None)]
struct Cli {
    /// Path to scrimboard.toml (falls back to SCRIMBOARD_CONFIG, then ./scrimboard.toml)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "scrimboard=info,scrimboard_gateway=info,scrimboard_scheduler=info,\
                 scrimboard_discord=info,scrimboard_store=info,tower_http=debug"
                    .into()
            }),
        )
        .init();

    let cli = Cli::parse();
    let config = ScrimConfig::load(cli.config.as_deref()).unwrap_or_else(|e| {
        warn!("Config load failed ({}), using defaults", e);
        ScrimConfig::default()
    });

    match cli.command.unwrap_or(Command::Serve) {
        Command::InitDb => init_db(&config),
        Command::Serve => serve(config).await,
    }
}

fn init_db(config: &ScrimConfig) -> anyhow::Result<()> {
    let path = &config.database.path;
    ensure_parent_dir(path)?;
    let store = ScrimStore::open(path)?;
    let players = store.list_players()?;
    info!(path = %path, players = players.len(), "database initialised");
    Ok(())
}

async fn serve(config: ScrimConfig) -> anyhow::Result<()> {
    let tz = config.schedule.tz()?;
    let db_path = config.database.path.clone();
    ensure_parent_dir(&db_path)?;
    info!(path = %db_path, timezone = %tz, "opening SQLite database");

    // web handlers and the reminder loop each get their own connection
    let web_store = Arc::new(ScrimStore::open(&db_path)?);

    let (refresh_tx, refresh_rx) = mpsc::channel::<BoardRefresh>(REFRESH_QUEUE);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    if let Some(ref discord) = config.discord {
        let loop_store = Arc::new(ScrimStore::open(&db_path)?);
        let channel = Arc::new(DiscordChannel::from_token(
            &discord.bot_token,
            discord.channel_id,
            discord.mention.clone(),
        ));
        let reconciler = Reconciler::new(
            loop_store,
            channel,
            BoardRenderer::new(tz),
            &config.schedule.thresholds_desc(),
        );
        let engine = ReminderEngine::new(reconciler, Duration::from_secs(config.schedule.tick_secs))
            .with_refresh(refresh_rx);
        tokio::spawn(engine.run(shutdown_rx));

        let discord_app = Arc::new(DiscordAppContext::new(
            Arc::clone(&web_store),
            tz,
            refresh_tx.clone(),
        ));
        let adapter = DiscordAdapter::new(discord, discord_app)?;
        tokio::spawn(adapter.run());
        info!(channel_id = discord.channel_id, "Discord bot started");
    } else {
        warn!("no [discord] section configured; board and reminders are disabled");
        drop(refresh_rx);
    }

    let addr: SocketAddr = format!("{}:{}", config.web.bind, config.web.port).parse()?;
    let state = Arc::new(app::AppState::new(config, web_store, tz, refresh_tx));
    let router = app::build_router(state);

    info!("scrimboard listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // signal the reminder loop to stop
    let _ = shutdown_tx.send(true);
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
