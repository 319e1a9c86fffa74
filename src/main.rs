use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use league_stats::api::{build_router, state::AppState};
use league_stats::cache::ResultCache;
use league_stats::calculate;
use league_stats::config::AppConfig;
use league_stats::fetch::HttpLeagueClient;
use league_stats::models::{EntryId, HeadToHeadRecord, LeagueId, LeagueStatisticsSnapshot};
use league_stats::pipeline::StatisticsAssembler;

#[derive(Parser)]
#[command(name = "league-stats")]
#[command(about = "Fantasy Premier League mini-league statistics")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a league and print its records and manager table
    Stats {
        /// Classic league id
        #[arg(long)]
        league: u64,

        /// Ignore any cached result
        #[arg(long)]
        refresh: bool,

        /// Print the full snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compare two managers in a league
    H2h {
        #[arg(long)]
        league: u64,

        /// First entry id
        #[arg(long)]
        a: u64,

        /// Second entry id
        #[arg(long)]
        b: u64,
    },

    /// Start the API server
    Serve {
        /// Bind address (defaults to the config value)
        #[arg(long)]
        host: Option<String>,

        /// Port number (defaults to the config value)
        #[arg(long)]
        port: Option<u16>,
    },
}

fn load_config(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    AppConfig::from_file(path).with_context(|| format!("Loading {}", path.display()))
}

fn init_tracing(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn build_assembler(config: &AppConfig) -> Result<StatisticsAssembler> {
    let client = HttpLeagueClient::new(config.fetcher_config())?;
    let cache = ResultCache::new(config.cache_ttl()?, config.cache.capacity);
    Ok(StatisticsAssembler::new(Arc::new(client), Arc::new(cache))
        .with_config(config.pipeline_config()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    init_tracing(level, cli.json_logs);

    tracing::info!("Starting league-stats v{}", env!("CARGO_PKG_VERSION"));

    let assembler = build_assembler(&config)?;
    let progress = |fraction: f64, message: &str| {
        tracing::debug!("[{:>3.0}%] {}", fraction * 100.0, message);
    };

    match cli.command {
        Commands::Stats {
            league,
            refresh,
            json,
        } => {
            let snapshot = assembler
                .fetch_league_statistics(LeagueId::new(league), refresh, &progress)
                .await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&*snapshot)?);
            } else {
                print_snapshot(&snapshot);
            }
        }
        Commands::H2h { league, a, b } => {
            if a == b {
                bail!("--a and --b must be different entries");
            }
            let snapshot = assembler
                .fetch_league_statistics(LeagueId::new(league), false, &progress)
                .await?;

            let find = |raw: u64| {
                snapshot
                    .member(EntryId::new(raw))
                    .with_context(|| format!("Entry {} is not among the analysed members", raw))
            };
            let record = calculate::head_to_head(find(a)?, find(b)?);
            print_head_to_head(&record);
        }
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);

            let state =
                AppState::new(assembler).with_cors_origin(config.server.cors_origin.clone());
            let app = build_router(state);
            let addr = format!("{}:{}", host, port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("Listening on http://{}", addr);
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}

fn print_snapshot(snapshot: &LeagueStatisticsSnapshot) {
    println!(
        "{} ({} managers analysed, generated {})",
        snapshot.league_name,
        snapshot.members.len(),
        snapshot.generated_at.format("%Y-%m-%d %H:%M UTC")
    );

    println!("\nRecords");
    for record in &snapshot.records {
        let gameweek = record
            .gameweek
            .map(|gw| format!(" (GW{})", gw))
            .unwrap_or_default();
        println!(
            "  {:<20} {:>7.1}  {} / {}{}",
            record.record_type.title(),
            record.value,
            record.entry_name,
            record.manager_name,
            gameweek
        );
        if let Some(info) = &record.additional_info {
            println!("  {:<20} {}", "", info);
        }
    }

    println!("\nManagers");
    println!(
        "  {:<28} {:>6} {:>6} {:>5} {:>5}  {}",
        "Team", "Avg", "SD", "Best", "Worst", "Consistency"
    );
    for stats in &snapshot.manager_statistics {
        println!(
            "  {:<28} {:>6.1} {:>6.1} {:>5} {:>5}  {}",
            stats.entry_name,
            stats.average_points,
            stats.standard_deviation,
            stats.best_week.map(|w| w.points.to_string()).unwrap_or_default(),
            stats.worst_week.map(|w| w.points.to_string()).unwrap_or_default(),
            stats.consistency
        );
    }

    if !snapshot.dropped_members.is_empty() {
        println!("\nSkipped");
        for dropped in &snapshot.dropped_members {
            println!("  {} ({}): {}", dropped.entry_name, dropped.entry_id, dropped.reason);
        }
    }
}

fn print_head_to_head(record: &HeadToHeadRecord) {
    println!("{} vs {}", record.member1_name, record.member2_name);
    println!(
        "  W{} D{} L{} over {} gameweeks",
        record.wins, record.draws, record.losses, record.gameweeks_compared
    );
    println!(
        "  Points: {} - {}",
        record.total_points_for, record.total_points_against
    );
    if let Some(win) = record.biggest_win {
        println!("  Biggest win: +{} in GW{}", win.difference, win.gameweek);
    }
    if let Some(loss) = record.biggest_loss {
        println!("  Biggest loss: -{} in GW{}", loss.difference, loss.gameweek);
    }
}
