// Waiver assistant entry point.
//
// Startup sequence:
// 1. Initialize tracing (stderr; stdout carries the report)
// 2. Load config (copying defaults on first run)
// 3. Fetch and reconcile every source
// 4. Rank the free agents
// 5. Print the squad and the ranked table

mod view;

use std::path::PathBuf;

use anyhow::Context;
use tracing::info;
use waiver_core::{config, pipeline, ranking};

fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing()?;

    // 2. Load config
    let base_dir = match std::env::args_os().nth(1) {
        Some(dir) => PathBuf::from(dir),
        None => std::env::current_dir().context("failed to read current directory")?,
    };
    let config = config::load_config_in(&base_dir)
        .with_context(|| format!("failed to load configuration from {}", base_dir.display()))?;
    info!(
        "Config loaded: league={}, team={}, top_n={}, filter={:?}",
        config.league.league_id, config.league.team_id, config.ranking.top_n, config.ranking.filter
    );

    // 3. Fetch and reconcile
    let fetcher = pipeline::http_fetcher(&config).context("failed to set up HTTP fetcher")?;
    let output = pipeline::run(&fetcher, &config).context("failed to load league data")?;

    // 4. Rank
    let ranked = ranking::rank(
        &output.pool,
        &config.weights,
        config.ranking.filter,
        config.ranking.top_n,
    );
    info!(
        "Ranked {} of {} players (generated {})",
        ranked.len(),
        output.pool.len(),
        chrono::Local::now().format("%Y-%m-%d %H:%M")
    );

    // 5. Report
    let squad = output.my_squad();
    print!("{}", view::render_squad(&squad, &output.pool));
    println!();
    print!("{}", view::render_available(&ranked));

    Ok(())
}

/// Initialize tracing to stderr.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("waiver_core=info,waiver_app=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
