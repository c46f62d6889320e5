//! xtdash - terminal dashboard
//!
//! Passing network, team shape and the most threatening passes of one match,
//! for a selected team and period.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use xt_cache::{SnapshotMetadata, SnapshotSource, SCHEMA_VERSION};
use xt_core::{
    DashboardConfig, DashboardView, EventCache, EventSource, FileSource, MatchDashboard, MatchId,
    OpenDataSource, Selection, XtError,
};

#[derive(Parser)]
#[command(name = "xtdash")]
#[command(about = "Passing network, team shape and xT passes for one match", long_about = None)]
struct Cli {
    /// Match to analyse (defaults to the configured match)
    #[arg(long, global = true)]
    match_id: Option<MatchId>,

    /// JSON config file (falls back to $XT_CONFIG_PATH)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Read provider event files from this directory instead of the network
    #[arg(long, global = true)]
    offline_dir: Option<PathBuf>,

    /// Keep snapshots of fetched matches in this directory
    #[arg(long, global = true)]
    snapshot_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the teams and periods that can be selected
    Teams,

    /// Show the dashboard for one team and period
    View {
        /// Team name (defaults to the first team in the data)
        #[arg(long)]
        team: Option<String>,

        /// Period (defaults to the first period)
        #[arg(long)]
        period: Option<u8>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Also write the top passes to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Write the match's events to a MsgPack+LZ4 snapshot
    Snapshot {
        /// Output snapshot path
        #[arg(long)]
        out: PathBuf,

        /// Verify the snapshot after writing
        #[arg(long)]
        verify: bool,

        /// Output metadata JSON file
        #[arg(long)]
        metadata: Option<PathBuf>,
    },

    /// Check a snapshot against its checksum
    Verify {
        #[arg(long)]
        path: PathBuf,

        #[arg(long)]
        checksum: String,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let Some(XtError::DataUnavailable { .. }) = e.downcast_ref::<XtError>() {
                eprintln!("❌ Data unavailable: {e}");
                eprintln!("   Check the match id and your connection, then retry.");
            } else {
                eprintln!("❌ {e:#}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    if let Commands::Verify { path, checksum } = &cli.command {
        return verify_snapshot_integrity(path, checksum);
    }

    let mut config = DashboardConfig::resolve(cli.config.as_deref())?;
    if let Some(match_id) = cli.match_id {
        config.match_id = match_id;
    }

    let cache = EventCache::new(build_source(&cli, &config)?);
    log::debug!("Event source: {}", cache.source().describe());
    let dashboard = MatchDashboard::load(&cache, config)?;

    match cli.command {
        Commands::Teams => print_selectors(&dashboard),

        Commands::View {
            team,
            period,
            format,
            csv,
        } => {
            let selection = resolve_selection(&dashboard, team, period)?;
            let view = dashboard.view(&selection);

            match format {
                OutputFormat::Table => print_view(&view),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&view)?),
            }

            if let Some(path) = csv {
                write_top_passes_csv(&path, &view)?;
            }
        }

        Commands::Snapshot {
            out,
            verify,
            metadata,
        } => {
            println!("🔨 Writing snapshot of match {}...", dashboard.match_id());
            println!("   Output: {}", out.display());

            let meta = xt_cache::write_snapshot(dashboard.events(), &out, SCHEMA_VERSION)?;
            print_metadata(&meta);

            if verify {
                verify_snapshot_integrity(&out, &meta.checksum)?;
            }

            if let Some(metadata_path) = metadata {
                xt_cache::save_metadata(&metadata_path, &meta)?;
                println!("\n📄 Metadata saved to: {}", metadata_path.display());
            }
        }

        Commands::Verify { .. } => unreachable!("handled before loading events"),
    }

    Ok(())
}

fn build_source(cli: &Cli, config: &DashboardConfig) -> Result<Box<dyn EventSource>> {
    let base: Box<dyn EventSource> = match &cli.offline_dir {
        Some(dir) => Box::new(FileSource::new(dir)),
        None => Box::new(
            OpenDataSource::from_config(config).context("Failed to create HTTP client")?,
        ),
    };

    Ok(match &cli.snapshot_dir {
        Some(dir) => Box::new(SnapshotSource::new(base, dir)),
        None => base,
    })
}

fn resolve_selection(
    dashboard: &MatchDashboard,
    team: Option<String>,
    period: Option<u8>,
) -> Result<Selection> {
    let Some(default) = dashboard.default_selection() else {
        bail!("Match {} has no events", dashboard.match_id());
    };

    let team = team.unwrap_or(default.team);
    let teams = dashboard.teams();
    if !teams.contains(&team) {
        bail!("Unknown team '{team}'. Available: {}", teams.join(", "));
    }

    let period = period.unwrap_or(default.period);
    let periods = dashboard.periods();
    if !periods.contains(&period) {
        let options: Vec<String> = periods.iter().map(u8::to_string).collect();
        bail!("Unknown period {period}. Available: {}", options.join(", "));
    }

    Ok(Selection::new(team, period))
}

fn print_selectors(dashboard: &MatchDashboard) {
    println!(
        "Match {} ({} events)",
        dashboard.match_id(),
        dashboard.events().len()
    );
    println!("\nTeams:");
    for team in dashboard.teams() {
        println!("   {team}");
    }
    let periods: Vec<String> = dashboard.periods().iter().map(u8::to_string).collect();
    println!("\nPeriods: {}", periods.join(", "));
}

fn print_view(view: &DashboardView) {
    println!("⚽ Passing Network & Team Shape for {}", view.selection.team);
    println!("   Period: {}", view.selection.period);

    println!("\nPlayers ({}):", view.nodes.len());
    println!("   {:<32} {:>7} {:>7}", "Player", "x", "y");
    for node in &view.nodes {
        println!("   {:<32} {:>7.1} {:>7.1}", node.player, node.x, node.y);
    }

    let mut edges: Vec<_> = view.edges.iter().collect();
    edges.sort_by(|a, b| b.pass_count.cmp(&a.pass_count));
    println!("\nPass combinations ({}):", edges.len());
    for edge in edges {
        println!(
            "   {:<20} → {:<20} {:>3}",
            short_name(&edge.passer),
            short_name(&edge.recipient),
            edge.pass_count
        );
    }

    let s = &view.summary;
    println!(
        "\n   Passes: {}  Density: {:.2}  Reciprocity: {:.2}",
        s.total_passes, s.density, s.reciprocity
    );

    if let Some(shape) = &view.shape {
        println!("\nTeam shape ({} hull vertices):", shape.hull.len());
        println!(
            "   Width: {:.1}  Depth: {:.1}  Area: {:.1}",
            shape.width, shape.depth, shape.area
        );
        println!("   Centroid: ({:.1}, {:.1})", shape.centroid.x, shape.centroid.y);
    }

    println!("\n🎯 Key Threatening Passes for {}", view.selection.team);
    if !view.top_passes.is_empty() {
        println!("   {:<32} {:>6} {:>6} {:>9}", "Player", "Minute", "Second", "xT added");
        for pass in &view.top_passes {
            println!(
                "   {:<32} {:>6} {:>6} {:>9.5}",
                pass.player.as_deref().unwrap_or("-"),
                pass.minute,
                pass.second,
                pass.xt_added
            );
        }
    }

    for notice in &view.notices {
        println!("\n⚠️  {notice}");
    }
}

fn short_name(player: &str) -> &str {
    player.split_whitespace().last().unwrap_or(player)
}

fn write_top_passes_csv(path: &Path, view: &DashboardView) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
    for pass in &view.top_passes {
        writer.serialize(pass)?;
    }
    writer.flush()?;
    println!("\n📄 Top passes saved to: {}", path.display());
    Ok(())
}

fn print_metadata(meta: &SnapshotMetadata) {
    println!("\n✅ Snapshot written!");
    println!("   Events:          {}", meta.event_count);
    println!(
        "   Original size:   {} bytes ({:.2} KB)",
        meta.original_size,
        meta.original_size as f64 / 1024.0
    );
    println!(
        "   Compressed size: {} bytes ({:.2} KB)",
        meta.compressed_size,
        meta.compressed_size as f64 / 1024.0
    );
    println!("   Compression:     {:.1}%", meta.compression_ratio * 100.0);
    println!("   Checksum:        {}", meta.checksum);
    println!("   Created:         {}", meta.created_at);
}

fn verify_snapshot_integrity(path: &Path, checksum: &str) -> Result<()> {
    println!("\n🔍 Verifying snapshot integrity...");
    if xt_cache::verify_snapshot(path, checksum)? {
        println!("✅ Snapshot verification passed");
        Ok(())
    } else {
        bail!("Snapshot verification failed - checksum mismatch!")
    }
}
