use anyhow::Result;
use attacher::{Config, ShellWindows, WallpaperAttacher};
use clap::{Parser, Subcommand};
use common::{HostStrategy, ShellProfile, WindowHandle};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "backdrop")]
#[command(about = "Pin a window into the desktop background", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (defaults to <config dir>/backdrop/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reparent a window into the desktop background
    Attach {
        /// Native window handle, decimal or 0x-prefixed hex
        window: WindowHandle,

        /// How to pick the host next to the icon view (next-sibling, matched)
        #[arg(short, long)]
        strategy: Option<HostStrategy>,
    },

    /// Locate the background host without touching any window
    Probe {
        /// How to pick the host next to the icon view (next-sibling, matched)
        #[arg(short, long)]
        strategy: Option<HostStrategy>,

        /// Print the discovery report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.general.log_level.as_str()),
    )
    .init();

    let mut profile = config.shell_profile()?;
    let strategy = match &cli.command {
        Commands::Attach { strategy, .. } | Commands::Probe { strategy, .. } => *strategy,
    };
    if let Some(strategy) = strategy {
        log::debug!("Host strategy overridden: {}", strategy);
        profile.host_strategy = strategy;
    }

    run(profile, cli.command)
}

#[cfg(windows)]
fn run(profile: ShellProfile, command: Commands) -> Result<()> {
    let attacher = WallpaperAttacher::new(attacher::Win32Shell::new(), profile);
    execute(&attacher, command)
}

#[cfg(not(windows))]
fn run(_profile: ShellProfile, _command: Commands) -> Result<()> {
    anyhow::bail!("backdrop attaches to the Windows desktop shell and cannot run on this platform")
}

#[cfg_attr(not(windows), allow(dead_code))]
fn execute<P: ShellWindows>(attacher: &WallpaperAttacher<P>, command: Commands) -> Result<()> {
    match command {
        Commands::Attach { window, .. } => {
            log::info!(
                "Attaching {} (strategy: {})",
                window,
                attacher.profile().host_strategy
            );
            match attacher.attach(window) {
                Ok(()) => {
                    println!("✓ {} is now part of the desktop background", window);
                }
                Err(e) => {
                    eprintln!("✗ Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Probe { json, .. } => match attacher.discover() {
            Ok(discovery) if json => {
                println!("{}", serde_json::to_string_pretty(&discovery)?);
            }
            Ok(discovery) => {
                println!("Desktop Shell:");
                println!(
                    "  Root ({}): {}",
                    attacher.profile().root_class,
                    discovery.shell_root
                );
                println!(
                    "  Spawn directive: {}",
                    if discovery.directive_delivered {
                        "delivered"
                    } else {
                        "timed out"
                    }
                );
                println!(
                    "  Icon view host ({}): {}",
                    attacher.profile().icon_view_class,
                    discovery.anchor
                );
                println!(
                    "  Background host ({}): {}",
                    attacher.profile().host_strategy,
                    discovery.host
                );
            }
            Err(e) => {
                if json {
                    println!("{}", serde_json::to_string_pretty(&e)?);
                }
                eprintln!("✗ Error: {}", e);
                std::process::exit(1);
            }
        },
    }

    Ok(())
}
