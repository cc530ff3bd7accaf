use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tui_dispatch_debug::DebugCliArgs;

use crate::battle::{RosterSizes, DEFAULT_ROSTER_SIZE, MAX_ROSTER_SIZE};
use crate::catalog::{default_cache_root, DEFAULT_CATALOG_URL};
use crate::persist::default_save_dir;

#[derive(Parser, Debug)]
#[command(name = "pokeduel")]
#[command(about = "Roster battles against the CPU with creatures from PokeAPI")]
pub struct Args {
    #[command(flatten)]
    pub debug: DebugCliArgs,

    /// Creatures on your side, preselected on the setup screen
    #[arg(long, default_value_t = DEFAULT_ROSTER_SIZE as u8,
        value_parser = clap::value_parser!(u8).range(1..=MAX_ROSTER_SIZE as i64))]
    pub player_count: u8,

    /// Creatures on the CPU side, preselected on the setup screen
    #[arg(long, default_value_t = DEFAULT_ROSTER_SIZE as u8,
        value_parser = clap::value_parser!(u8).range(1..=MAX_ROSTER_SIZE as i64))]
    pub cpu_count: u8,

    /// Base URL of the creature catalog
    #[arg(long, default_value = DEFAULT_CATALOG_URL)]
    pub catalog_url: String,

    /// Directory holding the saved match
    #[arg(long)]
    pub save_dir: Option<PathBuf>,

    /// Seconds to wait for the whole roster fetch
    #[arg(long, default_value = "10", value_parser = clap::value_parser!(u64).range(1..))]
    pub fetch_timeout: u64,

    /// Always hit the catalog instead of the local response cache
    #[arg(long)]
    pub no_cache: bool,

    /// Log file (the terminal is owned by the UI)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RuntimeConfig {
    pub catalog_url: String,
    pub save_dir: PathBuf,
    pub cache_root: Option<PathBuf>,
    pub fetch_timeout: Duration,
    pub default_sizes: RosterSizes,
    pub log_file: PathBuf,
}

impl RuntimeConfig {
    pub fn from_args(args: &Args) -> Self {
        let save_dir = args.save_dir.clone().unwrap_or_else(default_save_dir);
        let log_file = args
            .log_file
            .clone()
            .unwrap_or_else(|| save_dir.join("pokeduel.log"));
        Self {
            catalog_url: args.catalog_url.clone(),
            save_dir,
            cache_root: (!args.no_cache).then(default_cache_root),
            fetch_timeout: Duration::from_secs(args.fetch_timeout),
            default_sizes: RosterSizes::new(args.player_count as usize, args.cpu_count as usize),
            log_file,
        }
    }
}
