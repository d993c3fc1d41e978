use std::path::PathBuf;

use clap::{Parser, Subcommand};
use reach_core::{instance::InstanceType, DOT_REACH_SETTINGS_CONFIG};

#[derive(Parser)]
#[command(verbatim_doc_comment)]
///     ____                  __
///    / __ \___  ____ ______/ /_
///   / /_/ / _ \/ __ `/ ___/ __ \
///  / _, _/  __/ /_/ / /__/ / / /
/// /_/ |_|\___/\__,_/\___/_/ /_/
/// CLI client
pub struct Cli {
    /// Instance directory
    #[arg(long, short = 'i')]
    pub instance: PathBuf,
    /// Settings file
    #[arg(long, short = 's', default_value = DOT_REACH_SETTINGS_CONFIG)]
    pub settings: PathBuf,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create a new instance
    Create {
        /// Instance name. Defaults to the directory name
        #[arg(long, short)]
        name: Option<String>,
        /// One of vanilla, fabric, quilt, puzzle
        #[arg(long = "type", short = 't', default_value = "quilt")]
        instance_type: InstanceType,
    },
    /// Show installed mods
    List,
    /// Show versions of a catalog project
    Versions {
        /// Project slug
        project: String,
    },
    /// Install a mod from the catalog
    Install {
        /// Project slug
        project: String,
        /// Version number. The latest version is used if omitted
        #[arg(long, short)]
        version: Option<String>,
    },
    /// Install a mod from a direct link
    InstallUrl {
        #[arg(long, short)]
        url: String,
        /// File name. Defaults to the last segment of the url
        #[arg(long, short)]
        name: Option<String>,
        /// Declared size in bytes
        #[arg(long, default_value_t = 0)]
        size: u64,
    },
}
