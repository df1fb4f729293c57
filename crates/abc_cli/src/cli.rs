//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Default configuration file, relative to the working folder.
pub const DEFAULT_CONFIG: &str = ".config/audacity-batch.toml";

/// Audacity Batch Cleaner - noise reduction and compression for a folder of projects
#[derive(Parser, Debug)]
#[command(name = "audacity-batch")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (created with defaults if missing)
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,

    /// Input folder (overrides paths.input_folder)
    #[arg(short, long, global = true)]
    pub input: Option<PathBuf>,

    /// Output folder (overrides paths.output_folder)
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Audacity executable (overrides editor.executable)
    #[arg(short, long, global = true)]
    pub editor: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Process every project in the input folder (default)
    Run,

    /// List the projects that would be processed
    List,

    /// Write the default configuration file
    #[command(name = "init-config")]
    InitConfig {
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_run_without_subcommand() {
        let cli = Cli::parse_from(["audacity-batch"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG));
        assert!(!cli.verbose);
    }

    #[test]
    fn global_overrides_after_subcommand() {
        let cli = Cli::parse_from([
            "audacity-batch",
            "list",
            "--input",
            "/data/in",
            "-v",
        ]);
        assert_eq!(cli.command, Some(Commands::List));
        assert_eq!(cli.input, Some(PathBuf::from("/data/in")));
        assert!(cli.verbose);
    }

    #[test]
    fn init_config_takes_force() {
        let cli = Cli::parse_from(["audacity-batch", "init-config", "--force"]);
        assert_eq!(cli.command, Some(Commands::InitConfig { force: true }));
    }
}
