use clap::{Parser, Subcommand};

use std::path::PathBuf;

use super::constants::{
    ENV_CONFIG, ENV_DB_MAX_CONNECTIONS, ENV_DB_PATH, ENV_DEBUG, ENV_HOST, ENV_PORT,
};

#[derive(Parser)]
#[command(name = "im")]
#[command(version, about = "Identity manager: users, groups and memberships", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server host address
    #[arg(long, short = 'H', global = true, env = ENV_HOST)]
    pub host: Option<String>,

    /// Server port
    #[arg(long, short = 'p', global = true, env = ENV_PORT)]
    pub port: Option<u16>,

    /// Enable debug mode
    #[arg(long, global = true, env = ENV_DEBUG)]
    pub debug: bool,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// SQLite database file (defaults to the data directory)
    #[arg(long, global = true, env = ENV_DB_PATH)]
    pub db_path: Option<PathBuf>,

    /// Connection pool size
    #[arg(long, global = true, env = ENV_DB_MAX_CONNECTIONS)]
    pub db_max_connections: Option<u32>,
}

#[derive(Subcommand, Clone, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Start the server (default command)
    Start,
    /// Apply pending schema migrations and exit
    Migrate,
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub debug: bool,
    pub config: Option<PathBuf>,
    pub db_path: Option<PathBuf>,
    pub db_max_connections: Option<u32>,
}

impl From<Cli> for CliConfig {
    fn from(cli: Cli) -> Self {
        Self {
            host: cli.host,
            port: cli.port,
            debug: cli.debug,
            config: cli.config,
            db_path: cli.db_path,
            db_max_connections: cli.db_max_connections,
        }
    }
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Option<Commands>) {
    let mut cli = Cli::parse();
    let command = cli.command.take();
    (cli.into(), command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "im",
            "--host",
            "0.0.0.0",
            "-p",
            "8080",
            "--db-path",
            "/tmp/im.db",
            "--db-max-connections",
            "3",
            "start",
        ])
        .unwrap();
        assert_eq!(cli.command, Some(Commands::Start));

        let config = CliConfig::from(cli);
        assert_eq!(config.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(config.port, Some(8080));
        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/im.db")));
        assert_eq!(config.db_max_connections, Some(3));
    }

    #[test]
    fn test_migrate_subcommand() {
        let cli = Cli::try_parse_from(["im", "migrate", "--debug"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Migrate));
        assert!(cli.debug);
    }

    #[test]
    fn test_invalid_port_rejected() {
        assert!(Cli::try_parse_from(["im", "--port", "70000"]).is_err());
    }
}
