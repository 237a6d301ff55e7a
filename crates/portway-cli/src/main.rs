use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use portway::commands::deploy::{self, DeployArgs, Remote};
use portway::commands::validate::{self, ValidateArgs};
use portway::DEFAULT_API_URL;

#[derive(Parser)]
#[command(name = "portway", version)]
#[command(about = "Validate and deploy compose applications to Portway", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    /// Control plane URL
    #[arg(long, env = "PORTWAY_URL", default_value = DEFAULT_API_URL, global = true)]
    url: String,

    /// API key for the control plane
    #[arg(long, env = "PORTWAY_API_KEY", hide_env_values = true, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a compose application for deployment compatibility
    Validate(ValidateArgs),

    /// Validate a project environment and submit it to the control plane
    Deploy(DeployArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.debug {
        "trace"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // Reports go to stdout, logs to stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(cli.debug)
        .with_writer(std::io::stderr)
        .init();

    let code = match cli.command {
        Commands::Validate(args) => validate::run(&args)?,
        Commands::Deploy(args) => {
            let remote = Remote {
                url: cli.url,
                token: cli.token,
            };
            deploy::run(&args, &remote).await?;
            0
        }
    };

    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_version_flag() {
        let err = Cli::try_parse_from(["portway", "--version"]).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::DisplayVersion);
        assert!(err.to_string().contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_deploy_version_label_is_not_the_version_flag() {
        let cli = Cli::try_parse_from(["portway", "deploy", "--env", "staging", "--version", "v7"]).unwrap();
        match cli.command {
            Commands::Deploy(args) => assert_eq!(args.version.as_deref(), Some("v7")),
            Commands::Validate(_) => panic!("expected deploy"),
        }
    }
}
