//! wa-gateway-client CLI
//!
//! Connects to the gateway and walks the operator through pairing and the
//! action menu.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;
use wa_gateway_client::config::{
    config_path, load_config_from, read_config_snapshot, save_config, validate_config, Config,
};
use wa_gateway_client::console::TerminalOperator;
use wa_gateway_client::gateway::WebSocketTransport;
use wa_gateway_client::session::SessionClient;
use wa_gateway_client::{Error, Result, VERSION};

#[derive(Parser)]
#[command(
    name = "wa-gateway-client",
    version = VERSION,
    about = "Interactive client for the WhatsApp WebSocket gateway",
    long_about = None
)]
struct Cli {
    /// Gateway WebSocket URL (overrides config and WA_GATEWAY_URL)
    #[arg(long, short)]
    url: Option<String>,

    /// User ID offered at the identity prompt
    #[arg(long)]
    user_id: Option<String>,

    /// Configuration file (JSON5 or TOML)
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Log protocol traffic to stderr
    #[arg(long, short)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a sample configuration file, or write it with --write
    InitConfig {
        /// Write the sample to the config path instead of printing it
        #[arg(long, short)]
        write: bool,

        /// Overwrite an existing config file
        #[arg(long, short)]
        force: bool,
    },

    /// Validate the configuration and report problems
    CheckConfig,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging; stderr keeps it apart from the prompts
    let level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("wa_gateway_client={}", level))),
        )
        .init();

    let result = match cli.command {
        Some(Commands::InitConfig { write, force }) => init_config(cli.config, write, force),
        Some(Commands::CheckConfig) => check_config(cli.config),
        None => connect(cli).await,
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {}", style("✗").red(), e);
            // Usage-style exit for problems the operator can fix locally
            if e.is_client_error() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

/// Resolve config: file < env < flags
fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = load_config_from(cli.config.as_deref())?;

    if let Some(url) = &cli.url {
        config.gateway.url = url.clone();
    }
    if let Some(user_id) = &cli.user_id {
        config.session.default_user_id = user_id.clone();
    }

    let validation = validate_config(&config);
    for warning in &validation.warnings {
        tracing::warn!("{}", warning);
    }
    if let Some(first) = validation.errors.first() {
        return Err(Error::Config(first.to_string()));
    }

    Ok(config)
}

async fn connect(cli: Cli) -> Result<ExitCode> {
    let config = resolve_config(&cli)?;

    println!(
        "{} Connecting to {}",
        style("→").cyan(),
        style(&config.gateway.url).cyan()
    );
    let transport = WebSocketTransport::connect(&config.gateway.url).await?;

    let operator = TerminalOperator::new(config.display.qr);
    let mut client = SessionClient::new(transport, operator, config.session_options());
    let end = client.run().await?;

    if end.is_graceful() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn init_config(path: Option<PathBuf>, write: bool, force: bool) -> Result<ExitCode> {
    let path = path.unwrap_or_else(config_path);

    if !write {
        let sample = serde_json::to_string_pretty(&Config::default())?;
        println!("// Save as {}", path.display());
        println!("{}", sample);
        return Ok(ExitCode::SUCCESS);
    }

    if path.exists() && !force {
        return Err(Error::Config(format!(
            "{} already exists; use --force to overwrite",
            path.display()
        )));
    }

    save_config(&Config::default(), &path)?;
    println!("{} Wrote {}", style("✓").green(), style(path.display()).cyan());
    Ok(ExitCode::SUCCESS)
}

fn check_config(path: Option<PathBuf>) -> Result<ExitCode> {
    let path = path.unwrap_or_else(config_path);
    let snapshot = read_config_snapshot(&path);

    println!("Config file: {}", style(snapshot.path.display()).cyan());
    if snapshot.issues.is_empty() {
        println!("{} No problems found.", style("✓").green());
        return Ok(ExitCode::SUCCESS);
    }

    for issue in &snapshot.issues {
        println!("  {} {}", style("✗").red(), issue);
    }

    let failed = match &snapshot.config {
        Some(config) => !validate_config(config).valid,
        None => snapshot.exists,
    };
    if failed {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
