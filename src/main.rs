// ABOUTME: Entry point for the tdlctl CLI application.
// ABOUTME: Parses arguments and dispatches to appropriate command handlers.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use commands::Session;
use tdlctl::config;
use tdlctl::coordinator::{DeployRequest, DeploySelection, DestroyRequest};
use tdlctl::error::Result;
use tdlctl::output::{Output, OutputMode};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mode = output_mode(&cli);
    let result = run(cli, Output::new(mode)).await;

    if let Err(e) = result {
        Output::new(mode).error(&e.to_string());
        std::process::exit(1);
    }
}

fn output_mode(cli: &Cli) -> OutputMode {
    if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    }
}

async fn run(cli: Cli, output: Output) -> Result<()> {
    let stage = cli.stage.as_deref();

    match cli.command {
        Commands::Init { org, region, force } => {
            let cwd = commands::current_dir()?;
            config::init_config(&cwd, org.as_deref(), stage, region.as_deref(), force)?;
            output.success(&format!("Created {}", config::CONFIG_FILENAME));
            Ok(())
        }
        Commands::Deploy {
            style,
            terms,
            bot,
            models_pack,
            all,
            dry_run,
            yes,
            target,
        } => {
            let request = DeployRequest {
                selection: DeploySelection {
                    style,
                    terms,
                    bot,
                    models_pack,
                    all,
                },
                dry_run,
            };
            commands::deploy(Session::load(stage, output)?, request, yes, target).await
        }
        Commands::Initialize { yes, target } => {
            commands::initialize(Session::load(stage, output)?, yes, target).await
        }
        Commands::Destroy {
            remote,
            schedule_bucket_deletion,
        } => {
            let request = DestroyRequest {
                remote_explicit: remote,
                schedule_bucket_deletion,
            };
            commands::destroy(Session::load(stage, output)?, request).await
        }
        Commands::Services {
            enable,
            key_pair,
            yes,
        } => commands::services(Session::load(stage, output)?, enable, key_pair, yes).await,
        Commands::Invoke {
            function,
            payload,
            yes,
            target,
        } => commands::invoke(Session::load(stage, output)?, function, payload, yes, target).await,
        Commands::Status => commands::status(Session::load(stage, output)?).await,
    }
}
