// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tdlctl")]
#[command(about = "Stack lifecycle and command dispatch for TDL deployments")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output for CI
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// JSON lines output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Stage to operate on (overrides the config file)
    #[arg(short, long, global = true)]
    pub stage: Option<String>,
}

/// Where an invocation runs.
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct TargetArgs {
    /// Run against the local emulator
    #[arg(long, conflicts_with = "remote")]
    pub local: bool,

    /// Run against the deployed remote stack
    #[arg(long)]
    pub remote: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new tdl.yml configuration file
    Init {
        /// Organization name
        #[arg(long)]
        org: Option<String>,

        /// Cloud region
        #[arg(long)]
        region: Option<String>,

        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Send deploy items to the set-config command
    Deploy {
        /// Deploy the style item
        #[arg(long)]
        style: bool,

        /// Deploy the terms item
        #[arg(long)]
        terms: bool,

        /// Deploy the bot item
        #[arg(long)]
        bot: bool,

        /// Deploy the models pack
        #[arg(long)]
        models_pack: bool,

        /// Deploy every item
        #[arg(long)]
        all: bool,

        /// Show what would be deployed without invoking anything
        #[arg(long)]
        dry_run: bool,

        /// Skip confirmation prompts
        #[arg(short, long)]
        yes: bool,

        #[command(flatten)]
        target: TargetArgs,
    },

    /// Run the initialize command against the stack
    Initialize {
        /// Skip confirmation prompts
        #[arg(short, long)]
        yes: bool,

        #[command(flatten)]
        target: TargetArgs,
    },

    /// Destroy the primary stack and its buckets
    Destroy {
        /// Confirm the remote stack is the target
        #[arg(long)]
        remote: bool,

        /// Put a one-day expiry rule on retained buckets instead of emptying them
        #[arg(long)]
        schedule_bucket_deletion: bool,
    },

    /// Create or update the companion services stack
    Services {
        /// Feature to enable (repeatable)
        #[arg(long = "enable", value_name = "FEATURE", required = true)]
        enable: Vec<String>,

        /// Key pair for instances the services stack launches
        #[arg(long)]
        key_pair: Option<String>,

        /// Skip confirmation prompts
        #[arg(short, long)]
        yes: bool,
    },

    /// Invoke a function and print its envelope
    Invoke {
        /// Function short name (e.g. get-config)
        function: String,

        /// JSON argument
        #[arg(long, default_value = "{}")]
        payload: String,

        /// Skip confirmation prompts
        #[arg(short, long)]
        yes: bool,

        #[command(flatten)]
        target: TargetArgs,
    },

    /// Show primary and companion stack status
    Status,
}
