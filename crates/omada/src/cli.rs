//! Clap derive structures for the `omada` CLI.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// omada -- inventory CLI for TP-Link Omada controllers
#[derive(Debug, Parser)]
#[command(
    name = "omada",
    version,
    about = "List Omada network devices and switch ports from the command line",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Controller profile to use
    #[arg(long, short = 'p', env = "OMADA_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Controller URL (overrides profile)
    #[arg(long, short = 'c', env = "OMADA_CONTROLLER", global = true)]
    pub controller: Option<String>,

    /// Site name
    #[arg(long, short = 's', env = "OMADA_SITE", global = true)]
    pub site: Option<String>,

    /// Site id (skips the site name lookup)
    #[arg(long, env = "OMADA_SITE_ID", global = true)]
    pub site_id: Option<String>,

    /// Controller login name
    #[arg(long, short = 'u', env = "OMADA_USERNAME", global = true)]
    pub username: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "OMADA_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "OMADA_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile and defaults)
    #[arg(long, env = "OMADA_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output Enum ──────────────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List devices and switch ports
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Log in and report the session state
    Session,

    /// Inspect the configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Devices ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List all devices of the site
    #[command(alias = "ls")]
    List {
        /// Only show devices of this type (exact match, e.g. "switch")
        #[arg(long = "type", short = 't')]
        device_type: Option<String>,
    },

    /// Show one device, including its ports when it is a switch
    Get {
        /// Device MAC address
        #[arg(value_name = "MAC")]
        mac: String,
    },

    /// List the ports of a switch
    Ports {
        /// Switch MAC address
        #[arg(value_name = "MAC")]
        mac: String,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,

    /// Display the loaded configuration (passwords redacted)
    Show,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
