use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "shipkit")]
#[command(version, about = "Manage Docker Compose deployments on a Shipkit gateway")]
pub struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// GraphQL endpoint; skips discovery
    #[arg(long, env = "SHIPKIT_GRAPHQL_URL", global = true)]
    pub graphql_url: Option<String>,

    /// Console base URL serving `/api/config`
    #[arg(long, env = "SHIPKIT_CONSOLE_URL", global = true)]
    pub console_url: Option<String>,

    /// Forget the cached GraphQL endpoint before running
    #[arg(long, global = true)]
    pub refresh_endpoint: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in to the gateway
    Login {
        #[arg(long, env = "SHIPKIT_EMAIL")]
        email: String,

        /// Prompted for when omitted
        #[arg(long, env = "SHIPKIT_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Create the first admin account
    Register {
        #[arg(long, env = "SHIPKIT_EMAIL")]
        email: String,

        #[arg(long, env = "SHIPKIT_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        /// Defaults to the password when that was passed as a flag
        #[arg(long, hide_env_values = true)]
        confirm_password: Option<String>,
    },
    /// Forget the local session
    Logout,
    /// Show the logged in user
    Whoami,
    /// Change the account password
    ChangePassword {
        #[arg(long, hide_env_values = true)]
        old_password: Option<String>,

        #[arg(long, hide_env_values = true)]
        new_password: Option<String>,

        #[arg(long, hide_env_values = true)]
        confirm_password: Option<String>,
    },
    /// Platform status and the next setup step
    Status,
    /// List deployments with their status
    List,
    /// Show one deployment
    Show { id: String },
    /// Create a deployment from a compose file
    Create {
        #[arg(long)]
        name: String,

        #[arg(long)]
        file: PathBuf,
    },
    /// Rename a deployment or replace its compose file
    Edit {
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Start (restart) a deployment
    Start { id: String },
    /// Stop a deployment
    Stop { id: String },
    /// Delete a deployment
    Delete {
        id: String,

        /// Must equal the deployment name
        #[arg(long)]
        confirm: String,
    },
    /// Domain and SSL settings
    Domain {
        #[command(subcommand)]
        command: DomainCommands,
    },
    /// Live deployments list
    Watch {
        /// Also serve the config relay
        #[arg(long)]
        relay: bool,
    },
    /// Serve the config relay
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        port: Option<u16>,
    },
    /// Print version information
    Version,
}

#[derive(Subcommand)]
pub enum DomainCommands {
    /// Show the configured domain
    Show,
    /// Configure the platform domain
    Setup {
        domain: String,

        /// Serve plain HTTP
        #[arg(long)]
        no_ssl: bool,

        /// Do not redirect HTTP to HTTPS
        #[arg(long)]
        no_force_ssl: bool,

        /// Continue when the domain does not resolve to this server yet
        #[arg(long)]
        skip_validation: bool,
    },
}
