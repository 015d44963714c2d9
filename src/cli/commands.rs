use clap::{Parser, Subcommand};

const DEFAULT_CALLER: &str = "local";

/// `aegis-gate` - fail-secure governance in front of a language model.
#[derive(Parser, Debug)]
#[command(name = "aegis-gate")]
#[command(version)]
#[command(about = "Audit every model response before it reaches the caller.", long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactive governed chat (type `exit` or `quit` to leave)
    Chat {
        /// Caller identity used for rate limiting and audit records
        #[arg(long, default_value = DEFAULT_CALLER)]
        caller: String,
    },

    /// Send a single governed message
    Ask {
        /// Message text
        #[arg(short, long)]
        message: String,

        /// Caller identity used for rate limiting and audit records
        #[arg(long, default_value = DEFAULT_CALLER)]
        caller: String,
    },

    /// Run the built-in safety scenarios through the full pipeline
    Eval {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the effective configuration (credential redacted)
    Config,
}
