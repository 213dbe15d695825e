//! Parses command-line arguments for the satsentry CLI.

use std::path::PathBuf;

use clap::{crate_version, Parser, Subcommand};

#[derive(Debug, Parser)]
#[clap(
    name = "satsentry",
    about = "Watches bitcoin addresses and extended public keys for new transactions",
    version = crate_version!()
)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[clap(
        long,
        short = 'c',
        global = true,
        help = "The file containing the configuration for the watcher",
        default_value = "config.toml"
    )]
    pub config: PathBuf,
}

#[derive(Debug, Clone, Subcommand)]
pub(crate) enum Command {
    /// Monitor the configured addresses and extended keys (default).
    Run,

    /// Print addresses derived from an extended public key.
    Derive {
        /// The xpub, ypub or zpub.
        #[arg(long, short = 'k')]
        key: String,

        /// Derive from the change chain instead of the receive chain.
        #[arg(long)]
        change: bool,

        /// First index.
        #[arg(long, default_value_t = 0)]
        start: u32,

        /// Number of addresses.
        #[arg(long, short = 'n', default_value_t = 10)]
        count: u32,
    },

    /// Check whether an extended public key can be used.
    Validate {
        /// The xpub, ypub or zpub.
        #[arg(long, short = 'k')]
        key: String,
    },
}
