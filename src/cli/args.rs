//! CLI argument definitions using clap
//!
//! Commands:
//! - da-story-edit                      (validate configuration)
//! - da-story-edit auth login-url|exchange|refresh|token-info
//! - da-story-edit gallery list <gallery>
//! - da-story-edit sync <gallery> [-n] [--use-cache]

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::deviantart::{ListingOrder, DEFAULT_SCOPES};

/// DeviantArt literature navigation editor
#[derive(Parser, Debug)]
#[command(name = "da-story-edit")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the .env configuration file
    #[arg(long, global = true, default_value = ".env")]
    pub env_file: PathBuf,

    /// Emit TRACE-level structured logs on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// OAuth helper commands
    Auth {
        #[command(subcommand)]
        action: AuthCommand,
    },

    /// Gallery operations
    Gallery {
        #[command(subcommand)]
        action: GalleryCommand,
    },

    /// Download literature deviations, edit navigation locally, and optionally upload
    Sync(SyncArgs),
}

#[derive(Subcommand, Debug)]
pub enum AuthCommand {
    /// Print the DeviantArt OAuth authorize URL
    LoginUrl {
        /// Space-separated OAuth scopes
        #[arg(long, default_value = DEFAULT_SCOPES)]
        scopes: String,

        /// OAuth state value, generated if omitted
        #[arg(long)]
        state: Option<String>,
    },

    /// Exchange an authorization code for tokens and store them in .env
    Exchange {
        /// Authorization code from the redirect
        #[arg(long)]
        code: String,
    },

    /// Refresh the access token and store the new tokens in .env
    Refresh {
        /// Refresh token override (defaults to DA_REFRESH_TOKEN)
        #[arg(long)]
        refresh_token: Option<String>,
    },

    /// Validate the current access token and show known scope information
    TokenInfo,
}

#[derive(Subcommand, Debug)]
pub enum GalleryCommand {
    /// List deviations for a gallery URL or username
    List {
        /// Gallery URL (preferred) or DeviantArt username
        gallery: String,

        /// Show only literature deviations
        #[arg(long)]
        literature_only: bool,

        #[command(flatten)]
        order: OrderArgs,

        /// Ignore cached listing responses and refetch them
        #[arg(long)]
        refresh_cache: bool,
    },
}

/// Mutually exclusive listing order flags; descending when neither is given
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct OrderArgs {
    /// Keep gallery order as shown on DeviantArt (manual order)
    #[arg(long, conflicts_with = "descending")]
    pub ascending: bool,

    /// Reverse gallery order (useful when chapters were posted over time)
    #[arg(long)]
    pub descending: bool,
}

impl OrderArgs {
    pub fn order(&self) -> ListingOrder {
        if self.ascending {
            ListingOrder::Ascending
        } else {
            ListingOrder::Descending
        }
    }
}

#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Gallery URL (preferred) or DeviantArt username
    pub gallery: String,

    /// Do not upload; show planned changes only
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Working directory for downloaded and edited files (must be empty if it exists)
    #[arg(long)]
    pub workdir: Option<PathBuf>,

    #[command(flatten)]
    pub order: OrderArgs,

    /// Refetch listing responses instead of reading the cache (the default)
    #[arg(long)]
    pub refresh_cache: bool,

    /// Reuse listing responses cached by earlier commands
    #[arg(long, conflicts_with = "refresh_cache")]
    pub use_cache: bool,
}

impl SyncArgs {
    /// Whether the listing may come from the cache instead of the API
    ///
    /// Off unless asked for: a run's sequence is the live listing at run start.
    pub fn reads_cache(&self) -> bool {
        self.use_cache && !self.refresh_cache
    }
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
