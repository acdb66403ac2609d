//! CLI module for da-story-edit
//!
//! Provides the command-line interface for:
//! - configuration validation (bare invocation)
//! - auth: OAuth login URL, code exchange, refresh, token info
//! - gallery list: resolved gallery listing
//! - sync: navigation update over a gallery, dry-run or live

mod args;
mod commands;
mod errors;
mod io;

pub use args::{AuthCommand, Cli, Command, GalleryCommand, OrderArgs, SyncArgs};
pub use commands::{
    exchange, gallery_list, login_url, refresh, run, run_command, sync, token_info, validate,
};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{diff_preview, gallery_listing_lines, summary_lines, ConsoleReporter, DIFF_PREVIEW_LINES};
