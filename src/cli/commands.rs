//! CLI command implementations
//!
//! Configuration is read here and only here; everything below receives an
//! explicit `Config`. Network work runs on a small tokio runtime owned by the
//! command.

use std::path::Path;

use chrono::Utc;
use tokio::runtime::{Builder, Runtime};

use crate::config::{
    Config, ConfigLoader, DA_ACCESS_TOKEN, DA_CLIENT_ID, DA_CLIENT_SECRET, DA_REDIRECT_URI,
    DA_REFRESH_TOKEN,
};
use crate::deviantart::{
    build_authorize_url, generate_state, ClientOptions, DeviantArtClient, ListingOrder,
    ResponseCache, ScopeCheck,
};
use crate::observability::{log_event_with_fields, Event, Logger, Severity};
use crate::sync::{
    default_workdir, ArtifactWriter, BatchOrchestrator, ContentSource, RunMode, StopSignal,
};

use super::args::{AuthCommand, Cli, Command, GalleryCommand, SyncArgs};
use super::errors::{CliError, CliResult};
use super::io::{gallery_listing_lines, summary_lines, write_lines, ConsoleReporter};

/// Parse arguments and run the selected command
///
/// Returns the process exit code for completed commands.
pub fn run() -> CliResult<i32> {
    let cli = Cli::parse_args();
    if cli.verbose {
        Logger::set_min_severity(Severity::Trace);
    }
    run_command(&cli.env_file, cli.command)
}

/// Run a command against the `.env` file at `env_file`
pub fn run_command(env_file: &Path, command: Option<Command>) -> CliResult<i32> {
    let loader = ConfigLoader::new(env_file).with_process_env();
    match command {
        None => validate(&loader),
        Some(Command::Auth { action }) => match action {
            AuthCommand::LoginUrl { scopes, state } => login_url(&loader, &scopes, state),
            AuthCommand::Exchange { code } => exchange(&loader, &code),
            AuthCommand::Refresh { refresh_token } => refresh(&loader, refresh_token),
            AuthCommand::TokenInfo => token_info(&loader),
        },
        Some(Command::Gallery { action }) => match action {
            GalleryCommand::List {
                gallery,
                literature_only,
                order,
                refresh_cache,
            } => gallery_list(&loader, &gallery, literature_only, order.order(), refresh_cache),
        },
        Some(Command::Sync(args)) => sync(&loader, args),
    }
}

fn build_runtime() -> CliResult<Runtime> {
    Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .map_err(|e| CliError::io_error(format!("Failed to create tokio runtime: {}", e)))
}

fn api_client(
    config: Config,
    runtime: &Runtime,
    order: ListingOrder,
    cache: ResponseCache,
) -> CliResult<DeviantArtClient> {
    let options = ClientOptions {
        order,
        cache: Some(cache),
        ..ClientOptions::default()
    };
    Ok(DeviantArtClient::new(config, runtime.handle().clone(), options)?)
}

/// Bare invocation: check that the required keys are filled in
pub fn validate(loader: &ConfigLoader) -> CliResult<i32> {
    loader.load_validated()?;
    write_lines(&[
        "Configuration looks good. Next: run `da-story-edit auth login-url`.".to_string(),
    ])?;
    Ok(0)
}

pub fn login_url(loader: &ConfigLoader, scopes: &str, state: Option<String>) -> CliResult<i32> {
    let config = loader.require(&[DA_CLIENT_ID, DA_REDIRECT_URI])?;
    let state = state.unwrap_or_else(generate_state);
    let url = build_authorize_url(
        config.client_id().unwrap_or_default(),
        config.redirect_uri().unwrap_or_default(),
        scopes,
        &state,
    )?;
    write_lines(&[url, String::new(), format!("state={}", state)])?;
    Ok(0)
}

fn token_lines(action: &str, scope: &str) -> Vec<String> {
    let mut lines = vec![format!("OAuth {} succeeded. Updated token values in .env.", action)];
    if !scope.is_empty() {
        lines.push(format!("Scope: {}", scope));
    }
    lines
}

pub fn exchange(loader: &ConfigLoader, code: &str) -> CliResult<i32> {
    let config = loader.require(&[DA_CLIENT_ID, DA_CLIENT_SECRET, DA_REDIRECT_URI])?;
    let runtime = build_runtime()?;
    let client = DeviantArtClient::new(config, runtime.handle().clone(), ClientOptions::default())?;

    let tokens = client.exchange_code(code)?;
    write_lines(&token_lines("code exchange", &tokens.scope))?;
    Ok(0)
}

pub fn refresh(loader: &ConfigLoader, refresh_token: Option<String>) -> CliResult<i32> {
    let mut required = vec![DA_CLIENT_ID, DA_CLIENT_SECRET];
    if refresh_token.is_none() {
        required.push(DA_REFRESH_TOKEN);
    }
    let config = loader.require(&required)?;
    let runtime = build_runtime()?;
    let client = DeviantArtClient::new(config, runtime.handle().clone(), ClientOptions::default())?;

    let tokens = client.refresh_tokens(refresh_token.as_deref())?;
    write_lines(&token_lines("refresh", &tokens.scope))?;
    Ok(0)
}

pub fn token_info(loader: &ConfigLoader) -> CliResult<i32> {
    let config = loader.require(&[DA_ACCESS_TOKEN])?;
    let runtime = build_runtime()?;
    let client = DeviantArtClient::new(config, runtime.handle().clone(), ClientOptions::default())?;

    client.validate_access_token()?;

    let config = client.current_config();
    let scope = config.oauth_scope().unwrap_or_default();
    let yes_no = |flag: bool| if flag { "yes" } else { "no" };

    let mut lines = vec!["Access token is valid.".to_string()];
    if scope.is_empty() {
        lines.push("Known scope: unavailable".to_string());
        lines.push(
            "Run `da-story-edit auth refresh` once to capture scope into DA_OAUTH_SCOPE.".to_string(),
        );
    } else {
        let check = ScopeCheck::from_scope(scope);
        lines.push(format!("Known scope: {}", scope));
        lines.push(format!("Has browse: {}", yes_no(check.has_browse)));
        lines.push(format!("Has user.manage: {}", yes_no(check.has_user_manage)));
        if check.is_sufficient() {
            lines.push("Scope check: OK for planned read/write operations.".to_string());
        } else {
            lines.push("Scope check: missing required scopes for full workflow.".to_string());
        }
    }
    write_lines(&lines)?;
    Ok(0)
}

pub fn gallery_list(
    loader: &ConfigLoader,
    gallery: &str,
    literature_only: bool,
    order: ListingOrder,
    refresh_cache: bool,
) -> CliResult<i32> {
    let config = loader.require(&[DA_ACCESS_TOKEN])?;
    let runtime = build_runtime()?;
    let cache = ResponseCache::new(config.cache_dir(), refresh_cache);
    let client = api_client(config, &runtime, order, cache)?;

    let resolved = client.resolve_gallery(gallery)?;
    let mut entries = order.arrange(resolved.deviations.clone());
    if literature_only {
        entries.retain(|item| item.is_literature());
    }

    write_lines(&gallery_listing_lines(&resolved, &entries, order.as_str()))?;
    Ok(0)
}

pub fn sync(loader: &ConfigLoader, args: SyncArgs) -> CliResult<i32> {
    let config = loader.require(&[DA_ACCESS_TOKEN])?;
    let runtime = build_runtime()?;
    let order = args.order.order();
    let cache = if args.reads_cache() {
        ResponseCache::new(config.cache_dir(), false)
    } else {
        ResponseCache::write_only(config.cache_dir())
    };
    let client = api_client(config, &runtime, order, cache)?;

    let sequence = client.list_ordered_literature(&args.gallery)?;
    if sequence.is_empty() {
        return Err(CliError::no_documents());
    }

    // Installed once the snapshot exists; SIGINT during listing still terminates
    let stop = StopSignal::new();
    let handler_stop = stop.clone();
    runtime.spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            handler_stop.request_stop();
        }
    });

    let workdir = args
        .workdir
        .unwrap_or_else(|| default_workdir(Path::new(""), Utc::now()));
    let mut writer = ArtifactWriter::create(workdir)?;

    let mode = if args.dry_run {
        RunMode::DryRun
    } else {
        RunMode::Live
    };
    write_lines(&[
        format!("Sync workdir: {}", writer.dir().display()),
        format!("Gallery: {}", args.gallery.trim()),
        format!("Order: {}", order.as_str()),
        format!("Literature items: {}", sequence.len()),
        format!(
            "Mode: {}",
            if mode == RunMode::DryRun { "dry-run" } else { "live upload" }
        ),
    ])?;

    let mut reporter = ConsoleReporter::stdout(mode);
    let summary = {
        let mut orchestrator = BatchOrchestrator::new(&client, &client, mode)
            .with_stop_signal(stop)
            .observe(&mut reporter)
            .observe(&mut writer);
        orchestrator.run(&sequence)
    };

    if let Err(e) = writer.write_summary(&summary) {
        let detail = e.to_string();
        log_event_with_fields(Event::ArtifactWriteFailed, &[("detail", &detail), ("id", "summary")]);
    }

    write_lines(&summary_lines(&summary))?;
    Ok(summary.exit_code())
}
