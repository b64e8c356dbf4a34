use super::sync_ui::EpisodeProgress;
use super::AppPaths;
use crate::output::Output;
use color_eyre::eyre::Context;
use color_eyre::Result;
use comfy_table::{Cell, Table};
use owo_colors::OwoColorize;
use reconcile_config::{Config, ConfigError, CredentialStore};
use reconcile_core::{MutationOutcome, ReconcileOptions, ReconcileReport, Reconciler, RunMode};
use reconcile_sources::trakt::refresh_access_token;
use reconcile_sources::{build_http_client, RadarrClient, RetryPolicy, SonarrClient, TraktClient};
use reqwest::Client;
use tracing::{debug, info, warn};

// Stored tokens this close to expiry are refreshed before the run
const REFRESH_MARGIN_HOURS: i64 = 24;

pub async fn run_sync(live: bool, paths: &AppPaths, output: &Output) -> Result<()> {
    debug!("Sync command started");

    let mut config = paths.load_config()?;
    let http = build_http_client(config.sync.request_timeout()).wrap_err("Failed to build HTTP client")?;

    if config.trakt.access_token.is_none() {
        let mut store = paths.load_credentials()?;
        config.trakt.access_token = stored_access_token(&config, &mut store, &http).await;
    }

    check_config(&config, paths, output)?;

    let mode = RunMode::from_live_flag(live);
    let reconciler = build_reconciler(&config, http, mode);

    if mode.is_live() {
        output.warn("Live mode: changes will be applied to the Trakt collection");
    } else {
        output.info("Dry run: no changes will be made to Trakt (use --live to apply)");
    }

    let progress = EpisodeProgress::new(output.is_human() && !output.is_quiet());
    let report = reconciler
        .run(&progress)
        .await
        .wrap_err("Reconciliation aborted")?;

    print_report(&report, output);
    Ok(())
}

fn build_reconciler(config: &Config, http: Client, mode: RunMode) -> Reconciler {
    let retry = RetryPolicy::new(config.sync.retry_attempts, config.sync.retry_delay());
    let access_token = config.trakt.access_token.clone().unwrap_or_default();

    let trakt = TraktClient::new(
        http.clone(),
        config.trakt.api_url.clone(),
        config.trakt.client_id.clone(),
        access_token,
        &config.trakt.username,
        retry,
    );
    let radarr = RadarrClient::new(http.clone(), config.radarr.url.clone(), config.radarr.api_key.clone(), retry);
    let sonarr = SonarrClient::new(http, config.sonarr.url.clone(), config.sonarr.api_key.clone(), retry);

    Reconciler::new(
        Box::new(trakt),
        Box::new(radarr),
        Box::new(sonarr),
        ReconcileOptions {
            mode,
            episode_concurrency: config.sync.episode_concurrency,
        },
    )
}

/// Token from the credential store, refreshed first when it is about to expire
/// and the refresh token and client secret are available
async fn stored_access_token(config: &Config, store: &mut CredentialStore, http: &Client) -> Option<String> {
    let token = store.get_trakt_access_token().cloned()?;

    if !store.trakt_token_expiring(chrono::Duration::hours(REFRESH_MARGIN_HOURS)) {
        return Some(token);
    }

    let refresh_token = match store.get_trakt_refresh_token() {
        Some(refresh) if !refresh.is_empty() && !config.trakt.client_secret.is_empty() => refresh.clone(),
        _ => {
            warn!("Stored Trakt token is expiring and cannot be refreshed; run `trakt-reconcile auth`");
            return Some(token);
        }
    };

    info!("Refreshing Trakt access token");
    match refresh_access_token(
        http,
        &config.trakt.api_url,
        &config.trakt.client_id,
        &config.trakt.client_secret,
        &refresh_token,
    )
    .await
    {
        Ok(refreshed) => {
            store.set_trakt_access_token(refreshed.access_token.clone());
            if !refreshed.refresh_token.is_empty() {
                store.set_trakt_refresh_token(refreshed.refresh_token);
            }
            store.set_trakt_token_expires(refreshed.expires_at);
            if let Err(e) = store.save() {
                warn!("Failed to save refreshed Trakt token: {}", e);
            }
            Some(refreshed.access_token)
        }
        Err(e) => {
            warn!("Trakt token refresh failed, using the stored token: {}", e);
            Some(token)
        }
    }
}

/// Prints every problem, then fails with a short error so the list is not repeated
fn check_config(config: &Config, paths: &AppPaths, output: &Output) -> Result<()> {
    match config.validate() {
        Ok(()) => Ok(()),
        Err(e) => {
            report_config_error(&e, paths, output);
            Err(color_eyre::eyre::eyre!("Configuration incomplete"))
        }
    }
}

fn report_config_error(error: &ConfigError, paths: &AppPaths, output: &Output) {
    match error {
        ConfigError::MissingValues(missing) => {
            output.error("Missing required configuration:");
            for key in missing {
                output.error(format!("  - {}", key));
            }
            output.info(format!(
                "Set them in {} or through environment variables (`trakt-reconcile config init` writes a template)",
                paths.config_file.display()
            ));
        }
        ConfigError::Invalid(message) => output.error(message),
    }
}

fn print_report(report: &ReconcileReport, output: &Output) {
    if !output.is_human() {
        match serde_json::to_value(report) {
            Ok(value) => output.json(&value),
            Err(e) => output.error(format!("Failed to serialize report: {}", e)),
        }
        return;
    }
    if output.is_quiet() {
        if report.has_mutation_failures() {
            output.error("One or more Trakt collection updates failed");
        }
        return;
    }

    if report.shows_degraded {
        output.warn("Sonarr series list unavailable; every tracked show was treated as orphaned");
    }

    let mut table = Table::new();
    table.set_header(vec![
        Cell::new(format!("Reconciliation ({})", report.mode)).add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Count").add_attribute(comfy_table::Attribute::Bold),
    ]);
    table.add_row(vec![Cell::new("Orphaned movies"), Cell::new(report.orphaned_movies.len())]);
    table.add_row(vec![Cell::new("Orphaned shows"), Cell::new(report.orphaned_shows.len())]);
    table.add_row(vec![Cell::new("Missing movies"), Cell::new(report.missing_movies.len())]);
    table.add_row(vec![Cell::new("Missing episodes"), Cell::new(report.missing_episodes.len())]);
    table.add_row(vec![Cell::new("Skipped records"), Cell::new(report.skipped.len())]);
    table.add_row(vec![Cell::new("Episode fetch failures"), Cell::new(report.episode_failures.len())]);
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    println!("{}", table);

    print_titles("Orphaned movies", report.orphaned_movies.iter().map(|m| m.display_title()));
    print_titles("Orphaned shows", report.orphaned_shows.iter().map(|s| s.display_title()));
    print_titles("Missing movies", report.missing_movies.iter().map(|m| m.display_title()));
    print_titles(
        "Missing episodes",
        report
            .missing_episodes
            .iter()
            .map(|e| format!("{} S{:02}E{:02}", e.title, e.season, e.episode)),
    );
    print_titles(
        "Skipped",
        report
            .skipped
            .iter()
            .map(|s| format!("{} [{}]: {}", s.title, s.source, s.reason)),
    );
    print_titles(
        "Episode fetch failures",
        report.episode_failures.iter().map(|f| format!("{}: {}", f.title, f.error)),
    );

    if report.mode.is_live() {
        print_outcome("Removal", &report.removal, output);
        print_outcome("Addition", &report.addition, output);
    }

    if report.is_in_sync() {
        output.success("Trakt collection matches the local libraries");
    }
    output.info(format!("Finished in {:.1}s", report.elapsed_secs).dimmed().to_string());
}

fn print_titles(heading: &str, titles: impl Iterator<Item = String>) {
    let titles: Vec<String> = titles.collect();
    if titles.is_empty() {
        return;
    }
    println!("\n{}", heading.bold().bright_cyan());
    for title in titles {
        println!("  - {}", title);
    }
}

fn print_outcome(label: &str, outcome: &MutationOutcome, output: &Output) {
    match outcome {
        MutationOutcome::NotAttempted => {}
        MutationOutcome::Skipped => output.info(format!("{}: nothing to send", label)),
        MutationOutcome::Succeeded { .. } => output.success(format!("{} succeeded", label)),
        MutationOutcome::Failed { http_status, error } => match http_status {
            Some(status) => output.error(format!("{} failed (HTTP {}): {}", label, status, error)),
            None => output.error(format!("{} failed: {}", label, error)),
        },
    }
}
