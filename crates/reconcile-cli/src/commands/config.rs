use super::AppPaths;
use crate::output::Output;
use crate::ConfigCommands;
use color_eyre::Result;
use comfy_table::{Cell, Table};
use owo_colors::OwoColorize;
use reconcile_config::{Config, CredentialStore};
use serde_json::json;

pub fn run_config(cmd: ConfigCommands, paths: &AppPaths, output: &Output) -> Result<()> {
    match cmd {
        ConfigCommands::Show { full } => show_config(full, paths, output),
        ConfigCommands::Init => init_config(paths, output),
    }
}

fn show_config(full: bool, paths: &AppPaths, output: &Output) -> Result<()> {
    if !paths.config_file.exists() {
        output.warn(format!("Configuration file not found at: {}", paths.config_file.display()));
        output.info("Showing defaults and environment overrides. Run 'trakt-reconcile config init' to create the file.");
    }

    let config = paths.load_config()?;
    let store = paths.load_credentials()?;
    let secret = |value: &str| if full { display_or_unset(value) } else { mask_string(value) };
    let token_source = token_source(&config, &store);

    if !output.is_human() {
        output.json(&json!({
            "config_file": paths.config_file.display().to_string(),
            "trakt": {
                "client_id": secret(&config.trakt.client_id),
                "client_secret": secret(&config.trakt.client_secret),
                "username": config.trakt.username,
                "api_url": config.trakt.api_url,
                "access_token": token_source,
            },
            "radarr": {
                "url": config.radarr.url,
                "api_key": secret(&config.radarr.api_key),
            },
            "sonarr": {
                "url": config.sonarr.url,
                "api_key": secret(&config.sonarr.api_key),
            },
            "sync": {
                "retry_attempts": config.sync.retry_attempts,
                "retry_delay_secs": config.sync.retry_delay_secs,
                "episode_concurrency": config.sync.episode_concurrency,
                "request_timeout_secs": config.sync.request_timeout_secs,
            },
        }));
        return Ok(());
    }
    if output.is_quiet() {
        return Ok(());
    }

    println!("\n{}", "Configuration".bright_cyan().bold());
    println!();

    let mut info_table = Table::new();
    info_table.set_header(vec![
        Cell::new("Config File").add_attribute(comfy_table::Attribute::Bold),
        Cell::new(paths.config_file.display().to_string()),
    ]);
    info_table.add_row(vec![
        Cell::new("Credentials File"),
        Cell::new(paths.manager.credentials_file().display().to_string()),
    ]);
    print_table(info_table);

    print_section(
        "Trakt",
        vec![
            ("Client ID", secret(&config.trakt.client_id)),
            ("Client Secret", secret(&config.trakt.client_secret)),
            ("Username", display_or_unset(&config.trakt.username)),
            ("API URL", config.trakt.api_url.clone()),
            ("Access Token", token_source.to_string()),
        ],
    );
    print_section(
        "Radarr",
        vec![
            ("URL", display_or_unset(&config.radarr.url)),
            ("API Key", secret(&config.radarr.api_key)),
        ],
    );
    print_section(
        "Sonarr",
        vec![
            ("URL", display_or_unset(&config.sonarr.url)),
            ("API Key", secret(&config.sonarr.api_key)),
        ],
    );
    print_section(
        "Sync Options",
        vec![
            ("Retry Attempts", config.sync.retry_attempts.to_string()),
            ("Retry Delay", format!("{}s", config.sync.retry_delay_secs)),
            ("Episode Concurrency", config.sync.episode_concurrency.to_string()),
            (
                "Request Timeout",
                config
                    .sync
                    .request_timeout_secs
                    .map(|s| format!("{}s", s))
                    .unwrap_or_else(|| "none".to_string()),
            ),
        ],
    );

    if let Err(e) = config.validate() {
        output.warn(e.to_string());
    }

    Ok(())
}

fn init_config(paths: &AppPaths, output: &Output) -> Result<()> {
    if paths.config_file.exists() {
        output.warn(format!("Configuration file already exists at: {}", paths.config_file.display()));
        return Ok(());
    }

    paths
        .manager
        .ensure_directories()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to create configuration directories: {}", e))?;
    Config::template()
        .save_to_file(&paths.config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to save config to {}: {}", paths.config_file.display(), e))?;

    output.success(format!("Configuration template written to {}", paths.config_file.display()));
    output.info("Fill in the Trakt, Radarr and Sonarr values, then run 'trakt-reconcile auth'.");
    Ok(())
}

/// Where the Trakt access token will come from, without revealing it
fn token_source(config: &Config, store: &CredentialStore) -> &'static str {
    if config.trakt.access_token.is_some() {
        "from TRAKT_ACCESS_TOKEN"
    } else if store.get_trakt_access_token().is_some() {
        "stored"
    } else {
        "<not set>"
    }
}

fn print_section(title: &str, rows: Vec<(&str, String)>) {
    let mut table = Table::new();
    table.set_header(vec![
        Cell::new(format!("{} Configuration", title))
            .fg(comfy_table::Color::Cyan)
            .add_attribute(comfy_table::Attribute::Bold),
        Cell::new(""),
    ]);
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label), Cell::new(value)]);
    }
    print_table(table);
}

fn print_table(mut table: Table) {
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    println!("{}", table);
    println!();
}

fn display_or_unset(s: &str) -> String {
    if s.is_empty() {
        "<not set>".to_string()
    } else {
        s.to_string()
    }
}

fn mask_string(s: &str) -> String {
    if s.is_empty() {
        return "<not set>".to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}***{}", head, tail)
}
