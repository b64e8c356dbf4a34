use super::prompts;
use super::AppPaths;
use crate::output::Output;
use color_eyre::Result;
use owo_colors::OwoColorize;
use reconcile_config::Config;
use reconcile_sources::build_http_client;
use reconcile_sources::trakt::{authorize_url, exchange_code};
use serde_json::json;

pub async fn run_auth(
    client_id_arg: Option<String>,
    client_secret_arg: Option<String>,
    code_arg: Option<String>,
    paths: &AppPaths,
    output: &Output,
) -> Result<()> {
    let config = paths.load_config()?;

    let client_id = match client_id_arg.or_else(|| non_empty(&config.trakt.client_id)) {
        Some(id) => id,
        None => prompts::prompt_string("Trakt Client ID", None)?,
    };
    let client_secret = match client_secret_arg.or_else(|| non_empty(&config.trakt.client_secret)) {
        Some(secret) => secret,
        None => prompts::prompt_password("Trakt Client Secret")?,
    };
    if client_id.trim().is_empty() || client_secret.trim().is_empty() {
        return Err(color_eyre::eyre::eyre!(
            "Trakt client ID and secret are required. Create an application at https://trakt.tv/oauth/applications"
        ));
    }

    let code = match code_arg {
        Some(code) => code,
        None => {
            output.info("");
            output.info(format!("{}", "Trakt authorization".bold().bright_cyan()));
            output.info("Open the following URL, approve the application and copy the code:");
            output.info(format!("  {}", authorize_url(&client_id).bright_blue()));
            output.info("");
            prompts::prompt_string("Authorization code", None)?
        }
    };

    let http = build_http_client(config.sync.request_timeout())?;
    let token = exchange_code(&http, &config.trakt.api_url, &client_id, &client_secret, &code)
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Trakt authorization failed: {}", e))?;

    let mut store = paths.load_credentials()?;
    store.set_trakt_access_token(token.access_token.clone());
    store.set_trakt_refresh_token(token.refresh_token.clone());
    store.set_trakt_token_expires(token.expires_at);
    store
        .save()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to save credentials: {}", e))?;

    // Keep the client credentials so later refreshes can run unattended
    let mut file_config = Config::load_or_default(&paths.config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load config from {}: {}", paths.config_file.display(), e))?;
    if file_config.trakt.client_id != client_id || file_config.trakt.client_secret != client_secret {
        file_config.trakt.client_id = client_id;
        file_config.trakt.client_secret = client_secret;
        file_config.save_to_file(&paths.config_file).map_err(|e| {
            color_eyre::eyre::eyre!("Failed to save config to {}: {}", paths.config_file.display(), e)
        })?;
    }

    if output.is_human() {
        output.success(format!(
            "Trakt authorization stored (token valid until {})",
            token.expires_at.format("%Y-%m-%d %H:%M UTC")
        ));
    } else {
        output.json(&json!({
            "type": "success",
            "message": "Trakt authorization stored",
            "expires_at": token.expires_at.to_rfc3339(),
        }));
    }

    Ok(())
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
