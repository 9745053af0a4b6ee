use crate::cli::Context;
use crate::config::{CONFIG_PATH_ENV, Overrides, StoredConfig, mask_secret, resolve};
use crate::services::client::StreamClient;
use crate::utils::output::{self, OutputFormat};
use clap::{Args, Subcommand};
use console::style;
use dialoguer::Password;
use eyre::{Result, WrapErr, eyre};
use serde_json::Value;
use std::io::IsTerminal;

const NOT_SET: &str = "(not set)";

/// Save credentials and check them with `GET /me`.
#[derive(Args, Debug)]
pub struct Login {
    #[arg(long, env = "STREAMPAY_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    #[arg(long, env = "STREAMPAY_API_SECRET", hide_env_values = true)]
    api_secret: Option<String>,
    /// Default branch
    #[arg(long, env = "STREAMPAY_BRANCH")]
    branch: Option<String>,
    #[arg(long, env = "STREAMPAY_BASE_URL")]
    base_url: Option<String>,
}

impl Login {
    fn updates(&self, api_key: String) -> StoredConfig {
        let overrides = Overrides {
            api_key: Some(api_key),
            api_secret: self.api_secret.clone(),
            base_url: self.base_url.clone(),
            branch: self.branch.clone(),
        };
        StoredConfig::from(&overrides)
    }

    fn api_key(&self) -> Result<String> {
        if let Some(key) = self.api_key.as_ref().filter(|k| !k.trim().is_empty()) {
            return Ok(key.clone());
        }
        if !std::io::stdin().is_terminal() {
            return Err(eyre!(
                "API key is required. Provide --api-key or set STREAMPAY_API_KEY."
            ));
        }
        let key = Password::new()
            .with_prompt("StreamPay API key")
            .interact()?;
        Ok(key)
    }

    pub async fn run(&self, ctx: &mut Context) -> Result<()> {
        let api_key = self.api_key()?;
        let updates = self.updates(api_key);
        if updates.api_key.is_none() {
            return Err(eyre!("API key must not be empty"));
        }

        let saved = ctx
            .store()
            .save(&updates)
            .wrap_err("Failed to save credentials")?;

        let credential = resolve(&Overrides::default(), &saved)?;
        let client = StreamClient::new(&credential)?;
        let me = client.me().await.wrap_err("Authentication failed")?;

        output::success("Authenticated successfully");
        for line in login_lines(&me) {
            println!("{line}");
        }
        Ok(())
    }
}

fn login_lines(me: &Value) -> Vec<String> {
    let text = |pointer: &str| me.pointer(pointer).and_then(Value::as_str).map(str::to_string);
    let unknown = || style("(unknown)").dim().to_string();
    let environment = text("/environment")
        .or_else(|| text("/mode"))
        .or_else(|| {
            me.pointer("/organization/sandbox")
                .and_then(Value::as_bool)
                .map(|sandbox| if sandbox { "SANDBOX" } else { "LIVE" }.to_string())
        });

    vec![
        format!(
            "  {}: {}",
            style("Organization").yellow(),
            text("/organization/name").unwrap_or_else(unknown)
        ),
        format!(
            "  {}:         {}",
            style("User").yellow(),
            text("/user/email")
                .or_else(|| text("/email"))
                .unwrap_or_else(unknown)
        ),
        format!(
            "  {}: {}",
            style("Environment").yellow(),
            environment.unwrap_or_else(unknown)
        ),
    ]
}

pub fn logout(ctx: &mut Context) -> Result<()> {
    ctx.store()
        .clear()
        .wrap_err("Failed to clear credentials")?;
    output::success("Logged out, credentials cleared");
    output::info("STREAMPAY_* environment variables and .env files are still active");
    Ok(())
}

#[derive(Args, Debug)]
pub struct Config {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Set configuration values
    Set(Set),
    /// Display the current configuration
    Get(Get),
    /// Delete the config file
    Clear,
    /// Print the config file path
    Path,
}

#[derive(Args, Debug)]
struct Set {
    #[arg(long)]
    api_key: Option<String>,
    #[arg(long)]
    api_secret: Option<String>,
    #[arg(long)]
    base_url: Option<String>,
    /// Default branch
    #[arg(long)]
    branch: Option<String>,
    /// Default output format
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,
}

impl Set {
    fn updates(&self) -> StoredConfig {
        let overrides = Overrides {
            api_key: self.api_key.clone(),
            api_secret: self.api_secret.clone(),
            base_url: self.base_url.clone(),
            branch: self.branch.clone(),
        };
        StoredConfig {
            default_format: self.format,
            ..StoredConfig::from(&overrides)
        }
    }
}

#[derive(Args, Debug)]
struct Get {
    /// Print the API key and secret unmasked
    #[arg(long)]
    show_secrets: bool,
}

impl Config {
    pub fn run(&self, ctx: &mut Context) -> Result<()> {
        match &self.cmd {
            Command::Set(args) => set(ctx, args).wrap_err("Failed to update configuration"),
            Command::Get(args) => {
                for line in config_lines(ctx.stored(), args.show_secrets) {
                    println!("{line}");
                }
                Ok(())
            }
            Command::Clear => {
                ctx.store()
                    .clear()
                    .wrap_err("Failed to clear configuration")?;
                output::success("Configuration cleared successfully");
                output::info("STREAMPAY_* environment variables and .env files are still active");
                Ok(())
            }
            Command::Path => {
                println!("{}", ctx.store().path().display());
                Ok(())
            }
        }
    }
}

fn set(ctx: &mut Context, args: &Set) -> Result<()> {
    let updates = args.updates();
    if updates.is_empty() {
        output::warning("No configuration values provided");
        return Ok(());
    }

    ctx.store().save(&updates)?;
    output::success("Configuration updated successfully");
    println!("\n{}", style("Updated values:").cyan());
    for line in updated_lines(&updates) {
        println!("{line}");
    }
    Ok(())
}

/// `key: value` for each field present in `updates`, secrets masked.
fn updated_lines(updates: &StoredConfig) -> Vec<String> {
    let entries = [
        ("apiKey", updates.api_key.as_deref().map(mask_secret)),
        ("apiSecret", updates.api_secret.as_deref().map(mask_secret)),
        ("baseUrl", updates.base_url.clone()),
        ("branch", updates.branch.clone()),
        (
            "defaultFormat",
            updates.default_format.map(|f| f.as_str().to_string()),
        ),
    ];
    entries
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| format!("  {}: {v}", style(key).yellow())))
        .collect()
}

fn config_lines(stored: &StoredConfig, show_secrets: bool) -> Vec<String> {
    let secret = |value: &Option<String>| match value.as_deref().filter(|v| !v.is_empty()) {
        Some(v) if show_secrets => v.to_string(),
        Some(v) => mask_secret(v),
        None => style(NOT_SET).dim().to_string(),
    };
    let plain = |value: &Option<String>, missing: &str| match value.as_deref().filter(|v| !v.is_empty()) {
        Some(v) => v.to_string(),
        None => style(missing).dim().to_string(),
    };
    let format = stored
        .default_format
        .map(|f| f.as_str().to_string())
        .unwrap_or_else(|| style("(pretty)").dim().to_string());
    let row = |label: &str, value: String| format!("  {}{value}", style(format!("{:<16}", format!("{label}:"))).yellow());

    let mut lines = vec![
        String::new(),
        style("Current Configuration:").cyan().to_string(),
        String::new(),
        row("API Key", secret(&stored.api_key)),
        row("API Secret", secret(&stored.api_secret)),
        row("Base URL", plain(&stored.base_url, "(default)")),
        row("Branch", plain(&stored.branch, NOT_SET)),
        row("Default Format", format),
        String::new(),
    ];
    lines.extend(
        [
            "  Configuration sources (in order of priority):".to_string(),
            "    1. CLI flags (--api-key, --api-secret, --base-url, --branch)".to_string(),
            "    2. Environment variables (STREAMPAY_API_KEY, etc.)".to_string(),
            format!("    3. Config file (~/.streampay/config.json, or ${CONFIG_PATH_ENV})"),
        ]
        .into_iter()
        .map(|line| style(line).dim().to_string()),
    );
    lines
}
