pub mod args;
pub mod commands;

use crate::cli::args::{Cli, Command, FormatArgs};
use crate::config::{self, ConfigStore, Overrides, StoredConfig};
use crate::services::client::StreamClient;
use crate::utils::logging;
use crate::utils::output::{self, OutputFormat, View};
use clap::Parser;
use eyre::Result;
use serde_json::Value;
use tracing::debug;

/// Per-invocation state shared by every command.
#[derive(Debug)]
pub struct Context {
    store: ConfigStore,
    overrides: Overrides,
    stored: StoredConfig,
}

impl Context {
    pub fn new(store: ConfigStore, overrides: Overrides) -> Self {
        let stored = store.load();
        Self {
            store,
            overrides,
            stored,
        }
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    pub fn stored(&self) -> &StoredConfig {
        &self.stored
    }

    /// Build a client from flags, environment and the config file.
    pub fn client(&self) -> Result<StreamClient> {
        let credential = config::resolve(&self.overrides, &self.stored)?;
        let client = StreamClient::new(&credential)?;
        debug!(api_url = client.api_url(), "client ready");
        Ok(client)
    }

    /// An explicit `--format` wins, then the configured default, then the
    /// command's own default.
    pub fn format(&self, args: &FormatArgs, fallback: OutputFormat) -> OutputFormat {
        args.format
            .or(self.stored.default_format)
            .unwrap_or(fallback)
    }

    pub fn render(
        &self,
        value: &Value,
        args: &FormatArgs,
        fallback: OutputFormat,
        view: View,
    ) -> Result<()> {
        output::render(value, self.format(args, fallback), view)
    }
}

impl Command {
    pub async fn run(&self, ctx: &mut Context) -> Result<()> {
        match self {
            Command::Login(login) => login.run(ctx).await,
            Command::Logout => commands::config::logout(ctx),
            Command::Me(me) => me.run(ctx).await,
            Command::Config(config) => config.run(ctx),
            Command::Consumers(consumers) => consumers.run(ctx).await,
            Command::Products(products) => products.run(ctx).await,
            Command::Subscriptions(subscriptions) => subscriptions.run(ctx).await,
            Command::Invoices(invoices) => invoices.run(ctx).await,
            Command::Payments(payments) => payments.run(ctx).await,
            Command::Coupons(coupons) => coupons.run(ctx).await,
            Command::Checkout(checkout) => checkout.run(ctx).await,
            Command::Webhook(webhook) => webhook.run(ctx),
        }
    }
}

pub async fn run() -> Result<()> {
    // Variables already in the environment win over `.env` entries.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    logging::init_logging(cli.verbose)?;

    let store = ConfigStore::locate()?;
    debug!(path = ?store.path(), "using config file");
    let mut ctx = Context::new(store, cli.overrides());
    cli.command.run(&mut ctx).await
}
