use crate::cli::commands::{
    checkout, config, consumers, coupons, invoices, me, payments, products, subscriptions, webhook,
};
use crate::config::Overrides;
use crate::models::enums::SortDirection;
use crate::models::query::QueryParams;
use crate::utils::output::OutputFormat;
use clap::{Args, Parser, Subcommand};

/// Manage StreamPay resources from the command line.
#[derive(Parser, Debug)]
#[command(name = "streampay", author, version, about)]
pub struct Cli {
    /// API key, overriding the config file
    #[arg(long, env = "STREAMPAY_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// API secret, overriding the config file
    #[arg(long, env = "STREAMPAY_API_SECRET", hide_env_values = true)]
    pub api_secret: Option<String>,

    /// API base URL, overriding the config file
    #[arg(long, env = "STREAMPAY_BASE_URL")]
    pub base_url: Option<String>,

    /// Branch sent as `x-branch-id` on every request
    #[arg(long, env = "STREAMPAY_BRANCH")]
    pub branch: Option<String>,

    /// Log requests and responses to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            api_key: self.api_key.clone(),
            api_secret: self.api_secret.clone(),
            base_url: self.base_url.clone(),
            branch: self.branch.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Save credentials and verify them against the API
    Login(config::Login),
    /// Clear stored credentials
    Logout,
    /// Show the authenticated user and organization
    Me(me::Me),
    /// Manage CLI configuration
    Config(config::Config),
    /// Manage consumers
    Consumers(consumers::Consumers),
    /// Manage products
    Products(products::Products),
    /// Manage subscriptions and freeze periods
    #[command(alias = "subs")]
    Subscriptions(subscriptions::Subscriptions),
    /// Manage invoices
    Invoices(invoices::Invoices),
    /// Manage payments
    Payments(payments::Payments),
    /// Manage coupons
    Coupons(coupons::Coupons),
    /// Manage payment links
    Checkout(checkout::Checkout),
    /// Webhook utilities and signature verification
    Webhook(webhook::Webhook),
}

#[derive(Args, Debug, Clone, Default)]
pub struct FormatArgs {
    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,
}

/// Paging and sorting shared by every list command.
#[derive(Args, Debug, Clone, Default)]
pub struct PageArgs {
    /// Page number, starting at 1
    #[arg(long)]
    pub page: Option<u32>,

    /// Items per page (max 100)
    #[arg(long)]
    pub limit: Option<u32>,

    /// Field to sort by
    #[arg(long)]
    pub sort_field: Option<String>,

    #[arg(long, value_enum, ignore_case = true)]
    pub sort_direction: Option<SortDirection>,
}

impl PageArgs {
    pub fn to_query(&self) -> QueryParams {
        let mut query = QueryParams::new();
        query
            .set("page", self.page)
            .set("limit", self.limit)
            .set("sort_field", self.sort_field.as_deref())
            .set("sort_direction", self.sort_direction.map(SortDirection::as_str));
        query
    }
}
