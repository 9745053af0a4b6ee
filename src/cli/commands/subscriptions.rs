use super::{raw_or, require};
use crate::cli::Context;
use crate::cli::args::{FormatArgs, PageArgs};
use crate::models::enums::{Currency, SubscriptionStatus, wire_list};
use crate::models::query::QueryParams;
use crate::utils::output::{self, OutputFormat, View};
use crate::utils::parse::{Body, InputError, parse_json_array, parse_json_object, split_csv};
use clap::{Args, Subcommand};
use eyre::{Result, WrapErr};
use serde_json::Value;

#[derive(Args, Debug)]
pub struct Subscriptions {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a new subscription
    Create(Create),
    /// Get a subscription by ID
    Get(Target),
    /// List subscriptions
    List(List),
    /// Update a subscription; items and coupons are full replacements
    Update(Update),
    /// Cancel a subscription
    Cancel(Cancel),
    /// Create a freeze period for a subscription
    Freeze(Freeze),
    /// List the freeze periods of a subscription
    FreezeList(FreezeList),
    /// Update a freeze period
    FreezeUpdate(FreezeUpdate),
    /// Delete a freeze period
    FreezeDelete(FreezeTarget),
    /// Lift the current freeze of a subscription
    Unfreeze(Target),
}

#[derive(Args, Debug)]
struct Target {
    /// Subscription ID
    id: String,
    #[command(flatten)]
    format: FormatArgs,
}

#[derive(Args, Debug)]
struct FreezeTarget {
    /// Subscription ID
    subscription_id: String,
    /// Freeze period ID
    freeze_id: String,
    #[command(flatten)]
    format: FormatArgs,
}

#[derive(Args, Debug)]
struct Create {
    /// Consumer ID (organization_consumer_id)
    #[arg(long)]
    consumer_id: Option<String>,
    /// Period start (ISO 8601)
    #[arg(long)]
    period_start: Option<String>,
    /// Items as a JSON array, e.g. '[{"product_id":"uuid","quantity":1}]'
    #[arg(long)]
    items: Option<String>,
    /// Notify the consumer (the API default)
    #[arg(long, conflicts_with = "no_notify_consumer")]
    notify_consumer: bool,
    /// Do not notify the consumer
    #[arg(long)]
    no_notify_consumer: bool,
    #[arg(long)]
    description: Option<String>,
    /// Coupon IDs as a JSON array
    #[arg(long)]
    coupons: Option<String>,
    /// Stop after this many billing cycles
    #[arg(long)]
    until_cycle_number: Option<u32>,
    #[arg(long, value_enum, ignore_case = true)]
    currency: Option<Currency>,
    #[arg(long)]
    exclude_coupons_if_installments: bool,
    /// Payment method overrides as a JSON object
    #[arg(long)]
    override_payment_methods: Option<String>,
    /// Raw JSON body, overriding every other field flag
    #[arg(long)]
    data: Option<String>,
    #[command(flatten)]
    format: FormatArgs,
}

impl Create {
    fn notify(&self) -> Option<bool> {
        match (self.notify_consumer, self.no_notify_consumer) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }

    fn body(&self) -> Result<Value, InputError> {
        raw_or(self.data.as_deref(), || {
            let consumer_id = require(&self.consumer_id, "--consumer-id")?;
            let period_start = require(&self.period_start, "--period-start")?;
            let items = require(&self.items, "--items")?;

            let mut body = Body::new();
            body.set("organization_consumer_id", consumer_id.as_str())
                .set("period_start", period_start.as_str())
                .set("items", parse_json_array("--items", items)?)
                .set_opt("notify_consumer", self.notify())
                .set_opt("description", self.description.clone());
            if let Some(coupons) = &self.coupons {
                body.set("coupons", parse_json_array("--coupons", coupons)?);
            }
            body.set_opt("until_cycle_number", self.until_cycle_number)
                .set_opt("currency", self.currency.map(Currency::as_str))
                .set_flag(
                    "exclude_coupons_if_installments",
                    self.exclude_coupons_if_installments,
                );
            if let Some(methods) = &self.override_payment_methods {
                body.set(
                    "override_payment_methods",
                    parse_json_object("--override-payment-methods", methods)?,
                );
            }
            Ok(body.into_value())
        })
    }
}

#[derive(Args, Debug)]
struct List {
    #[command(flatten)]
    page: PageArgs,
    #[arg(long)]
    search: Option<String>,
    /// Comma-separated statuses (INACTIVE, ACTIVE, EXPIRED, CANCELED, FROZEN)
    #[arg(long, value_enum, ignore_case = true, value_delimiter = ',')]
    statuses: Vec<SubscriptionStatus>,
    /// Only subscriptions whose latest invoice is paid
    #[arg(long, conflicts_with = "latest_invoice_unpaid")]
    latest_invoice_paid: bool,
    /// Only subscriptions whose latest invoice is unpaid
    #[arg(long)]
    latest_invoice_unpaid: bool,
    #[arg(long)]
    from_date: Option<String>,
    #[arg(long)]
    to_date: Option<String>,
    #[arg(long)]
    from_price: Option<f64>,
    #[arg(long)]
    to_price: Option<f64>,
    /// Consumer ID (organization_consumer_id)
    #[arg(long)]
    consumer_id: Option<String>,
    /// Comma-separated product IDs
    #[arg(long)]
    product_ids: Option<String>,
    /// Comma-separated currency codes
    #[arg(long, value_enum, ignore_case = true, value_delimiter = ',')]
    currencies: Vec<Currency>,
    #[arg(long)]
    period_start_from: Option<String>,
    #[arg(long)]
    period_start_to: Option<String>,
    #[arg(long)]
    period_end_from: Option<String>,
    #[arg(long)]
    period_end_to: Option<String>,
    #[command(flatten)]
    format: FormatArgs,
}

impl List {
    fn query(&self) -> QueryParams {
        let latest_invoice_is_paid = match (self.latest_invoice_paid, self.latest_invoice_unpaid) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };
        let currencies = (!self.currencies.is_empty()).then(|| wire_list(&self.currencies).join(","));

        let mut query = self.page.to_query();
        query
            .set("search_term", self.search.as_deref())
            .set("statuses", wire_list(&self.statuses))
            .set("latest_invoice_is_paid", latest_invoice_is_paid)
            .set("from_date", self.from_date.as_deref())
            .set("to_date", self.to_date.as_deref())
            .set("from_price", self.from_price)
            .set("to_price", self.to_price)
            .set("organization_consumer_id", self.consumer_id.as_deref())
            .set(
                "product_ids",
                self.product_ids.as_deref().map(split_csv).unwrap_or_default(),
            )
            .set("currencies", currencies)
            .set(
                "current_period_start_from_date",
                self.period_start_from.as_deref(),
            )
            .set("current_period_start_to_date", self.period_start_to.as_deref())
            .set("current_period_end_from_date", self.period_end_from.as_deref())
            .set("current_period_end_to_date", self.period_end_to.as_deref());
        query
    }
}

#[derive(Args, Debug)]
struct Update {
    /// Subscription ID
    id: String,
    /// Full replacement items as a JSON array
    #[arg(long)]
    items: Option<String>,
    /// Full replacement coupon IDs as a JSON array
    #[arg(long)]
    coupons: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    until_cycle_number: Option<u32>,
    /// Payment method overrides as a JSON object
    #[arg(long)]
    override_payment_methods: Option<String>,
    /// Raw JSON body, overriding every other field flag
    #[arg(long)]
    data: Option<String>,
    #[command(flatten)]
    format: FormatArgs,
}

impl Update {
    fn body(&self) -> Result<Value, InputError> {
        raw_or(self.data.as_deref(), || {
            let items = require(&self.items, "--items")?;
            let coupons = require(&self.coupons, "--coupons")?;

            let mut body = Body::new();
            body.set("items", parse_json_array("--items", items)?)
                .set("coupons", parse_json_array("--coupons", coupons)?)
                .set_opt("description", self.description.clone())
                .set_opt("until_cycle_number", self.until_cycle_number);
            if let Some(methods) = &self.override_payment_methods {
                body.set(
                    "override_payment_methods",
                    parse_json_object("--override-payment-methods", methods)?,
                );
            }
            Ok(body.into_value())
        })
    }
}

#[derive(Args, Debug)]
struct Cancel {
    /// Subscription ID
    id: String,
    /// Also cancel the related invoices
    #[arg(long)]
    cancel_invoices: bool,
    /// Raw JSON body, overriding every other field flag
    #[arg(long)]
    data: Option<String>,
    #[command(flatten)]
    format: FormatArgs,
}

impl Cancel {
    fn body(&self) -> Result<Value, InputError> {
        raw_or(self.data.as_deref(), || {
            let mut body = Body::new();
            body.set_flag("cancel_related_invoices", self.cancel_invoices);
            Ok(body.into_value())
        })
    }
}

#[derive(Args, Debug)]
struct Freeze {
    /// Subscription ID
    id: String,
    /// Freeze start (ISO 8601)
    #[arg(long)]
    freeze_start: Option<String>,
    /// Freeze end (ISO 8601); omit for an indefinite freeze
    #[arg(long)]
    freeze_end: Option<String>,
    #[arg(long)]
    notes: Option<String>,
    /// Raw JSON body, overriding every other field flag
    #[arg(long)]
    data: Option<String>,
    #[command(flatten)]
    format: FormatArgs,
}

impl Freeze {
    fn body(&self) -> Result<Value, InputError> {
        raw_or(self.data.as_deref(), || {
            let start = require(&self.freeze_start, "--freeze-start")?;
            let mut body = Body::new();
            body.set("freeze_start_datetime", start.as_str())
                .set_opt("freeze_end_datetime", self.freeze_end.clone())
                .set_opt("notes", self.notes.clone());
            Ok(body.into_value())
        })
    }
}

#[derive(Args, Debug)]
struct FreezeList {
    /// Subscription ID
    subscription_id: String,
    #[command(flatten)]
    page: PageArgs,
    #[command(flatten)]
    format: FormatArgs,
}

#[derive(Args, Debug)]
struct FreezeUpdate {
    /// Subscription ID
    subscription_id: String,
    /// Freeze period ID
    freeze_id: String,
    /// Freeze start (ISO 8601), required even if unchanged
    #[arg(long)]
    freeze_start: Option<String>,
    /// Freeze end (ISO 8601); omitted means indefinite
    #[arg(long, conflicts_with = "no_freeze_end")]
    freeze_end: Option<String>,
    /// Make the freeze indefinite
    #[arg(long)]
    no_freeze_end: bool,
    #[arg(long)]
    notes: Option<String>,
    /// Raw JSON body, overriding every other field flag
    #[arg(long)]
    data: Option<String>,
    #[command(flatten)]
    format: FormatArgs,
}

impl FreezeUpdate {
    fn body(&self) -> Result<Value, InputError> {
        raw_or(self.data.as_deref(), || {
            let start = require(&self.freeze_start, "--freeze-start")?;
            // The API requires the end field, null meaning indefinite.
            let end = match (&self.freeze_end, self.no_freeze_end) {
                (Some(end), false) => Value::String(end.clone()),
                _ => Value::Null,
            };
            let mut body = Body::new();
            body.set("freeze_start_datetime", start.as_str())
                .set("freeze_end_datetime", end)
                .set_opt("notes", self.notes.clone());
            Ok(body.into_value())
        })
    }
}

impl Subscriptions {
    pub async fn run(&self, ctx: &mut Context) -> Result<()> {
        match &self.cmd {
            Command::Create(args) => create(ctx, args)
                .await
                .wrap_err("Failed to create subscription"),
            Command::Get(args) => get(ctx, args).await.wrap_err("Failed to get subscription"),
            Command::List(args) => list(ctx, args).await.wrap_err("Failed to list subscriptions"),
            Command::Update(args) => update(ctx, args)
                .await
                .wrap_err("Failed to update subscription"),
            Command::Cancel(args) => cancel(ctx, args)
                .await
                .wrap_err("Failed to cancel subscription"),
            Command::Freeze(args) => freeze(ctx, args)
                .await
                .wrap_err("Failed to freeze subscription"),
            Command::FreezeList(args) => freeze_list(ctx, args)
                .await
                .wrap_err("Failed to list subscription freeze periods"),
            Command::FreezeUpdate(args) => freeze_update(ctx, args)
                .await
                .wrap_err("Failed to update freeze period"),
            Command::FreezeDelete(args) => freeze_delete(ctx, args)
                .await
                .wrap_err("Failed to delete freeze period"),
            Command::Unfreeze(args) => unfreeze(ctx, args)
                .await
                .wrap_err("Failed to unfreeze subscription"),
        }
    }
}

async fn create(ctx: &Context, args: &Create) -> Result<()> {
    let body = args.body()?;
    let subscription = ctx.client()?.create_subscription(&body).await?;
    output::success("Subscription created successfully");
    ctx.render(&subscription, &args.format, OutputFormat::Pretty, View::Subscriptions)
}

async fn get(ctx: &Context, args: &Target) -> Result<()> {
    let subscription = ctx.client()?.get_subscription(&args.id).await?;
    output::success("Subscription retrieved successfully");
    ctx.render(&subscription, &args.format, OutputFormat::Pretty, View::Subscriptions)
}

async fn list(ctx: &Context, args: &List) -> Result<()> {
    let subscriptions = ctx.client()?.list_subscriptions(&args.query()).await?;
    ctx.render(&subscriptions, &args.format, OutputFormat::Table, View::Subscriptions)
}

async fn update(ctx: &Context, args: &Update) -> Result<()> {
    let body = args.body()?;
    let subscription = ctx.client()?.update_subscription(&args.id, &body).await?;
    output::success("Subscription updated successfully");
    ctx.render(&subscription, &args.format, OutputFormat::Pretty, View::Subscriptions)
}

async fn cancel(ctx: &Context, args: &Cancel) -> Result<()> {
    let body = args.body()?;
    let subscription = ctx.client()?.cancel_subscription(&args.id, &body).await?;
    output::success(&format!("Subscription {} cancelled successfully", args.id));
    ctx.render(&subscription, &args.format, OutputFormat::Pretty, View::Subscriptions)
}

async fn freeze(ctx: &Context, args: &Freeze) -> Result<()> {
    let body = args.body()?;
    let period = ctx.client()?.freeze_subscription(&args.id, &body).await?;
    output::success("Subscription frozen successfully");
    ctx.render(&period, &args.format, OutputFormat::Pretty, View::Freezes)
}

async fn freeze_list(ctx: &Context, args: &FreezeList) -> Result<()> {
    let periods = ctx
        .client()?
        .list_subscription_freezes(&args.subscription_id, &args.page.to_query())
        .await?;
    ctx.render(&periods, &args.format, OutputFormat::Table, View::Freezes)
}

async fn freeze_update(ctx: &Context, args: &FreezeUpdate) -> Result<()> {
    let body = args.body()?;
    let period = ctx
        .client()?
        .update_subscription_freeze(&args.subscription_id, &args.freeze_id, &body)
        .await?;
    output::success("Freeze period updated successfully");
    ctx.render(&period, &args.format, OutputFormat::Pretty, View::Freezes)
}

async fn freeze_delete(ctx: &Context, args: &FreezeTarget) -> Result<()> {
    let result = ctx
        .client()?
        .delete_subscription_freeze(&args.subscription_id, &args.freeze_id)
        .await?;
    output::success(&format!(
        "Freeze period {} deleted from subscription {}",
        args.freeze_id, args.subscription_id
    ));
    if !result.is_null() {
        ctx.render(&result, &args.format, OutputFormat::Pretty, View::Generic)?;
    }
    Ok(())
}

async fn unfreeze(ctx: &Context, args: &Target) -> Result<()> {
    let subscription = ctx.client()?.unfreeze_subscription(&args.id).await?;
    output::success(&format!("Subscription {} unfrozen successfully", args.id));
    ctx.render(&subscription, &args.format, OutputFormat::Pretty, View::Subscriptions)
}
