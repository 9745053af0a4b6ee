use super::{raw_or, require};
use crate::cli::Context;
use crate::cli::args::{FormatArgs, PageArgs};
use crate::models::enums::{Currency, InvoiceStatus, PaymentStatus, wire_list};
use crate::models::query::QueryParams;
use crate::services::endpoints::InvoiceAction;
use crate::utils::output::{self, OutputFormat, View};
use crate::utils::parse::{Body, InputError, parse_json_array, parse_json_object};
use clap::{Args, Subcommand};
use eyre::{Result, WrapErr};
use serde_json::Value;

#[derive(Args, Debug)]
pub struct Invoices {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a new invoice
    Create(Create),
    /// Get an invoice by ID
    Get(Target),
    /// List invoices
    List(List),
    /// Change the due date or description of an invoice
    Update(Update),
    /// Send an invoice to the consumer
    Send(Target),
    /// Accept an invoice
    Accept(Target),
    /// Reject an invoice
    Reject(Target),
    /// Mark an invoice as completed
    Complete(Target),
    /// Cancel an invoice
    Cancel(Target),
}

#[derive(Args, Debug)]
struct Target {
    /// Invoice ID
    id: String,
    #[command(flatten)]
    format: FormatArgs,
}

#[derive(Args, Debug)]
struct Create {
    /// Consumer ID (organization_consumer_id)
    #[arg(long)]
    consumer_id: Option<String>,
    /// Due date (ISO 8601, e.g. 2026-04-01T00:00:00Z)
    #[arg(long)]
    scheduled_on: Option<String>,
    /// Items as a JSON array, e.g. '[{"product_id":"uuid","quantity":1}]'
    #[arg(long)]
    items: Option<String>,
    /// Payment methods as a JSON object, e.g. '{"mada":true,"visa":true}'
    #[arg(long)]
    payment_methods: Option<String>,
    /// Invoice description (max 500 characters)
    #[arg(long)]
    description: Option<String>,
    /// Do not notify the consumer
    #[arg(long)]
    no_notify_consumer: bool,
    /// Invoice-level coupon IDs as a JSON array
    #[arg(long)]
    coupons: Option<String>,
    #[arg(long)]
    exclude_coupons_if_installments: bool,
    #[arg(long, value_enum, ignore_case = true, default_value = "SAR")]
    currency: Currency,
    /// Raw JSON body, overriding every other field flag
    #[arg(long)]
    data: Option<String>,
    #[command(flatten)]
    format: FormatArgs,
}

impl Create {
    fn body(&self) -> Result<Value, InputError> {
        raw_or(self.data.as_deref(), || {
            let consumer_id = require(&self.consumer_id, "--consumer-id")?;
            let scheduled_on = require(&self.scheduled_on, "--scheduled-on")?;
            let items = require(&self.items, "--items")?;
            let methods = require(&self.payment_methods, "--payment-methods")?;

            let mut body = Body::new();
            body.set("organization_consumer_id", consumer_id.as_str())
                .set("scheduled_on", scheduled_on.as_str())
                .set("items", parse_json_array("--items", items)?)
                .set(
                    "payment_methods",
                    parse_json_object("--payment-methods", methods)?,
                )
                .set_opt("description", self.description.clone());
            if self.no_notify_consumer {
                body.set("notify_consumer", false);
            }
            if let Some(coupons) = &self.coupons {
                body.set("coupons", parse_json_array("--coupons", coupons)?);
            }
            body.set_flag(
                "exclude_coupons_if_installments",
                self.exclude_coupons_if_installments,
            )
            .set("currency", self.currency.as_str());
            Ok(body.into_value())
        })
    }
}

#[derive(Args, Debug)]
struct List {
    #[command(flatten)]
    page: PageArgs,
    /// Free-text search
    #[arg(long)]
    search_term: Option<String>,
    /// Include payment objects in each invoice
    #[arg(long)]
    include_payments: bool,
    #[arg(long)]
    payment_link_id: Option<String>,
    /// Comma-separated invoice statuses
    #[arg(long, value_enum, ignore_case = true, value_delimiter = ',')]
    statuses: Vec<InvoiceStatus>,
    /// Comma-separated payment statuses
    #[arg(long, value_enum, ignore_case = true, value_delimiter = ',')]
    payment_statuses: Vec<PaymentStatus>,
    /// Created on or after (ISO 8601)
    #[arg(long)]
    from_date: Option<String>,
    /// Created on or before (ISO 8601)
    #[arg(long)]
    to_date: Option<String>,
    #[arg(long)]
    due_date_from: Option<String>,
    #[arg(long)]
    due_date_to: Option<String>,
    #[arg(long)]
    from_price: Option<f64>,
    #[arg(long)]
    to_price: Option<f64>,
    /// Consumer ID (organization_consumer_id)
    #[arg(long)]
    consumer_id: Option<String>,
    #[arg(long)]
    subscription_id: Option<String>,
    /// Comma-separated currency codes
    #[arg(long, value_enum, ignore_case = true, value_delimiter = ',')]
    currencies: Vec<Currency>,
    /// Only invoices with unsettled succeeded card or wallet payments
    #[arg(long)]
    payments_not_settled: bool,
    #[command(flatten)]
    format: FormatArgs,
}

impl List {
    fn query(&self) -> QueryParams {
        let currencies = (!self.currencies.is_empty()).then(|| wire_list(&self.currencies).join(","));

        let mut query = self.page.to_query();
        query
            .set("search_term", self.search_term.as_deref())
            .set("include_payments", self.include_payments.then_some(true))
            .set("payment_link_id", self.payment_link_id.as_deref())
            .set("statuses", wire_list(&self.statuses))
            .set("payment_statuses", wire_list(&self.payment_statuses))
            .set("from_date", self.from_date.as_deref())
            .set("to_date", self.to_date.as_deref())
            .set("due_date_from", self.due_date_from.as_deref())
            .set("due_date_to", self.due_date_to.as_deref())
            .set("from_price", self.from_price)
            .set("to_price", self.to_price)
            .set("organization_consumer_id", self.consumer_id.as_deref())
            .set("subscription_id", self.subscription_id.as_deref())
            .set("currencies", currencies)
            .set("payments_not_settled", self.payments_not_settled.then_some(true));
        query
    }
}

#[derive(Args, Debug)]
struct Update {
    /// Invoice ID
    id: String,
    /// New due date (ISO 8601, in the future)
    #[arg(long)]
    scheduled_on: Option<String>,
    /// New description (max 500 characters)
    #[arg(long)]
    description: Option<String>,
    #[command(flatten)]
    format: FormatArgs,
}

impl Update {
    fn body(&self) -> Result<Value, InputError> {
        let mut body = Body::new();
        body.set_opt("scheduled_on", self.scheduled_on.clone())
            .set_opt("description", self.description.clone());
        if body.is_empty() {
            return Err(InputError::Conflict(
                "At least one field must be provided to update (--scheduled-on or --description)"
                    .to_string(),
            ));
        }
        Ok(body.into_value())
    }
}

impl Invoices {
    pub async fn run(&self, ctx: &mut Context) -> Result<()> {
        match &self.cmd {
            Command::Create(args) => create(ctx, args).await.wrap_err("Failed to create invoice"),
            Command::Get(args) => get(ctx, args).await.wrap_err("Failed to get invoice"),
            Command::List(args) => list(ctx, args).await.wrap_err("Failed to list invoices"),
            Command::Update(args) => update(ctx, args).await.wrap_err("Failed to update invoice"),
            Command::Send(args) => transition(ctx, args, InvoiceAction::Send)
                .await
                .wrap_err("Failed to send invoice"),
            Command::Accept(args) => transition(ctx, args, InvoiceAction::Accept)
                .await
                .wrap_err("Failed to accept invoice"),
            Command::Reject(args) => transition(ctx, args, InvoiceAction::Reject)
                .await
                .wrap_err("Failed to reject invoice"),
            Command::Complete(args) => transition(ctx, args, InvoiceAction::Complete)
                .await
                .wrap_err("Failed to complete invoice"),
            Command::Cancel(args) => transition(ctx, args, InvoiceAction::Cancel)
                .await
                .wrap_err("Failed to cancel invoice"),
        }
    }
}

async fn create(ctx: &Context, args: &Create) -> Result<()> {
    let body = args.body()?;
    let invoice = ctx.client()?.create_invoice(&body).await?;
    output::success("Invoice created successfully");
    ctx.render(&invoice, &args.format, OutputFormat::Pretty, View::Invoices)
}

async fn get(ctx: &Context, args: &Target) -> Result<()> {
    let invoice = ctx.client()?.get_invoice(&args.id).await?;
    ctx.render(&invoice, &args.format, OutputFormat::Pretty, View::Invoices)
}

async fn list(ctx: &Context, args: &List) -> Result<()> {
    let invoices = ctx.client()?.list_invoices(&args.query()).await?;
    ctx.render(&invoices, &args.format, OutputFormat::Table, View::Invoices)
}

async fn update(ctx: &Context, args: &Update) -> Result<()> {
    let body = args.body()?;
    let invoice = ctx.client()?.update_invoice_in_place(&args.id, &body).await?;
    output::success("Invoice updated successfully");
    ctx.render(&invoice, &args.format, OutputFormat::Pretty, View::Invoices)
}

async fn transition(ctx: &Context, args: &Target, action: InvoiceAction) -> Result<()> {
    let invoice = ctx.client()?.transition_invoice(&args.id, action).await?;
    let done = match action {
        InvoiceAction::Send => "sent",
        InvoiceAction::Accept => "accepted",
        InvoiceAction::Reject => "rejected",
        InvoiceAction::Complete => "completed",
        InvoiceAction::Cancel => "cancelled",
    };
    output::success(&format!("Invoice {done} successfully"));
    ctx.render(&invoice, &args.format, OutputFormat::Pretty, View::Invoices)
}
