use super::{raw_or, require};
use crate::cli::Context;
use crate::cli::args::{FormatArgs, PageArgs};
use crate::models::enums::{ContactInformationType, Currency, PaymentLinkStatus, wire_list};
use crate::models::query::QueryParams;
use crate::utils::output::{self, OutputFormat, View};
use crate::utils::parse::{Body, InputError, parse_json, parse_json_array, parse_json_object, split_csv};
use clap::{Args, Subcommand};
use eyre::{Result, WrapErr};
use serde_json::{Value, json};

/// Payment links, the hosted checkout pages.
#[derive(Args, Debug)]
pub struct Checkout {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a new payment link
    Create(Create),
    /// Get a payment link by ID
    Get(Target),
    /// List payment links
    List(List),
    /// Activate a payment link
    Activate(Target),
    /// Deactivate a payment link
    Deactivate(Deactivate),
    /// Set the status of a payment link
    UpdateStatus(UpdateStatus),
}

#[derive(Args, Debug)]
struct Target {
    /// Payment link ID
    id: String,
    #[command(flatten)]
    format: FormatArgs,
}

#[derive(Args, Debug)]
struct Create {
    #[arg(long)]
    name: Option<String>,
    /// Items as a JSON array, e.g. '[{"product_id":"uuid","quantity":1}]'
    #[arg(long)]
    items: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long, value_enum, ignore_case = true)]
    currency: Option<Currency>,
    /// Comma-separated coupon IDs
    #[arg(long)]
    coupons: Option<String>,
    #[arg(long)]
    max_number_of_payments: Option<u32>,
    /// Expiry date-time
    #[arg(long)]
    valid_until: Option<String>,
    /// Message shown once the payment is confirmed
    #[arg(long)]
    confirmation_message: Option<String>,
    /// Payment methods as a JSON object, e.g. '{"visa":true,"mastercard":true}'
    #[arg(long)]
    payment_methods: Option<String>,
    #[arg(long)]
    success_redirect_url: Option<String>,
    #[arg(long)]
    failure_redirect_url: Option<String>,
    #[arg(long)]
    organization_consumer_id: Option<String>,
    /// Custom metadata as a JSON object
    #[arg(long)]
    custom_metadata: Option<String>,
    #[arg(long, value_enum, ignore_case = true)]
    contact_information_type: Option<ContactInformationType>,
    /// Raw JSON body, overriding every other field flag
    #[arg(long)]
    data: Option<String>,
    #[command(flatten)]
    format: FormatArgs,
}

impl Create {
    fn body(&self) -> Result<Value, InputError> {
        raw_or(self.data.as_deref(), || {
            let name = require(&self.name, "--name")?;
            let items = parse_json_array("--items", require(&self.items, "--items")?)?;
            let every_item_has_product = items.as_array().is_some_and(|items| {
                items
                    .iter()
                    .all(|item| item.get("product_id").is_some_and(is_present))
            });
            if !every_item_has_product {
                return Err(InputError::Conflict(
                    "Each item in --items must have a product_id".to_string(),
                ));
            }

            let mut body = Body::new();
            body.set("name", name.as_str())
                .set("items", items)
                .set_opt("description", self.description.clone())
                .set_opt("currency", self.currency.map(Currency::as_str))
                .set_opt("coupons", self.coupons.as_deref().map(split_csv))
                .set_opt("max_number_of_payments", self.max_number_of_payments)
                .set_opt("valid_until", self.valid_until.clone())
                .set_opt("confirmation_message", self.confirmation_message.clone());
            if let Some(methods) = &self.payment_methods {
                body.set("payment_methods", parse_json_object("--payment-methods", methods)?);
            }
            body.set_opt("success_redirect_url", self.success_redirect_url.clone())
                .set_opt("failure_redirect_url", self.failure_redirect_url.clone())
                .set_opt(
                    "organization_consumer_id",
                    self.organization_consumer_id.clone(),
                );
            if let Some(metadata) = &self.custom_metadata {
                body.set("custom_metadata", parse_json_object("--custom-metadata", metadata)?);
            }
            body.set_opt(
                "contact_information_type",
                self.contact_information_type
                    .map(ContactInformationType::as_str),
            );
            Ok(body.into_value())
        })
    }
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

#[derive(Args, Debug)]
struct List {
    #[command(flatten)]
    page: PageArgs,
    /// Comma-separated statuses (ACTIVE, INACTIVE, COMPLETED)
    #[arg(long, value_enum, ignore_case = true, value_delimiter = ',')]
    statuses: Vec<PaymentLinkStatus>,
    #[arg(long)]
    from_date: Option<String>,
    #[arg(long)]
    to_date: Option<String>,
    #[arg(long)]
    from_price: Option<f64>,
    #[arg(long)]
    to_price: Option<f64>,
    /// Comma-separated product IDs
    #[arg(long)]
    product_ids: Option<String>,
    /// Comma-separated currency codes
    #[arg(long, value_enum, ignore_case = true, value_delimiter = ',')]
    currencies: Vec<Currency>,
    #[command(flatten)]
    format: FormatArgs,
}

impl List {
    fn query(&self) -> QueryParams {
        let currencies = (!self.currencies.is_empty()).then(|| wire_list(&self.currencies).join(","));

        let mut query = self.page.to_query();
        query
            .set("statuses", wire_list(&self.statuses))
            .set("from_date", self.from_date.as_deref())
            .set("to_date", self.to_date.as_deref())
            .set("from_price", self.from_price)
            .set("to_price", self.to_price)
            .set(
                "product_ids",
                self.product_ids.as_deref().map(split_csv).unwrap_or_default(),
            )
            .set("currencies", currencies);
        query
    }
}

#[derive(Args, Debug)]
struct Deactivate {
    /// Payment link ID
    id: String,
    /// Message shown to visitors of the deactivated link
    #[arg(long)]
    deactivate_message: Option<String>,
    #[command(flatten)]
    format: FormatArgs,
}

impl Deactivate {
    fn body(&self) -> Value {
        let mut body = Body::new();
        body.set("status", PaymentLinkStatus::Inactive.as_str())
            .set_opt("deactivate_message", self.deactivate_message.clone());
        body.into_value()
    }
}

#[derive(Args, Debug)]
struct UpdateStatus {
    /// Payment link ID
    id: String,
    #[arg(long, value_enum, ignore_case = true)]
    status: Option<PaymentLinkStatus>,
    #[arg(long)]
    deactivate_message: Option<String>,
    /// Raw JSON body, overriding --status and --deactivate-message
    #[arg(long)]
    data: Option<String>,
    #[command(flatten)]
    format: FormatArgs,
}

impl UpdateStatus {
    fn body(&self) -> Result<Value, InputError> {
        if let Some(data) = &self.data {
            return parse_json(data);
        }
        let status = require(&self.status, "--status")?;
        let mut body = Body::new();
        body.set("status", status.as_str())
            .set_opt("deactivate_message", self.deactivate_message.clone());
        Ok(body.into_value())
    }
}

impl Checkout {
    pub async fn run(&self, ctx: &mut Context) -> Result<()> {
        match &self.cmd {
            Command::Create(args) => create(ctx, args)
                .await
                .wrap_err("Failed to create payment link"),
            Command::Get(args) => get(ctx, args).await.wrap_err("Failed to get payment link"),
            Command::List(args) => list(ctx, args)
                .await
                .wrap_err("Failed to list payment links"),
            Command::Activate(args) => activate(ctx, args)
                .await
                .wrap_err("Failed to activate payment link"),
            Command::Deactivate(args) => deactivate(ctx, args)
                .await
                .wrap_err("Failed to deactivate payment link"),
            Command::UpdateStatus(args) => update_status(ctx, args)
                .await
                .wrap_err("Failed to update payment link status"),
        }
    }
}

async fn create(ctx: &Context, args: &Create) -> Result<()> {
    let body = args.body()?;
    let link = ctx.client()?.create_payment_link(&body).await?;
    output::success("Payment link created successfully");
    ctx.render(&link, &args.format, OutputFormat::Pretty, View::PaymentLinks)
}

async fn get(ctx: &Context, args: &Target) -> Result<()> {
    let link = ctx.client()?.get_payment_link(&args.id).await?;
    output::success("Payment link retrieved successfully");
    ctx.render(&link, &args.format, OutputFormat::Pretty, View::PaymentLinks)
}

async fn list(ctx: &Context, args: &List) -> Result<()> {
    let links = ctx.client()?.list_payment_links(&args.query()).await?;
    ctx.render(&links, &args.format, OutputFormat::Table, View::PaymentLinks)
}

async fn activate(ctx: &Context, args: &Target) -> Result<()> {
    let body = json!({"status": PaymentLinkStatus::Active.as_str()});
    let link = ctx
        .client()?
        .update_payment_link_status(&args.id, &body)
        .await?;
    output::success("Payment link activated successfully");
    ctx.render(&link, &args.format, OutputFormat::Pretty, View::PaymentLinks)
}

async fn deactivate(ctx: &Context, args: &Deactivate) -> Result<()> {
    let link = ctx
        .client()?
        .update_payment_link_status(&args.id, &args.body())
        .await?;
    output::success("Payment link deactivated successfully");
    ctx.render(&link, &args.format, OutputFormat::Pretty, View::PaymentLinks)
}

async fn update_status(ctx: &Context, args: &UpdateStatus) -> Result<()> {
    let body = args.body()?;
    let link = ctx
        .client()?
        .update_payment_link_status(&args.id, &body)
        .await?;
    output::success("Payment link status updated successfully");
    ctx.render(&link, &args.format, OutputFormat::Pretty, View::PaymentLinks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::testing::{parse, try_parse};
    use crate::models::query::QueryValue;

    const ITEMS: &str = r#"[{"product_id":"prod_1","quantity":2}]"#;

    #[test]
    fn create_from_flags() {
        let args: Create = parse(&[
            "--name",
            "Spring sale",
            "--items",
            ITEMS,
            "--coupons",
            "c_1, c_2",
            "--max-number-of-payments",
            "50",
            "--custom-metadata",
            r#"{"campaign":"spring"}"#,
            "--contact-information-type",
            "email",
        ]);
        assert_eq!(
            args.body().unwrap(),
            json!({
                "name": "Spring sale",
                "items": [{"product_id": "prod_1", "quantity": 2}],
                "coupons": ["c_1", "c_2"],
                "max_number_of_payments": 50,
                "custom_metadata": {"campaign": "spring"},
                "contact_information_type": "EMAIL"
            })
        );
    }

    #[test]
    fn every_item_needs_a_product() {
        let args: Create = parse(&["--name", "X", "--items", r#"[{"product_id":"p"},{"quantity":1}]"#]);
        assert_eq!(
            args.body().unwrap_err(),
            InputError::Conflict("Each item in --items must have a product_id".to_string())
        );

        let args: Create = parse(&["--name", "X"]);
        assert_eq!(args.body().unwrap_err(), InputError::MissingFlag("--items"));
    }

    #[test]
    fn metadata_must_be_an_object() {
        let args: Create = parse(&["--name", "X", "--items", ITEMS, "--custom-metadata", "[]"]);
        assert!(matches!(args.body(), Err(InputError::WrongJsonShape { .. })));
    }

    #[test]
    fn raw_data_skips_validation() {
        let args: Create = parse(&["--data", r#"{"name":"raw"}"#]);
        assert_eq!(args.body().unwrap(), json!({"name": "raw"}));
    }

    #[test]
    fn status_bodies() {
        let args: Deactivate = parse(&["pl_1", "--deactivate-message", "Sold out"]);
        assert_eq!(
            args.body(),
            json!({"status": "INACTIVE", "deactivate_message": "Sold out"})
        );

        let args: UpdateStatus = parse(&["pl_1", "--status", "completed"]);
        assert_eq!(args.body().unwrap(), json!({"status": "COMPLETED"}));

        let args: UpdateStatus = parse(&["pl_1"]);
        assert_eq!(args.body().unwrap_err(), InputError::MissingFlag("--status"));

        assert!(try_parse::<UpdateStatus>(&["pl_1", "--status", "PAUSED"]).is_err());
    }

    #[test]
    fn list_filters() {
        let args: List = parse(&[
            "--statuses",
            "ACTIVE,completed",
            "--product-ids",
            "p_1,p_2",
            "--currencies",
            "sar,usd",
            "--to-price",
            "99.5",
        ]);
        let query = args.query();
        assert_eq!(
            query.get("statuses"),
            Some(&QueryValue::from(vec!["ACTIVE", "COMPLETED"]))
        );
        assert_eq!(
            query.get("product_ids"),
            Some(&QueryValue::from(vec!["p_1", "p_2"]))
        );
        assert_eq!(query.get("currencies"), Some(&QueryValue::from("SAR,USD")));
        assert_eq!(query.get("to_price"), Some(&QueryValue::from("99.5")));
    }
}
