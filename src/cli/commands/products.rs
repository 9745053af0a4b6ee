use super::{raw_or, require};
use crate::cli::Context;
use crate::cli::args::{FormatArgs, PageArgs};
use crate::models::enums::{Currency, ProductType, RecurringInterval};
use crate::models::query::QueryParams;
use crate::utils::output::{self, OutputFormat, View};
use crate::utils::parse::{Body, InputError, json_number, parse_json_array};
use clap::{Args, Subcommand};
use eyre::{Result, WrapErr};
use serde_json::Value;

#[derive(Args, Debug)]
pub struct Products {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a new product
    Create(Create),
    /// Get a product by ID
    Get(Get),
    /// List products
    List(List),
    /// Update a product
    Update(Update),
    /// Delete a product
    Delete(Get),
}

/// Flags shared by create and update.
#[derive(Args, Debug)]
struct Fields {
    #[arg(short, long)]
    name: Option<String>,
    #[arg(short = 't', long = "type", value_enum, ignore_case = true)]
    product_type: Option<ProductType>,
    /// Prices as a JSON array, e.g. '[{"currency":"SAR","amount":299}]'
    #[arg(long)]
    prices: Option<String>,
    /// Legacy single price; prefer --prices
    #[arg(short, long)]
    price: Option<f64>,
    /// Legacy currency; prefer --prices
    #[arg(short, long, value_enum, ignore_case = true)]
    currency: Option<Currency>,
    #[arg(short, long)]
    description: Option<String>,
    /// Billing interval, required for RECURRING products
    #[arg(long, value_enum, ignore_case = true)]
    recurring_interval: Option<RecurringInterval>,
    /// Intervals per billing cycle
    #[arg(long)]
    recurring_interval_count: Option<u32>,
    #[arg(long)]
    is_price_inclusive_of_vat: bool,
    #[arg(long)]
    is_price_exempt_from_vat: bool,
    /// Raw JSON body, overriding every other field flag
    #[arg(long)]
    data: Option<String>,
}

impl Fields {
    fn body(&self) -> Result<Body, InputError> {
        let mut body = Body::new();
        body.set_opt("name", self.name.clone())
            .set_opt("type", self.product_type.map(ProductType::as_str));
        if let Some(prices) = &self.prices {
            body.set("prices", parse_json_array("--prices", prices)?);
        }
        body.set_opt("price", self.price.and_then(json_number))
            .set_opt("currency", self.currency.map(Currency::as_str))
            .set_opt("description", self.description.clone())
            .set_opt(
                "recurring_interval",
                self.recurring_interval.map(RecurringInterval::as_str),
            )
            .set_opt("recurring_interval_count", self.recurring_interval_count)
            .set_flag("is_price_inclusive_of_vat", self.is_price_inclusive_of_vat)
            .set_flag("is_price_exempt_from_vat", self.is_price_exempt_from_vat);
        Ok(body)
    }
}

#[derive(Args, Debug)]
struct Create {
    #[command(flatten)]
    fields: Fields,
    /// Mark the product as one-time
    #[arg(long)]
    is_one_time: bool,
    #[command(flatten)]
    format: FormatArgs,
}

impl Create {
    fn body(&self) -> Result<Value, InputError> {
        raw_or(self.fields.data.as_deref(), || {
            require(&self.fields.name, "--name")?;
            let product_type = require(&self.fields.product_type, "--type")?;
            if *product_type == ProductType::Recurring && self.fields.recurring_interval.is_none() {
                return Err(InputError::Conflict(
                    "RECURRING products require --recurring-interval (WEEK, MONTH, SEMESTER, or YEAR)"
                        .to_string(),
                ));
            }

            let mut body = self.fields.body()?;
            body.set_flag("is_one_time", self.is_one_time);
            Ok(body.into_value())
        })
    }
}

#[derive(Args, Debug)]
struct Update {
    /// Product ID
    id: String,
    #[command(flatten)]
    fields: Fields,
    /// Activate the product
    #[arg(long, conflicts_with = "no_is_active")]
    is_active: bool,
    /// Deactivate the product
    #[arg(long)]
    no_is_active: bool,
    #[command(flatten)]
    format: FormatArgs,
}

impl Update {
    fn active(&self) -> Option<bool> {
        match (self.is_active, self.no_is_active) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }

    fn body(&self) -> Result<Value, InputError> {
        raw_or(self.fields.data.as_deref(), || {
            let mut body = self.fields.body()?;
            body.set_opt("is_active", self.active());
            if body.is_empty() {
                return Err(InputError::EmptyUpdate);
            }
            Ok(body.into_value())
        })
    }
}

#[derive(Args, Debug)]
struct Get {
    /// Product ID
    id: String,
    #[command(flatten)]
    format: FormatArgs,
}

#[derive(Args, Debug)]
struct List {
    #[command(flatten)]
    page: PageArgs,
    /// Search term
    #[arg(long)]
    search: Option<String>,
    /// Only active products
    #[arg(long, conflicts_with = "inactive")]
    active: bool,
    /// Only inactive products
    #[arg(long)]
    inactive: bool,
    #[arg(long = "type", value_enum, ignore_case = true)]
    product_type: Option<ProductType>,
    /// Only products priced in this currency
    #[arg(long, value_enum, ignore_case = true)]
    currency: Option<Currency>,
    #[command(flatten)]
    format: FormatArgs,
}

impl List {
    fn query(&self) -> QueryParams {
        let active = match (self.active, self.inactive) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };
        let mut query = self.page.to_query();
        query
            .set("search_term", self.search.as_deref())
            .set("active", active)
            .set("type", self.product_type.map(ProductType::as_str))
            .set("currency", self.currency.map(Currency::as_str));
        query
    }
}

impl Products {
    pub async fn run(&self, ctx: &mut Context) -> Result<()> {
        match &self.cmd {
            Command::Create(args) => create(ctx, args).await.wrap_err("Failed to create product"),
            Command::Get(args) => get(ctx, args).await.wrap_err("Failed to get product"),
            Command::List(args) => list(ctx, args).await.wrap_err("Failed to list products"),
            Command::Update(args) => update(ctx, args).await.wrap_err("Failed to update product"),
            Command::Delete(args) => delete(ctx, args).await.wrap_err("Failed to delete product"),
        }
    }
}

async fn create(ctx: &Context, args: &Create) -> Result<()> {
    let body = args.body()?;
    let product = ctx.client()?.create_product(&body).await?;
    output::success("Product created successfully");
    ctx.render(&product, &args.format, OutputFormat::Pretty, View::Products)
}

async fn get(ctx: &Context, args: &Get) -> Result<()> {
    let product = ctx.client()?.get_product(&args.id).await?;
    output::success("Product retrieved successfully");
    ctx.render(&product, &args.format, OutputFormat::Pretty, View::Products)
}

async fn list(ctx: &Context, args: &List) -> Result<()> {
    let products = ctx.client()?.list_products(&args.query()).await?;

    let items = products.get("data").unwrap_or(&products);
    if items.as_array().is_some_and(Vec::is_empty) {
        output::info("No products found matching the given filters");
        return Ok(());
    }
    ctx.render(&products, &args.format, OutputFormat::Table, View::Products)
}

async fn update(ctx: &Context, args: &Update) -> Result<()> {
    let body = args.body()?;
    let product = ctx.client()?.update_product(&args.id, &body).await?;
    output::success("Product updated successfully");
    ctx.render(&product, &args.format, OutputFormat::Pretty, View::Products)
}

async fn delete(ctx: &Context, args: &Get) -> Result<()> {
    let result = ctx.client()?.delete_product(&args.id).await?;
    output::success(&format!("Product {} deleted successfully", args.id));
    if !result.is_null() {
        ctx.render(&result, &args.format, OutputFormat::Pretty, View::Generic)?;
    }
    Ok(())
}
