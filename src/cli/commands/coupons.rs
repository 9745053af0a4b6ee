use super::{raw_or, require};
use crate::cli::Context;
use crate::cli::args::{FormatArgs, PageArgs};
use crate::models::enums::Currency;
use crate::models::query::QueryParams;
use crate::utils::output::{self, OutputFormat, View};
use crate::utils::parse::{Body, InputError, parse_bool, parse_discount_value};
use clap::{Args, Subcommand};
use eyre::{Result, WrapErr};
use serde_json::Value;

#[derive(Args, Debug)]
pub struct Coupons {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a new coupon
    Create(Create),
    /// Get a coupon by ID
    Get(Target),
    /// List coupons
    List(List),
    /// Update a coupon
    Update(Update),
    /// Delete a coupon
    Delete(Target),
}

#[derive(Args, Debug)]
struct Target {
    /// Coupon ID
    id: String,
    #[command(flatten)]
    format: FormatArgs,
}

#[derive(Args, Debug)]
struct Fields {
    /// Coupon name (1 to 80 characters)
    #[arg(long)]
    name: Option<String>,
    /// Discount value >= 0, e.g. 10, 10.5, 0.25
    #[arg(long, value_parser = parse_discount_value)]
    discount_value: Option<Value>,
    /// true for a percentage discount, false for a fixed amount
    #[arg(long, value_parser = parse_bool)]
    is_percentage: Option<bool>,
    /// Currency of a fixed-amount discount
    #[arg(long, value_enum, ignore_case = true)]
    currency: Option<Currency>,
    /// Whether the coupon is active
    #[arg(long, value_parser = parse_bool)]
    is_active: Option<bool>,
    /// Raw JSON body, overriding every other field flag
    #[arg(long)]
    data: Option<String>,
}

impl Fields {
    fn create_body(&self) -> Result<Value, InputError> {
        raw_or(self.data.as_deref(), || {
            let name = require(&self.name, "--name")?;
            let discount = require(&self.discount_value, "--discount-value")?;
            let is_percentage = self.is_percentage.unwrap_or(false);

            let mut body = Body::new();
            body.set("name", name.as_str())
                .set("discount_value", discount.clone())
                .set("is_percentage", is_percentage);
            if !is_percentage {
                body.set_opt("currency", self.currency.map(Currency::as_str));
            }
            body.set_opt("is_active", self.is_active);
            Ok(body.into_value())
        })
    }

    /// Advice about `--currency` for a create built from flags.
    fn currency_warning(&self) -> Option<&'static str> {
        if self.data.is_some() {
            return None;
        }
        match (self.is_percentage.unwrap_or(false), self.currency.is_some()) {
            (true, true) => Some("--currency is ignored for percentage coupons and will not be sent"),
            (false, false) => Some("--currency is recommended for fixed-amount coupons"),
            _ => None,
        }
    }

    fn update_body(&self) -> Result<Value, InputError> {
        raw_or(self.data.as_deref(), || {
            let mut body = Body::new();
            body.set_opt("name", self.name.clone())
                .set_opt("discount_value", self.discount_value.clone())
                .set_opt("is_percentage", self.is_percentage)
                .set_opt("currency", self.currency.map(Currency::as_str))
                .set_opt("is_active", self.is_active);
            if body.is_empty() {
                return Err(InputError::EmptyUpdate);
            }
            Ok(body.into_value())
        })
    }
}

#[derive(Args, Debug)]
struct Create {
    #[command(flatten)]
    fields: Fields,
    #[command(flatten)]
    format: FormatArgs,
}

#[derive(Args, Debug)]
struct Update {
    /// Coupon ID
    id: String,
    #[command(flatten)]
    fields: Fields,
    #[command(flatten)]
    format: FormatArgs,
}

#[derive(Args, Debug)]
struct List {
    #[command(flatten)]
    page: PageArgs,
    /// Search by coupon name
    #[arg(long)]
    search: Option<String>,
    /// Filter by active status (true|false)
    #[arg(long, value_parser = parse_bool)]
    active: Option<bool>,
    /// Filter by discount type (true|false)
    #[arg(long, value_parser = parse_bool)]
    is_percentage: Option<bool>,
    #[command(flatten)]
    format: FormatArgs,
}

impl List {
    fn query(&self) -> QueryParams {
        let mut query = self.page.to_query();
        query
            .set("search_term", self.search.as_deref())
            .set("active", self.active)
            .set("is_percentage", self.is_percentage);
        query
    }
}

impl Coupons {
    pub async fn run(&self, ctx: &mut Context) -> Result<()> {
        match &self.cmd {
            Command::Create(args) => create(ctx, args).await.wrap_err("Failed to create coupon"),
            Command::Get(args) => get(ctx, args).await.wrap_err("Failed to get coupon"),
            Command::List(args) => list(ctx, args).await.wrap_err("Failed to list coupons"),
            Command::Update(args) => update(ctx, args).await.wrap_err("Failed to update coupon"),
            Command::Delete(args) => delete(ctx, args).await.wrap_err("Failed to delete coupon"),
        }
    }
}

async fn create(ctx: &Context, args: &Create) -> Result<()> {
    let body = args.fields.create_body()?;
    if let Some(warning) = args.fields.currency_warning() {
        output::warning(warning);
    }
    let coupon = ctx.client()?.create_coupon(&body).await?;
    output::success("Coupon created successfully");
    ctx.render(&coupon, &args.format, OutputFormat::Pretty, View::Coupons)
}

async fn get(ctx: &Context, args: &Target) -> Result<()> {
    let coupon = ctx.client()?.get_coupon(&args.id).await?;
    output::success("Coupon retrieved successfully");
    ctx.render(&coupon, &args.format, OutputFormat::Pretty, View::Coupons)
}

async fn list(ctx: &Context, args: &List) -> Result<()> {
    let coupons = ctx.client()?.list_coupons(&args.query()).await?;
    ctx.render(&coupons, &args.format, OutputFormat::Table, View::Coupons)
}

async fn update(ctx: &Context, args: &Update) -> Result<()> {
    let body = args.fields.update_body()?;
    let coupon = ctx.client()?.update_coupon(&args.id, &body).await?;
    output::success("Coupon updated successfully");
    ctx.render(&coupon, &args.format, OutputFormat::Pretty, View::Coupons)
}

async fn delete(ctx: &Context, args: &Target) -> Result<()> {
    ctx.client()?.delete_coupon(&args.id).await?;
    output::success(&format!("Coupon {} deleted successfully", args.id));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::testing::{parse, try_parse};
    use serde_json::json;

    #[test]
    fn fixed_amount_coupon() {
        let args: Create = parse(&["--name", "WELCOME", "--discount-value", "25", "--currency", "sar"]);
        assert_eq!(
            args.fields.create_body().unwrap(),
            json!({
                "name": "WELCOME",
                "discount_value": 25,
                "is_percentage": false,
                "currency": "SAR"
            })
        );
        assert_eq!(args.fields.currency_warning(), None);
    }

    #[test]
    fn percentage_coupon_drops_currency() {
        let args: Create = parse(&[
            "--name",
            "TENOFF",
            "--discount-value",
            "10.5",
            "--is-percentage",
            "1",
            "--currency",
            "USD",
            "--is-active",
            "false",
        ]);
        assert_eq!(
            args.fields.create_body().unwrap(),
            json!({
                "name": "TENOFF",
                "discount_value": 10.5,
                "is_percentage": true,
                "is_active": false
            })
        );
        assert!(args.fields.currency_warning().unwrap().contains("ignored"));
    }

    #[test]
    fn fixed_amount_without_currency_warns() {
        let args: Create = parse(&["--name", "X", "--discount-value", "5"]);
        assert!(args.fields.currency_warning().unwrap().contains("recommended"));
    }

    #[test]
    fn invalid_values_fail_at_parse_time() {
        assert!(try_parse::<Create>(&["--name", "X", "--discount-value", "abc"]).is_err());
        assert!(try_parse::<Create>(&["--name", "X", "--is-percentage", "yes"]).is_err());
        assert!(try_parse::<List>(&["--active", "maybe"]).is_err());
    }

    #[test]
    fn signed_discount_is_sent_as_a_string() {
        let args: Create = parse(&["--name", "X", "--discount-value", "+5", "--is-percentage", "true"]);
        assert_eq!(args.fields.create_body().unwrap()["discount_value"], json!("+5"));
    }

    #[test]
    fn create_requires_name_and_discount() {
        let args: Create = parse(&["--name", "X"]);
        assert_eq!(
            args.fields.create_body().unwrap_err(),
            InputError::MissingFlag("--discount-value")
        );
    }

    #[test]
    fn update_and_list() {
        let args: Update = parse(&["k_1"]);
        assert_eq!(args.fields.update_body().unwrap_err(), InputError::EmptyUpdate);

        let args: Update = parse(&["k_1", "--is-active", "0"]);
        assert_eq!(args.fields.update_body().unwrap(), json!({"is_active": false}));

        let args: List = parse(&["--active", "true", "--search", "WEL"]);
        assert_eq!(
            args.query().pairs(),
            vec![
                ("search_term".to_string(), "WEL".to_string()),
                ("active".to_string(), "true".to_string()),
            ]
        );
    }
}
