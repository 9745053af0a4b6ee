use crate::cli::Context;
use crate::cli::args::{FormatArgs, PageArgs};
use crate::models::enums::{ManualPaymentMethod, PaymentStatus, RefundReason, wire_list};
use crate::models::query::QueryParams;
use crate::utils::output::{self, OutputFormat, View};
use crate::utils::parse::Body;
use clap::{Args, Subcommand};
use eyre::{Result, WrapErr};
use serde_json::Value;

#[derive(Args, Debug)]
pub struct Payments {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Get a payment by ID
    Get(Target),
    /// List payments
    List(List),
    /// Mark a payment as paid with a manual method
    MarkPaid(MarkPaid),
    /// Refund a payment
    Refund(Refund),
    /// Charge a payment with the consumer's latest tokenized card
    AutoCharge(Target),
}

#[derive(Args, Debug)]
struct Target {
    /// Payment ID
    id: String,
    #[command(flatten)]
    format: FormatArgs,
}

#[derive(Args, Debug)]
struct List {
    /// Filter by invoice ID (repeatable)
    #[arg(long)]
    invoice_id: Vec<String>,
    /// Filter by status (repeatable)
    #[arg(long, value_enum, ignore_case = true)]
    status: Vec<PaymentStatus>,
    #[arg(long)]
    search: Option<String>,
    /// From date (ISO 8601)
    #[arg(long)]
    from_date: Option<String>,
    /// To date (ISO 8601)
    #[arg(long)]
    to_date: Option<String>,
    #[command(flatten)]
    page: PageArgs,
    #[command(flatten)]
    format: FormatArgs,
}

impl List {
    fn query(&self) -> QueryParams {
        let mut query = self.page.to_query();
        query
            .set("invoice_id", self.invoice_id.clone())
            .set("statuses", wire_list(&self.status))
            .set("search_term", self.search.as_deref())
            .set("from_date", self.from_date.as_deref())
            .set("to_date", self.to_date.as_deref());
        query
    }
}

#[derive(Args, Debug)]
struct MarkPaid {
    /// Payment ID
    id: String,
    #[arg(long, value_enum, ignore_case = true)]
    payment_method: ManualPaymentMethod,
    /// Note or reference number, e.g. a receipt number
    #[arg(long)]
    note: Option<String>,
}

impl MarkPaid {
    fn body(&self) -> Value {
        let mut body = Body::new();
        body.set("payment_method", self.payment_method.as_str())
            .set_opt("note", self.note.clone());
        body.into_value()
    }
}

#[derive(Args, Debug)]
struct Refund {
    /// Payment ID
    id: String,
    #[arg(long, value_enum, ignore_case = true)]
    refund_reason: RefundReason,
    #[arg(long)]
    refund_note: Option<String>,
    /// Refund every payment of a multi-payment transaction
    #[arg(long)]
    allow_multiple: bool,
    #[command(flatten)]
    format: FormatArgs,
}

impl Refund {
    fn body(&self) -> Value {
        let mut body = Body::new();
        body.set("refund_reason", self.refund_reason.as_str())
            .set_opt("refund_note", self.refund_note.clone())
            .set_flag("allow_refund_multiple_related_payments", self.allow_multiple);
        body.into_value()
    }
}

impl Payments {
    pub async fn run(&self, ctx: &mut Context) -> Result<()> {
        match &self.cmd {
            Command::Get(args) => get(ctx, args).await.wrap_err("Failed to get payment"),
            Command::List(args) => list(ctx, args).await.wrap_err("Failed to list payments"),
            Command::MarkPaid(args) => mark_paid(ctx, args)
                .await
                .wrap_err("Failed to mark payment as paid"),
            Command::Refund(args) => refund(ctx, args).await.wrap_err("Failed to refund payment"),
            Command::AutoCharge(args) => auto_charge(ctx, args)
                .await
                .wrap_err("Failed to auto-charge payment"),
        }
    }
}

async fn get(ctx: &Context, args: &Target) -> Result<()> {
    let payment = ctx.client()?.get_payment(&args.id).await?;
    ctx.render(&payment, &args.format, OutputFormat::Pretty, View::Payments)
}

async fn list(ctx: &Context, args: &List) -> Result<()> {
    let payments = ctx.client()?.list_payments(&args.query()).await?;
    ctx.render(&payments, &args.format, OutputFormat::Table, View::Payments)
}

async fn mark_paid(ctx: &Context, args: &MarkPaid) -> Result<()> {
    ctx.client()?
        .mark_payment_as_paid(&args.id, &args.body())
        .await?;
    output::success("Payment marked as paid successfully");
    Ok(())
}

async fn refund(ctx: &Context, args: &Refund) -> Result<()> {
    let payment = ctx.client()?.refund_payment(&args.id, &args.body()).await?;
    output::success("Payment refunded successfully");
    ctx.render(&payment, &args.format, OutputFormat::Pretty, View::Payments)
}

async fn auto_charge(ctx: &Context, args: &Target) -> Result<()> {
    let payment = ctx.client()?.auto_charge_on_demand(&args.id).await?;
    output::success("Payment charged successfully");
    ctx.render(&payment, &args.format, OutputFormat::Pretty, View::Payments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::testing::{parse, try_parse};
    use serde_json::json;

    #[test]
    fn repeated_filters_become_repeated_query_keys() {
        let args: List = parse(&[
            "--invoice-id",
            "i_1",
            "--invoice-id",
            "i_2",
            "--status",
            "succeeded",
            "--status",
            "REFUNDED",
            "--limit",
            "20",
        ]);
        assert_eq!(
            args.query().pairs(),
            vec![
                ("limit".to_string(), "20".to_string()),
                ("invoice_id".to_string(), "i_1".to_string()),
                ("invoice_id".to_string(), "i_2".to_string()),
                ("statuses".to_string(), "SUCCEEDED".to_string()),
                ("statuses".to_string(), "REFUNDED".to_string()),
            ]
        );
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!(try_parse::<List>(&["--status", "PAID"]).is_err());
    }

    #[test]
    fn manual_methods_only() {
        let args: MarkPaid = parse(&["p_1", "--payment-method", "bank_transfer", "--note", "TRX-9"]);
        assert_eq!(
            args.body(),
            json!({"payment_method": "BANK_TRANSFER", "note": "TRX-9"})
        );
        assert!(try_parse::<MarkPaid>(&["p_1", "--payment-method", "APPLE_PAY"]).is_err());
        assert!(try_parse::<MarkPaid>(&["p_1"]).is_err());
    }

    #[test]
    fn refund_body() {
        let args: Refund = parse(&["p_1", "--refund-reason", "duplicate", "--allow-multiple"]);
        assert_eq!(
            args.body(),
            json!({
                "refund_reason": "DUPLICATE",
                "allow_refund_multiple_related_payments": true
            })
        );
    }
}
