//! Rendering of API responses and status lines.
//!
//! Responses are rendered as pretty-printed JSON, an indented key/value view
//! (`pretty`), or a table. Paginated envelopes (`{data: [...], pagination}`)
//! are unwrapped for the latter two.

use crate::models::error::ApiError;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use console::style;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const EMPTY: &str = "—";
const DEFAULT_CURRENCY: &str = "SAR";

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Pretty-printed JSON, exactly as returned by the API
    Json,
    /// A table with one row per item
    Table,
    /// Indented key/value listing
    Pretty,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Table => "table",
            OutputFormat::Pretty => "pretty",
        }
    }
}

/// Which resource a response holds, selecting the curated table columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Generic,
    Consumers,
    Products,
    Subscriptions,
    Freezes,
    Invoices,
    Payments,
    Coupons,
    PaymentLinks,
}

/// How one table column extracts and styles its value.
#[derive(Debug, Clone, Copy)]
enum Field {
    Text(&'static str),
    Bold(&'static str),
    Id(&'static str),
    Date(&'static str),
    Status(&'static str),
    Money(&'static str),
    Joined(&'static str),
    Count(&'static str),
    Suffixed(&'static str, &'static str),
    Flag(&'static str, &'static str, &'static str),
    Consumer,
    Interval,
    Prices,
    Discount,
}

#[derive(Debug, Clone, Copy)]
struct Column {
    header: &'static str,
    field: Field,
}

const fn col(header: &'static str, field: Field) -> Column {
    Column { header, field }
}

const CONSUMER_COLUMNS: &[Column] = &[
    col("Name", Field::Bold("/name")),
    col("Alias", Field::Text("/alias")),
    col("Email", Field::Text("/email")),
    col("Phone", Field::Text("/phone_number")),
    col("Language", Field::Text("/preferred_language")),
    col("Comms", Field::Joined("/communication_methods")),
    col("Created", Field::Date("/created_at")),
];

const PRODUCT_COLUMNS: &[Column] = &[
    col("Name", Field::Bold("/name")),
    col("Type", Field::Text("/type")),
    col("Interval", Field::Interval),
    col("Price", Field::Prices),
    col("Status", Field::Flag("/is_active", "Active", "Inactive")),
    col("Created", Field::Date("/created_at")),
];

const SUBSCRIPTION_COLUMNS: &[Column] = &[
    col("ID", Field::Id("/id")),
    col("Consumer", Field::Consumer),
    col("Status", Field::Status("/status")),
    col("Amount", Field::Money("/amount")),
    col("Interval", Field::Interval),
    col("Cycle #", Field::Text("/current_cycle_number")),
    col("Period End", Field::Date("/current_period_end")),
    col("Created", Field::Date("/created_at")),
];

const FREEZE_COLUMNS: &[Column] = &[
    col("ID", Field::Id("/id")),
    col("Start", Field::Date("/freeze_start_datetime")),
    col("End", Field::Date("/freeze_end_datetime")),
    col("Duration", Field::Suffixed("/duration", " days")),
    col("Notes", Field::Text("/notes")),
    col("Created", Field::Date("/created_at")),
];

const INVOICE_COLUMNS: &[Column] = &[
    col("#", Field::Text("/org_invoice_number")),
    col("ID", Field::Id("/id")),
    col("Consumer", Field::Consumer),
    col("Status", Field::Status("/status")),
    col("Total", Field::Money("/total_amount")),
    col("Paid", Field::Money("/paid_amount")),
    col("Due", Field::Date("/scheduled_on")),
    col("Created", Field::Date("/created_at")),
];

const PAYMENT_COLUMNS: &[Column] = &[
    col("ID", Field::Id("/id")),
    col("Amount", Field::Money("/amount")),
    col("Status", Field::Status("/current_status")),
    col("Type", Field::Text("/type")),
    col("Method", Field::Text("/payment_method")),
    col("Scheduled", Field::Date("/scheduled_on")),
    col("Paid At", Field::Date("/payed_at")),
    col("Refunded At", Field::Date("/refunded_at")),
];

const COUPON_COLUMNS: &[Column] = &[
    col("ID", Field::Id("/id")),
    col("Name", Field::Bold("/name")),
    col("Discount", Field::Discount),
    col("Type", Field::Flag("/is_percentage", "Percentage", "Fixed")),
    col("Status", Field::Flag("/is_active", "Active", "Inactive")),
    col("Used", Field::Text("/times_used")),
    col("Created", Field::Date("/created_at")),
];

const PAYMENT_LINK_COLUMNS: &[Column] = &[
    col("ID", Field::Id("/id")),
    col("Name", Field::Bold("/name")),
    col("Status", Field::Status("/status")),
    col("Amount", Field::Money("/amount")),
    col("Collected", Field::Money("/amount_collected")),
    col("Items", Field::Count("/items")),
    col("Max Payments", Field::Text("/max_number_of_payments")),
    col("Valid Until", Field::Date("/valid_until")),
    col("URL", Field::Text("/url")),
    col("Created", Field::Date("/created_at")),
];

impl View {
    fn columns(self) -> Option<&'static [Column]> {
        match self {
            View::Generic => None,
            View::Consumers => Some(CONSUMER_COLUMNS),
            View::Products => Some(PRODUCT_COLUMNS),
            View::Subscriptions => Some(SUBSCRIPTION_COLUMNS),
            View::Freezes => Some(FREEZE_COLUMNS),
            View::Invoices => Some(INVOICE_COLUMNS),
            View::Payments => Some(PAYMENT_COLUMNS),
            View::Coupons => Some(COUPON_COLUMNS),
            View::PaymentLinks => Some(PAYMENT_LINK_COLUMNS),
        }
    }

    fn empty_message(self) -> &'static str {
        match self {
            View::Generic => "No data to display in table format",
            View::Consumers => "No consumers found",
            View::Products => "No products found",
            View::Subscriptions => "No subscriptions found",
            View::Freezes => "No freeze periods found",
            View::Invoices => "No invoices found",
            View::Payments => "No payments found",
            View::Coupons => "No coupons found",
            View::PaymentLinks => "No payment links found",
        }
    }
}

/// Print `value` in the requested format.
pub fn render(value: &Value, format: OutputFormat, view: View) -> eyre::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Pretty => {
            for line in pretty_lines(value) {
                println!("{line}");
            }
        }
        OutputFormat::Table => match build_table(value, view) {
            Some(table) => {
                println!("{table}");
                if let Some(summary) = pagination_summary(value) {
                    println!("{}", style(format!("  {summary}")).dim());
                }
            }
            None => println!("{}", style(view.empty_message()).yellow()),
        },
    }
    Ok(())
}

/// The list inside a paginated envelope, or the value itself.
fn extract_items(value: &Value) -> &Value {
    match value.get("data") {
        Some(data @ Value::Array(_)) if value.is_object() => data,
        _ => value,
    }
}

fn extract_pagination(value: &Value) -> Option<&Map<String, Value>> {
    value.get("pagination").and_then(Value::as_object)
}

/// `Page 2 of 5 (48 total) | 10 per page [← prev next →]`
pub fn pagination_summary(value: &Value) -> Option<String> {
    let pagination = extract_pagination(value)?;
    let field = |primary: &str, fallback: &str| {
        pagination
            .get(primary)
            .or_else(|| pagination.get(fallback))
            .filter(|v| !v.is_null())
            .map(scalar_text)
    };

    let mut parts = Vec::new();
    if let Some(page) = field("current_page", "page") {
        parts.push(format!("Page {page}"));
    }
    if let Some(max) = field("max_page", "total_pages") {
        parts.push(format!("of {max}"));
    }
    if let Some(total) = field("total_count", "total") {
        parts.push(format!("({total} total)"));
    }
    if let Some(limit) = pagination.get("limit").filter(|v| !v.is_null()) {
        parts.push(format!("| {} per page", scalar_text(limit)));
    }

    let flag = |key: &str| pagination.get(key).and_then(Value::as_bool).unwrap_or(false);
    let mut nav = Vec::new();
    if flag("has_previous_page") {
        nav.push("← prev");
    }
    if flag("has_next_page") {
        nav.push("next →");
    }
    if !nav.is_empty() {
        parts.push(format!("[{}]", nav.join(" ")));
    }

    (!parts.is_empty()).then(|| parts.join(" "))
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => EMPTY.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn pretty_lines(value: &Value) -> Vec<String> {
    let mut out = Vec::new();
    match extract_items(value) {
        Value::Array(items) => {
            out.push(String::new());
            out.push(style(format!("Found {} items:", items.len())).green().to_string());
            out.push(String::new());
            for (index, item) in items.iter().enumerate() {
                out.push(style(format!("[{}]", index + 1)).cyan().to_string());
                match item {
                    Value::Object(map) => object_lines(map, 1, &mut out),
                    other => out.push(format!("  {}", scalar_text(other))),
                }
                out.push(String::new());
            }
            if let Some(summary) = pagination_summary(value) {
                out.push(style(format!("  {summary}")).dim().to_string());
            }
        }
        Value::Object(map) => {
            out.push(String::new());
            out.push(style("Result:").green().to_string());
            out.push(String::new());
            object_lines(map, 0, &mut out);
            out.push(String::new());
        }
        other => out.push(scalar_text(other)),
    }
    out
}

fn object_lines(map: &Map<String, Value>, indent: usize, out: &mut Vec<String>) {
    let spaces = "  ".repeat(indent);
    for (key, value) in map {
        let key = style(key).yellow();
        match value {
            Value::Null => out.push(format!("{spaces}{key}: {}", style(EMPTY).dim())),
            Value::Array(items) if items.is_empty() => {
                out.push(format!("{spaces}{key}: {}", style("[]").dim()));
            }
            Value::Array(items) if items[0].is_object() => {
                out.push(format!(
                    "{spaces}{key}: {}",
                    style(format!("[{} items]", items.len())).dim()
                ));
                for (index, item) in items.iter().enumerate() {
                    out.push(format!("{spaces}  {}", style(format!("[{index}]")).dim()));
                    match item {
                        Value::Object(nested) => object_lines(nested, indent + 2, out),
                        other => out.push(format!("{spaces}    {}", scalar_text(other))),
                    }
                }
            }
            Value::Array(items) => {
                let joined = items.iter().map(scalar_text).collect::<Vec<_>>().join(", ");
                out.push(format!("{spaces}{key}: {joined}"));
            }
            Value::Object(nested) => {
                out.push(format!("{spaces}{key}:"));
                object_lines(nested, indent + 1, out);
            }
            Value::Bool(true) => out.push(format!("{spaces}{key}: {}", style("true").green())),
            Value::Bool(false) => out.push(format!("{spaces}{key}: {}", style("false").red())),
            other => out.push(format!("{spaces}{key}: {}", scalar_text(other))),
        }
    }
}

fn new_table(headers: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(comfy_table::presets::UTF8_FULL)
        .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        headers
            .into_iter()
            .map(|h| Cell::new(h).fg(Color::Cyan).add_attribute(Attribute::Bold)),
    );
    table
}

/// Rows to tabulate: the items of a list, or a lone object as one row.
fn table_rows(value: &Value) -> Vec<&Value> {
    match extract_items(value) {
        Value::Array(items) => items.iter().collect(),
        object @ Value::Object(_) => vec![object],
        _ => Vec::new(),
    }
}

/// `None` when there is nothing to tabulate.
pub fn build_table(value: &Value, view: View) -> Option<Table> {
    let rows = table_rows(value);
    if rows.is_empty() {
        return None;
    }

    match view.columns() {
        Some(columns) => {
            let mut table = new_table(columns.iter().map(|c| c.header).collect());
            for row in rows {
                table.add_row(columns.iter().map(|c| field_cell(row, c.field)));
            }
            Some(table)
        }
        None => generic_table(&rows),
    }
}

fn generic_table(rows: &[&Value]) -> Option<Table> {
    let mut keys: Vec<&str> = Vec::new();
    for row in rows {
        let Some(map) = row.as_object() else { continue };
        for (key, value) in map {
            if !value.is_object() && !keys.contains(&key.as_str()) {
                keys.push(key);
            }
        }
    }
    if keys.is_empty() {
        return None;
    }

    let mut table = new_table(keys.clone());
    for row in rows {
        table.add_row(
            keys.iter()
                .map(|key| semantic_cell(key, row.get(*key).unwrap_or(&Value::Null))),
        );
    }
    Some(table)
}

fn status_color(status: &str) -> Option<Color> {
    match status.to_uppercase().as_str() {
        "ACTIVE" | "PAID" | "COMPLETED" | "SUCCESS" | "SUCCEEDED" | "UNFROZEN" | "SETTLED" => {
            Some(Color::Green)
        }
        "INACTIVE" | "CANCELLED" | "CANCELED" | "FAILED" | "VOIDED" | "REJECTED" | "EXPIRED" => {
            Some(Color::Red)
        }
        "PENDING" | "FROZEN" | "PROCESSING" | "DRAFT" | "UNDER_REVIEW" => Some(Color::Yellow),
        _ => None,
    }
}

fn empty_cell() -> Cell {
    Cell::new(EMPTY).fg(Color::DarkGrey)
}

fn lookup<'a>(row: &'a Value, pointer: &str) -> Option<&'a Value> {
    row.pointer(pointer).filter(|v| !v.is_null())
}

fn text_at(row: &Value, pointer: &str) -> Option<String> {
    lookup(row, pointer)
        .map(scalar_text)
        .filter(|s| !s.is_empty())
}

fn currency_of(row: &Value) -> String {
    text_at(row, "/currency").unwrap_or_else(|| DEFAULT_CURRENCY.to_string())
}

/// Plain text shown for `field` in `row`, without styling.
fn field_text(row: &Value, field: Field) -> Option<String> {
    match field {
        Field::Text(p) | Field::Bold(p) | Field::Id(p) | Field::Status(p) => text_at(row, p),
        Field::Date(p) => text_at(row, p).map(|s| s.chars().take(10).collect()),
        Field::Money(p) => text_at(row, p).map(|amount| format!("{amount} {}", currency_of(row))),
        Field::Joined(p) => match lookup(row, p) {
            Some(Value::Array(items)) if !items.is_empty() => Some(
                items.iter().map(scalar_text).collect::<Vec<_>>().join(", "),
            ),
            _ => None,
        },
        Field::Count(p) => lookup(row, p)
            .and_then(Value::as_array)
            .map(|items| format!("{} items", items.len())),
        Field::Suffixed(p, suffix) => text_at(row, p).map(|s| format!("{s}{suffix}")),
        Field::Flag(p, yes, no) => lookup(row, p)
            .and_then(Value::as_bool)
            .map(|b| if b { yes } else { no }.to_string()),
        Field::Consumer => ["/name", "/alias", "/email", "/id"].iter().find_map(|p| {
            lookup(row, "/organization_consumer").and_then(|c| text_at(c, p))
        }),
        Field::Interval => text_at(row, "/recurring_interval").map(|interval| {
            let count = text_at(row, "/recurring_interval_count").unwrap_or_else(|| "1".into());
            format!("Every {count} {interval}")
        }),
        Field::Prices => match lookup(row, "/prices") {
            Some(Value::Array(prices)) if !prices.is_empty() => Some(
                prices
                    .iter()
                    .map(|p| {
                        let amount = text_at(p, "/amount").unwrap_or_else(|| EMPTY.into());
                        format!("{amount} {}", currency_of(p))
                    })
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            _ => match (text_at(row, "/price"), text_at(row, "/currency")) {
                (Some(price), Some(currency)) => Some(format!("{price} {currency}")),
                _ => None,
            },
        },
        Field::Discount => text_at(row, "/discount_value").map(|value| {
            let percentage = lookup(row, "/is_percentage").and_then(Value::as_bool);
            match (percentage, text_at(row, "/currency")) {
                (Some(true), _) => format!("{value}%"),
                (_, Some(currency)) => format!("{value} {currency}"),
                _ => value,
            }
        }),
    }
}

fn field_cell(row: &Value, field: Field) -> Cell {
    let Some(text) = field_text(row, field) else {
        return empty_cell();
    };
    let cell = Cell::new(&text);
    match field {
        Field::Bold(_) => cell.add_attribute(Attribute::Bold),
        Field::Id(_) => cell.add_attribute(Attribute::Dim),
        Field::Date(_) => cell.fg(Color::Blue),
        Field::Money(_) | Field::Prices | Field::Discount => cell.fg(Color::Magenta),
        Field::Interval => cell.fg(Color::Cyan),
        Field::Status(_) => match status_color(&text) {
            Some(color) => cell.fg(color),
            None => cell,
        },
        Field::Flag(p, _, _) => match lookup(row, p).and_then(Value::as_bool) {
            Some(true) => cell.fg(Color::Green),
            _ => cell.fg(Color::Red),
        },
        _ => cell,
    }
}

/// Style a generic table cell from the field name and value type.
fn semantic_cell(key: &str, value: &Value) -> Cell {
    let text = match value {
        Value::Null => return empty_cell(),
        Value::Bool(true) => return Cell::new("✓ true").fg(Color::Green),
        Value::Bool(false) => return Cell::new("✗ false").fg(Color::Red),
        Value::Array(items) if items.is_empty() => return Cell::new("[]").fg(Color::DarkGrey),
        Value::Array(items) if items[0].is_object() => {
            return Cell::new(format!("[{} items]", items.len())).fg(Color::DarkGrey);
        }
        Value::Array(items) => items.iter().map(scalar_text).collect::<Vec<_>>().join(", "),
        Value::Object(_) => return Cell::new("[Object]").fg(Color::DarkGrey),
        other => scalar_text(other),
    };

    let key = key.to_lowercase();
    let cell = Cell::new(&text);
    if key == "status" || key.ends_with("_status") {
        return match status_color(&text) {
            Some(color) => cell.fg(color),
            None => cell,
        };
    }
    if key == "amount" || key.contains("_amount") || key.contains("price") || key.contains("_value") || key == "total" {
        return cell.fg(Color::Magenta);
    }
    if key == "currency" || key.ends_with("_currency") {
        return cell.fg(Color::Yellow);
    }
    if key == "id" || key.ends_with("_id") {
        return cell.add_attribute(Attribute::Dim);
    }
    if key.contains("_at") || key.contains("_date") || key == "valid_until" {
        return cell.fg(Color::Blue);
    }
    if key == "name" || key.ends_with("_name") {
        return cell.add_attribute(Attribute::Bold);
    }
    if key.contains("email") || key.contains("phone") {
        return cell.fg(Color::Cyan);
    }
    if key.contains("url") || key.contains("link") {
        return cell.fg(Color::Blue).add_attribute(Attribute::Underlined);
    }
    cell
}

pub fn success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

pub fn warning(message: &str) {
    println!("{} {}", style("⚠").yellow(), message);
}

pub fn info(message: &str) {
    println!("{} {}", style("ℹ").blue(), message);
}

/// Lines describing a failed command: the outermost context, then the API
/// error fields or the root cause.
pub fn failure_lines(err: &eyre::Report) -> Vec<String> {
    let label = |text: &str| style(text.to_string()).red().for_stderr().to_string();
    let mut lines = vec![format!("{} {}", label("✗"), err)];

    if let Some(api) = err.chain().find_map(|e| e.downcast_ref::<ApiError>()) {
        lines.push(format!("{} {}", label("  Error:"), api.code));
        lines.push(format!("{} {}", label("  Message:"), api.message));
        if let Some(details) = &api.details {
            let details = match details {
                Value::String(s) => s.clone(),
                other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
            };
            lines.push(format!("{} {}", label("  Details:"), details));
        }
        if api.status_code != 0 {
            lines.push(format!("{} {}", label("  Status:"), api.status_code));
        }
    } else if err.chain().count() > 1 {
        lines.push(format!("{} {}", label("  Error:"), err.root_cause()));
    }
    lines
}

pub fn report_failure(err: &eyre::Report) {
    for line in failure_lines(err) {
        eprintln!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eyre::WrapErr;
    use serde_json::json;

    fn plain() {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    fn rendered(table: Table) -> String {
        let mut table = table;
        table.force_no_tty();
        table.to_string()
    }

    #[test]
    fn pretty_unwraps_paginated_lists() {
        plain();
        let value = json!({
            "data": [{"name": "Sara", "email": null, "tags": ["a", "b"], "active": true}],
            "pagination": {"current_page": 1, "max_page": 3, "total_count": 25, "limit": 10,
                           "has_next_page": true, "has_previous_page": false}
        });
        let lines = pretty_lines(&value);
        assert!(lines.contains(&"Found 1 items:".to_string()));
        assert!(lines.contains(&"[1]".to_string()));
        assert!(lines.contains(&"  name: Sara".to_string()));
        assert!(lines.contains(&"  email: —".to_string()));
        assert!(lines.contains(&"  tags: a, b".to_string()));
        assert!(lines.contains(&"  active: true".to_string()));
        assert_eq!(
            lines.last().unwrap(),
            "  Page 1 of 3 (25 total) | 10 per page [next →]"
        );
    }

    #[test]
    fn pretty_prints_nested_objects_and_object_arrays() {
        plain();
        let value = json!({
            "id": "inv_1",
            "consumer": {"name": "Sara"},
            "items": [{"product_id": "p1", "quantity": 2}],
            "coupons": []
        });
        let lines = pretty_lines(&value);
        assert!(lines.contains(&"Result:".to_string()));
        assert!(lines.contains(&"consumer:".to_string()));
        assert!(lines.contains(&"  name: Sara".to_string()));
        assert!(lines.contains(&"items: [1 items]".to_string()));
        assert!(lines.contains(&"  [0]".to_string()));
        assert!(lines.contains(&"    quantity: 2".to_string()));
        assert!(lines.contains(&"coupons: []".to_string()));
    }

    #[test]
    fn pagination_uses_legacy_field_names() {
        let value = json!({"data": [], "pagination": {"page": 2, "total_pages": 4, "total": 31}});
        assert_eq!(
            pagination_summary(&value).as_deref(),
            Some("Page 2 of 4 (31 total)")
        );
        assert_eq!(pagination_summary(&json!({"data": []})), None);
    }

    #[test]
    fn generic_table_skips_nested_objects() {
        let value = json!({"data": [
            {"id": "1", "meta": {"x": 1}, "amount": 10},
            {"id": "2", "meta": null, "is_active": false}
        ]});
        let text = rendered(build_table(&value, View::Generic).unwrap());
        assert!(text.contains("amount"));
        assert!(text.contains("is_active"));
        // `meta` is a nested object in the first row, null in the second.
        assert!(text.contains("meta"));
        assert!(text.contains("✗ false"));
    }

    #[test]
    fn curated_columns_follow_pointers() {
        let invoice = json!({
            "id": "inv_1",
            "org_invoice_number": 42,
            "organization_consumer": {"name": "Sara"},
            "status": "SENT",
            "total_amount": 115,
            "currency": "USD",
            "scheduled_on": "2026-04-01T00:00:00Z"
        });
        assert_eq!(field_text(&invoice, Field::Consumer).as_deref(), Some("Sara"));
        assert_eq!(
            field_text(&invoice, Field::Money("/total_amount")).as_deref(),
            Some("115 USD")
        );
        assert_eq!(field_text(&invoice, Field::Money("/paid_amount")), None);
        assert_eq!(
            field_text(&invoice, Field::Date("/scheduled_on")).as_deref(),
            Some("2026-04-01")
        );

        let text = rendered(build_table(&invoice, View::Invoices).unwrap());
        assert!(text.contains("Consumer"));
        assert!(text.contains("42"));
    }

    #[test]
    fn product_and_coupon_fields() {
        let product = json!({
            "recurring_interval": "MONTH",
            "prices": [{"amount": 299, "currency": "SAR"}, {"amount": 80}]
        });
        assert_eq!(
            field_text(&product, Field::Interval).as_deref(),
            Some("Every 1 MONTH")
        );
        assert_eq!(
            field_text(&product, Field::Prices).as_deref(),
            Some("299 SAR, 80 SAR")
        );

        let coupon = json!({"discount_value": 15, "is_percentage": true, "is_active": false});
        assert_eq!(field_text(&coupon, Field::Discount).as_deref(), Some("15%"));
        assert_eq!(
            field_text(&coupon, Field::Flag("/is_active", "Active", "Inactive")).as_deref(),
            Some("Inactive")
        );
    }

    #[test]
    fn empty_lists_produce_no_table() {
        assert!(build_table(&json!({"data": []}), View::Consumers).is_none());
        assert!(build_table(&json!("text"), View::Generic).is_none());
    }

    #[test]
    fn api_failures_list_their_fields() {
        plain();
        let api = ApiError::new(409, "DUPLICATE_CONSUMER", "already exists")
            .with_details(Some(json!({"field": "email"})));
        let err = Err::<(), _>(api)
            .wrap_err("Failed to create consumer")
            .unwrap_err();

        let lines = failure_lines(&err);
        assert_eq!(lines[0], "✗ Failed to create consumer");
        assert_eq!(lines[1], "  Error: DUPLICATE_CONSUMER");
        assert_eq!(lines[2], "  Message: already exists");
        assert!(lines[3].starts_with("  Details: {"));
        assert_eq!(lines.last().unwrap(), "  Status: 409");
    }

    #[test]
    fn network_failures_omit_status() {
        plain();
        let err = Err::<(), _>(ApiError::new(0, "NETWORK_ERROR", "connection refused"))
            .wrap_err("Failed to list payments")
            .unwrap_err();
        let lines = failure_lines(&err);
        assert_eq!(lines.len(), 3);
        assert!(!lines.iter().any(|l| l.contains("Status")));
    }

    #[test]
    fn other_failures_show_the_root_cause() {
        plain();
        let err = eyre::eyre!("--name is required").wrap_err("Failed to create consumer");
        assert_eq!(
            failure_lines(&err),
            vec!["✗ Failed to create consumer", "  Error: --name is required"]
        );
    }
}
