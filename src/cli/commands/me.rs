use crate::cli::Context;
use crate::cli::args::FormatArgs;
use crate::utils::output::{self, OutputFormat, View};
use clap::Args;
use console::style;
use eyre::{Result, WrapErr};
use serde_json::Value;

const MISSING: &str = "—";

#[derive(Args, Debug)]
pub struct Me {
    #[command(flatten)]
    format: FormatArgs,
}

impl Me {
    pub async fn run(&self, ctx: &mut Context) -> Result<()> {
        let me = ctx
            .client()?
            .me()
            .await
            .wrap_err("Failed to retrieve user info")?;
        output::success("User and organization info retrieved successfully");

        match ctx.format(&self.format, OutputFormat::Pretty) {
            OutputFormat::Pretty => {
                for line in me_lines(&me) {
                    println!("{line}");
                }
                Ok(())
            }
            format => output::render(&me, format, View::Generic),
        }
    }
}

fn label(text: &str) -> String {
    style(format!("{text:<16}")).yellow().to_string()
}

fn section(title: &str) -> String {
    let rule = "─".repeat(48usize.saturating_sub(title.chars().count()));
    style(format!("  ── {title} {rule}")).dim().to_string()
}

fn text<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn or_missing(value: Option<String>) -> String {
    value.unwrap_or_else(|| style(MISSING).dim().to_string())
}

fn full_name(value: &Value, first: &str, last: &str) -> Option<String> {
    let name = format!(
        "{} {}",
        text(value, first).unwrap_or_default(),
        text(value, last).unwrap_or_default()
    );
    let name = name.trim();
    (!name.is_empty()).then(|| name.to_string())
}

fn date(value: &Value, key: &str) -> String {
    or_missing(text(value, key).map(|s| {
        let day: String = s.chars().take(10).collect();
        style(day).blue().to_string()
    }))
}

/// Sectioned summary of the `/me` response.
pub fn me_lines(me: &Value) -> Vec<String> {
    let user = me.get("user").unwrap_or(&Value::Null);
    let org = me.get("organization").unwrap_or(&Value::Null);
    let currency = org.get("currency_config").unwrap_or(&Value::Null);

    let plain = |value: Option<&str>| or_missing(value.map(str::to_string));
    let cyan = |value: Option<&str>| or_missing(value.map(|s| style(s).cyan().to_string()));
    let environment = match org.get("sandbox").and_then(Value::as_bool) {
        Some(true) => style("SANDBOX").yellow().bold().to_string(),
        Some(false) => style("LIVE").green().bold().to_string(),
        None => style("(unknown)").dim().to_string(),
    };
    let enabled: Vec<&str> = currency
        .get("enabled_currencies")
        .and_then(Value::as_array)
        .map(|list| list.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    vec![
        String::new(),
        section("User"),
        format!("  {}{}", label("ID"), plain(text(user, "id"))),
        format!("  {}{}", label("Email"), plain(text(user, "email"))),
        format!(
            "  {}{}",
            label("Name"),
            or_missing(full_name(user, "first_name", "last_name"))
        ),
        format!(
            "  {}{}",
            label("Name (EN)"),
            or_missing(full_name(user, "en_first_name", "en_last_name"))
        ),
        format!("  {}{}", label("Member Since"), date(user, "created_at")),
        String::new(),
        section("Organization"),
        format!("  {}{}", label("ID"), plain(text(org, "id"))),
        format!("  {}{}", label("Name"), plain(text(org, "name"))),
        format!("  {}{}", label("Name (EN)"), plain(text(org, "name_en"))),
        format!("  {}{}", label("Environment"), environment),
        format!("  {}{}", label("Created"), date(org, "created_at")),
        String::new(),
        section("Currency Config"),
        format!(
            "  {}{}",
            label("Home Currency"),
            cyan(text(currency, "home_currency"))
        ),
        format!(
            "  {}{}",
            label("Default"),
            cyan(text(currency, "default_currency"))
        ),
        format!(
            "  {}{}",
            label("Enabled"),
            cyan((!enabled.is_empty()).then(|| enabled.join(", ")).as_deref())
        ),
        String::new(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lines(me: &Value) -> Vec<String> {
        console::set_colors_enabled(false);
        me_lines(me)
    }

    fn find<'a>(lines: &'a [String], prefix: &str) -> Vec<&'a str> {
        lines
            .iter()
            .map(|l| l.trim_start())
            .filter(|l| l.starts_with(prefix))
            .collect()
    }

    #[test]
    fn full_profile() {
        let me = json!({
            "user": {
                "id": "u_1",
                "email": "sara@example.com",
                "first_name": "سارة",
                "last_name": "",
                "en_first_name": "Sara",
                "en_last_name": "Ali",
                "created_at": "2024-03-05T10:00:00Z"
            },
            "organization": {
                "id": "org_1",
                "name": "Gym",
                "sandbox": true,
                "created_at": "2023-01-01T00:00:00Z",
                "currency_config": {
                    "home_currency": "SAR",
                    "enabled_currencies": ["SAR", "USD"]
                }
            }
        });
        let lines = lines(&me);

        assert!(lines.iter().any(|l| l.contains("── User")));
        assert!(lines.iter().any(|l| l.contains("── Currency Config")));
        assert_eq!(find(&lines, "Member Since")[0].trim_end(), format!("{:<16}2024-03-05", "Member Since"));
        assert!(find(&lines, "Name (EN)")[0].ends_with("Sara Ali"));
        assert!(find(&lines, "Name (EN)")[1].ends_with(MISSING));
        assert!(find(&lines, "Environment")[0].ends_with("SANDBOX"));
        assert!(find(&lines, "Enabled")[0].ends_with("SAR, USD"));
        assert!(find(&lines, "Default")[0].ends_with(MISSING));
    }

    #[test]
    fn empty_response_uses_placeholders() {
        let lines = lines(&json!({}));
        assert!(find(&lines, "Environment")[0].ends_with("(unknown)"));
        assert!(find(&lines, "Email")[0].ends_with(MISSING));
    }

    #[test]
    fn live_organization() {
        let lines = lines(&json!({"organization": {"sandbox": false}}));
        assert!(find(&lines, "Environment")[0].ends_with("LIVE"));
    }
}
