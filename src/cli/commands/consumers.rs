use super::{raw_or, require};
use crate::cli::Context;
use crate::cli::args::{FormatArgs, PageArgs};
use crate::models::enums::{CommunicationMethod, Language, wire_list};
use crate::models::query::QueryParams;
use crate::utils::output::{self, OutputFormat, View};
use crate::utils::parse::{Body, InputError};
use clap::{Args, Subcommand};
use eyre::{Result, WrapErr};
use serde_json::Value;

#[derive(Args, Debug)]
pub struct Consumers {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a new consumer
    Create(Create),
    /// Get a consumer by ID
    Get(Get),
    /// List consumers
    List(List),
    /// Update a consumer by ID
    Update(Update),
    /// Delete a consumer by ID
    Delete(Delete),
}

#[derive(Args, Debug)]
struct Fields {
    /// Consumer name (required on create unless --data is used)
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    phone_number: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    external_id: Option<String>,
    /// IBAN (max 34 characters)
    #[arg(long)]
    iban: Option<String>,
    #[arg(long)]
    alias: Option<String>,
    #[arg(long)]
    comment: Option<String>,
    #[arg(long, value_enum, ignore_case = true)]
    preferred_language: Option<Language>,
    /// Comma-separated list of WHATSAPP, EMAIL, SMS
    #[arg(long, value_enum, ignore_case = true, value_delimiter = ',')]
    communication_methods: Vec<CommunicationMethod>,
    /// Raw JSON body, overriding every other field flag
    #[arg(long)]
    data: Option<String>,
}

impl Fields {
    fn body(&self) -> Body {
        let mut body = Body::new();
        body.set_opt("name", self.name.clone())
            .set_opt("phone_number", self.phone_number.clone())
            .set_opt("email", self.email.clone())
            .set_opt("external_id", self.external_id.clone())
            .set_opt("iban", self.iban.clone())
            .set_opt("alias", self.alias.clone())
            .set_opt("comment", self.comment.clone())
            .set_opt("preferred_language", self.preferred_language.map(Language::as_str));
        if !self.communication_methods.is_empty() {
            body.set("communication_methods", wire_list(&self.communication_methods));
        }
        body
    }

    fn create_body(&self) -> Result<Value, InputError> {
        raw_or(self.data.as_deref(), || {
            require(&self.name, "--name")?;
            Ok(self.body().into_value())
        })
    }

    fn update_body(&self) -> Result<Value, InputError> {
        raw_or(self.data.as_deref(), || {
            let body = self.body();
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
struct Get {
    /// Consumer ID
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
    #[command(flatten)]
    format: FormatArgs,
}

impl List {
    fn query(&self) -> QueryParams {
        let mut query = self.page.to_query();
        query.set("search_term", self.search.as_deref());
        query
    }
}

#[derive(Args, Debug)]
struct Update {
    /// Consumer ID
    id: String,
    #[command(flatten)]
    fields: Fields,
    #[command(flatten)]
    format: FormatArgs,
}

#[derive(Args, Debug)]
struct Delete {
    /// Consumer ID
    id: String,
}

impl Consumers {
    pub async fn run(&self, ctx: &mut Context) -> Result<()> {
        match &self.cmd {
            Command::Create(args) => create(ctx, args).await.wrap_err("Failed to create consumer"),
            Command::Get(args) => get(ctx, args).await.wrap_err("Failed to get consumer"),
            Command::List(args) => list(ctx, args).await.wrap_err("Failed to list consumers"),
            Command::Update(args) => update(ctx, args).await.wrap_err("Failed to update consumer"),
            Command::Delete(args) => delete(ctx, args).await.wrap_err("Failed to delete consumer"),
        }
    }
}

async fn create(ctx: &Context, args: &Create) -> Result<()> {
    let body = args.fields.create_body()?;
    let consumer = ctx.client()?.create_consumer(&body).await?;
    output::success("Consumer created successfully");
    ctx.render(&consumer, &args.format, OutputFormat::Pretty, View::Consumers)
}

async fn get(ctx: &Context, args: &Get) -> Result<()> {
    let consumer = ctx.client()?.get_consumer(&args.id).await?;
    output::success("Consumer retrieved successfully");
    ctx.render(&consumer, &args.format, OutputFormat::Pretty, View::Consumers)
}

async fn list(ctx: &Context, args: &List) -> Result<()> {
    let consumers = ctx.client()?.list_consumers(&args.query()).await?;
    ctx.render(&consumers, &args.format, OutputFormat::Table, View::Consumers)
}

async fn update(ctx: &Context, args: &Update) -> Result<()> {
    let body = args.fields.update_body()?;
    let consumer = ctx.client()?.update_consumer(&args.id, &body).await?;
    output::success("Consumer updated successfully");
    ctx.render(&consumer, &args.format, OutputFormat::Pretty, View::Consumers)
}

async fn delete(ctx: &Context, args: &Delete) -> Result<()> {
    ctx.client()?.delete_consumer(&args.id).await?;
    output::success(&format!("Consumer {} deleted successfully", args.id));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::testing::{parse, try_parse};
    use serde_json::json;

    #[test]
    fn create_body_from_flags() {
        let args: Create = parse(&[
            "--name",
            "Sara",
            "--email",
            "sara@example.com",
            "--preferred-language",
            "ar",
            "--communication-methods",
            "whatsapp,EMAIL",
        ]);
        assert_eq!(
            args.fields.create_body().unwrap(),
            json!({
                "name": "Sara",
                "email": "sara@example.com",
                "preferred_language": "AR",
                "communication_methods": ["WHATSAPP", "EMAIL"]
            })
        );
    }

    #[test]
    fn create_requires_a_name() {
        let args: Create = parse(&["--email", "sara@example.com"]);
        assert_eq!(
            args.fields.create_body().unwrap_err(),
            InputError::MissingFlag("--name")
        );
    }

    #[test]
    fn raw_data_replaces_flags() {
        let args: Create = parse(&["--name", "ignored", "--data", r#"{"name":"Raw","alias":"r"}"#]);
        assert_eq!(
            args.fields.create_body().unwrap(),
            json!({"name": "Raw", "alias": "r"})
        );
    }

    #[test]
    fn unknown_enum_values_are_rejected_before_any_request() {
        assert!(try_parse::<Create>(&["--name", "a", "--preferred-language", "FR"]).is_err());
        assert!(try_parse::<Create>(&["--name", "a", "--communication-methods", "EMAIL,FAX"]).is_err());
    }

    #[test]
    fn update_needs_at_least_one_field() {
        let args: Update = parse(&["c_1"]);
        assert_eq!(args.fields.update_body().unwrap_err(), InputError::EmptyUpdate);

        let args: Update = parse(&["c_1", "--iban", "SA0380000000608010167519"]);
        assert_eq!(
            args.fields.update_body().unwrap(),
            json!({"iban": "SA0380000000608010167519"})
        );
    }

    #[test]
    fn list_query_maps_flags() {
        let args: List = parse(&["--page", "2", "--limit", "50", "--search", "sara", "--sort-direction", "DESC"]);
        let pairs = args.query().pairs();
        assert_eq!(
            pairs,
            vec![
                ("page".to_string(), "2".to_string()),
                ("limit".to_string(), "50".to_string()),
                ("sort_direction".to_string(), "desc".to_string()),
                ("search_term".to_string(), "sara".to_string()),
            ]
        );
    }
}
