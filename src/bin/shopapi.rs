//! Shopify Admin API CLI binary.
//!
//! A command-line interface for interacting with the Shopify Admin API.

use clap::Parser;
use serde::Serialize;
use shopapi::cli::{Cli, Command, Entity};
use shopapi::output::PrettyPrint;
use shopapi::{
    Count, Delete, Fulfillment, Get, List, ListOptions, Page, ShopifyClient, ShopifyError, Theme,
    ThemeRole, Update,
};
use std::process::ExitCode;
use tabled::{Table, Tabled};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();

    let client = match ShopifyClient::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Hint: Set SHOPIFY_SHOP and SHOPIFY_ACCESS_TOKEN environment variables");
            return ExitCode::FAILURE;
        }
    };

    match run(&client, cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(client: &ShopifyClient, cli: Cli) -> shopapi::Result<()> {
    match cli.command {
        Command::Get {
            entity,
            id,
            order,
            fields,
        } => handle_get(client, entity, id, order, fields.as_deref(), cli.json).await,
        Command::List {
            entity,
            order,
            limit,
            all,
        } => handle_list(client, entity, order, limit, all, cli.json).await,
        Command::Update {
            entity,
            id,
            order,
            name,
            role,
            tracking_number,
            tracking_company,
        } => {
            let changes = Changes {
                name,
                role,
                tracking_number,
                tracking_company,
            };
            handle_update(client, entity, id, order, changes, cli.json).await
        }
        Command::Delete { entity, id } => handle_delete(client, entity, id).await,
        Command::Count { entity, order } => handle_count(client, entity, order).await,
    }
}

fn require_order(order: Option<u64>) -> shopapi::Result<u64> {
    order.ok_or_else(|| {
        ShopifyError::InvalidArgument("--order is required for fulfillments".to_string())
    })
}

async fn handle_get(
    client: &ShopifyClient,
    entity: Entity,
    id: u64,
    order: Option<u64>,
    fields: Option<&str>,
    json: bool,
) -> shopapi::Result<()> {
    match entity {
        Entity::Theme => {
            let theme = Theme::get(client, id, fields).await?;
            output_single(&theme, json)?;
        }
        Entity::Fulfillment => {
            let order = require_order(order)?;
            let fulfillment = Fulfillment::get(client, (order, id), fields).await?;
            output_single(&fulfillment, json)?;
        }
    }
    Ok(())
}

async fn handle_list(
    client: &ShopifyClient,
    entity: Entity,
    order: Option<u64>,
    limit: Option<u32>,
    all: bool,
    json: bool,
) -> shopapi::Result<()> {
    let options = ListOptions {
        limit,
        ..Default::default()
    };

    match entity {
        Entity::Theme => {
            if all {
                let themes = Theme::list_all(client, &options).await?;
                output_items(&themes, json, |t| ThemeRow::from(t))?;
            } else {
                let page = Theme::list_page(client, &options).await?;
                output_page(&page, json, |t| ThemeRow::from(t))?;
            }
        }
        Entity::Fulfillment => {
            let query = (require_order(order)?, options);
            if all {
                let fulfillments = Fulfillment::list_all(client, &query).await?;
                output_items(&fulfillments, json, |f| FulfillmentRow::from(f))?;
            } else {
                let page = Fulfillment::list_page(client, &query).await?;
                output_page(&page, json, |f| FulfillmentRow::from(f))?;
            }
        }
    }
    Ok(())
}

struct Changes {
    name: Option<String>,
    role: Option<String>,
    tracking_number: Option<String>,
    tracking_company: Option<String>,
}

async fn handle_update(
    client: &ShopifyClient,
    entity: Entity,
    id: u64,
    order: Option<u64>,
    changes: Changes,
    json: bool,
) -> shopapi::Result<()> {
    match entity {
        Entity::Theme => {
            let theme = Theme {
                id: Some(id),
                name: changes.name,
                role: changes.role.map(ThemeRole::from),
                ..Default::default()
            };
            let updated = Theme::update(client, &theme).await?;
            output_single(&updated, json)?;
        }
        Entity::Fulfillment => {
            let fulfillment = Fulfillment {
                id: Some(id),
                order_id: Some(require_order(order)?),
                tracking_number: changes.tracking_number,
                tracking_company: changes.tracking_company,
                ..Default::default()
            };
            let updated = Fulfillment::update(client, &fulfillment).await?;
            output_single(&updated, json)?;
        }
    }
    Ok(())
}

async fn handle_delete(client: &ShopifyClient, entity: Entity, id: u64) -> shopapi::Result<()> {
    match entity {
        Entity::Theme => {
            Theme::delete(client, id).await?;
            println!("Deleted theme {id}");
            Ok(())
        }
        Entity::Fulfillment => Err(ShopifyError::InvalidArgument(
            "fulfillments cannot be deleted, cancel them instead".to_string(),
        )),
    }
}

async fn handle_count(
    client: &ShopifyClient,
    entity: Entity,
    order: Option<u64>,
) -> shopapi::Result<()> {
    match entity {
        Entity::Fulfillment => {
            let count = Fulfillment::count(client, require_order(order)?).await?;
            println!("{count}");
            Ok(())
        }
        Entity::Theme => {
            let themes = Theme::list_all(client, &ListOptions::default()).await?;
            println!("{}", themes.len());
            Ok(())
        }
    }
}

fn output_single<T: Serialize + PrettyPrint>(item: &T, json: bool) -> shopapi::Result<()> {
    if json {
        println!("{}", to_json(item)?);
    } else {
        println!("{}", item.pretty_print());
    }
    Ok(())
}

fn output_items<T, R, F>(items: &[T], json: bool, to_row: F) -> shopapi::Result<()>
where
    T: Serialize,
    R: Tabled,
    F: Fn(&T) -> R,
{
    if json {
        println!("{}", to_json(items)?);
    } else {
        let rows: Vec<R> = items.iter().map(to_row).collect();
        println!("{}", Table::new(rows));
        println!("\n{} total items", items.len());
    }
    Ok(())
}

fn output_page<T, R, F>(page: &Page<T>, json: bool, to_row: F) -> shopapi::Result<()>
where
    T: Serialize,
    R: Tabled,
    F: Fn(&T) -> R,
{
    if json {
        println!("{}", to_json(&page.items)?);
    } else {
        let rows: Vec<R> = page.items.iter().map(to_row).collect();
        println!("{}", Table::new(rows));
        if page.has_more() {
            println!("\n{} items (more available, use --all)", page.len());
        } else {
            println!("\n{} items (end)", page.len());
        }
    }
    Ok(())
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> shopapi::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

// Table row types for non-JSON output

fn display<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

#[derive(Tabled)]
struct ThemeRow {
    id: String,
    name: String,
    role: String,
    updated: String,
}

impl From<&Theme> for ThemeRow {
    fn from(t: &Theme) -> Self {
        Self {
            id: display(&t.id),
            name: display(&t.name),
            role: display(&t.role),
            updated: t
                .updated_at
                .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct FulfillmentRow {
    id: String,
    name: String,
    status: String,
    tracking: String,
}

impl From<&Fulfillment> for FulfillmentRow {
    fn from(f: &Fulfillment) -> Self {
        Self {
            id: display(&f.id),
            name: display(&f.name),
            status: display(&f.status),
            tracking: f.all_tracking_numbers().join(", "),
        }
    }
}
