//! CLI argument parsing types.
//!
//! This module provides the command-line interface structure for the shopapi binary.

use clap::{Parser, Subcommand, ValueEnum};

/// Shopify Admin API command-line interface.
#[derive(Parser, Debug)]
#[command(name = "shopapi", about = "Shopify Admin API CLI", version)]
pub struct Cli {
    /// Output results as JSON instead of a table.
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Get a single entity by ID.
    Get {
        /// The type of entity to get.
        entity: Entity,

        /// The entity ID.
        id: u64,

        /// Parent order ID (required for fulfillments).
        #[arg(long)]
        order: Option<u64>,

        /// Comma-separated list of fields to return.
        #[arg(long)]
        fields: Option<String>,
    },

    /// List entities, one page or all of them.
    List {
        /// The type of entity to list.
        entity: Entity,

        /// Parent order ID (required for fulfillments).
        #[arg(long)]
        order: Option<u64>,

        /// Number of items per page (1-250).
        #[arg(long)]
        limit: Option<u32>,

        /// Follow pagination and fetch every page.
        #[arg(long)]
        all: bool,
    },

    /// Update an entity.
    Update {
        /// The type of entity to update.
        entity: Entity,

        /// The entity ID.
        id: u64,

        /// Parent order ID (required for fulfillments).
        #[arg(long)]
        order: Option<u64>,

        /// New theme name.
        #[arg(long)]
        name: Option<String>,

        /// New theme role (main, unpublished, ...).
        #[arg(long)]
        role: Option<String>,

        /// New tracking number for a fulfillment.
        #[arg(long)]
        tracking_number: Option<String>,

        /// New shipping company for a fulfillment.
        #[arg(long)]
        tracking_company: Option<String>,
    },

    /// Delete an entity.
    Delete {
        /// The type of entity to delete.
        entity: Entity,

        /// The entity ID.
        id: u64,
    },

    /// Count entities in a collection.
    Count {
        /// The type of entity to count.
        entity: Entity,

        /// Parent order ID (required for fulfillments).
        #[arg(long)]
        order: Option<u64>,
    },
}

/// Entity types that can be operated on.
#[derive(ValueEnum, Clone, Debug, PartialEq, Eq)]
pub enum Entity {
    /// An online store theme.
    #[value(alias = "themes")]
    Theme,
    /// A shipment of an order's line items.
    #[value(alias = "fulfillments")]
    Fulfillment,
}
