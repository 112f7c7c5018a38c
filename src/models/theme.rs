//! Theme model and trait implementations.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ShopifyError};
use crate::executor::RequestExecutor;
use crate::models::options::ListOptions;
use crate::request::{Method, RequestDescriptor};
use crate::traits::{Create, Delete, Get, List, Update};

/// A Shopify theme.
///
/// Every field is optional so the same type serves reads, creates and
/// partial updates; unset fields are left out of request bodies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    /// Unique numeric identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,

    /// The theme name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Where the theme is used in the shop.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<ThemeRole>,

    /// Whether the theme can be previewed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previewable: Option<bool>,

    /// Whether Shopify is still extracting the theme's files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing: Option<bool>,

    /// Theme Store ID, for themes installed from the Theme Store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme_store_id: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<FixedOffset>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<FixedOffset>>,
}

impl Theme {
    /// Whether this is the published theme.
    pub fn is_main(&self) -> bool {
        self.role == Some(ThemeRole::Main)
    }

    fn path(id: u64) -> String {
        format!("themes/{id}.json")
    }
}

/// Role of a theme within the shop.
///
/// Unrecognized roles are kept verbatim in [`ThemeRole::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ThemeRole {
    /// The published theme customers see.
    Main,
    Unpublished,
    /// Installed from the Theme Store in demo mode.
    Demo,
    Development,
    Other(String),
}

impl From<String> for ThemeRole {
    fn from(value: String) -> Self {
        match value.as_str() {
            "main" => Self::Main,
            "unpublished" => Self::Unpublished,
            "demo" => Self::Demo,
            "development" => Self::Development,
            _ => Self::Other(value),
        }
    }
}

impl From<ThemeRole> for String {
    fn from(role: ThemeRole) -> Self {
        role.to_string()
    }
}

impl fmt::Display for ThemeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Main => "main",
            Self::Unpublished => "unpublished",
            Self::Demo => "demo",
            Self::Development => "development",
            Self::Other(other) => other.as_str(),
        })
    }
}

/// Parameters for creating a theme.
#[derive(Debug, Clone, Default)]
pub struct ThemeCreate {
    /// Initial theme attributes. Shopify always starts a new theme as
    /// `unpublished`; another role is applied once its files are extracted.
    pub theme: Theme,
    /// URL of a `.zip` with the theme's source files.
    pub src: Option<String>,
}

#[async_trait]
impl Get for Theme {
    type Id = u64;

    #[tracing::instrument(skip(client))]
    async fn get<E: RequestExecutor>(client: &E, id: u64, fields: Option<&str>) -> Result<Self> {
        let mut builder = RequestDescriptor::builder(Method::Get, Self::path(id)).envelope("theme");
        if let Some(fields) = fields.filter(|f| !f.is_empty()) {
            builder = builder.query("fields", fields);
        }
        client.execute(builder.build()?).await
    }
}

#[async_trait]
impl List for Theme {
    type Query = ListOptions;

    fn list_request(query: &ListOptions) -> Result<RequestDescriptor> {
        RequestDescriptor::builder(Method::Get, "themes.json")
            .envelope("themes")
            .query_pairs(query.to_query()?)
            .build()
    }
}

#[async_trait]
impl Create for Theme {
    type Params = ThemeCreate;

    #[tracing::instrument(skip(client, params), fields(name = ?params.theme.name))]
    async fn create<E: RequestExecutor>(client: &E, params: ThemeCreate) -> Result<Self> {
        let request = RequestDescriptor::builder(Method::Post, "themes.json")
            .envelope("theme")
            .body(&params.theme)
            .body_field("src", params.src.as_deref().filter(|s| !s.is_empty()))
            .build()?;
        client.execute(request).await
    }
}

#[async_trait]
impl Update for Theme {
    #[tracing::instrument(skip(client, entity), fields(id = ?entity.id))]
    async fn update<E: RequestExecutor>(client: &E, entity: &Self) -> Result<Self> {
        let id = entity.id.ok_or_else(|| {
            ShopifyError::InvalidArgument("theme id is required for update".to_string())
        })?;
        let request = RequestDescriptor::builder(Method::Put, Self::path(id))
            .envelope("theme")
            .body(entity)
            .build()?;
        client.execute(request).await
    }
}

#[async_trait]
impl Delete for Theme {
    type Id = u64;

    #[tracing::instrument(skip(client))]
    async fn delete<E: RequestExecutor>(client: &E, id: u64) -> Result<()> {
        let request = RequestDescriptor::builder(Method::Delete, Self::path(id)).build()?;
        client.execute_empty(request).await
    }
}
