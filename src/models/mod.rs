//! Shopify API model types.

mod fulfillment;
mod options;
mod theme;

pub use fulfillment::*;
pub use options::*;
pub use theme::*;
