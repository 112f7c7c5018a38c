//! Output formatting for CLI display.
//!
//! Provides the [`PrettyPrint`] trait for human-readable output
//! as an alternative to JSON serialization.

use crate::{Fulfillment, Theme};

/// Trait for human-readable key-value output.
///
/// Implemented by entity types to provide formatted output
/// suitable for terminal display when `--json` is not specified.
pub trait PrettyPrint {
    /// Returns a formatted string for terminal display.
    fn pretty_print(&self) -> String;
}

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S %:z";

fn id_or_dash(id: Option<u64>) -> String {
    id.map_or_else(|| "-".to_string(), |id| id.to_string())
}

impl PrettyPrint for Theme {
    fn pretty_print(&self) -> String {
        let header = format!("Theme: {}", id_or_dash(self.id));
        let divider = "─".repeat(header.len().max(30));

        let mut lines = vec![header, divider];

        if let Some(ref name) = self.name {
            lines.push(format!("Name:           {}", name));
        }

        if let Some(ref role) = self.role {
            lines.push(format!("Role:           {}", role));
        }

        if let Some(previewable) = self.previewable {
            lines.push(format!(
                "Previewable:    {}",
                if previewable { "yes" } else { "no" }
            ));
        }

        if self.processing == Some(true) {
            lines.push("Processing:     yes".to_string());
        }

        if let Some(ref updated) = self.updated_at {
            lines.push(format!("Updated:        {}", updated.format(TIMESTAMP_FORMAT)));
        }

        lines.join("\n")
    }
}

impl PrettyPrint for Fulfillment {
    fn pretty_print(&self) -> String {
        let header = format!(
            "Fulfillment: {}",
            self.name.clone().unwrap_or_else(|| id_or_dash(self.id))
        );
        let divider = "─".repeat(header.len().max(30));

        let mut lines = vec![header, divider];

        lines.push(format!("Order:          {}", id_or_dash(self.order_id)));

        if let Some(ref status) = self.status {
            lines.push(format!("Status:         {}", status));
        }

        if let Some(ref company) = self.tracking_company {
            lines.push(format!("Carrier:        {}", company));
        }

        let numbers = self.all_tracking_numbers();
        if !numbers.is_empty() {
            lines.push(format!("Tracking:       {}", numbers.join(", ")));
        }

        if let Some(ref items) = self.line_items {
            let quantity: u32 = items.iter().filter_map(|i| i.quantity).sum();
            lines.push(format!(
                "Items:          {} line items ({} units)",
                items.len(),
                quantity
            ));
        }

        if let Some(ref created) = self.created_at {
            lines.push(format!("Created:        {}", created.format(TIMESTAMP_FORMAT)));
        }

        lines.join("\n")
    }
}
