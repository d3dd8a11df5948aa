//! Output formatting for CLI.

use bazaar_catalog::SearchPage;
use bazaar_mcp::ProxyResult;
use colored::Colorize;

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable output.
    Human,
    /// JSON output.
    #[default]
    Json,
}

/// Trait for renderable output.
pub trait Render {
    /// Render as human-readable string.
    fn render_human(&self) -> String;

    /// Render as JSON string.
    fn render_json(&self) -> String;

    /// Render in the specified format.
    fn render(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Human => self.render_human(),
            OutputFormat::Json => self.render_json(),
        }
    }
}

impl Render for SearchPage {
    fn render_human(&self) -> String {
        if self.tools.is_empty() {
            return "No tools found.".dimmed().to_string();
        }

        let mut lines = vec![format!(
            "{} {} of {}",
            "Tools:".green().bold(),
            self.tools.len(),
            self.pagination.total
        )];
        for tool in &self.tools {
            lines.push(format!("  {}", tool.name.cyan()));
            lines.push(format!("    {}", tool.description));
        }
        lines.join("\n")
    }

    fn render_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

impl Render for ProxyResult {
    fn render_human(&self) -> String {
        let mut lines = Vec::new();
        if self.payment_required().is_some() {
            lines.push("Payment required:".yellow().bold().to_string());
        } else if self.is_error {
            lines.push("Upstream error:".red().bold().to_string());
        }
        lines.push(self.text.clone());
        if let Some(settlement) = self.payment_response() {
            lines.push(format!("{} {}", "Settlement:".green().bold(), settlement));
        }
        lines.join("\n")
    }

    fn render_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}
