//! Output formatting for brand reports (JSON, table, markdown, CSV).

use crate::config::OutputFormat;
use crate::engine::BrandGroup;
use crate::sites::ScrapeResult;

/// Formats reports for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a full brand report.
    pub fn format_report(&self, groups: &[BrandGroup]) -> String {
        if groups.is_empty() {
            return match self.format {
                OutputFormat::Json => "[]".to_string(),
                OutputFormat::Csv => self.csv_header(),
                _ => "No products found.".to_string(),
            };
        }

        match self.format {
            OutputFormat::Json => json_report(groups),
            OutputFormat::Table => self.table_report(groups),
            OutputFormat::Markdown => self.markdown_report(groups),
            OutputFormat::Csv => self.csv_report(groups),
        }
    }

    /// Formats a single site result.
    pub fn format_result(&self, result: &ScrapeResult) -> String {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(result).unwrap_or_else(|_| "{}".to_string())
            }
            OutputFormat::Table => table_single(result),
            OutputFormat::Markdown => markdown_single(result),
            OutputFormat::Csv => {
                format!("{}\n{}", self.csv_header(), csv_row("", result))
            }
        }
    }

    // Table formatting

    fn table_report(&self, groups: &[BrandGroup]) -> String {
        let site_width = 12;
        let price_width = 10;
        let valid_width = 12;
        let title_width = 50;

        let mut lines = Vec::new();
        let mut total = 0;

        for group in groups {
            lines.push(format!("{} ({})", group.brand, group.products.len()));
            lines.push(format!(
                "  {:<site_width$}  {:>price_width$}  {:<valid_width$}  {}",
                "Website", "Price", "Valid till", "Title"
            ));
            lines.push(format!(
                "  {:-<site_width$}  {:-<price_width$}  {:-<valid_width$}  {:-<title_width$}",
                "", "", "", ""
            ));

            for product in &group.products {
                lines.push(format!(
                    "  {:<site_width$}  {:>price_width$}  {:<valid_width$}  {}",
                    product.website,
                    price_text(product.price),
                    truncate(&product.price_valid_till, valid_width),
                    truncate(&product.title, title_width)
                ));
            }

            lines.push(String::new());
            total += group.products.len();
        }

        lines.push(format!("Total: {} products in {} brands", total, groups.len()));

        lines.join("\n")
    }

    // Markdown formatting

    fn markdown_report(&self, groups: &[BrandGroup]) -> String {
        let mut lines = Vec::new();

        for group in groups {
            lines.push(format!("## {}", group.brand));
            lines.push(String::new());
            lines.push("| Website | Price | Valid till | Title |".to_string());
            lines.push("|---------|-------|------------|-------|".to_string());

            for product in &group.products {
                lines.push(format!(
                    "| {} | {} | {} | {} |",
                    product.website,
                    price_text(product.price),
                    product.price_valid_till,
                    truncate(&product.title, 60).replace('|', "\\|")
                ));
            }

            lines.push(String::new());
        }

        let total: usize = groups.iter().map(|g| g.products.len()).sum();
        lines.push(format!("*{} products found*", total));

        lines.join("\n")
    }

    // CSV formatting

    fn csv_header(&self) -> String {
        "brand,website,title,price,price_valid_till".to_string()
    }

    fn csv_report(&self, groups: &[BrandGroup]) -> String {
        let mut lines = vec![self.csv_header()];

        for group in groups {
            for product in &group.products {
                lines.push(csv_row(&group.brand, product));
            }
        }

        lines.join("\n")
    }
}

fn json_report(groups: &[BrandGroup]) -> String {
    serde_json::to_string_pretty(groups).unwrap_or_else(|_| "[]".to_string())
}

fn table_single(result: &ScrapeResult) -> String {
    let mut lines = Vec::new();

    lines.push(format!("Website: {}", result.website));
    lines.push(format!("Title:   {}", result.title));
    lines.push(format!("Price:   {}", price_text(result.price)));

    if !result.price_valid_till.is_empty() {
        lines.push(format!("Valid:   {}", result.price_valid_till));
    }

    lines.join("\n")
}

fn markdown_single(result: &ScrapeResult) -> String {
    let mut lines = Vec::new();

    lines.push(format!("## {}", result.title));
    lines.push(String::new());
    lines.push(format!("- **Website:** {}", result.website));
    lines.push(format!("- **Price:** {}", price_text(result.price)));

    if !result.price_valid_till.is_empty() {
        lines.push(format!("- **Valid till:** {}", result.price_valid_till));
    }

    lines.join("\n")
}

fn csv_row(brand: &str, result: &ScrapeResult) -> String {
    format!(
        "{},{},{},{},{}",
        csv_escape(brand),
        csv_escape(&result.website),
        csv_escape(&result.title),
        result.price.map(|p| p.to_string()).unwrap_or_default(),
        csv_escape(&result.price_valid_till)
    )
}

fn price_text(price: Option<f64>) -> String {
    price.map(|p| format!("{:.2}", p)).unwrap_or_else(|| "N/A".to_string())
}

/// Shortens `text` to at most `max` characters, marking the cut with "...".
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}

fn csv_escape(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
