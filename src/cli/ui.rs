use crate::core::currency::{format_amount, round_to_currency};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    TotalLabel,
    TotalValue,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::TotalLabel => style(text).bold(),
        StyleType::TotalValue => style(text).green().bold(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Table colors picked from the user's dark mode setting.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    dark: bool,
}

impl Theme {
    pub fn new(dark: bool) -> Self {
        Self { dark }
    }

    fn header_color(&self) -> Color {
        if self.dark { Color::Cyan } else { Color::DarkBlue }
    }

    fn positive_color(&self) -> Color {
        if self.dark { Color::Green } else { Color::DarkGreen }
    }

    fn negative_color(&self) -> Color {
        if self.dark { Color::Red } else { Color::DarkRed }
    }

    /// Creates a new `comfy_table::Table` with standard styling and the given headers.
    pub fn table(&self, headers: &[&str]) -> Table {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(headers.iter().map(|h| self.header_cell(h)));
        table
    }

    pub fn header_cell(&self, text: &str) -> Cell {
        Cell::new(text)
            .fg(self.header_color())
            .add_attribute(Attribute::Bold)
    }

    /// Right-aligned amount, colored by sign when `signed` is set.
    pub fn amount_cell(&self, amount: f64, currency: &str, signed: bool) -> Cell {
        let amount = round_to_currency(amount, currency);
        let cell = Cell::new(format_amount(amount, currency)).set_alignment(CellAlignment::Right);
        match (signed, amount) {
            (true, a) if a > 0.0 => cell.fg(self.positive_color()),
            (true, a) if a < 0.0 => cell.fg(self.negative_color()),
            _ => cell,
        }
    }

    /// Percentage cell, highlighted once it passes `warn_above`.
    pub fn percentage_cell(&self, value: f64, warn_above: f64) -> Cell {
        let cell = Cell::new(format!("{value:.1}%")).set_alignment(CellAlignment::Right);
        if value > warn_above {
            cell.fg(self.negative_color()).add_attribute(Attribute::Bold)
        } else {
            cell
        }
    }

    pub fn flag_cell(&self, flag: bool, yes: &str, no: &str) -> Cell {
        if flag {
            Cell::new(yes).fg(self.positive_color())
        } else {
            Cell::new(no).fg(Color::DarkGrey)
        }
    }
}

/// Text progress bar, e.g. `[#######---] 70%`.
pub fn progress_bar_text(percentage: f64, width: usize) -> String {
    let filled = ((percentage.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    format!(
        "[{}{}] {:.0}%",
        "#".repeat(filled),
        "-".repeat(width - filled),
        percentage.clamp(0.0, 100.0)
    )
}

/// Creates a spinner for operations of unknown length.
pub fn new_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(spinner_style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
