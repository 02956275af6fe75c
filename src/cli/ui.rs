use crate::core::change::{ChangeDirection, PriceDifference};
use crate::core::component::SortDirection;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    Error,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::Error => style(text).red(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

/// Header cell for a sortable column. The active sort column carries a
/// direction marker.
pub fn sort_header_cell(text: &str, active: Option<SortDirection>) -> Cell {
    match active {
        Some(SortDirection::Ascending) => header_cell(&format!("{text} ↑")),
        Some(SortDirection::Descending) => header_cell(&format!("{text} ↓")),
        None => header_cell(text),
    }
}

/// Cell for a price change: direction glyph plus two-digit percent.
pub fn change_cell(difference: &PriceDifference) -> Cell {
    let (text, color) = match difference.direction {
        ChangeDirection::Up => (format!("▲ {}%", difference.format_percent()), Color::Green),
        ChangeDirection::Down => (format!("▼ {}%", difference.format_percent()), Color::Red),
        ChangeDirection::Flat => (format!("{}%", difference.format_percent()), Color::DarkGrey),
    };
    Cell::new(text)
        .fg(color)
        .set_alignment(CellAlignment::Right)
}

/// Cell shown while a value is still loading.
pub fn placeholder_cell() -> Cell {
    Cell::new("…")
        .fg(Color::DarkGrey)
        .set_alignment(CellAlignment::Right)
}

pub fn empty_cell() -> Cell {
    Cell::new("")
}

/// Creates a cell for "N/A" values, with error-specific styling.
pub fn na_cell(has_error: bool) -> Cell {
    let color = if has_error {
        Color::Red
    } else {
        Color::DarkGrey
    };
    Cell::new("N/A").fg(color)
}

/// Right-aligned numeric cell, five significant digits.
pub fn number_cell(value: f64) -> Cell {
    Cell::new(format_significant(value, 5)).set_alignment(CellAlignment::Right)
}

/// Numeric cell for an optional value; absent values render empty.
pub fn optional_number_cell(value: Option<f64>) -> Cell {
    value.map_or_else(empty_cell, number_cell)
}

/// Quality score cell, color-banded so the weakest publishers stand out.
pub fn score_cell(score: f64) -> Cell {
    let color = if score >= 0.9 {
        Color::Green
    } else if score >= 0.7 {
        Color::Yellow
    } else {
        Color::Red
    };
    Cell::new(format_significant(score, 5))
        .fg(color)
        .add_attribute(Attribute::Bold)
        .set_alignment(CellAlignment::Right)
}

/// Formats a number to at most `significant` significant digits, trimming
/// trailing zeros, e.g. `0.97852` or `64023` or `1.5`.
pub fn format_significant(value: f64, significant: u32) -> String {
    if !value.is_finite() || value == 0.0 {
        return format!("{value}");
    }

    let magnitude = value.abs().log10().floor() as i32;
    let digits_before_point = magnitude + 1;
    if digits_before_point > significant as i32 {
        // Integer part alone exceeds the significant digits: round off the excess
        let scale = 10f64.powi(digits_before_point - significant as i32);
        let rounded = (value / scale).round() * scale;
        return format!("{rounded:.0}");
    }

    let decimals = (significant as i32 - digits_before_point).max(0) as usize;
    let formatted = format!("{value:.decimals$}");
    if formatted.contains('.') {
        formatted
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    } else {
        formatted
    }
}

/// Creates a new `indicatif::ProgressBar` with standard styling.
pub fn new_progress_bar(len: u64, with_message: bool) -> ProgressBar {
    let template = if with_message {
        "{spinner:.green} {msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})"
    } else {
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})"
    };

    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(template)
            .unwrap()
            .progress_chars("#>-"),
    );
    pb
}

/// Creates a spinner for single fetches.
pub fn new_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_significant_trims_trailing_zeros() {
        assert_eq!(format_significant(0.97, 5), "0.97");
        assert_eq!(format_significant(1.0, 5), "1");
        assert_eq!(format_significant(1.5, 5), "1.5");
    }

    #[test]
    fn test_format_significant_limits_digits() {
        assert_eq!(format_significant(0.978516, 5), "0.97852");
        assert_eq!(format_significant(150.654321, 5), "150.65");
        assert_eq!(format_significant(0.999993, 5), "0.99999");
    }

    #[test]
    fn test_format_significant_rounds_wide_integers() {
        assert_eq!(format_significant(123456.0, 5), "123460");
        assert_eq!(format_significant(64023.55, 5), "64024");
    }

    #[test]
    fn test_format_significant_handles_zero_and_negative() {
        assert_eq!(format_significant(0.0, 5), "0");
        assert_eq!(format_significant(-0.5, 5), "-0.5");
    }
}
