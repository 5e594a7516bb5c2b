//! Terminal rendering helpers shared by the views.

use std::io::{self, Write};

use chrono::{DateTime, Local, Utc};
use tabled::{
    builder::Builder,
    settings::{
        object::{Columns, Rows},
        Alignment, Color, Style, Theme,
    },
};

use cashbook_core::{PaymentStatus, PaymentType};

/// Shown in place of a missing value.
pub const EMPTY_CELL: &str = "-";

/// Builds a rounded table with a bold header row.
///
/// `right_aligned` lists the columns holding amounts or counts.
pub fn table<H, R>(header: H, rows: R, right_aligned: &[usize]) -> String
where
    H: IntoIterator,
    H::Item: Into<String>,
    R: IntoIterator<Item = Vec<String>>,
{
    let mut builder = Builder::default();
    builder.push_record(header.into_iter().map(Into::<String>::into));
    for row in rows {
        builder.push_record(row);
    }

    let mut table = builder.build();
    table.with(Theme::from(Style::modern_rounded()));
    table.modify(Rows::first(), Color::BOLD);
    for &column in right_aligned {
        table.modify(Columns::new(column..column + 1), Alignment::right());
    }
    table.to_string()
}

/// Writes an underlined section heading.
pub fn heading(out: &mut impl Write, title: &str) -> io::Result<()> {
    writeln!(out, "\n{title}")?;
    writeln!(out, "{}", "=".repeat(title.chars().count()))
}

/// Writes `label: value` with labels padded to a common width.
pub fn stat_line(out: &mut impl Write, label: &str, value: impl std::fmt::Display) -> io::Result<()> {
    writeln!(out, "  {label:<20} {value}")
}

pub fn payment_type_badge(payment_type: PaymentType) -> &'static str {
    match payment_type {
        PaymentType::Cash => "Cash",
        PaymentType::Credit => "Credit",
        PaymentType::Other => "Other",
    }
}

pub fn payment_status_badge(status: PaymentStatus) -> &'static str {
    match status {
        PaymentStatus::Paid => "Paid",
        PaymentStatus::Pending => "Pending",
        PaymentStatus::Other => "Other",
    }
}

/// Local date and time, e.g. `2024-03-09 14:05`.
pub fn date_time(at: Option<DateTime<Utc>>) -> String {
    at.map(|at| at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| EMPTY_CELL.to_string())
}

pub fn optional(value: Option<&str>) -> String {
    match value {
        Some(value) if !value.trim().is_empty() => value.to_string(),
        _ => EMPTY_CELL.to_string(),
    }
}
