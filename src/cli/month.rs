use anyhow::{Context, Result, bail};
use comfy_table::Cell;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use super::ui;
use crate::core::{DatedRate, RateStore};

/// Renders a month of rates with day-over-day change and the month range.
pub fn display_as_table(from: &str, to: &str, rates: &[DatedRate]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Date"),
        ui::header_cell(&format!("{from}/{to}")),
        ui::header_cell("Change"),
    ]);

    let mut previous: Option<Decimal> = None;
    for dated in rates {
        let change = previous
            .and_then(|prev| (dated.rate - prev).checked_div(prev))
            .and_then(|ratio| (ratio * Decimal::ONE_HUNDRED).to_f64());
        table.add_row(vec![
            Cell::new(dated.date.format("%Y-%m-%d")),
            ui::number_cell(dated.rate),
            ui::change_cell(change),
        ]);
        previous = Some(dated.rate);
    }

    let mut output = format!(
        "{}\n\n",
        ui::style_text(&format!("{from} to {to} exchange rate"), ui::StyleType::Title)
    );
    output.push_str(&table.to_string());

    let low = rates.iter().map(|r| r.rate).min();
    let high = rates.iter().map(|r| r.rate).max();
    if let (Some(low), Some(high)) = (low, high) {
        output.push_str(&format!(
            "\n\n{} {}  {} {}  {}",
            ui::style_text("Low:", ui::StyleType::TotalLabel),
            ui::style_text(&low.to_string(), ui::StyleType::TotalValue),
            ui::style_text("High:", ui::StyleType::TotalLabel),
            ui::style_text(&high.to_string(), ui::StyleType::TotalValue),
            ui::style_text(&format!("({} days)", rates.len()), ui::StyleType::Subtle),
        ));
    }
    output
}

pub async fn month_report(
    store: &dyn RateStore,
    from: &str,
    to: &str,
    year: i32,
    month: u32,
) -> Result<String> {
    if !(1..=12).contains(&month) {
        bail!("month must be between 1 and 12, got {month}");
    }

    let spinner = ui::new_spinner(&format!("Fetching {from}/{to} rates for {year}-{month:02}"));
    let result = store.get_month_exchange_rates(from, to, year, month).await;
    spinner.finish_and_clear();

    let rates = result
        .with_context(|| format!("Failed to get {from} to {to} rates for {year}-{month:02}"))?;
    Ok(display_as_table(from, to, &rates))
}
