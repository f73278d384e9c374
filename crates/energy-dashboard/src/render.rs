//! Plain-text and JSON output for the list and charts tabs.

use std::fmt::Write as _;

use billing_core::formatting::{fit_width, format_brl, format_fixed, format_kwh};
use billing_core::models::InvoiceRecord;
use billing_data::aggregator::ChartPoint;
use billing_data::filter::FilterCriteria;
use billing_data::report::ChartsReport;
use serde::Serialize;

const CLIENT_WIDTH: usize = 14;
const NAME_WIDTH: usize = 28;
const DATE_WIDTH: usize = 12;
const FILE_WIDTH: usize = 28;

const LABEL_WIDTH: usize = 12;
const NUMBER_WIDTH: usize = 14;

/// Right-align `text` in a column `width` characters wide.
fn right(text: &str, width: usize) -> String {
    format!("{:>width$}", text, width = width)
}

// ── List tab ──────────────────────────────────────────────────────────────────

/// Table of the filtered invoices, one row per record.
pub fn render_list(rows: &[&InvoiceRecord], criteria: &FilterCriteria) -> String {
    let mut out = String::new();

    if !criteria.is_unconstrained() {
        let _ = writeln!(
            out,
            "Filtro: cliente contém {:?}, período {}",
            criteria.client_number_substring,
            criteria.period_key.label()
        );
    }

    let _ = writeln!(
        out,
        "{} {} {} {}",
        fit_width("Cliente", CLIENT_WIDTH),
        fit_width("Nome", NAME_WIDTH),
        fit_width("Data", DATE_WIDTH),
        fit_width("Arquivo", FILE_WIDTH)
    );
    let _ = writeln!(
        out,
        "{}",
        "-".repeat(CLIENT_WIDTH + NAME_WIDTH + DATE_WIDTH + FILE_WIDTH + 3)
    );

    if rows.is_empty() {
        let _ = writeln!(out, "Nenhuma fatura encontrada.");
        return out;
    }

    for invoice in rows {
        let line = format!(
            "{} {} {} {}",
            fit_width(&invoice.client_number, CLIENT_WIDTH),
            fit_width(&invoice.client_name, NAME_WIDTH),
            fit_width(&invoice.date, DATE_WIDTH),
            fit_width(&invoice.file_name, FILE_WIDTH)
        );
        let _ = writeln!(out, "{}", line.trim_end());
    }
    let _ = writeln!(out, "{} fatura(s)", rows.len());

    out
}

// ── Charts tab ────────────────────────────────────────────────────────────────

/// Per-invoice figures followed by the totals row and the summary cards.
pub fn render_charts(report: &ChartsReport, points: &[ChartPoint]) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{} {} {} {} {}",
        fit_width("Data", LABEL_WIDTH),
        right("Consumo kWh", NUMBER_WIDTH),
        right("Compens. kWh", NUMBER_WIDTH),
        right("Sem GD R$", NUMBER_WIDTH),
        right("Economia R$", NUMBER_WIDTH)
    );
    let _ = writeln!(out, "{}", "-".repeat(LABEL_WIDTH + 4 * (NUMBER_WIDTH + 1)));

    for point in points {
        let _ = writeln!(
            out,
            "{} {} {} {} {}",
            fit_width(&point.label, LABEL_WIDTH),
            right(&format_fixed(point.consumption, 2), NUMBER_WIDTH),
            right(&format_fixed(point.compensated, 2), NUMBER_WIDTH),
            right(&format_fixed(point.total_without_offset, 2), NUMBER_WIDTH),
            right(&format_fixed(point.offset_savings, 2), NUMBER_WIDTH)
        );
    }

    // Totals row.
    let totals = &report.totals;
    let _ = writeln!(
        out,
        "{} {} {} {} {}",
        fit_width("TOTAL", LABEL_WIDTH),
        right(&format_fixed(totals.total_consumption, 2), NUMBER_WIDTH),
        right(&format_fixed(totals.total_compensated, 2), NUMBER_WIDTH),
        right(&format_fixed(totals.total_without_offset, 2), NUMBER_WIDTH),
        right(&format_fixed(totals.total_offset_savings, 2), NUMBER_WIDTH)
    );
    out.push('\n');

    for card in &report.stat_cards {
        let _ = writeln!(out, "{}: {}", card.title, card.value);
    }

    out
}

/// One-line summary of the totals, used in log output.
pub fn totals_summary(report: &ChartsReport) -> String {
    format!(
        "{} consumed, {} compensated, {} saved",
        format_kwh(report.totals.total_consumption),
        format_kwh(report.totals.total_compensated),
        format_brl(report.totals.total_offset_savings)
    )
}

// ── JSON ──────────────────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ListOutput<'a> {
    criteria: &'a FilterCriteria,
    count: usize,
    invoices: &'a [&'a InvoiceRecord],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ChartsOutput<'a> {
    points: &'a [ChartPoint],
    #[serde(flatten)]
    report: &'a ChartsReport,
}

/// Filtered listing as pretty JSON, using the listing's own field names.
pub fn list_json(rows: &[&InvoiceRecord], criteria: &FilterCriteria) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&ListOutput {
        criteria,
        count: rows.len(),
        invoices: rows,
    })
}

/// Chart points plus the charts report as pretty JSON.
pub fn charts_json(report: &ChartsReport, points: &[ChartPoint]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&ChartsOutput { points, report })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
