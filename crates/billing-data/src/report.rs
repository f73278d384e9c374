//! Chart series and summary cards shaped for the dashboard's charts tab.

use billing_core::formatting::{format_brl, format_kwh};
use serde::Serialize;

use crate::aggregator::{Aggregation, ChartPoint, RunningTotals};

/// One headline figure, already formatted for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatCard {
    pub title: &'static str,
    pub value: String,
}

/// The four summary cards shown under the charts.
pub fn stat_cards(totals: &RunningTotals) -> [StatCard; 4] {
    [
        StatCard {
            title: "Total de Energia Consumida",
            value: format_kwh(totals.total_consumption),
        },
        StatCard {
            title: "Energia Compensada",
            value: format_kwh(totals.total_compensated),
        },
        StatCard {
            title: "Valor Total sem GD",
            value: format_brl(totals.total_without_offset),
        },
        StatCard {
            title: "Economia GD",
            value: format_brl(totals.total_offset_savings),
        },
    ]
}

/// A named sequence of values sharing the chart's x-axis labels.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
    /// Field name in [`ChartPoint`] the values come from.
    pub key: &'static str,
    /// Legend text.
    pub label: &'static str,
    pub values: Vec<f64>,
}

/// A chart ready for an external renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Chart {
    pub title: &'static str,
    pub description: &'static str,
    pub unit: &'static str,
    pub labels: Vec<String>,
    pub series: Vec<ChartSeries>,
}

fn series(
    points: &[ChartPoint],
    key: &'static str,
    label: &'static str,
    value: impl Fn(&ChartPoint) -> f64,
) -> ChartSeries {
    ChartSeries {
        key,
        label,
        values: points.iter().map(value).collect(),
    }
}

fn labels(points: &[ChartPoint]) -> Vec<String> {
    points.iter().map(|p| p.label.clone()).collect()
}

/// Consumption against compensated energy, in kWh.
pub fn energy_chart(points: &[ChartPoint]) -> Chart {
    Chart {
        title: "Resultados de Energia (kWh)",
        description: "Consumo vs. Energia Compensada",
        unit: "kWh",
        labels: labels(points),
        series: vec![
            series(points, "consumption", "Consumo", |p| p.consumption),
            series(points, "compensated", "Compensada", |p| p.compensated),
        ],
    }
}

/// Cost without the offset against the offset savings, in R$.
pub fn financial_chart(points: &[ChartPoint]) -> Chart {
    Chart {
        title: "Resultados Financeiros (R$)",
        description: "Valor Total sem GD vs. Economia GD",
        unit: "R$",
        labels: labels(points),
        series: vec![
            series(points, "totalWithoutOffset", "Sem GD", |p| {
                p.total_without_offset
            }),
            series(points, "offsetSavings", "Economia GD", |p| p.offset_savings),
        ],
    }
}

/// Everything the charts tab shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartsReport {
    pub energy: Chart,
    pub financial: Chart,
    pub totals: RunningTotals,
    pub stat_cards: [StatCard; 4],
}

impl From<&Aggregation> for ChartsReport {
    fn from(aggregation: &Aggregation) -> Self {
        ChartsReport {
            energy: energy_chart(&aggregation.points),
            financial: financial_chart(&aggregation.points),
            totals: aggregation.totals,
            stat_cards: stat_cards(&aggregation.totals),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(label: &str, consumption: f64, compensated: f64, without: f64, savings: f64) -> ChartPoint {
        ChartPoint {
            label: label.to_string(),
            consumption,
            compensated,
            total_without_offset: without,
            offset_savings: savings,
        }
    }

    fn sample_aggregation() -> Aggregation {
        let points = vec![
            point("2024-01-01", 120.0, 15.0, 62.0, 7.5),
            point("2024-02-01", 80.5, 40.0, 41.25, 20.0),
        ];
        let mut totals = RunningTotals::default();
        for p in &points {
            totals.add_point(p);
        }
        Aggregation { points, totals }
    }

    #[test]
    fn test_stat_cards_titles_and_values() {
        let cards = stat_cards(&sample_aggregation().totals);
        assert_eq!(cards[0].title, "Total de Energia Consumida");
        assert_eq!(cards[0].value, "200.50 kWh");
        assert_eq!(cards[1].title, "Energia Compensada");
        assert_eq!(cards[1].value, "55.00 kWh");
        assert_eq!(cards[2].title, "Valor Total sem GD");
        assert_eq!(cards[2].value, "R$ 103.25");
        assert_eq!(cards[3].title, "Economia GD");
        assert_eq!(cards[3].value, "R$ 27.50");
    }

    #[test]
    fn test_stat_cards_zero_totals() {
        let cards = stat_cards(&RunningTotals::default());
        assert_eq!(cards[0].value, "0.00 kWh");
        assert_eq!(cards[3].value, "R$ 0.00");
    }

    #[test]
    fn test_energy_chart_series() {
        let chart = energy_chart(&sample_aggregation().points);
        assert_eq!(chart.labels, vec!["2024-01-01", "2024-02-01"]);
        assert_eq!(chart.series.len(), 2);
        assert_eq!(chart.series[0].label, "Consumo");
        assert_eq!(chart.series[0].values, vec![120.0, 80.5]);
        assert_eq!(chart.series[1].label, "Compensada");
        assert_eq!(chart.series[1].values, vec![15.0, 40.0]);
    }

    #[test]
    fn test_financial_chart_series() {
        let chart = financial_chart(&sample_aggregation().points);
        assert_eq!(chart.unit, "R$");
        assert_eq!(chart.series[0].key, "totalWithoutOffset");
        assert_eq!(chart.series[0].values, vec![62.0, 41.25]);
        assert_eq!(chart.series[1].label, "Economia GD");
        assert_eq!(chart.series[1].values, vec![7.5, 20.0]);
    }

    #[test]
    fn test_charts_for_empty_aggregation() {
        let report = ChartsReport::from(&Aggregation::default());
        assert!(report.energy.labels.is_empty());
        assert!(report.financial.series.iter().all(|s| s.values.is_empty()));
    }

    #[test]
    fn test_charts_report_json_shape() {
        let report = ChartsReport::from(&sample_aggregation());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["energy"]["series"][0]["label"], "Consumo");
        assert_eq!(json["totals"]["totalConsumption"], 200.5);
        assert_eq!(json["statCards"][2]["value"], "R$ 103.25");
    }
}
