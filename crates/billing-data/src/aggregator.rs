//! Chart points and running totals derived from invoice records.
//!
//! A record contributes only when it carries both the "Energia Elétrica" and
//! the "Energia SCEE s/ ICMS" line items; any other record is skipped without
//! error. Points keep the input order, so callers wanting a chronological
//! chart must sort the records first.

use billing_core::error::{BillingError, Result};
use billing_core::models::InvoiceRecord;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

// ── ChartPoint ────────────────────────────────────────────────────────────────

/// Consumption and cost figures for a single invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    /// The invoice date, verbatim.
    pub label: String,
    /// Electric plus SCEE quantity, in kWh.
    pub consumption: f64,
    /// Compensated energy quantity, in kWh.
    pub compensated: f64,
    /// Electric plus SCEE totals plus the public-lighting contribution.
    pub total_without_offset: f64,
    /// Monetary value of the compensated energy.
    pub offset_savings: f64,
}

// ── RunningTotals ─────────────────────────────────────────────────────────────

/// Sums of every [`ChartPoint`] field across the emitted points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunningTotals {
    pub total_consumption: f64,
    pub total_compensated: f64,
    pub total_without_offset: f64,
    pub total_offset_savings: f64,
}

impl RunningTotals {
    /// Add a single point's figures to the running totals.
    pub fn add_point(&mut self, point: &ChartPoint) {
        self.total_consumption += point.consumption;
        self.total_compensated += point.compensated;
        self.total_without_offset += point.total_without_offset;
        self.total_offset_savings += point.offset_savings;
    }

    /// Name of the first total that is no longer finite.
    fn non_finite_field(&self) -> Option<&'static str> {
        [
            ("totalConsumption", self.total_consumption),
            ("totalCompensated", self.total_compensated),
            ("totalWithoutOffset", self.total_without_offset),
            ("totalOffsetSavings", self.total_offset_savings),
        ]
        .into_iter()
        .find_map(|(field, value)| (!value.is_finite()).then_some(field))
    }
}

/// Output of one aggregation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Aggregation {
    pub points: Vec<ChartPoint>,
    pub totals: RunningTotals,
}

impl Aggregation {
    /// Append `point`, refusing it if it would push a total out of range.
    fn push(&mut self, point: ChartPoint) -> Result<()> {
        let mut totals = self.totals;
        totals.add_point(&point);
        if let Some(field) = totals.non_finite_field() {
            return Err(BillingError::Overflow {
                field,
                date: point.label,
            });
        }
        self.totals = totals;
        self.points.push(point);
        Ok(())
    }
}

/// A record dropped by [`InvoiceAggregator::aggregate_skipping_invalid`].
#[derive(Debug)]
pub struct RejectedRecord {
    /// Position of the record in the input slice.
    pub index: usize,
    pub date: String,
    pub error: BillingError,
}

// ── InvoiceAggregator ─────────────────────────────────────────────────────────

/// Stateless helper turning invoice records into chart data.
pub struct InvoiceAggregator;

impl InvoiceAggregator {
    /// Build the chart point for one record.
    ///
    /// Returns `Ok(None)` when either energy line item is missing. Once both
    /// are present, every numeric field must parse and the compensated-energy
    /// and public-lighting sections must exist; otherwise an error is
    /// returned.
    pub fn chart_point(record: &InvoiceRecord) -> Result<Option<ChartPoint>> {
        let Some((electric, scee)) = record.energy_items() else {
            return Ok(None);
        };

        let compensated_energy =
            record
                .compensated_energy
                .as_ref()
                .ok_or_else(|| BillingError::MissingField {
                    field: "compensatedEnergy",
                    date: record.date.clone(),
                })?;
        let lighting = record.public_lighting_contribution.as_ref().ok_or_else(|| {
            BillingError::MissingField {
                field: "publicLightingContribution",
                date: record.date.clone(),
            }
        })?;

        let consumption = electric.quantity.to_f64("Energia Elétrica.quantity")?
            + scee.quantity.to_f64("Energia SCEE s/ ICMS.quantity")?;
        let compensated = compensated_energy
            .quantity
            .to_f64("compensatedEnergy.quantity")?;
        let total_without_offset = electric.total_value.to_f64("Energia Elétrica.totalValue")?
            + scee.total_value.to_f64("Energia SCEE s/ ICMS.totalValue")?
            + lighting
                .total_value
                .to_f64("publicLightingContribution.totalValue")?;
        let offset_savings = compensated_energy
            .total_value
            .to_f64("compensatedEnergy.totalValue")?;

        let point = ChartPoint {
            label: record.date.clone(),
            consumption,
            compensated,
            total_without_offset,
            offset_savings,
        };
        // Finite inputs can still sum past f64::MAX.
        for (field, value) in [
            ("consumption", point.consumption),
            ("totalWithoutOffset", point.total_without_offset),
        ] {
            if !value.is_finite() {
                return Err(BillingError::Overflow {
                    field,
                    date: point.label,
                });
            }
        }

        Ok(Some(point))
    }

    /// Aggregate `records` into chart points and running totals.
    ///
    /// Points and totals come from the same pass, so the totals always equal
    /// the sums over the returned points. The first invalid record aborts
    /// the run with its error, as does a total that overflows `f64`.
    pub fn aggregate<'a, I>(records: I) -> Result<Aggregation>
    where
        I: IntoIterator<Item = &'a InvoiceRecord>,
    {
        let mut aggregation = Aggregation::default();
        let mut seen = 0usize;
        let mut skipped = 0usize;

        for record in records {
            seen += 1;
            match Self::chart_point(record)? {
                Some(point) => aggregation.push(point)?,
                None => skipped += 1,
            }
        }

        debug!(
            "Aggregated {} of {} invoices ({} without both energy items)",
            aggregation.points.len(),
            seen,
            skipped
        );

        Ok(aggregation)
    }

    /// Like [`aggregate`](Self::aggregate), but invalid records are dropped
    /// and reported instead of failing the run.
    pub fn aggregate_skipping_invalid<'a, I>(records: I) -> (Aggregation, Vec<RejectedRecord>)
    where
        I: IntoIterator<Item = &'a InvoiceRecord>,
    {
        let mut aggregation = Aggregation::default();
        let mut rejected = Vec::new();

        for (index, record) in records.into_iter().enumerate() {
            let outcome = match Self::chart_point(record) {
                Ok(Some(point)) => aggregation.push(point),
                Ok(None) => Ok(()),
                Err(error) => Err(error),
            };
            if let Err(error) = outcome {
                warn!("Dropping invoice #{} ({}): {}", index, record.date, error);
                rejected.push(RejectedRecord {
                    index,
                    date: record.date.clone(),
                    error,
                });
            }
        }

        (aggregation, rejected)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
