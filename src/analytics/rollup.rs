use std::collections::HashMap;

use crate::analytics::metrics::{
    percentage_change, rank_top, round1, waste_percentage, COMPARISON_CLAMP,
};
use crate::analytics::models::{
    ConsumptionSummary, KitchenConsumption, PeriodComparison, WasteEvent, WasteReasonSummary,
};

/// Tenant-wide roll-up of the per-kitchen summaries
pub struct SummaryRollup;

impl SummaryRollup {
    /// Sum per-kitchen figures, compute the overall waste percentage and
    /// period comparison, and rank waste by stated reason
    ///
    /// `waste` is the tenant-wide disposal+expired event set; previous-period
    /// totals come from the previous window's consumption and recipe usage.
    pub fn roll_up(
        kitchens: &[KitchenConsumption],
        waste: &[WasteEvent],
        previous_consumed: f64,
        previous_wasted: f64,
    ) -> ConsumptionSummary {
        let total_consumed: f64 = kitchens.iter().map(|k| k.total_consumed).sum();
        let total_wasted: f64 = kitchens.iter().map(|k| k.total_wasted).sum();
        let total_cost: f64 = kitchens.iter().map(|k| k.total_cost).sum();
        let total_waste_cost: f64 = kitchens.iter().map(|k| k.waste_cost).sum();
        let potential_savings: f64 = kitchens.iter().map(|k| k.savings_opportunity).sum();

        let period_comparison = PeriodComparison {
            current_consumed: total_consumed,
            previous_consumed,
            percentage_change: round1(percentage_change(
                total_consumed,
                previous_consumed,
                COMPARISON_CLAMP,
            )),
            current_wasted: total_wasted,
            previous_wasted,
            waste_percentage_change: round1(percentage_change(
                total_wasted,
                previous_wasted,
                COMPARISON_CLAMP,
            )),
        };

        ConsumptionSummary {
            total_consumed,
            total_wasted,
            total_cost,
            total_waste_cost,
            potential_savings,
            overall_waste_percentage: waste_percentage(total_consumed, total_wasted),
            period_comparison,
            top_waste_reasons: top_waste_reasons(waste),
        }
    }
}

/// Group disposal+expired events by reason, summing quantity and cost;
/// each reason is expressed as a share of total waste quantity and the
/// list is sorted descending by that share
fn top_waste_reasons(waste: &[WasteEvent]) -> Vec<WasteReasonSummary> {
    let total_quantity: f64 = waste.iter().map(|e| e.quantity).sum();

    let mut index: HashMap<String, usize> = HashMap::new();
    let mut reasons: Vec<WasteReasonSummary> = Vec::new();

    for event in waste {
        match index.get(&event.reason) {
            Some(&position) => {
                reasons[position].quantity += event.quantity;
                reasons[position].cost += event.cost;
            }
            None => {
                index.insert(event.reason.clone(), reasons.len());
                reasons.push(WasteReasonSummary {
                    reason: event.reason.clone(),
                    quantity: event.quantity,
                    cost: event.cost,
                    percentage: 0.0,
                });
            }
        }
    }

    for reason in &mut reasons {
        reason.percentage = if total_quantity == 0.0 {
            0.0
        } else {
            round1(reason.quantity / total_quantity * 100.0)
        };
    }

    // Every reason in the window is reported; only the order is ranked
    let count = reasons.len();
    rank_top(reasons, count, |reason| reason.percentage)
}
