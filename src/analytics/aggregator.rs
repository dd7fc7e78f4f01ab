use chrono::{DateTime, Datelike, Duration, Utc};
use std::collections::HashMap;

use crate::analytics::metrics::{
    percentage_change, rank_top, round1, waste_percentage, TREND_CLAMP,
};
use crate::analytics::models::{
    BreakdownBucket, BreakdownItem, ConsumptionEvent, Kitchen, KitchenConsumption, RankedItem,
    RecipeEvent, WasteEvent,
};

/// Fixed fraction of recipe waste assumed recoverable
pub const SAVINGS_RECOVERY_RATIO: f64 = 0.75;

/// Default length of the top-consumed/top-wasted rankings
pub const DEFAULT_TOP_N: usize = 3;

/// Item type labels used in ranked lists
const ITEM_TYPE_INGREDIENT: &str = "ingredient";
const ITEM_TYPE_RECIPE: &str = "recipe";
const ITEM_TYPE_SUBRECIPE: &str = "subrecipe";

/// Knobs for a single aggregation run
#[derive(Debug, Clone)]
pub struct AggregationOptions {
    pub top_n: usize,
    pub include_breakdowns: bool,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
}

/// Pure per-kitchen aggregation over normalized event slices
///
/// Takes the full tenant-wide slices and filters to one kitchen, so a
/// kitchen with no rows in the window still yields an all-zero entry.
pub struct KitchenAggregator;

impl KitchenAggregator {
    pub fn aggregate(
        kitchen: &Kitchen,
        consumption: &[ConsumptionEvent],
        recipes: &[RecipeEvent],
        waste: &[WasteEvent],
        previous_consumption: &[ConsumptionEvent],
        options: &AggregationOptions,
    ) -> KitchenConsumption {
        let consumption: Vec<&ConsumptionEvent> = consumption
            .iter()
            .filter(|event| event.kitchen_id == kitchen.id)
            .collect();
        let recipes: Vec<&RecipeEvent> = recipes
            .iter()
            .filter(|event| event.kitchen_id == kitchen.id)
            .collect();
        let waste: Vec<&WasteEvent> = waste
            .iter()
            .filter(|event| event.kitchen_id == kitchen.id)
            .collect();

        let total_consumed: f64 = consumption.iter().map(|e| e.quantity).sum();
        let previous_consumed: f64 = previous_consumption
            .iter()
            .filter(|event| event.kitchen_id == kitchen.id)
            .map(|e| e.quantity)
            .sum();

        let total_recipe_cost: f64 = recipes.iter().map(|e| e.cost).sum();
        let total_recipe_revenue: f64 = recipes.iter().map(|e| e.revenue).sum();
        let total_recipe_waste: f64 = recipes.iter().map(|e| e.waste).sum();
        let total_recipe_profit: f64 = recipes.iter().map(|e| e.profit).sum();

        // Recipe-reported waste is authoritative for the headline figure;
        // disposal-based waste feeds the legacy rankings and cost fields.
        let total_wasted = total_recipe_waste;

        let consumption_cost: f64 = consumption
            .iter()
            .map(|e| e.quantity * e.price_per_unit)
            .sum();
        let waste_cost: f64 = waste.iter().map(|e| e.cost).sum();

        let (daily_breakdown, monthly_breakdown) = if options.include_breakdowns {
            (
                Some(daily_breakdown(
                    &consumption,
                    options.window_start,
                    options.window_end,
                )),
                Some(monthly_breakdown(&consumption, options.window_end)),
            )
        } else {
            (None, None)
        };

        KitchenConsumption {
            kitchen_id: kitchen.id,
            kitchen_name: kitchen.name.clone(),
            total_consumed,
            total_wasted,
            waste_percentage: waste_percentage(total_consumed, total_wasted),
            consumption_trend: round1(percentage_change(
                total_consumed,
                previous_consumed,
                TREND_CLAMP,
            )),
            total_recipe_cost,
            total_recipe_revenue,
            total_recipe_waste,
            total_recipe_profit,
            total_cost: consumption_cost + total_recipe_cost,
            waste_cost,
            savings_opportunity: total_recipe_waste * SAVINGS_RECOVERY_RATIO,
            most_consumed_items: most_consumed(&consumption, &recipes, options.top_n),
            most_wasted_items: most_wasted(&waste, options.top_n),
            daily_breakdown,
            monthly_breakdown,
        }
    }
}

/// Merge ingredient consumption and recipe usage into one ranked list
/// keyed by `(itemType, itemName)`, ranked by quantity
fn most_consumed(
    consumption: &[&ConsumptionEvent],
    recipes: &[&RecipeEvent],
    top_n: usize,
) -> Vec<RankedItem> {
    let mut index: HashMap<(String, String), usize> = HashMap::new();
    let mut items: Vec<RankedItem> = Vec::new();

    let mut merge = |item_type: &str, item_name: &str, unit: &str, quantity: f64, cost: f64| {
        let key = (item_type.to_string(), item_name.to_string());
        match index.get(&key) {
            Some(&position) => {
                items[position].quantity += quantity;
                items[position].cost += cost;
            }
            None => {
                index.insert(key, items.len());
                items.push(RankedItem {
                    item_type: item_type.to_string(),
                    item_name: item_name.to_string(),
                    unit: unit.to_string(),
                    quantity,
                    cost,
                });
            }
        }
    };

    for event in consumption {
        merge(
            ITEM_TYPE_INGREDIENT,
            &event.item_name,
            &event.unit,
            event.quantity,
            event.quantity * event.price_per_unit,
        );
    }
    for event in recipes {
        let item_type = if event.is_subrecipe {
            ITEM_TYPE_SUBRECIPE
        } else {
            ITEM_TYPE_RECIPE
        };
        merge(
            item_type,
            &event.recipe_name,
            "servings",
            event.servings_used,
            event.cost,
        );
    }

    rank_top(items, top_n, |item| item.quantity)
}

/// Legacy disposal-based ranking: disposal and expired rows by quantity
fn most_wasted(waste: &[&WasteEvent], top_n: usize) -> Vec<RankedItem> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut items: Vec<RankedItem> = Vec::new();

    for event in waste {
        match index.get(&event.item_name) {
            Some(&position) => {
                items[position].quantity += event.quantity;
                items[position].cost += event.cost;
            }
            None => {
                index.insert(event.item_name.clone(), items.len());
                items.push(RankedItem {
                    item_type: ITEM_TYPE_INGREDIENT.to_string(),
                    item_name: event.item_name.clone(),
                    unit: event.unit.clone(),
                    quantity: event.quantity,
                    cost: event.cost,
                });
            }
        }
    }

    rank_top(items, top_n, |item| item.quantity)
}

/// Distinct item names in encounter order
fn item_names(consumption: &[&ConsumptionEvent]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for event in consumption {
        if !names.iter().any(|name| name == &event.item_name) {
            names.push(event.item_name.clone());
        }
    }
    names
}

fn bucketize(names: &[String], quantities: &HashMap<(String, String), f64>, period: String) -> BreakdownBucket {
    let items = names
        .iter()
        .map(|name| BreakdownItem {
            item_name: name.clone(),
            quantity: *quantities
                .get(&(period.clone(), name.clone()))
                .unwrap_or(&0.0),
        })
        .collect();
    BreakdownBucket { period, items }
}

/// Dense per-day item matrix for every calendar day of the window
fn daily_breakdown(
    consumption: &[&ConsumptionEvent],
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> Vec<BreakdownBucket> {
    let names = item_names(consumption);

    let mut quantities: HashMap<(String, String), f64> = HashMap::new();
    for event in consumption {
        let day = event.date.date_naive().format("%Y-%m-%d").to_string();
        *quantities
            .entry((day, event.item_name.clone()))
            .or_insert(0.0) += event.quantity;
    }

    let mut buckets = Vec::new();
    let mut day = window_start.date_naive();
    let last = window_end.date_naive();
    while day <= last {
        let period = day.format("%Y-%m-%d").to_string();
        buckets.push(bucketize(&names, &quantities, period));
        day += Duration::days(1);
    }
    buckets
}

/// Dense per-month item matrix from January of the window-end year
/// through the window-end month
fn monthly_breakdown(
    consumption: &[&ConsumptionEvent],
    window_end: DateTime<Utc>,
) -> Vec<BreakdownBucket> {
    let names = item_names(consumption);

    let mut quantities: HashMap<(String, String), f64> = HashMap::new();
    for event in consumption {
        let month = event.date.format("%Y-%m").to_string();
        *quantities
            .entry((month, event.item_name.clone()))
            .or_insert(0.0) += event.quantity;
    }

    (1..=window_end.month())
        .map(|month| {
            let period = format!("{:04}-{:02}", window_end.year(), month);
            bucketize(&names, &quantities, period)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn kitchen() -> Kitchen {
        Kitchen {
            id: 1,
            name: "Main Kitchen".to_string(),
        }
    }

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap()
    }

    fn options() -> AggregationOptions {
        AggregationOptions {
            top_n: DEFAULT_TOP_N,
            include_breakdowns: false,
            window_start: at(1),
            window_end: at(8),
        }
    }

    fn consumption(kitchen_id: i32, name: &str, quantity: f64, price: f64) -> ConsumptionEvent {
        ConsumptionEvent {
            date: at(2),
            kitchen_id,
            item_name: name.to_string(),
            unit: "kg".to_string(),
            quantity,
            price_per_unit: price,
        }
    }

    fn recipe(kitchen_id: i32, name: &str, servings: f64, waste: f64) -> RecipeEvent {
        RecipeEvent {
            date: at(3),
            kitchen_id,
            recipe_name: name.to_string(),
            is_subrecipe: false,
            servings_used: servings,
            cost: 10.0,
            revenue: 25.0,
            waste,
            profit: 15.0,
        }
    }

    fn waste(kitchen_id: i32, name: &str, quantity: f64, reason: &str) -> WasteEvent {
        WasteEvent {
            date: at(4),
            kitchen_id,
            item_name: name.to_string(),
            unit: "kg".to_string(),
            quantity,
            cost: quantity * 2.0,
            reason: reason.to_string(),
        }
    }

    // Scenario A: no rows in the window => all-zero metrics, entry present
    #[test]
    fn test_empty_kitchen_yields_zero_metrics() {
        let result = KitchenAggregator::aggregate(&kitchen(), &[], &[], &[], &[], &options());

        assert_eq!(result.kitchen_id, 1);
        assert_eq!(result.total_consumed, 0.0);
        assert_eq!(result.total_wasted, 0.0);
        assert_eq!(result.waste_percentage, 0.0);
        assert_eq!(result.consumption_trend, 0.0);
        assert_eq!(result.total_cost, 0.0);
        assert_eq!(result.savings_opportunity, 0.0);
        assert!(result.most_consumed_items.is_empty());
        assert!(result.most_wasted_items.is_empty());
    }

    // Scenario C: recipe waste 20 against consumption 80 => 20%
    #[test]
    fn test_waste_percentage_from_recipe_waste() {
        let consumed = vec![consumption(1, "Flour", 80.0, 0.5)];
        let recipes = vec![recipe(1, "Bread", 10.0, 20.0)];

        let result =
            KitchenAggregator::aggregate(&kitchen(), &consumed, &recipes, &[], &[], &options());

        assert_eq!(result.total_consumed, 80.0);
        assert_eq!(result.total_wasted, 20.0);
        assert_eq!(result.waste_percentage, 20.0);
        assert_eq!(result.savings_opportunity, 15.0);
    }

    // Scenario B: previous period 0, current 50 => trend exactly 100
    #[test]
    fn test_trend_previous_zero() {
        let consumed = vec![consumption(1, "Flour", 50.0, 0.5)];

        let result =
            KitchenAggregator::aggregate(&kitchen(), &consumed, &[], &[], &[], &options());

        assert_eq!(result.consumption_trend, 100.0);
    }

    #[test]
    fn test_trend_against_own_previous_period() {
        let consumed = vec![consumption(1, "Flour", 150.0, 0.5)];
        let previous = vec![
            consumption(1, "Flour", 100.0, 0.5),
            // Other kitchens' rows must not leak into this kitchen's trend
            consumption(2, "Flour", 400.0, 0.5),
        ];

        let result =
            KitchenAggregator::aggregate(&kitchen(), &consumed, &[], &[], &previous, &options());

        assert_eq!(result.consumption_trend, 50.0);
    }

    #[test]
    fn test_trend_is_clamped_and_rounded() {
        let consumed = vec![consumption(1, "Flour", 1000.0, 0.5)];
        let previous = vec![consumption(1, "Flour", 1.0, 0.5)];

        let result =
            KitchenAggregator::aggregate(&kitchen(), &consumed, &[], &[], &previous, &options());

        assert_eq!(result.consumption_trend, 200.0);
    }

    #[test]
    fn test_most_consumed_merges_ingredients_and_recipes() {
        let consumed = vec![
            consumption(1, "Flour", 10.0, 0.5),
            consumption(1, "Flour", 5.0, 0.5),
            consumption(1, "Milk", 8.0, 1.0),
        ];
        let recipes = vec![recipe(1, "Bread", 12.0, 0.0)];

        let result =
            KitchenAggregator::aggregate(&kitchen(), &consumed, &recipes, &[], &[], &options());

        let top = &result.most_consumed_items;
        assert_eq!(top.len(), 3);
        assert_eq!(top[0].item_name, "Flour");
        assert_eq!(top[0].item_type, "ingredient");
        assert_eq!(top[0].quantity, 15.0);
        assert_eq!(top[1].item_name, "Bread");
        assert_eq!(top[1].item_type, "recipe");
        assert_eq!(top[2].item_name, "Milk");
    }

    #[test]
    fn test_same_name_different_type_kept_separate() {
        let consumed = vec![consumption(1, "Pesto", 4.0, 2.0)];
        let mut pesto = recipe(1, "Pesto", 4.0, 0.0);
        pesto.is_subrecipe = true;

        let result =
            KitchenAggregator::aggregate(&kitchen(), &consumed, &[pesto], &[], &[], &options());

        assert_eq!(result.most_consumed_items.len(), 2);
        let types: Vec<&str> = result
            .most_consumed_items
            .iter()
            .map(|i| i.item_type.as_str())
            .collect();
        assert!(types.contains(&"ingredient"));
        assert!(types.contains(&"subrecipe"));
    }

    #[test]
    fn test_most_wasted_ranks_disposals_by_quantity() {
        let wasted = vec![
            waste(1, "Tomatoes", 3.0, "spoiled"),
            waste(1, "Milk", 9.0, "expired"),
            waste(1, "Tomatoes", 4.0, "overproduction"),
        ];

        let result =
            KitchenAggregator::aggregate(&kitchen(), &[], &[], &wasted, &[], &options());

        let top = &result.most_wasted_items;
        assert_eq!(top[0].item_name, "Milk");
        assert_eq!(top[0].quantity, 9.0);
        assert_eq!(top[1].item_name, "Tomatoes");
        assert_eq!(top[1].quantity, 7.0);
        // Legacy waste does not move the headline figure
        assert_eq!(result.total_wasted, 0.0);
        assert_eq!(result.waste_cost, 32.0);
    }

    #[test]
    fn test_top_n_is_respected() {
        let consumed = vec![
            consumption(1, "A", 5.0, 0.0),
            consumption(1, "B", 4.0, 0.0),
            consumption(1, "C", 3.0, 0.0),
            consumption(1, "D", 2.0, 0.0),
        ];
        let mut opts = options();
        opts.top_n = 2;

        let result = KitchenAggregator::aggregate(&kitchen(), &consumed, &[], &[], &[], &opts);
        assert_eq!(result.most_consumed_items.len(), 2);
    }

    #[test]
    fn test_total_cost_combines_ingredients_and_recipes() {
        let consumed = vec![consumption(1, "Flour", 10.0, 0.5)];
        let recipes = vec![recipe(1, "Bread", 10.0, 0.0)];

        let result =
            KitchenAggregator::aggregate(&kitchen(), &consumed, &recipes, &[], &[], &options());

        // 10 * 0.5 ingredient cost + 10.0 recipe cost
        assert_eq!(result.total_cost, 15.0);
        assert_eq!(result.total_recipe_revenue, 25.0);
        assert_eq!(result.total_recipe_profit, 15.0);
    }

    #[test]
    fn test_daily_breakdown_is_dense_and_zero_filled() {
        let consumed = vec![
            consumption(1, "Flour", 10.0, 0.5), // dated day 2
            consumption(1, "Milk", 4.0, 1.0),
        ];
        let mut opts = options();
        opts.include_breakdowns = true;

        let result = KitchenAggregator::aggregate(&kitchen(), &consumed, &[], &[], &[], &opts);
        let daily = result.daily_breakdown.unwrap();

        // 8 calendar days in the window, every bucket lists every item
        assert_eq!(daily.len(), 8);
        for bucket in &daily {
            assert_eq!(bucket.items.len(), 2);
        }
        assert_eq!(daily[0].period, "2024-03-01");
        assert_eq!(daily[0].items[0].quantity, 0.0);
        assert_eq!(daily[1].period, "2024-03-02");
        assert_eq!(daily[1].items[0].quantity, 10.0);
        assert_eq!(daily[1].items[1].quantity, 4.0);
    }

    #[test]
    fn test_monthly_breakdown_runs_from_january() {
        let consumed = vec![consumption(1, "Flour", 10.0, 0.5)];
        let mut opts = options();
        opts.include_breakdowns = true;

        let result = KitchenAggregator::aggregate(&kitchen(), &consumed, &[], &[], &[], &opts);
        let monthly = result.monthly_breakdown.unwrap();

        assert_eq!(monthly.len(), 3); // window ends in March
        assert_eq!(monthly[0].period, "2024-01");
        assert_eq!(monthly[2].period, "2024-03");
        assert_eq!(monthly[0].items[0].quantity, 0.0);
        assert_eq!(monthly[2].items[0].quantity, 10.0);
    }

    #[test]
    fn test_breakdowns_absent_by_default() {
        let result = KitchenAggregator::aggregate(&kitchen(), &[], &[], &[], &[], &options());
        assert!(result.daily_breakdown.is_none());
        assert!(result.monthly_breakdown.is_none());
    }

    // Idempotence: same inputs, identical output figures
    #[test]
    fn test_aggregation_is_deterministic() {
        let consumed = vec![
            consumption(1, "Flour", 10.0, 0.5),
            consumption(1, "Milk", 4.0, 1.0),
        ];
        let recipes = vec![recipe(1, "Bread", 10.0, 5.0)];
        let wasted = vec![waste(1, "Tomatoes", 3.0, "spoiled")];

        let first = KitchenAggregator::aggregate(
            &kitchen(),
            &consumed,
            &recipes,
            &wasted,
            &[],
            &options(),
        );
        let second = KitchenAggregator::aggregate(
            &kitchen(),
            &consumed,
            &recipes,
            &wasted,
            &[],
            &options(),
        );

        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
