use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Fallback item name applied when a joined supply or recipe row is missing
pub const UNKNOWN_ITEM: &str = "Unknown";

/// Reason code attached to supplies that expired inside the reporting window
pub const EXPIRED_REASON: &str = "expired";

/// Reason code applied to disposal rows recorded without a reason
pub const UNSPECIFIED_REASON: &str = "unspecified";

/// Kitchen row, the grouping key for all aggregation
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Kitchen {
    pub id: i32,
    pub name: String,
}

/// Raw ingredient consumption row as fetched from the store
///
/// The supply fields come from a LEFT JOIN and are therefore nullable;
/// they collapse to defaults in a single normalization step.
#[derive(Debug, Clone, FromRow)]
pub struct ConsumptionRow {
    pub date: DateTime<Utc>,
    pub kitchen_id: i32,
    pub quantity: Decimal,
    pub user_id: i32,
    pub supply_name: Option<String>,
    pub supply_unit: Option<String>,
    pub price_per_unit: Option<Decimal>,
}

/// Raw recipe usage row; carries its own waste and financial fields
#[derive(Debug, Clone, FromRow)]
pub struct RecipeUsageRow {
    pub created_at: DateTime<Utc>,
    pub kitchen_id: i32,
    pub user_id: i32,
    pub recipe_name: Option<String>,
    pub is_subrecipe: Option<bool>,
    pub servings_used: Option<Decimal>,
    pub cost: Option<Decimal>,
    pub selling_price: Option<Decimal>,
    pub waste: Option<Decimal>,
    pub profit: Option<Decimal>,
}

/// Raw explicit disposal row
#[derive(Debug, Clone, FromRow)]
pub struct DisposalRow {
    pub created_at: DateTime<Utc>,
    pub kitchen_id: i32,
    pub quantity: Decimal,
    pub user_id: i32,
    pub reason: Option<String>,
    pub supply_name: Option<String>,
    pub supply_unit: Option<String>,
    pub price_per_unit: Option<Decimal>,
}

/// Supply row whose expiration date falls inside the reporting window
#[derive(Debug, Clone, FromRow)]
pub struct ExpiringSupplyRow {
    pub expiration_date: DateTime<Utc>,
    pub kitchen_id: i32,
    pub name: String,
    pub unit: String,
    pub quantity: Decimal,
    pub price_per_unit: Decimal,
}

/// Normalized ingredient consumption event, ready for aggregation
#[derive(Debug, Clone)]
pub struct ConsumptionEvent {
    pub date: DateTime<Utc>,
    pub kitchen_id: i32,
    pub item_name: String,
    pub unit: String,
    pub quantity: f64,
    pub price_per_unit: f64,
}

/// Normalized recipe usage event
#[derive(Debug, Clone)]
pub struct RecipeEvent {
    pub date: DateTime<Utc>,
    pub kitchen_id: i32,
    pub recipe_name: String,
    pub is_subrecipe: bool,
    pub servings_used: f64,
    pub cost: f64,
    pub revenue: f64,
    pub waste: f64,
    pub profit: f64,
}

/// Normalized waste event (explicit disposal or expired supply)
#[derive(Debug, Clone)]
pub struct WasteEvent {
    pub date: DateTime<Utc>,
    pub kitchen_id: i32,
    pub item_name: String,
    pub unit: String,
    pub quantity: f64,
    pub cost: f64,
    pub reason: String,
}

fn decimal_to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

fn optional_decimal(value: Option<Decimal>) -> f64 {
    value.map(decimal_to_f64).unwrap_or(0.0)
}

impl ConsumptionRow {
    /// Collapse nullable joined fields into explicit defaults
    pub fn normalize(self) -> ConsumptionEvent {
        ConsumptionEvent {
            date: self.date,
            kitchen_id: self.kitchen_id,
            item_name: self.supply_name.unwrap_or_else(|| UNKNOWN_ITEM.to_string()),
            unit: self.supply_unit.unwrap_or_default(),
            quantity: decimal_to_f64(self.quantity),
            price_per_unit: optional_decimal(self.price_per_unit),
        }
    }
}

impl RecipeUsageRow {
    pub fn normalize(self) -> RecipeEvent {
        RecipeEvent {
            date: self.created_at,
            kitchen_id: self.kitchen_id,
            recipe_name: self.recipe_name.unwrap_or_else(|| UNKNOWN_ITEM.to_string()),
            is_subrecipe: self.is_subrecipe.unwrap_or(false),
            servings_used: optional_decimal(self.servings_used),
            cost: optional_decimal(self.cost),
            revenue: optional_decimal(self.selling_price),
            waste: optional_decimal(self.waste),
            profit: optional_decimal(self.profit),
        }
    }
}

impl DisposalRow {
    pub fn normalize(self) -> WasteEvent {
        let quantity = decimal_to_f64(self.quantity);
        let price = optional_decimal(self.price_per_unit);
        WasteEvent {
            date: self.created_at,
            kitchen_id: self.kitchen_id,
            item_name: self.supply_name.unwrap_or_else(|| UNKNOWN_ITEM.to_string()),
            unit: self.supply_unit.unwrap_or_default(),
            quantity,
            cost: quantity * price,
            reason: self
                .reason
                .filter(|r| !r.is_empty())
                .unwrap_or_else(|| UNSPECIFIED_REASON.to_string()),
        }
    }
}

impl ExpiringSupplyRow {
    /// Expired supplies are folded into waste with a fixed reason code
    pub fn normalize(self) -> WasteEvent {
        let quantity = decimal_to_f64(self.quantity);
        let price = decimal_to_f64(self.price_per_unit);
        WasteEvent {
            date: self.expiration_date,
            kitchen_id: self.kitchen_id,
            item_name: self.name,
            unit: self.unit,
            quantity,
            cost: quantity * price,
            reason: EXPIRED_REASON.to_string(),
        }
    }
}

/// One entry in a top-consumed or top-wasted ranking
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RankedItem {
    pub item_type: String,
    pub item_name: String,
    pub unit: String,
    pub quantity: f64,
    pub cost: f64,
}

/// One item's quantity within a breakdown bucket
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownItem {
    pub item_name: String,
    pub quantity: f64,
}

/// One calendar period (day or month) of a dense breakdown series
///
/// Every item appears in every bucket; absent combinations are explicit
/// zeros so charts always receive a gap-free series.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownBucket {
    pub period: String,
    pub items: Vec<BreakdownItem>,
}

/// Per-kitchen summary produced by the aggregator
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KitchenConsumption {
    pub kitchen_id: i32,
    pub kitchen_name: String,
    pub total_consumed: f64,
    pub total_wasted: f64,
    pub waste_percentage: f64,
    pub consumption_trend: f64,
    pub total_recipe_cost: f64,
    pub total_recipe_revenue: f64,
    pub total_recipe_waste: f64,
    pub total_recipe_profit: f64,
    pub total_cost: f64,
    pub waste_cost: f64,
    pub savings_opportunity: f64,
    pub most_consumed_items: Vec<RankedItem>,
    pub most_wasted_items: Vec<RankedItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_breakdown: Option<Vec<BreakdownBucket>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_breakdown: Option<Vec<BreakdownBucket>>,
}

/// Current vs. previous period figures for the tenant-wide summary
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PeriodComparison {
    pub current_consumed: f64,
    pub previous_consumed: f64,
    pub percentage_change: f64,
    pub current_wasted: f64,
    pub previous_wasted: f64,
    pub waste_percentage_change: f64,
}

/// Waste grouped by stated reason, as a share of total waste quantity
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WasteReasonSummary {
    pub reason: String,
    pub quantity: f64,
    pub cost: f64,
    pub percentage: f64,
}

/// Tenant-wide roll-up of the per-kitchen summaries
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionSummary {
    pub total_consumed: f64,
    pub total_wasted: f64,
    pub total_cost: f64,
    pub total_waste_cost: f64,
    pub potential_savings: f64,
    pub overall_waste_percentage: f64,
    pub period_comparison: PeriodComparison,
    pub top_waste_reasons: Vec<WasteReasonSummary>,
}

/// Echoed reporting window, ISO-8601
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetadata {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub generated_at: DateTime<Utc>,
}

/// Full response body of the consumption report endpoint
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionReport {
    pub kitchens: Vec<KitchenConsumption>,
    pub summary: ConsumptionSummary,
    pub metadata: ReportMetadata,
}

/// Query parameters of the consumption report endpoint
///
/// `days` is parsed leniently: non-numeric or non-positive values fall
/// back to the default window instead of failing the request.
#[derive(Debug, Clone, Default, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ReportQuery {
    pub days: Option<String>,
    #[validate(range(min = 1, max = 10, message = "top must be between 1 and 10"))]
    pub top: Option<u32>,
    pub include_breakdowns: Option<bool>,
}
