use chrono::Utc;
use uuid::Uuid;

use crate::analytics::aggregator::{AggregationOptions, KitchenAggregator, DEFAULT_TOP_N};
use crate::analytics::error::AnalyticsError;
use crate::analytics::models::{
    ConsumptionEvent, ConsumptionReport, Kitchen, KitchenConsumption, RecipeEvent,
    ReportMetadata, ReportQuery, WasteEvent,
};
use crate::analytics::period::{resolve_days, ReportingPeriod};
use crate::analytics::repository::{AnalyticsRepository, RowScope};
use crate::analytics::rollup::SummaryRollup;
use crate::auth::middleware::AuthenticatedUser;
use crate::auth::models::UserProfile;

/// Page path consulted for the page-level access grant
pub const CONSUMPTION_REPORT_PAGE: &str = "/analytics/consumption";

/// Service for consumption & waste reporting
///
/// Identity and privilege are explicit parameters throughout; the service
/// holds no ambient request state, so the aggregation path stays pure and
/// independently testable.
#[derive(Clone)]
pub struct AnalyticsService {
    repo: AnalyticsRepository,
}

impl AnalyticsService {
    /// Create a new AnalyticsService
    pub fn new(repo: AnalyticsRepository) -> Self {
        Self { repo }
    }

    /// Decide row scoping for a caller
    ///
    /// Admins, managers, and users holding the page-level grant see every
    /// row; everyone else is restricted to rows they recorded themselves.
    async fn resolve_scope(
        &self,
        user_id: i32,
    ) -> Result<(UserProfile, RowScope), AnalyticsError> {
        let profile = self
            .repo
            .find_user_profile(user_id)
            .await?
            .ok_or(AnalyticsError::ProfileNotFound)?;

        let scope = if profile.role.is_elevated()
            || self
                .repo
                .has_page_access(user_id, CONSUMPTION_REPORT_PAGE)
                .await?
        {
            RowScope::Unrestricted
        } else {
            RowScope::OwnRows(user_id)
        };

        Ok((profile, scope))
    }

    /// Generate the full consumption & waste report
    ///
    /// Control flow is strictly linear: resolve scope and period, fan out
    /// the independent store queries, normalize, aggregate per kitchen,
    /// roll up, attach metadata. Any query error fails the whole request;
    /// no partial aggregation is ever returned.
    pub async fn consumption_report(
        &self,
        user: &AuthenticatedUser,
        query: &ReportQuery,
    ) -> Result<ConsumptionReport, AnalyticsError> {
        let (_profile, scope) = self.resolve_scope(user.user_id).await?;

        let days = resolve_days(query.days.as_deref());
        let period = ReportingPeriod::resolve(Utc::now(), days);
        let tenant_id = user.tenant_id;

        tracing::debug!(
            "Generating consumption report: tenant={}, days={}, scope={:?}",
            tenant_id,
            days,
            scope
        );

        let (
            kitchens,
            current_consumption,
            current_recipes,
            current_disposals,
            expiring_supplies,
            previous_consumption,
            previous_recipes,
        ) = tokio::try_join!(
            self.repo.list_kitchens(tenant_id),
            self.repo.fetch_consumption(
                tenant_id,
                period.current_start,
                period.current_end,
                &scope
            ),
            self.repo.fetch_recipe_usage(
                tenant_id,
                period.current_start,
                period.current_end,
                &scope
            ),
            self.repo.fetch_disposals(
                tenant_id,
                period.current_start,
                period.current_end,
                &scope
            ),
            self.repo
                .fetch_expiring_supplies(tenant_id, period.current_start, period.current_end),
            self.repo.fetch_consumption(
                tenant_id,
                period.previous_start,
                period.previous_end,
                &scope
            ),
            self.repo.fetch_recipe_usage(
                tenant_id,
                period.previous_start,
                period.previous_end,
                &scope
            ),
        )?;

        // Single normalization step: nullable joined fields collapse here
        let consumption: Vec<ConsumptionEvent> = current_consumption
            .into_iter()
            .map(|row| row.normalize())
            .collect();
        let recipes: Vec<RecipeEvent> = current_recipes
            .into_iter()
            .map(|row| row.normalize())
            .collect();
        let waste: Vec<WasteEvent> = current_disposals
            .into_iter()
            .map(|row| row.normalize())
            .chain(expiring_supplies.into_iter().map(|row| row.normalize()))
            .collect();
        let previous_consumption: Vec<ConsumptionEvent> = previous_consumption
            .into_iter()
            .map(|row| row.normalize())
            .collect();
        let previous_recipes: Vec<RecipeEvent> = previous_recipes
            .into_iter()
            .map(|row| row.normalize())
            .collect();

        let options = AggregationOptions {
            top_n: query.top.map(|n| n as usize).unwrap_or(DEFAULT_TOP_N),
            include_breakdowns: query.include_breakdowns.unwrap_or(false),
            window_start: period.current_start,
            window_end: period.current_end,
        };

        // Every stored kitchen appears exactly once, zero-filled if idle
        let kitchen_reports: Vec<KitchenConsumption> = kitchens
            .iter()
            .map(|kitchen| {
                KitchenAggregator::aggregate(
                    kitchen,
                    &consumption,
                    &recipes,
                    &waste,
                    &previous_consumption,
                    &options,
                )
            })
            .collect();

        let previous_consumed: f64 = previous_consumption.iter().map(|e| e.quantity).sum();
        let previous_wasted: f64 = previous_recipes.iter().map(|e| e.waste).sum();

        let summary =
            SummaryRollup::roll_up(&kitchen_reports, &waste, previous_consumed, previous_wasted);

        tracing::info!(
            "Consumption report generated: tenant={}, kitchens={}, window={}..{}",
            tenant_id,
            kitchen_reports.len(),
            period.current_start,
            period.current_end
        );

        Ok(ConsumptionReport {
            kitchens: kitchen_reports,
            summary,
            metadata: ReportMetadata {
                start_date: period.current_start,
                end_date: period.current_end,
                generated_at: Utc::now(),
            },
        })
    }

    /// The tenant's kitchen list, for the reporting UI
    pub async fn list_kitchens(&self, tenant_id: Uuid) -> Result<Vec<Kitchen>, AnalyticsError> {
        self.repo.list_kitchens(tenant_id).await
    }
}
