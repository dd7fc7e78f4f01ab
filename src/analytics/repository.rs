use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::analytics::error::AnalyticsError;
use crate::analytics::models::{
    ConsumptionRow, DisposalRow, ExpiringSupplyRow, Kitchen, RecipeUsageRow,
};
use crate::auth::models::UserProfile;

/// Row-level scope applied to every event query
///
/// `Unrestricted` for elevated callers; `OwnRows` filters each query to
/// rows recorded by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowScope {
    Unrestricted,
    OwnRows(i32),
}

impl RowScope {
    fn user_filter(&self) -> Option<i32> {
        match self {
            RowScope::Unrestricted => None,
            RowScope::OwnRows(user_id) => Some(*user_id),
        }
    }
}

/// Repository for the read-only analytics queries
#[derive(Clone)]
pub struct AnalyticsRepository {
    pool: PgPool,
}

impl AnalyticsRepository {
    /// Create a new AnalyticsRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Stable, id-ordered kitchen set for a tenant
    pub async fn list_kitchens(&self, tenant_id: Uuid) -> Result<Vec<Kitchen>, AnalyticsError> {
        let kitchens = sqlx::query_as::<_, Kitchen>(
            r#"
            SELECT id, name
            FROM kitchens
            WHERE tenant_id = $1
            ORDER BY id
            "#,
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(kitchens)
    }

    /// Ingredient consumption events inside the window
    pub async fn fetch_consumption(
        &self,
        tenant_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        scope: &RowScope,
    ) -> Result<Vec<ConsumptionRow>, AnalyticsError> {
        let rows = sqlx::query_as::<_, ConsumptionRow>(
            r#"
            SELECT fc.date, fc.kitchen_id, fc.quantity, fc.user_id,
                   fs.name AS supply_name, fs.unit AS supply_unit, fs.price_per_unit
            FROM food_consumptions fc
            LEFT JOIN food_supplies fs ON fs.id = fc.food_supply_id
            WHERE fc.tenant_id = $1
              AND fc.date >= $2 AND fc.date < $3
              AND ($4::int4 IS NULL OR fc.user_id = $4)
            ORDER BY fc.date
            "#,
        )
        .bind(tenant_id)
        .bind(start)
        .bind(end)
        .bind(scope.user_filter())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Recipe and subrecipe preparation events inside the window
    pub async fn fetch_recipe_usage(
        &self,
        tenant_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        scope: &RowScope,
    ) -> Result<Vec<RecipeUsageRow>, AnalyticsError> {
        let rows = sqlx::query_as::<_, RecipeUsageRow>(
            r#"
            SELECT ru.created_at, ru.kitchen_id, ru.user_id,
                   r.name AS recipe_name, r.is_subrecipe,
                   ru.servings_used, ru.cost, ru.selling_price, ru.waste, ru.profit
            FROM recipe_usages ru
            LEFT JOIN recipes r ON r.id = ru.recipe_id
            WHERE ru.tenant_id = $1
              AND ru.created_at >= $2 AND ru.created_at < $3
              AND ($4::int4 IS NULL OR ru.user_id = $4)
            ORDER BY ru.created_at
            "#,
        )
        .bind(tenant_id)
        .bind(start)
        .bind(end)
        .bind(scope.user_filter())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Explicit disposal events inside the window
    pub async fn fetch_disposals(
        &self,
        tenant_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        scope: &RowScope,
    ) -> Result<Vec<DisposalRow>, AnalyticsError> {
        let rows = sqlx::query_as::<_, DisposalRow>(
            r#"
            SELECT fd.created_at, fd.kitchen_id, fd.quantity, fd.user_id, fd.reason,
                   fs.name AS supply_name, fs.unit AS supply_unit, fs.price_per_unit
            FROM food_disposals fd
            LEFT JOIN food_supplies fs ON fs.id = fd.food_supply_id
            WHERE fd.tenant_id = $1
              AND fd.created_at >= $2 AND fd.created_at < $3
              AND ($4::int4 IS NULL OR fd.user_id = $4)
            ORDER BY fd.created_at
            "#,
        )
        .bind(tenant_id)
        .bind(start)
        .bind(end)
        .bind(scope.user_filter())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Supplies expiring inside the window, treated as implicit waste
    ///
    /// Supplies are kitchen-owned, not user-owned, so no row scope applies.
    pub async fn fetch_expiring_supplies(
        &self,
        tenant_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ExpiringSupplyRow>, AnalyticsError> {
        let rows = sqlx::query_as::<_, ExpiringSupplyRow>(
            r#"
            SELECT expiration_date, kitchen_id, name, unit, quantity, price_per_unit
            FROM food_supplies
            WHERE tenant_id = $1
              AND expiration_date IS NOT NULL
              AND expiration_date >= $2 AND expiration_date < $3
            ORDER BY expiration_date
            "#,
        )
        .bind(tenant_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// User profile row backing the elevated-privilege check
    pub async fn find_user_profile(
        &self,
        user_id: i32,
    ) -> Result<Option<UserProfile>, AnalyticsError> {
        let profile = sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT id, email, role, tenant_id
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    /// Page-level access grant for a user, absent rows meaning no grant
    pub async fn has_page_access(
        &self,
        user_id: i32,
        page_path: &str,
    ) -> Result<bool, AnalyticsError> {
        let allowed: Option<bool> = sqlx::query_scalar(
            r#"
            SELECT allowed
            FROM user_page_access
            WHERE user_id = $1 AND page_path = $2
            "#,
        )
        .bind(user_id)
        .bind(page_path)
        .fetch_optional(&self.pool)
        .await?;

        Ok(allowed.unwrap_or(false))
    }
}
