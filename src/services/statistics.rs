use crate::{
    db::DbPool,
    entities::{
        supply_item::{self, Entity as SupplyItem},
        supply_request::{self, Entity as SupplyRequest},
        usage_record::{self, Entity as UsageRecord},
        RequestStatus,
    },
    errors::ServiceError,
};
use chrono::{DateTime, Months, NaiveDate, NaiveTime, TimeZone, Utc};
use sea_orm::{
    sea_query::Expr, ColumnTrait, Condition, DatabaseConnection, EntityTrait, FromQueryResult,
    JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{instrument, warn};
use utoipa::{IntoParams, ToSchema};

/// Number of calendar months covered by the usage trend.
pub const MONTHLY_USAGE_WINDOW: u32 = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MonthlyUsage {
    /// Calendar month as `YYYY-MM`
    pub month: String,
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Statistics {
    pub total_supplies: u64,
    pub total_items: i64,
    pub low_stock_count: u64,
    pub pending_requests: u64,
    pub monthly_usage: Vec<MonthlyUsage>,
}

/// Usage record joined with the name of its supply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromQueryResult, ToSchema)]
pub struct UsageWithSupply {
    pub id: i32,
    pub supply_id: i32,
    pub supply_name: String,
    pub quantity_used: i32,
    pub used_by: String,
    pub department: String,
    pub purpose: Option<String>,
    pub used_at: DateTime<Utc>,
}

/// Typed filter for usage history. Every field is optional and the ones
/// present are combined with AND. Date bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageHistoryFilter {
    pub supply_id: Option<i32>,
    pub department: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl UsageHistoryFilter {
    pub fn to_condition(&self) -> Condition {
        let mut condition = Condition::all();
        if let Some(supply_id) = self.supply_id {
            condition = condition.add(usage_record::Column::SupplyId.eq(supply_id));
        }
        if let Some(department) = &self.department {
            condition = condition.add(usage_record::Column::Department.eq(department.as_str()));
        }
        if let Some(start) = self.start {
            condition = condition.add(usage_record::Column::UsedAt.gte(start));
        }
        if let Some(end) = self.end {
            condition = condition.add(usage_record::Column::UsedAt.lte(end));
        }
        condition
    }
}

/// Raw query-string form of [`UsageHistoryFilter`].
///
/// Dates accept RFC 3339 timestamps or plain `YYYY-MM-DD` days. A plain
/// `end_date` covers the whole day.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UsageHistoryQuery {
    pub supply_id: Option<i32>,
    pub department: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl TryFrom<UsageHistoryQuery> for UsageHistoryFilter {
    type Error = ServiceError;

    fn try_from(query: UsageHistoryQuery) -> Result<Self, Self::Error> {
        let start = non_empty(query.start_date)
            .map(|raw| parse_bound(&raw, NaiveTime::MIN))
            .transpose()?;
        let end = non_empty(query.end_date)
            .map(|raw| parse_bound(&raw, end_of_day()))
            .transpose()?;

        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(ServiceError::ValidationError(
                    "start_date must not be after end_date".to_string(),
                ));
            }
        }

        Ok(Self {
            supply_id: query.supply_id,
            department: non_empty(query.department),
            start,
            end,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999).unwrap_or(NaiveTime::MIN)
}

fn parse_bound(raw: &str, day_time: NaiveTime) -> Result<DateTime<Utc>, ServiceError> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|day| Utc.from_utc_datetime(&day.and_time(day_time)))
        .map_err(|_| {
            ServiceError::ValidationError(format!(
                "invalid date '{}', expected YYYY-MM-DD or RFC 3339",
                raw
            ))
        })
}

/// Start of the day `MONTHLY_USAGE_WINDOW` calendar months before `now`.
pub fn monthly_window_start(now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let day = now
        .date_naive()
        .checked_sub_months(Months::new(MONTHLY_USAGE_WINDOW))?;
    Some(Utc.from_utc_datetime(&day.and_time(NaiveTime::MIN)))
}

/// Sums `(used_at, quantity)` pairs per calendar month, ascending.
pub fn bucket_by_month<I>(rows: I) -> Vec<MonthlyUsage>
where
    I: IntoIterator<Item = (DateTime<Utc>, i32)>,
{
    let mut months: BTreeMap<String, i64> = BTreeMap::new();
    for (used_at, quantity) in rows {
        *months.entry(used_at.format("%Y-%m").to_string()).or_default() += i64::from(quantity);
    }
    months
        .into_iter()
        .map(|(month, amount)| MonthlyUsage { month, amount })
        .collect()
}

/// Read-only aggregates over stock and usage.
#[derive(Clone)]
pub struct StatisticsService {
    db_pool: Arc<DatabaseConnection>,
}

impl StatisticsService {
    pub fn new(db_pool: Arc<DatabaseConnection>) -> Self {
        Self { db_pool }
    }

    /// Dashboard summary. Counter failures propagate; a failing monthly
    /// breakdown is replaced by an empty list.
    #[instrument(skip(self))]
    pub async fn get_statistics(&self) -> Result<Statistics, ServiceError> {
        let db = self.db();

        let total_supplies = SupplyItem::find().count(db).await?;

        let total_items = SupplyItem::find()
            .select_only()
            .column_as(Expr::col(supply_item::Column::Quantity).sum(), "total")
            .into_tuple::<Option<i64>>()
            .one(db)
            .await?
            .flatten()
            .unwrap_or(0);

        let low_stock_count = SupplyItem::find()
            .filter(
                Expr::col(supply_item::Column::Quantity)
                    .lte(Expr::col(supply_item::Column::MinQuantity)),
            )
            .count(db)
            .await?;

        let pending_requests = SupplyRequest::find()
            .filter(supply_request::Column::Status.eq(RequestStatus::Pending))
            .count(db)
            .await?;

        let monthly_usage = match self.monthly_usage(Utc::now()).await {
            Ok(months) => months,
            Err(e) => {
                warn!(error = %e, "Monthly usage breakdown unavailable");
                Vec::new()
            }
        };

        Ok(Statistics {
            total_supplies,
            total_items,
            low_stock_count,
            pending_requests,
            monthly_usage,
        })
    }

    /// Per-month usage totals for the trailing window ending at `now`.
    pub async fn monthly_usage(&self, now: DateTime<Utc>) -> Result<Vec<MonthlyUsage>, ServiceError> {
        let since = monthly_window_start(now).ok_or_else(|| {
            ServiceError::InternalError(format!("cannot compute usage window for {}", now))
        })?;

        let rows = UsageRecord::find()
            .select_only()
            .column(usage_record::Column::UsedAt)
            .column(usage_record::Column::QuantityUsed)
            .filter(usage_record::Column::UsedAt.gte(since))
            .into_tuple::<(DateTime<Utc>, i32)>()
            .all(self.db())
            .await?;

        Ok(bucket_by_month(rows))
    }

    /// Usage log joined with supply names, most recent first.
    #[instrument(skip(self))]
    pub async fn get_usage_history(
        &self,
        filter: &UsageHistoryFilter,
    ) -> Result<Vec<UsageWithSupply>, ServiceError> {
        let history = UsageRecord::find()
            .select_only()
            .columns([
                usage_record::Column::Id,
                usage_record::Column::SupplyId,
                usage_record::Column::QuantityUsed,
                usage_record::Column::UsedBy,
                usage_record::Column::Department,
                usage_record::Column::Purpose,
                usage_record::Column::UsedAt,
            ])
            .column_as(supply_item::Column::Name, "supply_name")
            .join(JoinType::InnerJoin, usage_record::Relation::SupplyItem.def())
            .filter(filter.to_condition())
            .order_by_desc(usage_record::Column::UsedAt)
            .order_by_desc(usage_record::Column::Id)
            .into_model::<UsageWithSupply>()
            .all(self.db())
            .await?;

        Ok(history)
    }

    fn db(&self) -> &DbPool {
        self.db_pool.as_ref()
    }
}
