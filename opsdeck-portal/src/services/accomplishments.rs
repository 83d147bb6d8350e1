//! Weekly accomplishment reconciliation
//!
//! "One record per user per exact week": the owner must already exist, an
//! optional application link is validated, then the write itself is a single
//! atomic upsert on the natural key. Losing a concurrent race therefore
//! means updating the same row twice, never creating two.

use chrono::{NaiveDate, Utc};
use opsdeck_common::{Error, Result};
use serde::{Deserialize, Deserializer};
use sqlx::SqlitePool;

use crate::db;
use crate::db::accomplishments::{WeekUpsert, WeeklyAccomplishment};

/// Reconcile input.
///
/// `application_id` distinguishes an absent field (leave the link alone)
/// from an explicit null (clear it).
#[derive(Debug, Clone, Deserialize)]
pub struct ReconcileInput {
    pub user_badge: i64,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub body: String,
    #[serde(default)]
    pub submitted_on: Option<NaiveDate>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub application_id: Option<Option<i64>>,
}

fn double_option<'de, D>(deserializer: D) -> std::result::Result<Option<Option<i64>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<i64>::deserialize(deserializer).map(Some)
}

/// Create or update the timesheet row for (user_badge, week_start, week_end).
///
/// Owners are never auto-created here: their required name fields cannot be
/// safely defaulted. An unresolvable badge fails before anything is written.
pub async fn reconcile(pool: &SqlitePool, input: ReconcileInput) -> Result<WeeklyAccomplishment> {
    if db::users::find_user(pool, input.user_badge).await?.is_none() {
        return Err(Error::NotFound(format!(
            "User with badge {} not found",
            input.user_badge
        )));
    }

    if let Some(Some(app_id)) = input.application_id {
        if db::applications::find_application(pool, app_id).await?.is_none() {
            return Err(Error::NotFound(format!("Application {} not found", app_id)));
        }
    }

    let today = Utc::now().date_naive();
    let rec = WeekUpsert {
        user_badge: input.user_badge,
        week_start: input.week_start,
        week_end: input.week_end,
        body: input.body,
        submitted_on: input.submitted_on,
        status: input.status,
        application: input.application_id,
    };

    let saved = db::accomplishments::upsert_week(pool, &rec, today).await?;

    tracing::info!(
        badge = saved.user_badge,
        week_start = %saved.week_start,
        week_end = %saved.week_end,
        "Timesheet reconciled"
    );

    Ok(saved)
}
