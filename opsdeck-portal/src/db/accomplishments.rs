//! Weekly accomplishment persistence
//!
//! One row per user per exact (week_start, week_end) pair. The UNIQUE
//! constraint in the schema enforces that invariant server-side, and all
//! writes go through a single INSERT .. ON CONFLICT .. DO UPDATE so a
//! concurrent double-submit can never produce a duplicate row, only a
//! second update of the same one.

use chrono::NaiveDate;
use opsdeck_common::Result;
use serde::Serialize;
use sqlx::SqlitePool;

use crate::config::DEFAULT_TASK_STATUS;

/// Timesheet row. `user_badge`, `week_start`, and `week_end` form the
/// natural key and are never altered after creation.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct WeeklyAccomplishment {
    pub id: i64,
    pub user_badge: i64,
    pub application_id: Option<i64>,
    pub body: String,
    pub submitted_on: NaiveDate,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub status: String,
}

/// Field values for an upsert keyed on (user_badge, week_start, week_end).
#[derive(Debug, Clone)]
pub struct WeekUpsert {
    pub user_badge: i64,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub body: String,
    /// Fallback chain: supplied value, then the existing row's value, then today
    pub submitted_on: Option<NaiveDate>,
    /// Fallback chain: supplied value, then the existing row's value, then the default
    pub status: Option<String>,
    /// None = leave the link unchanged, Some(None) = clear, Some(Some(id)) = set
    pub application: Option<Option<i64>>,
}

/// Load the row for an exact natural key
pub async fn find_by_week(
    pool: &SqlitePool,
    user_badge: i64,
    week_start: NaiveDate,
    week_end: NaiveDate,
) -> Result<Option<WeeklyAccomplishment>> {
    let rec = sqlx::query_as::<_, WeeklyAccomplishment>(
        r#"
        SELECT id, user_badge, application_id, body, submitted_on, week_start, week_end, status
        FROM weekly_accomplishments
        WHERE user_badge = ? AND week_start = ? AND week_end = ?
        "#,
    )
    .bind(user_badge)
    .bind(week_start)
    .bind(week_end)
    .fetch_optional(pool)
    .await?;

    Ok(rec)
}

/// Create or update the row for the natural key in one statement.
///
/// The COALESCE chains give create and update a single shared definition of
/// the submitted_on and status defaults. The update arm never touches the
/// natural key columns.
pub async fn upsert_week(
    pool: &SqlitePool,
    rec: &WeekUpsert,
    today: NaiveDate,
) -> Result<WeeklyAccomplishment> {
    let app_provided = rec.application.is_some();
    let app_value = rec.application.flatten();

    let saved = sqlx::query_as::<_, WeeklyAccomplishment>(
        r#"
        INSERT INTO weekly_accomplishments
            (user_badge, application_id, body, submitted_on, week_start, week_end, status)
        VALUES (?1, ?2, ?3, COALESCE(?4, ?5), ?6, ?7, COALESCE(?8, ?9))
        ON CONFLICT(user_badge, week_start, week_end) DO UPDATE SET
            body = excluded.body,
            application_id = CASE WHEN ?10 THEN excluded.application_id
                                  ELSE weekly_accomplishments.application_id END,
            submitted_on = COALESCE(?4, weekly_accomplishments.submitted_on, ?5),
            status = COALESCE(?8, weekly_accomplishments.status, ?9)
        RETURNING id, user_badge, application_id, body, submitted_on, week_start, week_end, status
        "#,
    )
    .bind(rec.user_badge)
    .bind(app_value)
    .bind(&rec.body)
    .bind(rec.submitted_on)
    .bind(today)
    .bind(rec.week_start)
    .bind(rec.week_end)
    .bind(&rec.status)
    .bind(DEFAULT_TASK_STATUS)
    .bind(app_provided)
    .fetch_one(pool)
    .await?;

    Ok(saved)
}

/// All timesheets for a user, newest week first
pub async fn list_for_user(pool: &SqlitePool, user_badge: i64) -> Result<Vec<WeeklyAccomplishment>> {
    let recs = sqlx::query_as::<_, WeeklyAccomplishment>(
        r#"
        SELECT id, user_badge, application_id, body, submitted_on, week_start, week_end, status
        FROM weekly_accomplishments
        WHERE user_badge = ?
        ORDER BY week_start DESC
        "#,
    )
    .bind(user_badge)
    .fetch_all(pool)
    .await?;

    Ok(recs)
}
