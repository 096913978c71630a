//! Dispatch Record Repository
//!
//! Records are append-only: created together with their number reservation,
//! never updated or deleted.

use super::{MAX_ATTEMPTS, RepoError, RepoResult, sequence};
use chrono::NaiveDate;
use shared::error::ErrorCode;
use shared::models::{DispatchCreate, DispatchRecord};
use sqlx::SqlitePool;
use std::time::Duration;

const COLUMNS: &str = "id, no, date, section, address, cc, subject, remarks, created_at";

/// Create a dispatch record with a freshly allocated number.
///
/// The counter advance and the record insert run in one transaction: if the
/// insert fails, the reservation rolls back and the counter keeps its exact
/// pre-reservation value, so no numbers are burned on failed inserts.
/// Transient write conflicts retry a bounded number of times.
pub async fn create(pool: &SqlitePool, data: DispatchCreate) -> RepoResult<DispatchRecord> {
    let data = validate(data)?;

    let mut attempt = 0;
    loop {
        match try_create(pool, &data).await {
            Err(RepoError::Contention(msg)) => {
                attempt += 1;
                if attempt >= MAX_ATTEMPTS {
                    return Err(RepoError::Contention(msg));
                }
                tokio::time::sleep(Duration::from_millis(10 * u64::from(attempt))).await;
            }
            other => return other,
        }
    }
}

async fn try_create(pool: &SqlitePool, data: &DispatchCreate) -> RepoResult<DispatchRecord> {
    let cc_count = u32::try_from(data.cc.len())
        .map_err(|_| RepoError::Validation("Too many CC recipients".into()))?;
    let cc_json = serde_json::to_string(&data.cc)
        .map_err(|e| RepoError::Validation(format!("Invalid CC list: {e}")))?;

    let mut tx = pool.begin().await?;

    let alloc = sequence::allocate_in(&mut tx, data.section, cc_count).await?;

    let insert = sqlx::query_scalar::<_, i64>(
        "INSERT INTO dispatch_record (no, date, section, address, cc, subject, remarks, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8) RETURNING id",
    )
    .bind(&alloc.formatted)
    .bind(data.date)
    .bind(data.section)
    .bind(&data.address)
    .bind(&cc_json)
    .bind(&data.subject)
    .bind(&data.remarks)
    .bind(shared::util::now_millis())
    .fetch_one(&mut *tx)
    .await;

    let id = match insert {
        Ok(id) => id,
        Err(e) => {
            // Rolling back also un-reserves the number range.
            if let Err(rollback) = tx.rollback().await {
                tracing::error!(error = %rollback, "Rollback failed after dispatch insert error");
            }
            tracing::warn!(
                no = %alloc.formatted,
                error = %e,
                "Dispatch insert failed; number reservation rolled back"
            );
            if super::is_transient(&e) {
                return Err(RepoError::Contention(e.to_string()));
            }
            return Err(RepoError::Business(
                ErrorCode::DispatchStoreFailed,
                format!("Failed to store dispatch record: {e}"),
            ));
        }
    };

    tx.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to read dispatch record after insert".into()))
}

/// Find a record by id
pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<DispatchRecord>> {
    let record = sqlx::query_as::<_, DispatchRecord>(&format!(
        "SELECT {COLUMNS} FROM dispatch_record WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(record)
}

/// Find records, optionally filtered by an inclusive date range, newest first
/// (date desc, then id desc as tie-breaker)
pub async fn find_all(
    pool: &SqlitePool,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> RepoResult<Vec<DispatchRecord>> {
    let records = sqlx::query_as::<_, DispatchRecord>(&format!(
        "SELECT {COLUMNS} FROM dispatch_record \
         WHERE (?1 IS NULL OR date >= ?1) AND (?2 IS NULL OR date <= ?2) \
         ORDER BY date DESC, id DESC"
    ))
    .bind(start_date)
    .bind(end_date)
    .fetch_all(pool)
    .await?;
    Ok(records)
}

/// Required-field validation, mirroring the submission form: section and date
/// arrive typed, so address and subject remain to check. Runs before the
/// transaction so a rejected submission never touches the counter.
fn validate(mut data: DispatchCreate) -> RepoResult<DispatchCreate> {
    data.address = data.address.trim().to_string();
    data.subject = data.subject.trim().to_string();
    data.remarks = data.remarks.trim().to_string();
    data.cc = data
        .cc
        .into_iter()
        .map(|name| name.trim().to_string())
        .collect();

    if data.address.is_empty() {
        return Err(RepoError::Validation("Address is required".into()));
    }
    if data.subject.is_empty() {
        return Err(RepoError::Validation("Subject is required".into()));
    }
    if data.cc.iter().any(|name| name.is_empty()) {
        return Err(RepoError::Validation("CC names must not be empty".into()));
    }
    Ok(data)
}
