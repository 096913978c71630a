//! Dispatch Sequence Repository (Singleton)
//!
//! Hands out dispatch numbers from the `dispatch_sequence` counter row. A
//! dispatch with N carbon copies consumes N+1 consecutive numbers, so the
//! reservation is a single atomic `UPDATE ... RETURNING` against the counter:
//! concurrent submissions can never observe or claim overlapping ranges, and
//! there is no window where a number is handed out but the counter not yet
//! advanced.

use super::{MAX_ATTEMPTS, RepoError, RepoResult};
use shared::models::{Allocation, DispatchSequence, Section};
use sqlx::{SqliteConnection, SqlitePool};
use std::time::Duration;

const SINGLETON_ID: i64 = 1;

/// Read the current counter row
pub async fn get(pool: &SqlitePool) -> RepoResult<Option<DispatchSequence>> {
    let seq = sqlx::query_as::<_, DispatchSequence>(
        "SELECT id, last_no, updated_at FROM dispatch_sequence WHERE id = ?",
    )
    .bind(SINGLETON_ID)
    .fetch_optional(pool)
    .await?;
    Ok(seq)
}

/// Reserve `cc_count + 1` sequence numbers in one atomic read-modify-write.
///
/// Retries transient SQLITE_BUSY conflicts a bounded number of times before
/// surfacing [`RepoError::Contention`]. A missing counter row fails with
/// [`RepoError::SequenceMissing`] and nothing is applied.
pub async fn allocate(pool: &SqlitePool, section: Section, cc_count: u32) -> RepoResult<Allocation> {
    let mut attempt = 0;
    loop {
        let mut conn = pool.acquire().await?;
        match allocate_in(&mut conn, section, cc_count).await {
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

/// Reserve a number range on an existing connection.
///
/// Used by the record-create transaction so the counter advance and the
/// record insert commit (or roll back) as one unit. The whole reservation is
/// the single `UPDATE ... RETURNING` statement; the returned `last_no` is the
/// end of the reserved range.
pub async fn allocate_in(
    conn: &mut SqliteConnection,
    section: Section,
    cc_count: u32,
) -> RepoResult<Allocation> {
    let reserve = i64::from(cc_count) + 1;
    let now = shared::util::now_millis();

    let end = sqlx::query_scalar::<_, i64>(
        "UPDATE dispatch_sequence SET last_no = last_no + ?1, updated_at = ?2 WHERE id = ?3 RETURNING last_no",
    )
    .bind(reserve)
    .bind(now)
    .bind(SINGLETON_ID)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(RepoError::SequenceMissing)?;

    let start = end - i64::from(cc_count);
    Ok(Allocation {
        start_no: start,
        end_no: end,
        formatted: format_dispatch_no(section, start, end),
    })
}

/// Format a dispatch number: `HDU/<SECTION>/<start>` for a single number,
/// `HDU/<SECTION>/<start>-<end>` for a range covering CC copies.
pub fn format_dispatch_no(section: Section, start: i64, end: i64) -> String {
    if start == end {
        format!("HDU/{}/{}", section, start)
    } else {
        format!("HDU/{}/{}-{}", section, start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    async fn test_pool() -> (tempfile::TempDir, SqlitePool) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");
        let db = DbService::new(&path.to_string_lossy()).await.unwrap();
        (dir, db.pool)
    }

    #[test]
    fn format_single_and_range() {
        assert_eq!(format_dispatch_no(Section::Accts, 42, 42), "HDU/ACCTS/42");
        assert_eq!(format_dispatch_no(Section::Estab, 42, 45), "HDU/ESTAB/42-45");
    }

    #[tokio::test]
    async fn allocate_without_cc_consumes_one_number() {
        let (_dir, pool) = test_pool().await;

        let alloc = allocate(&pool, Section::Accts, 0).await.unwrap();
        assert_eq!(alloc.start_no, 1);
        assert_eq!(alloc.end_no, 1);
        assert_eq!(alloc.formatted, "HDU/ACCTS/1");

        let seq = get(&pool).await.unwrap().unwrap();
        assert_eq!(seq.last_no, 1);
    }

    #[tokio::test]
    async fn allocate_with_cc_reserves_contiguous_block() {
        let (_dir, pool) = test_pool().await;

        let alloc = allocate(&pool, Section::Db, 3).await.unwrap();
        assert_eq!(alloc.start_no, 1);
        assert_eq!(alloc.end_no, 4);
        assert_eq!(alloc.formatted, "HDU/DB/1-4");

        let next = allocate(&pool, Section::Db, 0).await.unwrap();
        assert_eq!(next.start_no, 5);
        assert_eq!(next.formatted, "HDU/DB/5");
    }

    #[tokio::test]
    async fn missing_counter_row_fails_unavailable() {
        let (_dir, pool) = test_pool().await;
        sqlx::query("DELETE FROM dispatch_sequence")
            .execute(&pool)
            .await
            .unwrap();

        let err = allocate(&pool, Section::Camp, 0).await.unwrap_err();
        assert!(matches!(err, RepoError::SequenceMissing));
    }

    #[tokio::test]
    async fn aborted_transaction_restores_counter() {
        let (_dir, pool) = test_pool().await;
        let before = get(&pool).await.unwrap().unwrap().last_no;

        {
            let mut tx = pool.begin().await.unwrap();
            let alloc = allocate_in(&mut tx, Section::Accts, 2).await.unwrap();
            assert_eq!(alloc.start_no, before + 1);
            // dropped without commit
        }

        let after = get(&pool).await.unwrap().unwrap().last_no;
        assert_eq!(after, before);
    }
}
