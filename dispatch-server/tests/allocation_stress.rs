//! 编号分配压力测试 - 并发提交下的区间不重叠性
//!
//! 多任务同时调用分配器，校验所有返回区间两两不相交，
//! 且排序后的并集从测试前的计数值+1 开始连续无空洞。

use dispatch_server::db::DbService;
use dispatch_server::db::repository::sequence;
use shared::models::Section;
use sqlx::SqlitePool;
use std::collections::HashSet;

const TASKS: usize = 32;
const ALLOCS_PER_TASK: usize = 25;

async fn open_test_db() -> (tempfile::TempDir, SqlitePool) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stress.db");
    let db = DbService::new(&path.to_string_lossy()).await.unwrap();
    (dir, db.pool)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_allocations_are_disjoint_and_contiguous() {
    let (_dir, pool) = open_test_db().await;
    let before = sequence::get(&pool).await.unwrap().unwrap().last_no;

    let mut handles = Vec::new();
    for task in 0..TASKS {
        let pool = pool.clone();
        handles.push(tokio::spawn(async move {
            let mut ranges = Vec::with_capacity(ALLOCS_PER_TASK);
            for i in 0..ALLOCS_PER_TASK {
                // 0..=3 份抄送，混合单号与区间分配
                let cc_count = ((task + i) % 4) as u32;
                let alloc = sequence::allocate(&pool, Section::Accts, cc_count)
                    .await
                    .expect("allocation failed under contention");
                assert_eq!(alloc.end_no - alloc.start_no, i64::from(cc_count));
                ranges.push((alloc.start_no, alloc.end_no));
            }
            ranges
        }));
    }

    let mut all = Vec::new();
    for handle in handles {
        all.extend(handle.await.unwrap());
    }

    // 两两不相交: 每个号码只被签发一次
    let mut seen = HashSet::new();
    for &(start, end) in &all {
        for n in start..=end {
            assert!(seen.insert(n), "number {} issued twice", n);
        }
    }

    // 并集连续: 从 before+1 到 before+total 无空洞
    let total: i64 = all.iter().map(|&(s, e)| e - s + 1).sum();
    let min = all.iter().map(|&(s, _)| s).min().unwrap();
    let max = all.iter().map(|&(_, e)| e).max().unwrap();
    assert_eq!(min, before + 1);
    assert_eq!(max, before + total);
    assert_eq!(seen.len() as i64, total);

    // 计数器落在最高已签发号码上
    let after = sequence::get(&pool).await.unwrap().unwrap().last_no;
    assert_eq!(after, max);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_creates_never_share_numbers() {
    use chrono::NaiveDate;
    use dispatch_server::db::repository::dispatch;
    use shared::models::DispatchCreate;

    const WRITERS: usize = 16;
    const RECORDS_PER_WRITER: usize = 10;

    let (_dir, pool) = open_test_db().await;

    let mut handles = Vec::new();
    for writer in 0..WRITERS {
        let pool = pool.clone();
        handles.push(tokio::spawn(async move {
            let mut nos = Vec::new();
            for i in 0..RECORDS_PER_WRITER {
                let cc = (0..(writer + i) % 3)
                    .map(|k| format!("CC {}", k))
                    .collect::<Vec<_>>();
                let record = dispatch::create(
                    &pool,
                    DispatchCreate {
                        section: Section::Estab,
                        date: NaiveDate::from_ymd_opt(2026, 8, 7).unwrap(),
                        address: format!("Office {}", writer),
                        cc,
                        subject: format!("Letter {}/{}", writer, i),
                        remarks: String::new(),
                    },
                )
                .await
                .expect("create failed under contention");
                nos.push(record.no);
            }
            nos
        }));
    }

    let mut all_nos = Vec::new();
    for handle in handles {
        all_nos.extend(handle.await.unwrap());
    }

    let unique: HashSet<&String> = all_nos.iter().collect();
    assert_eq!(
        unique.len(),
        WRITERS * RECORDS_PER_WRITER,
        "duplicate dispatch numbers were issued"
    );
}
