//! 发文登记端到端流程测试
//!
//! 覆盖: 编号格式与计数器推进、失败补偿、记录查询排序、
//! 联系人删除保护 (精确匹配)。

use chrono::NaiveDate;
use dispatch_server::db::DbService;
use dispatch_server::db::repository::{RepoError, contact, dispatch, sequence, user};
use shared::error::ErrorCode;
use shared::models::{ContactCreate, ContactUpdate, DispatchCreate, Section};
use sqlx::SqlitePool;

async fn open_test_db() -> (tempfile::TempDir, SqlitePool) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flow.db");
    let db = DbService::new(&path.to_string_lossy()).await.unwrap();
    (dir, db.pool)
}

async fn set_counter(pool: &SqlitePool, value: i64) {
    sqlx::query("UPDATE dispatch_sequence SET last_no = ? WHERE id = 1")
        .bind(value)
        .execute(pool)
        .await
        .unwrap();
}

async fn last_no(pool: &SqlitePool) -> i64 {
    sequence::get(pool).await.unwrap().unwrap().last_no
}

fn new_dispatch(section: Section, cc: Vec<&str>, subject: &str) -> DispatchCreate {
    DispatchCreate {
        section,
        date: NaiveDate::from_ymd_opt(2026, 8, 7).unwrap(),
        address: "Chief Engineer Kashmir".to_string(),
        cc: cc.into_iter().map(String::from).collect(),
        subject: subject.to_string(),
        remarks: String::new(),
    }
}

#[tokio::test]
async fn numbering_follows_the_register_scheme() {
    let (_dir, pool) = open_test_db().await;
    set_counter(&pool, 41).await;

    // 两份抄送 → 占用 42..=44
    let record = dispatch::create(
        &pool,
        new_dispatch(Section::Accts, vec!["A", "B"], "Quarterly accounts"),
    )
    .await
    .unwrap();
    assert_eq!(record.no, "HDU/ACCTS/42-44");
    assert_eq!(record.cc, vec!["A".to_string(), "B".to_string()]);
    assert_eq!(last_no(&pool).await, 44);

    // 无抄送 → 单号 45
    let record = dispatch::create(
        &pool,
        new_dispatch(Section::Accts, vec![], "Covering letter"),
    )
    .await
    .unwrap();
    assert_eq!(record.no, "HDU/ACCTS/45");
    assert_eq!(last_no(&pool).await, 45);
}

#[tokio::test]
async fn rejected_submission_never_touches_the_counter() {
    let (_dir, pool) = open_test_db().await;
    set_counter(&pool, 41).await;

    let err = dispatch::create(&pool, new_dispatch(Section::Db, vec![], "   "))
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    assert_eq!(last_no(&pool).await, 41);
}

#[tokio::test]
async fn aborted_create_restores_the_exact_counter_value() {
    let (_dir, pool) = open_test_db().await;
    set_counter(&pool, 41).await;

    // 在记录写入前中止事务: 预留随事务一并回滚
    {
        let mut tx = pool.begin().await.unwrap();
        let alloc = sequence::allocate_in(&mut tx, Section::Camp, 2).await.unwrap();
        assert_eq!(alloc.formatted, "HDU/CAMP/42-44");
        tx.rollback().await.unwrap();
    }
    assert_eq!(last_no(&pool).await, 41);

    // 下一次成功分配从同一位置继续，不重号也不跳号
    let record = dispatch::create(&pool, new_dispatch(Section::Camp, vec![], "Camp orders"))
        .await
        .unwrap();
    assert_eq!(record.no, "HDU/CAMP/42");
}

#[tokio::test]
async fn records_query_newest_first_within_range() {
    let (_dir, pool) = open_test_db().await;

    for (date, subject) in [
        ("2026-08-01", "first"),
        ("2026-08-03", "second"),
        ("2026-08-03", "third"),
        ("2026-08-05", "fourth"),
    ] {
        let mut data = new_dispatch(Section::Estab, vec![], subject);
        data.date = date.parse().unwrap();
        dispatch::create(&pool, data).await.unwrap();
    }

    // 无过滤: date desc, id desc
    let all = dispatch::find_all(&pool, None, None).await.unwrap();
    let subjects: Vec<&str> = all.iter().map(|r| r.subject.as_str()).collect();
    assert_eq!(subjects, vec!["fourth", "third", "second", "first"]);

    // 闭区间过滤
    let filtered = dispatch::find_all(
        &pool,
        Some("2026-08-02".parse().unwrap()),
        Some("2026-08-03".parse().unwrap()),
    )
    .await
    .unwrap();
    let subjects: Vec<&str> = filtered.iter().map(|r| r.subject.as_str()).collect();
    assert_eq!(subjects, vec!["third", "second"]);
}

#[tokio::test]
async fn referenced_contact_cannot_be_deleted() {
    let (_dir, pool) = open_test_db().await;

    let ali = contact::create(&pool, ContactCreate { name: "Ali".into() })
        .await
        .unwrap();
    let al = contact::create(&pool, ContactCreate { name: "Al".into() })
        .await
        .unwrap();
    let cc_contact = contact::create(&pool, ContactCreate { name: "Bashir".into() })
        .await
        .unwrap();

    let mut data = new_dispatch(Section::Accts, vec!["Bashir"], "Site inspection");
    data.address = "Ali".to_string();
    dispatch::create(&pool, data).await.unwrap();

    // 地址引用 → 不可删除
    let err = contact::delete(&pool, ali.id).await.unwrap_err();
    assert!(matches!(err, RepoError::Business(ErrorCode::ContactInUse, _)));

    // 抄送引用 → 不可删除
    let err = contact::delete(&pool, cc_contact.id).await.unwrap_err();
    assert!(matches!(err, RepoError::Business(ErrorCode::ContactInUse, _)));

    // "Al" 只是 "Ali" 的子串，未被任何记录引用 → 可删除
    assert!(contact::delete(&pool, al.id).await.unwrap());
    let names: Vec<String> = contact::find_all(&pool)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["Ali".to_string(), "Bashir".to_string()]);
}

#[tokio::test]
async fn contact_names_stay_unique() {
    let (_dir, pool) = open_test_db().await;

    let first = contact::create(&pool, ContactCreate { name: "Executive Engineer".into() })
        .await
        .unwrap();
    contact::create(&pool, ContactCreate { name: "Divisional Office".into() })
        .await
        .unwrap();

    // 重名创建被拒绝 (含首尾空白修剪)
    let err = contact::create(&pool, ContactCreate { name: "  Executive Engineer ".into() })
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Duplicate(_)));

    // 改名撞到其他联系人被拒绝
    let err = contact::update(
        &pool,
        first.id,
        ContactUpdate { name: "Divisional Office".into() },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, RepoError::Duplicate(_)));

    // 改回自己的名字是允许的
    let same = contact::update(
        &pool,
        first.id,
        ContactUpdate { name: "Executive Engineer".into() },
    )
    .await
    .unwrap();
    assert_eq!(same.name, "Executive Engineer");
}

#[tokio::test]
async fn login_lookup_maps_username_to_display_name() {
    let (_dir, pool) = open_test_db().await;

    sqlx::query("INSERT INTO user (username, display_name) VALUES (?1, ?2)")
        .bind("adham")
        .bind("Mohammad Adham Wani")
        .execute(&pool)
        .await
        .unwrap();

    let found = user::find_by_username(&pool, "adham").await.unwrap().unwrap();
    assert_eq!(found.display_name, "Mohammad Adham Wani");

    assert!(user::find_by_username(&pool, "nobody").await.unwrap().is_none());
    assert_eq!(user::count(&pool).await.unwrap(), 1);
}
