//! Contact Repository

use super::{RepoError, RepoResult};
use shared::error::ErrorCode;
use shared::models::{Contact, ContactCreate, ContactUpdate};
use sqlx::SqlitePool;

/// Find all contacts ordered by name
pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Contact>> {
    let contacts =
        sqlx::query_as::<_, Contact>("SELECT id, name FROM contact ORDER BY name")
            .fetch_all(pool)
            .await?;
    Ok(contacts)
}

/// Find contact by id
pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Contact>> {
    let contact = sqlx::query_as::<_, Contact>("SELECT id, name FROM contact WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(contact)
}

/// Find contact by name (exact match)
pub async fn find_by_name(pool: &SqlitePool, name: &str) -> RepoResult<Option<Contact>> {
    let contact =
        sqlx::query_as::<_, Contact>("SELECT id, name FROM contact WHERE name = ? LIMIT 1")
            .bind(name)
            .fetch_optional(pool)
            .await?;
    Ok(contact)
}

/// Create a new contact
pub async fn create(pool: &SqlitePool, data: ContactCreate) -> RepoResult<Contact> {
    let name = data.name.trim().to_string();
    if name.is_empty() {
        return Err(RepoError::Validation("Contact name is required".into()));
    }

    if find_by_name(pool, &name).await?.is_some() {
        return Err(RepoError::Duplicate(format!(
            "Contact '{}' already exists",
            name
        )));
    }

    let id = sqlx::query_scalar::<_, i64>("INSERT INTO contact (name) VALUES (?) RETURNING id")
        .bind(&name)
        .fetch_one(pool)
        .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create contact".into()))
}

/// Rename a contact
pub async fn update(pool: &SqlitePool, id: i64, data: ContactUpdate) -> RepoResult<Contact> {
    let name = data.name.trim().to_string();
    if name.is_empty() {
        return Err(RepoError::Validation("Contact name is required".into()));
    }

    let existing = find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Contact {id} not found")))?;

    // Reject a name held by a *different* contact
    if let Some(other) = find_by_name(pool, &name).await?
        && other.id != existing.id
    {
        return Err(RepoError::Duplicate(format!(
            "Contact '{}' already exists",
            name
        )));
    }

    let rows = sqlx::query("UPDATE contact SET name = ?1 WHERE id = ?2")
        .bind(&name)
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Contact {id} not found")));
    }

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Contact {id} not found")))
}

/// Delete a contact, guarded by a usage check
///
/// A contact referenced by any dispatch record (as the addressee or as a CC
/// element) cannot be deleted. The CC check matches whole array elements
/// via `json_each`, never substrings.
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let existing = find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Contact {id} not found")))?;

    let (address_count, cc_count) = usage(pool, &existing.name).await?;
    if address_count > 0 || cc_count > 0 {
        let mut usage_message = Vec::new();
        if address_count > 0 {
            usage_message.push(format!(
                "'{}' is used as Address in {} record(s)",
                existing.name, address_count
            ));
        }
        if cc_count > 0 {
            usage_message.push(format!(
                "'{}' is mentioned in CC in {} record(s)",
                existing.name, cc_count
            ));
        }
        return Err(RepoError::Business(
            ErrorCode::ContactInUse,
            format!("Cannot delete: {}", usage_message.join(", ")),
        ));
    }

    sqlx::query("DELETE FROM contact WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(true)
}

/// Count dispatch records referencing a contact name, as addressee and as a
/// CC list element
pub async fn usage(pool: &SqlitePool, name: &str) -> RepoResult<(i64, i64)> {
    let address_count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM dispatch_record WHERE address = ?",
    )
    .bind(name)
    .fetch_one(pool)
    .await?;

    let cc_count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM dispatch_record, json_each(dispatch_record.cc) \
         WHERE json_each.value = ?",
    )
    .bind(name)
    .fetch_one(pool)
    .await?;

    Ok((address_count, cc_count))
}
