//! Contact API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::db::repository::contact;
use shared::error::AppResult;
use shared::models::{Contact, ContactCreate, ContactUpdate};

/// GET /api/contacts - 获取所有联系人 (按名称排序)
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Contact>>> {
    let contacts = contact::find_all(&state.pool).await?;
    Ok(Json(contacts))
}

/// POST /api/contacts - 新建联系人
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ContactCreate>,
) -> AppResult<Json<Contact>> {
    let c = contact::create(&state.pool, payload).await?;
    tracing::info!(contact_id = %c.id, name = %c.name, "Contact created");
    Ok(Json(c))
}

/// PUT /api/contacts/:id - 重命名联系人
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<ContactUpdate>,
) -> AppResult<Json<Contact>> {
    let c = contact::update(&state.pool, id, payload).await?;
    tracing::info!(contact_id = %c.id, name = %c.name, "Contact renamed");
    Ok(Json(c))
}

/// DELETE /api/contacts/:id - 删除联系人
///
/// 被任何发文记录引用 (Address 或 CC) 的联系人不可删除
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let result = contact::delete(&state.pool, id).await?;
    tracing::info!(contact_id = %id, "Contact deleted");
    Ok(Json(result))
}
