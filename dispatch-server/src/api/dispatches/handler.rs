//! Dispatch API Handlers
//!
//! Create queries go through the allocator + store transaction; the export
//! builds spreadsheet (CSV) bytes in memory and serves them as a download.

use axum::{
    Extension, Json,
    extract::{Query, State},
    http::header,
    response::IntoResponse,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::dispatch;
use shared::error::{AppError, AppResult};
use shared::models::{DispatchCreate, DispatchRecord};

/// Date range filter (inclusive on both ends)
#[derive(Debug, Default, Deserialize)]
pub struct DispatchQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// GET /api/dispatches - 查询发文记录 (可按日期范围过滤)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<DispatchQuery>,
) -> AppResult<Json<Vec<DispatchRecord>>> {
    let records = dispatch::find_all(&state.pool, query.start_date, query.end_date).await?;
    Ok(Json(records))
}

/// POST /api/dispatches - 新建发文记录
///
/// 分配编号与写入记录在同一事务内完成
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<DispatchCreate>,
) -> AppResult<Json<DispatchRecord>> {
    let record = dispatch::create(&state.pool, payload).await?;

    tracing::info!(
        no = %record.no,
        operator = %current_user.username,
        "Dispatch record added"
    );

    Ok(Json(record))
}

/// GET /api/dispatches/export - 导出 CSV 下载
pub async fn export(
    State(state): State<ServerState>,
    Query(query): Query<DispatchQuery>,
) -> Result<impl IntoResponse, AppError> {
    let records = dispatch::find_all(&state.pool, query.start_date, query.end_date).await?;
    let bytes = to_spreadsheet(&records);

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!(
                    "attachment; filename=\"{}\"",
                    export_file_name(query.start_date, query.end_date)
                ),
            ),
        ],
        bytes,
    ))
}

// =============================================================================
// Spreadsheet building (usable from both HTTP and tests)
// =============================================================================

/// Build spreadsheet bytes for a record set: a CSV table in the register's
/// display column order, RFC 4180 quoting.
pub(crate) fn to_spreadsheet(records: &[DispatchRecord]) -> Vec<u8> {
    let mut out = String::new();
    write_row(
        &mut out,
        [
            "No",
            "Date",
            "Section",
            "Address",
            "Subject",
            "CC",
            "Remarks",
            "Id",
            "Created At",
        ],
    );

    for r in records {
        let created_at = chrono::DateTime::from_timestamp_millis(r.created_at)
            .map(|t| t.to_rfc3339())
            .unwrap_or_default();
        write_row(
            &mut out,
            [
                r.no.as_str(),
                &r.date.to_string(),
                r.section.as_str(),
                r.address.as_str(),
                r.subject.as_str(),
                &r.cc.join(", "),
                r.remarks.as_str(),
                &r.id.to_string(),
                &created_at,
            ],
        );
    }

    out.into_bytes()
}

fn write_row<'a>(out: &mut String, fields: impl IntoIterator<Item = &'a str>) {
    let mut first = true;
    for field in fields {
        if !first {
            out.push(',');
        }
        first = false;
        push_field(out, field);
    }
    out.push_str("\r\n");
}

fn push_field(out: &mut String, field: &str) {
    if field.contains(['"', ',', '\n', '\r']) {
        out.push('"');
        out.push_str(&field.replace('"', "\"\""));
        out.push('"');
    } else {
        out.push_str(field);
    }
}

/// Download file name carrying the selected range, e.g.
/// `dispatch_records_2026-01-01_to_all.csv`
pub(crate) fn export_file_name(start: Option<NaiveDate>, end: Option<NaiveDate>) -> String {
    let part = |d: Option<NaiveDate>| d.map_or_else(|| "all".to_string(), |d| d.to_string());
    format!("dispatch_records_{}_to_{}.csv", part(start), part(end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::Section;

    fn record(no: &str, subject: &str, cc: Vec<&str>) -> DispatchRecord {
        DispatchRecord {
            id: 1,
            no: no.to_string(),
            date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            section: Section::Accts,
            address: "District Office".to_string(),
            cc: cc.into_iter().map(String::from).collect(),
            subject: subject.to_string(),
            remarks: String::new(),
            created_at: 0,
        }
    }

    #[test]
    fn spreadsheet_starts_with_header_row() {
        let bytes = to_spreadsheet(&[]);
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("No,Date,Section,Address,Subject,CC,Remarks,Id,Created At\r\n"));
    }

    #[test]
    fn fields_with_commas_and_quotes_are_quoted() {
        let bytes = to_spreadsheet(&[record(
            "HDU/ACCTS/42-43",
            "Estimates, revised \"final\"",
            vec!["A"],
        )]);
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("\"Estimates, revised \"\"final\"\"\""));
        // Joined CC never splits columns
        let row = text.lines().nth(1).unwrap();
        assert!(row.starts_with("HDU/ACCTS/42-43,2026-03-14,ACCTS,District Office,"));
    }

    #[test]
    fn file_name_reflects_selected_range() {
        let start = NaiveDate::from_ymd_opt(2026, 1, 1);
        assert_eq!(
            export_file_name(start, None),
            "dispatch_records_2026-01-01_to_all.csv"
        );
        assert_eq!(export_file_name(None, None), "dispatch_records_all_to_all.csv");
    }
}
