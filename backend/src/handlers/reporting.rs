//! Report download handlers
//!
//! Rendering is CPU bound, so it runs on the blocking pool.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::reporting::{ReportFormat, ReportKind, ReportRequest};
use crate::services::ReportingService;
use crate::AppState;

async fn render_attachment(
    state: AppState,
    format: ReportFormat,
    kind: ReportKind,
    request: ReportRequest,
) -> AppResult<Response> {
    let service = ReportingService::new(state.config.report.clone());

    let bytes = tokio::task::spawn_blocking(move || service.render(format, kind, &request))
        .await
        .map_err(|e| AppError::Report(format!("Report task failed: {}", e)))??;

    let disposition = format!("attachment; filename=\"{}\"", format.file_name(kind));
    let headers = [
        (header::CONTENT_TYPE, format.content_type().to_string()),
        (header::CONTENT_DISPOSITION, disposition),
    ];

    Ok((headers, bytes).into_response())
}

/// Remaining stock as a spreadsheet
pub async fn stock_report_xlsx(
    State(state): State<AppState>,
    CurrentUser(_ctx): CurrentUser,
    Json(request): Json<ReportRequest>,
) -> AppResult<Response> {
    render_attachment(state, ReportFormat::Xlsx, ReportKind::RemainingStock, request).await
}

/// Remaining stock as a PDF
pub async fn stock_report_pdf(
    State(state): State<AppState>,
    CurrentUser(_ctx): CurrentUser,
    Json(request): Json<ReportRequest>,
) -> AppResult<Response> {
    render_attachment(state, ReportFormat::Pdf, ReportKind::RemainingStock, request).await
}

/// Store-in rows of a scheme as a PDF
pub async fn store_in_report_pdf(
    State(state): State<AppState>,
    CurrentUser(_ctx): CurrentUser,
    Json(request): Json<ReportRequest>,
) -> AppResult<Response> {
    render_attachment(state, ReportFormat::Pdf, ReportKind::StoreIn, request).await
}

/// Stock-out rows of a scheme as a PDF
pub async fn stock_out_report_pdf(
    State(state): State<AppState>,
    CurrentUser(_ctx): CurrentUser,
    Json(request): Json<ReportRequest>,
) -> AppResult<Response> {
    render_attachment(state, ReportFormat::Pdf, ReportKind::StockOut, request).await
}
