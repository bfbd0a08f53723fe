use crate::error::AppError;
use crate::ipc::error::respond;
use crate::ipc::handlers::setup;
use crate::ipc::helpers::optional_date;
use crate::ipc::types::{AppState, Request};
use crate::report::{export_model, filter_logs, report_rows, ExportScope, ReportFilters};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::info;

fn parse_filters(params: &Value) -> Result<ReportFilters, AppError> {
    match params.get("filters") {
        None | Some(Value::Null) => Ok(ReportFilters::default()),
        Some(v) => serde_json::from_value(v.clone())
            .map_err(|e| AppError::bad_params(format!("invalid filters: {}", e))),
    }
}

fn reports_filter(state: &mut AppState, req: &Request) -> Result<Value, AppError> {
    let filters = parse_filters(&req.params)?;
    let live = state.live()?;
    let label = setup::unknown_label(live.conn()).map_err(AppError::Settings)?;

    let data = live.snapshot();
    let logs = filter_logs(&data.content_logs, &filters);
    let rows = report_rows(&data, &logs, &label);
    Ok(json!({ "count": rows.len(), "rows": rows }))
}

fn reports_export_model(state: &mut AppState, req: &Request) -> Result<Value, AppError> {
    let scope: ExportScope = match req.params.get("scope") {
        None | Some(Value::Null) => return Err(AppError::bad_params("missing scope")),
        Some(v) => serde_json::from_value(v.clone())
            .map_err(|e| AppError::bad_params(format!("invalid scope: {}", e)))?,
    };
    let filters = parse_filters(&req.params)?;
    let generated_on =
        optional_date(&req.params, "generatedOn")?.unwrap_or_else(|| Utc::now().date_naive());
    let live = state.live()?;
    let label = setup::unknown_label(live.conn()).map_err(AppError::Settings)?;

    let model = export_model(&live.snapshot(), &scope, &filters, generated_on, &label)?;
    info!(file_name = %model.file_name, rows = model.rows.len(), "export model built");
    Ok(json!(model))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    match req.method.as_str() {
        "reports.filter" => Some(respond(&req.id, reports_filter(state, req))),
        "reports.exportModel" => Some(respond(&req.id, reports_export_model(state, req))),
        _ => None,
    }
}
