use crate::error::AppError;
use crate::ipc::error::respond;
use crate::ipc::helpers::optional_date;
use crate::ipc::types::{AppState, Request};
use crate::metrics::dashboard_summary;
use chrono::Local;
use serde_json::json;

fn dashboard_get(state: &mut AppState, req: &Request) -> Result<serde_json::Value, AppError> {
    let as_of = optional_date(&req.params, "asOf")?.unwrap_or_else(|| Local::now().date_naive());
    let live = state.live()?;
    let summary = dashboard_summary(&live.snapshot(), as_of);
    Ok(json!(summary))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "dashboard.summary" => Some(respond(&req.id, dashboard_get(state, req))),
        _ => None,
    }
}
