use crate::error::AppError;
use crate::extract::{extract_file, is_pdf_path, ExtractError};
use crate::ipc::error::respond;
use crate::ipc::handlers::setup;
use crate::ipc::helpers::required_str;
use crate::ipc::types::{AppState, Request};
use crate::model::CandidateRow;
use crate::reconcile::reconcile;
use serde_json::{json, Value};
use std::path::PathBuf;
use tracing::{info, warn};

fn parse_rows_param(params: &Value) -> Result<Vec<CandidateRow>, AppError> {
    let Some(rows) = params.get("rows") else {
        return Err(AppError::bad_params("missing rows"));
    };
    serde_json::from_value(rows.clone())
        .map_err(|e| AppError::bad_params(format!("rows must be an array of rows: {}", e)))
}

/// Reconciles `rows` against the current snapshot and, when `commit` is set,
/// replaces the document with the result in a single write.
fn run_import(state: &mut AppState, rows: &[CandidateRow], commit: bool) -> Result<Value, AppError> {
    let live = state.live_mut()?;
    // Extraction can take a while; merge against what the store holds now.
    live.refresh();
    let reconciled = reconcile(&live.snapshot(), rows);
    let revision = if commit {
        live.commit(reconciled.data).map_err(AppError::StoreWrite)?
    } else {
        live.revision()
    };
    if commit {
        info!(
            rows = reconciled.summary.rows_total,
            added = reconciled.summary.logs_added,
            revision,
            "import applied"
        );
    }
    Ok(json!({
        "committed": commit,
        "summary": reconciled.summary,
        "revision": revision
    }))
}

fn import_preview_rows(state: &mut AppState, req: &Request) -> Result<Value, AppError> {
    let rows = parse_rows_param(&req.params)?;
    run_import(state, &rows, false)
}

fn import_apply_rows(state: &mut AppState, req: &Request) -> Result<Value, AppError> {
    let rows = parse_rows_param(&req.params)?;
    run_import(state, &rows, true)
}

fn import_pdf(state: &mut AppState, req: &Request) -> Result<Value, AppError> {
    let path = PathBuf::from(required_str(&req.params, "path")?);
    if !is_pdf_path(&path) {
        return Err(AppError::bad_params("only .pdf files can be imported"));
    }
    let live = state.live()?;
    let extractor = setup::configured_extractor(live.conn())
        .map_err(AppError::Settings)?
        .ok_or(ExtractError::NotConfigured)?;
    let instruction = setup::import_instruction(live.conn()).map_err(AppError::Settings)?;

    let rows = extract_file(&extractor, &path, &instruction).map_err(|e| {
        warn!(path = %path.display(), error = %e, "pdf extraction failed");
        AppError::Extraction(e)
    })?;
    info!(path = %path.display(), rows = rows.len(), "pdf extracted");
    run_import(state, &rows, true)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    match req.method.as_str() {
        "import.previewRows" => Some(respond(&req.id, import_preview_rows(state, req))),
        "import.applyRows" => Some(respond(&req.id, import_apply_rows(state, req))),
        "import.pdf" => Some(respond(&req.id, import_pdf(state, req))),
        _ => None,
    }
}
