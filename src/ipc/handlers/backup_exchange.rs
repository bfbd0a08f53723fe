use crate::backup;
use crate::error::AppError;
use crate::ipc::error::{err, ok, respond};
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::path::PathBuf;
use tracing::info;

fn handle_backup_export_bundle(state: &mut AppState, req: &Request) -> serde_json::Value {
    let out_path = match req.params.get("outPath").and_then(|v| v.as_str()) {
        Some(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => return err(&req.id, "bad_params", "missing outPath", None),
    };
    let Some(live) = state.live.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let out = PathBuf::from(&out_path);
    let export = match backup::export_snapshot_bundle(&live.snapshot(), live.revision(), &out) {
        Ok(v) => v,
        Err(e) => {
            return err(
                &req.id,
                "backup_failed",
                format!("{e:#}"),
                Some(json!({ "path": out_path })),
            )
        }
    };
    info!(path = %out_path, revision = live.revision(), "snapshot bundle exported");

    ok(
        &req.id,
        json!({
            "path": out_path,
            "bundleFormat": export.bundle_format,
            "entryCount": export.entry_count,
            "sha256": export.sha256
        }),
    )
}

fn backup_import_bundle(state: &mut AppState, req: &Request) -> Result<serde_json::Value, AppError> {
    let in_path = match req.params.get("inPath").and_then(|v| v.as_str()) {
        Some(v) if !v.trim().is_empty() => PathBuf::from(v.trim()),
        _ => return Err(AppError::bad_params("missing inPath")),
    };
    let live = state.live_mut()?;
    if !in_path.is_file() {
        return Err(AppError::NotFound("bundle file"));
    }

    let imported = backup::import_snapshot_bundle(&in_path).map_err(AppError::Backup)?;
    imported.data.validate()?;
    let revision = live.commit(imported.data).map_err(AppError::StoreWrite)?;
    info!(
        path = %in_path.display(),
        format = %imported.bundle_format_detected,
        revision,
        "snapshot restored"
    );

    Ok(json!({
        "bundleFormatDetected": imported.bundle_format_detected,
        "revision": revision
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "backup.exportBundle" => Some(handle_backup_export_bundle(state, req)),
        "backup.importBundle" => Some(respond(&req.id, backup_import_bundle(state, req))),
        _ => None,
    }
}
