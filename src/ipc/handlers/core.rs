use crate::error::AppError;
use crate::ipc::error::{ok, respond};
use crate::ipc::helpers::required_str;
use crate::ipc::types::{AppState, Request};
use crate::live::LiveDocument;
use serde_json::json;
use std::path::PathBuf;
use tracing::{info, warn};

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string()),
            "revision": state.live.as_ref().map(|l| l.revision())
        }),
    )
}

fn workspace_select(state: &mut AppState, req: &Request) -> Result<serde_json::Value, AppError> {
    let path = PathBuf::from(required_str(&req.params, "path")?);

    // Release the previous subscription before opening the new one.
    state.live = None;
    state.workspace = None;

    let opened = LiveDocument::open(&path).map_err(|e| {
        warn!(path = %path.display(), error = %e, "failed to open workspace");
        AppError::StoreUnavailable(e)
    })?;
    let revision = opened.live.revision();
    info!(path = %path.display(), revision, seeded = opened.seeded, "workspace selected");

    state.workspace = Some(path.clone());
    state.live = Some(opened.live);
    Ok(json!({
        "workspacePath": path.to_string_lossy(),
        "revision": revision,
        "seeded": opened.seeded
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(respond(&req.id, workspace_select(state, req))),
        _ => None,
    }
}
