use crate::error::AppError;
use crate::ipc::error::respond;
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn data_get(state: &mut AppState) -> Result<serde_json::Value, AppError> {
    let live = state.live()?;
    Ok(json!({
        "revision": live.revision(),
        "data": &*live.snapshot()
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "data.get" => Some(respond(&req.id, data_get(state))),
        _ => None,
    }
}
