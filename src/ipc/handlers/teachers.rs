use crate::error::AppError;
use crate::ipc::error::respond;
use crate::ipc::helpers::required_str;
use crate::ipc::types::{AppState, Request};
use crate::model::{new_id, Teacher};
use serde_json::json;
use tracing::info;

fn teachers_create(state: &mut AppState, req: &Request) -> Result<serde_json::Value, AppError> {
    let name = required_str(&req.params, "name")?;
    let live = state.live_mut()?;

    let teacher = Teacher { id: new_id(), name };
    let mut next = (*live.snapshot()).clone();
    next.teachers.push(teacher.clone());
    let revision = live.commit(next).map_err(AppError::StoreWrite)?;
    info!(teacher_id = %teacher.id, "teacher created");

    Ok(json!({ "teacher": teacher, "revision": revision }))
}

fn teachers_update(state: &mut AppState, req: &Request) -> Result<serde_json::Value, AppError> {
    let teacher_id = required_str(&req.params, "teacherId")?;
    let name = required_str(&req.params, "name")?;
    let live = state.live_mut()?;

    let mut next = (*live.snapshot()).clone();
    let teacher = next
        .teachers
        .iter_mut()
        .find(|t| t.id == teacher_id)
        .ok_or(AppError::NotFound("teacher"))?;
    teacher.name = name;
    let updated = teacher.clone();
    let revision = live.commit(next).map_err(AppError::StoreWrite)?;

    Ok(json!({ "teacher": updated, "revision": revision }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "teachers.create" => Some(respond(&req.id, teachers_create(state, req))),
        "teachers.update" => Some(respond(&req.id, teachers_update(state, req))),
        _ => None,
    }
}
