use crate::error::AppError;
use crate::ipc::error::respond;
use crate::ipc::helpers::{optional_str, parse_date_param, required_str};
use crate::ipc::types::{AppState, Request};
use crate::model::{new_id, ContentLog};
use serde_json::json;
use tracing::info;

fn logs_create(state: &mut AppState, req: &Request) -> Result<serde_json::Value, AppError> {
    let p = &req.params;
    let teacher_id = required_str(p, "teacherId")?;
    let course_id = required_str(p, "courseId")?;
    let subject_id = required_str(p, "subjectId")?;
    let date = required_str(p, "date")?;
    parse_date_param(&date, "date")?;
    let content = required_str(p, "content")?;
    let observations = optional_str(p, "observations");

    let live = state.live_mut()?;
    let mut next = (*live.snapshot()).clone();
    if next.teacher(&teacher_id).is_none() {
        return Err(AppError::NotFound("teacher"));
    }
    if next.course(&course_id).is_none() {
        return Err(AppError::NotFound("course"));
    }
    if next.subject(&subject_id).is_none() {
        return Err(AppError::NotFound("subject"));
    }

    let log = ContentLog {
        id: new_id(),
        teacher_id,
        course_id,
        subject_id,
        date,
        content,
        observations,
    };
    next.content_logs.push(log.clone());
    let revision = live.commit(next).map_err(AppError::StoreWrite)?;
    info!(log_id = %log.id, teacher_id = %log.teacher_id, "content log created");

    Ok(json!({ "log": log, "revision": revision }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "logs.create" => Some(respond(&req.id, logs_create(state, req))),
        _ => None,
    }
}
