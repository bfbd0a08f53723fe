use serde::Serialize;
use serde_json::Value;

use crate::error::AppError;

#[derive(Serialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Envelope<'a> {
    Ok {
        id: &'a str,
        ok: bool,
        result: Value,
    },
    Err {
        id: &'a str,
        ok: bool,
        error: ErrorBody,
    },
}

fn encode(envelope: Envelope<'_>) -> Value {
    serde_json::to_value(envelope).unwrap_or(Value::Null)
}

pub fn ok(id: &str, result: Value) -> Value {
    encode(Envelope::Ok {
        id,
        ok: true,
        result,
    })
}

pub fn err(id: &str, code: &str, message: impl Into<String>, details: Option<Value>) -> Value {
    encode(Envelope::Err {
        id,
        ok: false,
        error: ErrorBody {
            code: code.to_string(),
            message: message.into(),
            details,
        },
    })
}

/// Wraps a handler outcome in the response envelope.
pub fn respond(id: &str, result: Result<Value, AppError>) -> Value {
    match result {
        Ok(v) => ok(id, v),
        Err(e) => err(id, e.code(), e.to_string(), None),
    }
}
