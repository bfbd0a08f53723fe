use crate::db;
use crate::extract::{CommandExtractor, DEFAULT_INSTRUCTION};
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use rusqlite::Connection;
use serde_json::{json, Map, Value};

/// Overrides `import.extractorCommand` when set.
pub const EXTRACTOR_ENV: &str = "CURRICULUMD_EXTRACTOR";

#[derive(Clone, Copy)]
enum SetupSection {
    Import,
    Reports,
}

impl SetupSection {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "import" => Some(Self::Import),
            "reports" => Some(Self::Reports),
            _ => None,
        }
    }

    fn key(self) -> &'static str {
        match self {
            Self::Import => "setup.import",
            Self::Reports => "setup.reports",
        }
    }
}

fn default_section(section: SetupSection) -> Value {
    match section {
        SetupSection::Import => json!({
            "extractorCommand": "",
            "extractorArgs": [],
            "instruction": DEFAULT_INSTRUCTION
        }),
        SetupSection::Reports => json!({
            "unknownLabel": "N/A"
        }),
    }
}

fn as_object_mut(value: &mut Value) -> Result<&mut Map<String, Value>, String> {
    value
        .as_object_mut()
        .ok_or_else(|| "internal setup object must be a JSON object".to_string())
}

fn parse_string_max(v: &Value, key: &str, max_len: usize) -> Result<String, String> {
    let s = v.as_str().ok_or_else(|| format!("{} must be string", key))?;
    let s = s.trim();
    if s.chars().count() > max_len {
        return Err(format!("{} length must be <= {}", key, max_len));
    }
    Ok(s.to_string())
}

fn parse_string_list(v: &Value, key: &str, max_items: usize, max_len: usize) -> Result<Vec<String>, String> {
    let items = v
        .as_array()
        .ok_or_else(|| format!("{} must be an array of strings", key))?;
    if items.len() > max_items {
        return Err(format!("{} must have at most {} items", key, max_items));
    }
    items
        .iter()
        .map(|item| parse_string_max(item, key, max_len))
        .collect()
}

fn merge_section_patch(
    section: SetupSection,
    current: &mut Value,
    patch: &Map<String, Value>,
) -> Result<(), String> {
    let obj = as_object_mut(current)?;
    for (k, v) in patch {
        match section {
            SetupSection::Import => match k.as_str() {
                "extractorCommand" => {
                    obj.insert(k.clone(), Value::String(parse_string_max(v, k, 1024)?));
                }
                "extractorArgs" => {
                    let args = parse_string_list(v, k, 64, 1024)?;
                    obj.insert(k.clone(), json!(args));
                }
                "instruction" => {
                    let s = parse_string_max(v, k, 4000)?;
                    if s.is_empty() {
                        return Err(format!("{} must not be empty", k));
                    }
                    obj.insert(k.clone(), Value::String(s));
                }
                _ => return Err(format!("unknown import field: {}", k)),
            },
            SetupSection::Reports => match k.as_str() {
                "unknownLabel" => {
                    obj.insert(k.clone(), Value::String(parse_string_max(v, k, 32)?));
                }
                _ => return Err(format!("unknown reports field: {}", k)),
            },
        }
    }
    Ok(())
}

fn load_section(conn: &Connection, section: SetupSection) -> anyhow::Result<Value> {
    let mut current = default_section(section);
    if let Some(saved) = db::settings_get_json(conn, section.key())? {
        if let Some(saved_obj) = saved.as_object() {
            // Malformed stored values fall back to defaults rather than blocking.
            let _ = merge_section_patch(section, &mut current, saved_obj);
        }
    }
    Ok(current)
}

/// Extractor from the environment override, else from `setup.import`.
pub fn configured_extractor(conn: &Connection) -> anyhow::Result<Option<CommandExtractor>> {
    if let Ok(line) = std::env::var(EXTRACTOR_ENV) {
        if let Some(cmd) = CommandExtractor::from_command_line(&line) {
            return Ok(Some(cmd));
        }
    }
    let section = load_section(conn, SetupSection::Import)?;
    let command = section
        .get("extractorCommand")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .trim()
        .to_string();
    if command.is_empty() {
        return Ok(None);
    }
    let args = section
        .get("extractorArgs")
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|a| a.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();
    Ok(Some(CommandExtractor::new(command, args)))
}

pub fn import_instruction(conn: &Connection) -> anyhow::Result<String> {
    let section = load_section(conn, SetupSection::Import)?;
    Ok(section
        .get("instruction")
        .and_then(|v| v.as_str())
        .unwrap_or(DEFAULT_INSTRUCTION)
        .to_string())
}

pub fn unknown_label(conn: &Connection) -> anyhow::Result<String> {
    let section = load_section(conn, SetupSection::Reports)?;
    Ok(section
        .get("unknownLabel")
        .and_then(|v| v.as_str())
        .unwrap_or("N/A")
        .to_string())
}

fn handle_setup_get(state: &mut AppState, req: &Request) -> Value {
    let Some(live) = state.live.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let conn = live.conn();
    if let Some(section_raw) = req.params.get("section").and_then(|v| v.as_str()) {
        let Some(section) = SetupSection::parse(section_raw) else {
            return err(&req.id, "bad_params", "unknown section", None);
        };
        return match load_section(conn, section) {
            Ok(v) => ok(&req.id, v),
            Err(e) => err(&req.id, "settings_failed", e.to_string(), None),
        };
    }
    let import = match load_section(conn, SetupSection::Import) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "settings_failed", e.to_string(), None),
    };
    let reports = match load_section(conn, SetupSection::Reports) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "settings_failed", e.to_string(), None),
    };
    ok(
        &req.id,
        json!({
            "import": import,
            "reports": reports
        }),
    )
}

fn handle_setup_update(state: &mut AppState, req: &Request) -> Value {
    let Some(live) = state.live.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let conn = live.conn();
    let Some(section_raw) = req.params.get("section").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing section", None);
    };
    let Some(section) = SetupSection::parse(section_raw) else {
        return err(&req.id, "bad_params", "unknown section", None);
    };
    let Some(patch_obj) = req.params.get("patch").and_then(|v| v.as_object()) else {
        return err(&req.id, "bad_params", "patch must be an object", None);
    };
    let mut current = match load_section(conn, section) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "settings_failed", e.to_string(), None),
    };
    if let Err(msg) = merge_section_patch(section, &mut current, patch_obj) {
        return err(&req.id, "bad_params", msg, None);
    }
    if let Err(e) = db::settings_set_json(conn, section.key(), &current) {
        return err(&req.id, "settings_failed", e.to_string(), None);
    }
    ok(&req.id, current)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    match req.method.as_str() {
        "setup.get" => Some(handle_setup_get(state, req)),
        "setup.update" => Some(handle_setup_update(state, req)),
        _ => None,
    }
}
