use std::path::PathBuf;

use serde::Deserialize;

use crate::error::AppError;
use crate::live::LiveDocument;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

#[derive(Default)]
pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub live: Option<LiveDocument>,
}

impl AppState {
    pub fn live(&self) -> Result<&LiveDocument, AppError> {
        self.live.as_ref().ok_or(AppError::NoWorkspace)
    }

    pub fn live_mut(&mut self) -> Result<&mut LiveDocument, AppError> {
        self.live.as_mut().ok_or(AppError::NoWorkspace)
    }
}
