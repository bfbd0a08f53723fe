use crate::extract::ExtractError;
use crate::model::SnapshotError;
use crate::report::ExportError;
use crate::store::StoreError;
use thiserror::Error;

/// Everything a request can fail with. The IPC layer is the only place these
/// are turned into responses.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadParams(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("select a workspace first")]
    NoWorkspace,
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("could not connect to the shared document: {0}")]
    StoreUnavailable(#[source] StoreError),
    #[error("failed to save changes, please try again: {0}")]
    StoreWrite(#[source] StoreError),
    #[error("failed to process the PDF: {0}")]
    Extraction(#[from] ExtractError),
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(#[from] SnapshotError),
    #[error("{0:#}")]
    Backup(anyhow::Error),
    #[error("{0:#}")]
    Settings(anyhow::Error),
}

impl AppError {
    pub fn bad_params(message: impl Into<String>) -> Self {
        AppError::BadParams(message.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::BadParams(_) => "bad_params",
            AppError::NotFound(_) => "not_found",
            AppError::NoWorkspace => "no_workspace",
            AppError::Export(e) => e.code(),
            AppError::StoreUnavailable(_) => "store_unavailable",
            AppError::StoreWrite(_) => "store_write_failed",
            AppError::Extraction(_) => "extraction_failed",
            AppError::InvalidSnapshot(_) => "invalid_snapshot",
            AppError::Backup(_) => "backup_failed",
            AppError::Settings(_) => "settings_failed",
        }
    }
}
