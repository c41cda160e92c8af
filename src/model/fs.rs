use std::fmt;

use thiserror::Error;
use time::OffsetDateTime;

#[derive(Debug, Error)]
pub enum FSError {
    #[error("invalid path: attempts to traverse above root: {0}")]
    InvalidPath(String),

    #[error("path results in empty key: {0}")]
    EmptyKey(String),

    #[error("storage provider is not authenticated: {0}")]
    NotAuthenticated(String),

    #[error("path not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Unsupported(UnsupportedOperation),

    #[error("failed to decode object body as text: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error(transparent)]
    Remote(Box<dyn std::error::Error + Send + Sync>),
}

impl FSError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, FSError::NotFound(_))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FSObject {
    pub key: String,
    pub size: i64,
    pub modified_time: Option<OffsetDateTime>,
    pub content_type: Option<String>,
    pub etag: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct FSObjectPage {
    pub objects: Vec<FSObject>,
    pub next_continuation_token: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FileStat {
    pub path: String,
    pub is_file: bool,
    pub is_directory: bool,
    pub size: u64,
    pub modified: Option<OffsetDateTime>,
    pub content_type: Option<String>,
    pub etag: Option<String>,
}

impl FileStat {
    pub fn file(path: &str, object: FSObject) -> Self {
        Self {
            path: path.to_string(),
            is_file: true,
            is_directory: false,
            size: object.size.max(0) as u64,
            modified: object.modified_time,
            content_type: object.content_type,
            etag: object.etag.map(|tag| tag.trim_matches('"').to_string()),
        }
    }

    pub fn directory(path: &str) -> Self {
        Self {
            path: path.to_string(),
            is_file: false,
            is_directory: true,
            size: 0,
            modified: None,
            content_type: None,
            etag: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnsupportedOperation {
    Chown,
    Chmod,
    Rename,
    Watch,
    ExecuteCommand,
    BorrowFile,
    Glob,
    Grep,
}

impl UnsupportedOperation {
    pub const ALL: [UnsupportedOperation; 8] = [
        UnsupportedOperation::Chown,
        UnsupportedOperation::Chmod,
        UnsupportedOperation::Rename,
        UnsupportedOperation::Watch,
        UnsupportedOperation::ExecuteCommand,
        UnsupportedOperation::BorrowFile,
        UnsupportedOperation::Glob,
        UnsupportedOperation::Grep,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            UnsupportedOperation::Chown => "chown",
            UnsupportedOperation::Chmod => "chmod",
            UnsupportedOperation::Rename => "rename",
            UnsupportedOperation::Watch => "watch",
            UnsupportedOperation::ExecuteCommand => "execute_command",
            UnsupportedOperation::BorrowFile => "borrow_file",
            UnsupportedOperation::Glob => "glob",
            UnsupportedOperation::Grep => "grep",
        }
    }

    pub fn workaround(&self) -> Option<&'static str> {
        match self {
            UnsupportedOperation::Rename => Some("use copy followed by delete"),
            UnsupportedOperation::Glob => Some("use list_tree and filter the keys"),
            UnsupportedOperation::Grep => Some("use list_tree and read each object"),
            UnsupportedOperation::BorrowFile => Some("use read to fetch the object body"),
            UnsupportedOperation::Chown
            | UnsupportedOperation::Chmod
            | UnsupportedOperation::Watch
            | UnsupportedOperation::ExecuteCommand => None,
        }
    }
}

impl fmt::Display for UnsupportedOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "method not supported: {}", self.name())?;
        if let Some(workaround) = self.workaround() {
            write!(f, " ({})", workaround)?;
        }
        Ok(())
    }
}
