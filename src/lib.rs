pub mod adapters;
pub mod credentials;
pub mod filesystem;
pub mod fs;
pub mod logging;
pub mod model;
pub mod util;

pub use credentials::{CredentialProvider, ProviderConfig, StorageProvider};
pub use filesystem::{FileSystem, TreeOptions};
pub use fs::ObjectFS;
pub use model::fs::{FSError, FileStat, UnsupportedOperation};
