use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::model::fs::{FSError, FileStat};

pub const DEFAULT_IGNORED_SEGMENTS: [&str; 4] = [".git", "node_modules", ".DS_Store", "__pycache__"];

pub type IgnoreFn = Box<dyn Fn(&str) -> bool + Send + Sync>;

pub type KeyStream<'a> = BoxStream<'a, Result<String, FSError>>;

pub struct TreeOptions {
    /// Replaces the filesystem's default ignore filter when set.
    pub ignore: Option<IgnoreFn>,
    pub recursive: bool,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            ignore: None,
            recursive: true,
        }
    }
}

impl TreeOptions {
    pub fn with_ignore<F>(mut self, ignore: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.ignore = Some(Box::new(ignore));
        self
    }
}

pub fn default_ignore(path: &str) -> bool {
    path.split(['/', '\\'])
        .any(|segment| DEFAULT_IGNORED_SEGMENTS.contains(&segment))
}

#[async_trait]
pub trait FileSystem: Send + Sync {
    async fn write(&self, path: &str, content: Vec<u8>) -> Result<bool, FSError>;

    async fn read(&self, path: &str) -> Result<String, FSError>;

    async fn delete(&self, path: &str) -> Result<bool, FSError>;

    async fn exists(&self, path: &str) -> Result<bool, FSError>;

    async fn stat(&self, path: &str) -> Result<FileStat, FSError>;

    async fn copy(&self, source: &str, destination: &str) -> Result<bool, FSError>;

    async fn create_directory(&self, path: &str) -> Result<bool, FSError>;

    /// Lazily yields every key below `path`. Dropping the stream stops the listing.
    fn list_tree<'a>(&'a self, path: &str, options: TreeOptions) -> Result<KeyStream<'a>, FSError>;

    async fn chown(&self, path: &str, uid: u32, gid: u32) -> Result<(), FSError>;

    async fn chmod(&self, path: &str, mode: u32) -> Result<(), FSError>;

    async fn rename(&self, source: &str, destination: &str) -> Result<bool, FSError>;

    async fn watch(&self, path: &str) -> Result<KeyStream<'static>, FSError>;

    async fn execute_command(&self, command: &str, cwd: Option<&str>) -> Result<String, FSError>;

    async fn borrow_file(&self, path: &str) -> Result<Vec<u8>, FSError>;

    async fn glob(&self, pattern: &str) -> Result<Vec<String>, FSError>;

    async fn grep(&self, pattern: &str, path: &str) -> Result<Vec<String>, FSError>;

    fn should_ignore(&self, path: &str) -> bool {
        default_ignore(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ignore() {
        let cases = vec![
            ("src/main.rs", false),
            (".git/config", true),
            ("web/node_modules/react/index.js", true),
            ("photos/.DS_Store", true),
            ("docs/git/notes.md", false),
            ("pkg\\__pycache__\\mod.pyc", true),
            ("", false),
        ];

        for (input, expected) in cases {
            assert_eq!(default_ignore(input), expected, "failed for case: {}", input);
        }
    }

    #[test]
    fn test_tree_options_default() {
        let options = TreeOptions::default();
        assert!(options.recursive);
        assert!(options.ignore.is_none());

        let options = TreeOptions::default().with_ignore(|path| path.ends_with(".tmp"));
        let ignore = options.ignore.unwrap();
        assert!(ignore("a/b.tmp"));
        assert!(!ignore("a/b.txt"));
    }
}
