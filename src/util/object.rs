use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::model::fs::FSError;

// Key characters left unescaped in a copy source; `/` keeps the key's hierarchy readable.
const COPY_SOURCE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Climbing above the root with `..` is an error. The empty key denotes the root.
pub fn to_key(path: &str) -> Result<String, FSError> {
    let path = path.replace('\\', "/");

    let mut segments: Vec<&str> = Vec::new();
    for segment in path.trim_matches('/').split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                if segments.pop().is_none() {
                    return Err(FSError::InvalidPath(path.to_string()));
                }
            }
            _ => segments.push(segment),
        }
    }

    Ok(segments.join("/"))
}

pub fn to_object_key(path: &str) -> Result<String, FSError> {
    let key = to_key(path)?;
    if key.is_empty() {
        return Err(FSError::EmptyKey(path.to_string()));
    }

    Ok(key)
}

pub fn to_directory_prefix(key: &str) -> String {
    if key.is_empty() || key.ends_with('/') {
        key.to_string()
    } else {
        format!("{}/", key)
    }
}

pub fn copy_source(bucket: &str, key: &str) -> String {
    format!("{}/{}", bucket, utf8_percent_encode(key, COPY_SOURCE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_key() {
        let cases = vec![
            ("", ""),
            ("/", ""),
            ("file.txt", "file.txt"),
            ("/folder/file.txt/", "folder/file.txt"),
            ("folder//sub///file", "folder/sub/file"),
            ("./folder/./file", "folder/file"),
            ("a/b/../c", "a/c"),
            ("a/b/../../c", "c"),
            ("a/..", ""),
            ("folder\\sub\\file", "folder/sub/file"),
            ("\\\\folder\\", "folder"),
        ];

        for (input, expected) in cases {
            let result = to_key(input).unwrap();
            assert_eq!(result, expected, "failed for case: {}", input);
        }
    }

    #[test]
    fn test_to_key_traversal_above_root() {
        let cases = vec!["..", "../x", "/../x", "a/../../x", "./..", "a\\..\\.."];

        for input in cases {
            let result = to_key(input);
            assert!(
                matches!(result, Err(FSError::InvalidPath(_))),
                "failed for case: {}",
                input
            );
        }
    }

    #[test]
    fn test_to_key_idempotent() {
        let cases = vec![
            "",
            "plain",
            "/lead/and/trail/",
            "a/./b/../c//d",
            "x\\y\\..\\z",
            "deep/a/b/c/../../d/./e/",
        ];

        for input in cases {
            let once = to_key(input).unwrap();
            let twice = to_key(&once).unwrap();
            assert_eq!(once, twice, "failed for case: {}", input);

            assert!(!once.starts_with('/'), "failed for case: {}", input);
            assert!(!once.ends_with('/'), "failed for case: {}", input);
            if !once.is_empty() {
                assert!(
                    once.split('/').all(|s| !s.is_empty() && s != "." && s != ".."),
                    "failed for case: {}",
                    input
                );
            }
        }
    }

    #[test]
    fn test_to_object_key() {
        assert_eq!(to_object_key("/a/b").unwrap(), "a/b");
        assert!(matches!(to_object_key(""), Err(FSError::EmptyKey(_))));
        assert!(matches!(to_object_key("a/.."), Err(FSError::EmptyKey(_))));
        assert!(matches!(to_object_key("../a"), Err(FSError::InvalidPath(_))));
    }

    #[test]
    fn test_to_directory_prefix() {
        let cases = vec![("", ""), ("dir", "dir/"), ("dir/", "dir/"), ("a/b", "a/b/")];

        for (input, expected) in cases {
            assert_eq!(to_directory_prefix(input), expected, "failed for case: {}", input);
        }
    }

    #[test]
    fn test_copy_source() {
        let cases = vec![
            ("bucket", "a.txt", "bucket/a.txt"),
            ("bucket", "dir/sub/file-1_2.txt", "bucket/dir/sub/file-1_2.txt"),
            ("bucket", "my file+1.txt", "bucket/my%20file%2B1.txt"),
        ];

        for (bucket, key, expected) in cases {
            assert_eq!(copy_source(bucket, key), expected, "failed for case: {}", key);
        }
    }
}
