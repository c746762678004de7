//! File path decomposition.

use std::path::Path;

/// The pieces of a file path or file URL.
///
/// Query strings and fragments are ignored, so URLs decompose the same way
/// as local paths.
///
/// ```
/// use django_core_common::utils::files::FilePathInfo;
///
/// let info = FilePathInfo::new("/path/to/my_file.txt");
/// assert_eq!(info.file_name.as_deref(), Some("my_file.txt"));
/// assert_eq!(info.file_extension.as_deref(), Some("txt"));
/// assert_eq!(info.file_name_without_extension.as_deref(), Some("my_file"));
/// assert_eq!(info.file_path_without_extension.as_deref(), Some("/path/to/my_file"));
/// assert_eq!(info.file_path_without_name.as_deref(), Some("/path/to/"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilePathInfo {
    /// The path exactly as given.
    pub file_path: String,
    /// Extension without the leading dot.
    pub file_extension: Option<String>,
    /// Last path segment.
    pub file_name: Option<String>,
    /// Last path segment minus its extension.
    pub file_name_without_extension: Option<String>,
    /// Full path minus the extension.
    pub file_path_without_extension: Option<String>,
    /// Full path up to and including the final `/`.
    pub file_path_without_name: Option<String>,
}

impl FilePathInfo {
    /// Decomposes `file_path`. An empty path leaves every part unset.
    pub fn new(file_path: impl Into<String>) -> Self {
        let file_path = file_path.into();
        if file_path.is_empty() {
            return Self::default();
        }

        let path = file_path
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string();
        let (dir, name) = match path.rfind('/') {
            Some(idx) => (path[..=idx].to_string(), path[idx + 1..].to_string()),
            None => (String::new(), path.clone()),
        };

        // a leading dot (".bashrc") is part of the name, not an extension
        let ext_idx = name.rfind('.').filter(|&idx| idx > 0 && idx + 1 < name.len());
        let (name_without_ext, extension) = match ext_idx {
            Some(idx) => (name[..idx].to_string(), Some(name[idx + 1..].to_string())),
            None => (name.clone(), None),
        };

        Self {
            file_extension: extension,
            file_name_without_extension: Some(name_without_ext.clone()),
            file_path_without_extension: Some(format!("{dir}{name_without_ext}")),
            file_path_without_name: Some(dir),
            file_name: Some(name),
            file_path,
        }
    }

    /// Returns `true` when the path names an existing regular file.
    pub fn is_file(&self) -> bool {
        Path::new(&self.file_path).is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_with_spaces() {
        let info = FilePathInfo::new("/some path/to/my_file.txt");
        assert_eq!(info.file_extension.as_deref(), Some("txt"));
        assert_eq!(info.file_name.as_deref(), Some("my_file.txt"));
        assert_eq!(info.file_name_without_extension.as_deref(), Some("my_file"));
        assert_eq!(
            info.file_path_without_extension.as_deref(),
            Some("/some path/to/my_file")
        );
        assert_eq!(info.file_path_without_name.as_deref(), Some("/some path/to/"));
    }

    #[test]
    fn test_from_url() {
        let info = FilePathInfo::new("http://somepath.com/to/a/file.jpg?some=queryparam");
        assert_eq!(info.file_extension.as_deref(), Some("jpg"));
        assert_eq!(info.file_name.as_deref(), Some("file.jpg"));
        assert_eq!(
            info.file_path_without_name.as_deref(),
            Some("http://somepath.com/to/a/")
        );
    }

    #[test]
    fn test_multiple_extensions() {
        let info = FilePathInfo::new("/some/path/the.filename.txt.txt");
        assert_eq!(
            info.file_name_without_extension.as_deref(),
            Some("the.filename.txt")
        );
        assert_eq!(info.file_extension.as_deref(), Some("txt"));
    }

    #[test]
    fn test_no_extension_and_empty() {
        let info = FilePathInfo::new("README");
        assert_eq!(info.file_extension, None);
        assert_eq!(info.file_name_without_extension.as_deref(), Some("README"));
        assert_eq!(info.file_path_without_name.as_deref(), Some(""));

        let hidden = FilePathInfo::new("/home/me/.bashrc");
        assert_eq!(hidden.file_extension, None);

        assert_eq!(FilePathInfo::new(""), FilePathInfo::default());
    }

    #[test]
    fn test_is_file() {
        assert!(FilePathInfo::new(file!()).is_file() || !Path::new(file!()).exists());
        assert!(!FilePathInfo::new("/definitely/not/here.txt").is_file());
    }
}
