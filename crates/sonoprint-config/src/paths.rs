//! Platform-specific paths for the user transform library.
//!
//! # Directory Structure
//!
//! - **User transforms**: `~/.config/sonoprint/transforms/` (Linux),
//!   `~/Library/Application Support/sonoprint/transforms/` (macOS),
//!   `%APPDATA%\sonoprint\transforms\` (Windows)
//!
//! # Example
//!
//! ```rust,no_run
//! use sonoprint_config::paths;
//!
//! let library = paths::user_transforms_dir();
//! println!("Transforms: {:?}", library);
//!
//! // Path on disk, or a name in the library (with or without `.toml`)
//! if let Some(path) = paths::find_transform("telephone") {
//!     println!("Found transform at: {:?}", path);
//! }
//! ```

use std::path::{Path, PathBuf};

use crate::ConfigError;

/// Application name used for directory paths.
const APP_NAME: &str = "sonoprint";

/// Subdirectory name for saved transforms.
const TRANSFORMS_SUBDIR: &str = "transforms";

/// File extension of transform files.
const TRANSFORM_EXTENSION: &str = "toml";

/// Returns the user-specific transform library directory.
///
/// Returns a path relative to the working directory if the platform config
/// directory cannot be determined.
pub fn user_transforms_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
        .join(TRANSFORMS_SUBDIR)
}

/// Ensure the user transform library exists, creating it if needed.
///
/// # Errors
///
/// Returns [`ConfigError::CreateDir`] if the directory cannot be created.
pub fn ensure_user_transforms_dir() -> Result<PathBuf, ConfigError> {
    let dir = user_transforms_dir();

    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| ConfigError::create_dir(&dir, e))?;
    }

    Ok(dir)
}

/// Find a transform file by path or library name.
///
/// `name` may be a path to an existing file, or the name of a transform in
/// the user library with or without the `.toml` extension.
pub fn find_transform(name: &str) -> Option<PathBuf> {
    find_transform_in(name, &user_transforms_dir())
}

/// [`find_transform`] against an explicit library directory.
pub fn find_transform_in(name: &str, library: &Path) -> Option<PathBuf> {
    let path = PathBuf::from(name);
    if path.is_file() {
        return Some(path);
    }

    let library_path = library.join(transform_file_name(name));
    library_path.is_file().then_some(library_path)
}

/// File name a transform called `name` is stored under in the library.
///
/// # Example
///
/// ```rust
/// use sonoprint_config::paths::transform_file_name;
///
/// assert_eq!(transform_file_name("telephone"), "telephone.toml");
/// assert_eq!(transform_file_name("telephone.toml"), "telephone.toml");
/// ```
pub fn transform_file_name(name: &str) -> String {
    let suffix = format!(".{TRANSFORM_EXTENSION}");
    if name.ends_with(&suffix) {
        name.to_string()
    } else {
        format!("{name}{suffix}")
    }
}

/// List the transform files in the user library, sorted by path.
///
/// Returns an empty vector if the directory doesn't exist or can't be read.
pub fn list_user_transforms() -> Vec<PathBuf> {
    list_transforms_in_dir(&user_transforms_dir())
}

/// List the `.toml` files in `dir`, sorted by path.
pub fn list_transforms_in_dir(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut transforms: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext == TRANSFORM_EXTENSION)
        })
        .collect();
    transforms.sort();
    transforms
}

/// Get the transform name from a file path (the file stem).
///
/// # Example
///
/// ```rust
/// use sonoprint_config::paths::transform_name_from_path;
/// use std::path::Path;
///
/// let name = transform_name_from_path(Path::new("/path/to/telephone.toml"));
/// assert_eq!(name, Some("telephone".to_string()));
/// ```
pub fn transform_name_from_path(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_user_transforms_dir() {
        let dir = user_transforms_dir();
        assert!(dir.ends_with("sonoprint/transforms"));
    }

    #[test]
    fn test_find_transform_by_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("test.toml");
        fs::write(&path, "name = \"test\"").unwrap();

        assert_eq!(find_transform(path.to_str().unwrap()), Some(path));
    }

    #[test]
    fn test_find_transform_in_library() {
        let library = TempDir::new().unwrap();
        let path = library.path().join("telephone.toml");
        fs::write(&path, "").unwrap();

        assert_eq!(find_transform_in("telephone", library.path()), Some(path.clone()));
        assert_eq!(find_transform_in("telephone.toml", library.path()), Some(path));
        assert_eq!(find_transform_in("radio", library.path()), None);
    }

    #[test]
    fn test_find_transform_not_found() {
        assert!(find_transform("nonexistent_transform_12345").is_none());
    }

    #[test]
    fn test_list_transforms_in_dir() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("b.toml"), "").unwrap();
        fs::write(temp_dir.path().join("a.toml"), "").unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "").unwrap();
        fs::create_dir(temp_dir.path().join("dir.toml")).unwrap();

        let transforms = list_transforms_in_dir(temp_dir.path());
        let names: Vec<String> = transforms
            .iter()
            .filter_map(|p| transform_name_from_path(p))
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_list_transforms_nonexistent_dir() {
        assert!(list_transforms_in_dir(Path::new("/nonexistent/path/12345")).is_empty());
    }

    #[test]
    fn test_transform_name_from_path() {
        assert_eq!(
            transform_name_from_path(Path::new("simple.toml")),
            Some("simple".to_string())
        );
        assert_eq!(transform_name_from_path(Path::new("/")), None);
    }
}
