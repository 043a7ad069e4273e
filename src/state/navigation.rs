//! Previous/next navigation through the images of one directory.
//!
//! Nothing is cached: every request lists the directory again, so files that
//! appear, vanish or get renamed between requests are always accounted for.
//! The current file is located by exact file-name equality, never by pattern.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::NavigationError;
use crate::pixels::has_image_extension;

/// Which way to step through the sibling list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

/// Sibling listing and position of one image, valid for a single request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationContext {
    pub current_path: PathBuf,
    /// Recognized image file names in the directory, ascending byte order
    pub siblings: Vec<OsString>,
    /// Position of `current_path` in `siblings`; `None` if it is gone
    pub current_index: Option<usize>,
}

impl NavigationContext {
    /// List `path`'s directory and locate `path` in it.
    pub fn resolve(path: &Path) -> Result<Self, NavigationError> {
        let siblings = siblings(path)?;
        let current_index = locate(path, &siblings);
        Ok(Self {
            current_path: path.to_path_buf(),
            siblings,
            current_index,
        })
    }

    /// The neighbouring image in `direction`.
    pub fn step(&self, direction: Direction) -> Result<PathBuf, NavigationError> {
        let index = self.current_index.ok_or_else(|| NavigationError::NotFound {
            path: self.current_path.clone(),
        })?;

        let target = match direction {
            Direction::Previous => index.checked_sub(1),
            Direction::Next => Some(index + 1).filter(|&i| i < self.siblings.len()),
        }
        .ok_or(NavigationError::Boundary(direction))?;

        Ok(self.current_path.with_file_name(&self.siblings[target]))
    }

    pub fn is_first(&self) -> bool {
        self.current_index == Some(0)
    }

    pub fn is_last(&self) -> bool {
        matches!(self.current_index, Some(i) if i + 1 == self.siblings.len())
    }
}

/// Image file names in `path`'s directory, sorted ascending by bytes.
///
/// Only regular files (or links to them) with a recognized extension are kept;
/// subdirectories are never descended into.
pub fn siblings(path: &Path) -> Result<Vec<OsString>, NavigationError> {
    let dir = parent_dir(path)?;

    let mut names = Vec::new();
    for entry in WalkDir::new(&dir).min_depth(1).max_depth(1).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            // A dangling link or an entry deleted mid-scan is not worth failing for.
            Err(err) if err.depth() > 0 => continue,
            Err(source) => return Err(NavigationError::Io { dir, source }),
        };
        if entry.file_type().is_file() && has_image_extension(entry.path()) {
            names.push(entry.file_name().to_os_string());
        }
    }

    names.sort();
    Ok(names)
}

/// Index of `path`'s file name in `siblings`, by exact equality.
pub fn locate(path: &Path, siblings: &[OsString]) -> Option<usize> {
    let name = path.file_name()?;
    siblings.iter().position(|sibling| sibling.as_os_str() == name)
}

/// The image before `path` in its directory.
pub fn previous(path: &Path) -> Result<PathBuf, NavigationError> {
    NavigationContext::resolve(path)?.step(Direction::Previous)
}

/// The image after `path` in its directory.
pub fn next(path: &Path) -> Result<PathBuf, NavigationError> {
    NavigationContext::resolve(path)?.step(Direction::Next)
}

fn parent_dir(path: &Path) -> Result<PathBuf, NavigationError> {
    if path.file_name().is_none() {
        return Err(NavigationError::NoParent {
            path: path.to_path_buf(),
        });
    }
    match path.parent() {
        Some(parent) if parent.as_os_str().is_empty() => Ok(PathBuf::from(".")),
        Some(parent) => Ok(parent.to_path_buf()),
        None => Err(NavigationError::NoParent {
            path: path.to_path_buf(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn dir_with(files: &[&str]) -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        for name in files {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        dir
    }

    fn names(list: &[OsString]) -> Vec<&str> {
        list.iter().map(|n| n.to_str().unwrap()).collect()
    }

    #[test]
    fn test_siblings_filtered_and_sorted() {
        // Created out of order on purpose.
        let dir = dir_with(&["c.jpg", "notes.txt", "a.png", "B.bmp", "b.jpg", "d.JPG", "e.jpeg"]);
        std::fs::create_dir(dir.path().join("folder.png")).unwrap();

        let list = siblings(&dir.path().join("a.png")).unwrap();
        assert_eq!(names(&list), vec!["B.bmp", "a.png", "b.jpg", "c.jpg"]);
    }

    #[test]
    fn test_bare_extension_name_is_listed() {
        let dir = dir_with(&[".png", "a.png", ".hidden"]);
        let list = siblings(&dir.path().join("a.png")).unwrap();
        assert_eq!(names(&list), vec![".png", "a.png"]);
        assert_eq!(previous(&dir.path().join("a.png")).unwrap(), dir.path().join(".png"));
    }

    #[test]
    fn test_boundaries() {
        let dir = dir_with(&["a.jpg", "b.jpg", "c.jpg"]);
        let a = dir.path().join("a.jpg");
        let c = dir.path().join("c.jpg");

        assert!(matches!(
            previous(&a),
            Err(NavigationError::Boundary(Direction::Previous))
        ));
        assert!(matches!(
            next(&c),
            Err(NavigationError::Boundary(Direction::Next))
        ));
        assert_eq!(next(&a).unwrap(), dir.path().join("b.jpg"));
        assert_eq!(previous(&c).unwrap(), dir.path().join("b.jpg"));
    }

    #[test]
    fn test_previous_next_are_inverse_in_the_middle() {
        let dir = dir_with(&["1.png", "2.png", "3.png", "4.png"]);
        for name in ["2.png", "3.png"] {
            let path = dir.path().join(name);
            assert_eq!(previous(&next(&path).unwrap()).unwrap(), path);
            assert_eq!(next(&previous(&path).unwrap()).unwrap(), path);
        }
    }

    #[test]
    fn test_vanished_file_is_not_found() {
        let dir = dir_with(&["a.jpg", "b.jpg", "c.jpg"]);
        let b = dir.path().join("b.jpg");
        std::fs::remove_file(&b).unwrap();

        assert!(matches!(previous(&b), Err(NavigationError::NotFound { .. })));
        assert!(matches!(next(&b), Err(NavigationError::NotFound { .. })));
    }

    #[test]
    fn test_metacharacters_match_literally() {
        let dir = dir_with(&["a.jpg", "[a-z].jpg", "a*.jpg", "a.b.jpg"]);
        // '[' (0x5B) sorts before 'a', '*' and '.' sort before letters.
        let list = siblings(&dir.path().join("a.jpg")).unwrap();
        assert_eq!(names(&list), vec!["[a-z].jpg", "a*.jpg", "a.b.jpg", "a.jpg"]);

        let star = dir.path().join("a*.jpg");
        assert_eq!(locate(&star, &list), Some(1));
        assert_eq!(next(&star).unwrap(), dir.path().join("a.b.jpg"));

        let bracket = dir.path().join("[a-z].jpg");
        assert!(matches!(
            previous(&bracket),
            Err(NavigationError::Boundary(Direction::Previous))
        ));
        assert_eq!(next(&bracket).unwrap(), star);
    }

    #[test]
    fn test_new_file_is_seen_on_next_request() {
        let dir = dir_with(&["a.jpg", "c.jpg"]);
        let a = dir.path().join("a.jpg");
        assert_eq!(next(&a).unwrap(), dir.path().join("c.jpg"));

        std::fs::write(dir.path().join("b.jpg"), b"x").unwrap();
        assert_eq!(next(&a).unwrap(), dir.path().join("b.jpg"));
    }

    #[test]
    fn test_context_flags() {
        let dir = dir_with(&["a.jpg", "b.jpg"]);
        let ctx = NavigationContext::resolve(&dir.path().join("a.jpg")).unwrap();
        assert_eq!(ctx.current_index, Some(0));
        assert!(ctx.is_first());
        assert!(!ctx.is_last());

        let only = dir_with(&["solo.png"]);
        let ctx = NavigationContext::resolve(&only.path().join("solo.png")).unwrap();
        assert!(ctx.is_first() && ctx.is_last());
    }

    #[test]
    fn test_missing_directory_is_io_error() {
        let err = siblings(Path::new("/nonexistent/dir/a.jpg")).unwrap_err();
        assert!(matches!(err, NavigationError::Io { .. }));
    }

    #[test]
    fn test_root_has_no_parent() {
        assert!(matches!(
            siblings(Path::new("/")),
            Err(NavigationError::NoParent { .. })
        ));
    }
}
