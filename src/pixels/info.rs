//! Status-line summary of the currently displayed image.

use chrono::{DateTime, Local};
use std::fmt;
use std::path::{Path, PathBuf};

use super::PixelBuffer;

/// What the shell shows in its status bar for the current image
#[derive(Debug, Clone, PartialEq)]
pub struct ImageInfo {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    /// Size of the file on disk; `None` if it could not be read.
    pub file_size: Option<u64>,
    pub modified: Option<DateTime<Local>>,
}

impl ImageInfo {
    /// Gather file metadata for `path` alongside the decoded geometry.
    pub fn collect(path: &Path, buffer: &PixelBuffer) -> Self {
        let metadata = std::fs::metadata(path).ok();
        Self {
            path: path.to_path_buf(),
            width: buffer.width(),
            height: buffer.height(),
            file_size: metadata.as_ref().map(|m| m.len()),
            modified: metadata
                .and_then(|m| m.modified().ok())
                .map(DateTime::<Local>::from),
        }
    }
}

impl fmt::Display for ImageInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}x{}",
            self.path.display(),
            self.width,
            self.height
        )?;
        if let Some(size) = self.file_size {
            write!(f, ", {size} Bytes")?;
        }
        if let Some(modified) = self.modified {
            write!(f, ", modified {}", modified.format("%Y-%m-%d %H:%M"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_line_format() {
        let info = ImageInfo {
            path: PathBuf::from("/photos/a.jpg"),
            width: 640,
            height: 480,
            file_size: Some(1234),
            modified: None,
        };
        assert_eq!(info.to_string(), "/photos/a.jpg, 640x480, 1234 Bytes");
    }

    #[test]
    fn test_collect_reads_file_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.png");
        std::fs::write(&path, [0u8; 42]).unwrap();
        let buffer = PixelBuffer::new(3, 2).unwrap();

        let info = ImageInfo::collect(&path, &buffer);
        assert_eq!(info.file_size, Some(42));
        assert_eq!((info.width, info.height), (3, 2));
        assert!(info.modified.is_some());
    }

    #[test]
    fn test_collect_missing_file() {
        let buffer = PixelBuffer::new(1, 1).unwrap();
        let info = ImageInfo::collect(Path::new("/nonexistent/x.png"), &buffer);
        assert_eq!(info.file_size, None);
        assert_eq!(info.to_string(), "/nonexistent/x.png, 1x1");
    }
}
