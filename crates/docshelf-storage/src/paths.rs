//! Path resolution: one chokepoint mapping logical names to disk locations.

use crate::error::{StorageError, StorageResult};
use docshelf_core::models::StorageArea;
use docshelf_core::sanitize_filename;
use std::path::{Path, PathBuf};

/// Maps a logical filename to its canonical location in one of the three
/// storage areas. Pure and side-effect-free: resolution never touches disk.
#[derive(Clone, Debug)]
pub struct PathResolver {
    base_path: PathBuf,
}

impl PathResolver {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        PathResolver {
            base_path: base_path.into(),
        }
    }

    /// Root directory of the given area.
    pub fn area_root(&self, area: StorageArea) -> PathBuf {
        self.base_path.join(area.dir_name())
    }

    /// Resolve a logical name to its absolute location in `area`.
    ///
    /// The name is sanitized here even if callers already did so; a name that
    /// survives sanitation unchanged is guaranteed to stay inside the area
    /// root, and two distinct sanitized names never resolve to the same path.
    pub fn resolve(&self, name: &str, area: StorageArea) -> StorageResult<PathBuf> {
        let sanitized =
            sanitize_filename(name).map_err(|e| StorageError::InvalidName(e.to_string()))?;
        if sanitized != name {
            // Callers pass sanitized names; anything else means a layer above
            // skipped the chokepoint.
            return Err(StorageError::InvalidName(format!(
                "name {:?} is not in sanitized form",
                name
            )));
        }
        Ok(self.area_root(area).join(sanitized))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> PathResolver {
        PathResolver::new("/srv/docshelf")
    }

    #[test]
    fn test_resolve_active() {
        let path = resolver()
            .resolve("report.pdf", StorageArea::Active)
            .unwrap();
        assert_eq!(path, PathBuf::from("/srv/docshelf/active/report.pdf"));
    }

    #[test]
    fn test_resolve_backup_and_preview() {
        let r = resolver();
        assert_eq!(
            r.resolve("a.png", StorageArea::Backup).unwrap(),
            PathBuf::from("/srv/docshelf/backup/a.png")
        );
        assert_eq!(
            r.resolve("a.png", StorageArea::Preview).unwrap(),
            PathBuf::from("/srv/docshelf/preview/a.png")
        );
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let r = resolver();
        assert!(r.resolve("../escape", StorageArea::Active).is_err());
        assert!(r.resolve("a/../b", StorageArea::Active).is_err());
        assert!(r.resolve("/etc/passwd", StorageArea::Active).is_err());
    }

    #[test]
    fn test_resolve_rejects_unsanitized_input() {
        // "my report.pdf" sanitizes to "my_report.pdf"; resolve refuses the
        // raw form so physical paths always match logical names.
        let r = resolver();
        assert!(r.resolve("my report.pdf", StorageArea::Active).is_err());
        assert!(r.resolve("my_report.pdf", StorageArea::Active).is_ok());
    }

    #[test]
    fn test_distinct_names_resolve_to_distinct_paths() {
        let r = resolver();
        let a = r.resolve("a_b.txt", StorageArea::Active).unwrap();
        let b = r.resolve("a-b.txt", StorageArea::Active).unwrap();
        assert_ne!(a, b);
    }
}
