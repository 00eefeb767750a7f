use std::path::{Component, Path, PathBuf};

use crate::error::{ForgeError, Result};

/// Path-keyed file access used by the scaffolding pipeline.
pub trait FileStore {
    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Write `content`, creating parent directories as needed.
    fn write(&self, path: &Path, content: &[u8]) -> Result<()>;

    /// Immediate children of `dir`, sorted by path.
    fn list(&self, dir: &Path) -> Result<Vec<PathBuf>>;

    /// Remove a file or a whole directory tree.
    fn delete(&self, path: &Path) -> Result<()>;
}

/// Join a relative path onto `base`, dropping `.` components so that
/// `join_path("/t", "./src")` is `/t/src`.
pub fn join_path(base: &Path, relative: impl AsRef<Path>) -> PathBuf {
    let mut joined = base.to_path_buf();
    for component in relative.as_ref().components() {
        match component {
            Component::CurDir => {}
            other => joined.push(other.as_os_str()),
        }
    }
    joined
}

/// The local file system.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFiles;

impl FileStore for LocalFiles {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        std::fs::read(path).map_err(|e| ForgeError::Io {
            context: format!("reading {}", path.display()),
            source: e,
        })
    }

    fn write(&self, path: &Path, content: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ForgeError::Io {
                context: format!("creating directory {}", parent.display()),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ForgeError::Io {
            context: format!("writing {}", path.display()),
            source: e,
        })
    }

    fn list(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let entries = std::fs::read_dir(dir).map_err(|e| ForgeError::Io {
            context: format!("listing {}", dir.display()),
            source: e,
        })?;
        let mut paths = entries
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()
            .map_err(|e| ForgeError::Io {
                context: format!("listing {}", dir.display()),
                source: e,
            })?;
        paths.sort();
        Ok(paths)
    }

    fn delete(&self, path: &Path) -> Result<()> {
        let result = if path.is_dir() {
            std::fs::remove_dir_all(path)
        } else {
            std::fs::remove_file(path)
        };
        result.map_err(|e| ForgeError::Io {
            context: format!("deleting {}", path.display()),
            source: e,
        })
    }
}
