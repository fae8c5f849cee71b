// Report artifact storage: output layout, path resolution and soft delete

use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tokio::fs;

pub const GENERATED_DIR_NAME: &str = "generated-reports";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to create directory {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("failed to move {from} to {to}: {source}")]
    Move {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },

    #[error("failed to remove {path}: {source}")]
    Remove { path: PathBuf, source: io::Error },
}

#[derive(Clone, Debug)]
pub struct StorageService {
    reports_dir: PathBuf,
    backup_dir: PathBuf,
    search_roots: Vec<PathBuf>,
}

impl StorageService {
    pub fn new(reports_dir: impl Into<PathBuf>, backup_dir: impl Into<PathBuf>) -> Self {
        let search_roots = std::env::current_dir()
            .map(|cwd| {
                let mut roots = vec![cwd.clone()];
                if let Some(parent) = cwd.parent() {
                    roots.push(parent.to_path_buf());
                }
                roots.push(cwd.join("server"));
                roots
            })
            .unwrap_or_default();

        Self {
            reports_dir: reports_dir.into(),
            backup_dir: backup_dir.into(),
            search_roots,
        }
    }

    pub fn with_search_roots(mut self, roots: Vec<PathBuf>) -> Self {
        self.search_roots = roots;
        self
    }

    pub fn reports_dir(&self) -> &Path {
        &self.reports_dir
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    pub async fn init(&self) -> Result<(), StorageError> {
        ensure_dir(&self.reports_dir).await?;
        ensure_dir(&self.backup_dir).await
    }

    /// Target path for a new artifact. An existing file that belongs to a
    /// different report is never overwritten; a numeric suffix is added.
    pub fn allocate(&self, file_name: &str, replacing: Option<&Path>) -> PathBuf {
        let candidate = self.reports_dir.join(file_name);
        if !candidate.exists() || replacing == Some(candidate.as_path()) {
            return candidate;
        }

        let stem = file_name.strip_suffix(".pdf").unwrap_or(file_name);
        (2..)
            .map(|n| self.reports_dir.join(format!("{stem}_{n}.pdf")))
            .find(|p| !p.exists() || replacing == Some(p.as_path()))
            .unwrap_or(candidate)
    }

    fn candidates(&self, stored: &str) -> Vec<PathBuf> {
        let stored_path = Path::new(stored);
        let mut candidates = Vec::new();

        if stored_path.is_absolute() {
            candidates.push(stored_path.to_path_buf());
        } else if let Ok(cwd) = std::env::current_dir() {
            candidates.push(cwd.join(stored_path));
        }

        if let Some(base) = stored_path.file_name() {
            candidates.push(self.reports_dir.join(base));
            for root in &self.search_roots {
                candidates.push(root.join(GENERATED_DIR_NAME).join(base));
            }
        }

        candidates
    }

    /// Where a stored artifact path currently lives on disk, if anywhere.
    pub fn resolve(&self, stored: &str) -> Option<PathBuf> {
        if stored.trim().is_empty() {
            return None;
        }
        self.candidates(stored).into_iter().find(|p| p.is_file())
    }

    pub fn is_available(&self, stored: Option<&str>) -> bool {
        stored.and_then(|s| self.resolve(s)).is_some()
    }

    /// Deletes an artifact; a file that is already gone is not an error.
    pub async fn remove(&self, path: &Path) -> Result<bool, StorageError> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(StorageError::Remove {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Moves an artifact into the backup directory under a timestamped name.
    pub async fn relocate_to_backup(&self, path: &Path) -> Result<PathBuf, StorageError> {
        ensure_dir(&self.backup_dir).await?;

        let base = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "report.pdf".to_string());
        let target = self.backup_dir.join(backup_name(&base, Utc::now()));

        if let Err(rename_err) = fs::rename(path, &target).await {
            // rename fails across filesystems; fall back to copy + remove
            if fs::copy(path, &target).await.is_err() {
                return Err(StorageError::Move {
                    from: path.to_path_buf(),
                    to: target,
                    source: rename_err,
                });
            }
            self.remove(path).await?;
        }

        Ok(target)
    }
}

pub fn backup_name(base: &str, at: DateTime<Utc>) -> String {
    format!("{}_{base}", at.format("%Y-%m-%dT%H-%M-%S-%3fZ"))
}

/// Check-then-create; `create_dir_all` tolerates a concurrent creator.
pub async fn ensure_dir(path: &Path) -> Result<(), StorageError> {
    if fs::metadata(path).await.map(|m| m.is_dir()).unwrap_or(false) {
        return Ok(());
    }
    fs::create_dir_all(path)
        .await
        .map_err(|source| StorageError::CreateDir {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn service(root: &Path) -> StorageService {
        StorageService::new(root.join("out"), root.join("backup"))
            .with_search_roots(vec![root.join("alt")])
    }

    #[test]
    fn backup_name_is_timestamp_prefixed() {
        let at = Utc.with_ymd_and_hms(2026, 5, 1, 13, 4, 5).unwrap();
        assert_eq!(
            backup_name("2026.05.01_SiteA_safety_XX.pdf", at),
            "2026-05-01T13-04-05-000Z_2026.05.01_SiteA_safety_XX.pdf"
        );
    }

    #[tokio::test]
    async fn resolves_absolute_path_first() {
        let dir = tempdir().unwrap();
        let storage = service(dir.path());
        storage.init().await.unwrap();

        let file = storage.reports_dir().join("a.pdf");
        std::fs::write(&file, b"%PDF").unwrap();

        assert_eq!(storage.resolve(file.to_str().unwrap()), Some(file.clone()));
        assert!(storage.is_available(Some(file.to_str().unwrap())));
    }

    #[tokio::test]
    async fn falls_back_to_basename_under_known_roots() {
        let dir = tempdir().unwrap();
        let storage = service(dir.path());
        storage.init().await.unwrap();

        // stale absolute path from another deployment layout
        let moved = dir.path().join("alt").join(GENERATED_DIR_NAME);
        std::fs::create_dir_all(&moved).unwrap();
        std::fs::write(moved.join("b.pdf"), b"%PDF").unwrap();

        let resolved = storage.resolve("/nonexistent/elsewhere/b.pdf");
        assert_eq!(resolved, Some(moved.join("b.pdf")));
    }

    #[tokio::test]
    async fn missing_artifact_resolves_to_none() {
        let dir = tempdir().unwrap();
        let storage = service(dir.path());
        assert_eq!(storage.resolve("/nonexistent/c.pdf"), None);
        assert_eq!(storage.resolve(""), None);
        assert!(!storage.is_available(None));
    }

    #[tokio::test]
    async fn allocate_never_clobbers_foreign_artifact() {
        let dir = tempdir().unwrap();
        let storage = service(dir.path());
        storage.init().await.unwrap();

        let first = storage.allocate("r.pdf", None);
        assert_eq!(first, storage.reports_dir().join("r.pdf"));
        std::fs::write(&first, b"%PDF").unwrap();

        let second = storage.allocate("r.pdf", None);
        assert_eq!(second, storage.reports_dir().join("r_2.pdf"));

        let own = storage.allocate("r.pdf", Some(first.as_path()));
        assert_eq!(own, first);
    }

    #[tokio::test]
    async fn relocation_moves_file_into_backup() {
        let dir = tempdir().unwrap();
        let storage = service(dir.path());
        storage.init().await.unwrap();

        let file = storage.reports_dir().join("d.pdf");
        std::fs::write(&file, b"%PDF").unwrap();

        let moved = storage.relocate_to_backup(&file).await.unwrap();
        assert!(!file.exists());
        assert!(moved.exists());
        assert!(moved.starts_with(storage.backup_dir()));
        let name = moved.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.ends_with("_d.pdf"), "{name}");
    }

    #[tokio::test]
    async fn relocating_missing_file_fails() {
        let dir = tempdir().unwrap();
        let storage = service(dir.path());
        let result = storage.relocate_to_backup(&dir.path().join("gone.pdf")).await;
        assert!(matches!(result, Err(StorageError::Move { .. })));
    }

    #[tokio::test]
    async fn remove_tolerates_missing_file() {
        let dir = tempdir().unwrap();
        let storage = service(dir.path());
        assert!(!storage.remove(&dir.path().join("gone.pdf")).await.unwrap());
    }

    #[tokio::test]
    async fn concurrent_first_use_directory_creation() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("deep").join("nested").join("backup");

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let target = target.clone();
                tokio::spawn(async move { ensure_dir(&target).await })
            })
            .collect();

        for result in futures::future::join_all(tasks).await {
            result.unwrap().unwrap();
        }
        assert!(target.is_dir());
    }
}
