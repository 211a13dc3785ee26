//! File system based parameter store
//!
//! Layout under the store root:
//!
//! ```text
//! parameters/<name>.yaml   one definition per parameter (hand-authored files
//!                          may hold several documents)
//! audit/<name>.jsonl       one JSON audit record per line
//! ```
//!
//! Saves write a temporary file next to the target and rename it into place,
//! so a reader or a crash never sees a half-written definition.

use async_trait::async_trait;
use path_absolutize::Absolutize;
use stagegate_core::{AuditRecord, ParamName, Parameter, ParameterDefinition};
use stagegate_parser::ParameterParser;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::{error::RepositoryError, traits::ParameterStore, RepositoryResult};

const PARAMETERS_DIR: &str = "parameters";
const AUDIT_DIR: &str = "audit";

/// Distinguishes temporary files of overlapping writes to the same target
static WRITE_SEQ: AtomicU64 = AtomicU64::new(0);

/// File system based parameter store
#[derive(Debug, Clone)]
pub struct FileSystemStore {
    /// Root path of the store
    root_path: PathBuf,
}

impl FileSystemStore {
    /// Open a store rooted at an existing directory
    pub fn new<P: AsRef<Path>>(root_path: P) -> RepositoryResult<Self> {
        let path = root_path.as_ref();

        if !path.is_dir() {
            return Err(RepositoryError::InvalidPath {
                path: path.to_path_buf(),
            });
        }

        let abs_path = path
            .absolutize()
            .map_err(|e| RepositoryError::Other(format!("Failed to absolutize path: {}", e)))?
            .to_path_buf();

        Ok(Self {
            root_path: abs_path,
        })
    }

    /// Open a store, creating the root directory if needed
    pub async fn create<P: AsRef<Path>>(root_path: P) -> RepositoryResult<Self> {
        fs::create_dir_all(root_path.as_ref()).await?;
        Self::new(root_path)
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    fn parameter_path(&self, name: &ParamName) -> PathBuf {
        self.root_path
            .join(PARAMETERS_DIR)
            .join(format!("{}.yaml", name))
    }

    fn audit_path(&self, name: &ParamName) -> PathBuf {
        self.root_path.join(AUDIT_DIR).join(format!("{}.jsonl", name))
    }

    /// YAML files directly under `parameters/`, sorted by file name
    async fn definition_files(&self) -> RepositoryResult<Vec<PathBuf>> {
        let dir = self.root_path.join(PARAMETERS_DIR);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        let mut entries = fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_yaml = matches!(
                path.extension().and_then(|s| s.to_str()),
                Some("yaml") | Some("yml")
            );
            let is_hidden = path
                .file_name()
                .and_then(|s| s.to_str())
                .map_or(true, |s| s.starts_with('.'));
            if is_yaml && !is_hidden && path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Write `content` to `path` through a temporary file and a rename
    async fn write_atomic(path: &Path, content: &[u8]) -> RepositoryResult<()> {
        let parent = path.parent().ok_or_else(|| RepositoryError::InvalidPath {
            path: path.to_path_buf(),
        })?;
        fs::create_dir_all(parent).await?;

        let file_name = path
            .file_name()
            .and_then(|s| s.to_str())
            .ok_or_else(|| RepositoryError::InvalidPath {
                path: path.to_path_buf(),
            })?;
        let seq = WRITE_SEQ.fetch_add(1, Ordering::Relaxed);
        let tmp_path = parent.join(format!(
            ".{}.{}.{}.tmp",
            file_name,
            std::process::id(),
            seq
        ));

        let mut file = fs::File::create(&tmp_path).await?;
        file.write_all(content).await?;
        file.sync_all().await?;
        drop(file);

        if let Err(e) = fs::rename(&tmp_path, path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }
        Ok(())
    }
}

#[async_trait]
impl ParameterStore for FileSystemStore {
    async fn load_all_parameters(&self) -> RepositoryResult<Vec<ParameterDefinition>> {
        let mut definitions = Vec::new();

        for path in self.definition_files().await? {
            let content = fs::read_to_string(&path).await?;
            let parsed = ParameterParser::parse_all(&content).map_err(|e| {
                RepositoryError::Parser(format!("{}: {}", path.display(), e))
            })?;
            debug!(
                "Loaded {} definition(s) from {}",
                parsed.len(),
                path.display()
            );
            definitions.extend(parsed);
        }

        Ok(definitions)
    }

    async fn save_parameter(&self, parameter: &Parameter) -> RepositoryResult<()> {
        let definition = ParameterDefinition::from(parameter);
        let content = serde_yaml::to_string(&definition)?;
        let path = self.parameter_path(&parameter.name);

        Self::write_atomic(&path, content.as_bytes()).await?;
        debug!(
            "Saved parameter '{}' revision {} to {}",
            parameter.name,
            parameter.revision,
            path.display()
        );
        Ok(())
    }

    async fn remove_parameter(&self, name: &ParamName) -> RepositoryResult<()> {
        let path = self.parameter_path(name);
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!("Removed parameter '{}' from {}", name, path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn append_audit(&self, record: &AuditRecord) -> RepositoryResult<()> {
        let path = self.audit_path(&record.parameter);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    async fn load_audit(&self, name: &ParamName) -> RepositoryResult<Vec<AuditRecord>> {
        let path = self.audit_path(name);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&path).await?;
        let mut records = Vec::new();
        for (index, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<AuditRecord>(line) {
                Ok(record) => records.push(record),
                // a torn final line from an interrupted append
                Err(e) => warn!(
                    "Skipping unreadable audit line {} in {}: {}",
                    index + 1,
                    path.display(),
                    e
                ),
            }
        }
        Ok(records)
    }
}
