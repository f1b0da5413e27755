//! Deckmine Store - Document blob storage
//!
//! Uploads source slide decks (and related files) into PostgreSQL and
//! lists what is stored. A thin I/O wrapper: no extraction logic lives
//! here. Per-file upload failures are captured in the returned outcomes
//! rather than aborting the batch.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::FromRow;
use tracing::{info, warn};
use uuid::Uuid;

use deckmine_core::{DeckmineError, Result};

// ============================================================================
// Models
// ============================================================================

/// Metadata for one stored file
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StoredFile {
    pub id: Uuid,
    pub file_name: String,
    pub content_type: String,
    pub size: i64,
    pub uploaded_at: DateTime<Utc>,
}

/// Result of one file upload attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum UploadOutcome {
    Success {
        id: Uuid,
        file_name: String,
        size: i64,
        content_type: String,
    },
    Failed {
        file_name: String,
        error: String,
    },
}

impl UploadOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Content type inferred from a file extension
fn content_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("pptx") | Some("ppt") => {
            "application/vnd.openxmlformats-officedocument.presentationml.presentation"
        }
        Some("pdf") => "application/pdf",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        _ => "application/octet-stream",
    }
}

// ============================================================================
// Store
// ============================================================================

/// PostgreSQL-backed document store
pub struct DocumentStore {
    pool: PgPool,
}

impl DocumentStore {
    /// Connect to the store
    pub async fn new(database_url: &str, pool_size: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(pool_size)
            .connect(database_url)
            .await
            .map_err(|e| DeckmineError::Database(format!("PostgreSQL connection failed: {e}")))?;

        Ok(Self { pool })
    }

    /// Create from an existing pool
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Initialize the files table (run once on setup)
    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS files (
                id UUID PRIMARY KEY,
                file_name TEXT NOT NULL,
                content_type TEXT NOT NULL,
                size BIGINT NOT NULL,
                data BYTEA NOT NULL,
                uploaded_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DeckmineError::Database(format!("Schema init failed: {e}")))?;

        Ok(())
    }

    /// Upload a single file, returning its assigned id
    pub async fn upload_file(&self, path: &Path) -> Result<Uuid> {
        let data = tokio::fs::read(path)
            .await
            .map_err(|e| DeckmineError::Database(format!("read {}: {e}", path.display())))?;

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unnamed")
            .to_string();
        let content_type = content_type_for(path);
        let id = Uuid::new_v4();

        sqlx::query(
            "INSERT INTO files (id, file_name, content_type, size, data) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(id)
        .bind(&file_name)
        .bind(content_type)
        .bind(data.len() as i64)
        .bind(&data)
        .execute(&self.pool)
        .await
        .map_err(|e| DeckmineError::Database(format!("insert {file_name}: {e}")))?;

        info!(%id, file_name, size = data.len(), "file uploaded");
        Ok(id)
    }

    /// Upload every regular file under `dir` (recursively).
    ///
    /// Individual failures are recorded per file; the walk continues.
    pub async fn upload_directory(&self, dir: &Path) -> Result<Vec<UploadOutcome>> {
        let files = collect_files(dir)?;
        if files.is_empty() {
            warn!(dir = %dir.display(), "no files to upload");
            return Ok(Vec::new());
        }

        info!(count = files.len(), dir = %dir.display(), "uploading files");

        let mut outcomes = Vec::with_capacity(files.len());
        for path in files {
            let file_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("unnamed")
                .to_string();
            let size = std::fs::metadata(&path).map(|m| m.len() as i64).unwrap_or(0);

            match self.upload_file(&path).await {
                Ok(id) => outcomes.push(UploadOutcome::Success {
                    id,
                    file_name,
                    size,
                    content_type: content_type_for(&path).to_string(),
                }),
                Err(e) => {
                    warn!(file_name, error = %e, "upload failed");
                    outcomes.push(UploadOutcome::Failed {
                        file_name,
                        error: e.to_string(),
                    });
                }
            }
        }

        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
        info!(
            succeeded,
            failed = outcomes.len() - succeeded,
            "upload finished"
        );

        Ok(outcomes)
    }

    /// List stored files (metadata only, no blob data)
    pub async fn list_files(&self) -> Result<Vec<StoredFile>> {
        sqlx::query_as::<_, StoredFile>(
            "SELECT id, file_name, content_type, size, uploaded_at FROM files ORDER BY uploaded_at",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DeckmineError::Database(format!("list files: {e}")))
    }
}

/// Regular files under `dir`, recursively, in directory-walk order
fn collect_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(DeckmineError::Database(format!(
            "not a directory: {}",
            dir.display()
        )));
    }

    let mut files = Vec::new();
    let mut stack = vec![dir.to_path_buf()];
    while let Some(current) = stack.pop() {
        let entries = std::fs::read_dir(&current)
            .map_err(|e| DeckmineError::Database(format!("read dir {}: {e}", current.display())))?;
        for entry in entries {
            let path = entry
                .map_err(|e| DeckmineError::Database(format!("read dir entry: {e}")))?
                .path();
            if path.is_dir() {
                stack.push(path);
            } else {
                files.push(path);
            }
        }
    }

    Ok(files)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_inference() {
        assert_eq!(
            content_type_for(Path::new("deck.pptx")),
            "application/vnd.openxmlformats-officedocument.presentationml.presentation"
        );
        assert_eq!(content_type_for(Path::new("paper.PDF")), "application/pdf");
        assert_eq!(content_type_for(Path::new("img.jpeg")), "image/jpeg");
        assert_eq!(
            content_type_for(Path::new("blob.bin")),
            "application/octet-stream"
        );
        assert_eq!(
            content_type_for(Path::new("noext")),
            "application/octet-stream"
        );
    }

    #[test]
    fn test_collect_files_recurses() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("a.pptx"), b"x").unwrap();
        std::fs::write(dir.path().join("nested/b.pdf"), b"y").unwrap();

        let files = collect_files(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_collect_files_rejects_non_directory() {
        assert!(collect_files(Path::new("/definitely/not/here")).is_err());
    }

    #[test]
    fn test_upload_outcome_status() {
        let ok = UploadOutcome::Success {
            id: Uuid::new_v4(),
            file_name: "deck.pptx".into(),
            size: 10,
            content_type: "application/pdf".into(),
        };
        let bad = UploadOutcome::Failed {
            file_name: "deck.pptx".into(),
            error: "boom".into(),
        };
        assert!(ok.is_success());
        assert!(!bad.is_success());
    }
}
