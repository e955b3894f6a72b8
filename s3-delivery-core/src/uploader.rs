//! Single-object uploads: a local file, or one sheet's CSV buffer.
//!
//! Uploads are fire-and-forget. In dry-run mode the store is never called and
//! the would-be key is logged instead. Any store error is logged with its
//! cause chain and reported as [`UploadOutcome::Failed`]; it never propagates,
//! so one failed object cannot stop the rest of a delivery.

use crate::contract::{ObjectStore, StoreError};
use crate::prefix::KeyPrefix;
use crate::workbook::SheetExport;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{error, info};

/// Result of one upload attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UploadOutcome {
    Uploaded,
    DryRun,
    Failed,
}

/// A local file and where it goes. Built per file at dispatch time and
/// consumed by [`upload_file`].
#[derive(Debug, Clone)]
pub struct UploadTarget {
    pub local_path: PathBuf,
    pub key: String,
    pub dry_run: bool,
}

pub async fn upload_file<S>(store: &S, target: UploadTarget) -> UploadOutcome
where
    S: ObjectStore + ?Sized,
{
    let path = target.local_path.display();
    if target.dry_run {
        info!(path = %path, key = %target.key, "Would upload file");
        return UploadOutcome::DryRun;
    }

    match store.put_file(&target.key, &target.local_path).await {
        Ok(()) => {
            info!(
                path = %path,
                url = %format!("s3://{}/{}", store.bucket(), target.key),
                "Uploaded file"
            );
            UploadOutcome::Uploaded
        }
        Err(e) => {
            let err = with_context(e, format!("uploading '{}' to '{}'", path, target.key));
            error!(path = %path, key = %target.key, error = ?err, "Error uploading file");
            UploadOutcome::Failed
        }
    }
}

/// Uploads one sheet's CSV under `<prefix><workbook stem>_<sheet>.csv`.
/// The export is consumed so its buffer is released once the attempt returns.
pub async fn upload_sheet<S>(
    store: &S,
    prefix: &KeyPrefix,
    export: SheetExport,
    dry_run: bool,
) -> UploadOutcome
where
    S: ObjectStore + ?Sized,
{
    let key = prefix.key_for(&export.object_name());
    let SheetExport {
        source_file,
        sheet_name,
        csv,
    } = export;

    if dry_run {
        info!(sheet = %sheet_name, workbook = %source_file, key = %key, "Would upload sheet");
        return UploadOutcome::DryRun;
    }

    match store.put_bytes(&key, csv).await {
        Ok(()) => {
            info!(
                sheet = %sheet_name,
                workbook = %source_file,
                url = %format!("s3://{}/{}", store.bucket(), key),
                "Uploaded sheet"
            );
            UploadOutcome::Uploaded
        }
        Err(e) => {
            let err = with_context(
                e,
                format!("uploading sheet '{}' from '{}' to '{}'", sheet_name, source_file, key),
            );
            error!(sheet = %sheet_name, workbook = %source_file, error = ?err, "Error uploading sheet");
            UploadOutcome::Failed
        }
    }
}

// anyhow captures a backtrace here when RUST_BACKTRACE or RUST_LIB_BACKTRACE is set.
fn with_context(e: StoreError, context: String) -> anyhow::Error {
    anyhow::anyhow!(e).context(context)
}
