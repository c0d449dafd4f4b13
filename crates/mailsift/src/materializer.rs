//! Writes matched attachments to a directory.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use crate::error::WriteError;
use crate::locator::Attachment;

/// Upper bound on `_N` suffixes tried by [`OverwritePolicy::Rename`].
const MAX_RENAME_ATTEMPTS: u32 = 10_000;

/// What to do when the destination file already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverwritePolicy {
    /// Fail with [`WriteError::AlreadyExists`].
    #[default]
    Reject,
    /// Truncate and rewrite the existing file.
    Replace,
    /// Write to `name_1.ext`, `name_2.ext`, ... instead.
    Rename,
}

/// Writes each attachment into `dir`, in order.
///
/// Returns the file names actually written. Stops at the first failure;
/// files written before it stay on disk. `dir` must already exist.
///
/// # Errors
///
/// Returns [`WriteError::UnsafeFilename`] for names that are not a single
/// plain path component, [`WriteError::AlreadyExists`] under
/// [`OverwritePolicy::Reject`], or [`WriteError::Io`] for any I/O failure.
pub async fn write_attachments(
    dir: &Path,
    attachments: &[Attachment],
    policy: OverwritePolicy,
) -> Result<Vec<String>, WriteError> {
    let mut written = Vec::with_capacity(attachments.len());
    for attachment in attachments {
        let name = write_one(dir, attachment, policy).await?;
        tracing::debug!(file = %name, bytes = attachment.data.len(), "Attachment written");
        written.push(name);
    }
    Ok(written)
}

async fn write_one(
    dir: &Path,
    attachment: &Attachment,
    policy: OverwritePolicy,
) -> Result<String, WriteError> {
    check_filename(&attachment.filename)?;

    match policy {
        OverwritePolicy::Reject => {
            let path = dir.join(&attachment.filename);
            create_new(&path, &attachment.data).await?;
            Ok(attachment.filename.clone())
        }
        OverwritePolicy::Replace => {
            let path = dir.join(&attachment.filename);
            write_file(&path, &attachment.data, false).await?;
            Ok(attachment.filename.clone())
        }
        OverwritePolicy::Rename => {
            for candidate in candidate_names(&attachment.filename) {
                match create_new(&dir.join(&candidate), &attachment.data).await {
                    Ok(()) => return Ok(candidate),
                    Err(WriteError::AlreadyExists { .. }) => {}
                    Err(err) => return Err(err),
                }
            }
            Err(WriteError::AlreadyExists {
                path: dir.join(&attachment.filename),
            })
        }
    }
}

async fn create_new(path: &Path, data: &[u8]) -> Result<(), WriteError> {
    write_file(path, data, true).await
}

async fn write_file(path: &Path, data: &[u8], exclusive: bool) -> Result<(), WriteError> {
    let mut options = OpenOptions::new();
    options.write(true);
    if exclusive {
        options.create_new(true);
    } else {
        options.create(true).truncate(true);
    }

    let io_err = |source: std::io::Error| {
        if source.kind() == ErrorKind::AlreadyExists {
            WriteError::AlreadyExists {
                path: path.to_path_buf(),
            }
        } else {
            WriteError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    };

    let mut file = options.open(path).await.map_err(io_err)?;
    file.write_all(data).await.map_err(io_err)?;
    file.flush().await.map_err(io_err)?;
    Ok(())
}

/// Rejects names that would escape the destination directory or are not
/// usable as a file name.
fn check_filename(filename: &str) -> Result<(), WriteError> {
    let unsafe_name = || WriteError::UnsafeFilename {
        filename: filename.to_string(),
    };

    if filename.is_empty() || filename.contains(['/', '\\', '\0']) {
        return Err(unsafe_name());
    }
    let mut components = Path::new(filename).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(unsafe_name()),
    }
}

/// `name.ext`, then `name_1.ext`, `name_2.ext`, ...
fn candidate_names(filename: &str) -> impl Iterator<Item = String> + '_ {
    let path = PathBuf::from(filename);
    let stem = path
        .file_stem()
        .map_or_else(|| filename.to_string(), |s| s.to_string_lossy().into_owned());
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().into_owned());

    std::iter::once(filename.to_string()).chain((1..MAX_RENAME_ATTEMPTS).map(move |i| {
        ext.as_ref()
            .map_or_else(|| format!("{stem}_{i}"), |ext| format!("{stem}_{i}.{ext}"))
    }))
}
