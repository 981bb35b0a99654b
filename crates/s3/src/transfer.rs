//! Local side of directory transfers

use std::path::{Path, PathBuf};

use spaces_core::{Error, Result};

/// A file found under an upload root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    /// Path on disk
    pub path: PathBuf,
    /// Path relative to the root, `/`-separated
    pub relative: String,
}

/// Every regular file under `root`, sorted by relative path
///
/// Symlinks are not followed.
pub async fn walk_files(root: &Path) -> Result<Vec<LocalFile>> {
    if !tokio::fs::metadata(root).await?.is_dir() {
        return Err(Error::InvalidPath(format!(
            "{} is not a directory",
            root.display()
        )));
    }

    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let mut entries = tokio::fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let file_type = entry.file_type().await?;
            let path = entry.path();
            if file_type.is_dir() {
                pending.push(path);
            } else if file_type.is_file() {
                let relative = relative_key(root, &path)?;
                files.push(LocalFile { path, relative });
            }
        }
    }

    files.sort_by(|a, b| a.relative.cmp(&b.relative));
    Ok(files)
}

fn relative_key(root: &Path, path: &Path) -> Result<String> {
    let relative = path
        .strip_prefix(root)
        .map_err(|_| Error::InvalidPath(format!("{} is outside {}", path.display(), root.display())))?;

    let parts = relative
        .components()
        .map(|c| {
            c.as_os_str()
                .to_str()
                .map(str::to_string)
                .ok_or_else(|| Error::InvalidPath(format!("Non UTF-8 path: {}", path.display())))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(parts.join("/"))
}

/// Object key for a file uploaded under `prefix`
pub fn key_for(prefix: &str, relative: &str) -> String {
    if prefix.is_empty() || prefix.ends_with('/') {
        format!("{prefix}{relative}")
    } else {
        format!("{prefix}/{relative}")
    }
}

/// Sibling of `dest` that a download streams into before being renamed
pub fn partial_path(dest: &Path) -> PathBuf {
    let name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    dest.with_file_name(format!(".{name}.part"))
}

/// Move a finished download into place, or discard it if writing failed
pub async fn finish_partial(partial: &Path, dest: &Path, written: Result<()>) -> Result<()> {
    if let Err(e) = written {
        if let Err(cleanup) = tokio::fs::remove_file(partial).await {
            tracing::debug!(path = %partial.display(), error = %cleanup, "Could not remove partial download");
        }
        return Err(e);
    }
    tokio::fs::rename(partial, dest).await?;
    Ok(())
}

/// Local destination for `key` downloaded from under `prefix`
///
/// The prefix is stripped. Returns `None` for directory markers and for keys
/// that would escape `local`.
pub fn local_path_for(local: &Path, prefix: &str, key: &str) -> Option<PathBuf> {
    let rest = key.strip_prefix(prefix)?;
    if !prefix.is_empty() && !prefix.ends_with('/') && !rest.starts_with('/') {
        return None;
    }
    let relative = rest.trim_start_matches('/');
    if relative.is_empty() || relative.ends_with('/') {
        return None;
    }

    let mut dest = local.to_path_buf();
    for part in relative.split('/') {
        if part.is_empty() || part == "." || part == ".." {
            return None;
        }
        dest.push(part);
    }
    Some(dest)
}
