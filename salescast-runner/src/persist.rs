//! All-or-nothing output writes.
//!
//! Every file is first written to a temp sibling (`<name>.tmp`). Only when all
//! temp files exist are they renamed into place; an existing target is moved
//! to `<name>.bak` first so a failed commit can put it back. Either every
//! target holds its new contents, or every target is as it was before.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::PipelineError;

/// A file to write: target path and full contents.
#[derive(Debug, Clone)]
pub struct PendingFile {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

impl PendingFile {
    pub fn new(path: impl Into<PathBuf>, bytes: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            bytes,
        }
    }
}

#[derive(Debug)]
struct Staged {
    target: PathBuf,
    tmp: PathBuf,
}

/// Write every file or none of them.
pub fn write_all_or_nothing(files: &[PendingFile]) -> Result<(), PipelineError> {
    let staged = stage(files)?;
    commit(&staged)?;
    tracing::debug!(files = staged.len(), "committed outputs");
    Ok(())
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(suffix);
    path.with_file_name(name)
}

fn write_error(path: &Path) -> impl FnOnce(std::io::Error) -> PipelineError + '_ {
    move |source| PipelineError::Write {
        path: path.to_path_buf(),
        source,
    }
}

fn stage(files: &[PendingFile]) -> Result<Vec<Staged>, PipelineError> {
    let mut staged = Vec::with_capacity(files.len());
    for file in files {
        match stage_one(file) {
            Ok(s) => staged.push(s),
            Err(e) => {
                discard(&staged);
                return Err(e);
            }
        }
    }
    Ok(staged)
}

fn stage_one(file: &PendingFile) -> Result<Staged, PipelineError> {
    if file.path.is_dir() {
        return Err(PipelineError::Write {
            path: file.path.clone(),
            source: std::io::Error::other("target is a directory"),
        });
    }
    if let Some(parent) = file.path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_error(&file.path))?;
    }
    let tmp = sibling(&file.path, ".tmp");
    fs::write(&tmp, &file.bytes).map_err(write_error(&tmp))?;
    Ok(Staged {
        target: file.path.clone(),
        tmp,
    })
}

fn discard(staged: &[Staged]) {
    for s in staged {
        let _ = fs::remove_file(&s.tmp);
    }
}

fn commit(staged: &[Staged]) -> Result<(), PipelineError> {
    // (target, backup of the previous contents)
    let mut done: Vec<(&Path, Option<PathBuf>)> = Vec::with_capacity(staged.len());

    for (i, s) in staged.iter().enumerate() {
        let backup = if s.target.exists() {
            let bak = sibling(&s.target, ".bak");
            if let Err(e) = fs::rename(&s.target, &bak) {
                roll_back(&done);
                discard(&staged[i..]);
                return Err(write_error(&s.target)(e));
            }
            Some(bak)
        } else {
            None
        };

        if let Err(e) = fs::rename(&s.tmp, &s.target) {
            done.push((s.target.as_path(), backup));
            roll_back(&done);
            discard(&staged[i..]);
            return Err(write_error(&s.target)(e));
        }
        done.push((s.target.as_path(), backup));
    }

    for (_, backup) in done {
        if let Some(bak) = backup {
            let _ = fs::remove_file(bak);
        }
    }
    Ok(())
}

fn roll_back(done: &[(&Path, Option<PathBuf>)]) {
    for (target, backup) in done.iter().rev() {
        let _ = fs::remove_file(target);
        if let Some(bak) = backup {
            if let Err(e) = fs::rename(bak, target) {
                tracing::error!(path = %target.display(), error = %e, "failed to restore previous output");
            }
        }
    }
    tracing::warn!(files = done.len(), "rolled back partially committed outputs");
}
