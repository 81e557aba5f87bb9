use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use fastrace::trace;
use tempfile::{NamedTempFile, PersistError};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum LineFileError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Failed to replace file: {0}")]
    Persist(#[from] PersistError),
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Creates an empty file at `path` (and its parent directories) if nothing is there.
///
/// Returns `true` when the file was created.
#[trace]
pub fn ensure_file(path: &Path) -> Result<bool, LineFileError> {
    if path.exists() {
        return Ok(false);
    }
    fs::create_dir_all(parent_dir(path))?;
    match File::options().write(true).create_new(true).open(path) {
        Ok(_) => {
            debug!("Created {}", path.display());
            Ok(true)
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Reads every line of `path`, without line terminators.
///
/// A missing file reads as empty.
#[trace]
pub fn read_lines(path: &Path) -> Result<Vec<String>, LineFileError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let lines = BufReader::new(file)
        .lines()
        .collect::<Result<Vec<_>, _>>()?;
    Ok(lines)
}

/// Follows symlinks so the link itself survives a rewrite.
fn resolve_target(path: &Path) -> Result<PathBuf, LineFileError> {
    match fs::canonicalize(path) {
        Ok(target) => Ok(target),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(path.to_path_buf()),
        Err(e) => Err(e.into()),
    }
}

/// Replaces the contents of `path` with `lines`, one per `\n`-terminated line.
///
/// The data goes to a temporary file in the same directory which is then
/// renamed over `path`, so readers see either the old or the new contents.
/// An existing file keeps its permissions, and a symlink keeps pointing at
/// the rewritten target.
#[trace]
pub fn write_lines<S: AsRef<str>>(path: &Path, lines: &[S]) -> Result<(), LineFileError> {
    let target = resolve_target(path)?;
    let dir = parent_dir(&target);
    fs::create_dir_all(&dir)?;

    let tmp = NamedTempFile::new_in(&dir)?;
    match fs::metadata(&target) {
        Ok(meta) => tmp.as_file().set_permissions(meta.permissions())?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }
    {
        let mut writer = BufWriter::new(tmp.as_file());
        for line in lines {
            writer.write_all(line.as_ref().as_bytes())?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(&target)?;

    debug!("Wrote {} line(s) to {}", lines.len(), target.display());
    Ok(())
}
