//! Local filesystem queries.

use chrono::{DateTime, Utc};
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

pub(super) fn name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// `child` below `parent`. Root and drive prefixes in `child` are dropped, so
/// `"/etc"` joins like `"etc"`.
pub(super) fn join(parent: &Path, child: &str) -> PathBuf {
    let relative: PathBuf = Path::new(child)
        .components()
        .filter(|c| !matches!(c, Component::Prefix(_) | Component::RootDir))
        .collect();
    parent.join(relative).components().collect()
}

fn is_dotfile(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}

#[cfg(windows)]
pub(super) fn is_hidden(path: &Path) -> bool {
    use std::os::windows::fs::MetadataExt;
    const FILE_ATTRIBUTE_HIDDEN: u32 = 0x2;
    match fs::metadata(path) {
        Ok(m) => m.file_attributes() & FILE_ATTRIBUTE_HIDDEN != 0,
        Err(_) => is_dotfile(path),
    }
}

#[cfg(not(windows))]
pub(super) fn is_hidden(path: &Path) -> bool {
    is_dotfile(path)
}

#[cfg(unix)]
fn access(path: &Path, mode: libc::c_int) -> bool {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;
    let Ok(c_path) = CString::new(path.as_os_str().as_bytes()) else {
        return false;
    };
    // SAFETY: c_path is a valid NUL-terminated string for the duration of the call.
    unsafe { libc::access(c_path.as_ptr(), mode) == 0 }
}

#[cfg(unix)]
pub(super) fn can_read(path: &Path) -> bool {
    access(path, libc::R_OK)
}

#[cfg(unix)]
pub(super) fn can_write(path: &Path) -> bool {
    access(path, libc::W_OK)
}

#[cfg(not(unix))]
pub(super) fn can_read(path: &Path) -> bool {
    fs::metadata(path).is_ok()
}

#[cfg(not(unix))]
pub(super) fn can_write(path: &Path) -> bool {
    fs::metadata(path)
        .map(|m| !m.permissions().readonly())
        .unwrap_or(false)
}

/// Child names of a directory, sorted so repeated listings agree.
pub(super) fn list(path: &Path) -> io::Result<Vec<String>> {
    let mut names = fs::read_dir(path)?
        .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
        .collect::<io::Result<Vec<_>>>()?;
    names.sort();
    Ok(names)
}

pub(super) fn length(path: &Path) -> Option<u64> {
    let meta = fs::metadata(path).ok()?;
    meta.is_file().then(|| meta.len())
}

pub(super) fn last_modified(path: &Path) -> Option<DateTime<Utc>> {
    let modified = fs::metadata(path).ok()?.modified().ok()?;
    Some(DateTime::<Utc>::from(modified))
}

/// Resolves symlinks and `..` like `fs::canonicalize`, but also accepts paths
/// that do not exist: the longest existing prefix is resolved by the OS and the
/// remaining components are applied lexically.
pub(super) fn canonicalize(path: &Path) -> io::Result<PathBuf> {
    let mut existing = path.to_path_buf();
    let mut rest: Vec<OsString> = Vec::new();
    loop {
        match fs::canonicalize(&existing) {
            Ok(mut resolved) => {
                for part in rest.iter().rev() {
                    if part == ".." {
                        resolved.pop();
                    } else {
                        resolved.push(part);
                    }
                }
                return Ok(resolved);
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let part = match existing.components().next_back() {
                    Some(Component::Normal(n)) => n.to_os_string(),
                    Some(Component::ParentDir) => OsString::from(".."),
                    // Nothing left to strip; fall back to the input.
                    _ => return Ok(path.to_path_buf()),
                };
                rest.push(part);
                existing.pop();
            }
            Err(e) => return Err(e),
        }
    }
}

/// Creates the file only if it does not exist yet. `Ok(false)` if it did.
pub(super) fn create_new_file(path: &Path) -> io::Result<bool> {
    match fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
    {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(e),
    }
}

/// Removes a file, or a directory if it is empty.
pub(super) fn delete(path: &Path) -> io::Result<()> {
    if fs::symlink_metadata(path)?.is_dir() {
        fs::remove_dir(path)
    } else {
        fs::remove_file(path)
    }
}
