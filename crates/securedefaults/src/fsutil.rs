//! Owner-only file writes shared by the file-backed collaborators.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Create `dir` (and parents) with mode 0700 on Unix. Existing directories
/// are left as they are.
pub(crate) fn ensure_private_dir(dir: &Path) -> io::Result<()> {
    if dir.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(dir)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(dir, fs::Permissions::from_mode(0o700))?;
    }

    Ok(())
}

/// Atomically replace `path` with `data`, mode 0600 on Unix.
///
/// The bytes go to a sibling temp file first and are renamed over the
/// target, so a crash never leaves a half-written file behind.
pub(crate) fn write_private(path: &Path, data: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_private_dir(parent)?;
    }

    let temp_path = path.with_extension("tmp");
    // A stale temp file would keep its old mode through the open below.
    match fs::remove_file(&temp_path) {
        Err(err) if err.kind() != io::ErrorKind::NotFound => return Err(err),
        _ => {}
    }

    let mut file = private_options().open(&temp_path)?;
    file.write_all(data)?;
    file.sync_all()?;
    drop(file);

    fs::rename(&temp_path, path)
}

/// Options for a new file that is owner-only from the moment it exists.
fn private_options() -> fs::OpenOptions {
    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options
}
