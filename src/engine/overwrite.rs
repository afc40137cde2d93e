use std::{fs, path::Path};

use tracing::debug;

use crate::error::OverwriteError;

/// Replace `original` with `temp`: remove first, then rename.
///
/// This is deliberately two steps and not atomic. If removing fails nothing
/// has changed except that `temp` is left behind. If renaming fails the
/// original is already gone and the converted data only lives in `temp`.
///
/// # Errors
///
/// `OverwriteError::Remove` or `OverwriteError::Rename`, depending on which
/// step failed.
pub fn overwrite_input(original: &Path, temp: &Path) -> Result<(), OverwriteError> {
    fs::remove_file(original).map_err(|source| OverwriteError::Remove {
        path: original.to_path_buf(),
        temp: temp.to_path_buf(),
        source,
    })?;
    debug!(path = %original.display(), "removed input file");

    fs::rename(temp, original).map_err(|source| OverwriteError::Rename {
        from: temp.to_path_buf(),
        to: original.to_path_buf(),
        source,
    })?;
    debug!(from = %temp.display(), to = %original.display(), "renamed output over input");
    Ok(())
}
