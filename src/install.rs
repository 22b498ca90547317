//! Unpacking a downloaded CLI build

use std::{
    fs::{self, File},
    io::{self, BufReader},
    path::{Path, PathBuf},
};

use bzip2::read::BzDecoder;
use tracing::debug;

use crate::error::Error;

#[cfg(unix)]
const EXECUTABLE_MODE: u32 = 0o755;

/// Decompresses the bz2 file at `input` into `output_dir/binary_name` and
/// marks it executable. Returns the path of the binary.
pub fn extract_binary(
    input: &Path,
    output_dir: &Path,
    binary_name: &str,
) -> Result<PathBuf, Error> {
    debug!("extracting {} to {}", input.display(), output_dir.display());

    let extraction_err = |source: io::Error| Error::Extraction {
        path: input.display().to_string(),
        source,
    };

    let binary_path = output_dir.join(binary_name);
    let compressed = File::open(input).map_err(extraction_err)?;
    let mut decoder = BzDecoder::new(BufReader::new(compressed));
    let mut binary = File::create(&binary_path).map_err(extraction_err)?;
    io::copy(&mut decoder, &mut binary).map_err(extraction_err)?;

    // close file before changing its mode
    drop(binary);
    set_executable(&binary_path)?;

    Ok(binary_path)
}

#[cfg(unix)]
fn set_executable(path: &Path) -> Result<(), Error> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(EXECUTABLE_MODE))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> Result<(), Error> {
    Ok(())
}

/// Creates a fresh `setops-*` directory under the system temp dir. It is kept
/// after this process exits so later workflow steps can use the CLI.
pub fn create_install_dir() -> Result<PathBuf, Error> {
    Ok(tempfile::Builder::new()
        .prefix("setops-")
        .tempdir()?
        .keep())
}
