//! GitHub Actions runner integration
//!
//! See the [workflow commands](https://docs.github.com/en/actions/using-workflows/workflow-commands-for-github-actions)
//! docs for the formats used here.

use std::{
    env,
    ffi::OsString,
    fs::OpenOptions,
    io::{self, Write},
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::error::Error;

pub const DEPENDABOT_ACTOR: &str = "dependabot[bot]";

/// Whether the run was triggered by Dependabot, which gets its own secrets.
pub fn is_dependabot(actor: Option<&str>) -> bool {
    actor == Some(DEPENDABOT_ACTOR)
}

/// Whether the runner has step debug logging enabled.
pub fn runner_debug() -> bool {
    env::var("RUNNER_DEBUG").is_ok_and(|v| v == "1")
}

fn escape_data(msg: &str) -> String {
    msg.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// The `::error::` command marking the step as failed with `msg`.
pub fn error_command(msg: &str) -> String {
    format!("::error::{}", escape_data(msg))
}

pub fn set_failed(msg: &str) {
    println!("{}", error_command(msg));
}

/// Directories added to the search path during this run.
///
/// Additions are appended to the runner's `GITHUB_PATH` file, if any, so they
/// persist for later steps, and are prepended to the `PATH` handed to
/// subprocesses of this run.
#[derive(Debug, Default)]
pub struct SearchPath {
    github_path: Option<PathBuf>,
    // newest first
    added: Vec<PathBuf>,
}

impl SearchPath {
    pub fn new(github_path: Option<PathBuf>) -> Self {
        Self {
            github_path,
            added: Vec::new(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(
            env::var_os("GITHUB_PATH")
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
        )
    }

    pub fn add(&mut self, dir: &Path) -> Result<(), Error> {
        if let Some(github_path) = &self.github_path {
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(github_path)?;
            writeln!(file, "{}", dir.display())?;
        }

        debug!("added {} to the search path", dir.display());
        self.added.insert(0, dir.to_path_buf());
        Ok(())
    }

    pub fn added(&self) -> &[PathBuf] {
        &self.added
    }

    /// `PATH` for subprocesses: the added directories ahead of the inherited ones.
    pub fn joined(&self) -> Result<OsString, Error> {
        let inherited = env::var_os("PATH");
        let paths = self
            .added
            .iter()
            .cloned()
            .chain(inherited.iter().flat_map(env::split_paths));

        env::join_paths(paths)
            .map_err(|err| Error::Io(io::Error::new(io::ErrorKind::InvalidInput, err)))
    }
}
