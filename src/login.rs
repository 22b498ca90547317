//! Non-interactive `setops login`

use std::{
    fmt, fs,
    io::Write,
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use tracing::info;

use crate::{actions::SearchPath, error::Error};

/// Service-user credentials, written to the login prompt in this order.
#[derive(Clone)]
pub struct LoginCredentials {
    pub organization: String,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("organization", &self.organization)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Creates `<home>/bin` and puts it on the search path. The CLI installs its
/// Docker credential helper there during login.
pub fn prepare_helper_dir(home: &Path, search_path: &mut SearchPath) -> Result<PathBuf, Error> {
    let bin_dir = home.join("bin");
    fs::create_dir_all(&bin_dir)?;
    search_path.add(&bin_dir)?;
    Ok(bin_dir)
}

/// Runs `<cli> login --url <api_url> --service-user` and answers its prompts
/// from `credentials`. Fails unless the CLI exits with code 0.
pub fn login(
    cli: &Path,
    credentials: &LoginCredentials,
    api_url: &str,
    search_path: &SearchPath,
) -> Result<(), Error> {
    info!(
        "Execute setops login for user {} in organization {}",
        credentials.username, credentials.organization
    );

    let mut child = Command::new(cli)
        .args(["login", "--url", api_url, "--service-user"])
        .env("PATH", search_path.joined()?)
        .stdin(Stdio::piped())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|err| Error::Login(format!("could not start {}: {err}", cli.display())))?;

    // stdin is closed when dropped at the end of this block
    let written = match child.stdin.take() {
        Some(mut stdin) => write!(
            stdin,
            "{}\n{}\n{}\n",
            credentials.organization, credentials.username, credentials.password
        ),
        None => Ok(()),
    };

    let status = child
        .wait()
        .map_err(|err| Error::Login(format!("could not wait for {}: {err}", cli.display())))?;

    match status.code() {
        Some(0) => {}
        Some(code) => return Err(Error::Login(format!("Process exited with code {code}"))),
        None => return Err(Error::Login("Process was terminated by a signal".to_string())),
    }

    written.map_err(|err| Error::Login(format!("could not write credentials: {err}")))
}
