/// `load_config` module: reads the static access-key credentials for the bucket from `S3.ini`.
///
/// This is the only place the credentials file is parsed. The expected layout is:
///
/// ```ini
/// [AWS]
/// AWS_ACCESS_KEY_ID=YOUR_ACCESS_KEY
/// AWS_SECRET_ACCESS_KEY=YOUR_SECRET_KEY
/// ```
///
/// # Errors
/// A missing file, a missing `[AWS]` section, or a missing or empty key all
/// fail with a [`CredentialsError`]. The CLI treats every one of them as fatal.
///
/// The section name must be `AWS` exactly. Key names inside it match without
/// regard to ASCII case, so `aws_access_key_id` is accepted too.
use ini::Ini;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Credentials file name, resolved against the current working directory.
pub const CONFIG_FILE: &str = "S3.ini";

const SECTION: &str = "AWS";
const ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
const SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";

/// Access-key pair, held in memory for one invocation only.
#[derive(Clone)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CredentialsError {
    #[error("configuration file '{}' not found", .0.display())]
    MissingFile(PathBuf),
    #[error("error reading '{}'", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: ini::Error,
    },
    #[error("'{}' has no [AWS] section with AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY", .path.display())]
    MissingSection { path: PathBuf },
    #[error("'{}' is missing {field} in its [AWS] section", .path.display())]
    MissingField { path: PathBuf, field: &'static str },
    #[error("{field} in '{}' is empty", .path.display())]
    EmptyField { path: PathBuf, field: &'static str },
}

/// Loads the `[AWS]` access key id and secret from the INI file at `path`.
pub fn load_credentials<P: AsRef<Path>>(path: P) -> Result<Credentials, CredentialsError> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading credentials from file");

    if !path_ref.is_file() {
        error!(config_path = ?path_ref, "Configuration file not found");
        return Err(CredentialsError::MissingFile(path_ref.to_path_buf()));
    }

    let conf = match Ini::load_from_file(path_ref) {
        Ok(conf) => conf,
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse credentials file");
            return Err(CredentialsError::Read {
                path: path_ref.to_path_buf(),
                source: e,
            });
        }
    };

    let section = conf
        .section(Some(SECTION))
        .ok_or_else(|| CredentialsError::MissingSection {
            path: path_ref.to_path_buf(),
        })?;

    let field = |name: &'static str| -> Result<String, CredentialsError> {
        let value = section
            .iter()
            .find(|(key, _)| key.trim().eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
            .ok_or_else(|| CredentialsError::MissingField {
                path: path_ref.to_path_buf(),
                field: name,
            })?
            .trim();
        if value.is_empty() {
            return Err(CredentialsError::EmptyField {
                path: path_ref.to_path_buf(),
                field: name,
            });
        }
        Ok(value.to_string())
    };

    let credentials = Credentials {
        access_key_id: field(ACCESS_KEY_ID)?,
        secret_access_key: field(SECRET_ACCESS_KEY)?,
    };
    info!(config_path = ?path_ref, "Using credentials from file for S3 access");
    Ok(credentials)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_hides_secret() {
        let creds = Credentials {
            access_key_id: "AKIDEXAMPLE".into(),
            secret_access_key: "very-secret".into(),
        };
        let shown = format!("{creds:?}");
        assert!(shown.contains("AKIDEXAMPLE"));
        assert!(!shown.contains("very-secret"));
    }
}
