// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The switch user the agent logs in as. It is created once, with a generated password,
//! through one of the well-known default accounts of the switch.

use config::Credentials;
use gnmi::{ConfigEndpoint, Path, SetOp};
use rand::Rng;
use sonic::schema::expand_path;
use sonic::schema::system::{USER_CONFIG, UserConfig};
use std::fs::OpenOptions;
use std::io::Write;
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path as FsPath;
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::endpoint::EndpointFactory;
use crate::errors::UserError;

pub const AGENT_USER: &str = "agent";
pub const AGENT_ROLE: &str = "admin";
pub const PASSWD_FILE: &str = "agent-passwd";

const PASSWORD_LEN: usize = 32;
const PASSWORD_CHARSET: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!@#$%^&*()-_=+";

#[must_use]
pub fn generate_password() -> String {
    let mut rng = rand::rng();
    (0..PASSWORD_LEN)
        .map(|_| char::from(PASSWORD_CHARSET[rng.random_range(0..PASSWORD_CHARSET.len())]))
        .collect()
}

fn io_error(path: &FsPath) -> impl FnOnce(std::io::Error) -> UserError {
    let name = path.display().to_string();
    move |e| UserError::Io(name, e)
}

fn read_password(file: &FsPath) -> Result<Option<String>, UserError> {
    match std::fs::read_to_string(file) {
        Ok(content) => {
            let password = content.trim();
            if password.is_empty() {
                return Err(UserError::EmptyPasswordFile(file.display().to_string()));
            }
            Ok(Some(password.to_owned()))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(io_error(file)(e)),
    }
}

fn write_password(file: &FsPath, password: &str) -> Result<(), UserError> {
    if let Some(dir) = file.parent() {
        std::fs::create_dir_all(dir).map_err(io_error(dir))?;
    }
    let mut out = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(file)
        .map_err(io_error(file))?;
    out.write_all(password.as_bytes()).map_err(io_error(file))?;
    Ok(())
}

async fn create_user<E: ConfigEndpoint + ?Sized>(
    endpoint: &E,
    password: &str,
) -> Result<(), gnmi::EndpointError> {
    let path = Path::from_str(&expand_path(USER_CONFIG, AGENT_USER))?;
    let config = UserConfig {
        password: Some(password.to_owned()),
        role: Some(AGENT_ROLE.to_owned()),
        ..Default::default()
    };
    let value = serde_json::to_value(&config)
        .map_err(|e| gnmi::EndpointError::Encode(e.to_string()))?;
    endpoint.set(vec![SetOp::update(path, value)]).await
}

/// Credentials of the agent user. On first run, the user is created with a fresh
/// password through the first of `defaults` the switch accepts, and the password is
/// kept in `<basedir>/agent-passwd`.
pub async fn ensure_agent_user<F: EndpointFactory>(
    basedir: &FsPath,
    factory: &F,
    defaults: &[Credentials],
) -> Result<Credentials, UserError> {
    let file = basedir.join(PASSWD_FILE);
    if let Some(password) = read_password(&file)? {
        debug!("Using agent password from {}", file.display());
        return Ok(Credentials::new(AGENT_USER, &password));
    }

    let password = generate_password();
    let mut failure = None;
    for credentials in defaults {
        let endpoint = match factory.connect(credentials).await {
            Ok(endpoint) => endpoint,
            Err(e) => {
                debug!("Can't connect as {}: {e}", credentials.username);
                continue;
            }
        };
        if let Err(e) = create_user(&endpoint, &password).await {
            warn!(
                "Failed to create user {AGENT_USER} connected as {}: {e}",
                credentials.username
            );
            failure = Some(e);
            continue;
        }
        info!(
            "Created user {AGENT_USER} connected as {}",
            credentials.username
        );
        write_password(&file, &password)?;
        return Ok(Credentials::new(AGENT_USER, &password));
    }

    match failure {
        Some(e) => Err(UserError::Create(e)),
        None => {
            warn!("No default credentials accepted by the switch");
            Err(UserError::NoCredentials)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::MemoryEndpointFactory;
    use async_trait::async_trait;
    use gnmi::{EndpointError, MemoryEndpoint};
    use pretty_assertions::assert_eq;
    use sonic::schema::system::USERS;
    use std::collections::BTreeMap;
    use std::os::unix::fs::PermissionsExt;
    use std::sync::Arc;
    use tracing_test::traced_test;

    fn admin() -> Credentials {
        Credentials::new("admin", "YourPaSsWoRd")
    }

    #[test]
    fn test_generate_password() {
        let password = generate_password();
        assert_eq!(password.len(), PASSWORD_LEN);
        assert!(password.bytes().all(|c| PASSWORD_CHARSET.contains(&c)));
        assert_ne!(password, generate_password());
    }

    #[tokio::test]
    #[traced_test]
    async fn test_bootstrap() {
        let dir = tempfile::tempdir().unwrap();
        let factory =
            MemoryEndpointFactory::new(Arc::new(MemoryEndpoint::new())).accepting(admin());
        let defaults = [Credentials::new("admin", "admin"), admin()];

        let creds = ensure_agent_user(dir.path(), &factory, &defaults).await.unwrap();
        assert_eq!(creds.username, AGENT_USER);
        assert_eq!(creds.password.len(), PASSWORD_LEN);
        assert!(logs_contain("Created user agent connected as admin"));

        let file = dir.path().join(PASSWD_FILE);
        assert_eq!(std::fs::read_to_string(&file).unwrap(), creds.password);
        let mode = std::fs::metadata(&file).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);

        /* the switch now knows the agent user */
        assert!(factory.connect(&creds).await.is_ok());

        /* later runs reuse the password without touching the switch */
        factory.endpoint().clear_history();
        let again = ensure_agent_user(dir.path(), &factory, &defaults).await.unwrap();
        assert_eq!(again, creds);
        assert!(factory.endpoint().history().is_empty());
    }

    #[tokio::test]
    async fn test_no_default_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let factory = MemoryEndpointFactory::new(Arc::new(MemoryEndpoint::new()));
        let err = ensure_agent_user(dir.path(), &factory, &[admin()])
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::NoCredentials));
        assert!(!dir.path().join(PASSWD_FILE).exists());
        assert!(factory.endpoint().history().is_empty());
    }

    /// One switch session per user, each with its own configuration tree
    struct Sessions(BTreeMap<String, Arc<MemoryEndpoint>>);

    #[async_trait]
    impl EndpointFactory for Sessions {
        type Endpoint = Arc<MemoryEndpoint>;

        async fn connect(
            &self,
            credentials: &Credentials,
        ) -> Result<Self::Endpoint, EndpointError> {
            self.0
                .get(&credentials.username)
                .cloned()
                .ok_or_else(|| EndpointError::Unauthenticated(credentials.username.clone()))
        }
    }

    fn read_only() -> Arc<MemoryEndpoint> {
        let endpoint = Arc::new(MemoryEndpoint::new());
        endpoint.inject_failure(
            Path::from_str(USERS).unwrap(),
            EndpointError::Rejected("users".to_owned(), "permission denied".to_owned()),
        );
        endpoint
    }

    #[tokio::test]
    #[traced_test]
    async fn test_create_failure_tries_next_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let writable = Arc::new(MemoryEndpoint::new());
        let sessions = Sessions(BTreeMap::from([
            ("guest".to_owned(), read_only()),
            ("admin".to_owned(), writable.clone()),
        ]));
        let defaults = [Credentials::new("guest", "guest"), admin()];

        let creds = ensure_agent_user(dir.path(), &sessions, &defaults).await.unwrap();
        assert_eq!(creds.username, AGENT_USER);
        assert!(logs_contain("Failed to create user agent connected as guest"));
        assert!(logs_contain("Created user agent connected as admin"));
        assert_eq!(writable.history().len(), 1);
        assert!(dir.path().join(PASSWD_FILE).exists());
    }

    #[tokio::test]
    async fn test_create_failure_everywhere() {
        let dir = tempfile::tempdir().unwrap();
        let sessions = Sessions(BTreeMap::from([("guest".to_owned(), read_only())]));
        let err = ensure_agent_user(dir.path(), &sessions, &[Credentials::new("guest", "guest")])
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::Create(EndpointError::Rejected(..))));
        assert!(!dir.path().join(PASSWD_FILE).exists());
    }

    #[tokio::test]
    async fn test_empty_password_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(PASSWD_FILE), "\n").unwrap();
        let factory =
            MemoryEndpointFactory::new(Arc::new(MemoryEndpoint::new())).accepting(admin());
        let err = ensure_agent_user(dir.path(), &factory, &[admin()])
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::EmptyPasswordFile(_)));
    }
}
