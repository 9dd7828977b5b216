// File: crates/meetbot_gcal/src/auth.rs
use google_calendar3::{
    hyper_rustls::{self, HttpsConnectorBuilder},
    hyper_util::client::legacy::connect::HttpConnector,
    hyper_util::client::legacy::Client,
    yup_oauth2::{
        self, authorized_user::AuthorizedUserSecret, AuthorizedUserAuthenticator,
        ServiceAccountAuthenticator, ServiceAccountKey,
    },
    CalendarHub,
};
use meetbot_common::{auth_error, config_error, internal_error, MeetbotError};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{debug, info};

// Type aliases for clarity
type Connector = hyper_rustls::HttpsConnector<HttpConnector>;

pub type HubType = CalendarHub<Connector>;

/// Persists the opaque credential blob the calendar adapter authenticates with.
pub trait TokenStore: Send + Sync {
    /// Returns `None` when nothing has been stored yet.
    fn load(&self) -> Result<Option<Vec<u8>>, MeetbotError>;
    fn save(&self, blob: &[u8]) -> Result<(), MeetbotError>;
}

/// Keeps the blob in a single file, e.g. `token.json`.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<Vec<u8>>, MeetbotError> {
        match fs::read(&self.path) {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(internal_error(format!(
                "cannot read credentials {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    fn save(&self, blob: &[u8]) -> Result<(), MeetbotError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        // Replace atomically.
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, blob)?;
        fs::rename(&tmp, &self.path)?;
        debug!("Stored credentials at {}", self.path.display());
        Ok(())
    }
}

/// Holds the blob in memory. Useful for tests and one-off tools.
#[derive(Default)]
pub struct MemoryTokenStore {
    blob: RwLock<Option<Vec<u8>>>,
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<Vec<u8>>, MeetbotError> {
        Ok(self.blob.read().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn save(&self, blob: &[u8]) -> Result<(), MeetbotError> {
        *self.blob.write().unwrap_or_else(|e| e.into_inner()) = Some(blob.to_vec());
        Ok(())
    }
}

/// The two credential kinds Google hands out as JSON.
pub enum GoogleCredential {
    ServiceAccount(ServiceAccountKey),
    AuthorizedUser(AuthorizedUserSecret),
}

#[derive(Deserialize)]
struct CredentialKind {
    #[serde(rename = "type")]
    kind: String,
}

/// Parses a credential blob, dispatching on its `type` field.
pub fn parse_credential(blob: &[u8]) -> Result<GoogleCredential, MeetbotError> {
    let kind: CredentialKind = serde_json::from_slice(blob)
        .map_err(|e| config_error(format!("credentials are not valid JSON: {}", e)))?;

    match kind.kind.as_str() {
        "service_account" => yup_oauth2::parse_service_account_key(blob)
            .map(GoogleCredential::ServiceAccount)
            .map_err(|e| config_error(format!("invalid service account key: {}", e))),
        "authorized_user" => serde_json::from_slice::<AuthorizedUserSecret>(blob)
            .map(GoogleCredential::AuthorizedUser)
            .map_err(|e| config_error(format!("invalid authorized user credentials: {}", e))),
        other => Err(config_error(format!("unsupported credential type: {}", other))),
    }
}

/// Loads the stored credentials and builds an authenticated calendar hub.
pub async fn create_calendar_hub(store: &dyn TokenStore) -> Result<HubType, MeetbotError> {
    let blob = store
        .load()?
        .ok_or_else(|| {
            config_error("no Google credentials stored, run `import-credentials` first")
        })?;
    let credential = parse_credential(&blob)?;

    let https = HttpsConnectorBuilder::new()
        .with_native_roots()
        .map_err(|e| internal_error(format!("cannot load native TLS roots: {}", e)))?
        .https_or_http()
        .enable_http1()
        .build();

    // Create client without specifying body type
    let client = Client::builder(hyper_util::rt::TokioExecutor::new()).build(https);

    let hub = match credential {
        GoogleCredential::ServiceAccount(key) => {
            let auth = ServiceAccountAuthenticator::builder(key)
                .build()
                .await
                .map_err(|e| auth_error(format!("service account authenticator: {}", e)))?;
            info!("Using service account credentials for Google Calendar");
            CalendarHub::new(client, auth)
        }
        GoogleCredential::AuthorizedUser(secret) => {
            let auth = AuthorizedUserAuthenticator::builder(secret)
                .build()
                .await
                .map_err(|e| auth_error(format!("authorized user authenticator: {}", e)))?;
            info!("Using authorized user credentials for Google Calendar");
            CalendarHub::new(client, auth)
        }
    };

    Ok(hub)
}
