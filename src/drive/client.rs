//! Google Drive API Client
//!
//! Lists folder children and downloads file content through the Drive v3 REST API.
//! Authorization is a ready-made OAuth bearer token; obtaining it is out of scope.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

use super::types::{DriveFile, FileList};
use crate::remote::{Connector, RemoteError, RemoteItem, RemoteStore};

/// Drive v3 API base URL
const DRIVE_API_URL: &str = "https://www.googleapis.com/drive/v3";

/// Fields requested from `files.list`
const LIST_FIELDS: &str = "nextPageToken, files(id, name, md5Checksum)";

/// Maximum page size accepted by `files.list`
const PAGE_SIZE: u32 = 1000;

/// Where the bearer token comes from
#[derive(Debug, Clone)]
pub enum Credentials {
    /// Fixed token
    Token(String),
    /// File holding the token, re-read on every connect so an external
    /// refresher can rotate it
    TokenFile(PathBuf),
}

impl Credentials {
    async fn access_token(&self) -> Result<String, RemoteError> {
        let token = match self {
            Credentials::Token(token) => token.clone(),
            Credentials::TokenFile(path) => tokio::fs::read_to_string(path)
                .await
                .map_err(|_| RemoteError::MissingCredentials)?,
        };

        let token = token.trim().to_string();
        if token.is_empty() {
            return Err(RemoteError::MissingCredentials);
        }
        Ok(token)
    }
}

/// Drive API client bound to one access token
#[derive(Clone)]
pub struct DriveClient {
    /// HTTP client for making requests
    http_client: Client,
    /// OAuth bearer token
    access_token: String,
}

impl DriveClient {
    /// Create a client with the given token and request timeout
    pub fn new(access_token: String, timeout: Duration) -> Result<Self, RemoteError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::Request(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            access_token,
        })
    }

    /// List every direct, non-trashed child of a folder, following pagination
    pub async fn list_folder(&self, folder_id: &str) -> Result<Vec<DriveFile>, RemoteError> {
        let url = format!("{}/files", DRIVE_API_URL);
        let query = folder_query(folder_id);
        let page_size = PAGE_SIZE.to_string();
        let mut all_files = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut params = vec![
                ("q", query.as_str()),
                ("fields", LIST_FIELDS),
                ("pageSize", page_size.as_str()),
            ];
            if let Some(token) = page_token.as_deref() {
                params.push(("pageToken", token));
            }

            debug!(folder = folder_id, page = ?page_token, "Listing files from Drive");

            let response = self
                .http_client
                .get(&url)
                .bearer_auth(&self.access_token)
                .query(&params)
                .send()
                .await?;

            if !response.status().is_success() {
                let status = response.status().as_u16();
                let body = response.text().await.unwrap_or_default();
                return Err(RemoteError::from_status(status, &body));
            }

            let list: FileList = response.json().await?;
            all_files.extend(list.files);

            match list.next_page_token {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        debug!(folder = folder_id, count = all_files.len(), "Listed files from Drive");
        Ok(all_files)
    }

    /// Download file content
    pub async fn download_file(&self, file_id: &str) -> Result<Vec<u8>, RemoteError> {
        let url = download_url(file_id);

        debug!(file_id = file_id, "Downloading file from Drive");

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(&[("alt", "media")])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::from_status(status, &body));
        }

        let bytes = response.bytes().await?;

        info!(file_id = file_id, size = bytes.len(), "Downloaded file from Drive");
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl RemoteStore for DriveClient {
    async fn list(&self, folder_id: &str) -> Result<Vec<RemoteItem>, RemoteError> {
        let files = self.list_folder(folder_id).await?;
        Ok(files.into_iter().map(RemoteItem::from).collect())
    }

    async fn fetch(&self, id: &str) -> Result<Vec<u8>, RemoteError> {
        self.download_file(id).await
    }
}

/// Builds a fresh `DriveClient` for every sync cycle
pub struct DriveConnector {
    credentials: Credentials,
    timeout: Duration,
}

impl DriveConnector {
    pub fn new(credentials: Credentials, timeout: Duration) -> Self {
        Self {
            credentials,
            timeout,
        }
    }
}

#[async_trait]
impl Connector for DriveConnector {
    async fn connect(&self) -> Result<Arc<dyn RemoteStore>, RemoteError> {
        let token = self.credentials.access_token().await?;
        let client = DriveClient::new(token, self.timeout)?;
        Ok(Arc::new(client))
    }
}

/// Drive search expression selecting the direct children of a folder
fn folder_query(folder_id: &str) -> String {
    let escaped = folder_id.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{}' in parents and trashed = false", escaped)
}

fn download_url(file_id: &str) -> String {
    format!("{}/files/{}", DRIVE_API_URL, urlencoding::encode(file_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_folder_query() {
        assert_eq!(
            folder_query("1p8uFsCYf90m4IseWBHV3CFTVXKxszyuX"),
            "'1p8uFsCYf90m4IseWBHV3CFTVXKxszyuX' in parents and trashed = false"
        );
        assert_eq!(folder_query("it's"), r"'it\'s' in parents and trashed = false");
    }

    #[test]
    fn test_download_url_encodes_id() {
        assert_eq!(
            download_url("abc/def"),
            "https://www.googleapis.com/drive/v3/files/abc%2Fdef"
        );
    }

    #[tokio::test]
    async fn test_token_credentials() {
        let creds = Credentials::Token("  ya29.token\n".to_string());
        assert_eq!(creds.access_token().await.unwrap(), "ya29.token");

        let empty = Credentials::Token("   ".to_string());
        assert!(matches!(
            empty.access_token().await,
            Err(RemoteError::MissingCredentials)
        ));
    }

    #[tokio::test]
    async fn test_token_file_is_reread() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "first").unwrap();
        let creds = Credentials::TokenFile(file.path().to_path_buf());
        assert_eq!(creds.access_token().await.unwrap(), "first");

        std::fs::write(file.path(), "second\n").unwrap();
        assert_eq!(creds.access_token().await.unwrap(), "second");
    }

    #[tokio::test]
    async fn test_connect_without_token_file_fails() {
        let connector = DriveConnector::new(
            Credentials::TokenFile(PathBuf::from("/nonexistent/gpie-token")),
            Duration::from_secs(5),
        );
        assert!(matches!(
            connector.connect().await,
            Err(RemoteError::MissingCredentials)
        ));
    }
}
