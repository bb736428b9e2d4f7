//! Drive API types
//!
//! Response types for the Google Drive v3 `files` endpoints and their
//! conversion into `RemoteItem`s.

use serde::Deserialize;

use crate::remote::RemoteItem;

/// Drive file metadata, restricted to the fields we request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    /// Drive file ID
    pub id: String,
    /// File name as shown in Drive
    pub name: String,
    /// MD5 of the content (absent for folders and native Google documents)
    #[serde(default)]
    pub md5_checksum: Option<String>,
}

/// Response from `files.list`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileList {
    #[serde(default)]
    pub files: Vec<DriveFile>,
    /// Token for the next page (None on the last page)
    #[serde(default)]
    pub next_page_token: Option<String>,
}

impl From<DriveFile> for RemoteItem {
    fn from(file: DriveFile) -> Self {
        let checksum = file.md5_checksum.filter(|sum| !sum.is_empty());
        RemoteItem {
            id: file.id,
            name: file.name,
            checksum,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_image_file() {
        let json = r#"{
            "id": "1AbC",
            "name": "beach.jpg",
            "md5Checksum": "5d41402abc4b2a76b9719d911017c592",
            "mimeType": "image/jpeg"
        }"#;
        let file: DriveFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.id, "1AbC");
        assert_eq!(file.name, "beach.jpg");

        let item = RemoteItem::from(file);
        assert_eq!(
            item.checksum.as_deref(),
            Some("5d41402abc4b2a76b9719d911017c592")
        );
    }

    #[test]
    fn test_deserialize_folder_without_checksum() {
        let json = r#"{
            "id": "1Folder",
            "name": "holidays",
            "mimeType": "application/vnd.google-apps.folder"
        }"#;
        let file: DriveFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.md5_checksum, None);
        assert_eq!(RemoteItem::from(file).checksum, None);
    }

    #[test]
    fn test_empty_checksum_treated_as_missing() {
        let file = DriveFile {
            id: "x".to_string(),
            name: "doc".to_string(),
            md5_checksum: Some(String::new()),
        };
        assert_eq!(RemoteItem::from(file).checksum, None);
    }

    #[test]
    fn test_deserialize_list_pages() {
        let json = r#"{
            "nextPageToken": "page-2",
            "files": [
                {"id": "a", "name": "a.png", "md5Checksum": "111"},
                {"id": "b", "name": "b.jpg", "md5Checksum": "222"}
            ]
        }"#;
        let list: FileList = serde_json::from_str(json).unwrap();
        assert_eq!(list.files.len(), 2);
        assert_eq!(list.next_page_token.as_deref(), Some("page-2"));

        // Last page: no token, and Drive omits `files` when the folder is empty
        let list: FileList = serde_json::from_str(r#"{"kind": "drive#fileList"}"#).unwrap();
        assert!(list.files.is_empty());
        assert_eq!(list.next_page_token, None);
    }
}
