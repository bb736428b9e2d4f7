//! In-memory remote store for tests

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{Connector, RemoteError, RemoteItem, RemoteStore};

#[derive(Default)]
struct State {
    items: Vec<RemoteItem>,
    contents: HashMap<String, Vec<u8>>,
    failing: HashSet<String>,
    fail_listing: bool,
    fail_connect: bool,
    fetched: Vec<String>,
}

/// Shared handle: clones see the same listing and fetch log
#[derive(Clone, Default)]
pub struct FakeRemote {
    state: Arc<Mutex<State>>,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item whose content is `content`
    pub fn add(&self, id: &str, name: &str, checksum: &str, content: &[u8]) {
        let mut state = self.state.lock().unwrap();
        state.items.push(RemoteItem {
            id: id.to_string(),
            name: name.to_string(),
            checksum: Some(checksum.to_string()),
        });
        state.contents.insert(id.to_string(), content.to_vec());
    }

    pub fn add_without_checksum(&self, id: &str, name: &str) {
        self.state.lock().unwrap().items.push(RemoteItem {
            id: id.to_string(),
            name: name.to_string(),
            checksum: None,
        });
    }

    pub fn fail_fetch(&self, id: &str) {
        self.state.lock().unwrap().failing.insert(id.to_string());
    }

    pub fn set_fail_listing(&self, fail: bool) {
        self.state.lock().unwrap().fail_listing = fail;
    }

    pub fn set_fail_connect(&self, fail: bool) {
        self.state.lock().unwrap().fail_connect = fail;
    }

    /// IDs passed to `fetch`, in call order
    pub fn fetched(&self) -> Vec<String> {
        self.state.lock().unwrap().fetched.clone()
    }

    pub fn clear_fetched(&self) {
        self.state.lock().unwrap().fetched.clear();
    }
}

#[async_trait]
impl RemoteStore for FakeRemote {
    async fn list(&self, _folder_id: &str) -> Result<Vec<RemoteItem>, RemoteError> {
        let state = self.state.lock().unwrap();
        if state.fail_listing {
            return Err(RemoteError::Server(503, "listing unavailable".to_string()));
        }
        Ok(state.items.clone())
    }

    async fn fetch(&self, id: &str) -> Result<Vec<u8>, RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.fetched.push(id.to_string());
        if state.failing.contains(id) {
            return Err(RemoteError::Network(format!("connection reset fetching {}", id)));
        }
        state
            .contents
            .get(id)
            .cloned()
            .ok_or_else(|| RemoteError::NotFound(id.to_string()))
    }
}

#[async_trait]
impl Connector for FakeRemote {
    async fn connect(&self) -> Result<Arc<dyn RemoteStore>, RemoteError> {
        if self.state.lock().unwrap().fail_connect {
            return Err(RemoteError::MissingCredentials);
        }
        Ok(Arc::new(self.clone()))
    }
}
