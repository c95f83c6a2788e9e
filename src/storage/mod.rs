use crate::repository::MemoryRepository;
use serde::{Deserialize, Serialize};

pub(crate) const REPOSITORY_KEY: &str = "childlist_repository";

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

pub(crate) fn load_json_from_storage<T: for<'de> Deserialize<'de>>(key: &str) -> Option<T> {
    let storage = local_storage()?;
    let json = storage.get_item(key).ok().flatten()?;
    match serde_json::from_str(&json) {
        Ok(v) => Some(v),
        Err(e) => {
            log::warn!("discarding unreadable localStorage entry {key}: {e}");
            None
        }
    }
}

pub(crate) fn save_json_to_storage<T: Serialize>(key: &str, value: &T) {
    let json = match serde_json::to_string(value) {
        Ok(json) => json,
        Err(e) => {
            log::warn!("could not serialize {key}: {e}");
            return;
        }
    };
    if let Some(storage) = local_storage() {
        if storage.set_item(key, &json).is_err() {
            log::warn!("localStorage rejected {key} ({} bytes)", json.len());
        }
    }
}

pub(crate) fn remove_from_storage(key: &str) {
    if let Some(storage) = local_storage() {
        let _ = storage.remove_item(key);
    }
}

pub(crate) fn load_repository() -> Option<MemoryRepository> {
    load_json_from_storage::<MemoryRepository>(REPOSITORY_KEY)
}

pub(crate) fn save_repository(repo: &MemoryRepository) {
    save_json_to_storage(REPOSITORY_KEY, repo);
}
