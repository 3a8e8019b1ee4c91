use crate::shared::errors::AppResult;
use std::collections::HashMap;
use std::sync::Mutex;

/// サブスクリプション一覧のスナップショットを保存するキー
pub const SUBSCRIPTIONS_KEY: &str = "subscriptions";

/// 表示言語を保存するキー
pub const LANGUAGE_KEY: &str = "language";

/// 永続化先のキーバリューストア
///
/// 値は丸ごと置き換えられる。未保存のキーは `Ok(None)` を返す。
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> AppResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> AppResult<()>;
}

/// メモリ上のキーバリューストア
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 初期値を持つストアを作成
    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::new();
        if let Ok(mut entries) = store.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
        store
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        let entries = self.entries.lock()?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let mut entries = self.entries.lock()?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
