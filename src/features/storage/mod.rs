/// 永続化モジュール
///
/// スナップショットと表示言語を保存するキーバリューストアの抽象と、
/// SQLite・メモリの各実装を提供します。
pub mod key_value;
pub mod preferences;
pub mod sqlite;

pub use key_value::{KeyValueStore, MemoryKeyValueStore, LANGUAGE_KEY, SUBSCRIPTIONS_KEY};
pub use preferences::{load_language, save_language, Language};
pub use sqlite::SqliteKeyValueStore;
