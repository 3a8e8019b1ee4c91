use super::key_value::KeyValueStore;
use crate::shared::database::{create_tables, initialize_database};
use crate::shared::errors::AppResult;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

/// SQLiteの `kv_store` テーブルを使うキーバリューストア
pub struct SqliteKeyValueStore {
    conn: Mutex<Connection>,
}

impl SqliteKeyValueStore {
    /// データベースファイルを開いてストアを作成する
    ///
    /// # 引数
    /// * `database_path` - データベースファイルのパス
    ///
    /// # 戻り値
    /// ストア、または失敗時はエラー
    pub fn open(database_path: &Path) -> AppResult<Self> {
        let conn = initialize_database(database_path)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// 既存の接続からストアを作成する
    pub fn from_connection(conn: Connection) -> AppResult<Self> {
        create_tables(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// インメモリデータベースでストアを作成する
    pub fn open_in_memory() -> AppResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }
}

impl KeyValueStore for SqliteKeyValueStore {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        let conn = self.conn.lock()?;
        let value = conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let now = Utc::now().to_rfc3339();
        let conn = self.conn.lock()?;
        conn.execute(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, now],
        )?;
        log::debug!("キー '{key}' を保存しました（{}バイト）", value.len());
        Ok(())
    }
}
