use super::key_value::{KeyValueStore, LANGUAGE_KEY};
use crate::shared::errors::{AppError, AppResult};
use std::fmt;
use std::str::FromStr;

/// 表示言語
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    En,
    Pl,
    De,
    Es,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Pl => "pl",
            Language::De => "de",
            Language::Es => "es",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "en" => Ok(Language::En),
            "pl" => Ok(Language::Pl),
            "de" => Ok(Language::De),
            "es" => Ok(Language::Es),
            _ => Err(AppError::validation(format!("未対応の言語です: {s}"))),
        }
    }
}

/// 保存されている表示言語を読み込む
///
/// 未保存・不明な値・読み込み失敗はすべて既定言語（英語）として扱う。
pub fn load_language(store: &dyn KeyValueStore) -> Language {
    match store.get(LANGUAGE_KEY) {
        Ok(Some(code)) => code.trim().parse().unwrap_or_else(|_| {
            log::warn!("保存された言語 '{code}' が不明なため既定値を使用します");
            Language::default()
        }),
        Ok(None) => Language::default(),
        Err(e) => {
            log::error!("言語設定の読み込みに失敗しました: {}", e.details());
            Language::default()
        }
    }
}

/// 表示言語を保存する
pub fn save_language(store: &dyn KeyValueStore, language: Language) -> AppResult<()> {
    store.set(LANGUAGE_KEY, language.code())
}
