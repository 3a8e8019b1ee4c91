use crate::shared::errors::{AppError, AppResult};
use chrono_tz::Tz;
use std::path::PathBuf;
use std::time::Duration;

/// 既定のタイムゾーン
pub const DEFAULT_TIMEZONE: &str = "Asia/Tokyo";

/// 更新チェック間隔の既定値（時間）
pub const DEFAULT_RENEWAL_CHECK_INTERVAL_HOURS: u64 = 24;

/// 「もうすぐ更新」一覧の既定件数
pub const DEFAULT_UPCOMING_LIMIT: usize = 3;

/// アプリケーションデータディレクトリ名
const APP_DIR_NAME: &str = "subscription-tracker";

/// アプリケーションの実行環境を表す列挙型
#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    /// 開発環境
    Development,
    /// プロダクション環境
    Production,
}

/// 環境設定を管理する構造体
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    /// 実行環境
    pub environment: String,
    /// デバッグモードの有効/無効
    pub debug_mode: bool,
    /// ログレベル
    pub log_level: String,
    /// 日付計算に使うIANAタイムゾーン名
    pub timezone: String,
    /// 更新チェックの間隔（時間）
    pub renewal_check_interval_hours: u64,
    /// 「もうすぐ更新」一覧の件数
    pub upcoming_limit: usize,
    /// データベースファイルの明示的なパス
    pub database_path: Option<PathBuf>,
}

impl EnvironmentConfig {
    /// 環境変数から設定を読み込む
    ///
    /// # 戻り値
    /// 環境設定
    pub fn from_env() -> Self {
        let environment = get_environment();
        let debug_mode = environment == Environment::Development;
        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| {
            if debug_mode {
                "debug".to_string()
            } else {
                "info".to_string()
            }
        });

        // コンパイル時埋め込み値を優先
        let timezone = option_env!("EMBEDDED_APP_TIMEZONE")
            .map(|s| s.to_string())
            .or_else(|| std::env::var("APP_TIMEZONE").ok())
            .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());

        let renewal_check_interval_hours = parse_env_number(
            "RENEWAL_CHECK_INTERVAL_HOURS",
            DEFAULT_RENEWAL_CHECK_INTERVAL_HOURS,
        );
        let upcoming_limit = parse_env_number("UPCOMING_LIMIT", DEFAULT_UPCOMING_LIMIT);

        let database_path = std::env::var("SUBSCRIPTIONS_DB_PATH")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        Self {
            environment: format!("{environment:?}").to_lowercase(),
            debug_mode,
            log_level,
            timezone,
            renewal_check_interval_hours,
            upcoming_limit,
            database_path,
        }
    }

    /// プロダクション環境かどうかを判定
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 開発環境かどうかを判定
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// 設定されたタイムゾーンを解析する
    ///
    /// # 戻り値
    /// タイムゾーン、または名前が不正な場合は設定エラー
    pub fn parse_timezone(&self) -> AppResult<Tz> {
        self.timezone.parse::<Tz>().map_err(|e| {
            AppError::configuration(format!("タイムゾーン '{}' が不正です: {e}", self.timezone))
        })
    }

    /// 更新チェックの間隔を取得
    pub fn renewal_check_interval(&self) -> Duration {
        Duration::from_secs(self.renewal_check_interval_hours * 3600)
    }

    /// 設定を検証する
    ///
    /// # 戻り値
    /// 設定が有効な場合はOk(())、無効な場合はErr
    pub fn validate(&self) -> AppResult<()> {
        self.parse_timezone()?;

        if self.renewal_check_interval_hours == 0 {
            return Err(AppError::configuration(
                "更新チェック間隔は1時間以上である必要があります",
            ));
        }

        if self.upcoming_limit == 0 {
            return Err(AppError::configuration(
                "表示件数は1件以上である必要があります",
            ));
        }

        Ok(())
    }

    /// データベースファイルのパスを決定する
    ///
    /// # 戻り値
    /// 明示的に指定されたパス、またはデータディレクトリ配下の環境別ファイル
    pub fn resolve_database_path(&self) -> AppResult<PathBuf> {
        if let Some(path) = &self.database_path {
            return Ok(path.clone());
        }

        let data_dir = dirs::data_dir().ok_or_else(|| {
            AppError::configuration("アプリデータディレクトリの取得に失敗しました")
        })?;

        let environment = if self.is_production() {
            Environment::Production
        } else {
            Environment::Development
        };

        Ok(data_dir
            .join(APP_DIR_NAME)
            .join(get_database_filename(environment)))
    }
}

/// 数値の環境変数を読み込む（不正値は既定値にフォールバック）
fn parse_env_number<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display + Copy,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().unwrap_or_else(|_| {
            log::warn!("{key} の値 '{raw}' が不正なため既定値 {default} を使用します");
            default
        }),
        Err(_) => default,
    }
}

/// 現在の実行環境を判定する
///
/// # 判定ロジック
/// 1. コンパイル時埋め込み環境変数を最優先
/// 2. 実行時環境変数 ENVIRONMENT を確認
/// 3. デバッグビルドの場合は Development
/// 4. リリースビルドの場合は Production
pub fn get_environment() -> Environment {
    if let Some(embedded_env) = option_env!("EMBEDDED_ENVIRONMENT") {
        let env = match embedded_env {
            "production" => Environment::Production,
            _ => Environment::Development,
        };
        log::debug!("環境判定: コンパイル時埋め込み値を使用 -> {embedded_env} -> {env:?}");
        return env;
    }

    if let Ok(env_var) = std::env::var("ENVIRONMENT") {
        let env = match env_var.as_str() {
            "production" => Environment::Production,
            _ => Environment::Development,
        };
        log::debug!("環境判定: 実行時環境変数を使用 -> {env_var} -> {env:?}");
        return env;
    }

    let env = if cfg!(debug_assertions) {
        Environment::Development
    } else {
        Environment::Production
    };
    log::debug!(
        "環境判定: ビルド設定を使用 -> debug_assertions={} -> {env:?}",
        cfg!(debug_assertions)
    );
    env
}

/// 環境に応じたデータベースファイル名を取得する
///
/// # ファイル名の規則
/// - 開発環境: "dev_subscriptions.db"
/// - プロダクション環境: "subscriptions.db"
pub fn get_database_filename(env: Environment) -> &'static str {
    match env {
        Environment::Development => "dev_subscriptions.db",
        Environment::Production => "subscriptions.db",
    }
}

/// 環境に応じた.envファイルを読み込む
pub fn load_environment_variables() {
    if let Some(env) = option_env!("EMBEDDED_ENVIRONMENT") {
        log::info!("コンパイル時埋め込み環境設定を使用: {env}");
        return;
    }

    let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

    let env_file = match environment.as_str() {
        "production" => ".env.production",
        _ => ".env",
    };

    log::info!("環境: {environment}, 読み込み対象: {env_file}");

    match dotenv::from_filename(env_file) {
        Ok(_) => {
            log::info!("{env_file}ファイルを読み込みました");
        }
        Err(_) => {
            // 環境固有のファイルがない場合は、デフォルトの.envを試行
            if env_file != ".env" && dotenv::dotenv().is_ok() {
                log::warn!("{env_file}が見つからないため、デフォルトの.envファイルを読み込みました");
            } else {
                log::warn!("環境変数ファイルが見つかりません。直接設定された環境変数を使用します。");
            }
        }
    }
}

/// ログシステムを初期化する
///
/// # 処理内容
/// 1. 環境設定を取得
/// 2. ログレベルを設定
/// 3. env_loggerを初期化
pub fn initialize_logging_system(env_config: &EnvironmentConfig) {
    let log_level = match env_config.log_level.to_lowercase().as_str() {
        "error" => log::LevelFilter::Error,
        "warn" => log::LevelFilter::Warn,
        "info" => log::LevelFilter::Info,
        "debug" => log::LevelFilter::Debug,
        "trace" => log::LevelFilter::Trace,
        _ => log::LevelFilter::Info,
    };

    // 二重初期化はエラーにせず無視する
    let _ = env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .format_timestamp_secs()
        .format_module_path(false)
        .format_target(false)
        .try_init();

    log::info!(
        "ログシステムを初期化しました: level={}, environment={}",
        env_config.log_level,
        env_config.environment
    );
}
