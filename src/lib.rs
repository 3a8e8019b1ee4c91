pub mod features;
pub mod shared;

use features::notifications::{LogNotifier, RenewalScheduler};
use features::storage::{load_language, Language, SqliteKeyValueStore};
use features::subscriptions::{models::DATE_FORMAT, SubscriptionStore};
use log::{error, info};
use shared::{
    initialize_logging_system, load_environment_variables, AppResult, EnvironmentConfig,
    SystemClock,
};
use std::sync::Arc;

/// アプリケーションを起動する
///
/// # 処理内容
/// 1. 環境変数とログの初期化
/// 2. 保存先を開いてサブスクリプションを読み込み
/// 3. 集計結果をログに出力
/// 4. 定期的な更新チェックを開始し、Ctrl-Cで停止
pub async fn run() -> AppResult<()> {
    load_environment_variables();
    let env_config = EnvironmentConfig::from_env();
    initialize_logging_system(&env_config);

    info!("アプリケーション初期化を開始します...");

    env_config.validate().map_err(|e| {
        error!("設定の検証に失敗しました: {e}");
        e
    })?;

    let database_path = env_config.resolve_database_path()?;
    let storage = Arc::new(SqliteKeyValueStore::open(&database_path).map_err(|e| {
        error!("データベースの初期化に失敗しました: {e}");
        e
    })?);

    let language = load_language(storage.as_ref());
    let clock = Arc::new(SystemClock::new(env_config.parse_timezone()?));
    let notifier = Arc::new(LogNotifier);

    let mut store = SubscriptionStore::new(storage, notifier.clone(), clock.clone());
    store.load()?;

    log_summary(&store, env_config.upcoming_limit, language)?;

    let scheduler = RenewalScheduler::start(
        store.snapshot_handle(),
        notifier,
        clock,
        env_config.renewal_check_interval(),
    );

    info!("アプリケーション初期化が完了しました（Ctrl-Cで終了）");

    tokio::signal::ctrl_c().await?;

    info!("終了処理を開始します...");
    scheduler.shutdown().await;
    store.save()?;

    Ok(())
}

/// 一覧の概要をログに出力する
fn log_summary(
    store: &SubscriptionStore,
    upcoming_limit: usize,
    language: Language,
) -> AppResult<()> {
    info!(
        "登録件数: {}件, 年額: {:.2}, 月額: {:.2}, 表示言語: {}",
        store.len()?,
        store.yearly_cost()?,
        store.monthly_cost()?,
        language
    );

    for (category, subscriptions) in store.group_by_category()? {
        info!(
            "カテゴリ {category} ({}): {}件",
            category.default_color(),
            subscriptions.len()
        );
    }

    for subscription in store.upcoming(upcoming_limit)? {
        info!(
            "次回請求: {} {} {:.2} {} ({}, {})",
            subscription.next_billing_date.format(DATE_FORMAT),
            subscription.name,
            subscription.price,
            subscription.currency,
            subscription.billing_cycle,
            subscription.display_color()
        );
    }

    Ok(())
}
