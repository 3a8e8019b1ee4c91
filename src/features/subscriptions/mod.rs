/// サブスクリプション機能モジュール
///
/// このモジュールは、サブスクリプション管理に関連するすべての機能を提供します：
/// - サブスクリプションの作成、読み取り、更新、削除
/// - スナップショットの読み込みと保存
/// - カテゴリ別・請求日順の表示用データ
/// - 年額・月額の集計
/// - よく使われるサービスのクイック選択
pub mod commands;
pub mod models;
pub mod presets;
pub mod store;
pub mod views;

// 公開インターフェース
pub use commands::{
    apply_service_preset, create_subscription, delete_subscription, get_monthly_total,
    get_service_presets, get_subscriptions, get_subscriptions_by_category,
    get_upcoming_subscriptions, get_yearly_total, update_subscription,
    validate_subscription_form,
};

pub use models::{
    parse_date, parse_date_in_zone, StoredSubscription, Subscription, SubscriptionFormData,
};

pub use presets::{find_service, quick_select_services, ServicePreset, DEFAULT_SERVICES};

pub use store::{LoadPhase, SharedSnapshot, SubscriptionStore};

pub use views::{group_by_category, renewing_soon, upcoming};
