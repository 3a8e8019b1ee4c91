/// 通知モジュール
///
/// - 通知先の抽象（`Notifier`）とログ・収集用の実装
/// - 「もうすぐ更新」の判定と通知
/// - 定期チェックを行うキャンセル可能なタスク
pub mod notifier;
pub mod renewal;
pub mod scheduler;

pub use notifier::{CollectingNotifier, LogNotifier, Notifier};
pub use renewal::{check_renewals, renewal_message, RENEWAL_TITLE};
pub use scheduler::RenewalScheduler;
