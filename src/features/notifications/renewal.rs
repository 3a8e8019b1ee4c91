use super::notifier::Notifier;
use crate::features::subscriptions::models::{Subscription, DATE_FORMAT};
use chrono::NaiveDateTime;

/// 更新通知のタイトル
pub const RENEWAL_TITLE: &str = "更新のお知らせ";

/// 更新通知の本文を組み立てる
pub fn renewal_message(subscription: &Subscription, days: i64) -> String {
    format!(
        "{} は {} 日後（{}）に更新されます",
        subscription.name,
        days,
        subscription.next_billing_date.format(DATE_FORMAT)
    )
}

/// 「もうすぐ更新」のサブスクリプションを通知する
///
/// 残り日数が通知日数と完全一致したものだけが対象。
///
/// # 引数
/// * `subscriptions` - 判定対象のスナップショット
/// * `reference` - 基準時刻
/// * `notifier` - 通知先
///
/// # 戻り値
/// 送信した通知の件数
pub fn check_renewals(
    subscriptions: &[Subscription],
    reference: NaiveDateTime,
    notifier: &dyn Notifier,
) -> usize {
    let mut sent = 0;

    for subscription in subscriptions {
        if subscription.is_renewing_soon(reference) {
            let days = subscription.days_remaining(reference);
            notifier.notify(RENEWAL_TITLE, &renewal_message(subscription, days));
            sent += 1;
        }
    }

    log::debug!(
        "更新チェック完了: 対象{}件中{}件を通知",
        subscriptions.len(),
        sent
    );
    sent
}
