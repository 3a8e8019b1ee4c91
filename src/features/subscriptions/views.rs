use super::models::Subscription;
use crate::features::billing::Category;
use chrono::NaiveDateTime;
use std::collections::BTreeMap;

/// カテゴリ別にまとめる
///
/// 各グループ内では元の並び順を保つ。サブスクリプションが無いカテゴリは含まれない。
pub fn group_by_category(subscriptions: &[Subscription]) -> BTreeMap<Category, Vec<Subscription>> {
    let mut groups: BTreeMap<Category, Vec<Subscription>> = BTreeMap::new();
    for subscription in subscriptions {
        groups
            .entry(subscription.category)
            .or_default()
            .push(subscription.clone());
    }
    groups
}

/// 次回請求日が近い順に最大 `limit` 件を返す
///
/// 同じ日付同士は元の並び順を保つ。
pub fn upcoming(subscriptions: &[Subscription], limit: usize) -> Vec<Subscription> {
    let mut sorted = subscriptions.to_vec();
    sorted.sort_by_key(|subscription| subscription.next_billing_date);
    sorted.truncate(limit);
    sorted
}

/// 残り日数が通知日数とちょうど一致するサブスクリプション
pub fn renewing_soon(subscriptions: &[Subscription], reference: NaiveDateTime) -> Vec<Subscription> {
    subscriptions
        .iter()
        .filter(|subscription| subscription.is_renewing_soon(reference))
        .cloned()
        .collect()
}
