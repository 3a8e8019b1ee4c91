use super::models::{parse_date, Subscription, SubscriptionFormData};
use super::presets::{find_service, quick_select_services, ServicePreset};
use super::store::SubscriptionStore;
use crate::features::billing::Category;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

/// 通貨コード（ISO 4217形式の大文字3文字）
static CURRENCY_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{3}$").unwrap());

const MIN_NAME_LENGTH: usize = 2;
const MAX_NAME_LENGTH: usize = 100;
const MIN_PRICE: f64 = 0.01;
const MAX_PRICE: f64 = 9_999_999_999.0;
const MIN_NOTIFY_DAYS: u32 = 1;
const MAX_NOTIFY_DAYS: u32 = 30;

/// サブスクリプションを作成する
///
/// # 引数
/// * `store` - サブスクリプションストア
/// * `form` - フォームデータ
///
/// # 戻り値
/// 作成されたサブスクリプション、または失敗時はエラーメッセージ
pub fn create_subscription(
    store: &mut SubscriptionStore,
    form: SubscriptionFormData,
) -> Result<Subscription, String> {
    validate_subscription_form(&form)?;

    store.add(form).map_err(String::from)
}

/// サブスクリプションを更新する
///
/// # 引数
/// * `store` - サブスクリプションストア
/// * `id` - サブスクリプションID
/// * `form` - フォームデータ
///
/// # 戻り値
/// 更新されたサブスクリプション、または失敗時はエラーメッセージ
pub fn update_subscription(
    store: &mut SubscriptionStore,
    id: &str,
    form: SubscriptionFormData,
) -> Result<Subscription, String> {
    validate_subscription_form(&form)?;

    store.update(id, form).map_err(String::from)
}

/// サブスクリプションを削除する
pub fn delete_subscription(
    store: &mut SubscriptionStore,
    id: &str,
) -> Result<Subscription, String> {
    store.remove(id).map_err(String::from)
}

/// サブスクリプション一覧を取得する
pub fn get_subscriptions(store: &SubscriptionStore) -> Result<Vec<Subscription>, String> {
    store.subscriptions().map_err(String::from)
}

/// 年間の支払い見込み額を取得する
pub fn get_yearly_total(store: &SubscriptionStore) -> Result<f64, String> {
    store.yearly_cost().map_err(String::from)
}

/// 月平均の支払い見込み額を取得する
pub fn get_monthly_total(store: &SubscriptionStore) -> Result<f64, String> {
    store.monthly_cost().map_err(String::from)
}

/// 次回請求日が近いサブスクリプションを取得する
pub fn get_upcoming_subscriptions(
    store: &SubscriptionStore,
    limit: usize,
) -> Result<Vec<Subscription>, String> {
    store.upcoming(limit).map_err(String::from)
}

/// カテゴリ別のサブスクリプション一覧を取得する
pub fn get_subscriptions_by_category(
    store: &SubscriptionStore,
) -> Result<BTreeMap<Category, Vec<Subscription>>, String> {
    store
        .group_by_category()
        .map_err(String::from)
}

/// クイック選択用のサービス一覧を取得する
pub fn get_service_presets() -> Vec<ServicePreset> {
    quick_select_services().to_vec()
}

/// 選択されたサービスの既定値をフォームに反映する
///
/// # 引数
/// * `form` - 入力中のフォームデータ
/// * `service_name` - 選択されたサービス名
///
/// # 戻り値
/// 反映後のフォームデータ、未登録のサービス名の場合はエラーメッセージ
pub fn apply_service_preset(
    mut form: SubscriptionFormData,
    service_name: &str,
) -> Result<SubscriptionFormData, String> {
    let service = find_service(service_name)
        .ok_or_else(|| format!("サービス {service_name} は登録されていません"))?;
    service.apply_to(&mut form);
    Ok(form)
}

/// フォームデータのバリデーション
///
/// # 戻り値
/// バリデーション成功時はOk(())、失敗時はエラーメッセージ
pub fn validate_subscription_form(form: &SubscriptionFormData) -> Result<(), String> {
    // バリデーション: サービス名は2文字以上100文字以内
    let name_length = form.name.trim().chars().count();
    if name_length < MIN_NAME_LENGTH {
        return Err("サービス名は2文字以上で入力してください".to_string());
    }
    if name_length > MAX_NAME_LENGTH {
        return Err("サービス名は100文字以内で入力してください".to_string());
    }

    // バリデーション: 金額は正の数値
    if !form.price.is_finite() || form.price < MIN_PRICE {
        return Err("金額は0より大きい数値である必要があります".to_string());
    }
    if form.price > MAX_PRICE {
        return Err("金額は10桁以内で入力してください".to_string());
    }

    if !CURRENCY_PATTERN.is_match(&form.currency) {
        return Err("通貨はUSDのような3文字のコードで指定してください".to_string());
    }

    if !(MIN_NOTIFY_DAYS..=MAX_NOTIFY_DAYS).contains(&form.notify_days_before) {
        return Err("通知日数は1日から30日の間で指定してください".to_string());
    }

    validate_date_format(&form.start_date)?;

    if let Some(next_billing_date) = form.explicit_next_billing_date() {
        validate_date_format(next_billing_date)?;
    }

    Ok(())
}

/// 日付形式のバリデーション（YYYY-MM-DD形式）
fn validate_date_format(date: &str) -> Result<(), String> {
    if date.trim().len() != 10 {
        return Err("日付はYYYY-MM-DD形式で入力してください".to_string());
    }

    parse_date(date)
        .map(|_| ())
        .map_err(|_| "存在しない日付です".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::billing::BillingCycle;
    use crate::features::notifications::CollectingNotifier;
    use crate::features::storage::MemoryKeyValueStore;
    use crate::shared::utils::FixedClock;
    use chrono::NaiveDate;
    use std::sync::Arc;

    fn form() -> SubscriptionFormData {
        SubscriptionFormData {
            name: "Xbox Game Pass".to_string(),
            logo: Some("xbox.svg".to_string()),
            price: 14.99,
            currency: "USD".to_string(),
            billing_cycle: BillingCycle::Monthly,
            category: Category::Gaming,
            start_date: "2024-01-05".to_string(),
            next_billing_date: Some(String::new()),
            notify_days_before: 3,
            color: Some("#7CBB00".to_string()),
        }
    }

    fn store() -> SubscriptionStore {
        let clock = FixedClock::new(
            NaiveDate::from_ymd_opt(2024, 2, 15)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
        );
        let mut store = SubscriptionStore::new(
            Arc::new(MemoryKeyValueStore::new()),
            Arc::new(CollectingNotifier::new()),
            Arc::new(clock),
        );
        store.load().unwrap();
        store
    }

    #[test]
    fn test_valid_form() {
        assert!(validate_subscription_form(&form()).is_ok());
    }

    #[test]
    fn test_name_validation() {
        let mut data = form();
        data.name = " a ".to_string();
        assert_eq!(
            validate_subscription_form(&data).unwrap_err(),
            "サービス名は2文字以上で入力してください"
        );

        data.name = "x".repeat(101);
        assert!(validate_subscription_form(&data).is_err());
    }

    #[test]
    fn test_price_validation() {
        let mut data = form();
        data.price = 0.0;
        assert!(validate_subscription_form(&data).is_err());

        data.price = -5.0;
        assert!(validate_subscription_form(&data).is_err());

        data.price = f64::NAN;
        assert!(validate_subscription_form(&data).is_err());

        data.price = 0.01;
        assert!(validate_subscription_form(&data).is_ok());
    }

    #[test]
    fn test_currency_validation() {
        let mut data = form();
        for invalid in ["", "usd", "US", "EURO"] {
            data.currency = invalid.to_string();
            assert!(validate_subscription_form(&data).is_err(), "{invalid}");
        }
        data.currency = "PLN".to_string();
        assert!(validate_subscription_form(&data).is_ok());
    }

    #[test]
    fn test_notify_days_bounds() {
        let mut data = form();
        data.notify_days_before = 0;
        assert!(validate_subscription_form(&data).is_err());
        data.notify_days_before = 31;
        assert!(validate_subscription_form(&data).is_err());
        data.notify_days_before = 1;
        assert!(validate_subscription_form(&data).is_ok());
        data.notify_days_before = 30;
        assert!(validate_subscription_form(&data).is_ok());
    }

    #[test]
    fn test_date_validation() {
        let mut data = form();
        data.start_date = "2024/01/05".to_string();
        assert!(validate_subscription_form(&data).is_err());

        data.start_date = "2023-02-29".to_string();
        assert_eq!(
            validate_subscription_form(&data).unwrap_err(),
            "存在しない日付です"
        );

        data = form();
        data.next_billing_date = Some("2024-13-01".to_string());
        assert!(validate_subscription_form(&data).is_err());
    }

    #[test]
    fn test_create_and_query() {
        let mut store = store();

        let created = create_subscription(&mut store, form()).unwrap();
        assert_eq!(
            created.next_billing_date,
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
        );

        assert_eq!(get_subscriptions(&store).unwrap().len(), 1);
        assert!((get_yearly_total(&store).unwrap() - 14.99 * 12.0).abs() < 1e-9);
        assert!((get_monthly_total(&store).unwrap() - 14.99).abs() < 1e-9);
        assert_eq!(get_upcoming_subscriptions(&store, 5).unwrap().len(), 1);
        assert_eq!(
            get_subscriptions_by_category(&store).unwrap()[&Category::Gaming].len(),
            1
        );
    }

    #[test]
    fn test_invalid_form_never_reaches_store() {
        let mut store = store();
        let mut data = form();
        data.price = 0.0;

        assert!(create_subscription(&mut store, data).is_err());
        assert!(get_subscriptions(&store).unwrap().is_empty());
    }

    #[test]
    fn test_update_and_delete_unknown_id_messages() {
        let mut store = store();

        assert_eq!(
            update_subscription(&mut store, "nope", form()).unwrap_err(),
            "ID nope のサブスクリプションが見つかりません"
        );
        assert_eq!(
            delete_subscription(&mut store, "nope").unwrap_err(),
            "ID nope のサブスクリプションが見つかりません"
        );
    }

    #[test]
    fn test_store_errors_become_user_messages() {
        let mut unloaded = SubscriptionStore::new(
            Arc::new(MemoryKeyValueStore::new()),
            Arc::new(CollectingNotifier::new()),
            Arc::new(FixedClock::new(
                NaiveDate::from_ymd_opt(2024, 2, 15)
                    .unwrap()
                    .and_hms_opt(9, 0, 0)
                    .unwrap(),
            )),
        );

        assert_eq!(
            create_subscription(&mut unloaded, form()).unwrap_err(),
            "サブスクリプションの読み込みが完了していません"
        );
    }

    #[test]
    fn test_service_presets() {
        let presets = get_service_presets();
        assert_eq!(presets.len(), 8);
        assert_eq!(presets[1].name, "Spotify");

        let mut data = form();
        data.name = String::new();
        data.logo = None;
        let applied = apply_service_preset(data, "Spotify").unwrap();
        assert_eq!(applied.name, "Spotify");
        assert_eq!(applied.category, Category::Music);
        assert_eq!(applied.logo.as_deref(), Some("spotify.svg"));
        assert!(validate_subscription_form(&applied).is_ok());

        assert_eq!(
            apply_service_preset(form(), "Tidal").unwrap_err(),
            "サービス Tidal は登録されていません"
        );
    }

    #[test]
    fn test_update_and_delete() {
        let mut store = store();
        let created = create_subscription(&mut store, form()).unwrap();

        let mut data = form();
        data.price = 16.99;
        let updated = update_subscription(&mut store, &created.id, data).unwrap();
        assert_eq!(updated.price, 16.99);

        delete_subscription(&mut store, &created.id).unwrap();
        assert!(get_subscriptions(&store).unwrap().is_empty());
    }
}
