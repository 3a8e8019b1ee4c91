use crate::features::billing::{days_remaining, Billable, BillingCycle, Category};
use crate::shared::errors::{AppError, AppResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// 日付の保存形式
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// サブスクリプションデータモデル
///
/// スナップショットとしてJSON配列で保存される。フィールド名はcamelCase、
/// 日付はISO-8601文字列。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    pub price: f64,
    pub currency: String,
    pub billing_cycle: BillingCycle,
    pub category: Category,
    #[serde(with = "iso_date")]
    pub start_date: NaiveDate,
    #[serde(with = "iso_date")]
    pub next_billing_date: NaiveDate,
    pub notify_days_before: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Subscription {
    /// 次回請求日までの残り日数
    pub fn days_remaining(&self, reference: NaiveDateTime) -> i64 {
        days_remaining(self.next_billing_date, reference)
    }

    /// 残り日数が通知日数とちょうど一致するか
    ///
    /// 「以下」ではなく完全一致で判定する。
    pub fn is_renewing_soon(&self, reference: NaiveDateTime) -> bool {
        self.days_remaining(reference) == i64::from(self.notify_days_before)
    }

    /// 表示色（未指定ならカテゴリの既定色）
    pub fn display_color(&self) -> &str {
        self.color
            .as_deref()
            .unwrap_or_else(|| self.category.default_color())
    }
}

impl Billable for Subscription {
    fn price(&self) -> f64 {
        self.price
    }

    fn billing_cycle(&self) -> BillingCycle {
        self.billing_cycle
    }
}

/// サブスクリプション作成・更新用のフォームデータ
///
/// 日付は文字列のまま受け取り、ストア側で解析する。
/// `next_billing_date` が未指定（または空文字列）の場合は開始日から計算される。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionFormData {
    pub name: String,
    #[serde(default)]
    pub logo: Option<String>,
    pub price: f64,
    pub currency: String,
    pub billing_cycle: BillingCycle,
    pub category: Category,
    pub start_date: String,
    #[serde(default)]
    pub next_billing_date: Option<String>,
    pub notify_days_before: u32,
    #[serde(default)]
    pub color: Option<String>,
}

impl SubscriptionFormData {
    /// 明示的に指定された次回請求日（空文字列は未指定として扱う）
    pub fn explicit_next_billing_date(&self) -> Option<&str> {
        self.next_billing_date
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// 保存済みスナップショットの1件分
///
/// 旧形式のタイムスタンプはタイムゾーンがないと日付に戻せないため、
/// 日付は文字列のまま読み込み、`into_subscription` で変換する。
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSubscription {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub logo: Option<String>,
    pub price: f64,
    pub currency: String,
    pub billing_cycle: BillingCycle,
    pub category: Category,
    pub start_date: String,
    pub next_billing_date: String,
    pub notify_days_before: u32,
    #[serde(default)]
    pub color: Option<String>,
}

impl StoredSubscription {
    /// 指定タイムゾーンで日付を解釈してサブスクリプションに変換する
    ///
    /// # 引数
    /// * `timezone` - 旧形式のタイムスタンプをローカル日付に戻すタイムゾーン
    pub fn into_subscription(self, timezone: Tz) -> AppResult<Subscription> {
        Ok(Subscription {
            start_date: parse_date_in_zone(&self.start_date, timezone)?,
            next_billing_date: parse_date_in_zone(&self.next_billing_date, timezone)?,
            id: self.id,
            name: self.name,
            logo: self.logo,
            price: self.price,
            currency: self.currency,
            billing_cycle: self.billing_cycle,
            category: self.category,
            notify_days_before: self.notify_days_before,
            color: self.color,
        })
    }
}

/// `YYYY-MM-DD` 形式の日付文字列を解析する
pub fn parse_date(value: &str) -> AppResult<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| AppError::validation(format!("日付の形式が不正です: {value}")))
}

/// 日付文字列を解析する（旧形式のタイムスタンプにも対応）
///
/// `YYYY-MM-DD` に加え、RFC 3339形式のタイムスタンプ
/// （`2024-04-14T23:00:00.000Z` など）も受け付ける。タイムスタンプは
/// ローカル日付の0時をUTCで書き出したものなので、`timezone` に変換してから
/// 日付部分を取る。
pub fn parse_date_in_zone(value: &str, timezone: Tz) -> AppResult<NaiveDate> {
    if let Ok(date) = parse_date(value) {
        return Ok(date);
    }

    let value = value.trim();
    DateTime::parse_from_rfc3339(value)
        .map(|timestamp| timestamp.with_timezone(&timezone).date_naive())
        .map_err(|_| AppError::validation(format!("日付の形式が不正です: {value}")))
}

/// 日付フィールドのシリアライズ
pub mod iso_date {
    use super::{parse_date, DATE_FORMAT};
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format(DATE_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_date(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Subscription {
        Subscription {
            id: "abc".to_string(),
            name: "Netflix".to_string(),
            logo: None,
            price: 15.49,
            currency: "USD".to_string(),
            billing_cycle: BillingCycle::Monthly,
            category: Category::Entertainment,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            next_billing_date: NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
            notify_days_before: 5,
            color: None,
        }
    }

    #[test]
    fn test_serialize_uses_camel_case_and_plain_dates() {
        let json = serde_json::to_value(sample()).unwrap();

        assert_eq!(json["billingCycle"], "monthly");
        assert_eq!(json["nextBillingDate"], "2024-02-29");
        assert_eq!(json["startDate"], "2024-01-31");
        assert_eq!(json["notifyDaysBefore"], 5);
        assert!(json.get("logo").is_none());
    }

    #[test]
    fn test_stored_record_accepts_timestamp_dates() {
        let json = r#"{
            "id": "k3x9",
            "name": "Spotify",
            "logo": "spotify.svg",
            "price": 9.99,
            "currency": "USD",
            "billingCycle": "monthly",
            "category": "music",
            "startDate": "2024-01-15T00:00:00.000Z",
            "nextBillingDate": "2024-03-15T00:00:00.000Z",
            "notifyDaysBefore": 3
        }"#;

        let stored: StoredSubscription = serde_json::from_str(json).unwrap();
        let subscription = stored.into_subscription(chrono_tz::UTC).unwrap();
        assert_eq!(
            subscription.start_date,
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
        );
        assert_eq!(
            subscription.next_billing_date,
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
        );
        assert_eq!(subscription.logo.as_deref(), Some("spotify.svg"));
        assert_eq!(subscription.color, None);
    }

    #[test]
    fn test_stored_timestamp_uses_local_date_east_of_utc() {
        // ワルシャワ（UTC+2）の4月15日0時はUTCでは前日の22時
        let json = r#"{
            "id": "lx2k9d0qz1",
            "name": "Strava",
            "price": 5.0,
            "currency": "PLN",
            "billingCycle": "monthly",
            "category": "fitness",
            "startDate": "2024-01-14T23:00:00.000Z",
            "nextBillingDate": "2024-04-14T22:00:00.000Z",
            "notifyDaysBefore": 3
        }"#;

        let stored: StoredSubscription = serde_json::from_str(json).unwrap();
        let subscription = stored
            .into_subscription(chrono_tz::Europe::Warsaw)
            .unwrap();

        assert_eq!(
            subscription.start_date,
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
        );
        assert_eq!(
            subscription.next_billing_date,
            NaiveDate::from_ymd_opt(2024, 4, 15).unwrap()
        );
    }

    #[test]
    fn test_subscription_deserialize_requires_plain_dates() {
        let json = r#"{
            "id": "abc",
            "name": "Netflix",
            "price": 15.49,
            "currency": "USD",
            "billingCycle": "monthly",
            "category": "entertainment",
            "startDate": "2024-01-31T00:00:00.000Z",
            "nextBillingDate": "2024-02-29",
            "notifyDaysBefore": 5
        }"#;
        assert!(serde_json::from_str::<Subscription>(json).is_err());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2024-02-29").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert!(parse_date("2023-02-29").is_err());
        assert!(parse_date("").is_err());
        assert!(matches!(parse_date("tomorrow"), Err(AppError::Validation(_))));
        assert!(parse_date("2024-02-29T00:00:00Z").is_err());
    }

    #[test]
    fn test_parse_date_in_zone() {
        let timestamp = "2024-04-14T23:00:00.000Z";
        assert_eq!(
            parse_date_in_zone(timestamp, chrono_tz::Europe::Warsaw).unwrap(),
            NaiveDate::from_ymd_opt(2024, 4, 15).unwrap()
        );
        assert_eq!(
            parse_date_in_zone(timestamp, chrono_tz::Asia::Tokyo).unwrap(),
            NaiveDate::from_ymd_opt(2024, 4, 15).unwrap()
        );
        assert_eq!(
            parse_date_in_zone(timestamp, chrono_tz::UTC).unwrap(),
            NaiveDate::from_ymd_opt(2024, 4, 14).unwrap()
        );
        // 日付のみの形式はタイムゾーンの影響を受けない
        assert_eq!(
            parse_date_in_zone("2024-04-15", chrono_tz::America::New_York).unwrap(),
            NaiveDate::from_ymd_opt(2024, 4, 15).unwrap()
        );
        assert!(parse_date_in_zone("15.04.2024", chrono_tz::UTC).is_err());
    }

    #[test]
    fn test_is_renewing_soon_is_exact_match() {
        let subscription = sample();
        let five_days_before = NaiveDate::from_ymd_opt(2024, 2, 24)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let six_days_before = NaiveDate::from_ymd_opt(2024, 2, 23)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let four_days_before = NaiveDate::from_ymd_opt(2024, 2, 25)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();

        assert!(subscription.is_renewing_soon(five_days_before));
        assert!(!subscription.is_renewing_soon(six_days_before));
        assert!(!subscription.is_renewing_soon(four_days_before));
    }

    #[test]
    fn test_display_color_falls_back_to_category() {
        let mut subscription = sample();
        assert_eq!(subscription.display_color(), "#E50914");

        subscription.color = Some("#123456".to_string());
        assert_eq!(subscription.display_color(), "#123456");
    }

    #[test]
    fn test_explicit_next_billing_date() {
        let mut form = SubscriptionFormData {
            name: "Strava".to_string(),
            logo: None,
            price: 5.0,
            currency: "EUR".to_string(),
            billing_cycle: BillingCycle::Yearly,
            category: Category::Fitness,
            start_date: "2024-01-01".to_string(),
            next_billing_date: None,
            notify_days_before: 7,
            color: None,
        };
        assert_eq!(form.explicit_next_billing_date(), None);

        form.next_billing_date = Some("  ".to_string());
        assert_eq!(form.explicit_next_billing_date(), None);

        form.next_billing_date = Some("2025-01-01".to_string());
        assert_eq!(form.explicit_next_billing_date(), Some("2025-01-01"));
    }
}
