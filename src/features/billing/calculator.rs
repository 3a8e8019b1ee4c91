use super::models::BillingCycle;
use crate::shared::errors::{AppError, AppResult};
use chrono::{Days, Months, NaiveDate, NaiveDateTime};

/// 年額計算の対象になるもの
pub trait Billable {
    fn price(&self) -> f64;
    fn billing_cycle(&self) -> BillingCycle;
}

/// 1年あたりの請求回数
pub fn cycles_per_year(cycle: BillingCycle) -> u32 {
    match cycle {
        BillingCycle::Weekly => 52,
        BillingCycle::Monthly => 12,
        BillingCycle::Quarterly => 4,
        BillingCycle::Yearly => 1,
    }
}

/// 次回請求日を計算する
///
/// `start_date + k * cycle`（k >= 0）の数列のうち、`reference` より後にある最初の日付を返す。
/// 日付はその日の0時として比較するため、`reference` と同じ日は含まれない。
///
/// 月・年単位の加算は常に開始日から数えるので、月末クランプ後も日付がずれない
/// （1月31日開始なら 2月29日、3月31日、4月30日 ...）。
///
/// # 引数
/// * `start_date` - 契約開始日
/// * `cycle` - 支払いサイクル
/// * `reference` - 基準時刻（通常は現在時刻）
///
/// # 戻り値
/// 次回請求日、または暦の範囲を超えた場合はバリデーションエラー
pub fn next_occurrence(
    start_date: NaiveDate,
    cycle: BillingCycle,
    reference: NaiveDateTime,
) -> AppResult<NaiveDate> {
    next_occurrence_with_index(start_date, cycle, reference).map(|(date, _)| date)
}

fn next_occurrence_with_index(
    start_date: NaiveDate,
    cycle: BillingCycle,
    reference: NaiveDateTime,
) -> AppResult<(NaiveDate, u32)> {
    let reference_date = reference.date();
    let mut index: u32 = 0;

    loop {
        let candidate = nth_occurrence(start_date, cycle, index)?;
        if candidate > reference_date {
            return Ok((candidate, index));
        }
        index = index.checked_add(1).ok_or_else(out_of_range)?;
    }
}

/// 開始日から `index` 回目の請求日
fn nth_occurrence(start_date: NaiveDate, cycle: BillingCycle, index: u32) -> AppResult<NaiveDate> {
    let date = match cycle {
        BillingCycle::Weekly => start_date.checked_add_days(Days::new(7 * u64::from(index))),
        BillingCycle::Monthly => start_date.checked_add_months(Months::new(index)),
        BillingCycle::Quarterly => index
            .checked_mul(3)
            .and_then(|months| start_date.checked_add_months(Months::new(months))),
        BillingCycle::Yearly => index
            .checked_mul(12)
            .and_then(|months| start_date.checked_add_months(Months::new(months))),
    };

    date.ok_or_else(out_of_range)
}

fn out_of_range() -> AppError {
    AppError::validation("請求日が日付の範囲を超えています")
}

/// 年間の支払い見込み額を計算する
///
/// 通貨換算は行わない。全件が同じ通貨の場合のみ意味のある合計になる。
pub fn yearly_cost<'a, T, I>(subscriptions: I) -> f64
where
    T: Billable + 'a,
    I: IntoIterator<Item = &'a T>,
{
    subscriptions.into_iter().fold(0.0, |total, sub| {
        total + sub.price() * f64::from(cycles_per_year(sub.billing_cycle()))
    })
}

/// 月平均の支払い見込み額（年額 / 12）
pub fn monthly_cost<'a, T, I>(subscriptions: I) -> f64
where
    T: Billable + 'a,
    I: IntoIterator<Item = &'a T>,
{
    yearly_cost(subscriptions) / 12.0
}

/// 目標日までの残り日数
///
/// 両者を0時に揃えてから差を取るので、時刻成分は結果に影響しない。
/// 過去の日付では負の値になる。
pub fn days_remaining(target: NaiveDate, reference: NaiveDateTime) -> i64 {
    target.signed_duration_since(reference.date()).num_days()
}
