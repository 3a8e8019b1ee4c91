/// 請求計算モジュール
///
/// 支払いサイクルに基づく次回請求日の算出、年額・月額の集計、
/// 残り日数の計算を提供します。すべて副作用のない純粋関数です。
pub mod calculator;
pub mod models;

pub use calculator::{
    cycles_per_year, days_remaining, monthly_cost, next_occurrence, yearly_cost, Billable,
};
pub use models::{BillingCycle, Category};
