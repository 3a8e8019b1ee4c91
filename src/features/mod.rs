/// 機能別モジュール
///
/// 各機能モジュールは、その機能に関連するコード（モデル、コマンド、永続化、サービス）
/// を含む自己完結型のユニットです。
pub mod billing;
pub mod notifications;
pub mod storage;
pub mod subscriptions;
