use super::notifier::Notifier;
use super::renewal::check_renewals;
use crate::features::subscriptions::store::SharedSnapshot;
use crate::shared::utils::Clock;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// 更新チェックを定期実行するタスク
///
/// 読み込み時に一度チェック済みなので、最初の実行は1周期後。
/// `shutdown` か破棄でキャンセルされる。
pub struct RenewalScheduler {
    cancellation_token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl RenewalScheduler {
    /// 定期チェックを開始する
    ///
    /// # 引数
    /// * `snapshot` - ストアと共有するサブスクリプション一覧
    /// * `notifier` - 通知先
    /// * `clock` - 現在時刻の取得元
    /// * `period` - チェック間隔
    ///
    /// # 戻り値
    /// 実行中のスケジューラー
    ///
    /// # パニック
    /// 現在のtokioランタイム上にタスクを生成するため、ランタイムの外から
    /// 呼び出すとパニックする。
    pub fn start(
        snapshot: SharedSnapshot,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        period: Duration,
    ) -> Self {
        let period = period.max(Duration::from_secs(1));
        let cancellation_token = CancellationToken::new();
        let token = cancellation_token.clone();

        let handle = tokio::spawn(async move {
            let mut timer = tokio::time::interval_at(Instant::now() + period, period);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

            log::info!("更新チェックを開始しました: 間隔={}秒", period.as_secs());

            loop {
                tokio::select! {
                    _ = token.cancelled() => {
                        log::info!("更新チェックを停止しました");
                        break;
                    }
                    _ = timer.tick() => {
                        run_check(&snapshot, notifier.as_ref(), clock.as_ref());
                    }
                }
            }
        });

        Self {
            cancellation_token,
            handle: Some(handle),
        }
    }

    /// タスクが動作中かどうか
    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// タスクをキャンセルし、終了を待つ
    pub async fn shutdown(mut self) {
        self.cancellation_token.cancel();

        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                log::error!("更新チェックタスクの終了待ちに失敗しました: {e}");
            }
        }
    }
}

impl Drop for RenewalScheduler {
    fn drop(&mut self) {
        self.cancellation_token.cancel();
    }
}

fn run_check(snapshot: &SharedSnapshot, notifier: &dyn Notifier, clock: &dyn Clock) {
    match snapshot.read() {
        Ok(subscriptions) => {
            check_renewals(&subscriptions, clock.now(), notifier);
        }
        Err(e) => {
            log::error!("スナップショットの読み取りに失敗しました: {e}");
        }
    }
}
