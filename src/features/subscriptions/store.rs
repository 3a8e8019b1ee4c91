use super::models::{parse_date_in_zone, StoredSubscription, Subscription, SubscriptionFormData};
use super::views;
use crate::features::billing::{monthly_cost, next_occurrence, yearly_cost, Category};
use crate::features::notifications::{check_renewals, Notifier};
use crate::features::storage::{KeyValueStore, SUBSCRIPTIONS_KEY};
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::{generate_subscription_id, Clock};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

/// ストアと定期チェックで共有するサブスクリプション一覧
///
/// 更新時は新しい `Vec` を作ってから丸ごと差し替える。
pub type SharedSnapshot = Arc<RwLock<Vec<Subscription>>>;

const ERROR_TITLE: &str = "エラー";
const SAVE_ERROR_TITLE: &str = "保存エラー";

/// ストアの読み込み状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    Loading,
    Ready,
}

/// サブスクリプション一覧を保持し、永続化と同期するストア
pub struct SubscriptionStore {
    storage: Arc<dyn KeyValueStore>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    snapshot: SharedSnapshot,
    phase: LoadPhase,
}

impl SubscriptionStore {
    /// 読み込み前のストアを作成する
    ///
    /// # 引数
    /// * `storage` - スナップショットの保存先
    /// * `notifier` - ユーザー向け通知の送信先
    /// * `clock` - 現在時刻の取得元
    pub fn new(
        storage: Arc<dyn KeyValueStore>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            storage,
            notifier,
            clock,
            snapshot: Arc::new(RwLock::new(Vec::new())),
            phase: LoadPhase::Loading,
        }
    }

    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    pub fn is_ready(&self) -> bool {
        self.phase == LoadPhase::Ready
    }

    /// 定期チェックと共有するためのハンドル
    pub fn snapshot_handle(&self) -> SharedSnapshot {
        Arc::clone(&self.snapshot)
    }

    /// 保存されたスナップショットを読み込む
    ///
    /// 未保存の場合は空の一覧で開始する。読み込みや解析に失敗した場合も
    /// ログに記録したうえで空の一覧として扱い、ユーザーには通知しない。
    /// 読み込み後に一度だけ更新チェックを行う。
    ///
    /// # 戻り値
    /// 読み込んだ件数、またはロック取得に失敗した場合はエラー
    pub fn load(&mut self) -> AppResult<usize> {
        self.phase = LoadPhase::Loading;

        let subscriptions = match self.read_persisted() {
            Ok(subscriptions) => subscriptions,
            Err(e) => {
                log::error!("サブスクリプションの読み込みに失敗しました: {}", e.details());
                Vec::new()
            }
        };
        let count = subscriptions.len();

        *self.snapshot.write()? = subscriptions;
        self.phase = LoadPhase::Ready;

        log::info!("サブスクリプションを{count}件読み込みました");

        self.check_renewals()?;
        Ok(count)
    }

    /// 旧形式のタイムスタンプは時計のタイムゾーンでローカル日付に戻す
    fn read_persisted(&self) -> AppResult<Vec<Subscription>> {
        let json = match self.storage.get(SUBSCRIPTIONS_KEY)? {
            Some(json) => json,
            None => return Ok(Vec::new()),
        };

        let records: Vec<StoredSubscription> = serde_json::from_str(&json)?;
        let timezone = self.clock.timezone();
        records
            .into_iter()
            .map(|record| record.into_subscription(timezone))
            .collect()
    }

    /// 現在の一覧のコピー
    pub fn subscriptions(&self) -> AppResult<Vec<Subscription>> {
        Ok(self.snapshot.read()?.clone())
    }

    pub fn len(&self) -> AppResult<usize> {
        Ok(self.snapshot.read()?.len())
    }

    pub fn is_empty(&self) -> AppResult<bool> {
        Ok(self.len()? == 0)
    }

    /// IDでサブスクリプションを取得する
    pub fn find(&self, id: &str) -> AppResult<Option<Subscription>> {
        Ok(self.snapshot.read()?.iter().find(|s| s.id == id).cloned())
    }

    /// サブスクリプションを追加する
    ///
    /// IDを新規に割り当て、次回請求日が未指定なら開始日から計算する。
    /// 入力の検証はフォーム層の責務で、ここでは行わない。
    ///
    /// # 引数
    /// * `form` - フォームデータ
    ///
    /// # 戻り値
    /// 追加されたサブスクリプション、または失敗時はエラー（一覧は変更されない）
    pub fn add(&mut self, form: SubscriptionFormData) -> AppResult<Subscription> {
        self.ensure_ready()?;

        let mut next = self.subscriptions()?;
        let id = unique_id(&next);

        let subscription = match self.build_record(id, form) {
            Ok(subscription) => subscription,
            Err(e) => return Err(self.report_failure("追加", e)),
        };

        next.push(subscription.clone());
        self.commit(next)?;

        log::info!("サブスクリプションを追加しました: id={}", subscription.id);
        self.notifier.notify(
            "サブスクリプションを追加しました",
            &format!("{} を追加しました。", subscription.name),
        );

        Ok(subscription)
    }

    /// サブスクリプションを更新する
    ///
    /// IDは維持し、それ以外のフィールドはすべて置き換える。
    /// 次回請求日は追加時と同じ規則で決まる。
    ///
    /// # 引数
    /// * `id` - サブスクリプションID
    /// * `form` - フォームデータ
    ///
    /// # 戻り値
    /// 更新されたサブスクリプション、IDが存在しない場合はNotFound
    pub fn update(&mut self, id: &str, form: SubscriptionFormData) -> AppResult<Subscription> {
        self.ensure_ready()?;

        let mut next = self.subscriptions()?;
        let position = next
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| not_found(id))?;

        let subscription = match self.build_record(id.to_string(), form) {
            Ok(subscription) => subscription,
            Err(e) => return Err(self.report_failure("更新", e)),
        };

        next[position] = subscription.clone();
        self.commit(next)?;

        log::info!("サブスクリプションを更新しました: id={id}");
        self.notifier.notify(
            "サブスクリプションを更新しました",
            &format!("{} を更新しました。", subscription.name),
        );

        Ok(subscription)
    }

    /// サブスクリプションを削除する
    ///
    /// # 戻り値
    /// 削除されたサブスクリプション、IDが存在しない場合はNotFound
    pub fn remove(&mut self, id: &str) -> AppResult<Subscription> {
        self.ensure_ready()?;

        let mut next = self.subscriptions()?;
        let position = next
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| not_found(id))?;

        let removed = next.remove(position);
        self.commit(next)?;

        log::info!("サブスクリプションを削除しました: id={id}");
        self.notifier.notify(
            "サブスクリプションを削除しました",
            &format!("{} を一覧から削除しました。", removed.name),
        );

        Ok(removed)
    }

    /// 現在の一覧をスナップショットとして保存する
    pub fn save(&self) -> AppResult<()> {
        let json = {
            let subscriptions = self.snapshot.read()?;
            serde_json::to_string(&*subscriptions)?
        };
        self.storage.set(SUBSCRIPTIONS_KEY, &json)
    }

    /// 年間の支払い見込み額
    pub fn yearly_cost(&self) -> AppResult<f64> {
        Ok(yearly_cost(self.snapshot.read()?.iter()))
    }

    /// 月平均の支払い見込み額
    pub fn monthly_cost(&self) -> AppResult<f64> {
        Ok(monthly_cost(self.snapshot.read()?.iter()))
    }

    /// カテゴリ別の一覧
    pub fn group_by_category(&self) -> AppResult<BTreeMap<Category, Vec<Subscription>>> {
        Ok(views::group_by_category(&self.snapshot.read()?))
    }

    /// 次回請求日が近い順の一覧
    pub fn upcoming(&self, limit: usize) -> AppResult<Vec<Subscription>> {
        Ok(views::upcoming(&self.snapshot.read()?, limit))
    }

    /// 現在時刻で「もうすぐ更新」に該当するもの
    pub fn renewing_soon(&self) -> AppResult<Vec<Subscription>> {
        Ok(views::renewing_soon(&self.snapshot.read()?, self.clock.now()))
    }

    /// 更新チェックを実行し、該当するものを通知する
    ///
    /// # 戻り値
    /// 送信した通知の件数
    pub fn check_renewals(&self) -> AppResult<usize> {
        let subscriptions = self.snapshot.read()?;
        Ok(check_renewals(
            &subscriptions,
            self.clock.now(),
            self.notifier.as_ref(),
        ))
    }

    fn ensure_ready(&self) -> AppResult<()> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(AppError::invalid_state(
                "サブスクリプションの読み込みが完了していません",
            ))
        }
    }

    /// フォームデータからレコードを組み立てる
    fn build_record(&self, id: String, form: SubscriptionFormData) -> AppResult<Subscription> {
        let timezone = self.clock.timezone();
        let start_date = parse_date_in_zone(&form.start_date, timezone)?;
        let next_billing_date = match form.explicit_next_billing_date() {
            Some(explicit) => parse_date_in_zone(explicit, timezone)?,
            None => next_occurrence(start_date, form.billing_cycle, self.clock.now())?,
        };

        Ok(Subscription {
            id,
            name: form.name,
            logo: form.logo,
            price: form.price,
            currency: form.currency,
            billing_cycle: form.billing_cycle,
            category: form.category,
            start_date,
            next_billing_date,
            notify_days_before: form.notify_days_before,
            color: form.color,
        })
    }

    /// 新しい一覧に差し替えて保存する
    ///
    /// 保存の失敗は操作の失敗にはせず、ログと通知で知らせる。
    fn commit(&self, next: Vec<Subscription>) -> AppResult<()> {
        *self.snapshot.write()? = next;

        if let Err(e) = self.save() {
            log::error!("スナップショットの保存に失敗しました: {}", e.details());
            self.notifier
                .notify(SAVE_ERROR_TITLE, "変更を保存できませんでした。");
        }
        Ok(())
    }

    fn report_failure(&self, action: &str, error: AppError) -> AppError {
        log::error!("サブスクリプションの{action}に失敗しました: {}", error.details());
        self.notifier.notify(
            ERROR_TITLE,
            &format!("サブスクリプションの{action}に失敗しました。"),
        );
        error
    }
}

/// 既存の一覧と重複しないIDを生成する
fn unique_id(existing: &[Subscription]) -> String {
    loop {
        let id = generate_subscription_id();
        if !existing.iter().any(|s| s.id == id) {
            return id;
        }
    }
}

fn not_found(id: &str) -> AppError {
    AppError::not_found(format!("ID {id} のサブスクリプション"))
}
