use std::sync::Mutex;

/// ユーザー向けの一時的な通知を表示する窓口
///
/// 受領確認や再送の仕組みは持たない。
pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, description: &str);
}

/// ログに通知を書き出す実装
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, title: &str, description: &str) {
        log::info!("[通知] {title}: {description}");
    }
}

/// 通知を溜めておき、後から取り出せる実装
#[derive(Debug, Default)]
pub struct CollectingNotifier {
    messages: Mutex<Vec<(String, String)>>,
}

impl CollectingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// これまでの通知のコピー
    pub fn messages(&self) -> Vec<(String, String)> {
        self.messages
            .lock()
            .map(|messages| messages.clone())
            .unwrap_or_default()
    }

    /// 溜まった通知を取り出して空にする
    pub fn take(&self) -> Vec<(String, String)> {
        self.messages
            .lock()
            .map(|mut messages| std::mem::take(&mut *messages))
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.messages.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Notifier for CollectingNotifier {
    fn notify(&self, title: &str, description: &str) {
        match self.messages.lock() {
            Ok(mut messages) => messages.push((title.to_string(), description.to_string())),
            Err(e) => log::error!("通知の記録に失敗しました: {e}"),
        }
    }
}
