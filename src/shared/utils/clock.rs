use chrono::{NaiveDateTime, Utc};
use chrono_tz::Tz;

/// 現在時刻の取得元
///
/// 日付計算はすべてローカル時刻（タイムゾーン適用後の壁時計）で行うため、
/// `NaiveDateTime` を返す。
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    /// 壁時計のタイムゾーン
    ///
    /// UTCで保存された旧形式の日付をローカル日付に戻すときに使う。
    fn timezone(&self) -> Tz;
}

/// 設定されたタイムゾーンでシステム時刻を返す時計
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    timezone: Tz,
}

impl SystemClock {
    pub fn new(timezone: Tz) -> Self {
        Self { timezone }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new(chrono_tz::Asia::Tokyo)
    }
}

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.timezone).naive_local()
    }

    fn timezone(&self) -> Tz {
        self.timezone
    }
}

/// 常に同じ時刻を返す時計（テスト用）
///
/// タイムゾーンは指定しなければUTC。
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: NaiveDateTime,
    timezone: Tz,
}

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now,
            timezone: chrono_tz::UTC,
        }
    }

    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.now
    }

    fn timezone(&self) -> Tz {
        self.timezone
    }
}
