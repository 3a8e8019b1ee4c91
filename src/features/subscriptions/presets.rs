use super::models::SubscriptionFormData;
use crate::features::billing::Category;
use serde::Serialize;

/// クイック選択に表示する件数
pub const QUICK_SELECT_COUNT: usize = 8;

/// よく使われるサービスの既定値
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ServicePreset {
    pub name: &'static str,
    pub category: Category,
    pub logo: &'static str,
}

impl ServicePreset {
    const fn new(name: &'static str, category: Category, logo: &'static str) -> Self {
        Self {
            name,
            category,
            logo,
        }
    }

    /// フォームにサービス名・カテゴリ・ロゴを設定する
    ///
    /// 金額や支払いサイクルなど、それ以外の入力はそのまま残す。
    pub fn apply_to(&self, form: &mut SubscriptionFormData) {
        form.name = self.name.to_string();
        form.category = self.category;
        form.logo = Some(self.logo.to_string());
    }
}

/// 既定のサービス一覧（クイック選択の表示順）
pub static DEFAULT_SERVICES: [ServicePreset; 12] = [
    ServicePreset::new("Netflix", Category::Entertainment, "netflix.svg"),
    ServicePreset::new("Spotify", Category::Music, "spotify.svg"),
    ServicePreset::new("HBO Max", Category::Entertainment, "hbomax.svg"),
    ServicePreset::new("Disney+", Category::Entertainment, "disneyplus.svg"),
    ServicePreset::new("Xbox Game Pass", Category::Gaming, "xbox.svg"),
    ServicePreset::new("PlayStation Plus", Category::Gaming, "playstation.svg"),
    ServicePreset::new("Amazon Prime", Category::Entertainment, "prime.svg"),
    ServicePreset::new("YouTube Premium", Category::Entertainment, "youtube.svg"),
    ServicePreset::new("Apple TV+", Category::Entertainment, "appletv.svg"),
    ServicePreset::new("Apple Music", Category::Music, "applemusic.svg"),
    ServicePreset::new("Strava", Category::Fitness, "strava.svg"),
    ServicePreset::new("Microsoft 365", Category::Productivity, "microsoft365.svg"),
];

/// サービス名（完全一致）で既定値を探す
pub fn find_service(name: &str) -> Option<&'static ServicePreset> {
    DEFAULT_SERVICES.iter().find(|service| service.name == name)
}

/// クイック選択に並べるサービス
pub fn quick_select_services() -> &'static [ServicePreset] {
    &DEFAULT_SERVICES[..QUICK_SELECT_COUNT]
}
