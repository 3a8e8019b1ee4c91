use crate::shared::errors::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 支払いサイクル
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl BillingCycle {
    pub const ALL: [BillingCycle; 4] = [
        BillingCycle::Weekly,
        BillingCycle::Monthly,
        BillingCycle::Quarterly,
        BillingCycle::Yearly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BillingCycle::Weekly => "weekly",
            BillingCycle::Monthly => "monthly",
            BillingCycle::Quarterly => "quarterly",
            BillingCycle::Yearly => "yearly",
        }
    }
}

impl fmt::Display for BillingCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BillingCycle {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BillingCycle::ALL
            .into_iter()
            .find(|cycle| cycle.as_str() == s)
            .ok_or_else(|| {
                AppError::validation(
                    "支払いサイクルは'weekly'、'monthly'、'quarterly'、'yearly'のいずれかである必要があります",
                )
            })
    }
}

/// サブスクリプションのカテゴリ
///
/// 並び順は宣言順（グループ表示の順序として使う）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Entertainment,
    Fitness,
    Gaming,
    Productivity,
    Music,
    Other,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Entertainment,
        Category::Fitness,
        Category::Gaming,
        Category::Productivity,
        Category::Music,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Entertainment => "entertainment",
            Category::Fitness => "fitness",
            Category::Gaming => "gaming",
            Category::Productivity => "productivity",
            Category::Music => "music",
            Category::Other => "other",
        }
    }

    /// カテゴリの既定の表示色
    pub fn default_color(&self) -> &'static str {
        match self {
            Category::Entertainment => "#E50914",
            Category::Fitness => "#4CAF50",
            Category::Gaming => "#7CBB00",
            Category::Productivity => "#0078D7",
            Category::Music => "#1DB954",
            Category::Other => "#9B59B6",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| AppError::validation(format!("不明なカテゴリです: {s}")))
    }
}
