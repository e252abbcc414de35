//! 大分類の並び順
//!
//! マーケティング項目 → 商品カテゴリ（アウター、インナー、ボトム…）の順に並べる。
//! 未知のカテゴリは末尾、空のカテゴリはさらにその後ろ。

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 未知カテゴリの順位
pub const UNKNOWN_RANK: u32 = 100;

/// 空カテゴリの順位
pub const BLANK_RANK: u32 = 999;

const DEFAULT_ORDER: &[(&str, u32)] = &[
    // マーケティング
    ("age group", 1),
    ("color tone filter", 2),
    ("coordination method", 3),
    ("gender", 4),
    ("skin tone", 5),
    ("pose", 6),
    ("hair style", 7),
    ("expression", 8),
    ("gaze direction", 9),
    ("fashion style", 10),
    ("location", 11),
    ("mood", 12),
    ("number of people", 13),
    ("overall fashion color tone", 14),
    ("season weather", 15),
    ("shooting composition", 16),
    // 商品カテゴリ
    ("outer", 20),
    ("inner", 21),
    ("bottom", 22),
    ("shoes", 23),
    ("bag", 24),
    ("accessories", 25),
    ("neckwear", 26),
    ("headwear", 27),
    ("eyewear", 28),
    ("hosiery", 29),
    ("onepiece", 30),
    ("swimwear", 31),
];

/// カテゴリ名 → 順位
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryOrder {
    ranks: HashMap<String, u32>,
}

impl Default for CategoryOrder {
    fn default() -> Self {
        Self {
            ranks: DEFAULT_ORDER
                .iter()
                .map(|(name, rank)| (name.to_string(), *rank))
                .collect(),
        }
    }
}

impl CategoryOrder {
    /// JSON（`{"カテゴリ名": 順位}`）から読み込み
    pub fn from_json(json: &str) -> Result<Self> {
        let ranks: HashMap<String, u32> = serde_json::from_str(json)?;
        if ranks.is_empty() {
            return Err(Error::EmptyCategoryOrder);
        }
        Ok(Self {
            ranks: ranks
                .into_iter()
                .map(|(name, rank)| (name.trim().to_lowercase(), rank))
                .collect(),
        })
    }

    /// JSONファイルから読み込み
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn rank(&self, category: &str) -> u32 {
        let category = category.trim().to_lowercase();
        if category.is_empty() {
            return BLANK_RANK;
        }
        self.ranks.get(&category).copied().unwrap_or(UNKNOWN_RANK)
    }

    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_order_marketing_first() {
        let order = CategoryOrder::default();
        assert!(order.rank("mood") < order.rank("outer"));
        assert!(order.rank("outer") < order.rank("inner"));
        assert_eq!(order.rank("Outer "), 20);
    }

    #[test]
    fn test_unknown_and_blank_last() {
        let order = CategoryOrder::default();
        assert_eq!(order.rank("cape"), UNKNOWN_RANK);
        assert_eq!(order.rank(""), BLANK_RANK);
        assert!(order.rank("swimwear") < order.rank("cape"));
    }

    #[test]
    fn test_from_json() {
        let order = CategoryOrder::from_json(r#"{"Bag": 1, "outer": 2}"#).unwrap();
        assert_eq!(order.rank("bag"), 1);
        assert_eq!(order.rank("mood"), UNKNOWN_RANK);
        assert_eq!(order.len(), 2);
    }

    #[test]
    fn test_from_json_empty() {
        let result = CategoryOrder::from_json("{}");
        assert!(matches!(result, Err(Error::EmptyCategoryOrder)));
    }
}
