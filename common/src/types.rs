//! 行データの型定義
//!
//! - RawRow: スプレッドシートから読み込んだままの行
//! - AttributeRow: 前方補完・並び替え済みの行（表示用と照合用のラベルを持つ）
//! - RowSet: 1画像分の行

use serde::{Deserialize, Serialize};

/// 読み込んだままの1行
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRow {
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub cat: String,
    #[serde(default)]
    pub subcat: String,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: String,
}

impl RawRow {
    pub fn new(image: &str, cat: &str, subcat: &str, key: &str, value: &str) -> Self {
        Self {
            image: image.to_string(),
            cat: cat.to_string(),
            subcat: subcat.to_string(),
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}

/// 読み込んだままの表
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTable {
    pub rows: Vec<RawRow>,
}

/// 比較対象のソース
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSource {
    /// VLM解析結果
    Vlm,
    /// ベンダー解析結果
    Vendor,
}

impl CandidateSource {
    pub const ALL: [CandidateSource; 2] = [CandidateSource::Vlm, CandidateSource::Vendor];

    pub fn label(&self) -> &'static str {
        match self {
            CandidateSource::Vlm => "VLM",
            CandidateSource::Vendor => "Vendor",
        }
    }
}

impl std::fmt::Display for CandidateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// 属性1件
///
/// `cat` / `subcat` は表示用で、グループの先頭行以外は空になる。
/// 同一性の判定には必ず `cat_match` / `subcat_match` を使う。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeRow {
    pub cat: String,
    pub subcat: String,
    pub key: String,
    pub value: String,
    /// 照合用の大分類（前方補完済み）
    pub cat_match: String,
    /// 照合用の小分類（前方補完済み、マーケティング行は常に空）
    pub subcat_match: String,
    /// 正解データから補われた欠落行
    #[serde(default)]
    pub is_missing: bool,
    /// グループは存在し、キーだけが欠落
    #[serde(default)]
    pub is_missing_key_only: bool,
}

impl AttributeRow {
    /// 照合用ラベルを表示用にもそのまま使う行
    pub fn filled(cat: &str, subcat: &str, key: &str, value: &str) -> Self {
        Self {
            cat: cat.to_string(),
            subcat: subcat.to_string(),
            key: key.to_string(),
            value: value.to_string(),
            cat_match: cat.to_string(),
            subcat_match: subcat.to_string(),
            ..Default::default()
        }
    }

    /// キーが空ならマーケティング行（画像全体の属性）
    pub fn is_marketing(&self) -> bool {
        self.key.trim().is_empty()
    }

    pub fn has_value(&self) -> bool {
        !self.value.trim().is_empty()
    }

    /// 解析失敗の記録行
    pub fn is_error(&self) -> bool {
        self.cat_match.trim() == ERROR_CATEGORY
    }
}

/// 解析失敗行の大分類（小文字化後）
pub const ERROR_CATEGORY: &str = "error";

/// 1画像・1ソース分の行
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowSet {
    /// ファイルに書かれていた画像名（最初の出現）
    pub image: String,
    /// 結合キー（正規化済み画像名）
    pub image_key: String,
    pub rows: Vec<AttributeRow>,
}

impl RowSet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 全行が解析失敗行
    pub fn is_failed(&self) -> bool {
        !self.rows.is_empty() && self.rows.iter().all(AttributeRow::is_error)
    }

    pub fn has_error_rows(&self) -> bool {
        self.rows.iter().any(AttributeRow::is_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marketing_row() {
        let row = AttributeRow::filled("mood", "", "", "calm");
        assert!(row.is_marketing());
        assert!(row.has_value());

        let product = AttributeRow::filled("outer", "jacket", "color", "");
        assert!(!product.is_marketing());
        assert!(!product.has_value());
    }

    #[test]
    fn test_failed_row_set() {
        let failed = RowSet {
            image: "a.jpg".into(),
            image_key: "a".into(),
            rows: vec![AttributeRow::filled("error", "", "exception", "timeout")],
        };
        assert!(failed.is_failed());

        let partial = RowSet {
            rows: vec![
                AttributeRow::filled("error", "", "exception", "timeout"),
                AttributeRow::filled("mood", "", "", "calm"),
            ],
            ..failed.clone()
        };
        assert!(!partial.is_failed());
        assert!(partial.has_error_rows());

        assert!(!RowSet::default().is_failed());
    }

    #[test]
    fn test_candidate_source_serde() {
        let json = serde_json::to_string(&CandidateSource::Vendor).unwrap();
        assert_eq!(json, "\"vendor\"");
        assert_eq!(CandidateSource::Vlm.to_string(), "VLM");
    }
}
