//! セル単位の判定
//!
//! 候補の表示用テーブルの各行を正解データと照らし合わせて分類する。
//! 判定は比較のたびに計算し直し、保存しない。

use crate::fuzzy::{subcat_fuzzy_match, word_overlap};
use crate::lookup::AttributeIndex;
use crate::types::AttributeRow;
use serde::{Deserialize, Serialize};

/// 行の判定結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchVerdict {
    /// 値が一致
    Match,
    /// 値が不一致
    Mismatch,
    /// 正解にあるが候補に無い
    Missing,
    /// 正解に無い値（既存の大分類内）
    ExtraSameGroup,
    /// 正解に無い大分類の値
    ExtraNewGroup,
}

impl MatchVerdict {
    pub fn label(&self) -> &'static str {
        match self {
            MatchVerdict::Match => "一致",
            MatchVerdict::Mismatch => "不一致",
            MatchVerdict::Missing => "欠落",
            MatchVerdict::ExtraSameGroup => "追加",
            MatchVerdict::ExtraNewGroup => "追加（新規分類）",
        }
    }
}

/// 背景色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fill {
    Red,
    Green,
}

impl Fill {
    pub fn rgb(&self) -> u32 {
        match self {
            Fill::Red => 0xF8D7DA,
            Fill::Green => 0xD4EDDA,
        }
    }
}

/// 1行分の塗り分け
///
/// `row` が設定されていれば行全体、そうでなければ小分類・値セルを個別に塗る。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellFills {
    pub row: Option<Fill>,
    pub subcat: Option<Fill>,
    pub value: Option<Fill>,
}

/// 判定付きの行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerdictRow {
    pub cat: String,
    pub subcat: String,
    pub key: String,
    pub value: String,
    pub cat_match: String,
    pub subcat_match: String,
    pub is_missing: bool,
    pub is_missing_key_only: bool,
    /// 大分類は正解にあるが、小分類がどれとも一致しない
    pub subcat_wrong: bool,
    pub verdict: Option<MatchVerdict>,
}

impl VerdictRow {
    pub fn fills(&self) -> CellFills {
        let mut fills = CellFills::default();
        if self.subcat_wrong {
            fills.subcat = Some(Fill::Red);
        }
        match self.verdict {
            Some(MatchVerdict::Missing) if self.is_missing && !self.is_missing_key_only => {
                fills.row = Some(Fill::Red);
            }
            Some(MatchVerdict::ExtraNewGroup) => fills.row = Some(Fill::Red),
            Some(MatchVerdict::Mismatch) | Some(MatchVerdict::Missing) => {
                fills.value = Some(Fill::Red);
            }
            Some(MatchVerdict::ExtraSameGroup) => fills.value = Some(Fill::Green),
            Some(MatchVerdict::Match) | None => {}
        }
        fills
    }
}

/// 1画像・1ソース分の判定付きテーブル
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerdictTable {
    pub rows: Vec<VerdictRow>,
}

impl VerdictTable {
    pub fn count(&self, verdict: MatchVerdict) -> usize {
        self.rows
            .iter()
            .filter(|r| r.verdict == Some(verdict))
            .count()
    }

    pub fn subcat_wrong_count(&self) -> usize {
        self.rows.iter().filter(|r| r.subcat_wrong).count()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// 候補の1行を判定する
pub fn classify_row(row: &AttributeRow, ground_truth: &AttributeIndex) -> Option<MatchVerdict> {
    if row.is_missing {
        return Some(MatchVerdict::Missing);
    }

    match ground_truth.resolve_row(row) {
        Some(hit) if row.has_value() => {
            if word_overlap(&hit.entry.value, &row.value) {
                Some(MatchVerdict::Match)
            } else {
                Some(MatchVerdict::Mismatch)
            }
        }
        Some(_) => Some(MatchVerdict::Missing),
        None if row.has_value() => {
            if !row.is_marketing() && !ground_truth.has_category(&row.cat_match) {
                Some(MatchVerdict::ExtraNewGroup)
            } else {
                Some(MatchVerdict::ExtraSameGroup)
            }
        }
        None => None,
    }
}

/// 小分類の誤り
pub fn is_subcat_wrong(row: &AttributeRow, ground_truth: &AttributeIndex) -> bool {
    if row.is_marketing() || row.subcat_match.is_empty() {
        return false;
    }
    let mut known = ground_truth.subcategories_of(&row.cat_match).peekable();
    if known.peek().is_none() {
        return false;
    }
    !known.any(|gt_subcat| subcat_fuzzy_match(&row.subcat_match, gt_subcat))
}

/// 表示用テーブル全体を判定する
pub fn classify_rows(rows: &[AttributeRow], ground_truth: &AttributeIndex) -> VerdictTable {
    let rows = rows
        .iter()
        .map(|row| VerdictRow {
            cat: row.cat.clone(),
            subcat: row.subcat.clone(),
            key: row.key.clone(),
            value: row.value.clone(),
            cat_match: row.cat_match.clone(),
            subcat_match: row.subcat_match.clone(),
            is_missing: row.is_missing,
            is_missing_key_only: row.is_missing_key_only,
            subcat_wrong: is_subcat_wrong(row, ground_truth),
            verdict: classify_row(row, ground_truth),
        })
        .collect();
    VerdictTable { rows }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gt_index() -> AttributeIndex {
        AttributeIndex::build(&[
            AttributeRow::filled("mood", "", "", "calm"),
            AttributeRow::filled("outer", "jacket", "color", "black"),
            AttributeRow::filled("bottom", "jeans", "pattern", "solid"),
        ])
    }

    #[test]
    fn test_classify_match_and_mismatch() {
        let idx = gt_index();
        let matched = AttributeRow::filled("outer", "jackets", "color", "black, navy");
        assert_eq!(classify_row(&matched, &idx), Some(MatchVerdict::Match));

        let mismatched = AttributeRow::filled("mood", "", "", "energetic");
        assert_eq!(classify_row(&mismatched, &idx), Some(MatchVerdict::Mismatch));
    }

    #[test]
    fn test_classify_blank_candidate_is_missing() {
        let idx = gt_index();
        let blank = AttributeRow::filled("outer", "jacket", "color", "");
        assert_eq!(classify_row(&blank, &idx), Some(MatchVerdict::Missing));

        let unknown_blank = AttributeRow::filled("bag", "tote", "color", "");
        assert_eq!(classify_row(&unknown_blank, &idx), None);
    }

    #[test]
    fn test_classify_extras() {
        let idx = gt_index();
        let new_group = AttributeRow::filled("bag", "tote", "color", "brown");
        assert_eq!(classify_row(&new_group, &idx), Some(MatchVerdict::ExtraNewGroup));

        let same_group = AttributeRow::filled("outer", "jacket", "fit", "oversize");
        assert_eq!(classify_row(&same_group, &idx), Some(MatchVerdict::ExtraSameGroup));

        let marketing = AttributeRow::filled("pose", "", "", "standing");
        assert_eq!(classify_row(&marketing, &idx), Some(MatchVerdict::ExtraSameGroup));
    }

    #[test]
    fn test_subcat_wrong() {
        let idx = gt_index();
        assert!(is_subcat_wrong(&AttributeRow::filled("bottom", "pants", "pattern", "solid"), &idx));
        assert!(!is_subcat_wrong(&AttributeRow::filled("bottom", "jean", "pattern", "solid"), &idx));
        assert!(!is_subcat_wrong(&AttributeRow::filled("bag", "tote", "color", "brown"), &idx));
    }

    #[test]
    fn test_fills() {
        let idx = gt_index();
        let mut rows = vec![
            AttributeRow::filled("bottom", "pants", "pattern", "striped"),
            AttributeRow::filled("bag", "tote", "color", "brown"),
            AttributeRow::filled("outer", "jacket", "fit", "oversize"),
        ];
        let mut key_only = AttributeRow::filled("outer", "jacket", "length", "");
        key_only.is_missing = true;
        key_only.is_missing_key_only = true;
        rows.push(key_only);

        let table = classify_rows(&rows, &idx);
        let fills: Vec<CellFills> = table.rows.iter().map(VerdictRow::fills).collect();

        assert_eq!(fills[0].subcat, Some(Fill::Red));
        assert_eq!(fills[0].value, Some(Fill::Red));
        assert_eq!(fills[1].row, Some(Fill::Red));
        assert_eq!(fills[2].value, Some(Fill::Green));
        assert_eq!(fills[3].row, None);
        assert_eq!(fills[3].value, Some(Fill::Red));
        assert_eq!(table.count(MatchVerdict::Missing), 1);
        assert_eq!(table.subcat_wrong_count(), 1);
    }
}
