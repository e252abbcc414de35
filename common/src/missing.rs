//! 欠落行の補完
//!
//! 候補側に対応が無い正解行を、値が空の行として候補の表示用テーブルに追加する。
//!
//! - グループ（大分類・小分類）ごと欠落: `is_missing` のみ
//! - グループはあるがキーだけ欠落: `is_missing` と `is_missing_key_only`
//!
//! 大分類は候補にあるが小分類がまったく一致しない商品行は追加しない。
//! その場合は候補側の小分類の誤りとして表示する。

use crate::fuzzy::{category_word_match, subcat_fuzzy_match};
use crate::types::AttributeRow;
use std::collections::HashSet;

/// 欠落行を生成する
///
/// `candidate` は重複除去済みの行を想定している。
pub fn synthesize_missing(ground_truth: &[AttributeRow], candidate: &[AttributeRow]) -> Vec<AttributeRow> {
    let mut missing = Vec::new();
    let mut added = HashSet::new();

    for gt in ground_truth.iter().filter(|r| r.has_value() && !r.is_error()) {
        let cat = gt.cat_match.as_str();
        let subcat = gt.subcat_match.as_str();
        let key = gt.key.as_str();
        if cat.is_empty() {
            continue;
        }

        let same_cat: Vec<&AttributeRow> = candidate
            .iter()
            .filter(|c| category_word_match(cat, &c.cat_match))
            .collect();

        let row = if gt.is_marketing() {
            if same_cat.iter().any(|c| c.is_marketing()) {
                continue;
            }
            missing_row(cat, "", "", false)
        } else {
            let same_subcat: Vec<&AttributeRow> = same_cat
                .iter()
                .copied()
                .filter(|c| !c.is_marketing())
                .filter(|c| subcat.is_empty() || subcat_fuzzy_match(subcat, &c.subcat_match))
                .collect();

            if same_subcat.iter().any(|c| c.key == key) {
                continue;
            }

            match same_subcat.first() {
                Some(existing) => missing_row(cat, &existing.subcat_match, key, true),
                None if same_cat.is_empty() || subcat.is_empty() => {
                    missing_row(cat, subcat, key, false)
                }
                // 小分類の誤りとして扱う
                None => continue,
            }
        };

        if added.insert((row.cat_match.clone(), row.subcat_match.clone(), row.key.clone())) {
            missing.push(row);
        }
    }

    missing
}

fn missing_row(cat: &str, subcat: &str, key: &str, key_only: bool) -> AttributeRow {
    AttributeRow {
        is_missing: true,
        is_missing_key_only: key_only,
        ..AttributeRow::filled(cat, subcat, key, "")
    }
}
