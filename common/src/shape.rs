//! 行の整形
//!
//! 1画像分の行を、照合できる形に整える。
//!
//! ## 処理フロー
//! 1. セル値の整形（欠損トークン除去・小文字化）
//! 2. 前方補完: 空の Cat/Subcat をグループ先頭行から補う
//! 3. 並び替え: カテゴリ順位 → マーケティング優先 → 小分類 → キー
//! 4. 表示用ラベルの再集約: グループ先頭行だけにラベルを残す

use crate::category::CategoryOrder;
use crate::text::{clean_cell, first_value};
use crate::types::{AttributeRow, RawRow};

/// セル値を比較用に整える（欠損トークンは空、全て小文字）
pub fn clean_text(text: &str) -> String {
    clean_cell(text).to_lowercase()
}

/// 前方補完
///
/// Cat を持つ行が新しいグループを開始する。Cat が空の行は直前の
/// グループを引き継ぎ、Subcat があればそれで小分類だけを更新する。
/// マーケティング行の照合用小分類は常に空。
pub fn fill_groups(rows: &[RawRow]) -> Vec<AttributeRow> {
    let mut current_cat = String::new();
    let mut current_subcat = String::new();
    let mut filled = Vec::with_capacity(rows.len());

    for raw in rows {
        let cat = first_value(&clean_text(&raw.cat));
        let subcat = first_value(&clean_text(&raw.subcat));
        let key = clean_text(&raw.key);
        let value = clean_text(&raw.value);

        if !cat.is_empty() {
            current_cat = cat.clone();
            current_subcat = subcat.clone();
        } else if !subcat.is_empty() {
            current_subcat = subcat.clone();
        }

        let subcat_match = if key.is_empty() {
            String::new()
        } else {
            current_subcat.clone()
        };

        filled.push(AttributeRow {
            cat,
            subcat,
            key,
            value,
            cat_match: current_cat.clone(),
            subcat_match,
            is_missing: false,
            is_missing_key_only: false,
        });
    }

    filled
}

/// 並び替えと表示用ラベルの再集約
///
/// 安定ソートなので、同順位の行は入力順を保つ。
pub fn arrange(mut rows: Vec<AttributeRow>, order: &CategoryOrder) -> Vec<AttributeRow> {
    rows.sort_by(|a, b| {
        order
            .rank(&a.cat_match)
            .cmp(&order.rank(&b.cat_match))
            .then_with(|| b.is_marketing().cmp(&a.is_marketing()))
            .then_with(|| a.subcat_match.cmp(&b.subcat_match))
            .then_with(|| a.key.cmp(&b.key))
    });

    let mut previous: Option<(String, String)> = None;
    for row in &mut rows {
        let group = (row.cat_match.clone(), row.subcat_match.clone());
        if previous.as_ref() == Some(&group) {
            row.cat.clear();
            row.subcat.clear();
        } else {
            row.cat = row.cat_match.clone();
            row.subcat = if row.is_marketing() {
                String::new()
            } else {
                row.subcat_match.clone()
            };
            previous = Some(group);
        }
    }

    rows
}

/// 前方補完 → 並び替え → 再集約
pub fn shape_rows(rows: &[RawRow], order: &CategoryOrder) -> Vec<AttributeRow> {
    arrange(fill_groups(rows), order)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(cat: &str, subcat: &str, key: &str, value: &str) -> RawRow {
        RawRow::new("a.jpg", cat, subcat, key, value)
    }

    #[test]
    fn test_fill_groups_inherits_labels() {
        let rows = vec![
            raw("Outer", "Jacket", "color", "Black"),
            raw("", "", "fit", "oversize"),
            raw("Inner", "", "color", "white"),
            raw("", "T-Shirt", "pattern", "solid"),
        ];
        let filled = fill_groups(&rows);

        assert_eq!(filled[1].cat_match, "outer");
        assert_eq!(filled[1].subcat_match, "jacket");
        assert_eq!(filled[1].value, "oversize");
        // 新しいグループでは小分類を引き継がない
        assert_eq!(filled[2].cat_match, "inner");
        assert_eq!(filled[2].subcat_match, "");
        assert_eq!(filled[3].subcat_match, "t-shirt");
    }

    #[test]
    fn test_fill_groups_marketing_subcat_blank() {
        let rows = vec![
            raw("outer", "jacket", "color", "black"),
            raw("mood", "", "", "calm"),
            raw("", "", "", "cozy"),
        ];
        let filled = fill_groups(&rows);
        assert_eq!(filled[1].subcat_match, "");
        assert_eq!(filled[2].cat_match, "mood");
        assert_eq!(filled[2].subcat_match, "");
    }

    #[test]
    fn test_fill_groups_cleans_null_tokens_and_first_value() {
        let rows = vec![raw("Outer, Inner", "/", "Color", "None")];
        let filled = fill_groups(&rows);
        assert_eq!(filled[0].cat_match, "outer");
        assert_eq!(filled[0].subcat_match, "");
        assert_eq!(filled[0].key, "color");
        assert_eq!(filled[0].value, "");
    }

    #[test]
    fn test_shape_rows_order_and_collapse() {
        let rows = vec![
            raw("bottom", "jeans", "pattern", "solid"),
            raw("", "", "color", "blue"),
            raw("outer", "jacket", "fit", "regular"),
            raw("mood", "", "", "calm"),
            raw("unknown thing", "x", "k", "v"),
        ];
        let shaped = shape_rows(&rows, &CategoryOrder::default());
        let cats: Vec<&str> = shaped.iter().map(|r| r.cat_match.as_str()).collect();
        assert_eq!(cats, vec!["mood", "outer", "bottom", "bottom", "unknown thing"]);

        // bottom/jeans グループは color → pattern の順、2行目の表示ラベルは空
        assert_eq!(shaped[2].key, "color");
        assert_eq!(shaped[2].cat, "bottom");
        assert_eq!(shaped[2].subcat, "jeans");
        assert_eq!(shaped[3].key, "pattern");
        assert_eq!(shaped[3].cat, "");
        assert_eq!(shaped[3].subcat, "");
        assert_eq!(shaped[3].subcat_match, "jeans");
    }

    #[test]
    fn test_arrange_marketing_before_product_in_same_rank() {
        let rows = vec![
            AttributeRow::filled("cape", "long", "color", "red"),
            AttributeRow::filled("cape", "", "", "dramatic"),
        ];
        let arranged = arrange(rows, &CategoryOrder::default());
        assert!(arranged[0].is_marketing());
        assert_eq!(arranged[1].cat, "cape");
    }
}
