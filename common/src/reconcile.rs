//! 照合モジュール
//!
//! 1画像分の正解 RowSet と候補 RowSet を比べ、精度レコードと
//! 判定付きの表示用テーブルを作る。副作用の無い純関数。
//!
//! ## 処理フロー
//! 1. 候補の重複除去（照合用 (Cat, Subcat, Key) の正規化形で先勝ち）
//! 2. 候補の索引作成
//! 3. 正解の各行を分類（マーケティング / 商品、小分類の誤り）
//! 4. 正解に対応の無い候補行を追加として数える
//! 5. ブランド・商品名のボーナス判定
//! 6. スコア算出

use crate::category::CategoryOrder;
use crate::fuzzy::{category_word_match, subcat_fuzzy_match, word_overlap};
use crate::lookup::AttributeIndex;
use crate::missing::synthesize_missing;
use crate::shape::arrange;
use crate::text::normalize_for_dedup;
use crate::types::{AttributeRow, RowSet};
use crate::verdict::{classify_rows, VerdictTable};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// 商品精度における値の重み
pub const VALUE_WEIGHT: f64 = 0.6;

/// 商品精度における小分類の重み
pub const SUBCAT_WEIGHT: f64 = 0.4;

/// ボーナス対象のキー
pub const BRAND_KEY: &str = "brand";
pub const PRODUCT_NAME_KEY: &str = "product_name";

/// 1画像・1ソース分の精度
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccuracyRecord {
    pub marketing_total: usize,
    pub marketing_match: usize,
    pub marketing_extra: usize,
    pub product_total: usize,
    pub product_match: usize,
    pub product_extra: usize,
    pub subcat_errors: usize,
    pub marketing_accuracy: f64,
    pub value_accuracy: f64,
    pub subcat_accuracy: f64,
    pub product_accuracy: f64,
    pub has_brand: bool,
    pub has_product_name: bool,
}

/// 照合結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reconciliation {
    pub record: AccuracyRecord,
    pub table: VerdictTable,
}

/// 割合（%）。分母0は0
fn percent(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64 * 100.0
    }
}

/// 照合用 (Cat, Subcat, Key) の正規化形で重複を除く（先勝ち）
pub fn dedup_rows(rows: &[AttributeRow]) -> Vec<AttributeRow> {
    let mut seen = HashSet::new();
    rows.iter()
        .filter(|row| {
            seen.insert((
                normalize_for_dedup(&row.cat_match),
                normalize_for_dedup(&row.subcat_match),
                normalize_for_dedup(&row.key),
            ))
        })
        .cloned()
        .collect()
}

/// 精度を計算する
///
/// `candidate` は重複除去前でもよい（内部で除去する）。
pub fn compute_accuracy(ground_truth: &[AttributeRow], candidate: &[AttributeRow]) -> AccuracyRecord {
    let candidate = dedup_rows(candidate);
    let cand_index = AttributeIndex::build(&candidate);
    let gt_index = AttributeIndex::build(ground_truth);
    let mut record = AccuracyRecord::default();

    for gt in ground_truth.iter().filter(|r| r.has_value()) {
        let hit = cand_index.resolve_row(gt);
        let matched = hit.is_some_and(|h| word_overlap(&gt.value, &h.entry.value));

        if gt.is_marketing() {
            record.marketing_total += 1;
            if matched {
                record.marketing_match += 1;
            }
            continue;
        }

        record.product_total += 1;
        if matched {
            record.product_match += 1;
        }

        // 小分類の正誤は値の正誤と独立に数える
        // 同じ大分類・キーの候補が複数あれば、小分類が合うものを優先する
        if !gt.subcat_match.is_empty() {
            let stated: Vec<_> = cand_index
                .entries()
                .iter()
                .filter(|e| {
                    !e.key.is_empty()
                        && e.key == gt.key
                        && category_word_match(&gt.cat_match, &e.cat)
                })
                .collect();
            let agrees = stated
                .iter()
                .any(|e| e.subcat.is_empty() || subcat_fuzzy_match(&gt.subcat_match, &e.subcat));
            if !stated.is_empty() && !agrees {
                record.subcat_errors += 1;
            }
        }
    }

    for cand in candidate.iter().filter(|r| r.has_value() && !r.is_error()) {
        if gt_index.resolve_row(cand).is_none() {
            if cand.is_marketing() {
                record.marketing_extra += 1;
            } else {
                record.product_extra += 1;
            }
        }

        match cand.key.as_str() {
            BRAND_KEY => record.has_brand = true,
            PRODUCT_NAME_KEY => record.has_product_name = true,
            _ => {}
        }
    }

    record.marketing_accuracy = percent(record.marketing_match, record.marketing_total);
    record.value_accuracy = percent(record.product_match, record.product_total);
    record.subcat_accuracy = if record.product_total == 0 {
        0.0
    } else {
        percent(
            record.product_total.saturating_sub(record.subcat_errors),
            record.product_total,
        )
    };
    record.product_accuracy = if record.product_total == 0 {
        0.0
    } else {
        VALUE_WEIGHT * record.value_accuracy + SUBCAT_WEIGHT * record.subcat_accuracy
    };

    record
}

/// 精度レコードと判定付きテーブルを作る
pub fn reconcile(ground_truth: &RowSet, candidate: &RowSet, order: &CategoryOrder) -> Reconciliation {
    let record = compute_accuracy(&ground_truth.rows, &candidate.rows);

    let mut display = dedup_rows(&candidate.rows);
    let missing = synthesize_missing(&ground_truth.rows, &display);
    display.extend(missing);
    let display = arrange(display, order);

    let gt_index = AttributeIndex::build(&ground_truth.rows);
    let table = classify_rows(&display, &gt_index);

    Reconciliation { record, table }
}
