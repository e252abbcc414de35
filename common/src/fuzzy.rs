//! あいまい照合モジュール
//!
//! 正規化済みトークン集合の重なりで一致を判定する。
//! 判定はすべて真偽値で、部分スコアは持たない（採点は reconcile 側）。

use crate::text::{tokenize_value_set, tokenize_words};

/// 値の単語単位一致
///
/// どちらかが空なら常に不一致。
pub fn word_overlap(a: &str, b: &str) -> bool {
    if a.trim().is_empty() || b.trim().is_empty() {
        return false;
    }
    !tokenize_value_set(a).is_disjoint(&tokenize_value_set(b))
}

/// 小分類のあいまい一致（複数形を許容）
///
/// 値と同じくフレーズ全体と単語の両方で照合するので、
/// 「t shirt」と「t-shirt」、「shoe」と「shoes」が一致する。
pub fn subcat_fuzzy_match(a: &str, b: &str) -> bool {
    if a.trim().is_empty() || b.trim().is_empty() {
        return false;
    }
    !tokenize_value_set(a).is_disjoint(&tokenize_value_set(b))
}

/// 大分類の単語一致（フレーズ全体は使わない）
pub fn category_word_match(a: &str, b: &str) -> bool {
    if a.trim().is_empty() || b.trim().is_empty() {
        return false;
    }
    !tokenize_words(a).is_disjoint(&tokenize_words(b))
}
