//! テキスト正規化モジュール
//!
//! ラベルや属性値を比較用のトークンへ変換する。
//!
//! ## 正規化ルール
//! 1. 小文字化・前後空白の除去
//! 2. 区切り文字（`-` `_` 空白）の除去
//! 3. 末尾 `s` の除去による簡易単数化
//! 4. カンマ区切りの値は集合として扱う

use std::collections::BTreeSet;

/// 欠損とみなすセル値（小文字化して比較）
///
/// `/` はベンダー出力で空の小分類に使われる。
pub const NULL_TOKENS: &[&str] = &["none", "nan", "n/a", "null", "undefined", "/"];

/// 画像名の結合キーから取り除く拡張子
pub const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".webp"];

/// ラベルを比較用トークンに変換する
///
/// 小文字化し、`-` `_` と空白をすべて除去する。
/// 空入力は空文字を返す。
pub fn normalize_label(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, '-' | '_') && !c.is_whitespace())
        .collect()
}

/// 重複判定用のキー
pub fn normalize_for_dedup(text: &str) -> String {
    normalize_label(text)
}

/// 末尾の `s` を除去する（簡易単数化）
pub fn singularize(token: &str) -> &str {
    token.trim_end_matches('s')
}

/// 値をトークン集合に変換する
///
/// カンマで区切った各フレーズについて、フレーズ全体の正規化形と
/// 単語ごとの正規化形の両方を追加する（いずれも単数化済み）。
/// 「sky blue」は `skyblue` `sky` `blue` になる。
pub fn tokenize_value_set(text: &str) -> BTreeSet<String> {
    let mut tokens = BTreeSet::new();
    for phrase in text.split(',') {
        insert_token(&mut tokens, phrase);
        for word in phrase.split_whitespace() {
            insert_token(&mut tokens, word);
        }
    }
    tokens
}

/// 単語ごとのトークン集合（フレーズ全体は含めない）
pub fn tokenize_words(text: &str) -> BTreeSet<String> {
    let mut tokens = BTreeSet::new();
    for phrase in text.split(',') {
        for word in phrase.split_whitespace() {
            insert_token(&mut tokens, word);
        }
    }
    tokens
}

fn insert_token(tokens: &mut BTreeSet<String>, raw: &str) {
    let normalized = normalize_label(raw);
    let token = singularize(&normalized);
    if !token.is_empty() {
        tokens.insert(token.to_string());
    }
}

/// 画像名を結合キーに変換する
///
/// 小文字化・前後空白除去のうえ、既知の画像拡張子を1つだけ取り除く。
pub fn normalize_image_name(name: &str) -> String {
    let name = name.trim().to_lowercase();
    for ext in IMAGE_EXTENSIONS {
        if let Some(stem) = name.strip_suffix(ext) {
            return stem.to_string();
        }
    }
    name
}

/// セル値を整形する（欠損トークンは空文字）
pub fn clean_cell(text: &str) -> String {
    let trimmed = text.trim();
    if NULL_TOKENS.contains(&trimmed.to_lowercase().as_str()) {
        String::new()
    } else {
        trimmed.to_string()
    }
}

/// カンマ区切りの先頭の値だけを返す
pub fn first_value(text: &str) -> String {
    text.split(',').next().unwrap_or_default().trim().to_string()
}
