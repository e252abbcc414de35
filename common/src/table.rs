//! 表モジュール
//!
//! 5列（Image, Cat, Subcat, Key, Value）の表を画像ごとの RowSet に分割する。

use crate::category::CategoryOrder;
use crate::error::{Error, Result};
use crate::shape::{clean_text, shape_rows};
use crate::text::normalize_image_name;
use crate::types::{RawRow, RawTable, RowSet};
use std::collections::{HashMap, HashSet};

/// 必須列の名前
pub const REQUIRED_COLUMNS: [&str; 5] = ["Image", "Cat", "Subcat", "Key", "Value"];

/// 画像列として受け付けるヘッダ名（正規化後）
const IMAGE_HEADERS: &[&str] = &["image", "imagename", "image name", "image_name"];

/// ヘッダ行から解決した列位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub image: usize,
    pub cat: usize,
    pub subcat: usize,
    pub key: usize,
    pub value: usize,
}

impl ColumnMap {
    /// ヘッダ名（大文字小文字を区別しない）から列位置を解決する
    pub fn resolve<S: AsRef<str>>(headers: &[S]) -> Result<Self> {
        let normalized: Vec<String> = headers
            .iter()
            .map(|h| h.as_ref().trim().to_lowercase())
            .collect();
        let image = position_of(&normalized, IMAGE_HEADERS);
        let cat = position_of(&normalized, &["cat"]);
        let subcat = position_of(&normalized, &["subcat"]);
        let key = position_of(&normalized, &["key"]);
        let value = position_of(&normalized, &["value"]);

        let missing: Vec<String> = [image, cat, subcat, key, value]
            .iter()
            .zip(REQUIRED_COLUMNS)
            .filter(|(position, _)| position.is_none())
            .map(|(_, name)| name.to_string())
            .collect();

        match (image, cat, subcat, key, value) {
            (Some(image), Some(cat), Some(subcat), Some(key), Some(value)) => Ok(Self {
                image,
                cat,
                subcat,
                key,
                value,
            }),
            _ => Err(Error::MissingColumns { missing }),
        }
    }

    /// 1行分のセルから RawRow を取り出す（足りないセルは空文字）
    pub fn extract<S: AsRef<str>>(&self, cells: &[S]) -> RawRow {
        let cell = |idx: usize| {
            cells
                .get(idx)
                .map(|c| c.as_ref().to_string())
                .unwrap_or_default()
        };
        RawRow {
            image: cell(self.image),
            cat: cell(self.cat),
            subcat: cell(self.subcat),
            key: cell(self.key),
            value: cell(self.value),
        }
    }
}

fn position_of(headers: &[String], names: &[&str]) -> Option<usize> {
    headers.iter().position(|h| names.contains(&h.as_str()))
}

/// Image 列の前方補完
///
/// 各ソースは画像名を先頭行にだけ書くので、空欄は直前の画像名で埋める。
pub fn forward_fill_images(rows: &mut [RawRow]) {
    let mut current = String::new();
    for row in rows {
        let image = row.image.trim();
        if image.is_empty() {
            row.image = current.clone();
        } else {
            current = image.to_string();
            row.image = current.clone();
        }
    }
}

/// 画像ごとに整形済みの表
#[derive(Debug, Clone, Default)]
pub struct Table {
    sets: Vec<RowSet>,
    positions: HashMap<String, usize>,
    unique_items: usize,
}

impl Table {
    /// 読み込んだままの表から構築する
    pub fn from_raw(mut raw: RawTable, order: &CategoryOrder) -> Self {
        forward_fill_images(&mut raw.rows);

        let mut unique = HashSet::new();
        let mut grouped: Vec<(String, String, Vec<RawRow>)> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for row in raw.rows {
            unique.insert((
                clean_text(&row.cat),
                clean_text(&row.subcat),
                clean_text(&row.key),
                clean_text(&row.value),
            ));

            let image_key = normalize_image_name(&row.image);
            let idx = *positions.entry(image_key.clone()).or_insert_with(|| {
                grouped.push((row.image.clone(), image_key, Vec::new()));
                grouped.len() - 1
            });
            grouped[idx].2.push(row);
        }

        let sets = grouped
            .into_iter()
            .map(|(image, image_key, rows)| RowSet {
                image,
                image_key,
                rows: shape_rows(&rows, order),
            })
            .collect();

        Self {
            sets,
            positions,
            unique_items: unique.len(),
        }
    }

    /// 画像名（拡張子・大文字小文字は無視）で検索
    pub fn get(&self, image: &str) -> Option<&RowSet> {
        self.positions
            .get(&normalize_image_name(image))
            .map(|&idx| &self.sets[idx])
    }

    /// 結合キーの一覧（最初の出現順）
    pub fn image_keys(&self) -> impl Iterator<Item = &str> {
        self.sets.iter().map(|s| s.image_key.as_str())
    }

    pub fn row_sets(&self) -> &[RowSet] {
        &self.sets
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// 重複を除いた (Cat, Subcat, Key, Value) の件数
    ///
    /// Cat/Subcat は書かれたまま数える（前方補完前）。
    pub fn unique_items(&self) -> usize {
        self.unique_items
    }

    /// 解析失敗行を含む画像
    pub fn failed_images(&self) -> Vec<&str> {
        self.sets
            .iter()
            .filter(|s| s.has_error_rows())
            .map(|s| s.image.as_str())
            .collect()
    }
}
