//! 属性索引モジュール
//!
//! (大分類, 小分類, キー) → 値 の索引。照合は決められた順に
//! 段階（Probe）を試し、最初に見つかったものを採用する。
//!
//! | 行の種類 | 試行順 |
//! |---|---|
//! | 商品 | Exact → FuzzySubcategory → Relaxed |
//! | マーケティング | Relaxed(cat, "") → CategoryWords |

use crate::fuzzy::{category_word_match, subcat_fuzzy_match};
use crate::types::AttributeRow;
use std::collections::HashMap;

/// 索引キー
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupKey<'a> {
    /// (大分類, 小分類, キー) の完全一致
    Exact {
        cat: &'a str,
        subcat: &'a str,
        key: &'a str,
    },
    /// 小分類を無視した (大分類, キー)
    Relaxed { cat: &'a str, key: &'a str },
}

/// 照合の段階
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Probe {
    /// `LookupKey::Exact`
    Exact,
    /// 大分類が単語一致・キー完全一致・小分類があいまい一致
    /// （どちらかの小分類が空なら一致扱い）
    FuzzySubcategory,
    /// `LookupKey::Relaxed`（小分類が食い違っていても拾う）
    Relaxed,
    /// マーケティング行同士で大分類が単語一致
    CategoryWords,
}

pub const PRODUCT_PROBES: &[Probe] = &[Probe::Exact, Probe::FuzzySubcategory, Probe::Relaxed];
pub const MARKETING_PROBES: &[Probe] = &[Probe::Relaxed, Probe::CategoryWords];

/// 照合対象の行に応じた試行順
pub fn probes_for(key: &str) -> &'static [Probe] {
    if key.trim().is_empty() {
        MARKETING_PROBES
    } else {
        PRODUCT_PROBES
    }
}

/// 索引に登録された1件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub cat: String,
    pub subcat: String,
    pub key: String,
    pub value: String,
}

/// 照合結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit<'a> {
    pub probe: Probe,
    pub entry: &'a IndexEntry,
}

/// 値を持つ行だけを登録した索引
///
/// 同じキーが複数あれば最初の行を採用する。
#[derive(Debug, Clone, Default)]
pub struct AttributeIndex {
    entries: Vec<IndexEntry>,
    exact: HashMap<(String, String, String), usize>,
    relaxed: HashMap<(String, String), usize>,
}

impl AttributeIndex {
    pub fn build(rows: &[AttributeRow]) -> Self {
        let mut index = Self::default();

        for row in rows.iter().filter(|r| r.has_value()) {
            let entry = IndexEntry {
                cat: row.cat_match.trim().to_lowercase(),
                subcat: row.subcat_match.trim().to_lowercase(),
                key: row.key.trim().to_lowercase(),
                value: row.value.trim().to_lowercase(),
            };
            let idx = index.entries.len();
            index
                .exact
                .entry((entry.cat.clone(), entry.subcat.clone(), entry.key.clone()))
                .or_insert(idx);
            index
                .relaxed
                .entry((entry.cat.clone(), entry.key.clone()))
                .or_insert(idx);
            index.entries.push(entry);
        }

        index
    }

    pub fn get(&self, key: LookupKey<'_>) -> Option<&IndexEntry> {
        let idx = match key {
            LookupKey::Exact { cat, subcat, key } => self
                .exact
                .get(&(cat.to_string(), subcat.to_string(), key.to_string())),
            LookupKey::Relaxed { cat, key } => {
                self.relaxed.get(&(cat.to_string(), key.to_string()))
            }
        };
        idx.map(|&i| &self.entries[i])
    }

    /// 1段階だけ試す
    pub fn probe(&self, probe: Probe, cat: &str, subcat: &str, key: &str) -> Option<&IndexEntry> {
        match probe {
            Probe::Exact => self.get(LookupKey::Exact { cat, subcat, key }),
            Probe::Relaxed => self.get(LookupKey::Relaxed { cat, key }),
            Probe::FuzzySubcategory => self.entries.iter().find(|e| {
                !e.key.is_empty()
                    && e.key == key
                    && category_word_match(cat, &e.cat)
                    && (subcat.is_empty()
                        || e.subcat.is_empty()
                        || subcat_fuzzy_match(subcat, &e.subcat))
            }),
            Probe::CategoryWords => self
                .entries
                .iter()
                .find(|e| e.key.is_empty() && category_word_match(cat, &e.cat)),
        }
    }

    /// 行の種類に応じた試行順で照合する
    pub fn resolve(&self, cat: &str, subcat: &str, key: &str) -> Option<Hit<'_>> {
        let cat = cat.trim().to_lowercase();
        let subcat = subcat.trim().to_lowercase();
        let key = key.trim().to_lowercase();

        probes_for(&key).iter().find_map(|&probe| {
            self.probe(probe, &cat, &subcat, &key)
                .map(|entry| Hit { probe, entry })
        })
    }

    /// 行を照合する（照合用ラベルを使う）
    pub fn resolve_row(&self, row: &AttributeRow) -> Option<Hit<'_>> {
        self.resolve(&row.cat_match, &row.subcat_match, &row.key)
    }

    /// 大分類が単語一致するエントリがあるか
    pub fn has_category(&self, cat: &str) -> bool {
        self.entries.iter().any(|e| category_word_match(cat, &e.cat))
    }

    /// 大分類が単語一致する商品エントリの小分類
    pub fn subcategories_of<'a>(&'a self, cat: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(move |e| !e.key.is_empty() && !e.subcat.is_empty() && category_word_match(cat, &e.cat))
            .map(|e| e.subcat.as_str())
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(rows: &[(&str, &str, &str, &str)]) -> AttributeIndex {
        let rows: Vec<AttributeRow> = rows
            .iter()
            .map(|(c, s, k, v)| AttributeRow::filled(c, s, k, v))
            .collect();
        AttributeIndex::build(&rows)
    }

    #[test]
    fn test_blank_values_not_indexed() {
        let idx = index(&[("outer", "jacket", "color", ""), ("mood", "", "", "calm")]);
        assert_eq!(idx.len(), 1);
        assert!(idx.get(LookupKey::Relaxed { cat: "outer", key: "color" }).is_none());
    }

    #[test]
    fn test_first_entry_wins() {
        let idx = index(&[
            ("outer", "jacket", "color", "black"),
            ("outer", "coat", "color", "navy"),
        ]);
        let entry = idx.get(LookupKey::Relaxed { cat: "outer", key: "color" }).unwrap();
        assert_eq!(entry.value, "black");
    }

    #[test]
    fn test_product_probe_order() {
        let idx = index(&[
            ("outer", "jackets", "color", "black"),
            ("bottom", "pants", "pattern", "solid"),
        ]);

        let hit = idx.resolve("outer", "jackets", "color").unwrap();
        assert_eq!(hit.probe, Probe::Exact);

        let hit = idx.resolve("outer", "jacket", "color").unwrap();
        assert_eq!(hit.probe, Probe::FuzzySubcategory);

        // 小分類が食い違う場合は Relaxed で拾う
        let hit = idx.resolve("bottom", "jeans", "pattern").unwrap();
        assert_eq!(hit.probe, Probe::Relaxed);
        assert_eq!(hit.entry.value, "solid");

        assert!(idx.resolve("inner", "shirt", "color").is_none());
    }

    #[test]
    fn test_fuzzy_probe_absent_subcategory() {
        let idx = index(&[("outer wear", "", "color", "black")]);
        let hit = idx.resolve("outer", "jacket", "color").unwrap();
        assert_eq!(hit.probe, Probe::FuzzySubcategory);
    }

    #[test]
    fn test_marketing_probe_order() {
        let idx = index(&[("fashion style", "", "", "casual")]);

        let hit = idx.resolve("fashion style", "", "").unwrap();
        assert_eq!(hit.probe, Probe::Relaxed);

        let hit = idx.resolve("style", "", "").unwrap();
        assert_eq!(hit.probe, Probe::CategoryWords);
        assert_eq!(hit.entry.value, "casual");

        assert!(idx.resolve("mood", "", "").is_none());
    }

    #[test]
    fn test_subcategories_of() {
        let idx = index(&[
            ("outer", "jacket", "color", "black"),
            ("outer", "", "", "bold"),
            ("inner", "shirt", "color", "white"),
        ]);
        let subcats: Vec<&str> = idx.subcategories_of("outer").collect();
        assert_eq!(subcats, vec!["jacket"]);
        assert!(idx.has_category("inner"));
        assert!(!idx.has_category("shoes"));
    }
}
