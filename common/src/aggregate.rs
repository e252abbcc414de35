//! 集計モジュール
//!
//! 画像ごとの精度をソース別に単純平均する（項目数による重み付けはしない）。

use crate::reconcile::AccuracyRecord;
use crate::types::CandidateSource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 算術平均（空なら0）
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// ソース別の平均
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceAverages {
    pub source: CandidateSource,
    /// 比較できた画像数
    pub images: usize,
    pub marketing_accuracy: f64,
    pub product_accuracy: f64,
    /// (マーケティング + 商品) / 2
    pub combined_accuracy: f64,
    pub brand_images: usize,
    pub product_name_images: usize,
}

/// コーパス全体の集計
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorpusSummary {
    pub sources: Vec<SourceAverages>,
    /// 正解データの重複を除いた (Cat, Subcat, Key, Value) 数
    pub unique_ground_truth_items: usize,
    /// どの候補にも現れない正解画像の数
    pub uncompared_ground_truth_images: usize,
}

impl CorpusSummary {
    pub fn source(&self, source: CandidateSource) -> Option<&SourceAverages> {
        self.sources.iter().find(|s| s.source == source)
    }
}

#[derive(Debug, Clone, Default)]
struct Accumulator {
    marketing: Vec<f64>,
    product: Vec<f64>,
    brand_images: usize,
    product_name_images: usize,
}

/// 画像ごとの精度を受け取り、ソース別に平均する
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    per_source: BTreeMap<CandidateSource, Accumulator>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, source: CandidateSource, record: &AccuracyRecord) {
        let acc = self.per_source.entry(source).or_default();
        acc.marketing.push(record.marketing_accuracy);
        acc.product.push(record.product_accuracy);
        if record.has_brand {
            acc.brand_images += 1;
        }
        if record.has_product_name {
            acc.product_name_images += 1;
        }
    }

    /// ソースの平均（1件も無ければ `None`）
    pub fn averages(&self, source: CandidateSource) -> Option<SourceAverages> {
        let acc = self.per_source.get(&source)?;
        let marketing = mean(&acc.marketing);
        let product = mean(&acc.product);
        Some(SourceAverages {
            source,
            images: acc.product.len(),
            marketing_accuracy: marketing,
            product_accuracy: product,
            combined_accuracy: (marketing + product) / 2.0,
            brand_images: acc.brand_images,
            product_name_images: acc.product_name_images,
        })
    }

    pub fn finish(&self, unique_ground_truth_items: usize, uncompared_ground_truth_images: usize) -> CorpusSummary {
        CorpusSummary {
            sources: CandidateSource::ALL
                .iter()
                .filter_map(|&source| self.averages(source))
                .collect(),
            unique_ground_truth_items,
            uncompared_ground_truth_images,
        }
    }
}
