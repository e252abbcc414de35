//! 比較パイプライン
//!
//! 正解データと各候補ソースを読み込み、画像ごとに照合してレポートを作る。
//!
//! - 正解データが読めなければ比較全体を中止する
//! - 候補ソースが読めなければそのソースだけ「利用不可」として続行する

use crate::error::{EvalError, Result};
use crate::loader::cache::TableCache;
use crate::loader::{load_latest_result, load_table};
use crate::scanner::ImageCatalog;
use fashion_eval_common::{
    reconcile, AccuracyRecord, Aggregator, CandidateSource, CategoryOrder, CorpusSummary,
    RowSet, Table, VerdictTable,
};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// 比較の入力ファイル
#[derive(Debug, Clone, Default)]
pub struct Inputs {
    pub ground_truth: PathBuf,
    /// VLM解析結果のフォルダ（最新ファイルを使う）
    pub results_dir: Option<PathBuf>,
    pub result_prefix: String,
    pub vendor: Option<PathBuf>,
}

/// 候補ソースの読み込み状態
#[derive(Debug, Clone)]
pub enum SourceStatus {
    Loaded { table: Table, origin: PathBuf },
    Unavailable(String),
}

#[derive(Debug, Clone)]
pub struct SourceInput {
    pub source: CandidateSource,
    pub status: SourceStatus,
}

impl SourceInput {
    pub fn table(&self) -> Option<&Table> {
        match &self.status {
            SourceStatus::Loaded { table, .. } => Some(table),
            SourceStatus::Unavailable(_) => None,
        }
    }
}

/// 比較対象一式
#[derive(Debug, Clone)]
pub struct Corpus {
    pub ground_truth: Table,
    pub sources: Vec<SourceInput>,
    pub order: CategoryOrder,
}

impl Corpus {
    /// 入力ファイルを読み込む
    pub fn load(inputs: &Inputs, order: CategoryOrder, mut cache: Option<&mut TableCache>) -> Result<Self> {
        let ground_truth = load_table(&inputs.ground_truth, &order, cache.as_deref_mut())
            .map_err(|e| EvalError::GroundTruthLoad(e.to_string()))?;
        info!(
            "正解データ: {} ({}画像)",
            inputs.ground_truth.display(),
            ground_truth.len()
        );

        let mut sources = Vec::new();

        let vlm = match &inputs.results_dir {
            Some(dir) => {
                match load_latest_result(dir, &inputs.result_prefix, &order, cache.as_deref_mut()) {
                    Ok(loaded) => SourceStatus::Loaded {
                        table: loaded.table,
                        origin: loaded.path,
                    },
                    Err(e) => SourceStatus::Unavailable(e.to_string()),
                }
            }
            None => SourceStatus::Unavailable("解析結果フォルダが指定されていません".into()),
        };
        sources.push(SourceInput {
            source: CandidateSource::Vlm,
            status: vlm,
        });

        let vendor = match &inputs.vendor {
            Some(path) => match load_table(path, &order, cache.as_deref_mut()) {
                Ok(table) => SourceStatus::Loaded {
                    table,
                    origin: path.clone(),
                },
                Err(e) => SourceStatus::Unavailable(e.to_string()),
            },
            None => SourceStatus::Unavailable("ベンダー結果が指定されていません".into()),
        };
        sources.push(SourceInput {
            source: CandidateSource::Vendor,
            status: vendor,
        });

        for input in &sources {
            if let SourceStatus::Unavailable(cause) = &input.status {
                warn!("{}: 利用不可 ({})", input.source, cause);
            }
        }

        Ok(Self {
            ground_truth,
            sources,
            order,
        })
    }

    /// 比較する画像（候補ソースに現れた順、VLM → ベンダー）
    ///
    /// (結合キー, 表示名) を返す。
    pub fn image_list(&self) -> Vec<(String, String)> {
        let mut seen = HashSet::new();
        let mut images = Vec::new();
        for table in self.sources.iter().filter_map(SourceInput::table) {
            for set in table.row_sets() {
                if seen.insert(set.image_key.clone()) {
                    images.push((set.image_key.clone(), set.image.clone()));
                }
            }
        }
        images
    }
}

/// レポート用のソース情報
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceInfo {
    pub source: CandidateSource,
    pub loaded: bool,
    /// 読み込んだファイル
    pub origin: Option<PathBuf>,
    /// 読み込めなかった理由
    pub error: Option<String>,
    pub images: usize,
    pub failed_images: Vec<String>,
}

impl SourceInfo {
    fn from_input(input: &SourceInput) -> Self {
        match &input.status {
            SourceStatus::Loaded { table, origin } => Self {
                source: input.source,
                loaded: true,
                origin: Some(origin.clone()),
                error: None,
                images: table.len(),
                failed_images: table.failed_images().into_iter().map(String::from).collect(),
            },
            SourceStatus::Unavailable(cause) => Self {
                source: input.source,
                loaded: false,
                origin: None,
                error: Some(cause.clone()),
                images: 0,
                failed_images: Vec::new(),
            },
        }
    }
}

/// 1画像・1ソースの結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ImageOutcome {
    Compared {
        record: AccuracyRecord,
        table: VerdictTable,
    },
    /// 解析失敗行のみ
    Failed,
    /// このソースに行が無い
    NotAnalyzed,
    /// 正解データに行が無い
    NoGroundTruth,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceResult {
    pub source: CandidateSource,
    pub outcome: ImageOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageReport {
    pub image: String,
    pub image_key: String,
    pub image_path: Option<PathBuf>,
    pub results: Vec<SourceResult>,
}

impl ImageReport {
    pub fn outcome(&self, source: CandidateSource) -> Option<&ImageOutcome> {
        self.results
            .iter()
            .find(|r| r.source == source)
            .map(|r| &r.outcome)
    }

    pub fn record(&self, source: CandidateSource) -> Option<&AccuracyRecord> {
        match self.outcome(source)? {
            ImageOutcome::Compared { record, .. } => Some(record),
            _ => None,
        }
    }
}

/// 比較レポート
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub generated_at: String,
    pub sources: Vec<SourceInfo>,
    pub images: Vec<ImageReport>,
    pub summary: CorpusSummary,
}

fn compare_one(ground_truth: Option<&RowSet>, candidate: Option<&RowSet>, order: &CategoryOrder) -> ImageOutcome {
    let Some(candidate) = candidate else {
        return ImageOutcome::NotAnalyzed;
    };
    if candidate.is_failed() {
        return ImageOutcome::Failed;
    }
    let Some(ground_truth) = ground_truth else {
        return ImageOutcome::NoGroundTruth;
    };

    let result = reconcile(ground_truth, candidate, order);
    ImageOutcome::Compared {
        record: result.record,
        table: result.table,
    }
}

fn progress_bar(len: usize, show: bool) -> ProgressBar {
    if !show {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}

/// 全画像を比較する
///
/// 画像ごとの照合は独立しているので並列に実行する（出力順は画像リスト順）。
pub fn compare_corpus(corpus: &Corpus, catalog: Option<&ImageCatalog>, show_progress: bool) -> ComparisonReport {
    let images = corpus.image_list();
    debug!("比較対象: {}画像", images.len());

    let pb = progress_bar(images.len(), show_progress);

    let reports: Vec<ImageReport> = images
        .par_iter()
        .map(|(key, image)| {
            let ground_truth = corpus.ground_truth.get(key);
            let results = corpus
                .sources
                .iter()
                .filter_map(|input| {
                    let table = input.table()?;
                    Some(SourceResult {
                        source: input.source,
                        outcome: compare_one(ground_truth, table.get(key), &corpus.order),
                    })
                })
                .collect();
            pb.inc(1);
            ImageReport {
                image: image.clone(),
                image_key: key.clone(),
                image_path: catalog.and_then(|c| c.path_for(key)).map(|p| p.to_path_buf()),
                results,
            }
        })
        .collect();

    pb.finish_and_clear();

    let mut aggregator = Aggregator::new();
    for report in &reports {
        for result in &report.results {
            match &result.outcome {
                ImageOutcome::Compared { record, .. } => aggregator.add(result.source, record),
                // 正解が無い画像は0点として平均に含める
                ImageOutcome::NoGroundTruth => {
                    aggregator.add(result.source, &AccuracyRecord::default())
                }
                ImageOutcome::Failed | ImageOutcome::NotAnalyzed => {}
            }
        }
    }

    let compared: HashSet<&str> = images.iter().map(|(key, _)| key.as_str()).collect();
    let uncompared = corpus
        .ground_truth
        .image_keys()
        .filter(|key| !compared.contains(key))
        .count();

    ComparisonReport {
        generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        sources: corpus.sources.iter().map(SourceInfo::from_input).collect(),
        images: reports,
        summary: aggregator.finish(corpus.ground_truth.unique_items(), uncompared),
    }
}
