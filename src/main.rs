use anyhow::Context;
use clap::Parser;
use fashion_eval::{cli, compare, config, export, loader, scanner, watch};
use cli::{Cli, CompareArgs, Commands};
use compare::{ComparisonReport, Corpus, Inputs};
use config::Config;
use loader::cache::TableCache;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::prelude::*;

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "fashion_eval=debug"
    } else {
        "fashion_eval=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// CLI引数と設定から入力ファイルを決める
fn resolve_inputs(config: &Config, args: &CompareArgs) -> Inputs {
    Inputs {
        ground_truth: args
            .ground_truth
            .clone()
            .unwrap_or_else(|| config.ground_truth.clone()),
        results_dir: Some(
            args.results_dir
                .clone()
                .unwrap_or_else(|| config.results_dir.clone()),
        ),
        result_prefix: config.result_prefix.clone(),
        vendor: Some(args.vendor.clone().unwrap_or_else(|| config.vendor.clone())),
    }
}

fn print_summary(report: &ComparisonReport) {
    println!("ソース:");
    for info in &report.sources {
        match (&info.origin, &info.error) {
            (Some(origin), _) => println!(
                "  {}: {} ({}画像, 解析失敗 {})",
                info.source,
                origin.display(),
                info.images,
                info.failed_images.len()
            ),
            (None, Some(error)) => println!("  {}: 利用不可 - {}", info.source, error),
            (None, None) => println!("  {}: 利用不可", info.source),
        }
    }

    println!("\n平均精度:");
    for avg in &report.summary.sources {
        println!(
            "  {:<7} マーケティング {:>5.1}%  商品 {:>5.1}%  総合 {:>5.1}%  ({}画像, ブランド {}, 商品名 {})",
            avg.source.label(),
            avg.marketing_accuracy,
            avg.product_accuracy,
            avg.combined_accuracy,
            avg.images,
            avg.brand_images,
            avg.product_name_images,
        );
    }
    println!("  正解項目数: {}", report.summary.unique_ground_truth_items);
    if report.summary.uncompared_ground_truth_images > 0 {
        println!(
            "  未比較の正解画像: {}",
            report.summary.uncompared_ground_truth_images
        );
    }
}

/// 読み込み → 比較 → 表示 → 出力
fn run_compare(
    config: &Config,
    args: &CompareArgs,
    cache: &mut TableCache,
    show_progress: bool,
) -> anyhow::Result<ComparisonReport> {
    let inputs = resolve_inputs(config, args);
    let order = config.category_order().context("カテゴリ順位表を読み込めません")?;

    println!("[1/3] スプレッドシートを読み込み中...");
    let corpus = Corpus::load(&inputs, order, Some(cache))?;
    println!("✔ 正解データ: {}画像\n", corpus.ground_truth.len());

    let images_dir = args.images_dir.clone().unwrap_or_else(|| config.images_dir.clone());
    let catalog = match scanner::ImageCatalog::scan(&images_dir) {
        Ok(catalog) => Some(catalog),
        Err(e) => {
            warn!("画像フォルダをスキャンできません: {}", e);
            None
        }
    };

    println!("[2/3] 比較中...");
    let report = compare::compare_corpus(&corpus, catalog.as_ref(), show_progress);
    println!("✔ {}画像を比較\n", report.images.len());
    print_summary(&report);

    println!("\n[3/3] レポートを出力中...");
    let output = args.output.clone().unwrap_or_else(|| config.output_dir.clone());
    export::export_report(&report, &args.format, &output)?;

    Ok(report)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = Config::load().context("設定ファイルを読み込めません")?;

    match cli.command {
        Commands::Compare { args } => {
            println!("👗 fashion-eval - 正解比較\n");

            let cache_dir = args.cache_dir.clone();
            let mut cache = cache_dir
                .as_deref()
                .map(TableCache::load)
                .unwrap_or_default();

            run_compare(&config, &args, &mut cache, true)?;

            if let Some(dir) = cache_dir {
                cache.save(&dir)?;
                info!("キャッシュを保存: {}", TableCache::cache_path(&dir).display());
            }

            println!("\n✅ 比較完了");
        }

        Commands::Watch { args, interval } => {
            println!("👀 fashion-eval - 監視モード（Ctrl+C で終了）\n");

            let interval = std::time::Duration::from_secs(
                interval.unwrap_or(config.watch_interval_seconds).max(1),
            );
            let inputs = resolve_inputs(&config, &args);
            let capture = || {
                let files: Vec<&std::path::Path> = [Some(&inputs.ground_truth), inputs.vendor.as_ref()]
                    .into_iter()
                    .flatten()
                    .map(PathBuf::as_path)
                    .collect();
                let results = inputs
                    .results_dir
                    .as_deref()
                    .map(|dir| (dir, inputs.result_prefix.as_str()));
                watch::InputStamps::capture(&files, results)
            };

            let mut cache = args
                .cache_dir
                .as_deref()
                .map(TableCache::load)
                .unwrap_or_default();
            let mut last = None;

            loop {
                let current = capture();
                let changed = last
                    .as_ref()
                    .map_or(true, |previous| current.changed_since(previous));

                if changed {
                    if let Err(e) = run_compare(&config, &args, &mut cache, false) {
                        warn!("比較に失敗しました: {:#}", e);
                        println!("✘ {:#}", e);
                    }
                    if let Some(dir) = &args.cache_dir {
                        cache.save(dir)?;
                    }
                    println!("\n⏳ 変更を待機中...");
                    last = Some(current);
                }

                std::thread::sleep(interval);
            }
        }

        Commands::Failed { results_dir } => {
            let dir = results_dir.unwrap_or_else(|| config.results_dir.clone());
            let order = config.category_order()?;
            let loaded = loader::load_latest_result(&dir, &config.result_prefix, &order, None)?;

            let failed = loaded.table.failed_images();
            println!("解析結果: {}", loaded.path.display());
            if failed.is_empty() {
                println!("✔ 解析失敗の画像はありません");
            } else {
                println!("解析失敗: {}件", failed.len());
                for image in failed {
                    println!("  {}", image);
                }
            }
        }

        Commands::Config {
            show,
            set_ground_truth,
            set_vendor,
            set_results_dir,
            set_images_dir,
        } => {
            let mut config = config;
            let mut updated = false;

            if let Some(path) = set_ground_truth {
                config.ground_truth = path;
                updated = true;
            }
            if let Some(path) = set_vendor {
                config.vendor = path;
                updated = true;
            }
            if let Some(path) = set_results_dir {
                config.results_dir = path;
                updated = true;
            }
            if let Some(path) = set_images_dir {
                config.images_dir = path;
                updated = true;
            }

            if updated {
                config.save()?;
                println!("✔ 設定を保存しました: {}", Config::config_path()?.display());
            }

            if show || !updated {
                println!("設定:");
                println!("  正解データ: {}", config.ground_truth.display());
                println!("  ベンダー結果: {}", config.vendor.display());
                println!("  VLM解析結果フォルダ: {}", config.results_dir.display());
                println!("  解析結果ファイル接頭辞: {}", config.result_prefix);
                println!("  画像フォルダ: {}", config.images_dir.display());
                println!("  出力先: {}", config.output_dir.display());
                println!("  監視間隔: {}秒", config.watch_interval_seconds);
                match &config.category_order {
                    Some(path) => println!("  カテゴリ順位表: {}", path.display()),
                    None => println!("  カテゴリ順位表: 組み込み"),
                }
            }
        }

        Commands::Cache { clear, folder, info } => {
            let target = folder.unwrap_or_else(|| PathBuf::from("."));
            let cache_path = TableCache::cache_path(&target);

            if info || !clear {
                // デフォルトまたは--info: 情報表示
                if cache_path.exists() {
                    let cache = TableCache::load(&target);
                    println!("キャッシュ情報:");
                    println!("  パス: {}", cache_path.display());
                    println!("  件数: {}", cache.len());
                    if let Ok(meta) = std::fs::metadata(&cache_path) {
                        println!("  サイズ: {} bytes", meta.len());
                    }
                } else {
                    println!("キャッシュファイルが存在しません: {}", cache_path.display());
                }
            }

            if clear {
                match TableCache::clear(&target) {
                    Ok(true) => println!("✔ キャッシュを削除しました: {}", cache_path.display()),
                    Ok(false) => println!("キャッシュファイルが存在しません"),
                    Err(e) => println!("キャッシュ削除エラー: {}", e),
                }
            }
        }
    }

    Ok(())
}
