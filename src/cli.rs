use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fashion-eval")]
#[command(about = "ファッション画像属性の正解比較・精度評価ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// 比較の入力・出力（未指定は設定ファイルの値）
#[derive(Args, Debug, Clone, Default)]
pub struct CompareArgs {
    /// 正解データ（xlsx）
    #[arg(short, long)]
    pub ground_truth: Option<PathBuf>,

    /// ベンダー解析結果（xlsx）
    #[arg(long)]
    pub vendor: Option<PathBuf>,

    /// VLM解析結果のフォルダ（最新ファイルを使用）
    #[arg(short, long)]
    pub results_dir: Option<PathBuf>,

    /// 画像フォルダ
    #[arg(short, long)]
    pub images_dir: Option<PathBuf>,

    /// 出力ファイル/ディレクトリ
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 出力形式 (excel/json/both)
    #[arg(short, long, default_value = "both")]
    pub format: ExportFormat,

    /// 読み込みキャッシュを保存するフォルダ
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 正解データと比較してレポートを出力
    Compare {
        #[command(flatten)]
        args: CompareArgs,
    },

    /// 入力ファイルを監視し、更新のたびに再比較
    Watch {
        #[command(flatten)]
        args: CompareArgs,

        /// ポーリング間隔（秒）
        #[arg(long)]
        interval: Option<u64>,
    },

    /// 最新のVLM解析結果から解析失敗画像を一覧表示
    Failed {
        /// VLM解析結果のフォルダ
        #[arg(short, long)]
        results_dir: Option<PathBuf>,
    },

    /// 設定を表示/編集
    Config {
        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// 正解データのパスを設定
        #[arg(long)]
        set_ground_truth: Option<PathBuf>,

        /// ベンダー結果のパスを設定
        #[arg(long)]
        set_vendor: Option<PathBuf>,

        /// VLM解析結果フォルダを設定
        #[arg(long)]
        set_results_dir: Option<PathBuf>,

        /// 画像フォルダを設定
        #[arg(long)]
        set_images_dir: Option<PathBuf>,
    },

    /// キャッシュ管理
    Cache {
        /// キャッシュを削除
        #[arg(long)]
        clear: bool,

        /// 対象フォルダ（省略時はカレント）
        #[arg(short, long)]
        folder: Option<PathBuf>,

        /// キャッシュ情報を表示
        #[arg(long)]
        info: bool,
    },
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ExportFormat {
    Excel,
    Json,
    #[default]
    Both,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            "json" => Ok(ExportFormat::Json),
            "both" => Ok(ExportFormat::Both),
            _ => Err(format!("Unknown format: {}. Use excel, json, or both", s)),
        }
    }
}
