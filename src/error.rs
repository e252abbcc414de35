use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EvalError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("スプレッドシート読み込みエラー ({}): {cause}", path.display())]
    Spreadsheet { path: PathBuf, cause: String },

    #[error("表の形式が不正: {0}")]
    Table(#[from] fashion_eval_common::Error),

    #[error("解析結果ファイルが見つかりません: {0}")]
    NoResultFiles(String),

    #[error("正解データを読み込めません: {0}")]
    GroundTruthLoad(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("Excel生成エラー: {0}")]
    ExcelGeneration(String),
}

impl From<rust_xlsxwriter::XlsxError> for EvalError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        EvalError::ExcelGeneration(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EvalError>;
