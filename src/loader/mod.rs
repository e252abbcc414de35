//! スプレッドシート読み込みモジュール
//!
//! 5列（Image, Cat, Subcat, Key, Value）のワークブックを読み込み、
//! 共通ライブラリの Table に変換する。

pub mod cache;
pub mod discover;

use crate::error::{EvalError, Result};
use cache::TableCache;
use calamine::{open_workbook_auto, Data, Reader};
use discover::find_result_files;
use fashion_eval_common::{CategoryOrder, ColumnMap, RawTable, Table};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub use cache::compute_file_hash;
pub use discover::ResultFile;

/// セル値を文字列に変換する
///
/// 整数値の浮動小数点は `.0` を落とす。空セル・エラーセルは空文字。
pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < 1e15 {
                format!("{}", *f as i64)
            } else {
                f.to_string()
            }
        }
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// ワークブックの先頭シートを読み込む
pub fn read_table(path: &Path) -> Result<RawTable> {
    if !path.exists() {
        return Err(EvalError::FileNotFound(path.display().to_string()));
    }

    let spreadsheet_error = |cause: String| EvalError::Spreadsheet {
        path: path.to_path_buf(),
        cause,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| spreadsheet_error(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| spreadsheet_error("シートがありません".into()))?
        .map_err(|e| spreadsheet_error(e.to_string()))?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .map(|row| row.iter().map(cell_to_string).collect())
        .unwrap_or_default();
    let columns = ColumnMap::resolve(&headers)?;

    let mut table = RawTable::default();
    for row in rows {
        let cells: Vec<String> = row.iter().map(cell_to_string).collect();
        if cells.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        table.rows.push(columns.extract(&cells));
    }

    debug!("{}: {}行読み込み", path.display(), table.rows.len());
    Ok(table)
}

/// 読み込みと整形（キャッシュがあれば使う）
pub fn load_table(path: &Path, order: &CategoryOrder, cache: Option<&mut TableCache>) -> Result<Table> {
    let raw = match cache {
        Some(cache) => cache.read(path)?,
        None => read_table(path)?,
    };
    Ok(Table::from_raw(raw, order))
}

/// 読み込んだ VLM 解析結果
#[derive(Debug, Clone)]
pub struct LoadedResult {
    /// 実際に読み込んだファイル
    pub path: PathBuf,
    pub table: Table,
}

/// 最新の VLM 解析結果を読み込む
///
/// 最新ファイルが読めない場合（編集中のロックなど）は次に新しいファイルを試す。
pub fn load_latest_result(
    dir: &Path,
    prefix: &str,
    order: &CategoryOrder,
    mut cache: Option<&mut TableCache>,
) -> Result<LoadedResult> {
    let files = find_result_files(dir, prefix)?;
    if files.is_empty() {
        return Err(EvalError::NoResultFiles(format!(
            "{}/{}*.xlsx",
            dir.display(),
            prefix
        )));
    }

    let mut last_error = None;
    for file in &files {
        match load_table(&file.path, order, cache.as_deref_mut()) {
            Ok(table) => {
                info!("VLM解析結果: {}", file.path.display());
                return Ok(LoadedResult {
                    path: file.path.clone(),
                    table,
                });
            }
            Err(e) => {
                warn!("{} を読み込めません: {}", file.path.display(), e);
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| EvalError::NoResultFiles(dir.display().to_string())))
}
