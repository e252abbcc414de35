//! VLM解析結果ファイルの検索
//!
//! `<接頭辞>YYYYMMDD_HHMMSS.xlsx` 形式のファイルを新しい順に並べる。

use crate::error::{EvalError, Result};
use chrono::NaiveDateTime;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

lazy_static::lazy_static! {
    static ref STAMP_RE: Regex = Regex::new(r"^(\d{8}_\d{6})").unwrap();
}

/// 解析結果ファイル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultFile {
    pub path: PathBuf,
    pub modified: SystemTime,
    /// ファイル名に含まれる実行日時
    pub stamp: Option<NaiveDateTime>,
}

/// ファイル名から実行日時を取り出す
pub fn parse_stamp(file_name: &str, prefix: &str) -> Option<NaiveDateTime> {
    let rest = file_name.strip_prefix(prefix)?;
    let caps = STAMP_RE.captures(rest)?;
    NaiveDateTime::parse_from_str(&caps[1], "%Y%m%d_%H%M%S").ok()
}

fn is_result_file(file_name: &str, prefix: &str) -> bool {
    // Office のロックファイル
    if file_name.starts_with("~$") {
        return false;
    }
    file_name.starts_with(prefix) && file_name.to_lowercase().ends_with(".xlsx")
}

/// 解析結果ファイルを新しい順（更新時刻 → 実行日時 → ファイル名）に列挙する
pub fn find_result_files(dir: &Path, prefix: &str) -> Result<Vec<ResultFile>> {
    if !dir.exists() {
        return Err(EvalError::FolderNotFound(dir.display().to_string()));
    }

    let mut files = Vec::new();

    for entry in WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy().to_string();
        if !is_result_file(&file_name, prefix) {
            continue;
        }

        let modified = entry
            .metadata()
            .ok()
            .and_then(|m| m.modified().ok())
            .unwrap_or(SystemTime::UNIX_EPOCH);

        files.push(ResultFile {
            path: path.to_path_buf(),
            modified,
            stamp: parse_stamp(&file_name, prefix),
        });
    }

    files.sort_by(|a, b| {
        b.modified
            .cmp(&a.modified)
            .then_with(|| b.stamp.cmp(&a.stamp))
            .then_with(|| b.path.file_name().cmp(&a.path.file_name()))
    });

    Ok(files)
}
