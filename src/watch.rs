//! 入力ファイルの更新監視
//!
//! 監視対象の更新時刻を記録しておき、変化があったかを判定する。
//! 解析結果フォルダは新しいファイルが追加されたことも変化として扱う。

use crate::loader::cache::modified_time;
use crate::loader::discover::find_result_files;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputStamps {
    stamps: Vec<(PathBuf, Option<SystemTime>)>,
}

impl InputStamps {
    /// 現在の状態を記録する
    pub fn capture(files: &[&Path], results_dir: Option<(&Path, &str)>) -> Self {
        let mut stamps: Vec<(PathBuf, Option<SystemTime>)> = files
            .iter()
            .map(|path| (path.to_path_buf(), modified_time(path)))
            .collect();

        if let Some((dir, prefix)) = results_dir {
            let latest = find_result_files(dir, prefix)
                .ok()
                .and_then(|files| files.into_iter().next());
            match latest {
                Some(file) => stamps.push((file.path, Some(file.modified))),
                None => stamps.push((dir.to_path_buf(), None)),
            }
        }

        Self { stamps }
    }

    pub fn changed_since(&self, previous: &InputStamps) -> bool {
        self != previous
    }
}
