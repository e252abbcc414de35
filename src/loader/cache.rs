//! 読み込み結果キャッシュモジュール
//!
//! ファイル内容の SHA-256 をキーにして読み込み済みの表を保持し、
//! 変更の無いスプレッドシートの再パースをスキップする。
//! (パス, 更新時刻) → ハッシュの対応も持ち、更新時刻が同じならハッシュ計算も省く。

use super::read_table;
use crate::error::Result;
use fashion_eval_common::RawTable;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

const CACHE_FILE_NAME: &str = ".fashion-eval-cache.json";

/// キャッシュファイルの構造
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableCache {
    /// バージョン（互換性チェック用）
    version: u32,
    /// ファイルハッシュ → 読み込み結果
    entries: HashMap<String, CacheEntry>,
    /// パス → (更新時刻, ハッシュ)
    #[serde(default)]
    stamps: HashMap<String, FileStamp>,
}

/// キャッシュエントリ
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// ファイル名
    pub file_name: String,
    /// ファイルサイズ
    pub file_size: u64,
    /// 読み込み結果
    pub table: RawTable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct Mtime {
    secs: u64,
    nanos: u32,
}

impl Mtime {
    fn of(path: &Path) -> Option<Self> {
        let modified = std::fs::metadata(path).and_then(|m| m.modified()).ok()?;
        let since = modified.duration_since(UNIX_EPOCH).ok()?;
        Some(Self {
            secs: since.as_secs(),
            nanos: since.subsec_nanos(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FileStamp {
    mtime: Mtime,
    hash: String,
}

impl TableCache {
    const CURRENT_VERSION: u32 = 1;

    pub fn new() -> Self {
        Self::default()
    }

    /// キャッシュファイルのパス
    pub fn cache_path(folder: &Path) -> PathBuf {
        folder.join(CACHE_FILE_NAME)
    }

    /// キャッシュファイルを読み込み（無い・壊れている・バージョン違いなら空）
    pub fn load(folder: &Path) -> Self {
        let cache_path = Self::cache_path(folder);
        if !cache_path.exists() {
            return Self::default();
        }

        let file = match File::open(&cache_path) {
            Ok(f) => f,
            Err(_) => return Self::default(),
        };

        let reader = BufReader::new(file);
        match serde_json::from_reader(reader) {
            Ok(cache) => {
                let cache: TableCache = cache;
                // バージョンチェック
                if cache.version != Self::CURRENT_VERSION {
                    warn!("キャッシュバージョン不一致、再生成します");
                    return Self::default();
                }
                cache
            }
            Err(e) => {
                warn!("キャッシュファイルが壊れています: {}", e);
                Self::default()
            }
        }
    }

    /// キャッシュファイルを保存
    pub fn save(&self, folder: &Path) -> Result<()> {
        let file = File::create(Self::cache_path(folder))?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// キャッシュファイルを削除（存在しなければ false）
    pub fn clear(folder: &Path) -> Result<bool> {
        let cache_path = Self::cache_path(folder);
        if !cache_path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(cache_path)?;
        Ok(true)
    }

    /// キャッシュをルックアップ
    pub fn get(&self, hash: &str) -> Option<&RawTable> {
        self.entries.get(hash).map(|e| &e.table)
    }

    /// キャッシュに追加
    pub fn insert(&mut self, hash: String, file_name: String, file_size: u64, table: RawTable) {
        self.entries.insert(hash, CacheEntry {
            file_name,
            file_size,
            table,
        });
    }

    /// キャッシュ件数
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 表を読み込む（内容が同じならキャッシュから返す）
    pub fn read(&mut self, path: &Path) -> Result<RawTable> {
        let key = path.to_string_lossy().to_string();
        let mtime = Mtime::of(path);

        if let (Some(mtime), Some(stamp)) = (mtime, self.stamps.get(&key)) {
            if stamp.mtime == mtime {
                if let Some(table) = self.get(&stamp.hash) {
                    debug!("キャッシュ使用（更新なし）: {}", path.display());
                    return Ok(table.clone());
                }
            }
        }

        let table = match compute_file_hash(path) {
            Ok(hash) => {
                let table = match self.get(&hash) {
                    Some(table) => {
                        debug!("キャッシュ使用（内容一致）: {}", path.display());
                        table.clone()
                    }
                    None => {
                        let table = read_table(path)?;
                        let file_name = path
                            .file_name()
                            .map(|n| n.to_string_lossy().to_string())
                            .unwrap_or_default();
                        let file_size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
                        self.insert(hash.clone(), file_name, file_size, table.clone());
                        table
                    }
                };
                if let Some(mtime) = mtime {
                    self.stamps.insert(key, FileStamp { mtime, hash });
                }
                table
            }
            // ハッシュ計算失敗時はキャッシュを使わない
            Err(_) => read_table(path)?,
        };

        Ok(table)
    }
}

impl Default for TableCache {
    fn default() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            entries: HashMap::new(),
            stamps: HashMap::new(),
        }
    }
}

/// ファイル内容のハッシュを計算（SHA-256）
pub fn compute_file_hash(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

/// ファイルの更新時刻
pub fn modified_time(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}
