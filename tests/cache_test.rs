//! キャッシュ機能テスト
//!
//! 読み込みキャッシュの動作を検証

mod common;

use common::{write_sheet, HEADERS};
use fashion_eval::loader::cache::{compute_file_hash, TableCache};
use fashion_eval::loader::load_table;
use fashion_eval_common::CategoryOrder;
use tempfile::tempdir;

/// 空のキャッシュファイル
#[test]
fn test_cache_file_empty() {
    let dir = tempdir().expect("Failed to create temp dir");
    let cache = TableCache::load(dir.path());

    assert_eq!(cache.len(), 0);
    assert!(cache.is_empty());
}

/// 読み込み結果がキャッシュされる
#[test]
fn test_read_populates_cache() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("gt.xlsx");
    write_sheet(&path, &HEADERS, &[["a.jpg", "mood", "", "", "calm"]]);

    let mut cache = TableCache::new();
    let first = cache.read(&path).expect("読み込み失敗");
    assert_eq!(cache.len(), 1);

    let hash = compute_file_hash(&path).expect("ハッシュ計算失敗");
    assert_eq!(cache.get(&hash), Some(&first));

    let second = cache.read(&path).expect("読み込み失敗");
    assert_eq!(first, second);
    assert_eq!(cache.len(), 1);
}

/// 同じ内容の別ファイルは同じエントリを共有する
#[test]
fn test_content_addressed() {
    let dir = tempdir().expect("Failed to create temp dir");
    let a = dir.path().join("a.xlsx");
    let b = dir.path().join("b.xlsx");
    write_sheet(&a, &HEADERS, &[["a.jpg", "mood", "", "", "calm"]]);
    std::fs::copy(&a, &b).expect("コピー失敗");

    let mut cache = TableCache::new();
    cache.read(&a).expect("読み込み失敗");
    cache.read(&b).expect("読み込み失敗");
    assert_eq!(cache.len(), 1);
}

/// ファイルが更新されたら読み直す
#[test]
fn test_changed_file_is_reread() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("vendor.xlsx");
    write_sheet(&path, &HEADERS, &[["a.jpg", "mood", "", "", "calm"]]);

    let mut cache = TableCache::new();
    let before = load_table(&path, &CategoryOrder::default(), Some(&mut cache)).expect("読み込み失敗");
    assert_eq!(before.get("a.jpg").unwrap().rows[0].value, "calm");

    write_sheet(&path, &HEADERS, &[["a.jpg", "mood", "", "", "bright"]]);
    // 更新時刻の粒度が粗いファイルシステムでも変化が分かるようにする
    let file = std::fs::File::options().write(true).open(&path).unwrap();
    file.set_modified(std::time::SystemTime::now() + std::time::Duration::from_secs(5))
        .unwrap();
    let after = load_table(&path, &CategoryOrder::default(), Some(&mut cache)).expect("読み込み失敗");
    assert_eq!(after.get("a.jpg").unwrap().rows[0].value, "bright");
    assert_eq!(cache.len(), 2);
}

/// 保存したキャッシュを別プロセス相当で再利用する
#[test]
fn test_cache_persisted_between_runs() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("gt.xlsx");
    write_sheet(&path, &HEADERS, &[["a.jpg", "mood", "", "", "calm"]]);

    let mut cache = TableCache::load(dir.path());
    cache.read(&path).expect("読み込み失敗");
    cache.save(dir.path()).expect("キャッシュ保存失敗");

    let mut reloaded = TableCache::load(dir.path());
    assert_eq!(reloaded.len(), 1);
    let table = reloaded.read(&path).expect("読み込み失敗");
    assert_eq!(table.rows[0].value, "calm");
    assert_eq!(reloaded.len(), 1);
}

/// キャッシュ削除
#[test]
fn test_cache_clear() {
    let dir = tempdir().expect("Failed to create temp dir");
    TableCache::new().save(dir.path()).expect("キャッシュ保存失敗");

    assert!(TableCache::cache_path(dir.path()).exists());
    assert!(TableCache::clear(dir.path()).expect("削除失敗"));
    assert!(!TableCache::cache_path(dir.path()).exists());
}
