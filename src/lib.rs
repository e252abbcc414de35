//! fashion-eval
//!
//! 正解データ・VLM解析結果・ベンダー解析結果のスプレッドシートを読み込み、
//! 画像ごとの属性を照合して精度レポートを出力する。

pub mod cli;
pub mod compare;
pub mod config;
pub mod error;
pub mod export;
pub mod loader;
pub mod scanner;
pub mod watch;
