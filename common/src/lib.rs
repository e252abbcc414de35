//! Fashion Eval Common Library
//!
//! 正解データと候補（VLM・ベンダー）の属性テーブルを比較する中核ロジック。
//! I/O を持たない純粋な処理だけを置く。

pub mod aggregate;
pub mod category;
pub mod error;
pub mod fuzzy;
pub mod lookup;
pub mod missing;
pub mod reconcile;
pub mod shape;
pub mod table;
pub mod text;
pub mod types;
pub mod verdict;

pub use aggregate::{Aggregator, CorpusSummary, SourceAverages};
pub use category::CategoryOrder;
pub use error::{Error, Result};
pub use fuzzy::{category_word_match, subcat_fuzzy_match, word_overlap};
pub use lookup::{AttributeIndex, LookupKey, Probe};
pub use reconcile::{compute_accuracy, reconcile, AccuracyRecord, Reconciliation};
pub use table::{ColumnMap, Table};
pub use text::{normalize_for_dedup, normalize_image_name, normalize_label, tokenize_value_set};
pub use types::{AttributeRow, CandidateSource, RawRow, RawTable, RowSet};
pub use verdict::{CellFills, Fill, MatchVerdict, VerdictRow, VerdictTable};
