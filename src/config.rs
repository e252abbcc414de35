use crate::error::{EvalError, Result};
use fashion_eval_common::CategoryOrder;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// 正解データ（xlsx）
    pub ground_truth: PathBuf,
    /// ベンダー解析結果（xlsx）
    pub vendor: PathBuf,
    /// VLM解析結果の出力フォルダ
    pub results_dir: PathBuf,
    /// VLM解析結果ファイル名の接頭辞
    pub result_prefix: String,
    /// 画像フォルダ
    pub images_dir: PathBuf,
    /// レポート出力先
    pub output_dir: PathBuf,
    /// watch のポーリング間隔（秒）
    pub watch_interval_seconds: u64,
    /// カテゴリ順位表（JSON）。未指定なら組み込みの順位
    pub category_order: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ground_truth: PathBuf::from("ground_truth.xlsx"),
            vendor: PathBuf::from("vendor_result.xlsx"),
            results_dir: PathBuf::from("output"),
            result_prefix: "vlm_analysis_result_".into(),
            images_dir: PathBuf::from("images"),
            output_dir: PathBuf::from("."),
            watch_interval_seconds: 2,
            category_order: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// 指定パスから読み込み（無ければ既定値）
    pub fn load_from(config_path: &std::path::Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, config_path: &std::path::Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| EvalError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("fashion-eval").join("config.json"))
    }

    /// カテゴリ順位表を読み込む
    pub fn category_order(&self) -> Result<CategoryOrder> {
        match &self.category_order {
            Some(path) => {
                if !path.exists() {
                    return Err(EvalError::FileNotFound(path.display().to_string()));
                }
                Ok(CategoryOrder::from_file(path)?)
            }
            None => Ok(CategoryOrder::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.result_prefix, "vlm_analysis_result_");
        assert_eq!(config.watch_interval_seconds, 2);
        assert!(config.category_order.is_none());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"vendor": "fnf.xlsx"}"#).unwrap();
        assert_eq!(config.vendor, PathBuf::from("fnf.xlsx"));
        assert_eq!(config.ground_truth, PathBuf::from("ground_truth.xlsx"));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            images_dir: PathBuf::from("photos"),
            watch_interval_seconds: 5,
            ..Default::default()
        };
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("none.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_category_order_missing_file() {
        let config = Config {
            category_order: Some(PathBuf::from("/nonexistent/order.json")),
            ..Default::default()
        };
        assert!(matches!(config.category_order(), Err(EvalError::FileNotFound(_))));
    }
}
