//! アプリケーション設定管理モジュール
//!
//! モデルパスなどの設定をJSON形式で保存・読み込みします。

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// モデル設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSettings {
    /// 使用するモデルアーカイブ（tar.gz）のパス
    pub model_path: String,
    /// ラベルファイル（1行1ラベルのテキスト）のパス
    pub label_path: String,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            model_path: "models/leaf_classifier.tar.gz".to_string(),
            label_path: "models/labels.txt".to_string(),
        }
    }
}

/// アプリケーション設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// モデル設定
    pub model: ModelSettings,
    /// 最後に分類した画像のディレクトリ
    #[serde(default)]
    pub last_image_dir: Option<String>,
    /// 分類結果コピーの出力先（前回値を保存）
    #[serde(default)]
    pub last_output_dir: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: ModelSettings::default(),
            last_image_dir: None,
            last_output_dir: None,
        }
    }
}

impl AppConfig {
    /// 設定ファイルのデフォルトパス
    pub fn default_path() -> PathBuf {
        PathBuf::from("config.json")
    }

    /// 設定を読み込む
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// デフォルトパスから設定を読み込む、存在しない場合はデフォルト設定を返す
    pub fn load_or_default() -> Self {
        let path = Self::default_path();
        if path.exists() {
            match Self::load(&path) {
                Ok(config) => {
                    println!("設定ファイルを読み込みました: {}", path.display());
                    config
                }
                Err(e) => {
                    eprintln!(
                        "警告: 設定ファイルの読み込みに失敗しました ({}): {}",
                        path.display(),
                        e
                    );
                    eprintln!("デフォルト設定を使用します");
                    Self::default()
                }
            }
        } else {
            println!("設定ファイルが存在しません。デフォルト設定を使用します");
            Self::default()
        }
    }

    /// 設定を保存する
    pub fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// デフォルトパスに設定を保存する
    pub fn save_default(&self) -> anyhow::Result<()> {
        let path = Self::default_path();
        self.save(&path)?;
        println!("設定ファイルを保存しました: {}", path.display());
        Ok(())
    }

    /// モデルパスを設定
    pub fn set_model_path(&mut self, path: String) {
        self.model.model_path = path;
    }

    /// ラベルファイルのパスを設定
    pub fn set_label_path(&mut self, path: String) {
        self.model.label_path = path;
    }

    /// 最後に分類した画像のディレクトリを更新
    pub fn update_last_image_dir<P: AsRef<Path>>(&mut self, path: P) {
        self.last_image_dir = Some(path.as_ref().to_string_lossy().to_string());
    }

    /// 設定情報を表示
    pub fn display(&self) {
        println!("=== アプリケーション設定 ===");
        println!("モデルパス: {}", self.model.model_path);
        println!("ラベルパス: {}", self.model.label_path);
        if let Some(ref dir) = self.last_image_dir {
            println!("最後に使用した画像ディレクトリ: {}", dir);
        }
        if let Some(ref dir) = self.last_output_dir {
            println!("最後に使用した出力先: {}", dir);
        }
        println!("========================\n");
    }
}
