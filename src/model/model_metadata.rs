//! モデルメタデータの定義
//!
//! モデルアーカイブ（tar.gz）に同梱され、推論時に必要な情報を
//! 記述します。クラスラベルの文字列自体はメタデータには含めず、
//! 別ファイル（1行1ラベルのテキスト）で管理します。ここではクラス数
//! のみを保持し、初期化時にラベル数と突き合わせて検証します。

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// モデルメタデータ
///
/// tar.gz形式で保存される情報：
/// - metadata.json: このメタデータ（JSON形式）
/// - model.bin: モデルの重み（バイナリ）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// 分類クラス数
    ///
    /// ラベルファイルの行数と一致している必要があります。
    pub num_classes: usize,

    /// モデル入力サイズ（CNNへの入力解像度、通常224x224）
    pub model_input_size: u32,

    /// 前処理の平均値（学習時と同一の値）
    pub channel_mean: f32,

    /// 前処理の標準偏差（学習時と同一の値）
    pub channel_std: f32,

    /// モデルの学習時刻（ISO8601形式）
    pub trained_at: String,
}

impl ModelMetadata {
    /// 新しいメタデータを作成
    pub fn new(
        num_classes: usize,
        model_input_size: u32,
        channel_mean: f32,
        channel_std: f32,
    ) -> Self {
        let trained_at = chrono::Local::now().to_rfc3339();

        Self {
            num_classes,
            model_input_size,
            channel_mean,
            channel_std,
            trained_at,
        }
    }

    /// メタデータをJSON文字列に変換
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize metadata to JSON")
    }

    /// JSON文字列からメタデータを生成
    pub fn from_json_string(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to deserialize metadata from JSON")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_round_trip() {
        let metadata = ModelMetadata::new(38, 224, 128.0, 128.0);
        let json = metadata.to_json_string().unwrap();
        let restored = ModelMetadata::from_json_string(&json).unwrap();
        assert_eq!(metadata, restored);
    }

    #[test]
    fn test_invalid_json_rejected() {
        assert!(ModelMetadata::from_json_string("not json").is_err());
    }
}
