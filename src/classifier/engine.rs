//! モデル推論機能
//!
//! モデルアーカイブから重みを復元し、前処理済みテンソルに対して
//! 順伝播を実行してスコア列を返します。モデル形式や数値カーネルの
//! 内部はburnに委譲し、ここでは入出力の検証のみを行います。

use std::path::Path;

use burn::{
    backend::{ndarray::NdArrayDevice, NdArray},
    module::Module,
    record::{BinBytesRecorder, FullPrecisionSettings, Recorder},
    tensor::Tensor,
};

use crate::classifier::error::ClassifierError;
use crate::classifier::net::{LeafNet, NetConfig};
use crate::classifier::preprocess::PIXEL_CHANNELS;
use crate::model::{load_model_with_metadata, ModelMetadata};

/// 推論に使用するバックエンド
///
/// ハンドルをTauriの管理状態に常駐させるためSendである必要があり、
/// CPU (NdArray) バックエンドを使用します。
pub type InferenceBackend = NdArray<f32>;

/// 推論エンジン
pub struct InferenceEngine {
    model: LeafNet<InferenceBackend>,
    metadata: ModelMetadata,
    device: NdArrayDevice,
}

impl InferenceEngine {
    /// モデルアーカイブを読み込んで推論エンジンを初期化
    ///
    /// アーカイブの読み込み・解析に失敗した場合は初期化エラーを返し、
    /// 部分的に構築されたエンジンは返しません。
    pub fn load(model_path: &Path) -> Result<Self, ClassifierError> {
        let (metadata, model_binary) =
            load_model_with_metadata(model_path).map_err(|e| ClassifierError::Initialization {
                reason: format!(
                    "モデルアーカイブの読み込みエラー: {:#} (パス: {:?})",
                    e, model_path
                ),
            })?;

        let device = NdArrayDevice::default();

        let net_config = NetConfig::new(metadata.num_classes)
            .with_image_size(metadata.model_input_size as usize);
        let model = net_config.init::<InferenceBackend>(&device)?;

        // モデルの重みを復元
        let recorder = BinBytesRecorder::<FullPrecisionSettings>::default();
        let record =
            recorder
                .load(model_binary, &device)
                .map_err(|e| ClassifierError::Initialization {
                    reason: format!("モデル重みの読み込みエラー: {:?}", e),
                })?;

        let model = model.load_record(record);

        println!(
            "[InferenceEngine] モデル読み込み完了 - クラス数: {}, 入力サイズ: {}x{}",
            metadata.num_classes, metadata.model_input_size, metadata.model_input_size
        );

        Ok(Self {
            model,
            metadata,
            device,
        })
    }

    /// 前処理済みテンソルデータからスコア列を計算
    ///
    /// 入力は行優先・RGBインターリーブ順のf32列で、長さは
    /// `input_size * input_size * 3` と一致している必要があります。
    /// 戻り値はクラスごとのスコア（長さ = クラス数）で、内容は
    /// 呼び出し側にとって不透明なf32データです。
    pub fn infer(&self, tensor_data: &[f32]) -> Result<Vec<f32>, ClassifierError> {
        let size = self.metadata.model_input_size as usize;
        let expected = size * size * PIXEL_CHANNELS;

        if tensor_data.len() != expected {
            return Err(ClassifierError::InvalidInput {
                reason: format!(
                    "テンソル長が不正です: {} (期待: {})",
                    tensor_data.len(),
                    expected
                ),
            });
        }

        // [1, H, W, C] -> [1, C, H, W]
        let input: Tensor<InferenceBackend, 4> =
            Tensor::<InferenceBackend, 1>::from_floats(tensor_data, &self.device)
                .reshape([1, size, size, PIXEL_CHANNELS]);
        let input = input.permute([0, 3, 1, 2]);

        let output = self.model.forward(input);

        let scores = output
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| ClassifierError::Inference {
                reason: format!("推論結果の取得エラー: {:?}", e),
            })?;

        Ok(scores)
    }

    /// モデルメタデータへの参照を取得
    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }
}

#[cfg(test)]
impl InferenceEngine {
    /// 重みレコードを読み込まず、初期化時の乱数重みのまま構築する
    pub(crate) fn with_random_weights(
        metadata: ModelMetadata,
    ) -> Result<Self, ClassifierError> {
        let device = NdArrayDevice::default();
        let model = NetConfig::new(metadata.num_classes)
            .with_image_size(metadata.model_input_size as usize)
            .init::<InferenceBackend>(&device)?;

        Ok(Self {
            model,
            metadata,
            device,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_engine() -> InferenceEngine {
        let metadata = ModelMetadata::new(4, 48, 128.0, 128.0);
        InferenceEngine::with_random_weights(metadata).unwrap()
    }

    #[test]
    fn test_infer_returns_one_score_per_class() {
        let engine = test_engine();
        let tensor_data = vec![0.0f32; 48 * 48 * 3];
        let scores = engine.infer(&tensor_data).unwrap();
        assert_eq!(scores.len(), 4);
    }

    #[test]
    fn test_infer_rejects_wrong_tensor_length() {
        let engine = test_engine();
        let tensor_data = vec![0.0f32; 10];
        let result = engine.infer(&tensor_data);
        assert!(matches!(
            result,
            Err(ClassifierError::InvalidInput { .. })
        ));
    }
}
