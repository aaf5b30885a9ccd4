//! 分類器ハンドル
//!
//! 初期化・分類・解放の明示的なライフサイクルを提供します。
//! グローバルな遅延初期化シングルトンは使わず、呼び出し側が
//! ハンドルを保持して各操作に渡します。

use std::path::Path;

use image::RgbImage;
use serde::Serialize;

use crate::classifier::engine::InferenceEngine;
use crate::classifier::error::ClassifierError;
use crate::classifier::labels::LabelSet;
use crate::classifier::preprocess::preprocess_image;
use crate::classifier::selector::select_top_label;

/// 分類結果
#[derive(Debug, Clone, Serialize)]
pub struct Classification {
    /// 予測ラベル
    pub label: String,
    /// クラスインデックス
    pub class_index: usize,
    /// 予測クラスのスコア
    pub score: f32,
}

/// 読み込み済みのモデルとラベル
struct LoadedClassifier {
    engine: InferenceEngine,
    labels: LabelSet,
}

/// 分類器ハンドル
///
/// `initialize` で生成し、不要になったら `release` で解放します。
/// 解放後の `classify` は `UseAfterRelease` エラーになります。
///
/// 同一ハンドルに対する分類は直列に実行する前提です。並行呼び出しは
/// 呼び出し側でMutexなどにより直列化してください（アプリ本体は
/// Tauriの管理状態でMutex保持しています）。
pub struct Classifier {
    inner: Option<LoadedClassifier>,
}

impl Classifier {
    /// モデルアーカイブとラベルファイルから分類器を初期化
    ///
    /// ラベルファイルは1行1ラベルで、行順がクラスインデックスに
    /// 対応します。ラベル数とモデルのクラス数が一致しない場合は
    /// 初期化エラーになります。
    pub fn initialize(model_path: &Path, label_path: &Path) -> Result<Self, ClassifierError> {
        let engine = InferenceEngine::load(model_path)?;
        let labels = LabelSet::load(label_path)?;

        let num_classes = engine.metadata().num_classes;
        if labels.len() != num_classes {
            return Err(ClassifierError::Initialization {
                reason: format!(
                    "ラベル数とモデルのクラス数が一致しません: {} vs {}",
                    labels.len(),
                    num_classes
                ),
            });
        }

        println!("[Classifier] 初期化完了 - クラス数: {}", num_classes);

        Ok(Self {
            inner: Some(LoadedClassifier { engine, labels }),
        })
    }

    fn loaded(&self) -> Result<&LoadedClassifier, ClassifierError> {
        self.inner.as_ref().ok_or(ClassifierError::UseAfterRelease)
    }

    /// 単一画像を分類
    ///
    /// 入力画像は呼び出し側でモデル入力サイズにリサイズ済みであること。
    /// サイズが一致しない場合は `InvalidInput` になります。
    /// 分類は完了するか失敗するかのいずれかで、部分的な結果は
    /// 返しません。
    pub fn classify(&self, img: &RgbImage) -> Result<Classification, ClassifierError> {
        let loaded = self.loaded()?;
        let meta = loaded.engine.metadata();

        let tensor_data = preprocess_image(
            img,
            meta.model_input_size,
            meta.model_input_size,
            meta.channel_mean,
            meta.channel_std,
        )?;

        let scores = loaded.engine.infer(&tensor_data)?;
        let (label, class_index) = select_top_label(&scores, &loaded.labels)?;
        let score = scores[class_index];

        Ok(Classification {
            label,
            class_index,
            score,
        })
    }

    /// モデル入力サイズを取得
    pub fn input_size(&self) -> Result<u32, ClassifierError> {
        Ok(self.loaded()?.engine.metadata().model_input_size)
    }

    /// クラス数を取得
    pub fn num_classes(&self) -> Result<usize, ClassifierError> {
        Ok(self.loaded()?.engine.metadata().num_classes)
    }

    /// ラベル一覧を取得
    pub fn labels(&self) -> Result<&LabelSet, ClassifierError> {
        Ok(&self.loaded()?.labels)
    }

    /// 分類器を解放
    ///
    /// モデルとラベルを破棄します。以降の `classify` は
    /// `UseAfterRelease` エラーになります。二重解放は何もしません。
    pub fn release(&mut self) {
        if self.inner.take().is_some() {
            println!("[Classifier] 解放しました");
        }
    }

    /// 解放済みかどうか
    pub fn is_released(&self) -> bool {
        self.inner.is_none()
    }
}

#[cfg(test)]
impl Classifier {
    pub(crate) fn from_parts(engine: InferenceEngine, labels: LabelSet) -> Self {
        Self {
            inner: Some(LoadedClassifier { engine, labels }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelMetadata;
    use image::Rgb;

    fn test_classifier() -> Classifier {
        let metadata = ModelMetadata::new(3, 48, 128.0, 128.0);
        let engine = InferenceEngine::with_random_weights(metadata).unwrap();
        let labels = LabelSet::from_labels(vec![
            "healthy".to_string(),
            "early_blight".to_string(),
            "late_blight".to_string(),
        ]);
        Classifier::from_parts(engine, labels)
    }

    fn test_image(size: u32) -> RgbImage {
        RgbImage::from_pixel(size, size, Rgb([100, 150, 200]))
    }

    #[test]
    fn test_classify_returns_known_label() {
        let classifier = test_classifier();
        let result = classifier.classify(&test_image(48)).unwrap();

        assert!(result.class_index < 3);
        let labels = classifier.labels().unwrap();
        assert_eq!(labels.get(result.class_index), Some(result.label.as_str()));
    }

    #[test]
    fn test_classify_rejects_wrong_image_size() {
        let classifier = test_classifier();
        let result = classifier.classify(&test_image(32));
        assert!(matches!(
            result,
            Err(ClassifierError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_classify_after_release_fails() {
        let mut classifier = test_classifier();
        classifier.release();

        assert!(classifier.is_released());
        let result = classifier.classify(&test_image(48));
        assert!(matches!(result, Err(ClassifierError::UseAfterRelease)));
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut classifier = test_classifier();
        classifier.release();
        classifier.release();
        assert!(classifier.is_released());
    }

    #[test]
    fn test_info_after_release_fails() {
        let mut classifier = test_classifier();
        classifier.release();
        assert!(matches!(
            classifier.input_size(),
            Err(ClassifierError::UseAfterRelease)
        ));
    }
}
