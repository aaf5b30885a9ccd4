//! 画像分類のTauriコマンド
//!
//! ファイル選択やリサイズ、非同期ディスパッチなどの協調処理は
//! このレイヤーで行い、分類器コアは同期的に呼び出します。

use serde::Serialize;
use std::path::PathBuf;

#[cfg(feature = "ml")]
use crate::classifier::Classifier;
use crate::model::AppConfig;
#[cfg(feature = "ml")]
use crate::AppState;

/// 分類器情報
#[derive(Debug, Clone, Serialize)]
pub struct ClassifierInfo {
    pub num_classes: usize,
    pub input_size: u32,
    pub labels: Vec<String>,
}

/// 分類結果のレスポンス
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationResponse {
    pub label: String,
    pub class_index: usize,
    pub score: f32,
    pub elapsed_ms: u64,
}

#[cfg(feature = "ml")]
fn build_info(classifier: &Classifier) -> Result<ClassifierInfo, String> {
    Ok(ClassifierInfo {
        num_classes: classifier.num_classes().map_err(|e| e.to_string())?,
        input_size: classifier.input_size().map_err(|e| e.to_string())?,
        labels: classifier
            .labels()
            .map_err(|e| e.to_string())?
            .as_slice()
            .to_vec(),
    })
}

/// 分類器を初期化して管理状態に保持する
///
/// 既に分類器が存在する場合は解放してから置き換えます。
#[cfg(feature = "ml")]
#[tauri::command]
pub fn initialize_classifier(
    model_path: String,
    label_path: String,
    state: tauri::State<AppState>,
) -> Result<ClassifierInfo, String> {
    println!(
        "[initialize_classifier] 開始 - モデル: {}, ラベル: {}",
        model_path, label_path
    );

    let classifier = Classifier::initialize(
        &PathBuf::from(&model_path),
        &PathBuf::from(&label_path),
    )
    .map_err(|e| format!("分類器の初期化エラー: {}", e))?;

    let info = build_info(&classifier)?;

    let mut guard = state.classifier.lock().unwrap();
    if let Some(old) = guard.as_mut() {
        old.release();
    }
    *guard = Some(classifier);

    println!(
        "[initialize_classifier] 初期化完了 - クラス数: {}",
        info.num_classes
    );
    Ok(info)
}

/// 画像ファイルを分類する（非同期）
///
/// デコードとモデル入力サイズへのリサイズをこのコマンド内で行い、
/// 分類本体はワーカースレッドで実行します。同一分類器への並行
/// 呼び出しはMutexで直列化されます。
#[cfg(feature = "ml")]
#[tauri::command]
pub async fn classify_image_file(
    image_path: String,
    state: tauri::State<'_, AppState>,
) -> Result<ClassificationResponse, String> {
    let classifier = state.classifier.clone();

    tokio::task::spawn_blocking(move || {
        let guard = classifier.lock().unwrap();
        let classifier = guard
            .as_ref()
            .ok_or_else(|| "分類器が初期化されていません".to_string())?;

        let input_size = classifier.input_size().map_err(|e| e.to_string())?;

        let img = image::open(&image_path)
            .map_err(|e| format!("画像の読み込みエラー: {} (パス: {})", e, image_path))?;

        // モデル入力サイズへリサイズ（ニアレストネイバー縮小）
        let resized = img
            .resize_exact(input_size, input_size, image::imageops::FilterType::Nearest)
            .to_rgb8();

        let start = std::time::Instant::now();
        let result = classifier
            .classify(&resized)
            .map_err(|e| format!("分類エラー: {}", e))?;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        println!(
            "[classify_image_file] 推論時間: {}ms - 結果: {} ({:.4})",
            elapsed_ms, result.label, result.score
        );

        Ok(ClassificationResponse {
            label: result.label,
            class_index: result.class_index,
            score: result.score,
            elapsed_ms,
        })
    })
    .await
    .map_err(|e| format!("分類スレッドエラー: {}", e))?
}

/// 分類器を解放する
///
/// 解放後に分類コマンドを呼ぶとエラーになります。
#[cfg(feature = "ml")]
#[tauri::command]
pub fn release_classifier(state: tauri::State<AppState>) -> Result<(), String> {
    let mut guard = state.classifier.lock().unwrap();
    if let Some(classifier) = guard.as_mut() {
        classifier.release();
    }
    *guard = None;

    println!("[release_classifier] 分類器を解放しました");
    Ok(())
}

/// 分類器が利用可能かどうか
#[cfg(feature = "ml")]
#[tauri::command]
pub fn is_classifier_ready(state: tauri::State<AppState>) -> bool {
    let guard = state.classifier.lock().unwrap();
    guard.as_ref().map(|c| !c.is_released()).unwrap_or(false)
}

/// 読み込み済み分類器の情報を取得
#[cfg(feature = "ml")]
#[tauri::command]
pub fn get_classifier_info(state: tauri::State<AppState>) -> Result<ClassifierInfo, String> {
    let guard = state.classifier.lock().unwrap();
    let classifier = guard
        .as_ref()
        .ok_or_else(|| "分類器が初期化されていません".to_string())?;
    build_info(classifier)
}

/// 画像のプレビューをBase64エンコードされたPNGとして返す
#[tauri::command]
pub fn load_image_preview(image_path: String) -> Result<String, String> {
    use image::ImageEncoder;

    let img = image::open(&image_path)
        .map_err(|e| format!("画像の読み込みエラー: {} (パス: {})", e, image_path))?;

    // 表示用に縮小（アスペクト比は維持）
    let preview = img.thumbnail(512, 512).to_rgb8();

    // PNG形式でメモリ上にエンコード
    let mut png_data = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut png_data);
    encoder
        .write_image(
            preview.as_raw(),
            preview.width(),
            preview.height(),
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| format!("PNGエンコードエラー: {}", e))?;

    use base64::{engine::general_purpose, Engine as _};
    Ok(general_purpose::STANDARD.encode(&png_data))
}

/// 分類済み画像をラベル付きファイル名でJPEG保存する
#[tauri::command]
pub fn save_classified_copy(
    image_path: String,
    label: String,
    output_dir: String,
) -> Result<String, String> {
    let img = image::open(&image_path)
        .map_err(|e| format!("画像の読み込みエラー: {} (パス: {})", e, image_path))?;

    let output_dir = PathBuf::from(&output_dir);
    std::fs::create_dir_all(&output_dir)
        .map_err(|e| format!("出力ディレクトリ作成エラー: {}", e))?;

    let stem = PathBuf::from(&image_path)
        .file_stem()
        .and_then(|s| s.to_str().map(|s| s.to_string()))
        .unwrap_or_else(|| "image".to_string());
    let output_path = output_dir.join(format!("{}_{}.jpg", stem, label));

    let file = std::fs::File::create(&output_path)
        .map_err(|e| format!("ファイル作成エラー: {}", e))?;
    let writer = std::io::BufWriter::new(file);
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(writer, 95);
    img.to_rgb8()
        .write_with_encoder(encoder)
        .map_err(|e| format!("JPEG書き込みエラー: {}", e))?;

    println!("[save_classified_copy] 保存完了: {:?}", output_path);
    Ok(output_path.to_string_lossy().to_string())
}

/// アプリケーション設定を読み込む
#[tauri::command]
pub fn load_app_config() -> AppConfig {
    AppConfig::load_or_default()
}

/// アプリケーション設定を保存する
#[tauri::command]
pub fn save_app_config(config: AppConfig) -> Result<(), String> {
    config
        .save_default()
        .map_err(|e| format!("設定の保存に失敗: {}", e))
}

// featureが無効な場合のダミー実装
#[cfg(not(feature = "ml"))]
#[tauri::command]
pub fn initialize_classifier(
    _model_path: String,
    _label_path: String,
) -> Result<ClassifierInfo, String> {
    Err("機械学習機能が有効化されていません".to_string())
}

#[cfg(not(feature = "ml"))]
#[tauri::command]
pub async fn classify_image_file(_image_path: String) -> Result<ClassificationResponse, String> {
    Err("機械学習機能が有効化されていません".to_string())
}

#[cfg(not(feature = "ml"))]
#[tauri::command]
pub fn release_classifier() -> Result<(), String> {
    Err("機械学習機能が有効化されていません".to_string())
}

#[cfg(not(feature = "ml"))]
#[tauri::command]
pub fn is_classifier_ready() -> bool {
    false
}

#[cfg(not(feature = "ml"))]
#[tauri::command]
pub fn get_classifier_info() -> Result<ClassifierInfo, String> {
    Err("機械学習機能が有効化されていません".to_string())
}
