mod classifier_commands;

// 画像分類機能のモジュール
pub mod classifier;
pub mod model;

#[cfg(feature = "ml")]
use std::sync::{Arc, Mutex};

#[cfg(feature = "ml")]
use classifier::Classifier;

pub struct AppState {
    /// 分類器ハンドル
    ///
    /// 同一ハンドルへの分類呼び出しを直列化するためMutexで保持する。
    #[cfg(feature = "ml")]
    pub(crate) classifier: Arc<Mutex<Option<Classifier>>>,
}

// Tauri commands
#[tauri::command]
fn get_app_dir() -> Result<String, String> {
    // 実行ファイルのディレクトリを取得
    std::env::current_exe()
        .map_err(|e| format!("実行ファイルパスの取得エラー: {}", e))?
        .parent()
        .ok_or_else(|| "親ディレクトリが見つかりません".to_string())?
        .to_str()
        .ok_or_else(|| "パスの変換エラー".to_string())
        .map(|s| s.to_string())
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    let app_state = AppState {
        #[cfg(feature = "ml")]
        classifier: Arc::new(Mutex::new(None)),
    };

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .plugin(tauri_plugin_dialog::init())
        .plugin(tauri_plugin_fs::init())
        .manage(app_state)
        .invoke_handler(tauri::generate_handler![
            get_app_dir,
            // 画像分類関連のコマンド
            classifier_commands::initialize_classifier,
            classifier_commands::classify_image_file,
            classifier_commands::release_classifier,
            classifier_commands::is_classifier_ready,
            classifier_commands::get_classifier_info,
            classifier_commands::load_image_preview,
            classifier_commands::save_classified_copy,
            classifier_commands::load_app_config,
            classifier_commands::save_app_config,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
