//! 学習済みモデルのパッケージ化ツール
//!
//! 外部で学習したモデルの重み（model.bin）とメタデータを
//! アプリが読み込むtar.gzアーカイブにまとめます。
//!
//! 使い方: pack_model <model.bin> <出力パス> <クラス数> [入力サイズ]

use std::path::PathBuf;

use leaf_checker_lib::classifier::{IMAGE_MEAN, IMAGE_STD};
use leaf_checker_lib::model::{print_metadata_info, save_model_with_metadata, ModelMetadata};

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 4 {
        eprintln!("使い方: pack_model <model.bin> <出力パス> <クラス数> [入力サイズ]");
        std::process::exit(1);
    }

    let model_bin_path = PathBuf::from(&args[1]);
    let output_path = PathBuf::from(&args[2]);

    let num_classes: usize = match args[3].parse() {
        Ok(n) => n,
        Err(_) => {
            eprintln!("✗ クラス数が不正です: {}", args[3]);
            std::process::exit(1);
        }
    };

    let model_input_size: u32 = match args.get(4) {
        Some(s) => match s.parse() {
            Ok(n) => n,
            Err(_) => {
                eprintln!("✗ 入力サイズが不正です: {}", s);
                std::process::exit(1);
            }
        },
        None => 224,
    };

    let model_binary = match std::fs::read(&model_bin_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("✗ モデルバイナリの読み込みエラー: {} ({:?})", e, model_bin_path);
            std::process::exit(1);
        }
    };

    let metadata = ModelMetadata::new(num_classes, model_input_size, IMAGE_MEAN, IMAGE_STD);

    match save_model_with_metadata(&output_path, &metadata, &model_binary) {
        Ok(()) => {
            println!("✓ モデルアーカイブを作成しました: {:?}", output_path);
            print_metadata_info(&metadata);
        }
        Err(e) => {
            eprintln!("✗ アーカイブ作成エラー: {}", e);
            std::process::exit(1);
        }
    }
}
