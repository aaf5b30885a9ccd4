//! 分類機能のテスト用バイナリ
//!
//! 使い方: test_classifier <モデルアーカイブ> <ラベルファイル> [画像ファイル]

use std::path::PathBuf;

use leaf_checker_lib::model::{load_metadata, print_metadata_info};

fn main() {
    println!("=== Leaf Checker Backend Test ===\n");

    // コマンドライン引数を取得
    let args: Vec<String> = std::env::args().collect();
    let model_path = if args.len() > 1 {
        PathBuf::from(&args[1])
    } else {
        PathBuf::from("models/leaf_classifier.tar.gz")
    };
    let label_path = if args.len() > 2 {
        PathBuf::from(&args[2])
    } else {
        PathBuf::from("models/labels.txt")
    };
    let image_path = args.get(3).map(PathBuf::from);

    // テスト1: モデルメタデータ読み込み
    println!("Test 1: モデルメタデータ読み込み");
    test_model_metadata(&model_path);

    println!("\n{}\n", "=".repeat(50));

    // テスト2: 分類器の初期化と分類
    println!("Test 2: 分類器の初期化と分類");
    test_classification(&model_path, &label_path, image_path.as_deref());
}

fn test_model_metadata(model_path: &PathBuf) {
    match load_metadata(model_path) {
        Ok(metadata) => {
            println!("✓ モデルメタデータ読み込み成功:");
            print_metadata_info(&metadata);
        }
        Err(e) => {
            eprintln!("✗ エラー: {}", e);
        }
    }
}

#[cfg(feature = "ml")]
fn test_classification(
    model_path: &std::path::Path,
    label_path: &std::path::Path,
    image_path: Option<&std::path::Path>,
) {
    use leaf_checker_lib::classifier::Classifier;

    let mut classifier = match Classifier::initialize(model_path, label_path) {
        Ok(classifier) => {
            println!("✓ 分類器初期化成功");
            classifier
        }
        Err(e) => {
            eprintln!("✗ 初期化エラー: {}", e);
            return;
        }
    };

    let Some(image_path) = image_path else {
        println!("画像ファイルが指定されていないため、分類はスキップします");
        return;
    };

    let input_size = match classifier.input_size() {
        Ok(size) => size,
        Err(e) => {
            eprintln!("✗ エラー: {}", e);
            return;
        }
    };

    let img = match image::open(image_path) {
        Ok(img) => img
            .resize_exact(input_size, input_size, image::imageops::FilterType::Nearest)
            .to_rgb8(),
        Err(e) => {
            eprintln!("✗ 画像読み込みエラー: {}", e);
            return;
        }
    };

    let start = std::time::Instant::now();
    match classifier.classify(&img) {
        Ok(result) => {
            println!("✓ 分類成功 ({}ms):", start.elapsed().as_millis());
            println!("  ラベル: {}", result.label);
            println!("  クラスインデックス: {}", result.class_index);
            println!("  スコア: {:.4}", result.score);
        }
        Err(e) => {
            eprintln!("✗ 分類エラー: {}", e);
        }
    }

    // 解放後の呼び出しはエラーになることを確認
    classifier.release();
    match classifier.classify(&img) {
        Ok(_) => eprintln!("✗ 解放後のclassifyが成功してしまいました"),
        Err(e) => println!("✓ 解放後のclassifyは期待通りエラー: {}", e),
    }
}

#[cfg(not(feature = "ml"))]
fn test_classification(
    _model_path: &std::path::Path,
    _label_path: &std::path::Path,
    _image_path: Option<&std::path::Path>,
) {
    println!("機械学習機能が有効化されていないため、分類テストはスキップします");
}
