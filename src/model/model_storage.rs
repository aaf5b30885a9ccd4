//! モデルとメタデータの永続化
//!
//! Tar.gz形式でモデルとメタデータを1ファイルに統合して保存・読み込みします。
//! アーカイブの内部構成は推論エンジンのローダーだけが知っており、
//! 分類器コアからは不透明なバイナリとして扱われます。
//!
//! ファイル構成（tar.gz内部）:
//! - metadata.json   - メタデータ（クラス数、入力サイズ、正規化定数）
//! - model.bin       - モデルの重み（バイナリ）

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use tar::{Archive, Builder};

use crate::model::model_metadata::ModelMetadata;

const METADATA_ENTRY: &str = "metadata.json";
const MODEL_ENTRY: &str = "model.bin";

/// メタデータと共にモデルをTar.gz形式で保存
pub fn save_model_with_metadata(
    output_path: &Path,
    metadata: &ModelMetadata,
    model_binary: &[u8],
) -> Result<()> {
    // output_pathがすでに.tar.gzで終わっている場合はそのまま、そうでなければ拡張子を追加
    let tar_gz_path = if output_path.extension().and_then(|s| s.to_str()) == Some("gz") {
        output_path.to_path_buf()
    } else {
        output_path.with_extension("tar.gz")
    };

    if let Some(parent) = tar_gz_path.parent() {
        std::fs::create_dir_all(parent)
            .context(format!("Failed to create parent directory: {:?}", parent))?;
    }

    let tar_gz_file = File::create(&tar_gz_path)
        .context(format!("Failed to create tar.gz file: {:?}", tar_gz_path))?;

    let encoder = GzEncoder::new(tar_gz_file, Compression::default());
    let mut tar_builder = Builder::new(encoder);

    let json_str = metadata.to_json_string()?;
    append_entry(&mut tar_builder, METADATA_ENTRY, json_str.as_bytes())?;
    append_entry(&mut tar_builder, MODEL_ENTRY, model_binary)?;

    tar_builder
        .finish()
        .context("Failed to finalize tar.gz archive")?;

    Ok(())
}

fn append_entry<W: std::io::Write>(
    builder: &mut Builder<W>,
    name: &str,
    bytes: &[u8],
) -> Result<()> {
    let mut header = tar::Header::new_gnu();
    header.set_path(name)?;
    header.set_size(bytes.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    builder
        .append(&header, bytes)
        .context(format!("Failed to add {} to tar", name))?;
    Ok(())
}

/// Tar.gzからモデルメタデータのみを読み込む
pub fn load_metadata(tar_gz_path: &Path) -> Result<ModelMetadata> {
    let mut archive = open_archive(tar_gz_path)?;

    for entry in archive.entries()? {
        let mut entry = entry?;
        let path = entry.path()?;

        if path.to_str() == Some(METADATA_ENTRY) {
            let mut json_str = String::new();
            entry.read_to_string(&mut json_str)?;
            return ModelMetadata::from_json_string(&json_str);
        }
    }

    Err(anyhow::anyhow!(
        "{} not found in tar.gz archive",
        METADATA_ENTRY
    ))
}

/// メタデータとモデルバイナリを共に読み込む
///
/// アーカイブを1回だけ走査して両エントリを取り出します。
pub fn load_model_with_metadata(tar_gz_path: &Path) -> Result<(ModelMetadata, Vec<u8>)> {
    let mut archive = open_archive(tar_gz_path)?;

    let mut metadata_opt: Option<ModelMetadata> = None;
    let mut model_binary_opt: Option<Vec<u8>> = None;

    for entry in archive.entries()? {
        let mut entry = entry?;
        let path = entry.path()?;

        match path.to_str() {
            Some(METADATA_ENTRY) => {
                let mut json_str = String::new();
                entry.read_to_string(&mut json_str)?;
                metadata_opt = Some(ModelMetadata::from_json_string(&json_str)?);
            }
            Some(MODEL_ENTRY) => {
                let mut buffer = Vec::new();
                entry.read_to_end(&mut buffer)?;
                model_binary_opt = Some(buffer);
            }
            _ => {}
        }
    }

    match (metadata_opt, model_binary_opt) {
        (Some(metadata), Some(binary)) => Ok((metadata, binary)),
        (None, _) => Err(anyhow::anyhow!(
            "{} not found in tar.gz archive",
            METADATA_ENTRY
        )),
        (_, None) => Err(anyhow::anyhow!(
            "{} not found in tar.gz archive",
            MODEL_ENTRY
        )),
    }
}

fn open_archive(tar_gz_path: &Path) -> Result<Archive<GzDecoder<File>>> {
    let tar_gz_file = File::open(tar_gz_path)
        .context(format!("Failed to open tar.gz file: {:?}", tar_gz_path))?;
    Ok(Archive::new(GzDecoder::new(tar_gz_file)))
}

/// メタデータをコンソールに表示
pub fn print_metadata_info(metadata: &ModelMetadata) {
    println!("\n=== モデルメタデータ ===");
    println!("クラス数: {}", metadata.num_classes);
    println!(
        "モデル入力サイズ: {}x{}",
        metadata.model_input_size, metadata.model_input_size
    );
    println!(
        "正規化定数: mean={}, std={}",
        metadata.channel_mean, metadata.channel_std
    );
    println!("学習日時: {}", metadata.trained_at);
    println!("========================");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_archive_path(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join("leaf_checker_storage_tests");
        std::fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let path = temp_archive_path("round_trip.tar.gz");
        let metadata = ModelMetadata::new(5, 224, 128.0, 128.0);
        let model_binary = vec![0x01u8, 0x02, 0x03, 0x04, 0x05];

        save_model_with_metadata(&path, &metadata, &model_binary).unwrap();

        let (loaded_metadata, loaded_binary) = load_model_with_metadata(&path).unwrap();
        assert_eq!(loaded_metadata, metadata);
        assert_eq!(loaded_binary, model_binary);

        let metadata_only = load_metadata(&path).unwrap();
        assert_eq!(metadata_only, metadata);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_extension_is_appended() {
        let path = temp_archive_path("no_extension");
        let metadata = ModelMetadata::new(2, 48, 128.0, 128.0);

        save_model_with_metadata(&path, &metadata, &[0u8]).unwrap();

        let expected = path.with_extension("tar.gz");
        assert!(expected.exists());
        std::fs::remove_file(&expected).ok();
    }

    #[test]
    fn test_missing_file_is_error() {
        let path = std::path::Path::new("does/not/exist/model.tar.gz");
        assert!(load_model_with_metadata(path).is_err());
    }
}
