//! 画像テンソル前処理
//!
//! リサイズ済みのRGB画像をモデル入力用の正規化f32列に変換します。
//! リサイズ自体は呼び出し側の責務です（このモジュールは行いません）。

use image::RgbImage;

use crate::classifier::error::ClassifierError;

/// チャネル数（RGB固定）
pub const PIXEL_CHANNELS: usize = 3;

/// 正規化定数（学習時と同一の値を使うこと）
pub const IMAGE_MEAN: f32 = 128.0;
pub const IMAGE_STD: f32 = 128.0;

/// 画像を正規化f32列に変換
///
/// ピクセルは行優先で走査し、各ピクセルはR, G, Bの順で
/// インターリーブして格納します。各チャネル値は
/// `(value - mean) / std` で正規化されます。
///
/// 出力長は `target_width * target_height * 3` で、同一入力に対して
/// ビット単位で再現可能です。
///
/// # エラー
/// 入力画像のサイズが `target_width` x `target_height` と一致しない
/// 場合は `InvalidInput` を返します（切り詰めや範囲外参照はしません）。
pub fn preprocess_image(
    img: &RgbImage,
    target_width: u32,
    target_height: u32,
    mean: f32,
    std: f32,
) -> Result<Vec<f32>, ClassifierError> {
    let (width, height) = img.dimensions();

    if width != target_width || height != target_height {
        return Err(ClassifierError::InvalidInput {
            reason: format!(
                "画像サイズが不正です: {}x{} (期待: {}x{})",
                width, height, target_width, target_height
            ),
        });
    }

    let mut data =
        Vec::with_capacity(target_width as usize * target_height as usize * PIXEL_CHANNELS);

    for y in 0..height {
        for x in 0..width {
            let pixel = img.get_pixel(x, y);
            for channel in 0..PIXEL_CHANNELS {
                data.push((pixel[channel] as f32 - mean) / std);
            }
        }
    }

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn solid_image(width: u32, height: u32, value: u8) -> RgbImage {
        RgbImage::from_pixel(width, height, Rgb([value, value, value]))
    }

    #[test]
    fn test_output_length() {
        let img = solid_image(8, 6, 0);
        let data = preprocess_image(&img, 8, 6, 128.0, 128.0).unwrap();
        assert_eq!(data.len(), 8 * 6 * 3);
    }

    #[test]
    fn test_deterministic() {
        let mut img = solid_image(4, 4, 10);
        img.put_pixel(1, 2, Rgb([200, 50, 100]));

        let first = preprocess_image(&img, 4, 4, 128.0, 128.0).unwrap();
        let second = preprocess_image(&img, 4, 4, 128.0, 128.0).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_gray_maps_to_zero() {
        let img = solid_image(4, 4, 128);
        let data = preprocess_image(&img, 4, 4, IMAGE_MEAN, IMAGE_STD).unwrap();
        assert!(data.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_white_normalization() {
        let img = solid_image(4, 4, 255);
        let data = preprocess_image(&img, 4, 4, IMAGE_MEAN, IMAGE_STD).unwrap();
        let expected = (255.0 - IMAGE_MEAN) / IMAGE_STD;
        assert_eq!(expected, 0.9921875);
        assert!(data.iter().all(|&v| v == expected));
    }

    #[test]
    fn test_channel_interleave_order() {
        let mut img = solid_image(2, 1, 0);
        img.put_pixel(0, 0, Rgb([10, 20, 30]));
        img.put_pixel(1, 0, Rgb([40, 50, 60]));

        let data = preprocess_image(&img, 2, 1, 0.0, 1.0).unwrap();
        assert_eq!(data, vec![10.0, 20.0, 30.0, 40.0, 50.0, 60.0]);
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let img = solid_image(4, 4, 0);
        let result = preprocess_image(&img, 8, 8, 128.0, 128.0);
        assert!(matches!(
            result,
            Err(ClassifierError::InvalidInput { .. })
        ));
    }
}
