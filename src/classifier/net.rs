//! 葉画像分類用CNNモデルの定義
//!
//! ネットワークの順伝播そのもの（畳み込みカーネルや重み保持）は
//! burn側の実装に委譲します。このモジュールはトポロジーの定義のみを
//! 持ち、重みは外部で学習済みのレコードから復元されます。

use burn::{
    config::Config,
    module::Module,
    nn::{
        conv::{Conv2d, Conv2dConfig},
        pool::{MaxPool2d, MaxPool2dConfig},
        Linear, LinearConfig, Relu,
    },
    tensor::{backend::Backend, Tensor},
};

use crate::classifier::error::ClassifierError;

/// モデル設定
#[derive(Config, Debug)]
pub struct NetConfig {
    /// 分類クラス数
    pub num_classes: usize,
    /// 入力画像サイズ（正方形）
    #[config(default = 224)]
    pub image_size: usize,
    /// 全結合層の隠れ次元
    #[config(default = 256)]
    pub hidden_size: usize,
}

impl NetConfig {
    /// モデルを初期化
    ///
    /// サイズ計算（3x3カーネル・パディングなしで1層ごとに2減少、
    /// 2x2プーリングで半減）:
    /// - Conv1: size -> size - 2, Pool1: /2
    /// - Conv2: -2, Pool2: /2
    /// - Conv3: -2, Pool3: /2
    /// - Conv4: -2, Pool4: /2
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<LeafNet<B>, ClassifierError> {
        let after_conv1 = self.image_size.saturating_sub(2);
        let after_pool1 = after_conv1 / 2;
        let after_conv2 = after_pool1.saturating_sub(2);
        let after_pool2 = after_conv2 / 2;
        let after_conv3 = after_pool2.saturating_sub(2);
        let after_pool3 = after_conv3 / 2;
        let after_conv4 = after_pool3.saturating_sub(2);
        let feature_map_size = after_conv4 / 2;

        if feature_map_size == 0 {
            return Err(ClassifierError::Initialization {
                reason: format!(
                    "入力サイズが小さすぎます: {} (最小46x46が必要)",
                    self.image_size
                ),
            });
        }

        // 特徴次元 d = 128チャネル * feature_map_size * feature_map_size
        let d = 128 * feature_map_size * feature_map_size;

        println!(
            "[LeafNet] 入力サイズ: {}x{}, 特徴マップ: {}x{}, 特徴次元: {}",
            self.image_size, self.image_size, feature_map_size, feature_map_size, d
        );

        Ok(LeafNet {
            conv1: Conv2dConfig::new([3, 32], [3, 3])
                .with_stride([1, 1])
                .init(device),
            pool1: MaxPool2dConfig::new([2, 2]).init(),

            conv2: Conv2dConfig::new([32, 64], [3, 3])
                .with_stride([1, 1])
                .init(device),
            pool2: MaxPool2dConfig::new([2, 2]).init(),

            conv3: Conv2dConfig::new([64, 128], [3, 3])
                .with_stride([1, 1])
                .init(device),
            pool3: MaxPool2dConfig::new([2, 2]).init(),

            conv4: Conv2dConfig::new([128, 128], [3, 3])
                .with_stride([1, 1])
                .init(device),
            pool4: MaxPool2dConfig::new([2, 2]).init(),

            fc1: LinearConfig::new(d, self.hidden_size).init(device),
            fc2: LinearConfig::new(self.hidden_size, self.num_classes).init(device),

            activation: Relu::new(),
        })
    }
}

/// 葉画像分類用CNNモデル
///
/// RGB画像を受け取り、クラスごとのロジットを返します。
///
/// # アーキテクチャ
/// - {Conv 3x3 (no padding) + ReLU + MaxPool 2x2} x 4層
/// - Flatten
/// - FC: d -> hidden + ReLU
/// - FC: hidden -> num_classes
#[derive(Module, Debug)]
pub struct LeafNet<B: Backend> {
    conv1: Conv2d<B>, // 3 -> 32
    pool1: MaxPool2d,
    conv2: Conv2d<B>, // 32 -> 64
    pool2: MaxPool2d,
    conv3: Conv2d<B>, // 64 -> 128
    pool3: MaxPool2d,
    conv4: Conv2d<B>, // 128 -> 128
    pool4: MaxPool2d,

    fc1: Linear<B>, // d -> hidden
    fc2: Linear<B>, // hidden -> num_classes

    activation: Relu,
}

impl<B: Backend> LeafNet<B> {
    /// 順伝播
    ///
    /// # 引数
    /// - `images`: バッチ画像 [batch_size, 3, size, size]
    ///
    /// # 戻り値
    /// - クラスごとのロジット [batch_size, num_classes]
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        let [batch_size, _, _, _] = images.dims();

        let x = self.conv1.forward(images);
        let x = self.activation.forward(x);
        let x = self.pool1.forward(x);

        let x = self.conv2.forward(x);
        let x = self.activation.forward(x);
        let x = self.pool2.forward(x);

        let x = self.conv3.forward(x);
        let x = self.activation.forward(x);
        let x = self.pool3.forward(x);

        let x = self.conv4.forward(x);
        let x = self.activation.forward(x);
        let x = self.pool4.forward(x);

        // Flatten
        let [_, c, h, w] = x.dims();
        let x = x.reshape([batch_size, c * h * w]);

        let x = self.fc1.forward(x);
        let x = self.activation.forward(x);

        self.fc2.forward(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    #[test]
    fn test_too_small_input_rejected() {
        let device = Default::default();
        let config = NetConfig::new(3).with_image_size(45);
        let result = config.init::<NdArray<f32>>(&device);
        assert!(matches!(
            result,
            Err(ClassifierError::Initialization { .. })
        ));
    }

    #[test]
    fn test_minimum_input_size_accepted() {
        let device = Default::default();
        let config = NetConfig::new(3).with_image_size(46);
        assert!(config.init::<NdArray<f32>>(&device).is_ok());
    }

    #[test]
    fn test_forward_output_shape() {
        let device = Default::default();
        let config = NetConfig::new(5).with_image_size(48);
        let model = config.init::<NdArray<f32>>(&device).unwrap();

        let input = Tensor::<NdArray<f32>, 4>::zeros([2, 3, 48, 48], &device);
        let output = model.forward(input);
        assert_eq!(output.dims(), [2, 5]);
    }
}
