//! 分類器のエラー型定義
//!
//! 発生したエラーはすべて呼び出し元へ返します。このレイヤーでは
//! リトライしません（リトライするかどうかは呼び出し側の判断）。

use thiserror::Error;

/// 分類器コアのエラー型
#[derive(Error, Debug)]
pub enum ClassifierError {
    /// モデルまたはラベルファイルの読み込み・解析に失敗
    ///
    /// 初期化は失敗として扱い、部分的に構築された分類器は返しません。
    #[error("初期化エラー: {reason}")]
    Initialization { reason: String },

    /// 入力の次元・長さが期待値と一致しない
    #[error("不正な入力: {reason}")]
    InvalidInput { reason: String },

    /// 推論実行中のエラー
    #[error("推論エラー: {reason}")]
    Inference { reason: String },

    /// release後のclassify呼び出し
    #[error("分類器は既に解放されています")]
    UseAfterRelease,
}
