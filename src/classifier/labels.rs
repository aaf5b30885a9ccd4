//! クラスラベル一覧の読み込み
//!
//! 1行1ラベルのテキストファイルを読み込み、行順をそのまま
//! クラスインデックスとして扱います。

use std::fs;
use std::path::Path;

use crate::classifier::error::ClassifierError;

/// クラスインデックス順のラベル一覧
///
/// 起動時に一度だけ読み込み、以降は不変です。
#[derive(Debug, Clone)]
pub struct LabelSet {
    labels: Vec<String>,
}

impl LabelSet {
    /// ラベルファイルを読み込む
    ///
    /// 空のファイル（ラベル0件）は初期化エラーとして扱います。
    pub fn load(path: &Path) -> Result<Self, ClassifierError> {
        let content = fs::read_to_string(path).map_err(|e| ClassifierError::Initialization {
            reason: format!("ラベルファイルの読み込みエラー: {} (パス: {:?})", e, path),
        })?;

        let set = Self::from_lines(&content);
        if set.is_empty() {
            return Err(ClassifierError::Initialization {
                reason: format!("ラベルファイルにラベルがありません: {:?}", path),
            });
        }

        Ok(set)
    }

    /// テキストからラベル一覧を生成
    ///
    /// 各行をトリムし、空行は無視します。
    pub fn from_lines(content: &str) -> Self {
        let labels = content
            .lines()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .map(|line| line.to_string())
            .collect();

        Self { labels }
    }

    /// ラベル列から直接生成
    pub fn from_labels(labels: Vec<String>) -> Self {
        Self { labels }
    }

    /// ラベル数を取得
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// クラスインデックスからラベルを取得
    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(|s| s.as_str())
    }

    /// 全ラベルへの参照
    pub fn as_slice(&self) -> &[String] {
        &self.labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_order_defines_index() {
        let set = LabelSet::from_lines("healthy\nearly_blight\nlate_blight\n");
        assert_eq!(set.len(), 3);
        assert_eq!(set.get(0), Some("healthy"));
        assert_eq!(set.get(1), Some("early_blight"));
        assert_eq!(set.get(2), Some("late_blight"));
    }

    #[test]
    fn test_blank_lines_skipped() {
        let set = LabelSet::from_lines("healthy\n\n  \nrust\n");
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(1), Some("rust"));
    }

    #[test]
    fn test_out_of_range_is_none() {
        let set = LabelSet::from_lines("healthy\n");
        assert_eq!(set.get(1), None);
    }

    #[test]
    fn test_missing_file_is_initialization_error() {
        let result = LabelSet::load(Path::new("does/not/exist/labels.txt"));
        assert!(matches!(
            result,
            Err(ClassifierError::Initialization { .. })
        ));
    }
}
