//! Top-1ラベル選択
//!
//! スコア列から最大スコアのクラスを1つだけ選びます。
//! Top-kランキングや信頼度しきい値はこのアプリでは扱いません。

use crate::classifier::error::ClassifierError;
use crate::classifier::labels::LabelSet;

/// スコア列から最大スコアのラベルを選択
///
/// 単一の線形走査で最大値のインデックスを求めます。同点の場合は
/// 先頭に近いインデックスが優先されます（厳密な大なり比較で更新）。
///
/// # エラー
/// スコア列が空、またはスコア数とラベル数が一致しない場合は
/// `InvalidInput` を返します。
pub fn select_top_label(
    scores: &[f32],
    labels: &LabelSet,
) -> Result<(String, usize), ClassifierError> {
    if scores.is_empty() {
        return Err(ClassifierError::InvalidInput {
            reason: "スコア列が空です".to_string(),
        });
    }

    if scores.len() != labels.len() {
        return Err(ClassifierError::InvalidInput {
            reason: format!(
                "スコア数とラベル数が一致しません: {} vs {}",
                scores.len(),
                labels.len()
            ),
        });
    }

    let mut max_index = 0;
    let mut max_score = scores[0];

    for (index, &score) in scores.iter().enumerate().skip(1) {
        if score > max_score {
            max_score = score;
            max_index = index;
        }
    }

    let label = labels
        .get(max_index)
        .ok_or_else(|| ClassifierError::InvalidInput {
            reason: format!("クラスインデックス {} は範囲外です", max_index),
        })?
        .to_string();

    Ok((label, max_index))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> LabelSet {
        LabelSet::from_labels(names.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_selects_maximum() {
        let set = labels(&["cat", "dog", "bird"]);
        let (label, index) = select_top_label(&[0.1, 0.9, 0.3], &set).unwrap();
        assert_eq!(label, "dog");
        assert_eq!(index, 1);
    }

    #[test]
    fn test_tie_breaks_to_first_occurrence() {
        let set = labels(&["a", "b"]);
        let (label, index) = select_top_label(&[0.5, 0.5], &set).unwrap();
        assert_eq!(label, "a");
        assert_eq!(index, 0);
    }

    #[test]
    fn test_single_class() {
        let set = labels(&["only"]);
        let (label, index) = select_top_label(&[-2.5], &set).unwrap();
        assert_eq!(label, "only");
        assert_eq!(index, 0);
    }

    #[test]
    fn test_all_negative_scores() {
        let set = labels(&["a", "b", "c"]);
        let (label, index) = select_top_label(&[-3.0, -1.0, -2.0], &set).unwrap();
        assert_eq!(label, "b");
        assert_eq!(index, 1);
    }

    #[test]
    fn test_empty_scores_rejected() {
        let set = labels(&["a"]);
        let result = select_top_label(&[], &set);
        assert!(matches!(
            result,
            Err(ClassifierError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let set = labels(&["a", "b"]);
        let result = select_top_label(&[0.1, 0.2, 0.3], &set);
        assert!(matches!(
            result,
            Err(ClassifierError::InvalidInput { .. })
        ));
    }
}
