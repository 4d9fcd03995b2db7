// 该文件是 Luoyan （落雁平沙） 项目的一部分。
// src/postprocess/decode.rs - 原始输出张量解码
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use tracing::debug;

use crate::{
  labels::Labels,
  model::{BBox, Detection},
  postprocess::PostprocessError,
};

/// 每个候选框的前缀字段数: cx, cy, w, h, objectness
pub const BOX_FIELDS: usize = 5;

/// 解码扁平的原始输出张量，返回模型输入坐标系下的候选检测。
///
/// 张量布局为 numBoxes × (5 + numClasses)，每组为
/// [cx, cy, w, h, objectness, class_0 … class_{n-1}]。
/// 置信度 = objectness × 最高类别分数，低于阈值的候选直接丢弃。
/// 此处不做任何边界裁剪，越界框交由坐标还原阶段按比例映射。
pub fn decode(
  tensor: &[f32],
  labels: &Labels,
  conf_threshold: f32,
) -> Result<Vec<Detection>, PostprocessError> {
  if labels.is_empty() {
    return Err(PostprocessError::EmptyVocabulary);
  }

  let stride = BOX_FIELDS + labels.len();
  if tensor.len() % stride != 0 {
    return Err(PostprocessError::MalformedTensor {
      len: tensor.len(),
      stride,
    });
  }

  let num_boxes = tensor.len() / stride;
  let mut detections = Vec::new();

  for slice in tensor.chunks_exact(stride) {
    let cx = slice[0];
    let cy = slice[1];
    let w = slice[2];
    let h = slice[3];
    let objectness = slice[4];

    // argmax，分数相同取首个下标
    let scores = &slice[BOX_FIELDS..];
    let mut best_idx = 0usize;
    let mut best_score = scores[0];
    for (class_id, &score) in scores.iter().enumerate().skip(1) {
      if score > best_score {
        best_score = score;
        best_idx = class_id;
      }
    }

    let confidence = objectness * best_score;
    if confidence < conf_threshold {
      continue;
    }

    detections.push(Detection {
      class_id: best_idx,
      label: labels.get(best_idx).unwrap_or("unknown").to_string(),
      confidence,
      bbox: BBox::from_center(cx, cy, w, h),
    });
  }

  debug!(
    "解码 {} 个候选框，过滤后剩余 {} 个",
    num_boxes,
    detections.len()
  );

  Ok(detections)
}

#[cfg(test)]
mod tests {
  use crate::{labels::Labels, model::BBox, postprocess::PostprocessError};

  use super::decode;

  fn two_class_labels() -> Labels {
    Labels::from_names(["cat", "dog"]).unwrap()
  }

  /// 一个候选框：中心 (320, 320)，尺寸 100×50
  fn one_box(objectness: f32, scores: [f32; 2]) -> Vec<f32> {
    vec![
      320.0, 320.0, 100.0, 50.0, objectness, scores[0], scores[1],
    ]
  }

  #[test]
  fn malformed_length_is_an_error() {
    let labels = two_class_labels();
    let tensor = vec![0.0; 13]; // stride = 7
    let result = decode(&tensor, &labels, 0.25);
    assert!(matches!(
      result,
      Err(PostprocessError::MalformedTensor { len: 13, stride: 7 })
    ));
  }

  #[test]
  fn empty_tensor_decodes_to_nothing() {
    let labels = two_class_labels();
    let detections = decode(&[], &labels, 0.25).unwrap();
    assert!(detections.is_empty());
  }

  #[test]
  fn zero_threshold_keeps_every_box() {
    let labels = two_class_labels();
    let mut tensor = one_box(0.9, [0.8, 0.1]);
    tensor.extend(one_box(0.01, [0.01, 0.02]));
    let detections = decode(&tensor, &labels, 0.0).unwrap();
    assert_eq!(detections.len(), 2);
  }

  #[test]
  fn raising_threshold_never_adds_detections() {
    let labels = two_class_labels();
    let mut tensor = one_box(0.9, [0.8, 0.1]);
    tensor.extend(one_box(0.5, [0.5, 0.2]));
    tensor.extend(one_box(0.1, [0.3, 0.4]));

    let mut previous = usize::MAX;
    for threshold in [0.0, 0.1, 0.3, 0.5, 0.8, 1.0] {
      let count = decode(&tensor, &labels, threshold).unwrap().len();
      assert!(count <= previous);
      previous = count;
    }
  }

  #[test]
  fn confidence_is_objectness_times_best_class_score() {
    let labels = two_class_labels();
    let tensor = one_box(0.5, [0.2, 0.6]);
    let detections = decode(&tensor, &labels, 0.0).unwrap();
    assert_eq!(detections.len(), 1);
    assert!((detections[0].confidence - 0.3).abs() < 1e-6);
    assert_eq!(detections[0].class_id, 1);
    assert_eq!(detections[0].label, "dog");
  }

  #[test]
  fn argmax_tie_takes_first_index() {
    let labels = two_class_labels();
    let tensor = one_box(0.9, [0.7, 0.7]);
    let detections = decode(&tensor, &labels, 0.0).unwrap();
    assert_eq!(detections[0].class_id, 0);
    assert_eq!(detections[0].label, "cat");
  }

  #[test]
  fn center_form_becomes_corner_form() {
    let labels = two_class_labels();
    let tensor = one_box(1.0, [1.0, 0.0]);
    let detections = decode(&tensor, &labels, 0.0).unwrap();
    assert_eq!(detections[0].bbox, BBox::new(270.0, 295.0, 370.0, 345.0));
  }

  #[test]
  fn below_threshold_boxes_are_dropped() {
    let labels = two_class_labels();
    let tensor = one_box(0.5, [0.4, 0.1]); // 置信度 0.2
    assert!(decode(&tensor, &labels, 0.25).unwrap().is_empty());
  }
}
