// 该文件是 Luoyan （落雁平沙） 项目的一部分。
// src/postprocess/nms.rs - 按类别的非极大值抑制
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

use std::collections::BTreeMap;

use tracing::debug;

use crate::{model::Detection, postprocess::iou::iou};

/// 按类别做贪心非极大值抑制，返回新的检测序列。
///
/// 每个类别组内按置信度降序（稳定排序，同分保持输入顺序），
/// 依次取最高者并剔除与其 IoU ≥ 阈值的剩余框；
/// 各类别组按词表下标升序拼接，保证输出字节级可复现。
/// 每类 O(k²)，置信度过滤后的候选量为数十级，足够用。
pub fn suppress(detections: Vec<Detection>, iou_threshold: f32) -> Vec<Detection> {
  let input_len = detections.len();

  let mut groups: BTreeMap<usize, Vec<Detection>> = BTreeMap::new();
  for det in detections {
    groups.entry(det.class_id).or_default().push(det);
  }

  let mut result = Vec::new();
  for (_, mut group) in groups {
    group.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    while !group.is_empty() {
      let best = group.remove(0);
      group.retain(|det| iou(&best.bbox, &det.bbox) < iou_threshold);
      result.push(best);
    }
  }

  debug!("NMS: {} -> {} 个检测框", input_len, result.len());
  result
}
