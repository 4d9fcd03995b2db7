// 该文件是 Luoyan （落雁平沙） 项目的一部分。
// src/postprocess/rescale.rs - 坐标还原
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

use crate::model::BBox;

/// 将模型输入坐标系的边界框线性映射到目标图像坐标系。
///
/// 前提：预处理采用不保持宽高比的拉伸缩放（见 frame.rs），
/// 两轴独立按比例还原即可。若上游改为 letterbox 填充缩放，
/// 此公式不成立，必须换成带填充偏移的逆变换。
/// 只对两个角点做缩放，框的宽高由缩放后的角点差得出，
/// 避免宽高单独缩放引入的舍入漂移。
pub fn rescale(bbox: &BBox, model_w: f32, model_h: f32, target_w: f32, target_h: f32) -> BBox {
  BBox {
    x1: bbox.x1 / model_w * target_w,
    y1: bbox.y1 / model_h * target_h,
    x2: bbox.x2 / model_w * target_w,
    y2: bbox.y2 / model_h * target_h,
  }
}

#[cfg(test)]
mod tests {
  use crate::model::BBox;

  use super::rescale;

  #[test]
  fn scales_each_axis_independently() {
    let bbox = BBox::new(64.0, 320.0, 320.0, 640.0);
    let scaled = rescale(&bbox, 640.0, 640.0, 1280.0, 480.0);
    assert_eq!(scaled, BBox::new(128.0, 240.0, 640.0, 480.0));
  }

  #[test]
  fn round_trip_is_close_to_identity() {
    let bbox = BBox::new(13.5, 27.25, 301.75, 599.0);
    let there = rescale(&bbox, 640.0, 640.0, 1920.0, 1080.0);
    let back = rescale(&there, 1920.0, 1080.0, 640.0, 640.0);
    for (a, b) in [
      (bbox.x1, back.x1),
      (bbox.y1, back.y1),
      (bbox.x2, back.x2),
      (bbox.y2, back.y2),
    ] {
      assert!((a - b).abs() < 1e-3);
    }
  }

  #[test]
  fn out_of_range_boxes_are_mapped_not_clipped() {
    let bbox = BBox::new(-10.0, -10.0, 650.0, 650.0);
    let scaled = rescale(&bbox, 640.0, 640.0, 64.0, 64.0);
    assert_eq!(scaled, BBox::new(-1.0, -1.0, 65.0, 65.0));
  }
}
