// 该文件是 Luoyan （落雁平沙） 项目的一部分。
// src/postprocess/iou.rs - 交并比几何原语
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

/// 并集面积的修正项，防止全零退化框除零。
/// 该值影响阈值边缘的抑制判定，调整时须连同 NMS 阈值一起评估。
pub const IOU_EPSILON: f32 = 1e-6;

/// 计算两个角点形式边界框的交并比
pub fn iou(a: &BBox, b: &BBox) -> f32 {
  let inter_w = (a.x2.min(b.x2) - a.x1.max(b.x1)).max(0.0);
  let inter_h = (a.y2.min(b.y2) - a.y1.max(b.y1)).max(0.0);
  let inter = inter_w * inter_h;

  inter / (a.area() + b.area() - inter + IOU_EPSILON)
}

#[cfg(test)]
mod tests {
  use crate::model::BBox;

  use super::iou;

  #[test]
  fn iou_is_symmetric() {
    let a = BBox::new(0.0, 0.0, 100.0, 100.0);
    let b = BBox::new(10.0, 10.0, 110.0, 110.0);
    assert_eq!(iou(&a, &b), iou(&b, &a));
  }

  #[test]
  fn iou_stays_in_unit_range() {
    let boxes = [
      BBox::new(0.0, 0.0, 1.0, 1.0),
      BBox::new(0.5, 0.5, 2.0, 2.0),
      BBox::new(-3.0, -3.0, 3.0, 3.0),
      BBox::new(100.0, 100.0, 101.0, 101.0),
    ];
    for a in &boxes {
      for b in &boxes {
        let value = iou(a, b);
        assert!((0.0..=1.0).contains(&value), "iou({a:?}, {b:?}) = {value}");
      }
    }
  }

  #[test]
  fn self_iou_is_about_one() {
    let a = BBox::new(12.0, 7.0, 40.0, 55.0);
    assert!((iou(&a, &a) - 1.0).abs() < 1e-3);
  }

  #[test]
  fn disjoint_boxes_have_zero_iou() {
    let a = BBox::new(0.0, 0.0, 10.0, 10.0);
    let b = BBox::new(50.0, 50.0, 60.0, 60.0);
    assert_eq!(iou(&a, &b), 0.0);
  }

  #[test]
  fn overlapping_boxes_match_known_value() {
    // 交集 90×90，并集 11900
    let a = BBox::new(0.0, 0.0, 100.0, 100.0);
    let b = BBox::new(10.0, 10.0, 110.0, 110.0);
    assert!((iou(&a, &b) - 8100.0 / 11900.0).abs() < 1e-4);
  }

  #[test]
  fn degenerate_boxes_do_not_divide_by_zero() {
    let zero = BBox::new(0.0, 0.0, 0.0, 0.0);
    let value = iou(&zero, &zero);
    assert!(value.is_finite());
    assert_eq!(value, 0.0);
  }
}
