// 该文件是 Luoyan （落雁平沙） 项目的一部分。
// src/detector.rs - YOLO 目标检测器
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

use anyhow::{Context, Result};
use image::RgbImage;
use tracing::debug;

use crate::{
  frame::RgbNchwTensor,
  labels::Labels,
  model::{Backend, DetectResult, DetectorConfig},
  postprocess::Postprocess,
};

/// YOLO 目标检测器：预处理 → 推理后端 → 后处理。
/// 后端失败原样向上传播，不重试也不掩盖。
pub struct YoloDetector<B> {
  backend: B,
  postprocess: Postprocess,
}

impl<B> YoloDetector<B>
where
  B: Backend,
  B::Error: std::error::Error + Send + Sync + 'static,
{
  pub fn new(backend: B, config: DetectorConfig, labels: Labels) -> Self {
    Self {
      backend,
      postprocess: Postprocess::new(config, labels),
    }
  }

  /// 对单张图像做一次完整检测，返回原始图像坐标系下的结果
  pub fn detect(&self, image: &RgbImage) -> Result<DetectResult> {
    let config = *self.postprocess.config();

    debug!(
      "预处理: {}x{} -> {}x{} (拉伸缩放)",
      image.width(),
      image.height(),
      config.input_width,
      config.input_height
    );
    let frame = RgbNchwTensor::from_image_stretch(image, config.input_width, config.input_height);

    let raw = self.backend.forward(&frame).context("推理后端执行失败")?;

    let result = self
      .postprocess
      .run(&raw, image.width(), image.height())
      .context("后处理失败")?;

    Ok(result)
  }
}

#[cfg(test)]
mod tests {
  use image::RgbImage;

  use crate::{
    frame::RgbNchwTensor,
    labels::Labels,
    model::{Backend, DetectorConfig},
  };

  use super::YoloDetector;

  struct FixedBackend {
    raw: Vec<f32>,
  }

  impl Backend for FixedBackend {
    type Error = std::convert::Infallible;

    fn forward(&self, _frame: &RgbNchwTensor) -> Result<Box<[f32]>, Self::Error> {
      Ok(self.raw.clone().into_boxed_slice())
    }
  }

  #[test]
  fn detect_returns_original_image_coordinates() {
    let backend = FixedBackend {
      // 单类词表，stride = 6；中心 (320, 320) 尺寸 320×320
      raw: vec![320.0, 320.0, 320.0, 320.0, 0.9, 0.9],
    };
    let config = DetectorConfig::default();
    let detector = YoloDetector::new(backend, config, Labels::from_names(["person"]).unwrap());

    let image = RgbImage::new(320, 160);
    let result = detector.detect(&image).unwrap();

    assert_eq!(result.len(), 1);
    let bbox = result.items[0].bbox;
    // 640 -> 320 即对半，640 -> 160 即四分之一
    assert_eq!(bbox.x1, 80.0);
    assert_eq!(bbox.y1, 40.0);
    assert_eq!(bbox.x2, 240.0);
    assert_eq!(bbox.y2, 120.0);
  }

  #[test]
  fn malformed_backend_output_fails_loudly() {
    let backend = FixedBackend {
      raw: vec![0.0; 7], // 单类 stride = 6，7 不可整除
    };
    let detector = YoloDetector::new(
      backend,
      DetectorConfig::default(),
      Labels::from_names(["person"]).unwrap(),
    );

    let image = RgbImage::new(32, 32);
    assert!(detector.detect(&image).is_err());
  }
}
