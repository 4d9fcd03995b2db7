// 该文件是 Luoyan （落雁平沙） 项目的一部分。
// src/postprocess/mod.rs - 检测解码与抑制流水线
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

pub mod decode;
pub mod iou;
pub mod nms;
pub mod rescale;

pub use decode::decode;
pub use iou::{IOU_EPSILON, iou};
pub use nms::suppress;
pub use rescale::rescale;

use thiserror::Error;
use tracing::debug;

use crate::{
  labels::Labels,
  model::{DetectResult, DetectorConfig},
};

#[derive(Error, Debug)]
pub enum PostprocessError {
  #[error("张量长度错误: 长度 {len} 不是 {stride} 的整数倍")]
  MalformedTensor { len: usize, stride: usize },
  #[error("类别词表为空")]
  EmptyVocabulary,
}

/// 后处理流水线：解码 → 置信度过滤 → 按类别 NMS → 坐标还原。
///
/// 无状态、同步、纯内存数值变换；每次调用独立处理一个张量，
/// 跨请求不共享可变状态。
pub struct Postprocess {
  config: DetectorConfig,
  labels: Labels,
}

impl Postprocess {
  pub fn new(config: DetectorConfig, labels: Labels) -> Self {
    Self { config, labels }
  }

  pub fn labels(&self) -> &Labels {
    &self.labels
  }

  pub fn config(&self) -> &DetectorConfig {
    &self.config
  }

  /// 将一次推理的原始输出张量变换为目标图像坐标系下的最终检测。
  /// 没有候选通过阈值时返回空结果，不视为错误。
  pub fn run(
    &self,
    raw: &[f32],
    target_width: u32,
    target_height: u32,
  ) -> Result<DetectResult, PostprocessError> {
    let decoded = decode(raw, &self.labels, self.config.conf_threshold)?;
    let kept = suppress(decoded, self.config.iou_threshold);

    let items: Box<_> = kept
      .into_iter()
      .map(|mut det| {
        det.bbox = rescale(
          &det.bbox,
          self.config.input_width as f32,
          self.config.input_height as f32,
          target_width as f32,
          target_height as f32,
        );
        det
      })
      .collect();

    debug!("后处理完成，输出 {} 个检测框", items.len());
    Ok(DetectResult { items })
  }
}
