// 该文件是 Luoyan （落雁平沙） 项目的一部分。
// src/model.rs - 数据模型与推理后端定义
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

use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::{FromUrl, FromUrlWithScheme, frame::RgbNchwTensor};

/// 边界框，角点形式 [x_min, y_min, x_max, y_max]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BBox {
  pub x1: f32,
  pub y1: f32,
  pub x2: f32,
  pub y2: f32,
}

impl BBox {
  pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
    Self { x1, y1, x2, y2 }
  }

  /// 由中心点形式 (cx, cy, w, h) 转换为角点形式
  pub fn from_center(cx: f32, cy: f32, w: f32, h: f32) -> Self {
    Self {
      x1: cx - w / 2.0,
      y1: cy - h / 2.0,
      x2: cx + w / 2.0,
      y2: cy + h / 2.0,
    }
  }

  pub fn width(&self) -> f32 {
    self.x2 - self.x1
  }

  pub fn height(&self) -> f32 {
    self.y2 - self.y1
  }

  pub fn area(&self) -> f32 {
    self.width() * self.height()
  }
}

/// 检测结果条目
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
  /// 类别索引（词表下标）
  pub class_id: usize,
  /// 类别名称
  pub label: String,
  /// 置信度 = objectness × 最高类别分数
  pub confidence: f32,
  /// 边界框
  pub bbox: BBox,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectResult {
  pub items: Box<[Detection]>,
}

impl DetectResult {
  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  pub fn len(&self) -> usize {
    self.items.len()
  }
}

pub const DEFAULT_INPUT_WIDTH: u32 = 640;
pub const DEFAULT_INPUT_HEIGHT: u32 = 640;
pub const DEFAULT_CONF_THRESHOLD: f32 = 0.25;
pub const DEFAULT_IOU_THRESHOLD: f32 = 0.45;

/// 检测配置面：模型输入尺寸与两个阈值，均可外部设置
#[derive(Debug, Clone, Copy)]
pub struct DetectorConfig {
  /// 模型输入宽度
  pub input_width: u32,
  /// 模型输入高度
  pub input_height: u32,
  /// 置信度阈值
  pub conf_threshold: f32,
  /// NMS IOU 阈值
  pub iou_threshold: f32,
}

impl Default for DetectorConfig {
  fn default() -> Self {
    Self {
      input_width: DEFAULT_INPUT_WIDTH,
      input_height: DEFAULT_INPUT_HEIGHT,
      conf_threshold: DEFAULT_CONF_THRESHOLD,
      iou_threshold: DEFAULT_IOU_THRESHOLD,
    }
  }
}

/// 推理后端：接收归一化帧，返回扁平的原始输出张量。
/// 布局为 numBoxes × (5 + numClasses)，由后处理模块解码。
pub trait Backend {
  type Error;

  fn forward(&self, frame: &RgbNchwTensor) -> Result<Box<[f32]>, Self::Error>;
}

#[derive(Error, Debug)]
pub enum TensorFileError {
  #[error("URI 方案不匹配: 期望 'tensor', 实际 '{0}'")]
  SchemeMismatch(String),
  #[error("I/O 错误: {0}")]
  Io(#[from] std::io::Error),
  #[error("JSON 解析错误: {0}")]
  Json(#[from] serde_json::Error),
  #[error("张量文件字节数不是 4 的倍数: {0}")]
  BadLength(usize),
}

/// 回放型推理后端：从文件读取一次真实推理所得的原始输出张量。
/// 支持 JSON 浮点数组（*.json）或小端 f32 裸数据。
pub struct TensorFileBackend {
  path: String,
}

impl FromUrlWithScheme for TensorFileBackend {
  const SCHEME: &'static str = "tensor";
}

impl FromUrl for TensorFileBackend {
  type Error = TensorFileError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(TensorFileError::SchemeMismatch(url.scheme().to_string()));
    }

    Ok(TensorFileBackend {
      path: url.path().to_string(),
    })
  }
}

impl Backend for TensorFileBackend {
  type Error = TensorFileError;

  fn forward(&self, frame: &RgbNchwTensor) -> Result<Box<[f32]>, Self::Error> {
    debug!(
      "回放张量文件: {} (帧 {}x{})",
      self.path,
      frame.width(),
      frame.height()
    );

    let bytes = std::fs::read(&self.path)?;

    let raw = if self.path.ends_with(".json") {
      serde_json::from_slice::<Vec<f32>>(&bytes)?
    } else {
      if bytes.len() % 4 != 0 {
        return Err(TensorFileError::BadLength(bytes.len()));
      }
      bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
    };

    debug!("原始输出张量长度: {}", raw.len());
    Ok(raw.into_boxed_slice())
  }
}

#[cfg(test)]
mod tests {
  use super::BBox;

  #[test]
  fn from_center_keeps_corner_order() {
    let bbox = BBox::from_center(50.0, 40.0, 20.0, 10.0);
    assert_eq!(bbox, BBox::new(40.0, 35.0, 60.0, 45.0));
    assert!(bbox.x1 <= bbox.x2);
    assert!(bbox.y1 <= bbox.y2);
  }

  #[test]
  fn area_matches_width_times_height() {
    let bbox = BBox::new(0.0, 0.0, 4.0, 5.0);
    assert_eq!(bbox.width(), 4.0);
    assert_eq!(bbox.height(), 5.0);
    assert_eq!(bbox.area(), 20.0);
  }
}
