// 该文件是 Luoyan （落雁平沙） 项目的一部分。
// src/frame.rs - 归一化 NCHW 帧定义
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

use image::RgbImage;
use thiserror::Error;

const RGB_CHANNELS: usize = 3;

#[derive(Error, Debug)]
pub enum FrameError {
  #[error("数据长度不匹配: 期望长度 {expected}, 实际长度 {actual}")]
  LengthMismatch { expected: usize, actual: usize },
}

/// 模型输入帧：[1, 3, H, W] 的 f32 张量，RGB 顺序，逐通道归一化到 [0, 1]。
///
/// 由原始图像经拉伸缩放（不保持宽高比）得到，与坐标还原阶段的
/// 拉伸假设配套。
#[derive(Debug, Clone)]
pub struct RgbNchwTensor {
  width: u32,
  height: u32,
  data: Box<[f32]>,
}

impl RgbNchwTensor {
  /// 将图像拉伸缩放到模型输入尺寸并归一化为 NCHW 平面
  pub fn from_image_stretch(image: &RgbImage, width: u32, height: u32) -> Self {
    let resized = image::imageops::resize(
      image,
      width,
      height,
      image::imageops::FilterType::Triangle,
    );

    let plane = (width as usize) * (height as usize);
    let mut data = vec![0f32; RGB_CHANNELS * plane];

    for y in 0..height {
      for x in 0..width {
        let pixel = resized.get_pixel(x, y);
        let idx = (y as usize) * (width as usize) + (x as usize);
        data[idx] = pixel[0] as f32 / 255.0;
        data[plane + idx] = pixel[1] as f32 / 255.0;
        data[2 * plane + idx] = pixel[2] as f32 / 255.0;
      }
    }

    Self {
      width,
      height,
      data: data.into_boxed_slice(),
    }
  }

  /// 由现成的 NCHW 数据构造帧，长度必须等于 3 × W × H
  pub fn from_raw(data: Vec<f32>, width: u32, height: u32) -> Result<Self, FrameError> {
    let expected = RGB_CHANNELS * (width as usize) * (height as usize);
    if data.len() != expected {
      return Err(FrameError::LengthMismatch {
        expected,
        actual: data.len(),
      });
    }

    Ok(Self {
      width,
      height,
      data: data.into_boxed_slice(),
    })
  }

  pub fn width(&self) -> u32 {
    self.width
  }

  pub fn height(&self) -> u32 {
    self.height
  }

  pub fn channels(&self) -> usize {
    RGB_CHANNELS
  }

  pub fn as_slice(&self) -> &[f32] {
    &self.data
  }
}
