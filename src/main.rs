// 该文件是 Luoyan （落雁平沙） 项目的一部分。
// src/main.rs - 项目主程序
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

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use url::Url;

use luoyan::{
  FromUrl,
  detector::YoloDetector,
  input::ImageFileInput,
  labels::Labels,
  model::{
    DEFAULT_CONF_THRESHOLD, DEFAULT_INPUT_HEIGHT, DEFAULT_INPUT_WIDTH, DEFAULT_IOU_THRESHOLD,
    DetectorConfig, TensorFileBackend,
  },
  output::{JsonRecordOutput, Render, SaveImageFileOutput},
};

/// Luoyan 项目参数配置
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 输入图像，形如 image:/path/photo.jpg
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,

  /// 标注图像输出，形如 image:/path/out.png?font=/path/font.ttf
  #[arg(long, value_name = "OUTPUT")]
  pub output: Url,

  /// 原始输出张量来源（回放后端），形如 tensor:/path/raw.json
  #[arg(long, value_name = "TENSOR")]
  pub tensor: Url,

  /// 检测结果 JSON 记录，形如 json:/path/result.json
  #[arg(long, value_name = "RECORD")]
  pub record: Option<Url>,

  /// 类别词表文件（一行一类），缺省使用 COCO 80 类
  #[arg(long, value_name = "FILE")]
  pub labels: Option<PathBuf>,

  /// 置信度阈值 (0.0 - 1.0)
  #[arg(long, default_value_t = DEFAULT_CONF_THRESHOLD, value_name = "THRESHOLD")]
  pub confidence: f32,

  /// NMS IOU 阈值 (0.0 - 1.0)
  #[arg(long, default_value_t = DEFAULT_IOU_THRESHOLD, value_name = "THRESHOLD")]
  pub nms_threshold: f32,

  /// 模型输入宽度
  #[arg(long, default_value_t = DEFAULT_INPUT_WIDTH, value_name = "PIXELS")]
  pub input_width: u32,

  /// 模型输入高度
  #[arg(long, default_value_t = DEFAULT_INPUT_HEIGHT, value_name = "PIXELS")]
  pub input_height: u32,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("输入来源: {}", args.input);
  info!("输出路径: {}", args.output);
  info!("张量来源: {}", args.tensor);
  info!("置信度阈值: {}", args.confidence);
  info!("NMS 阈值: {}", args.nms_threshold);

  let labels = match &args.labels {
    Some(path) => Labels::from_path(path)?,
    None => Labels::coco(),
  };

  let config = DetectorConfig {
    input_width: args.input_width,
    input_height: args.input_height,
    conf_threshold: args.confidence,
    iou_threshold: args.nms_threshold,
  };

  let backend = TensorFileBackend::from_url(&args.tensor)?;
  let detector = YoloDetector::new(backend, config, labels);

  let input = ImageFileInput::from_url(&args.input)?;
  let output = SaveImageFileOutput::from_url(&args.output)?;
  let record = args
    .record
    .as_ref()
    .map(JsonRecordOutput::from_url)
    .transpose()?;

  for image in input {
    info!("开始检测，图像尺寸 {}x{}", image.width(), image.height());
    let now = std::time::Instant::now();
    let result = detector.detect(&image)?;
    info!(
      "检测完成，共 {} 个对象，耗时: {:.2?}",
      result.len(),
      now.elapsed()
    );

    for det in result.items.iter() {
      info!(
        "  - {}: {:.1}% at ({:.0}, {:.0}) - ({:.0}, {:.0})",
        det.label,
        det.confidence * 100.0,
        det.bbox.x1,
        det.bbox.y1,
        det.bbox.x2,
        det.bbox.y2
      );
    }

    output.render_result(&image, &result)?;
    if let Some(record) = &record {
      record.render_result(&image, &result)?;
    }
  }

  Ok(())
}
