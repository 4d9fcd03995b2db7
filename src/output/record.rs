// 该文件是 Luoyan （落雁平沙） 项目的一部分。
// src/output/record.rs - 检测结果 JSON 记录
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

use std::path::Path;

use image::RgbImage;
use thiserror::Error;
use tracing::info;
use url::Url;

use crate::{FromUrl, FromUrlWithScheme, model::DetectResult, output::Render};

#[derive(Error, Debug)]
pub enum RecordError {
  #[error("URI 方案不匹配: 期望 'json', 实际 '{0}'")]
  SchemeMismatch(String),
  #[error("I/O 错误: {0}")]
  Io(#[from] std::io::Error),
  #[error("JSON 序列化错误: {0}")]
  Json(#[from] serde_json::Error),
}

/// 把最终检测序列写成 JSON 文件，供调用方复核或二次消费
pub struct JsonRecordOutput {
  path: String,
}

impl FromUrlWithScheme for JsonRecordOutput {
  const SCHEME: &'static str = "json";
}

impl FromUrl for JsonRecordOutput {
  type Error = RecordError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(RecordError::SchemeMismatch(url.scheme().to_string()));
    }

    Ok(JsonRecordOutput {
      path: url.path().to_string(),
    })
  }
}

impl Render<RgbImage, DetectResult> for JsonRecordOutput {
  type Error = RecordError;

  fn render_result(&self, _frame: &RgbImage, result: &DetectResult) -> Result<(), Self::Error> {
    if let Some(parent) = Path::new(&self.path).parent()
      && !parent.as_os_str().is_empty()
    {
      std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(&result.items)?;
    std::fs::write(&self.path, json)?;

    info!("记录 {} 条检测结果: {}", result.len(), self.path);
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use image::RgbImage;

  use crate::{
    FromUrl,
    model::{BBox, DetectResult, Detection},
    output::Render,
  };

  use super::JsonRecordOutput;

  #[test]
  fn writes_detections_as_json_array() {
    let path = std::env::temp_dir().join("luoyan-record-test.json");
    let url = url::Url::parse(&format!("json:{}", path.display())).unwrap();
    let output = JsonRecordOutput::from_url(&url).unwrap();

    let result = DetectResult {
      items: Box::new([Detection {
        class_id: 2,
        label: "car".to_string(),
        confidence: 0.75,
        bbox: BBox::new(1.0, 2.0, 3.0, 4.0),
      }]),
    };

    output
      .render_result(&RgbImage::new(1, 1), &result)
      .unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(parsed[0]["label"], "car");
    assert_eq!(parsed[0]["class_id"], 2);
  }

  #[test]
  fn rejects_other_schemes() {
    let url = url::Url::parse("image:/tmp/out.json").unwrap();
    assert!(JsonRecordOutput::from_url(&url).is_err());
  }
}
