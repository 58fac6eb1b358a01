//! # 单文件处理编排模块
//!
//! ## 设计思路
//!
//! `ImageHandler` 只负责单张图片的流程编排，不关心目录遍历与重命名。
//! 处理链路固定为：
//! 1. 读取并解码为 RGB
//! 2. 按策略裁边
//! 3. 几何变换（裁切或填充）
//! 4. 无损 WebP 原子写入暂存路径
//!
//! ## 实现思路
//!
//! - 配置在构造时确定，单次运行内不可变。
//! - 记录 `decode/transform/encode/total` 阶段耗时，便于性能诊断。

use std::path::Path;
use std::time::Instant;

use image::RgbImage;

use super::encoder::write_webp_lossless;
use super::pipeline::{fit_and_crop, fit_and_pad};
use super::source::{FileRecord, StagedFile};
use super::trim::trim;
use super::{FitMode, ImageConfig, ImageError, PipelineConfig};

/// 图片处理器。
///
/// 持有解码配置与流水线参数，对单个文件执行完整处理。
pub struct ImageHandler {
    pub(super) config: ImageConfig,
    pub(super) pipeline: PipelineConfig,
}

impl ImageHandler {
    /// 根据解码配置与流水线档位创建处理器。
    ///
    /// # 示例
    /// ```rust
    /// use listing_image_prep::image_handler::{
    ///     ImageConfig, ImageHandler, PipelineConfig, PipelineKind,
    /// };
    ///
    /// let handler = ImageHandler::new(
    ///     ImageConfig::default(),
    ///     PipelineConfig::preset(PipelineKind::Facility),
    /// );
    /// assert_eq!(handler.pipeline().target.width, 900);
    /// ```
    pub fn new(config: ImageConfig, pipeline: PipelineConfig) -> Self {
        Self { config, pipeline }
    }

    pub fn pipeline(&self) -> &PipelineConfig {
        &self.pipeline
    }

    /// 裁边 + 几何变换，不涉及文件读写。
    pub fn transform(&self, image: RgbImage) -> RgbImage {
        let trimmed = trim(image, self.pipeline.trim);
        let filter = self.config.resize_filter;
        match self.pipeline.fit {
            FitMode::Crop => fit_and_crop(trimmed, &self.pipeline.target, filter),
            FitMode::Pad => fit_and_pad(trimmed, &self.pipeline.target, filter),
        }
    }

    /// 处理单个输入文件并写入 `staged_path`。
    pub fn process_file(
        &self,
        record: &FileRecord,
        staged_path: &Path,
    ) -> Result<StagedFile, ImageError> {
        let total_start = Instant::now();

        let decode_start = Instant::now();
        let image = self.load_rgb_from_file(&record.source_path)?;
        let (source_width, source_height) = image.dimensions();
        let decode_elapsed = decode_start.elapsed();

        let transform_start = Instant::now();
        let processed = self.transform(image);
        let transform_elapsed = transform_start.elapsed();

        let encode_start = Instant::now();
        write_webp_lossless(&processed, staged_path)?;
        let encode_elapsed = encode_start.elapsed();

        let (width, height) = processed.dimensions();
        log::info!(
            "⭕️ 处理完成：{} ({}x{}) -> {} ({}x{})",
            record.relative_path.display(),
            source_width,
            source_height,
            staged_path.display(),
            width,
            height
        );
        log::debug!(
            "⏱️ decode={}ms transform={}ms encode={}ms total={}ms",
            decode_elapsed.as_millis(),
            transform_elapsed.as_millis(),
            encode_elapsed.as_millis(),
            total_start.elapsed().as_millis()
        );

        Ok(StagedFile {
            record: record.id,
            staged_path: staged_path.to_path_buf(),
            width,
            height,
        })
    }
}
