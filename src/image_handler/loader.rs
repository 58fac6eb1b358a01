//! # 加载与解码模块
//!
//! ## 设计思路
//!
//! 将“文件 → 字节 → 图像 → RGB”的过程集中管理，并在关键节点增加资源上限控制。
//! 优先读取 header 尺寸做像素检查，再进行完整解码，避免超大图片占满内存。
//!
//! ## 实现思路
//!
//! 1. 校验扩展名（jpg / jpeg / png / webp，大小写不敏感）
//! 2. 读取字节并按内容猜测格式（扩展名与内容不符时以内容为准）
//! 3. 按像素与内存上限快速拒绝
//! 4. 完整解码并统一转换为 3 通道 RGB

use std::fs;
use std::io::Cursor;
use std::path::Path;

use image::{GenericImageView, ImageReader, RgbImage};

use super::source::file_extension;
use super::{ImageConfig, ImageError, ImageHandler};

/// 允许的输入扩展名（小写）。
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// 判断文件名是否为支持的输入图片。
pub fn is_supported_image(file_name: &str) -> bool {
    file_extension(file_name)
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

impl ImageHandler {
    /// 读取并解码本地图片，输出 RGB 像素。
    pub(crate) fn load_rgb_from_file(&self, path: &Path) -> Result<RgbImage, ImageError> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ImageError::FileSystem(format!("文件名无效：{}", path.display())))?;

        if !is_supported_image(file_name) {
            return Err(ImageError::InvalidFormat(format!(
                "不支持的扩展名：{}（可选：{}）",
                file_name,
                SUPPORTED_EXTENSIONS.join(" / ")
            )));
        }

        let bytes = fs::read(path)
            .map_err(|e| ImageError::FileSystem(format!("读取文件失败 {}：{}", path.display(), e)))?;

        Self::decode_rgb_from_memory(&bytes, &self.config)
    }

    /// 将内存中的图片字节解码为 RGB。
    pub(crate) fn decode_rgb_from_memory(
        bytes: &[u8],
        config: &ImageConfig,
    ) -> Result<RgbImage, ImageError> {
        if bytes.is_empty() {
            return Err(ImageError::Decode("文件内容为空".to_string()));
        }

        image::guess_format(bytes)
            .map_err(|e| ImageError::InvalidFormat(format!("无法识别图片格式：{}", e)))?;

        let (header_width, header_height) = Self::inspect_dimensions_from_memory(bytes)?;
        Self::validate_pixel_limits(config, header_width, header_height)?;

        let decoded = image::load_from_memory(bytes)
            .map_err(|e| ImageError::Decode(format!("图片解码失败：{}", e)))?;

        let (width, height) = decoded.dimensions();
        Self::validate_pixel_limits(config, width, height)?;

        Ok(decoded.to_rgb8())
    }

    /// 仅通过图片头信息读取宽高，用于完整解码前的像素限制检查。
    fn inspect_dimensions_from_memory(bytes: &[u8]) -> Result<(u32, u32), ImageError> {
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| ImageError::InvalidFormat(format!("无法识别图片格式：{}", e)))?;

        reader
            .into_dimensions()
            .map_err(|e| ImageError::Decode(format!("无法读取图片尺寸：{}", e)))
    }

    /// 校验像素数量与预计内存是否超过配置上限。
    fn validate_pixel_limits(
        config: &ImageConfig,
        width: u32,
        height: u32,
    ) -> Result<(), ImageError> {
        let pixels = (width as u64)
            .checked_mul(height as u64)
            .ok_or_else(|| ImageError::ResourceLimit("图片像素数溢出".to_string()))?;

        if pixels > config.max_decoded_pixels {
            return Err(ImageError::ResourceLimit(format!(
                "图片像素过大：{} 像素（限制：{} 像素）",
                pixels, config.max_decoded_pixels
            )));
        }

        let estimated = pixels
            .checked_mul(3)
            .ok_or_else(|| ImageError::ResourceLimit("图片解码内存估算溢出".to_string()))?;

        if estimated > config.max_decoded_bytes {
            return Err(ImageError::ResourceLimit(format!(
                "图片解码预计内存过大：{:.2} MB（限制：{:.2} MB）",
                estimated as f64 / 1024.0 / 1024.0,
                config.max_decoded_bytes as f64 / 1024.0 / 1024.0
            )));
        }

        Ok(())
    }
}
