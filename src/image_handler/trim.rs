//! # 内容裁边模块
//!
//! 去掉主体四周的纯色（或接近白色）留白。两种判定方式：
//! - 精确差值：与背景色任一通道不同即为内容
//! - 亮度阈值：亮度低于阈值即为内容，适合扫描件、实拍图的近白边框
//!
//! 找不到内容边界（整张都是背景）时原样返回，裁边永远不会失败。

use image::{Rgb, RgbImage, imageops};

use super::TrimStrategy;

/// 内容边界框，`right` / `bottom` 为开区间。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl BoundingBox {
    pub fn width(&self) -> u32 {
        self.right - self.left
    }

    pub fn height(&self) -> u32 {
        self.bottom - self.top
    }
}

/// 按策略裁边，返回新图；无需裁切时返回原图。
pub fn trim(image: RgbImage, strategy: TrimStrategy) -> RgbImage {
    let Some(bounds) = find_content_bounds(&image, strategy) else {
        if strategy != TrimStrategy::None {
            log::debug!("🔍 未检测到主体内容，保持原图 {}x{}", image.width(), image.height());
        }
        return image;
    };

    if (bounds.width(), bounds.height()) == image.dimensions() {
        return image;
    }

    log::debug!(
        "✂️ 裁边：{}x{} -> {}x{}",
        image.width(),
        image.height(),
        bounds.width(),
        bounds.height()
    );
    imageops::crop_imm(&image, bounds.left, bounds.top, bounds.width(), bounds.height()).to_image()
}

/// 计算内容边界；`None` 表示“不裁切”。
pub fn find_content_bounds(image: &RgbImage, strategy: TrimStrategy) -> Option<BoundingBox> {
    match strategy {
        TrimStrategy::None => None,
        TrimStrategy::ExactDifference { background } => {
            bounding_box(image, |pixel| pixel.0 != background)
        }
        TrimStrategy::Luminance { threshold } => {
            bounding_box(image, |pixel| luminance(pixel) < threshold)
        }
    }
}

/// ITU-R 601 亮度：`(299 R + 587 G + 114 B) / 1000`。
pub fn luminance(pixel: &Rgb<u8>) -> u8 {
    let [r, g, b] = pixel.0;
    ((r as u32 * 299 + g as u32 * 587 + b as u32 * 114) / 1000) as u8
}

fn bounding_box<F>(image: &RgbImage, is_content: F) -> Option<BoundingBox>
where
    F: Fn(&Rgb<u8>) -> bool,
{
    let mut found: Option<BoundingBox> = None;

    for (x, y, pixel) in image.enumerate_pixels() {
        if !is_content(pixel) {
            continue;
        }
        found = Some(match found {
            None => BoundingBox {
                left: x,
                top: y,
                right: x + 1,
                bottom: y + 1,
            },
            Some(b) => BoundingBox {
                left: b.left.min(x),
                top: b.top.min(y),
                right: b.right.max(x + 1),
                bottom: b.bottom.max(y + 1),
            },
        });
    }

    found
}
