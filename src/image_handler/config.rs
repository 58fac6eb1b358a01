//! # 配置模块
//!
//! ## 设计思路
//!
//! 将所有“可调策略”集中到这里，保证运行时行为可观测、可调整、可测试。
//! 旧脚本各自硬编码的画布尺寸、容差区间、裁边方式，统一收敛为
//! `PipelineKind`（高层语义）→ `PipelineConfig`（底层参数组合）的映射。
//!
//! ## 实现思路
//!
//! - `TargetSpec` 构造后不可变，一次运行只有一份。
//! - `ImageConfig` 的 `Default` 提供生产可用的解码限制与重采样滤镜。
//! - `PipelineKind` 输出稳定字符串，供日志与运行报告使用。
//! - `PipelineConfig::preset` 将档位转换为具体的几何/裁边参数。

use image::imageops::FilterType;
use serde::Serialize;

use super::ImageError;

/// 纯白背景。
pub const WHITE: [u8; 3] = [255, 255, 255];

/// 亮度裁边的默认阈值（0~255，达到即视为背景）。
pub const DEFAULT_LUMINANCE_THRESHOLD: u8 = 235;

/// `square` 档位未指定尺寸时使用的边长。
pub const DEFAULT_SQUARE_SIZE: u32 = 960;

/// 高度容差区间（闭区间）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeightBand {
    pub min: u32,
    pub max: u32,
}

impl HeightBand {
    pub fn contains(&self, height: u32) -> bool {
        (self.min..=self.max).contains(&height)
    }
}

/// 目标画布规格。
///
/// - `width` / `height`：最终画布尺寸
/// - `height_band`：按目标宽度缩放后，高度落在区间内则不裁切
/// - `content_box`：填充模式下内容区域的最大尺寸（默认等于画布）
/// - `background`：填充模式下的背景色
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetSpec {
    pub width: u32,
    pub height: u32,
    pub height_band: Option<HeightBand>,
    pub content_box: Option<(u32, u32)>,
    pub background: [u8; 3],
}

impl TargetSpec {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            height_band: None,
            content_box: None,
            background: WHITE,
        }
    }

    pub fn square(size: u32) -> Self {
        Self::new(size, size)
    }

    pub fn with_height_band(mut self, min: u32, max: u32) -> Self {
        self.height_band = Some(HeightBand { min, max });
        self
    }

    pub fn with_content_box(mut self, width: u32, height: u32) -> Self {
        self.content_box = Some((width, height));
        self
    }

    pub fn with_background(mut self, background: [u8; 3]) -> Self {
        self.background = background;
        self
    }

    /// 目标宽高比。
    pub fn ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// 填充模式下内容区域尺寸，未配置时等于画布尺寸。
    pub fn content_size(&self) -> (u32, u32) {
        self.content_box.unwrap_or((self.width, self.height))
    }
}

/// 几何适配方式。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitMode {
    /// 铺满目标框后居中裁掉多余部分（存在容差区间时先做区间判断）。
    Crop,
    /// 等比缩放进内容框，居中贴到背景画布上。
    Pad,
}

/// 裁边策略。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrimStrategy {
    None,
    /// 与纯色背景逐像素比较，任一通道不同即为内容。
    ExactDifference { background: [u8; 3] },
    /// 亮度不低于阈值视为背景。
    Luminance { threshold: u8 },
}

/// 解码与重采样配置。
#[derive(Debug, Clone)]
pub struct ImageConfig {
    /// 解码后的像素上限（`width * height`）。
    pub max_decoded_pixels: u64,
    /// 解码阶段允许的预计内存上限（按 RGB 估算，字节）。
    pub max_decoded_bytes: u64,
    /// 重采样滤镜。
    pub resize_filter: FilterType,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_decoded_pixels: 40_000_000,
            max_decoded_bytes: 160 * 1024 * 1024,
            resize_filter: FilterType::Lanczos3,
        }
    }
}

/// 从外部字符串解析重采样滤镜。
///
/// # 示例
/// ```rust
/// use listing_image_prep::image_handler::parse_resize_filter;
///
/// let filter = parse_resize_filter("lanczos3")?;
/// assert_eq!(filter, image::imageops::FilterType::Lanczos3);
/// # Ok::<(), listing_image_prep::image_handler::ImageError>(())
/// ```
pub fn parse_resize_filter(name: &str) -> Result<FilterType, ImageError> {
    match name.trim().to_lowercase().as_str() {
        "nearest" => Ok(FilterType::Nearest),
        "triangle" | "bilinear" => Ok(FilterType::Triangle),
        "catmull-rom" | "catmullrom" | "bicubic" => Ok(FilterType::CatmullRom),
        "gaussian" => Ok(FilterType::Gaussian),
        "lanczos3" | "lanczos" => Ok(FilterType::Lanczos3),
        other => Err(ImageError::InvalidFormat(format!(
            "未知重采样滤镜：{}（可选：nearest / triangle / catmull-rom / gaussian / lanczos3）",
            other
        ))),
    }
}

/// 流水线档位（每个档位对应一个旧脚本）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PipelineKind {
    Facility,
    FloorMap,
    Layout,
    Access,
    Product,
    Route,
    Entrance,
    #[serde(rename = "ratio-4x3")]
    Ratio4x3,
    Square,
}

impl PipelineKind {
    /// 将档位输出为稳定字符串，供日志与运行报告使用。
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Facility => "facility",
            Self::FloorMap => "floor-map",
            Self::Layout => "layout",
            Self::Access => "access",
            Self::Product => "product",
            Self::Route => "route",
            Self::Entrance => "entrance",
            Self::Ratio4x3 => "ratio-4x3",
            Self::Square => "square",
        }
    }
}

/// 单次运行的几何与裁边参数组合。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    pub kind: PipelineKind,
    pub target: TargetSpec,
    pub fit: FitMode,
    pub trim: TrimStrategy,
}

impl PipelineConfig {
    /// 档位预设。
    ///
    /// `Square` 档位使用 [`DEFAULT_SQUARE_SIZE`]，需要自定义边长时用 [`PipelineConfig::square`]。
    pub fn preset(kind: PipelineKind) -> Self {
        let exact_white = TrimStrategy::ExactDifference { background: WHITE };
        let luminance = TrimStrategy::Luminance {
            threshold: DEFAULT_LUMINANCE_THRESHOLD,
        };

        let (target, fit, trim) = match kind {
            PipelineKind::Facility => (
                TargetSpec::new(900, 600).with_height_band(550, 650),
                FitMode::Crop,
                exact_white,
            ),
            PipelineKind::FloorMap => (
                TargetSpec::square(750).with_content_box(700, 700),
                FitMode::Pad,
                exact_white,
            ),
            PipelineKind::Layout => (
                TargetSpec::square(750).with_content_box(650, 650),
                FitMode::Pad,
                exact_white,
            ),
            PipelineKind::Access => (TargetSpec::new(980, 550), FitMode::Pad, exact_white),
            PipelineKind::Product => (
                TargetSpec::new(960, 540).with_height_band(500, 650),
                FitMode::Crop,
                TrimStrategy::None,
            ),
            PipelineKind::Route => (
                TargetSpec::new(960, 720).with_height_band(650, 800),
                FitMode::Crop,
                luminance,
            ),
            PipelineKind::Entrance => (
                TargetSpec::new(900, 600).with_height_band(550, 650),
                FitMode::Crop,
                luminance,
            ),
            PipelineKind::Ratio4x3 => (
                TargetSpec::new(960, 720),
                FitMode::Crop,
                TrimStrategy::None,
            ),
            PipelineKind::Square => (
                TargetSpec::square(DEFAULT_SQUARE_SIZE),
                FitMode::Pad,
                TrimStrategy::None,
            ),
        };

        Self {
            kind,
            target,
            fit,
            trim,
        }
    }

    /// 任意边长的正方形填充档位。
    pub fn square(size: u32) -> Self {
        Self {
            target: TargetSpec::square(size),
            ..Self::preset(PipelineKind::Square)
        }
    }

    /// 覆盖亮度裁边阈值；其他裁边策略不受影响。
    pub fn with_trim_threshold(mut self, threshold: u8) -> Self {
        if let TrimStrategy::Luminance { .. } = self.trim {
            self.trim = TrimStrategy::Luminance { threshold };
        }
        self
    }
}
