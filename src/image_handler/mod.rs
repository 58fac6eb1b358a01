//! # 图片处理模块（image_handler）
//!
//! ## 设计思路
//!
//! 该模块将“加载校验 → 裁边 → 几何变换 → 无损编码”按职责拆分为多个子模块，
//! 只处理单张图片；目录遍历与重命名由上层 `batch` / `naming` 负责。
//!
//! - `config`：目标规格、裁边策略、档位预设
//! - `source`：输入记录与暂存产物等中间数据模型
//! - `loader`：文件读取、格式识别、像素上限校验、RGB 归一化
//! - `trim`：精确差值 / 亮度阈值两种裁边
//! - `pipeline`：裁切、容差区间、填充三种几何变换与重采样
//! - `encoder`：无损 WebP 编码与原子写入
//! - `handler`：编排单文件处理链路
//!
//! ## 新同事快速上手
//!
//! ```text
//! batch::BatchRunner（阶段一）
//!    ↓
//! handler.rs（统一编排 + 阶段耗时日志）
//!    ├─ loader.rs（读取 + 解码 + 像素限制）
//!    ├─ trim.rs（裁掉留白）
//!    ├─ pipeline.rs（缩放 + 裁切/填充）
//!    └─ encoder.rs（无损 WebP + 原子写入）
//!    ↓
//! 返回 StagedFile / ImageError
//! ```
//!
//! ## 分层职责建议
//!
//! - 新增或调整档位优先改 `config.rs`
//! - 尺寸计算问题优先看 `pipeline.rs`
//! - 留白没裁干净优先看 `trim.rs` 的阈值与策略

mod config;
mod encoder;
mod error;
mod handler;
mod loader;
mod pipeline;
mod source;
mod trim;

pub use config::{
    DEFAULT_LUMINANCE_THRESHOLD, DEFAULT_SQUARE_SIZE, FitMode, HeightBand, ImageConfig,
    PipelineConfig, PipelineKind, TargetSpec, TrimStrategy, WHITE, parse_resize_filter,
};
pub use encoder::{copy_atomically, write_webp_lossless};
pub use error::ImageError;
pub use handler::ImageHandler;
pub use loader::{SUPPORTED_EXTENSIONS, is_supported_image};
pub use pipeline::{fit_and_crop, fit_and_pad, resize_exact};
pub use source::{FileRecord, RecordId, StagedFile, file_extension, file_stem};
pub use trim::{BoundingBox, find_content_bounds, luminance, trim};
