//! 运行设置
//!
//! 可选的 JSON 设置文件，所有字段都有默认值，文件里只需写要覆盖的项：
//!
//! ```json
//! { "resize_filter": "catmull-rom", "trim_threshold": 220, "collision_policy": "overwrite" }
//! ```
//!
//! 命令行参数优先级高于设置文件。

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::batch::CollisionPolicy;
use crate::error::AppError;
use crate::image_handler::{ImageConfig, parse_resize_filter};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    /// 重采样滤镜名称，见 `parse_resize_filter`。
    pub resize_filter: String,
    /// 解码像素上限。
    pub max_decoded_pixels: u64,
    /// 覆盖亮度裁边阈值（只影响使用亮度裁边的档位）。
    pub trim_threshold: Option<u8>,
    pub collision_policy: CollisionPolicy,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            resize_filter: "lanczos3".to_string(),
            max_decoded_pixels: ImageConfig::default().max_decoded_pixels,
            trim_threshold: None,
            collision_policy: CollisionPolicy::default(),
        }
    }
}

impl RunSettings {
    pub fn load_from_path(path: &Path) -> Result<Self, AppError> {
        let content = fs::read_to_string(path)
            .map_err(|e| AppError::Settings(format!("读取 {} 失败: {}", path.display(), e)))?;
        let settings: Self = serde_json::from_str(&content)
            .map_err(|e| AppError::Settings(format!("解析 {} 失败: {}", path.display(), e)))?;

        log::info!("⚙️ 已加载设置文件：{}", path.display());
        Ok(settings)
    }

    /// 转换为解码配置，同时校验字段取值。
    pub fn image_config(&self) -> Result<ImageConfig, AppError> {
        let resize_filter = parse_resize_filter(&self.resize_filter)
            .map_err(|e| AppError::Settings(e.to_string()))?;

        if self.max_decoded_pixels == 0 {
            return Err(AppError::Settings("max_decoded_pixels 必须大于 0".to_string()));
        }

        let defaults = ImageConfig::default();
        Ok(ImageConfig {
            max_decoded_pixels: self.max_decoded_pixels,
            max_decoded_bytes: defaults
                .max_decoded_bytes
                .max(self.max_decoded_pixels.saturating_mul(4)),
            resize_filter,
        })
    }
}
