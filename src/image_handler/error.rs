//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 单张图片在“解码 → 裁边 → 几何变换 → 编码”链路中的所有失败都收敛到 `ImageError`。
//! 批处理编排层据此决定：记录日志、跳过该文件、继续处理下一张。
//! 通过 `thiserror` 保持人类可读错误，同时让调用侧可按分支匹配。

/// 单张图片处理统一错误类型。
///
/// 该类型会在批处理层被上转为 `AppError`，或记录到运行报告的失败列表中。
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("解码错误：{0}")]
    Decode(String),

    #[error("格式错误：{0}")]
    InvalidFormat(String),

    #[error("编码错误：{0}")]
    Encode(String),

    #[error("文件错误：{0}")]
    FileSystem(String),

    #[error("资源限制：{0}")]
    ResourceLimit(String),
}

