//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 单张图片的错误（`ImageError`）在批处理中只会导致该文件被跳过；
//! 运行级错误统一收敛到 `AppError`，由 `main` 映射为退出码。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为 `ImageError` / `std::io::Error` 提供 `From` 转换，无需手动 map。
//! - 实现 `Serialize` 将错误序列化为字符串，写入运行报告。

use std::path::PathBuf;

use serde::Serialize;

use crate::image_handler::ImageError;

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 参数不合法，在触碰任何目录之前报出
    #[error("参数错误: {0}")]
    Usage(String),

    /// 图片处理流水线错误（解码 / 编码 / 写入）
    #[error("{0}")]
    Image(#[from] ImageError),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),

    /// 工作目录不可用
    #[error("工作目录不可用: {0}")]
    Storage(String),

    /// 设置文件无法读取或解析
    #[error("设置文件无效: {0}")]
    Settings(String),

    /// 两个输入文件映射到同一个输出路径
    #[error("命名冲突: {} 与 {} 都会写入 {}", first.display(), second.display(), output.display())]
    NamingCollision {
        output: PathBuf,
        first: PathBuf,
        second: PathBuf,
    },
}

impl AppError {
    /// 进程退出码：参数错误为 2，其余为 1。
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Usage(_) => 2,
            _ => 1,
        }
    }
}

impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
