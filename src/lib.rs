//! # 场地图片批量规范化工具 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 main.rs (clap 子命令)                     │
//! │   档位 + 标识符 → PipelineConfig + NamingScheme           │
//! └───────┬──────────────────────────────────────────────────┘
//!         ↓ Result<RunReport, AppError>
//! ┌───────┼──────────────────────────────────────────────────┐
//! │  ┌─ batch ─────── BatchRunner (两阶段编排 + 冲突策略)     │
//! │  │    ├─ 阶段一   0_input_images → 1_temp_images          │
//! │  │    └─ 阶段二   1_temp_images  → 2_output_images        │
//! │  │                                                       │
//! │  ├─ image_handler  解码 · 裁边 · 裁切/填充 · 无损 WebP    │
//! │  ├─ naming         前缀豁免 · 令牌提取 · 布局关键字表     │
//! │  ├─ storage        工作目录布局 · 清空 · 自然序扫描       │
//! │  ├─ settings       可选 JSON 运行设置                     │
//! │  └─ error          AppError (统一错误类型)                │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError`，决定进程退出码 |
//! | [`batch`] | 两阶段批处理、冲突检测、运行报告 |
//! | [`image_handler`] | 单张图片的加载、裁边、几何变换与编码 |
//! | [`naming`] | 按档位把原文件名映射为规范输出名 |
//! | [`storage`] | 输入/暂存/输出目录的布局、清理与扫描 |
//! | [`settings`] | 设置文件（重采样滤镜、像素上限、裁边阈值、冲突策略） |

pub mod batch;
pub mod error;
pub mod image_handler;
pub mod naming;
pub mod settings;
pub mod storage;
