//! 运行报告
//!
//! 一次批处理的结构化摘要，可通过 `--report` 写成 JSON 文件。

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::error::AppError;
use crate::image_handler::PipelineKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrittenEntry {
    /// 相对输入目录的源文件路径。
    pub source: PathBuf,
    /// 相对输出目录的输出文件路径。
    pub output: PathBuf,
    /// 输出图片尺寸。
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedEntry {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedEntry {
    pub path: PathBuf,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub pipeline: PipelineKind,
    pub started_at: DateTime<Local>,
    pub scanned: usize,
    pub staged: usize,
    pub written: Vec<WrittenEntry>,
    pub skipped: Vec<SkippedEntry>,
    pub failed: Vec<FailedEntry>,
}

impl RunReport {
    pub fn new(pipeline: PipelineKind) -> Self {
        Self {
            pipeline,
            started_at: Local::now(),
            scanned: 0,
            staged: 0,
            written: Vec::new(),
            skipped: Vec::new(),
            failed: Vec::new(),
        }
    }

    pub(crate) fn skip(&mut self, path: &Path, reason: impl Into<String>) {
        let reason = reason.into();
        log::warn!("⏭️ 跳过 {}：{}", path.display(), reason);
        self.skipped.push(SkippedEntry {
            path: path.to_path_buf(),
            reason,
        });
    }

    pub(crate) fn fail(&mut self, path: &Path, error: impl ToString) {
        let error = error.to_string();
        log::error!("❌ 处理失败 {}：{}", path.display(), error);
        self.failed.push(FailedEntry {
            path: path.to_path_buf(),
            error,
        });
    }

    /// 以格式化 JSON 写入 `path`。
    pub fn write_json(&self, path: &Path) -> Result<(), AppError> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| AppError::Storage(format!("序列化运行报告失败: {}", e)))?;
        fs::write(path, content)?;
        log::info!("📝 运行报告已写入：{}", path.display());
        Ok(())
    }

    pub fn summary(&self) -> String {
        format!(
            "扫描 {} / 暂存 {} / 输出 {} / 跳过 {} / 失败 {}",
            self.scanned,
            self.staged,
            self.written.len(),
            self.skipped.len(),
            self.failed.len()
        )
    }
}
