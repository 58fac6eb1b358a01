//! 工作目录管理模块
//!
//! # 设计思路
//!
//! 一次运行固定使用基础目录下的三个子目录：
//! `0_input_images`（输入，只读）、`1_temp_images`（暂存）、`2_output_images`（输出）。
//! 暂存与输出目录在各自阶段开始时清空重建。
//!
//! # 实现思路
//!
//! - 清空目录时逐项删除，单项失败只记录日志并继续。
//! - 输入扫描使用 `walkdir` 深度优先遍历，同级目录优先、按自然顺序排序，
//!   保证两次运行看到的文件顺序完全一致。
//! - 所有可能失败的操作均返回 `Result`，不使用 `expect()` / `unwrap()`。

use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::error::AppError;
use crate::image_handler::{FileRecord, RecordId, is_supported_image};

pub const INPUT_DIR_NAME: &str = "0_input_images";
pub const STAGING_DIR_NAME: &str = "1_temp_images";
pub const OUTPUT_DIR_NAME: &str = "2_output_images";

/// 单次运行的目录布局。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceLayout {
    pub input_dir: PathBuf,
    pub staging_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl WorkspaceLayout {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        let base = base_dir.as_ref();
        Self {
            input_dir: base.join(INPUT_DIR_NAME),
            staging_dir: base.join(STAGING_DIR_NAME),
            output_dir: base.join(OUTPUT_DIR_NAME),
        }
    }

    /// 输入目录必须存在且是目录。
    pub fn ensure_input(&self) -> Result<(), AppError> {
        if self.input_dir.is_dir() {
            Ok(())
        } else {
            Err(AppError::Storage(format!(
                "输入目录不存在：{}",
                self.input_dir.display()
            )))
        }
    }

    /// 扫描输入目录，按遍历顺序生成 `FileRecord`。
    pub fn scan_input(&self) -> Result<Vec<FileRecord>, AppError> {
        self.ensure_input()?;
        scan_images(&self.input_dir)
    }
}

/// 清空目录内容并重建目录本身。
///
/// 单个条目删除失败只记录警告，不中断；目录无法创建时返回 `AppError::Storage`。
pub fn clear_dir(dir: &Path) -> Result<(), AppError> {
    if dir.is_dir() {
        let entries = fs::read_dir(dir)
            .map_err(|e| AppError::Storage(format!("读取目录失败 {}：{}", dir.display(), e)))?;

        let mut removed = 0usize;
        for entry in entries {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(e) => {
                    log::warn!("⚠️ 读取目录条目失败 {}：{}", dir.display(), e);
                    continue;
                }
            };

            let result = if path.is_dir() {
                fs::remove_dir_all(&path)
            } else {
                fs::remove_file(&path)
            };
            match result {
                Ok(()) => removed += 1,
                Err(e) => log::warn!("⚠️ 删除失败 {}：{}", path.display(), e),
            }
        }
        log::debug!("🧹 已清空 {}（{} 项）", dir.display(), removed);
    }

    fs::create_dir_all(dir)
        .map_err(|e| AppError::Storage(format!("创建目录失败 {}：{}", dir.display(), e)))
}

/// 同级条目排序：目录在前，同类按文件名自然顺序（`img2` 在 `img10` 之前）。
fn compare_entries(a: &DirEntry, b: &DirEntry) -> Ordering {
    let a_dir = a.file_type().is_dir();
    let b_dir = b.file_type().is_dir();
    b_dir.cmp(&a_dir).then_with(|| {
        natord::compare(
            &a.file_name().to_string_lossy(),
            &b.file_name().to_string_lossy(),
        )
    })
}

/// 递归扫描 `root` 下受支持的图片文件。
pub fn scan_images(root: &Path) -> Result<Vec<FileRecord>, AppError> {
    let mut records = Vec::new();

    for entry in WalkDir::new(root).min_depth(1).sort_by(compare_entries) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("⚠️ 遍历输入目录出错：{}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy().into_owned();
        if !is_supported_image(&file_name) {
            log::debug!("⏭️ 跳过非图片文件：{}", entry.path().display());
            continue;
        }

        let relative_path = entry
            .path()
            .strip_prefix(root)
            .map_err(|e| AppError::Storage(format!("计算相对路径失败：{}", e)))?
            .to_path_buf();

        records.push(FileRecord {
            id: RecordId(records.len()),
            source_path: entry.path().to_path_buf(),
            relative_path,
            file_name,
        });
    }

    log::info!("🔍 扫描到 {} 张图片：{}", records.len(), root.display());
    Ok(records)
}
