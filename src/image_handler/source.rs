//! # 数据源与中间模型
//!
//! ## 设计思路
//!
//! 将“扫描得到的输入文件”和“流水线中间结果”解耦：
//! - `FileRecord` 表示一张输入图片（扫描后只读）
//! - `StagedFile` 表示已写入暂存目录、等待重命名的产物
//!
//! 两个阶段之间通过 `RecordId` 关联，不再按文件名前缀互相匹配。

use std::path::{Path, PathBuf};

use serde::Serialize;

/// 输入文件在遍历顺序中的序号，作为两阶段之间的稳定身份。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RecordId(pub usize);

/// 扫描阶段输出：一张待处理的输入图片。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub id: RecordId,
    /// 源文件的完整路径。
    pub source_path: PathBuf,
    /// 相对输入根目录的路径（含文件名）。
    pub relative_path: PathBuf,
    /// 文件名（含扩展名）。
    pub file_name: String,
}

impl FileRecord {
    /// 相对路径中的目录部分，输入根目录下的文件返回空路径。
    pub fn relative_dir(&self) -> &Path {
        self.relative_path.parent().unwrap_or_else(|| Path::new(""))
    }

    /// 去掉扩展名后的文件名。
    pub fn stem(&self) -> &str {
        file_stem(&self.file_name)
    }

    /// 暂存文件名：保留原始文件名，仅将扩展名改为 `.webp`。
    pub fn staged_file_name(&self) -> String {
        format!("{}.webp", self.stem())
    }
}

/// 暂存阶段输出：已编码为 WebP 的中间产物。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    pub record: RecordId,
    pub staged_path: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// 去掉最后一个扩展名，与 `Path::file_stem` 一致但直接作用于 `&str`。
///
/// 以点开头且没有其他点的名称（如 `.hidden`）视为没有扩展名。
pub fn file_stem(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(0) | None => file_name,
        Some(pos) => &file_name[..pos],
    }
}

/// 文件扩展名（不含点），没有扩展名时返回 `None`。
pub fn file_extension(file_name: &str) -> Option<&str> {
    match file_name.rfind('.') {
        Some(0) | None => None,
        Some(pos) => Some(&file_name[pos + 1..]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(relative: &str) -> FileRecord {
        let relative_path = PathBuf::from(relative);
        let file_name = relative_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        FileRecord {
            id: RecordId(0),
            source_path: PathBuf::from("0_input_images").join(&relative_path),
            relative_path,
            file_name,
        }
    }

    #[test]
    fn staged_name_only_changes_extension() {
        assert_eq!(record("a/b/IMG_0001.JPG").staged_file_name(), "IMG_0001.webp");
        assert_eq!(record("photo.v2.png").staged_file_name(), "photo.v2.webp");
    }

    #[test]
    fn relative_dir_of_root_file_is_empty() {
        assert_eq!(record("photo.jpg").relative_dir(), Path::new(""));
        assert_eq!(record("hall/1F/map.png").relative_dir(), Path::new("hall/1F"));
    }

    #[test]
    fn stem_and_extension_handle_edge_cases() {
        assert_eq!(file_stem("CTRG-2415.webp"), "CTRG-2415");
        assert_eq!(file_stem(".hidden"), ".hidden");
        assert_eq!(file_stem("noext"), "noext");
        assert_eq!(file_extension("a.tar.gz"), Some("gz"));
        assert_eq!(file_extension("noext"), None);
    }
}
