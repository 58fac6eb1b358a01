//! # 编码与原子写入模块
//!
//! 输出统一为无损 WebP。所有写入都先落到同目录下的临时文件，
//! 完成后再 `persist`（rename）到目标路径，目标位置不会出现写了一半的文件。

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use image::RgbImage;
use image::codecs::webp::WebPEncoder;
use tempfile::NamedTempFile;

use super::ImageError;

/// 以无损 WebP 编码并原子写入 `path`，父目录不存在时自动创建。
pub fn write_webp_lossless(image: &RgbImage, path: &Path) -> Result<(), ImageError> {
    let mut temp = temp_file_beside(path)?;

    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        let encoder = WebPEncoder::new_lossless(&mut writer);
        image
            .write_with_encoder(encoder)
            .map_err(|e| ImageError::Encode(format!("WebP 编码失败 {}：{}", path.display(), e)))?;
        writer
            .flush()
            .map_err(|e| ImageError::FileSystem(format!("写入临时文件失败：{}", e)))?;
    }

    persist(temp, path)
}

/// 原子复制：先复制到目标目录下的临时文件，再 rename 到 `dest`。
pub fn copy_atomically(src: &Path, dest: &Path) -> Result<(), ImageError> {
    let mut source = File::open(src)
        .map_err(|e| ImageError::FileSystem(format!("打开暂存文件失败 {}：{}", src.display(), e)))?;
    let mut temp = temp_file_beside(dest)?;

    io::copy(&mut source, temp.as_file_mut())
        .map_err(|e| ImageError::FileSystem(format!("复制 {} 失败：{}", src.display(), e)))?;

    persist(temp, dest)
}

fn temp_file_beside(path: &Path) -> Result<NamedTempFile, ImageError> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    fs::create_dir_all(parent)
        .map_err(|e| ImageError::FileSystem(format!("创建目录失败 {}：{}", parent.display(), e)))?;

    tempfile::Builder::new()
        .prefix(".partial-")
        .suffix(".tmp")
        .tempfile_in(parent)
        .map_err(|e| ImageError::FileSystem(format!("创建临时文件失败 {}：{}", parent.display(), e)))
}

fn persist(temp: NamedTempFile, path: &Path) -> Result<(), ImageError> {
    temp.persist(path)
        .map(|_| ())
        .map_err(|e| ImageError::FileSystem(format!("写入 {} 失败：{}", path.display(), e.error)))
}
