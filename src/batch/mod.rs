//! # 批处理编排模块（batch）
//!
//! ## 设计思路
//!
//! 一次运行分两个阶段：
//! 1. 暂存：扫描输入目录，逐个文件执行 解码 → 裁边 → 几何变换 → 无损编码，
//!    写入 `1_temp_images/<相对目录>/<原文件名>.webp`
//! 2. 输出：按遍历顺序为每个暂存文件计算命名结果，整体检查冲突后，
//!    复制到 `2_output_images/<相对目录>/<新文件名>`
//!
//! 两个阶段之间通过 `RecordId` 关联，暂存产物不依赖文件名匹配回源文件。
//!
//! ## 实现思路
//!
//! - 单线程顺序执行，遍历顺序确定，结果可重复。
//! - 单个文件失败只记录到报告并继续；参数、目录、命名冲突等运行级错误才中断。
//! - 扫描成功后立即清空暂存与输出目录，输出目录里不会留下上一次运行的文件。
//! - 冲突策略 `CollisionPolicy::Fail`（默认）在写任何输出之前中断整次运行；
//!   `Overwrite` 保留最后一个写入者并记录警告。
//! - 回退序号 `SequenceCounter` 由本模块持有，只对成功暂存的文件计算命名。

mod report;

pub use report::{FailedEntry, RunReport, SkippedEntry, WrittenEntry};

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::image_handler::{FileRecord, ImageHandler, RecordId, StagedFile, copy_atomically};
use crate::naming::{NamingDecision, NamingScheme, SequenceCounter};
use crate::storage::{WorkspaceLayout, clear_dir};

/// 多个输入映射到同一路径时的处理策略。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// 中断运行，不写输出目录。
    #[default]
    Fail,
    /// 后写入者覆盖先写入者。
    Overwrite,
}

impl CollisionPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fail => "fail",
            Self::Overwrite => "overwrite",
        }
    }
}

/// 一个待执行的写入：某条记录写到某个目标路径。
#[derive(Debug, Clone)]
struct PlannedWrite {
    record: RecordId,
    target: PathBuf,
}

/// 两阶段批处理执行器。
pub struct BatchRunner {
    layout: WorkspaceLayout,
    handler: ImageHandler,
    scheme: NamingScheme,
    policy: CollisionPolicy,
}

impl BatchRunner {
    pub fn new(
        layout: WorkspaceLayout,
        handler: ImageHandler,
        scheme: NamingScheme,
        policy: CollisionPolicy,
    ) -> Self {
        Self {
            layout,
            handler,
            scheme,
            policy,
        }
    }

    /// 执行完整的两阶段处理。
    pub fn run(&self) -> Result<RunReport, AppError> {
        let start = Instant::now();
        let mut report = RunReport::new(self.handler.pipeline().kind);

        log::info!(
            "🚀 开始处理：档位 {}，冲突策略 {}",
            report.pipeline.as_str(),
            self.policy.as_str()
        );

        let records = self.layout.scan_input()?;
        report.scanned = records.len();

        clear_dir(&self.layout.staging_dir)?;
        clear_dir(&self.layout.output_dir)?;

        let staged = self.stage(&records, &mut report)?;
        report.staged = staged.len();

        self.publish(&records, &staged, &mut report)?;

        log::info!(
            "✅ 处理结束（{}ms）：{}",
            start.elapsed().as_millis(),
            report.summary()
        );
        Ok(report)
    }

    /// 阶段一：处理全部输入并写入暂存目录。
    fn stage(
        &self,
        records: &[FileRecord],
        report: &mut RunReport,
    ) -> Result<Vec<StagedFile>, AppError> {
        let planned: Vec<PlannedWrite> = records
            .iter()
            .map(|record| PlannedWrite {
                record: record.id,
                target: self
                    .layout
                    .staging_dir
                    .join(record.relative_dir())
                    .join(record.staged_file_name()),
            })
            .collect();
        let planned = self.resolve_collisions(records, planned, report)?;

        log::info!("📦 阶段一：暂存 {} 个文件", planned.len());

        let mut staged = Vec::with_capacity(planned.len());
        for write in &planned {
            let record = record_by_id(records, write.record)?;
            match self.handler.process_file(record, &write.target) {
                Ok(file) => staged.push(file),
                Err(e) => report.fail(&record.relative_path, e),
            }
        }
        Ok(staged)
    }

    /// 阶段二：计算命名、检查冲突，再复制到输出目录。
    fn publish(
        &self,
        records: &[FileRecord],
        staged: &[StagedFile],
        report: &mut RunReport,
    ) -> Result<(), AppError> {
        let mut counter = SequenceCounter::new();
        let mut sources: HashMap<RecordId, &StagedFile> = HashMap::new();
        let mut planned = Vec::with_capacity(staged.len());

        for file in staged {
            let record = record_by_id(records, file.record)?;
            let decision = self.scheme.decide(&record.file_name, &mut counter);
            match &decision {
                NamingDecision::Unclassifiable { reason } => {
                    report.skip(&record.relative_path, reason.as_str());
                }
                NamingDecision::PreserveOriginal { file_name }
                | NamingDecision::Renamed { file_name } => {
                    log::debug!("🏷️ {} -> {}", record.file_name, file_name);
                    sources.insert(record.id, file);
                    planned.push(PlannedWrite {
                        record: record.id,
                        target: self
                            .layout
                            .output_dir
                            .join(record.relative_dir())
                            .join(file_name),
                    });
                }
            }
        }
        let planned = self.resolve_collisions(records, planned, report)?;

        log::info!("📤 阶段二：输出 {} 个文件", planned.len());

        for write in planned {
            let record = record_by_id(records, write.record)?;
            let Some(file) = sources.get(&write.record) else {
                continue;
            };
            match copy_atomically(&file.staged_path, &write.target) {
                Ok(()) => {
                    let output = write
                        .target
                        .strip_prefix(&self.layout.output_dir)
                        .unwrap_or(&write.target)
                        .to_path_buf();
                    log::info!("⭕️ {} -> {}", record.relative_path.display(), output.display());
                    report.written.push(WrittenEntry {
                        source: record.relative_path.clone(),
                        output,
                        width: file.width,
                        height: file.height,
                    });
                }
                Err(e) => report.fail(&record.relative_path, e),
            }
        }
        Ok(())
    }

    /// 检查目标路径是否唯一。
    ///
    /// `Fail` 时遇到第一个冲突即返回错误；`Overwrite` 时每个目标只保留最后一条记录，
    /// 被覆盖的记录计入跳过列表。
    fn resolve_collisions(
        &self,
        records: &[FileRecord],
        planned: Vec<PlannedWrite>,
        report: &mut RunReport,
    ) -> Result<Vec<PlannedWrite>, AppError> {
        let mut owner: HashMap<PathBuf, usize> = HashMap::new();
        let mut kept: Vec<Option<PlannedWrite>> = Vec::with_capacity(planned.len());

        for write in planned {
            if let Some(&previous_index) = owner.get(&write.target) {
                let previous = kept[previous_index]
                    .take()
                    .ok_or_else(|| AppError::Storage("冲突检查状态不一致".to_string()))?;
                let first = record_by_id(records, previous.record)?;
                let second = record_by_id(records, write.record)?;

                match self.policy {
                    CollisionPolicy::Fail => {
                        return Err(AppError::NamingCollision {
                            output: write.target,
                            first: first.relative_path.clone(),
                            second: second.relative_path.clone(),
                        });
                    }
                    CollisionPolicy::Overwrite => {
                        log::warn!(
                            "⚠️ {} 与 {} 都映射到 {}，保留后者",
                            first.relative_path.display(),
                            second.relative_path.display(),
                            write.target.display()
                        );
                        report.skip(
                            &first.relative_path,
                            format!("被 {} 覆盖", second.relative_path.display()),
                        );
                    }
                }
            }
            owner.insert(write.target.clone(), kept.len());
            kept.push(Some(write));
        }

        Ok(kept.into_iter().flatten().collect())
    }
}

fn record_by_id(records: &[FileRecord], id: RecordId) -> Result<&FileRecord, AppError> {
    records
        .get(id.0)
        .filter(|record| record.id == id)
        .ok_or_else(|| AppError::Storage(format!("找不到记录 #{}", id.0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_handler::{ImageConfig, PipelineConfig, PipelineKind};
    use image::{Rgb, RgbImage};
    use std::fs;
    use std::path::Path;

    fn write_png(path: &Path, width: u32, height: u32) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        RgbImage::from_pixel(width, height, Rgb([40, 80, 160]))
            .save(path)
            .unwrap();
    }

    fn runner(
        base: &Path,
        kind: PipelineKind,
        scheme: NamingScheme,
        policy: CollisionPolicy,
    ) -> BatchRunner {
        BatchRunner::new(
            WorkspaceLayout::new(base),
            ImageHandler::new(ImageConfig::default(), PipelineConfig::preset(kind)),
            scheme,
            policy,
        )
    }

    #[test]
    fn counter_is_consumed_only_by_staged_files() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("0_input_images");
        write_png(&input.join("a.png"), 90, 60);
        fs::write(input.join("b.jpg"), b"broken").unwrap();
        write_png(&input.join("c.png"), 90, 60);

        let report = runner(
            dir.path(),
            PipelineKind::Facility,
            NamingScheme::facility("7").unwrap(),
            CollisionPolicy::Fail,
        )
        .run()
        .unwrap();

        let outputs: Vec<_> = report.written.iter().map(|w| w.output.clone()).collect();
        assert_eq!(
            outputs,
            vec![
                PathBuf::from("Facility_007_image_1.webp"),
                PathBuf::from("Facility_007_image_2.webp")
            ]
        );
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.scanned, 3);
        assert_eq!(report.staged, 2);
    }

    #[test]
    fn staging_collision_aborts_after_clearing_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("0_input_images");
        write_png(&input.join("photo.png"), 40, 30);
        RgbImage::from_pixel(40, 30, Rgb([1, 2, 3]))
            .save(input.join("photo.jpg"))
            .unwrap();
        let output = dir.path().join("2_output_images");
        fs::create_dir_all(&output).unwrap();
        fs::write(output.join("keep.webp"), b"previous").unwrap();

        let result = runner(
            dir.path(),
            PipelineKind::Ratio4x3,
            NamingScheme::KeepName,
            CollisionPolicy::Fail,
        )
        .run();

        assert!(matches!(result, Err(AppError::NamingCollision { .. })));
        assert!(output.is_dir());
        assert_eq!(fs::read_dir(&output).unwrap().count(), 0);
    }

    #[test]
    fn output_collision_leaves_no_stale_or_partial_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("0_input_images");
        write_png(&input.join("3_a.png"), 90, 60);
        write_png(&input.join("3_b.png"), 90, 60);
        let output = dir.path().join("2_output_images");
        fs::create_dir_all(output.join("old")).unwrap();
        fs::write(output.join("old/Access_001_01.webp"), b"previous").unwrap();

        let result = runner(
            dir.path(),
            PipelineKind::Access,
            NamingScheme::Access,
            CollisionPolicy::Fail,
        )
        .run();

        assert!(matches!(result, Err(AppError::NamingCollision { .. })));
        assert_eq!(fs::read_dir(&output).unwrap().count(), 0);
    }

    #[test]
    fn written_entries_carry_staged_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        write_png(&dir.path().join("0_input_images/wide.png"), 300, 100);

        let report = runner(
            dir.path(),
            PipelineKind::Access,
            NamingScheme::KeepName,
            CollisionPolicy::Fail,
        )
        .run()
        .unwrap();

        assert_eq!(report.written.len(), 1);
        assert_eq!((report.written[0].width, report.written[0].height), (980, 550));
    }

    #[test]
    fn overwrite_policy_keeps_last_writer() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("0_input_images");
        write_png(&input.join("entrance_a.png"), 90, 60);
        write_png(&input.join("entrance_b.png"), 90, 60);

        let report = runner(
            dir.path(),
            PipelineKind::Entrance,
            NamingScheme::Entrance,
            CollisionPolicy::Overwrite,
        )
        .run()
        .unwrap();

        assert_eq!(report.written.len(), 1);
        assert_eq!(report.written[0].source, PathBuf::from("entrance_b.png"));
        assert_eq!(report.skipped.len(), 1);
        assert!(dir.path().join("2_output_images/Entrance_000_01.webp").exists());
    }

    #[test]
    fn collision_policy_parses_from_json() {
        let policy: CollisionPolicy = serde_json::from_str("\"overwrite\"").unwrap();
        assert_eq!(policy, CollisionPolicy::Overwrite);
        assert_eq!(CollisionPolicy::default(), CollisionPolicy::Fail);
    }
}
