//! # 场地图片批量规范化工具 — 命令行入口
//!
//! 本文件只负责参数解析、日志初始化与退出码映射。
//! 业务逻辑分布在各子模块中，详见 `lib.rs` 架构文档。

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use listing_image_prep::batch::{BatchRunner, CollisionPolicy};
use listing_image_prep::error::AppError;
use listing_image_prep::image_handler::{ImageHandler, PipelineConfig, PipelineKind};
use listing_image_prep::naming::NamingScheme;
use listing_image_prep::settings::RunSettings;
use listing_image_prep::storage::WorkspaceLayout;

#[derive(Debug, Parser)]
#[command(
    name = "listing-image-prep",
    version,
    about = "场地图片裁边、定尺寸、重命名并输出无损 WebP"
)]
struct Cli {
    /// 包含 0_input_images / 1_temp_images / 2_output_images 的基础目录
    #[arg(long, global = true, default_value = ".")]
    base_dir: PathBuf,

    /// JSON 设置文件
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// 输出路径冲突时的策略（覆盖设置文件）
    #[arg(long, global = true, value_enum)]
    collision: Option<CollisionPolicy>,

    /// 运行报告输出路径（JSON）
    #[arg(long, global = true)]
    report: Option<PathBuf>,

    #[command(subcommand)]
    pipeline: Pipeline,
}

#[derive(Debug, Subcommand)]
enum Pipeline {
    /// 施设照片：900x600，Facility_{id}_image_{n}
    Facility { facility_id: String },
    /// 楼层图：750x750 留白，FloorMap_{id}_a{floor}_1
    FloorMap { facility_id: String },
    /// 会场布局图：750x750 留白，按关键字归类
    Layout { venue_number: String },
    /// 交通图：980x550 留白
    Access,
    /// 商品图：960x540
    Product,
    /// 路线图：960x720，Route_{id}_{route}_{n}
    Route {
        facility_id: String,
        route_number: String,
    },
    /// 入口照片：900x600
    Entrance,
    /// 4:3 裁切（960x720），保留原名
    #[command(name = "ratio-4x3")]
    Ratio4x3,
    /// 正方形留白，保留原名
    Square { size: u32 },
}

impl Pipeline {
    /// 解析为几何参数与命名方案，标识符不合法时返回 `AppError::Usage`。
    fn resolve(&self) -> Result<(PipelineConfig, NamingScheme), AppError> {
        let preset = PipelineConfig::preset;
        Ok(match self {
            Self::Facility { facility_id } => (
                preset(PipelineKind::Facility),
                NamingScheme::facility(facility_id)?,
            ),
            Self::FloorMap { facility_id } => (
                preset(PipelineKind::FloorMap),
                NamingScheme::floor_map(facility_id)?,
            ),
            Self::Layout { venue_number } => (
                preset(PipelineKind::Layout),
                NamingScheme::layout(venue_number)?,
            ),
            Self::Access => (preset(PipelineKind::Access), NamingScheme::Access),
            Self::Product => (preset(PipelineKind::Product), NamingScheme::Product),
            Self::Route {
                facility_id,
                route_number,
            } => (
                preset(PipelineKind::Route),
                NamingScheme::route(facility_id, route_number)?,
            ),
            Self::Entrance => (preset(PipelineKind::Entrance), NamingScheme::Entrance),
            Self::Ratio4x3 => (preset(PipelineKind::Ratio4x3), NamingScheme::KeepName),
            Self::Square { size } => {
                if *size == 0 {
                    return Err(AppError::Usage("正方形边长必须大于 0".to_string()));
                }
                (PipelineConfig::square(*size), NamingScheme::KeepName)
            }
        })
    }
}

fn run(cli: Cli) -> Result<(), AppError> {
    let (pipeline, scheme) = cli.pipeline.resolve()?;

    let settings = match &cli.settings {
        Some(path) => RunSettings::load_from_path(path)?,
        None => RunSettings::default(),
    };
    let image_config = settings.image_config()?;
    let pipeline = match settings.trim_threshold {
        Some(threshold) => pipeline.with_trim_threshold(threshold),
        None => pipeline,
    };
    let policy = cli.collision.unwrap_or(settings.collision_policy);

    let runner = BatchRunner::new(
        WorkspaceLayout::new(&cli.base_dir),
        ImageHandler::new(image_config, pipeline),
        scheme,
        policy,
    );
    let report = runner.run()?;

    if let Some(path) = &cli.report {
        report.write_json(path)?;
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("❌ {}", err);
            ExitCode::from(err.exit_code())
        }
    }
}
