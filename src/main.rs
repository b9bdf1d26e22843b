//! # BorderGenie — 命令行入口
//!
//! 本文件仅负责参数解析、设置合并与结果输出。
//! 业务逻辑分布在各子模块中，详见 `lib.rs` 架构文档。

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use argh::FromArgs;
use bordergenie::compositor::{CompositorProfile, CompositorService, ImageSource, TargetFrame};
use bordergenie::error::AppError;
use bordergenie::export::{self, ExportRecord, ExportReport};
use bordergenie::plan::Plan;
use bordergenie::settings::{self, BorderSettings};

/// 为照片添加纯色边框，适配 Instagram 画幅并导出 PNG
#[derive(Debug, FromArgs)]
struct Args {
    /// 输入图片路径（可多个）
    #[argh(positional)]
    inputs: Vec<String>,

    /// 边框宽度（像素，0~200）
    #[argh(option, short = 'w')]
    border_width: Option<u32>,

    /// 边框颜色（任意 CSS 颜色，如 #ffffff、black、rgb(0,0,0)）
    #[argh(option, short = 'c')]
    color: Option<String>,

    /// 目标画幅：1:1 / 4:5 / 16:9 / custom
    #[argh(option, short = 'f', from_str_fn(parse_frame))]
    frame: Option<TargetFrame>,

    /// 输出目录
    #[argh(option, short = 'o', default = "String::from(\".\")")]
    out_dir: String,

    /// 启用专业版选项（自定义画幅、不限数量）
    #[argh(switch)]
    pro: bool,

    /// 设置文件（JSON），命令行参数优先
    #[argh(option)]
    settings: Option<String>,

    /// 将合并后的设置写回设置文件
    #[argh(switch)]
    save_settings: bool,

    /// 性能档位：quality / balanced / speed
    #[argh(option, short = 'p')]
    profile: Option<String>,

    /// 将逐张结果写成 JSON 报告
    #[argh(option)]
    report: Option<String>,
}

fn parse_frame(value: &str) -> Result<TargetFrame, String> {
    TargetFrame::from_str(value).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Args = argh::from_env();

    match run(args).await {
        Ok(0) => ExitCode::SUCCESS,
        Ok(failed) => {
            log::warn!("{} 张图片处理失败", failed);
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("错误: {err}");
            ExitCode::FAILURE
        }
    }
}

/// 执行一次完整导出，返回失败的图片数量。
async fn run(args: Args) -> Result<usize, AppError> {
    let settings_path = args.settings.as_deref().map(PathBuf::from);
    let border_settings = merge_settings(&args, settings_path.as_deref())?;

    if args.save_settings {
        match &settings_path {
            Some(path) => {
                settings::save_settings(path, &border_settings)?;
                log::info!("已保存设置到 {}", path.display());
            }
            None => log::warn!("未指定 --settings，忽略 --save-settings"),
        }
    }

    if args.inputs.is_empty() {
        return Err(AppError::Settings("至少需要一张输入图片".to_string()));
    }

    let plan = Plan::from_flag(args.pro);
    plan.check_upload(args.inputs.len())?;
    plan.ensure_frame(border_settings.aspect_ratio)?;

    let service = CompositorService::new()?;
    if let Some(profile) = &args.profile {
        service
            .compositor()
            .set_profile(CompositorProfile::from_str(profile)?)?;
    }

    let config = service.compositor().config_snapshot()?;
    let render_settings = border_settings.resolve(config.max_border_width)?;

    for duplicate in export::duplicate_output_names(args.inputs.iter().map(String::as_str)) {
        log::warn!("多张输入会生成相同的输出文件 {}，后写入者覆盖先写入者", duplicate);
    }

    let out_dir = export::ensure_output_dir(Path::new(&args.out_dir))?;
    let sources = args
        .inputs
        .iter()
        .map(|path| ImageSource::FilePath(path.clone()))
        .collect();

    let results = service
        .composite_batch("cli", sources, render_settings)
        .await?;

    let mut items = Vec::with_capacity(results.len());
    for item in results {
        let output = match item.outcome {
            Ok(output) => output,
            Err(err) => {
                println!("✘ {} [{}] {}", item.file_name, err.code(), err);
                items.push(ExportRecord::failed(item.file_name, err.code(), err.into()));
                continue;
            }
        };

        match export::write_result(&out_dir, &item.file_name, &output.result.png) {
            Ok(path) => {
                println!(
                    "✔ {} {}x{} [{}] → {} ({}x{})",
                    item.file_name,
                    output.source_width,
                    output.source_height,
                    output.label.display_name(),
                    path.display(),
                    output.result.width(),
                    output.result.height()
                );
                items.push(ExportRecord {
                    source: item.file_name,
                    output: Some(path.to_string_lossy().to_string()),
                    source_width: Some(output.source_width),
                    source_height: Some(output.source_height),
                    label: Some(output.label),
                    error_code: None,
                    error: None,
                });
            }
            Err(err) => {
                println!("✘ {} [E_EXPORT] {}", item.file_name, err);
                items.push(ExportRecord::failed(item.file_name, "E_EXPORT", err));
            }
        }
    }

    let output_dir = match export::output_dir_info(&out_dir) {
        Ok(info) => {
            log::info!(
                "📂 输出目录 {} 共 {} 个 BorderGenie 文件，{}KB",
                info.path,
                info.file_count,
                info.total_size / 1024
            );
            Some(info)
        }
        Err(err) => {
            log::warn!("读取输出目录信息失败: {}", err);
            None
        }
    };

    let report = ExportReport {
        frame: render_settings.frame,
        border_width: render_settings.border.width_px(),
        border_color: render_settings.border.color().to_hex(),
        items,
        output_dir,
    };

    if let Some(path) = &args.report {
        export::write_report(Path::new(path), &report)?;
    }

    Ok(report.failed_count())
}

/// 设置文件为底，命令行参数覆盖其上。
fn merge_settings(args: &Args, settings_path: Option<&Path>) -> Result<BorderSettings, AppError> {
    let mut merged = match settings_path {
        Some(path) => settings::load_settings(path)?.unwrap_or_default(),
        None => BorderSettings::default(),
    };

    if let Some(width) = args.border_width {
        merged.border_width = width;
    }
    if let Some(color) = &args.color {
        merged.border_color = color.clone();
    }
    if let Some(frame) = args.frame {
        merged.aspect_ratio = frame;
    }

    Ok(merged)
}
