//! 输出文件管理模块
//!
//! # 设计思路
//!
//! 每张图片的输出文件名只由它自己的源文件名决定，
//! 与批处理顺序无关；输出目录不存在时自动创建。
//!
//! # 实现思路
//!
//! - 去掉目录与最后一个扩展名，前缀 `bordergenie_`，统一输出 `.png`。
//! - 文件名主体为空时回退为 `image`。
//! - 所有可能失败的操作均返回 `Result`，不使用 `expect()` / `unwrap()`。

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::compositor::{AspectLabel, TargetFrame};
use crate::error::AppError;

/// 输出文件名前缀。
pub const OUTPUT_PREFIX: &str = "bordergenie_";

/// 输出目录信息
#[derive(Debug, Clone, Serialize)]
pub struct OutputDirInfo {
    pub path: String,
    pub total_size: u64,
    pub file_count: u64,
}

/// 由源文件名推导输出文件名。
///
/// # 示例
/// ```rust
/// use bordergenie::export::output_file_name;
///
/// assert_eq!(output_file_name("holiday.jpg"), "bordergenie_holiday.png");
/// ```
pub fn output_file_name(source_name: &str) -> String {
    let stem = Path::new(source_name)
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .filter(|stem| !stem.trim().is_empty())
        .unwrap_or_else(|| "image".to_string());

    format!("{}{}.png", OUTPUT_PREFIX, stem)
}

/// 找出一批源文件中会生成相同输出名的条目（按出现顺序，只报告重复者）。
pub fn duplicate_output_names<'a>(source_names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();

    for name in source_names {
        let output = output_file_name(name);
        if !seen.insert(output.clone()) && !duplicates.contains(&output) {
            duplicates.push(output);
        }
    }

    duplicates
}

/// 获取输出目录，不存在时自动创建。
pub fn ensure_output_dir(dir: &Path) -> Result<PathBuf, AppError> {
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|e| {
            AppError::Storage(format!("创建输出目录 '{}' 失败: {}", dir.display(), e))
        })?;
    }

    if !dir.is_dir() {
        return Err(AppError::Storage(format!("输出路径不是目录: {}", dir.display())));
    }

    Ok(dir.to_path_buf())
}

/// 写出一张合成结果，返回完整路径。
pub fn write_result(dir: &Path, source_name: &str, png: &[u8]) -> Result<PathBuf, AppError> {
    let dir = ensure_output_dir(dir)?;
    let path = dir.join(output_file_name(source_name));

    fs::write(&path, png)?;
    log::info!("💾 已写出 {} ({}KB)", path.display(), png.len() / 1024);

    Ok(path)
}

/// 获取输出目录信息（路径 + 占用大小 + 本工具生成的文件数）
pub fn output_dir_info(dir: &Path) -> Result<OutputDirInfo, AppError> {
    let dir = ensure_output_dir(dir)?;
    let mut total_size: u64 = 0;
    let mut file_count: u64 = 0;

    if let Ok(entries) = fs::read_dir(&dir) {
        for entry in entries.flatten() {
            let is_output = entry
                .file_name()
                .to_string_lossy()
                .starts_with(OUTPUT_PREFIX);
            if let Ok(metadata) = entry.metadata() {
                if metadata.is_file() && is_output {
                    total_size += metadata.len();
                    file_count += 1;
                }
            }
        }
    }

    Ok(OutputDirInfo {
        path: dir.to_string_lossy().to_string(),
        total_size,
        file_count,
    })
}

/// 单张图片的导出记录。
#[derive(Debug, Serialize)]
pub struct ExportRecord {
    pub source: String,
    pub output: Option<String>,
    pub source_width: Option<u32>,
    pub source_height: Option<u32>,
    pub label: Option<AspectLabel>,
    pub error_code: Option<&'static str>,
    pub error: Option<AppError>,
}

impl ExportRecord {
    pub fn failed(source: impl Into<String>, error_code: &'static str, error: AppError) -> Self {
        Self {
            source: source.into(),
            output: None,
            source_width: None,
            source_height: None,
            label: None,
            error_code: Some(error_code),
            error: Some(error),
        }
    }
}

/// 一次导出的 JSON 报告。
#[derive(Debug, Serialize)]
pub struct ExportReport {
    pub frame: TargetFrame,
    pub border_width: u32,
    pub border_color: String,
    pub items: Vec<ExportRecord>,
    pub output_dir: Option<OutputDirInfo>,
}

impl ExportReport {
    pub fn failed_count(&self) -> usize {
        self.items.iter().filter(|item| item.error.is_some()).count()
    }
}

/// 将导出报告写为格式化 JSON，父目录不存在时自动创建。
pub fn write_report(path: &Path, report: &ExportReport) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let content = serde_json::to_string_pretty(report)
        .map_err(|e| AppError::Storage(format!("序列化导出报告失败: {}", e)))?;
    fs::write(path, content)?;

    log::info!("🧾 已写出导出报告 {}（{} 项）", path.display(), report.items.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_name_strips_directory_and_extension() {
        assert_eq!(output_file_name("IMG_0001.JPG"), "bordergenie_IMG_0001.png");
        assert_eq!(output_file_name("/tmp/photos/cat.png"), "bordergenie_cat.png");
        assert_eq!(output_file_name("archive.tar.gz"), "bordergenie_archive.tar.png");
        assert_eq!(output_file_name("no_extension"), "bordergenie_no_extension.png");
    }

    #[test]
    fn output_name_falls_back_for_empty_stem() {
        assert_eq!(output_file_name(""), "bordergenie_image.png");
        assert_eq!(output_file_name("/"), "bordergenie_image.png");
    }

    #[test]
    fn duplicate_names_are_reported_once() {
        let duplicates = duplicate_output_names(["a.jpg", "a.png", "b.png", "dir/a.webp"]);
        assert_eq!(duplicates, vec!["bordergenie_a.png".to_string()]);
    }

    #[test]
    fn write_result_creates_directory_and_counts_outputs() {
        let dir = tempfile::tempdir().expect("tempdir");
        let out = dir.path().join("out");

        let path = write_result(&out, "beach.jpeg", b"png-bytes").expect("write should succeed");
        assert_eq!(path, out.join("bordergenie_beach.png"));
        fs::write(out.join("unrelated.txt"), b"x").unwrap();

        let info = output_dir_info(&out).expect("info should succeed");
        assert_eq!(info.file_count, 1);
        assert_eq!(info.total_size, 9);
    }

    #[test]
    fn report_serializes_labels_errors_and_dir_info() {
        let dir = tempfile::tempdir().expect("tempdir");
        let out = dir.path().join("out");
        let written = write_result(&out, "beach.jpeg", b"png").expect("write should succeed");

        let report = ExportReport {
            frame: TargetFrame::Portrait,
            border_width: 50,
            border_color: "#ffffff".to_string(),
            items: vec![
                ExportRecord {
                    source: "beach.jpeg".to_string(),
                    output: Some(written.to_string_lossy().to_string()),
                    source_width: Some(900),
                    source_height: Some(1200),
                    label: Some(AspectLabel::Portrait),
                    error_code: None,
                    error: None,
                },
                ExportRecord::failed(
                    "notes.txt",
                    "E_UNSUPPORTED_MEDIA_TYPE",
                    crate::compositor::CompositeError::UnsupportedMediaType("无法识别图片类型".to_string()).into(),
                ),
            ],
            output_dir: Some(output_dir_info(&out).expect("info should succeed")),
        };
        assert_eq!(report.failed_count(), 1);

        let path = dir.path().join("reports").join("report.json");
        write_report(&path, &report).expect("report should be written");

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).expect("report should be valid json");
        assert_eq!(json["frame"], "4:5");
        assert_eq!(json["items"][0]["label"], serde_json::to_value(AspectLabel::Portrait).unwrap());
        assert_eq!(json["items"][0]["error"], serde_json::Value::Null);
        assert_eq!(json["items"][1]["error_code"], "E_UNSUPPORTED_MEDIA_TYPE");
        assert_eq!(json["items"][1]["error"], "不支持的媒体类型：无法识别图片类型");
        assert_eq!(json["output_dir"]["file_count"], 1);
    }

    #[test]
    fn ensure_output_dir_rejects_file_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("file.txt");
        fs::write(&file, b"x").unwrap();

        assert!(matches!(ensure_output_dir(&file), Err(AppError::Storage(_))));
    }
}
