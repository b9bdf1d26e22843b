//! 边框设置模块
//!
//! # 设计思路
//!
//! 界面上可调的三个参数（边框宽度、边框颜色、目标画幅）收敛为一个
//! 不可变的 `BorderSettings` 值对象，调用方每次渲染时显式传入，
//! 而不是让合成器读取某个全局状态。
//!
//! # 实现思路
//!
//! - 字段保持“外部语义”（颜色为 CSS 字符串、画幅为 `1:1` 等），便于 JSON 持久化。
//! - `resolve` 负责校验并转换为合成器可用的 `RenderSettings`。
//! - 设置文件使用 `serde_json`，缺失字段取默认值（宽 50、白色、1:1）。

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::compositor::{BorderColor, BorderSpec, RenderSettings, TargetFrame};
use crate::error::AppError;

/// 边框设置。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BorderSettings {
    pub border_width: u32,
    pub border_color: String,
    pub aspect_ratio: TargetFrame,
}

impl Default for BorderSettings {
    fn default() -> Self {
        Self {
            border_width: 50,
            border_color: "#ffffff".to_string(),
            aspect_ratio: TargetFrame::Square,
        }
    }
}

impl BorderSettings {
    /// 校验并转换为渲染参数。
    ///
    /// # 示例
    /// ```rust
    /// use bordergenie::settings::BorderSettings;
    ///
    /// let settings = BorderSettings::default().resolve(200)?;
    /// assert_eq!(settings.border.width_px(), 50);
    /// # Ok::<(), bordergenie::error::AppError>(())
    /// ```
    pub fn resolve(&self, max_border_width: u32) -> Result<RenderSettings, AppError> {
        let color = BorderColor::parse(&self.border_color)?;
        let border = BorderSpec::with_limit(self.border_width, color, max_border_width)?;
        Ok(RenderSettings::new(self.aspect_ratio, border))
    }
}

/// 从 JSON 文件读取设置；文件不存在时返回 `None`。
pub fn load_settings(path: &Path) -> Result<Option<BorderSettings>, AppError> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)?;
    let parsed = serde_json::from_str::<BorderSettings>(&content)
        .map_err(|e| AppError::Settings(format!("解析设置文件失败: {}", e)))?;

    log::debug!("已读取设置文件 {}: {:?}", path.display(), parsed);
    Ok(Some(parsed))
}

/// 将设置写入 JSON 文件，父目录不存在时自动创建。
pub fn save_settings(path: &Path, settings: &BorderSettings) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| AppError::Settings(format!("创建设置目录失败: {}", e)))?;
        }
    }

    let content = serde_json::to_string_pretty(settings)
        .map_err(|e| AppError::Settings(format!("序列化设置失败: {}", e)))?;

    fs::write(path, content)?;
    Ok(())
}
