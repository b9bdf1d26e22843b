//! # 目标画幅模块
//!
//! ## 设计思路
//!
//! Instagram 常用画幅固定为三种（1:1 / 4:5 / 16:9），另有一种“自定义”画幅，
//! 保持原图比例并把宽度统一缩放到 1080。
//!
//! - `TargetFrame`：用户实际选择、用于渲染几何的画幅
//! - `AspectLabel`：仅用于展示的比例标签，与用户选择互不影响

use serde::{Deserialize, Serialize};

use super::CompositeError;

/// Instagram 输出宽度（像素）。
pub const INSTAGRAM_WIDTH: u32 = 1080;

/// 比例分类的默认容差。
pub const DEFAULT_CLASSIFY_TOLERANCE: f64 = 0.1;

/// 目标画幅。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetFrame {
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "4:5")]
    Portrait,
    #[serde(rename = "16:9")]
    Landscape,
    #[serde(rename = "custom")]
    Custom,
}

impl TargetFrame {
    pub const ALL: [TargetFrame; 4] = [
        TargetFrame::Square,
        TargetFrame::Portrait,
        TargetFrame::Landscape,
        TargetFrame::Custom,
    ];

    /// 从外部字符串解析画幅。
    ///
    /// 同时接受比例写法（`1:1`）与名称写法（`square`）。
    ///
    /// # 示例
    /// ```rust
    /// use bordergenie::compositor::TargetFrame;
    ///
    /// let frame = TargetFrame::from_str("4:5")?;
    /// assert_eq!(frame, TargetFrame::Portrait);
    /// # Ok::<(), bordergenie::compositor::CompositeError>(())
    /// ```
    pub fn from_str(value: &str) -> Result<Self, CompositeError> {
        match value.trim().to_lowercase().as_str() {
            "1:1" | "square" => Ok(Self::Square),
            "4:5" | "portrait" => Ok(Self::Portrait),
            "16:9" | "landscape" => Ok(Self::Landscape),
            "custom" => Ok(Self::Custom),
            other => Err(CompositeError::InvalidSettings(format!(
                "未知画幅：{}（可选：1:1 / 4:5 / 16:9 / custom）",
                other
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Square => "1:1",
            Self::Portrait => "4:5",
            Self::Landscape => "16:9",
            Self::Custom => "custom",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Square => "Square (1:1)",
            Self::Portrait => "Portrait (4:5)",
            Self::Landscape => "Landscape (16:9)",
            Self::Custom => "Custom",
        }
    }

    /// 固定画幅的标准像素尺寸；自定义画幅返回 `None`。
    pub fn canonical_dimensions(self) -> Option<(u32, u32)> {
        match self {
            Self::Square => Some((1080, 1080)),
            Self::Portrait => Some((1080, 1350)),
            Self::Landscape => Some((1080, 607)),
            Self::Custom => None,
        }
    }

    /// 计算画幅（内框）像素尺寸。
    ///
    /// 自定义画幅：宽 1080，高 `round(h * 1080 / w)`，最小为 1。
    pub fn resolve_dimensions(
        self,
        source_width: u32,
        source_height: u32,
    ) -> Result<(u32, u32), CompositeError> {
        if source_width == 0 {
            return Err(CompositeError::InvalidDimensions(format!(
                "源图宽度必须为正数：{}x{}",
                source_width, source_height
            )));
        }

        if let Some(dimensions) = self.canonical_dimensions() {
            return Ok(dimensions);
        }

        if source_height == 0 {
            return Err(CompositeError::InvalidDimensions(format!(
                "源图高度必须为正数：{}x{}",
                source_width, source_height
            )));
        }

        let scale = INSTAGRAM_WIDTH as f64 / source_width as f64;
        let height = (source_height as f64 * scale).round();
        if height > u32::MAX as f64 {
            return Err(CompositeError::resource_limit("layout", format!(
                "自定义画幅高度溢出：{}",
                height
            )));
        }

        Ok((INSTAGRAM_WIDTH, (height as u32).max(1)))
    }
}

/// 展示用比例标签。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AspectLabel {
    Square,
    Portrait,
    Landscape,
    Custom,
}

impl AspectLabel {
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Square => "Square (1:1)",
            Self::Portrait => "Portrait (4:5)",
            Self::Landscape => "Landscape (16:9)",
            Self::Custom => "Custom",
        }
    }
}

/// 按宽高比对源图做展示分类。
///
/// 依次匹配 Square、Portrait、Landscape，命中第一个容差带即返回。
pub fn classify(width: u32, height: u32, tolerance: f64) -> AspectLabel {
    if height == 0 {
        return AspectLabel::Custom;
    }

    let ratio = width as f64 / height as f64;
    let bands = [
        (1.0, AspectLabel::Square),
        (4.0 / 5.0, AspectLabel::Portrait),
        (16.0 / 9.0, AspectLabel::Landscape),
    ];

    bands
        .into_iter()
        .find(|(target, _)| (ratio - target).abs() < tolerance)
        .map(|(_, label)| label)
        .unwrap_or(AspectLabel::Custom)
}
