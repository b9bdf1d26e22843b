//! # 边框参数模块
//!
//! 边框是整块画布的纯色背景，而不是描边，
//! 因此只需要宽度与颜色两个参数，不涉及圆角、线段连接等问题。

use image::Rgba;

use super::{CompositeError, TargetFrame};

/// 边框宽度允许的默认上限（像素）。
pub const DEFAULT_MAX_BORDER_WIDTH: u32 = 200;

/// 界面预置色板。
pub const PRESET_SWATCHES: [&str; 5] = ["#ffffff", "#000000", "#f5f5f5", "#e0e0e0", "#d4d4d4"];

/// 边框颜色（RGBA8）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BorderColor([u8; 4]);

impl BorderColor {
    pub const WHITE: BorderColor = BorderColor([255, 255, 255, 255]);
    pub const BLACK: BorderColor = BorderColor([0, 0, 0, 255]);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self([r, g, b, a])
    }

    /// 解析任意 CSS 颜色值（`#rgb`、`#rrggbbaa`、`rgb()`、颜色名等）。
    ///
    /// # 示例
    /// ```rust
    /// use bordergenie::compositor::BorderColor;
    ///
    /// let color = BorderColor::parse("#f5f5f5")?;
    /// assert_eq!(color.channels(), [245, 245, 245, 255]);
    /// # Ok::<(), bordergenie::compositor::CompositeError>(())
    /// ```
    pub fn parse(value: &str) -> Result<Self, CompositeError> {
        let parsed: csscolorparser::Color = value
            .trim()
            .parse()
            .map_err(|e| CompositeError::InvalidSettings(format!("无法解析边框颜色 {}：{}", value, e)))?;
        Ok(Self(parsed.to_rgba8()))
    }

    pub fn channels(self) -> [u8; 4] {
        self.0
    }

    pub fn to_pixel(self) -> Rgba<u8> {
        Rgba(self.0)
    }

    /// 输出为 `#rrggbb`，带透明度时输出 `#rrggbbaa`。
    pub fn to_hex(self) -> String {
        let [r, g, b, a] = self.0;
        if a == 255 {
            format!("#{:02x}{:02x}{:02x}", r, g, b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", r, g, b, a)
        }
    }
}

impl Default for BorderColor {
    fn default() -> Self {
        Self::WHITE
    }
}

/// 边框规格：宽度 + 颜色。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderSpec {
    width_px: u32,
    color: BorderColor,
}

impl BorderSpec {
    /// 使用默认上限（200px）校验并创建边框规格。
    pub fn new(width_px: u32, color: BorderColor) -> Result<Self, CompositeError> {
        Self::with_limit(width_px, color, DEFAULT_MAX_BORDER_WIDTH)
    }

    pub fn with_limit(width_px: u32, color: BorderColor, max_width: u32) -> Result<Self, CompositeError> {
        if width_px > max_width {
            return Err(CompositeError::InvalidSettings(format!(
                "边框宽度 {}px 超出范围（0~{}px）",
                width_px, max_width
            )));
        }

        Ok(Self { width_px, color })
    }

    pub fn width_px(&self) -> u32 {
        self.width_px
    }

    pub fn color(&self) -> BorderColor {
        self.color
    }
}

/// 一次渲染所需的全部参数：画幅 + 边框。
///
/// 不可变值对象，每次调用显式传入，合成器不持有任何界面状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderSettings {
    pub frame: TargetFrame,
    pub border: BorderSpec,
}

impl RenderSettings {
    pub fn new(frame: TargetFrame, border: BorderSpec) -> Self {
        Self { frame, border }
    }
}
