//! # 几何布局模块
//!
//! ## 设计思路
//!
//! 把“画布尺寸 + 源图绘制矩形”的计算与像素渲染彻底分离：
//! 布局是纯函数，可独立测试，渲染阶段只消费计算结果。
//!
//! ## 实现思路
//!
//! 1. 解析画幅尺寸，四周各加一圈边框宽度得到画布尺寸
//! 2. 比较源图与画幅的宽高比，决定贴合宽边还是高边（contain 适配）
//! 3. 另一轴居中，得到精确（浮点）的绘制矩形
//! 4. 将绘制矩形的边缘四舍五入到像素网格，得到实际落点

use super::{BorderSpec, CompositeError, TargetFrame};

/// 精确绘制矩形（画布坐标，可含小数）。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawRect {
    pub offset_x: f64,
    pub offset_y: f64,
    pub width: f64,
    pub height: f64,
}

/// 对齐到像素网格后的绘制矩形。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }
}

/// 一次合成的完整几何布局。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositeLayout {
    pub frame_width: u32,
    pub frame_height: u32,
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub border_px: u32,
    pub draw: DrawRect,
    pub placement: PixelRect,
}

impl CompositeLayout {
    /// 计算布局。
    ///
    /// # 示例
    /// ```rust
    /// use bordergenie::compositor::{BorderColor, BorderSpec, CompositeLayout, TargetFrame};
    ///
    /// let border = BorderSpec::new(50, BorderColor::WHITE)?;
    /// let layout = CompositeLayout::compute(1600, 1200, TargetFrame::Square, &border)?;
    /// assert_eq!((layout.canvas_width, layout.canvas_height), (1180, 1180));
    /// assert_eq!(layout.draw.offset_y, 185.0);
    /// # Ok::<(), bordergenie::compositor::CompositeError>(())
    /// ```
    pub fn compute(
        source_width: u32,
        source_height: u32,
        frame: TargetFrame,
        border: &BorderSpec,
    ) -> Result<Self, CompositeError> {
        if source_width == 0 || source_height == 0 {
            return Err(CompositeError::InvalidDimensions(format!(
                "源图宽高必须为正数：{}x{}",
                source_width, source_height
            )));
        }

        let (frame_width, frame_height) = frame.resolve_dimensions(source_width, source_height)?;
        let border_px = border.width_px();

        let padding = border_px
            .checked_mul(2)
            .ok_or_else(|| CompositeError::resource_limit("layout", "边框宽度溢出".to_string()))?;
        let canvas_width = frame_width
            .checked_add(padding)
            .ok_or_else(|| CompositeError::resource_limit("layout", "画布宽度溢出".to_string()))?;
        let canvas_height = frame_height
            .checked_add(padding)
            .ok_or_else(|| CompositeError::resource_limit("layout", "画布高度溢出".to_string()))?;

        let draw = contain_fit(source_width, source_height, frame_width, frame_height, border_px);
        let placement = snap_to_pixels(&draw, frame_width, frame_height, border_px);

        Ok(Self {
            frame_width,
            frame_height,
            canvas_width,
            canvas_height,
            border_px,
            draw,
            placement,
        })
    }

    /// 画布总像素数。
    pub fn canvas_pixels(&self) -> u64 {
        self.canvas_width as u64 * self.canvas_height as u64
    }

    /// 绘制矩形是否铺满整个内框（无留边）。
    pub fn fills_frame(&self) -> bool {
        self.placement.width == self.frame_width && self.placement.height == self.frame_height
    }
}

/// contain 适配：源图完整放入内框，贴合一条轴，另一轴居中。
fn contain_fit(
    source_width: u32,
    source_height: u32,
    frame_width: u32,
    frame_height: u32,
    border_px: u32,
) -> DrawRect {
    let source_aspect = source_width as f64 / source_height as f64;
    let frame_aspect = frame_width as f64 / frame_height as f64;
    let border = border_px as f64;
    let inner_width = frame_width as f64;
    let inner_height = frame_height as f64;

    if source_aspect > frame_aspect {
        let draw_height = inner_width / source_aspect;
        DrawRect {
            offset_x: border,
            offset_y: border + (inner_height - draw_height) / 2.0,
            width: inner_width,
            height: draw_height,
        }
    } else {
        let draw_width = inner_height * source_aspect;
        DrawRect {
            offset_x: border + (inner_width - draw_width) / 2.0,
            offset_y: border,
            width: draw_width,
            height: inner_height,
        }
    }
}

/// 边缘分别取整，保证结果不越出内框；退化为 0 的一轴至少保留 1 像素。
fn snap_to_pixels(draw: &DrawRect, frame_width: u32, frame_height: u32, border_px: u32) -> PixelRect {
    let (x, width) = snap_axis(draw.offset_x, draw.width, border_px, frame_width);
    let (y, height) = snap_axis(draw.offset_y, draw.height, border_px, frame_height);
    PixelRect { x, y, width, height }
}

fn snap_axis(offset: f64, extent: f64, border_px: u32, frame_extent: u32) -> (u32, u32) {
    let min = border_px as f64;
    let max = (border_px + frame_extent) as f64;

    let start = offset.round().clamp(min, max - 1.0);
    let end = (offset + extent).round().clamp(start + 1.0, max);

    (start as u32, (end - start) as u32)
}
