//! # 渲染与编码模块
//!
//! ## 设计思路
//!
//! 渲染只消费 `CompositeLayout`，不做任何几何判断：
//! 纯色铺满画布作为边框背景，源图缩放后按像素落点叠加，最后整体编码为 PNG。
//!
//! ## 实现思路
//!
//! 1. 校验画布像素上限
//! 2. `fast_image_resize` 卷积缩放（失败回退 `image::imageops::resize`）
//! 3. `imageops::overlay` 以 source-over 方式叠加到纯色画布
//! 4. `PngEncoder` 按配置压缩等级编码
//!
//! 任一步失败都直接返回错误，不会产生半成品。

use fast_image_resize as fr;
use image::codecs::png::{FilterType as PngFilterType, PngEncoder};
use image::imageops::{self, FilterType};
use image::{ImageBuffer, ImageEncoder, Rgba, RgbaImage};

use super::source::{CompositedResult, SourceImage};
use super::{BorderSpec, CompositeError, CompositeLayout, CompositorConfig, ImageCompositor};

impl ImageCompositor {
    /// 按布局渲染并编码为 PNG。
    pub(crate) fn render(
        &self,
        source: &SourceImage,
        layout: CompositeLayout,
        border: &BorderSpec,
        config: &CompositorConfig,
    ) -> Result<CompositedResult, CompositeError> {
        if layout.canvas_pixels() > config.max_canvas_pixels {
            return Err(CompositeError::resource_limit("render", format!(
                "输出画布过大：{}x{}（限制：{} 像素）",
                layout.canvas_width, layout.canvas_height, config.max_canvas_pixels
            )));
        }

        let canvas = Self::paint_canvas(source, &layout, border, config.resize_filter)?;
        let png = Self::encode_png(&canvas, config)?;

        Ok(CompositedResult { png, layout })
    }

    /// 生成合成后的画布像素（未编码）。
    pub(crate) fn paint_canvas(
        source: &SourceImage,
        layout: &CompositeLayout,
        border: &BorderSpec,
        filter: FilterType,
    ) -> Result<RgbaImage, CompositeError> {
        let mut canvas = ImageBuffer::from_pixel(
            layout.canvas_width,
            layout.canvas_height,
            border.color().to_pixel(),
        );

        let placement = layout.placement;
        let scaled = Self::scale_source(source.pixels(), placement.width, placement.height, filter)?;

        imageops::overlay(&mut canvas, &scaled, placement.x as i64, placement.y as i64);

        Ok(canvas)
    }

    fn scale_source(
        pixels: &RgbaImage,
        target_width: u32,
        target_height: u32,
        filter: FilterType,
    ) -> Result<RgbaImage, CompositeError> {
        if pixels.dimensions() == (target_width, target_height) {
            return Ok(pixels.clone());
        }

        match Self::resize_with_fast_image_resize(pixels, target_width, target_height, filter) {
            Ok(resized) => Ok(resized),
            Err(err) => {
                log::warn!(
                    "⚠️ fast_image_resize 缩放失败，回退 image::imageops::resize：{}",
                    err
                );
                Ok(imageops::resize(pixels, target_width, target_height, filter))
            }
        }
    }

    fn resize_with_fast_image_resize(
        pixels: &RgbaImage,
        target_width: u32,
        target_height: u32,
        filter: FilterType,
    ) -> Result<RgbaImage, CompositeError> {
        let (src_width, src_height) = pixels.dimensions();

        let src_image = fr::images::Image::from_vec_u8(
            src_width,
            src_height,
            pixels.as_raw().clone(),
            fr::PixelType::U8x4,
        )
        .map_err(|e| CompositeError::resource_limit("render", format!("构建源图像缓冲失败：{}", e)))?;

        let mut dst_image = fr::images::Image::new(target_width, target_height, fr::PixelType::U8x4);

        let mut resizer = fr::Resizer::new();
        let options = fr::ResizeOptions::new().resize_alg(fr::ResizeAlg::Convolution(
            Self::to_fast_filter(filter),
        ));

        resizer
            .resize(&src_image, &mut dst_image, Some(&options))
            .map_err(|e| CompositeError::resource_limit("render", format!("fast_image_resize 执行失败：{}", e)))?;

        ImageBuffer::<Rgba<u8>, Vec<u8>>::from_raw(target_width, target_height, dst_image.into_vec())
            .ok_or_else(|| CompositeError::resource_limit("render", "fast_image_resize 输出缓冲长度异常".to_string()))
    }

    fn to_fast_filter(filter: FilterType) -> fr::FilterType {
        match filter {
            FilterType::Nearest | FilterType::Triangle => fr::FilterType::Bilinear,
            FilterType::CatmullRom => fr::FilterType::CatmullRom,
            FilterType::Gaussian => fr::FilterType::Mitchell,
            FilterType::Lanczos3 => fr::FilterType::Lanczos3,
        }
    }

    fn encode_png(canvas: &RgbaImage, config: &CompositorConfig) -> Result<Vec<u8>, CompositeError> {
        let mut png = Vec::new();
        let encoder = PngEncoder::new_with_quality(&mut png, config.png_compression, PngFilterType::Adaptive);

        encoder
            .write_image(
                canvas.as_raw(),
                canvas.width(),
                canvas.height(),
                image::ExtendedColorType::Rgba8,
            )
            .map_err(|e| CompositeError::EncodeFailure(format!("PNG 编码失败：{}", e)))?;

        Ok(png)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::{BorderColor, TargetFrame};

    fn solid_source(width: u32, height: u32, color: [u8; 4]) -> SourceImage {
        SourceImage::from_rgba("solid.png", ImageBuffer::from_pixel(width, height, Rgba(color)))
    }

    fn assert_near(actual: &Rgba<u8>, expected: [u8; 4]) {
        for (a, e) in actual.0.iter().zip(expected) {
            assert!(a.abs_diff(e) <= 2, "pixel {:?} differs from {:?}", actual, expected);
        }
    }

    #[test]
    fn canvas_has_border_outside_placement_and_image_inside() {
        let source = solid_source(160, 120, [200, 10, 10, 255]);
        let border = BorderSpec::new(5, BorderColor::BLACK).unwrap();
        let layout = CompositeLayout::compute(160, 120, TargetFrame::Square, &border).unwrap();

        let canvas = ImageCompositor::paint_canvas(&source, &layout, &border, FilterType::Triangle).unwrap();

        assert_eq!(canvas.dimensions(), (1090, 1090));
        assert_eq!(canvas.get_pixel(0, 0), &Rgba([0, 0, 0, 255]));
        assert_eq!(canvas.get_pixel(545, 100), &Rgba([0, 0, 0, 255]));
        let p = layout.placement;
        assert_near(canvas.get_pixel(p.x, p.y), [200, 10, 10, 255]);
        assert_near(canvas.get_pixel(p.right() - 1, p.bottom() - 1), [200, 10, 10, 255]);
    }

    #[test]
    fn transparent_source_blends_over_border_color() {
        let source = solid_source(10, 10, [0, 0, 0, 0]);
        let border = BorderSpec::new(0, BorderColor::rgba(0, 0, 255, 255)).unwrap();
        let layout = CompositeLayout::compute(10, 10, TargetFrame::Square, &border).unwrap();

        let canvas = ImageCompositor::paint_canvas(&source, &layout, &border, FilterType::Triangle).unwrap();

        assert_near(canvas.get_pixel(540, 540), [0, 0, 255, 255]);
    }

    #[test]
    fn oversized_canvas_is_rejected_before_rendering() {
        let mut config = CompositorConfig::default();
        config.max_canvas_pixels = 1000 * 1000;
        let compositor = ImageCompositor::new(config).expect("compositor init failed");
        let config = compositor.config_snapshot().expect("config snapshot failed");

        let source = solid_source(8, 8, [1, 2, 3, 255]);
        let border = BorderSpec::new(0, BorderColor::WHITE).unwrap();
        let layout = CompositeLayout::compute(8, 8, TargetFrame::Square, &border).unwrap();

        let err = compositor
            .render(&source, layout, &border, &config)
            .expect_err("canvas above the limit must be rejected");
        assert!(matches!(err, CompositeError::ResourceLimit { .. }));
        assert_eq!(err.stage(), "render");
    }

    #[test]
    fn fast_filter_mapping_is_bilinear_or_better() {
        assert!(matches!(
            ImageCompositor::to_fast_filter(FilterType::Triangle),
            fr::FilterType::Bilinear
        ));
        assert!(matches!(
            ImageCompositor::to_fast_filter(FilterType::Lanczos3),
            fr::FilterType::Lanczos3
        ));
    }
}
