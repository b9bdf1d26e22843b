//! # 解码流水线模块
//!
//! ## 设计思路
//!
//! 上传的照片在这里一次性解码为 RGBA 源图，之后每次重新合成都复用它。
//! 先读 header 尺寸并对照像素 / 内存上限，通过后才做完整解码。
//!
//! ## 实现思路
//!
//! 1. 猜测格式，取得解码器并读取 header 尺寸与 EXIF 方向
//! 2. 按摆正后的尺寸做零尺寸与像素上限快速拒绝
//! 3. 完整解码（多帧格式只取首帧），应用方向标记
//! 4. 转换 RGBA，并校验字节长度一致性

use image::metadata::Orientation;
use image::{DynamicImage, GenericImageView, ImageDecoder, ImageReader};
use std::io::Cursor;

use super::source::{RawImageData, SourceImage};
use super::{CompositeError, CompositorConfig, ImageCompositor};

impl ImageCompositor {
    /// 将原始字节解码为不可变的 RGBA 源图。
    ///
    /// EXIF 方向标记会在解码后立即应用，之后的比例分类与布局都基于摆正后的尺寸。
    pub(crate) fn decode_source(
        &self,
        raw: RawImageData,
        config: &CompositorConfig,
    ) -> Result<SourceImage, CompositeError> {
        image::guess_format(&raw.bytes)
            .map_err(|e| CompositeError::UnsupportedMediaType(format!("不支持的图片格式：{}", e)))?;

        let mut decoder = ImageReader::new(Cursor::new(raw.bytes.as_slice()))
            .with_guessed_format()
            .map_err(|e| CompositeError::UnsupportedMediaType(format!("无法识别图片格式：{}", e)))?
            .into_decoder()
            .map_err(|e| CompositeError::UnsupportedMediaType(format!("无法读取图片头：{}", e)))?;

        let orientation = decoder.orientation().unwrap_or_else(|e| {
            log::warn!("⚠️ 读取 EXIF 方向失败，按原方向处理 - {}：{}", raw.file_name, e);
            Orientation::NoTransforms
        });

        let (header_width, header_height) = Self::oriented_dimensions(decoder.dimensions(), orientation);
        Self::validate_nonzero_dimensions(header_width, header_height)?;
        Self::validate_pixel_limits(config, header_width, header_height)?;
        Self::validate_decoded_memory_limits(config, header_width, header_height)?;

        let mut decoded = DynamicImage::from_decoder(decoder)
            .map_err(|e| CompositeError::UnsupportedMediaType(format!("图片解码失败：{}", e)))?;
        decoded.apply_orientation(orientation);

        let (width, height) = decoded.dimensions();
        if (width, height) != (header_width, header_height) {
            return Err(CompositeError::UnsupportedMediaType(format!(
                "解码尺寸与图片头不一致：{}x{} / {}x{}",
                width, height, header_width, header_height
            )));
        }

        let rgba = decoded.to_rgba8();

        let expected_len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(4))
            .ok_or_else(|| CompositeError::resource_limit("decode", "图片尺寸导致内存溢出风险".to_string()))?;

        if rgba.as_raw().len() != expected_len {
            return Err(CompositeError::UnsupportedMediaType("解码后像素数据长度异常".to_string()));
        }

        log::info!(
            "✅ 图片解码成功 - 来源: {} 名称: {} 类型: {} 尺寸: {}x{} 方向: {:?}",
            raw.source_hint,
            raw.file_name,
            raw.media_type,
            width,
            height,
            orientation
        );

        Ok(SourceImage::decoded(raw.file_name, raw.media_type, rgba))
    }

    /// 应用方向标记后的宽高：旋转 90° / 270° 的四种方向交换宽高。
    fn oriented_dimensions((width, height): (u32, u32), orientation: Orientation) -> (u32, u32) {
        match orientation {
            Orientation::Rotate90
            | Orientation::Rotate270
            | Orientation::Rotate90FlipH
            | Orientation::Rotate270FlipH => (height, width),
            _ => (width, height),
        }
    }

    fn validate_nonzero_dimensions(width: u32, height: u32) -> Result<(), CompositeError> {
        if width == 0 || height == 0 {
            return Err(CompositeError::InvalidDimensions(format!(
                "图片宽高必须为正数：{}x{}",
                width, height
            )));
        }

        Ok(())
    }

    /// 校验像素数量是否超过配置上限。
    fn validate_pixel_limits(
        config: &CompositorConfig,
        width: u32,
        height: u32,
    ) -> Result<(), CompositeError> {
        let pixels = (width as u64)
            .checked_mul(height as u64)
            .ok_or_else(|| CompositeError::resource_limit("decode", "图片像素数溢出".to_string()))?;

        if pixels > config.max_decoded_pixels {
            return Err(CompositeError::resource_limit("decode", format!(
                "图片像素过大：{} 像素（限制：{} 像素）",
                pixels, config.max_decoded_pixels
            )));
        }

        Ok(())
    }

    fn validate_decoded_memory_limits(
        config: &CompositorConfig,
        width: u32,
        height: u32,
    ) -> Result<(), CompositeError> {
        let estimated = (width as u64)
            .checked_mul(height as u64)
            .and_then(|pixels| pixels.checked_mul(4))
            .ok_or_else(|| CompositeError::resource_limit("decode", "图片解码内存估算溢出".to_string()))?;

        if estimated > config.max_decoded_bytes {
            return Err(CompositeError::resource_limit("decode", format!(
                "图片解码预计内存过大：{:.2} MB（限制：{:.2} MB）",
                estimated as f64 / 1024.0 / 1024.0,
                config.max_decoded_bytes as f64 / 1024.0 / 1024.0
            )));
        }

        Ok(())
    }
}
