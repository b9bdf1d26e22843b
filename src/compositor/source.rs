//! # 数据源与中间模型
//!
//! ## 设计思路
//!
//! 将“外部输入类型”和“流水线中间结果”解耦：
//! - `ImageSource` 表示外部来源语义
//! - `RawImageData` 表示已加载但未解码的字节
//! - `SourceImage` 表示解码完成、不可变的 RGBA 源图
//! - `CompositedResult` 表示最终输出的 PNG

use image::RgbaImage;

use super::CompositeLayout;

/// 图片输入来源。
pub enum ImageSource {
    /// 本地文件路径来源。
    FilePath(String),
    /// Base64（支持 Data URL 与纯 Base64 字符串）。
    Base64 { name: String, data: String },
    /// 内存字节，附带调用方声明的媒体类型。
    Bytes {
        name: String,
        media_type: String,
        bytes: Vec<u8>,
    },
}

impl ImageSource {
    /// 来源对应的原始文件名，用于推导输出文件名。
    pub fn file_name(&self) -> String {
        match self {
            Self::FilePath(path) => std::path::Path::new(path)
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_else(|| path.clone()),
            Self::Base64 { name, .. } => name.clone(),
            Self::Bytes { name, .. } => name.clone(),
        }
    }
}

/// 加载阶段输出：原始字节与来源标识。
pub(crate) struct RawImageData {
    /// 原始图片字节。
    pub(crate) bytes: Vec<u8>,
    /// 原始文件名。
    pub(crate) file_name: String,
    /// 嗅探得到的媒体类型。
    pub(crate) media_type: &'static str,
    /// 来源提示（用于日志与诊断）。
    pub(crate) source_hint: &'static str,
}

/// 解码后的源图，加载完成后不再修改。
#[derive(Debug, Clone)]
pub struct SourceImage {
    file_name: String,
    media_type: &'static str,
    pixels: RgbaImage,
}

impl SourceImage {
    /// 直接由像素构建源图，主要用于测试与内存内调用。
    pub fn from_rgba(file_name: impl Into<String>, pixels: RgbaImage) -> Self {
        Self {
            file_name: file_name.into(),
            media_type: "image/x-raw-rgba",
            pixels,
        }
    }

    pub(crate) fn decoded(file_name: String, media_type: &'static str, pixels: RgbaImage) -> Self {
        Self {
            file_name,
            media_type,
            pixels,
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn media_type(&self) -> &'static str {
        self.media_type
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

/// 合成结果：PNG 字节与对应的几何布局。
#[derive(Debug, Clone)]
pub struct CompositedResult {
    /// 输出 PNG 字节。
    pub png: Vec<u8>,
    /// 本次合成使用的布局。
    pub layout: CompositeLayout,
}

impl CompositedResult {
    pub fn width(&self) -> u32 {
        self.layout.canvas_width
    }

    pub fn height(&self) -> u32 {
        self.layout.canvas_height
    }
}
