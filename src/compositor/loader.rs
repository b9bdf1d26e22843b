//! # 加载与校验模块
//!
//! ## 设计思路
//!
//! 统一处理不同来源（本地文件 / Data URL / 内存字节）的原始字节加载，
//! 并在“尽可能早”的阶段执行输入校验，尽快失败，减少不必要的内存与 CPU 消耗。
//!
//! ## 实现思路
//!
//! - 文件：存在性 + metadata 体积限制 + 读取。
//! - Base64：声明的媒体类型必须是 `image/*` + 解码前体积估算。
//! - 内存字节：声明的媒体类型必须是 `image/*` + 体积限制。
//! - 所有来源最终都做文件签名（magic bytes）校验。

use base64::{Engine as _, engine::general_purpose};
use std::path::Path;

use super::source::RawImageData;
use super::{CompositeError, CompositorConfig, ImageCompositor};

impl ImageCompositor {
    /// 从本地路径加载图片原始字节。
    pub(super) fn load_from_file(
        &self,
        path: &str,
        config: &CompositorConfig,
    ) -> Result<RawImageData, CompositeError> {
        log::info!("📁 开始读取本地图片 - 路径: {}", path);

        let file_path = Path::new(path);
        if !file_path.exists() {
            return Err(CompositeError::FileSystem(format!("文件不存在：{}", path)));
        }

        let metadata = std::fs::metadata(file_path)
            .map_err(|e| CompositeError::FileSystem(format!("无法读取文件信息：{}", e)))?;

        if metadata.len() > config.max_file_size {
            return Err(CompositeError::resource_limit("load", format!(
                "文件过大：{:.2} MB（限制：{:.2} MB）",
                metadata.len() as f64 / 1024.0 / 1024.0,
                config.max_file_size as f64 / 1024.0 / 1024.0
            )));
        }

        let bytes = std::fs::read(file_path)
            .map_err(|e| CompositeError::FileSystem(format!("无法读取图片文件：{}", e)))?;
        let media_type = Self::validate_image_signature(&bytes)?;

        let file_name = file_path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string());

        Ok(RawImageData {
            bytes,
            file_name,
            media_type,
            source_hint: "file",
        })
    }

    /// 从 Base64 字符串加载图片原始字节。
    pub(super) fn load_from_base64(
        &self,
        name: &str,
        data: &str,
        config: &CompositorConfig,
    ) -> Result<RawImageData, CompositeError> {
        log::info!("📝 开始处理 base64 图片 - 名称: {}", name);

        let bytes = Self::parse_base64_with_limit(data, config.max_file_size)?;

        if bytes.len() as u64 > config.max_file_size {
            return Err(CompositeError::resource_limit("load", format!(
                "Base64 解码后体积过大：{:.2} MB（限制：{:.2} MB）",
                bytes.len() as f64 / 1024.0 / 1024.0,
                config.max_file_size as f64 / 1024.0 / 1024.0
            )));
        }
        let media_type = Self::validate_image_signature(&bytes)?;

        Ok(RawImageData {
            bytes,
            file_name: name.to_string(),
            media_type,
            source_hint: "base64",
        })
    }

    /// 从内存字节加载，调用方需声明媒体类型。
    pub(super) fn load_from_bytes(
        &self,
        name: &str,
        declared_media_type: &str,
        bytes: Vec<u8>,
        config: &CompositorConfig,
    ) -> Result<RawImageData, CompositeError> {
        log::debug!("📦 接收内存图片 - 名称: {} 声明类型: {}", name, declared_media_type);

        Self::validate_declared_media_type(declared_media_type)?;

        if bytes.len() as u64 > config.max_file_size {
            return Err(CompositeError::resource_limit("load", format!(
                "图片体积过大：{:.2} MB（限制：{:.2} MB）",
                bytes.len() as f64 / 1024.0 / 1024.0,
                config.max_file_size as f64 / 1024.0 / 1024.0
            )));
        }
        let media_type = Self::validate_image_signature(&bytes)?;

        Ok(RawImageData {
            bytes,
            file_name: name.to_string(),
            media_type,
            source_hint: "bytes",
        })
    }

    /// 声明的媒体类型必须以 `image/` 开头。
    pub(crate) fn validate_declared_media_type(media_type: &str) -> Result<(), CompositeError> {
        let normalized = media_type.trim().to_ascii_lowercase();
        if normalized.starts_with("image/") {
            Ok(())
        } else {
            Err(CompositeError::UnsupportedMediaType(format!(
                "声明的媒体类型不是图片：{}",
                if normalized.is_empty() { "<空>" } else { normalized.as_str() }
            )))
        }
    }

    /// 解析 Base64 输入（支持 Data URL / 纯 Base64）。
    #[cfg(test)]
    pub(crate) fn parse_base64(data: &str) -> Result<Vec<u8>, CompositeError> {
        Self::parse_base64_with_limit(data, u64::MAX)
    }

    fn estimate_base64_decoded_upper_bound_len(base64_data: &str) -> Result<u64, CompositeError> {
        let len = base64_data.trim().len() as u64;
        let groups = len
            .checked_add(3)
            .ok_or_else(|| CompositeError::resource_limit("load", "Base64 输入长度溢出".to_string()))?
            / 4;

        groups
            .checked_mul(3)
            .ok_or_else(|| CompositeError::resource_limit("load", "Base64 解码体积估算溢出".to_string()))
    }

    fn parse_base64_with_limit(data: &str, max_file_size: u64) -> Result<Vec<u8>, CompositeError> {
        let normalized = data.trim();

        let payload = match normalized.strip_prefix("data:") {
            Some(rest) => {
                let (media_type, base64_data) = rest
                    .split_once(";base64,")
                    .ok_or_else(|| CompositeError::UnsupportedMediaType("Data URL 缺少 base64 标记".to_string()))?;
                Self::validate_declared_media_type(media_type)?;
                base64_data
            }
            None => normalized,
        };

        let estimated_len = Self::estimate_base64_decoded_upper_bound_len(payload)?;
        if estimated_len > max_file_size {
            return Err(CompositeError::resource_limit("load", format!(
                "Base64 预计解码体积过大：{:.2} MB（限制：{:.2} MB）",
                estimated_len as f64 / 1024.0 / 1024.0,
                max_file_size as f64 / 1024.0 / 1024.0
            )));
        }

        general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| CompositeError::UnsupportedMediaType(format!("Base64 解码失败：{}", e)))
    }

    /// 通过文件签名（magic bytes）校验输入是否为图片，返回嗅探到的媒体类型。
    fn validate_image_signature(bytes: &[u8]) -> Result<&'static str, CompositeError> {
        if bytes.is_empty() {
            return Err(CompositeError::UnsupportedMediaType("图片内容为空".to_string()));
        }

        let kind = infer::get(bytes)
            .ok_or_else(|| CompositeError::UnsupportedMediaType("无法识别图片类型".to_string()))?;

        if kind.matcher_type() != infer::MatcherType::Image {
            return Err(CompositeError::UnsupportedMediaType(format!(
                "文件签名不是图片类型：{}",
                kind.mime_type()
            )));
        }

        Ok(kind.mime_type())
    }
}
