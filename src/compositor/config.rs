//! # 配置模块
//!
//! ## 设计思路
//!
//! 将所有“可调策略”集中到 `CompositorConfig`，保证运行时行为可观测、可调整、可测试。
//! 其中性能档位（quality / balanced / speed）作为高层语义，映射到底层参数组合。
//!
//! ## 实现思路
//!
//! - `Default` 提供生产可用的平衡配置。
//! - `CompositorProfile` 负责档位字符串解析与反向输出。
//! - `apply_profile` 将档位转换为具体滤镜与 PNG 压缩等级。
//! - `infer_profile` 用于从当前配置反推档位。
//! - `validate` 拒绝低于双线性质量的滤镜与不合理的上限。

use image::codecs::png::CompressionType;
use image::imageops::FilterType;

use super::frame::DEFAULT_CLASSIFY_TOLERANCE;
use super::border::DEFAULT_MAX_BORDER_WIDTH;
use super::CompositeError;

/// 图片合成配置。
#[derive(Debug, Clone)]
pub struct CompositorConfig {
    /// 读取原始字节时允许的最大文件体积（字节）。
    pub max_file_size: u64,
    /// 解码后的像素上限（`width * height`）。
    pub max_decoded_pixels: u64,
    /// 解码阶段允许的预计内存上限（按 RGBA 估算，字节）。
    pub max_decoded_bytes: u64,
    /// 输出画布像素上限。
    pub max_canvas_pixels: u64,
    /// 边框宽度上限（像素）。
    pub max_border_width: u32,
    /// 比例分类容差，仅影响展示标签。
    pub classify_tolerance: f64,
    /// 缩放滤镜。
    pub resize_filter: FilterType,
    /// PNG 压缩等级。
    pub png_compression: CompressionType,
    /// 批处理时同时在途的图片数上限。
    pub max_parallel_items: usize,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            max_file_size: 50 * 1024 * 1024,
            max_decoded_pixels: 40_000_000,
            max_decoded_bytes: 160 * 1024 * 1024,
            max_canvas_pixels: 16_000_000,
            max_border_width: DEFAULT_MAX_BORDER_WIDTH,
            classify_tolerance: DEFAULT_CLASSIFY_TOLERANCE,
            resize_filter: FilterType::CatmullRom,
            png_compression: CompressionType::Default,
            max_parallel_items: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
        }
    }
}

/// 性能档位。
///
/// - `Quality`：Lanczos3 + 最高压缩
/// - `Balanced`：CatmullRom + 默认压缩
/// - `Speed`：双线性 + 快速压缩
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositorProfile {
    Quality,
    Balanced,
    Speed,
}

impl CompositorProfile {
    /// 从外部字符串解析档位。
    ///
    /// # 示例
    /// ```rust
    /// use bordergenie::compositor::CompositorProfile;
    ///
    /// let p = CompositorProfile::from_str("balanced")?;
    /// assert_eq!(p.as_str(), "balanced");
    /// # Ok::<(), bordergenie::compositor::CompositeError>(())
    /// ```
    pub fn from_str(profile: &str) -> Result<Self, CompositeError> {
        match profile.trim().to_lowercase().as_str() {
            "quality" => Ok(Self::Quality),
            "balanced" => Ok(Self::Balanced),
            "speed" => Ok(Self::Speed),
            other => Err(CompositeError::InvalidSettings(format!(
                "未知性能档位：{}（可选：quality / balanced / speed）",
                other
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Quality => "quality",
            Self::Balanced => "balanced",
            Self::Speed => "speed",
        }
    }
}

impl CompositorConfig {
    /// 基于当前参数反推性能档位。
    pub fn infer_profile(&self) -> CompositorProfile {
        match self.resize_filter {
            FilterType::Lanczos3 | FilterType::Gaussian => CompositorProfile::Quality,
            FilterType::Triangle | FilterType::Nearest => CompositorProfile::Speed,
            FilterType::CatmullRom => CompositorProfile::Balanced,
        }
    }

    /// 应用指定性能档位到实际参数。
    pub fn apply_profile(&mut self, profile: CompositorProfile) {
        match profile {
            CompositorProfile::Quality => {
                self.resize_filter = FilterType::Lanczos3;
                self.png_compression = CompressionType::Best;
            }
            CompositorProfile::Balanced => {
                self.resize_filter = FilterType::CatmullRom;
                self.png_compression = CompressionType::Default;
            }
            CompositorProfile::Speed => {
                self.resize_filter = FilterType::Triangle;
                self.png_compression = CompressionType::Fast;
            }
        }
    }

    /// 校验配置是否可用。
    pub fn validate(&self) -> Result<(), CompositeError> {
        if matches!(self.resize_filter, FilterType::Nearest) {
            return Err(CompositeError::InvalidSettings(
                "缩放滤镜不能低于双线性质量（Nearest 不可用）".to_string(),
            ));
        }
        if self.max_decoded_bytes < 8 * 1024 * 1024 {
            return Err(CompositeError::InvalidSettings("max_decoded_bytes 不能小于 8MB".to_string()));
        }
        if self.max_decoded_pixels == 0 || self.max_canvas_pixels == 0 {
            return Err(CompositeError::InvalidSettings("像素上限必须大于 0".to_string()));
        }
        if self.max_parallel_items == 0 {
            return Err(CompositeError::InvalidSettings("max_parallel_items 必须大于 0".to_string()));
        }
        if !(self.classify_tolerance > 0.0 && self.classify_tolerance < 1.0) {
            return Err(CompositeError::InvalidSettings(format!(
                "classify_tolerance 必须在 (0, 1) 之间：{}",
                self.classify_tolerance
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid_and_balanced() {
        let config = CompositorConfig::default();
        config.validate().expect("default config should be valid");
        assert_eq!(config.infer_profile(), CompositorProfile::Balanced);
    }

    #[test]
    fn profiles_roundtrip_through_config() {
        let mut config = CompositorConfig::default();
        for profile in [
            CompositorProfile::Quality,
            CompositorProfile::Speed,
            CompositorProfile::Balanced,
        ] {
            config.apply_profile(profile);
            assert_eq!(config.infer_profile(), profile);
            config.validate().expect("profile presets should stay valid");
        }
    }

    #[test]
    fn zero_parallel_items_is_rejected() {
        let mut config = CompositorConfig::default();
        assert!(config.max_parallel_items >= 1);

        config.max_parallel_items = 0;
        assert!(matches!(config.validate(), Err(CompositeError::InvalidSettings(_))));
    }

    #[test]
    fn nearest_filter_is_rejected() {
        let mut config = CompositorConfig::default();
        config.resize_filter = FilterType::Nearest;
        assert!(matches!(config.validate(), Err(CompositeError::InvalidSettings(_))));
    }

    #[test]
    fn unknown_profile_is_rejected() {
        assert!(matches!(
            CompositorProfile::from_str("ultra"),
            Err(CompositeError::InvalidSettings(_))
        ));
        assert_eq!(CompositorProfile::from_str(" SPEED ").unwrap(), CompositorProfile::Speed);
    }
}
