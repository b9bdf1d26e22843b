//! # 核心编排模块
//!
//! ## 设计思路
//!
//! `ImageCompositor` 只负责流程编排与配置管理，不依赖任何界面层。
//! 处理链路固定为：
//! 1. 读取配置快照
//! 2. 按来源加载原始字节
//! 3. 解码为不可变源图
//! 4. 计算布局 → 渲染 → 编码 PNG
//!
//! ## 实现思路
//!
//! - 配置通过 `Arc<RwLock<CompositorConfig>>` 支持运行时动态切档。
//! - 单次请求内使用“同一配置快照”，避免处理中途配置漂移。
//! - 合成本身是纯函数：输入相同，输出字节相同；重复调用只替换结果，不累积状态。
//! - 记录 `load/decode/composite/total` 阶段耗时，便于性能诊断。

use std::sync::{Arc, RwLock};
use std::time::Instant;

use super::frame::{self, AspectLabel};
use super::source::{CompositedResult, SourceImage};
use super::{
    BorderSpec, CompositeError, CompositeLayout, CompositorConfig, CompositorProfile, ImageSource,
    TargetFrame,
};

/// 图片合成器。
///
/// 可在多个线程间共享（`Clone` 只复制配置句柄）。
#[derive(Clone)]
pub struct ImageCompositor {
    pub(super) config: Arc<RwLock<CompositorConfig>>,
}

impl ImageCompositor {
    /// 根据初始配置创建合成器。
    ///
    /// # 示例
    /// ```rust
    /// use bordergenie::compositor::{CompositorConfig, ImageCompositor};
    ///
    /// let compositor = ImageCompositor::new(CompositorConfig::default())?;
    /// # Ok::<(), bordergenie::compositor::CompositeError>(())
    /// ```
    pub fn new(config: CompositorConfig) -> Result<Self, CompositeError> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(RwLock::new(config)),
        })
    }

    /// 获取配置快照。
    ///
    /// 作用：保证单次请求链路使用一致参数。
    pub fn config_snapshot(&self) -> Result<CompositorConfig, CompositeError> {
        self.config
            .read()
            .map(|cfg| cfg.clone())
            .map_err(|_| CompositeError::LockPoisoned("配置读取锁已中毒".to_string()))
    }

    /// 整体替换配置，校验失败时保持原配置不变。
    pub fn set_config(&self, config: CompositorConfig) -> Result<(), CompositeError> {
        config.validate()?;
        let mut current = self
            .config
            .write()
            .map_err(|_| CompositeError::LockPoisoned("配置写入锁已中毒".to_string()))?;
        *current = config;
        Ok(())
    }

    /// 设置性能档位。
    pub fn set_profile(&self, profile: CompositorProfile) -> Result<(), CompositeError> {
        let mut config = self
            .config
            .write()
            .map_err(|_| CompositeError::LockPoisoned("配置写入锁已中毒".to_string()))?;
        config.apply_profile(profile);

        log::info!(
            "⚙️ 已切换合成性能档位：{:?}（filter={:?}, compression={:?}）",
            profile,
            config.resize_filter,
            config.png_compression
        );

        Ok(())
    }

    /// 获取当前生效档位。
    pub fn get_profile(&self) -> Result<CompositorProfile, CompositeError> {
        let config = self
            .config
            .read()
            .map_err(|_| CompositeError::LockPoisoned("配置读取锁已中毒".to_string()))?;
        Ok(config.infer_profile())
    }

    /// 按当前配置的容差给出展示用比例标签。
    pub fn classify(&self, width: u32, height: u32) -> Result<AspectLabel, CompositeError> {
        let config = self.config_snapshot()?;
        Ok(frame::classify(width, height, config.classify_tolerance))
    }

    /// 计算画幅（内框）尺寸。
    pub fn resolve_frame_dimensions(
        &self,
        frame: TargetFrame,
        source_width: u32,
        source_height: u32,
    ) -> Result<(u32, u32), CompositeError> {
        frame.resolve_dimensions(source_width, source_height)
    }

    /// 加载并解码任意来源的图片。
    pub fn load(&self, source: ImageSource) -> Result<SourceImage, CompositeError> {
        let config = self.config_snapshot()?;
        self.load_with_config(source, &config)
    }

    pub(crate) fn load_with_config(
        &self,
        source: ImageSource,
        config: &CompositorConfig,
    ) -> Result<SourceImage, CompositeError> {
        let raw = match source {
            ImageSource::FilePath(path) => self.load_from_file(&path, config)?,
            ImageSource::Base64 { name, data } => self.load_from_base64(&name, &data, config)?,
            ImageSource::Bytes {
                name,
                media_type,
                bytes,
            } => self.load_from_bytes(&name, &media_type, bytes, config)?,
        };

        self.decode_source(raw, config)
    }

    /// 对单张源图执行合成：布局 → 渲染 → PNG。
    ///
    /// # 示例
    /// ```rust
    /// use bordergenie::compositor::{
    ///     BorderColor, BorderSpec, CompositorConfig, ImageCompositor, SourceImage, TargetFrame,
    /// };
    /// use image::{ImageBuffer, Rgba};
    ///
    /// let compositor = ImageCompositor::new(CompositorConfig::default())?;
    /// let source = SourceImage::from_rgba("a.png", ImageBuffer::from_pixel(40, 30, Rgba([9, 9, 9, 255])));
    /// let border = BorderSpec::new(10, BorderColor::WHITE)?;
    ///
    /// let result = compositor.composite(&source, TargetFrame::Square, &border)?;
    /// assert_eq!((result.width(), result.height()), (1100, 1100));
    /// # Ok::<(), bordergenie::compositor::CompositeError>(())
    /// ```
    pub fn composite(
        &self,
        source: &SourceImage,
        frame: TargetFrame,
        border: &BorderSpec,
    ) -> Result<CompositedResult, CompositeError> {
        let config = self.config_snapshot()?;
        self.composite_with_config(source, frame, border, &config)
    }

    pub(crate) fn composite_with_config(
        &self,
        source: &SourceImage,
        frame: TargetFrame,
        border: &BorderSpec,
        config: &CompositorConfig,
    ) -> Result<CompositedResult, CompositeError> {
        if border.width_px() > config.max_border_width {
            return Err(CompositeError::InvalidSettings(format!(
                "边框宽度 {}px 超出范围（0~{}px）",
                border.width_px(),
                config.max_border_width
            )));
        }

        let layout = CompositeLayout::compute(source.width(), source.height(), frame, border)?;

        log::debug!(
            "📐 布局 - 源图: {}x{} 画幅: {} {}x{} 画布: {}x{} 落点: {:?}",
            source.width(),
            source.height(),
            frame.as_str(),
            layout.frame_width,
            layout.frame_height,
            layout.canvas_width,
            layout.canvas_height,
            layout.placement
        );

        self.render(source, layout, border, config)
    }

    /// 处理主入口：从任意来源加载并合成。
    pub fn process(
        &self,
        source: ImageSource,
        frame: TargetFrame,
        border: &BorderSpec,
    ) -> Result<CompositedResult, CompositeError> {
        let config = self.config_snapshot()?;
        let total_start = Instant::now();

        let load_start = Instant::now();
        let image = self.load_with_config(source, &config)?;
        let load_elapsed = load_start.elapsed();

        let composite_start = Instant::now();
        let result = self.composite_with_config(&image, frame, border, &config)?;
        let composite_elapsed = composite_start.elapsed();

        let total_elapsed = total_start.elapsed();
        log::info!(
            "✅ 图片合成完成 - {} load+decode={}ms composite={}ms total={}ms 输出: {}x{} {}KB",
            image.file_name(),
            load_elapsed.as_millis(),
            composite_elapsed.as_millis(),
            total_elapsed.as_millis(),
            result.width(),
            result.height(),
            result.png.len() / 1024
        );

        Ok(result)
    }
}
