//! # 服务层（批量合成）
//!
//! ## 设计思路
//!
//! `CompositorService` 持有共享的 `ImageCompositor`，负责“全部下载”这类批量场景：
//! 1. 每张图片独立合成，互不共享可变状态
//! 2. 单张失败只记录在该条结果里，不中断同批其他图片
//! 3. 按请求 ID 取消整批：尚未开始的图片直接报告取消，已完成的结果保留
//!
//! ## 实现思路
//!
//! - CPU 密集的解码/缩放/编码放到 `spawn_blocking`，避免阻塞 async 运行时。
//! - 同时在途的图片数受 `max_parallel_items` 信号量限制，每张图片持有多份整图缓冲。
//! - 结果按输入顺序 await，天然按 `index` 排序。
//! - 取消标志 `Arc<AtomicBool>` 按请求 ID 登记，同一 ID 不允许并行两个批次，批次结束后移除。

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use tokio::sync::Semaphore;

use super::frame::AspectLabel;
use super::source::CompositedResult;
use super::{CompositeError, CompositorConfig, ImageCompositor, ImageSource, RenderSettings};

/// 单张图片的批处理产物。
#[derive(Debug, Clone)]
pub struct BatchItemOutput {
    /// 源图尺寸。
    pub source_width: u32,
    pub source_height: u32,
    /// 展示用比例标签。
    pub label: AspectLabel,
    /// 合成结果。
    pub result: CompositedResult,
}

/// 单张图片的批处理结果。
#[derive(Debug)]
pub struct BatchItemResult {
    /// 在输入列表中的位置。
    pub index: usize,
    /// 源文件名。
    pub file_name: String,
    pub outcome: Result<BatchItemOutput, CompositeError>,
}

/// 批量合成服务。
pub struct CompositorService {
    compositor: ImageCompositor,
    cancel_flags: Mutex<HashMap<String, Arc<AtomicBool>>>,
}

impl CompositorService {
    /// 使用默认配置创建服务。
    pub fn new() -> Result<Self, CompositeError> {
        Self::with_config(CompositorConfig::default())
    }

    /// 使用自定义配置创建服务。
    pub fn with_config(config: CompositorConfig) -> Result<Self, CompositeError> {
        Ok(Self {
            compositor: ImageCompositor::new(config)?,
            cancel_flags: Mutex::new(HashMap::new()),
        })
    }

    pub fn compositor(&self) -> &ImageCompositor {
        &self.compositor
    }

    /// 批量合成。
    ///
    /// 返回值长度与输入一致，按输入顺序排列。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use bordergenie::compositor::{
    ///     BorderColor, BorderSpec, CompositorService, ImageSource, RenderSettings, TargetFrame,
    /// };
    ///
    /// # async fn demo() -> Result<(), bordergenie::compositor::CompositeError> {
    /// let service = CompositorService::new()?;
    /// let settings = RenderSettings::new(TargetFrame::Square, BorderSpec::new(50, BorderColor::WHITE)?);
    /// let results = service
    ///     .composite_batch("req-1", vec![ImageSource::FilePath("a.jpg".into())], settings)
    ///     .await?;
    /// assert_eq!(results.len(), 1);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn composite_batch(
        &self,
        request_id: &str,
        sources: Vec<ImageSource>,
        settings: RenderSettings,
    ) -> Result<Vec<BatchItemResult>, CompositeError> {
        let config = self.compositor.config_snapshot()?;
        if settings.border.width_px() > config.max_border_width {
            return Err(CompositeError::InvalidSettings(format!(
                "边框宽度 {}px 超出范围（0~{}px）",
                settings.border.width_px(),
                config.max_border_width
            )));
        }

        let cancel_flag = Arc::new(AtomicBool::new(false));
        let _registration = CancelRegistration::register(&self.cancel_flags, request_id, &cancel_flag)?;

        let batch_start = Instant::now();
        let total = sources.len();
        log::info!(
            "🚀 开始批量合成 - 请求: {} 数量: {} 并发上限: {} 画幅: {} 边框: {}px {}",
            request_id,
            total,
            config.max_parallel_items,
            settings.frame.as_str(),
            settings.border.width_px(),
            settings.border.color().to_hex()
        );

        let file_names: Vec<String> = sources.iter().map(ImageSource::file_name).collect();
        let compositor = self.compositor.clone();
        let limit = config.max_parallel_items;
        let outcomes = run_bounded(limit, sources, move |source| {
            Self::composite_one(&compositor, source, settings, &config, &cancel_flag)
        })
        .await;

        let mut results = Vec::with_capacity(total);
        for (index, (file_name, outcome)) in file_names.into_iter().zip(outcomes).enumerate() {
            let outcome = outcome.and_then(|item| item);

            if let Err(err) = &outcome {
                log::warn!(
                    "⚠️ 图片合成失败 - 请求: {} #{} {} [{}:{}] {}",
                    request_id,
                    index,
                    file_name,
                    err.stage(),
                    err.code(),
                    err
                );
            }

            results.push(BatchItemResult {
                index,
                file_name,
                outcome,
            });
        }

        let succeeded = results.iter().filter(|item| item.outcome.is_ok()).count();
        log::info!(
            "✅ 批量合成结束 - 请求: {} 成功: {}/{} 耗时: {}ms",
            request_id,
            succeeded,
            total,
            batch_start.elapsed().as_millis()
        );

        Ok(results)
    }

    fn composite_one(
        compositor: &ImageCompositor,
        source: ImageSource,
        settings: RenderSettings,
        config: &CompositorConfig,
        cancel_flag: &AtomicBool,
    ) -> Result<BatchItemOutput, CompositeError> {
        if cancel_flag.load(Ordering::SeqCst) {
            return Err(CompositeError::Cancelled("批处理已取消".to_string()));
        }

        let image = compositor.load_with_config(source, config)?;

        if cancel_flag.load(Ordering::SeqCst) {
            return Err(CompositeError::Cancelled("批处理已取消".to_string()));
        }

        let label = super::frame::classify(image.width(), image.height(), config.classify_tolerance);
        let result = compositor.composite_with_config(&image, settings.frame, &settings.border, config)?;

        Ok(BatchItemOutput {
            source_width: image.width(),
            source_height: image.height(),
            label,
            result,
        })
    }

    /// 取消指定批次。返回该批次是否仍在进行。
    pub fn cancel_batch(&self, request_id: &str) -> Result<bool, CompositeError> {
        let guard = self
            .cancel_flags
            .lock()
            .map_err(|_| CompositeError::LockPoisoned("批处理取消标志锁已中毒".to_string()))?;

        if let Some(flag) = guard.get(request_id) {
            flag.store(true, Ordering::SeqCst);
            log::info!("🛑 已请求取消批处理 - 请求: {}", request_id);
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

/// 批次取消标志的登记凭证：同一请求 ID 同时只允许一个批次，凭证释放时注销。
struct CancelRegistration<'a> {
    flags: &'a Mutex<HashMap<String, Arc<AtomicBool>>>,
    request_id: String,
}

impl<'a> CancelRegistration<'a> {
    fn register(
        flags: &'a Mutex<HashMap<String, Arc<AtomicBool>>>,
        request_id: &str,
        flag: &Arc<AtomicBool>,
    ) -> Result<Self, CompositeError> {
        let mut guard = flags
            .lock()
            .map_err(|_| CompositeError::LockPoisoned("批处理取消标志锁已中毒".to_string()))?;

        match guard.entry(request_id.to_string()) {
            Entry::Occupied(_) => Err(CompositeError::InvalidSettings(format!(
                "请求 ID {} 已有批次在处理中",
                request_id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(Arc::clone(flag));
                Ok(Self {
                    flags,
                    request_id: request_id.to_string(),
                })
            }
        }
    }
}

impl Drop for CancelRegistration<'_> {
    fn drop(&mut self) {
        match self.flags.lock() {
            Ok(mut guard) => {
                guard.remove(&self.request_id);
            }
            Err(_) => log::warn!("⚠️ 注销批处理取消标志失败（锁已中毒）- 请求: {}", self.request_id),
        }
    }
}

/// 有界并发地在阻塞线程池上执行 `work`。
///
/// 派发前先取得信号量许可，许可随任务结束释放，因此同时在途的任务不超过 `limit`。
/// 结果按输入顺序返回；任务 panic 记为该项的 `EncodeFailure`。
async fn run_bounded<T, R, F>(limit: usize, items: Vec<T>, work: F) -> Vec<Result<R, CompositeError>>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> R + Send + Sync + 'static,
{
    let semaphore = Arc::new(Semaphore::new(limit.max(1)));
    let work = Arc::new(work);

    let mut handles = Vec::with_capacity(items.len());
    for item in items {
        let permit = match Arc::clone(&semaphore).acquire_owned().await {
            Ok(permit) => permit,
            Err(err) => {
                handles.push(Err(CompositeError::Cancelled(format!("并发许可不可用：{}", err))));
                continue;
            }
        };

        let work = Arc::clone(&work);
        handles.push(Ok(tokio::task::spawn_blocking(move || {
            let _permit = permit;
            work(item)
        })));
    }

    let mut outcomes = Vec::with_capacity(handles.len());
    for handle in handles {
        let outcome = match handle {
            Ok(handle) => handle
                .await
                .map_err(|e| CompositeError::EncodeFailure(format!("合成任务异常退出：{}", e))),
            Err(err) => Err(err),
        };
        outcomes.push(outcome);
    }

    outcomes
}
