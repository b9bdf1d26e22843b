//! # 图片合成模块（compositor）
//!
//! ## 设计思路
//!
//! 该模块将“来源加载 → 解码校验 → 布局计算 → 渲染编码 → 批量调度”
//! 按职责拆分为多个子模块，避免单文件膨胀与耦合。
//!
//! - `service`：批量合成、逐张隔离失败、按请求取消
//! - `handler`：编排单张图片的处理流水线
//! - `loader`：文件 / Data URL / 内存字节加载与媒体类型校验
//! - `pipeline`：解码、像素限制
//! - `frame`：目标画幅与比例分类
//! - `layout`：contain 适配几何（纯函数）
//! - `render`：纯色画布、缩放叠加、PNG 编码
//! - `border/config/error/source`：参数、配置、错误、中间数据模型
//!
//! ## 新同事快速上手
//!
//! 可以按下面顺序理解调用链：
//!
//! ```text
//! main.rs（CLI 参数 → BorderSettings → RenderSettings）
//!    ↓
//! service.rs（spawn_blocking 并发、逐张结果）
//!    ↓
//! handler.rs（配置快照 + 阶段耗时日志）
//!    ├─ loader.rs（来源加载 + 签名校验）
//!    ├─ pipeline.rs（解码 + 像素限制）
//!    ├─ layout.rs（画布尺寸 + 绘制矩形）
//!    └─ render.rs（边框填充 + 缩放叠加 + PNG）
//!    ↓
//! export.rs（输出文件名 + 写盘）
//! ```
//!
//! ## 分层职责建议
//!
//! - 几何规则变更优先改 `layout.rs` / `frame.rs`
//! - 配置与策略变更优先改 `config.rs`
//! - 处理顺序变更优先改 `handler.rs`
//! - 批量行为变更优先改 `service.rs`

mod border;
mod config;
mod error;
pub mod frame;
mod handler;
mod layout;
mod loader;
mod pipeline;
mod render;
mod service;
mod source;

pub use border::{BorderColor, BorderSpec, DEFAULT_MAX_BORDER_WIDTH, PRESET_SWATCHES, RenderSettings};
pub use config::{CompositorConfig, CompositorProfile};
pub use error::CompositeError;
pub use frame::{AspectLabel, TargetFrame, classify};
pub use handler::ImageCompositor;
pub use layout::{CompositeLayout, DrawRect, PixelRect};
pub use service::{BatchItemOutput, BatchItemResult, CompositorService};
pub use source::{CompositedResult, ImageSource, SourceImage};
