//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 使用单一错误枚举承载合成链路中的所有错误来源，避免字符串拼接式错误处理。
//! 通过 `thiserror` 保持人类可读错误，同时让调用侧可按分支匹配。
//!
//! 每个分支都能给出稳定的 `code()` 与所属阶段 `stage()`，
//! 批处理时按单张图片上报，不影响同批其他图片。

/// 图片合成统一错误类型。
///
/// 该类型会在应用层被上转为 `AppError`。
#[derive(Debug, thiserror::Error)]
pub enum CompositeError {
    #[error("不支持的媒体类型：{0}")]
    UnsupportedMediaType(String),

    #[error("图片尺寸无效：{0}")]
    InvalidDimensions(String),

    #[error("编码失败：{0}")]
    EncodeFailure(String),

    #[error("参数无效：{0}")]
    InvalidSettings(String),

    /// `stage` 记录触发限制的流水线阶段（load / decode / layout / render）。
    #[error("资源限制：{message}")]
    ResourceLimit { stage: &'static str, message: String },

    #[error("文件错误：{0}")]
    FileSystem(String),

    #[error("已取消：{0}")]
    Cancelled(String),

    #[error("套餐限制：{0}")]
    PlanLimit(String),

    #[error("内部状态异常：{0}")]
    LockPoisoned(String),
}

impl CompositeError {
    pub fn resource_limit(stage: &'static str, message: impl Into<String>) -> Self {
        Self::ResourceLimit {
            stage,
            message: message.into(),
        }
    }

    /// 稳定错误码，供 CLI 输出与日志检索。
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnsupportedMediaType(_) => "E_UNSUPPORTED_MEDIA_TYPE",
            Self::InvalidDimensions(_) => "E_INVALID_DIMENSIONS",
            Self::EncodeFailure(_) => "E_ENCODE_FAILURE",
            Self::InvalidSettings(_) => "E_INVALID_SETTINGS",
            Self::ResourceLimit { .. } => "E_RESOURCE_LIMIT",
            Self::FileSystem(_) => "E_FILE_SYSTEM",
            Self::Cancelled(_) => "E_CANCELLED",
            Self::PlanLimit(_) => "E_PLAN_LIMIT",
            Self::LockPoisoned(_) => "E_LOCK_POISONED",
        }
    }

    /// 错误发生的流水线阶段。
    pub fn stage(&self) -> &'static str {
        match self {
            Self::UnsupportedMediaType(_) => "load",
            Self::InvalidDimensions(_) => "layout",
            Self::EncodeFailure(_) => "encode",
            Self::InvalidSettings(_) => "config",
            Self::ResourceLimit { stage, .. } => *stage,
            Self::FileSystem(_) => "load",
            Self::Cancelled(_) => "batch",
            Self::PlanLimit(_) => "config",
            Self::LockPoisoned(_) => "config",
        }
    }
}
