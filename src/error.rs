//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 合成器自身只报告 `CompositeError`；设置文件、输出目录等外围失败
//! 在这里与之合并为 `AppError`，CLI 入口统一返回 `Result<T, AppError>`。
//!
//! # 实现思路
//!
//! - 错误消息由 `thiserror` 派生。
//! - 为 `CompositeError`、`std::io::Error` 提供 `From` 转换，无需手动 map。
//! - 实现 `Serialize` 将错误序列化为字符串，便于以 JSON 形式输出报告。

use serde::Serialize;

use crate::compositor::CompositeError;

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 图片合成流水线错误（加载 / 解码 / 合成 / 编码）
    #[error("{0}")]
    Composite(#[from] CompositeError),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),

    /// 输出目录不可用
    #[error("输出目录不可用: {0}")]
    Storage(String),

    /// 设置文件读写或解析失败
    #[error("设置错误: {0}")]
    Settings(String),
}

impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
