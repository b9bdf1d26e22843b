//! # BorderGenie — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 CLI (main.rs, argh)                      │
//! │                                                          │
//! │  参数 + 设置文件 ── BorderSettings ── Plan (能力开关)     │
//! │       │                                                  │
//! └───────┼──────────────────────────────────────────────────┘
//!         ↕ RenderSettings（不可变值对象）
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↕            核心 (Rust)                            │
//! │                                                          │
//! │  ┌─ error ────── AppError (统一错误类型)                  │
//! │  │                                                       │
//! │  ├─ compositor ─ 加载 → 解码 → 布局 → 渲染 → PNG          │
//! │  │   ├─ frame    画幅尺寸 + 比例分类                      │
//! │  │   ├─ layout   contain 适配几何                         │
//! │  │   └─ service  批量并发 + 逐张失败隔离 + 取消            │
//! │  │                                                       │
//! │  ├─ settings     边框设置 (serde_json)                    │
//! │  ├─ plan         免费版 / 专业版能力                       │
//! │  └─ export       输出文件名 + 写盘                         │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError` |
//! | [`compositor`] | 图片加载、画幅计算、边框合成、PNG 编码、批量处理 |
//! | [`settings`] | 边框宽度/颜色/画幅设置及其 JSON 读写 |
//! | [`plan`] | 调用方使用的套餐能力开关（自定义画幅、上传数量） |
//! | [`export`] | `bordergenie_<名称>.png` 命名与输出目录管理 |

pub mod error;
pub mod compositor;
pub mod export;
pub mod plan;
pub mod settings;
