//! jbod_core: JBOD 块存储客户端驱动
//!
//! 把通过网络协议访问的 16 盘 JBOD 阵列呈现为一个 1 MiB 的线性字节空间，
//! 并用固定容量的 LRU 块缓存加速重复读取：
//! - **同步阻塞**：每个操作在 I/O 完成或失败后才返回
//! - **写穿**：每次写都同步落到后端，缓存只用于读
//! - **会话对象**：挂载状态、缓存和传输通道都属于一个 [`JbodDev`]，没有全局状态
//!
//! # 示例
//!
//! ```rust,ignore
//! use jbod_core::{JbodConfig, JbodDev, Result};
//!
//! fn main() -> Result<()> {
//!     let mut dev = JbodDev::connect(&JbodConfig::default())?;
//!     dev.mount()?;
//!
//!     dev.write(1000, 5, b"hello")?;
//!
//!     let mut buf = [0u8; 5];
//!     dev.read(1000, 5, &mut buf)?;
//!
//!     dev.unmount()?;
//!     dev.disconnect();
//!     Ok(())
//! }
//! ```
//!
//! # 模块结构
//!
//! - [`error`] - 错误类型定义
//! - [`consts`] - 常量定义
//! - [`types`] - 地址分解
//! - [`cache`] - 块缓存
//! - [`proto`] - 线路协议与传输层
//! - [`block`] - 块 I/O 引擎
//! - [`config`] - 客户端配置

#![no_std]
#![deny(unsafe_code)]
#![warn(missing_docs)]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

// ===== 核心模块 =====

/// 错误处理
pub mod error;

/// 常量定义
pub mod consts;

/// 地址类型定义
pub mod types;

/// 块缓存
pub mod cache;

/// 线路协议
pub mod proto;

/// 块 I/O 引擎
pub mod block;

/// 客户端配置
pub mod config;

// ===== 公共导出 =====

// 错误处理
pub use error::{Error, ErrorKind, Result};

// 地址
pub use types::{decompose, BlockAddr};

// 缓存
pub use cache::{BlockCache, CacheEntry, CacheStats};

// 协议
pub use proto::{Command, Operation, Transport};

#[cfg(feature = "std")]
pub use proto::TcpTransport;

// 块设备
pub use block::JbodDev;

// 配置
pub use config::JbodConfig;
