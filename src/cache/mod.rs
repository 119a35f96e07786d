//! 块缓存模块
//!
//! 固定容量、无重复、按 LRU 驱逐的 256 字节块缓存，键为 (disk, block)。
//!
//! # 主要组件
//!
//! - [`CacheEntry`] - 单个缓存条目，包含数据和元数据
//! - [`BlockCache`] - 缓存管理器，定长数组 + 逻辑时钟
//! - [`CacheStats`] - 缓存统计信息
//!
//! # 设计原理
//!
//! 缓存只是一个 `Vec<CacheEntry>`，容量在创建时固定。查找和驱逐都是对数组的
//! 线性扫描，结果是一个下标，随后对该下标的槽位做拷贝/覆盖。
//! LRU 顺序完全由每个条目的 `access_time` 表达，不维护链表。
//!
//! 缓存是只读加速层：写路径永远写穿到后端，只通过 `update` 保持已缓存块一致，
//! 新条目只由读路径（包括部分写之前的预读）插入。
//!
//! # 使用示例
//!
//! ```rust,ignore
//! use jbod_core::cache::BlockCache;
//!
//! let mut cache = BlockCache::with_capacity(1024)?;
//!
//! let mut block = [0u8; 256];
//! if !cache.lookup(0, 3, &mut block) {
//!     // 从后端读取 block
//!     cache.insert(0, 3, &block)?;
//! }
//!
//! println!("{}", cache.stats());
//! ```
//!
//! # 性能特性
//!
//! - **查找**: O(n) 线性扫描
//! - **插入**: O(n) 查重 + O(n) 选择驱逐槽位
//!
//! 容量上限 4096，扫描开销远小于一次网络往返。

mod block_cache;
mod entry;

pub use block_cache::{BlockCache, CacheStats};
pub use entry::CacheEntry;
