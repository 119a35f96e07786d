//! 块缓存实现
//!
//! 固定容量的条目数组 + 全局逻辑时钟。
//!
//! # 时钟规则
//!
//! - 每次成功 `insert` 时钟 +1，新条目记录新时钟值
//! - 每次 `lookup` 命中时钟 +1，命中条目记录新时钟值
//! - `update` 不推进时钟，只把条目时间戳设为当前时钟值
//!
//! 因为时钟严格递增，任意两个已使用条目的时间戳互不相同；
//! 从未使用的槽位时间戳为 0，总是先于任何有效条目被选中，
//! 所以缓存会先填满再开始驱逐。

use crate::{
    consts::{CACHE_MAX_ENTRIES, CACHE_MIN_ENTRIES, JBOD_BLOCK_SIZE},
    error::{Error, ErrorKind, Result},
    types::BlockAddr,
};

use super::entry::CacheEntry;
use alloc::vec::Vec;

/// 缓存统计信息
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// 查询次数（含失败的查询）
    pub queries: u64,
    /// 命中次数
    pub hits: u64,
    /// 成功插入次数
    pub inserts: u64,
    /// 驱逐有效条目的次数
    pub evictions: u64,
}

impl CacheStats {
    /// 计算命中率
    pub fn hit_rate(&self) -> f64 {
        if self.queries == 0 {
            0.0
        } else {
            self.hits as f64 / self.queries as f64
        }
    }
}

impl core::fmt::Display for CacheStats {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Hit rate: {:5.1}%", 100.0 * self.hit_rate())
    }
}

/// 块缓存
///
/// 以 (disk, block) 为键、无重复、按 LRU 驱逐的 256 字节块缓存。
/// 未创建时 `entries` 为空，`capacity()` 为 0。
///
/// 时钟和统计在 `destroy` 之后保留，重新 `create` 的缓存继续使用同一时钟。
#[derive(Default)]
pub struct BlockCache {
    /// 条目数组，长度即容量
    entries: Vec<CacheEntry>,

    /// 逻辑时钟
    clock: u64,

    /// 统计信息
    stats: CacheStats,
}

impl BlockCache {
    /// 创建未初始化的缓存
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            clock: 0,
            stats: CacheStats {
                queries: 0,
                hits: 0,
                inserts: 0,
                evictions: 0,
            },
        }
    }

    /// 创建并初始化指定容量的缓存
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let mut cache = Self::new();
        cache.create(capacity)?;
        Ok(cache)
    }

    /// 分配条目数组
    ///
    /// # 错误
    ///
    /// 已初始化，或 `capacity` 不在 [2, 4096] 内时返回 `Initialization`
    pub fn create(&mut self, capacity: usize) -> Result<()> {
        if !self.entries.is_empty() {
            return Err(Error::new(ErrorKind::Initialization, "cache already created"));
        }
        if !(CACHE_MIN_ENTRIES..=CACHE_MAX_ENTRIES).contains(&capacity) {
            return Err(Error::new(
                ErrorKind::Initialization,
                "cache capacity must be within [2, 4096]",
            ));
        }

        self.entries = alloc::vec![CacheEntry::empty(); capacity];
        log::debug!("[CACHE] created with {} entries", capacity);
        Ok(())
    }

    /// 释放条目数组
    pub fn destroy(&mut self) -> Result<()> {
        if self.entries.is_empty() {
            return Err(Error::new(ErrorKind::Initialization, "cache not created"));
        }

        log::debug!("[CACHE] destroyed ({} entries)", self.entries.len());
        self.entries = Vec::new();
        Ok(())
    }

    /// 缓存是否可用
    pub fn enabled(&self) -> bool {
        self.entries.len() > 1
    }

    /// 获取缓存容量
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// 当前有效条目数
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.valid).count()
    }

    /// 是否没有任何有效条目
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 当前时钟值
    pub fn clock(&self) -> u64 {
        self.clock
    }

    /// 获取缓存统计信息
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// 查找块
    ///
    /// 命中时把块数据拷贝到 `buf`，推进时钟并刷新该条目的时间戳。
    /// 无论结果如何查询计数都会 +1。未初始化视为未命中。
    ///
    /// # 返回
    ///
    /// 命中返回 `true`，未命中返回 `false`（未命中不是错误）
    pub fn lookup(&mut self, disk: u32, block: u32, buf: &mut [u8; JBOD_BLOCK_SIZE]) -> bool {
        self.stats.queries += 1;

        let addr = BlockAddr::new(disk, block);
        let Some(idx) = self.find(addr) else {
            log::trace!("[CACHE] lookup disk={} block={} MISS", disk, block);
            return false;
        };

        self.clock += 1;
        let entry = &mut self.entries[idx];
        buf.copy_from_slice(&entry.data);
        entry.access_time = self.clock;
        self.stats.hits += 1;
        log::trace!("[CACHE] lookup disk={} block={} HIT slot={}", disk, block, idx);
        true
    }

    /// 插入块
    ///
    /// 选择时间戳最小的槽位（空槽位时间戳为 0，优先被选中）并覆盖。
    ///
    /// # 错误
    ///
    /// - 未初始化：`Initialization`
    /// - disk/block 越界：`OutOfBounds`
    /// - 已存在相同地址的条目：`AlreadyExists`
    pub fn insert(&mut self, disk: u32, block: u32, buf: &[u8; JBOD_BLOCK_SIZE]) -> Result<()> {
        if self.entries.is_empty() {
            return Err(Error::new(ErrorKind::Initialization, "cache not created"));
        }

        let addr = BlockAddr::new(disk, block);
        if !addr.is_valid() {
            return Err(Error::new(ErrorKind::OutOfBounds, "disk or block id out of range"));
        }
        if self.find(addr).is_some() {
            return Err(Error::new(ErrorKind::AlreadyExists, "block already cached"));
        }

        self.clock += 1;
        let victim = self.lru_index();
        let slot = &mut self.entries[victim];
        if slot.valid {
            log::debug!(
                "[CACHE] evict disk={} block={} (stamp={}) from slot {}",
                slot.addr.disk,
                slot.addr.block,
                slot.access_time,
                victim
            );
            self.stats.evictions += 1;
        }
        slot.fill(addr, buf, self.clock);
        self.stats.inserts += 1;
        log::trace!("[CACHE] insert disk={} block={} slot={}", disk, block, victim);
        Ok(())
    }

    /// 更新已缓存块的数据
    ///
    /// 只在条目存在时覆盖数据，并把时间戳设为当前时钟值。
    /// 不推进时钟、不改统计；不存在的块保持未缓存。
    ///
    /// # 返回
    ///
    /// 是否找到并更新了条目
    pub fn update(&mut self, disk: u32, block: u32, buf: &[u8; JBOD_BLOCK_SIZE]) -> bool {
        let Some(idx) = self.find(BlockAddr::new(disk, block)) else {
            return false;
        };

        let entry = &mut self.entries[idx];
        entry.data.copy_from_slice(buf);
        entry.access_time = self.clock;
        log::trace!("[CACHE] update disk={} block={} slot={}", disk, block, idx);
        true
    }

    /// 是否缓存了指定块（不计入统计，不改变时间戳）
    pub fn contains(&self, disk: u32, block: u32) -> bool {
        self.find(BlockAddr::new(disk, block)).is_some()
    }

    /// 有效条目的下标
    fn find(&self, addr: BlockAddr) -> Option<usize> {
        self.entries.iter().position(|e| e.holds(addr))
    }

    /// 时间戳最小的槽位下标；相等时取下标最小者
    fn lru_index(&self) -> usize {
        // min_by_key 在多个最小值中返回第一个
        self.entries
            .iter()
            .enumerate()
            .min_by_key(|(_, e)| e.access_time)
            .map(|(i, _)| i)
            .unwrap_or(0)
    }
}

impl core::fmt::Debug for BlockCache {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BlockCache")
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .field("clock", &self.clock)
            .field("stats", &self.stats)
            .finish()
    }
}
