//! 地址类型定义
//!
//! 线性字节地址到 (disk, block, offset) 的固定映射。

use crate::consts::{JBOD_BLOCK_SIZE, JBOD_DISK_SIZE, JBOD_NUM_BLOCKS_PER_DISK, JBOD_NUM_DISKS};

/// 块地址：磁盘号 + 盘内块号
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct BlockAddr {
    /// 磁盘号（0..16）
    pub disk: u32,
    /// 盘内块号（0..256）
    pub block: u32,
}

impl BlockAddr {
    /// 创建块地址（不做范围检查）
    pub const fn new(disk: u32, block: u32) -> Self {
        Self { disk, block }
    }

    /// 包含线性地址 `addr` 的块
    pub const fn containing(addr: u32) -> Self {
        Self {
            disk: disk_of(addr),
            block: block_of(addr),
        }
    }

    /// 两个分量是否都在阵列范围内
    pub const fn is_valid(&self) -> bool {
        self.disk < JBOD_NUM_DISKS && self.block < JBOD_NUM_BLOCKS_PER_DISK
    }

    /// 该块第一个字节的线性地址
    pub const fn start_addr(&self) -> u32 {
        self.disk * JBOD_DISK_SIZE + self.block * JBOD_BLOCK_SIZE as u32
    }
}

/// 地址所在的磁盘号
#[inline]
pub const fn disk_of(addr: u32) -> u32 {
    addr / JBOD_DISK_SIZE
}

/// 地址所在的盘内块号
#[inline]
pub const fn block_of(addr: u32) -> u32 {
    (addr % JBOD_DISK_SIZE) / JBOD_BLOCK_SIZE as u32
}

/// 地址在块内的字节偏移
#[inline]
pub const fn offset_in_block(addr: u32) -> usize {
    (addr % JBOD_BLOCK_SIZE as u32) as usize
}

/// 分解线性地址为 (块地址, 块内偏移)
#[inline]
pub const fn decompose(addr: u32) -> (BlockAddr, usize) {
    (BlockAddr::containing(addr), offset_in_block(addr))
}
