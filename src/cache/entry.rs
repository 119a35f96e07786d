//! 缓存条目结构

use crate::consts::JBOD_BLOCK_SIZE;
use crate::types::BlockAddr;

/// 缓存条目
///
/// 一个固定 256 字节的块副本，外加所属地址和访问时间戳。
/// 数据只通过拷贝进出缓存，调用者永远拿不到条目内部的引用。
///
/// # 字段说明
///
/// - `addr`: 所缓存块的 (disk, block)
/// - `data`: 块数据
/// - `valid`: 条目是否持有有效数据
/// - `access_time`: 逻辑时钟值，越小越旧；从未使用的槽位为 0
#[derive(Clone)]
pub struct CacheEntry {
    /// 块地址
    pub addr: BlockAddr,

    /// 块数据
    pub data: [u8; JBOD_BLOCK_SIZE],

    /// 是否有效
    pub valid: bool,

    /// 访问时间戳
    pub access_time: u64,
}

impl CacheEntry {
    /// 创建空条目（无效，时间戳为 0）
    pub const fn empty() -> Self {
        Self {
            addr: BlockAddr::new(0, 0),
            data: [0u8; JBOD_BLOCK_SIZE],
            valid: false,
            access_time: 0,
        }
    }

    /// 是否是 `addr` 的有效条目
    #[inline]
    pub fn holds(&self, addr: BlockAddr) -> bool {
        self.valid && self.addr == addr
    }

    /// 覆盖槽位内容
    pub fn fill(&mut self, addr: BlockAddr, data: &[u8; JBOD_BLOCK_SIZE], access_time: u64) {
        self.addr = addr;
        self.data.copy_from_slice(data);
        self.valid = true;
        self.access_time = access_time;
    }
}

impl Default for CacheEntry {
    fn default() -> Self {
        Self::empty()
    }
}

impl core::fmt::Debug for CacheEntry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CacheEntry")
            .field("addr", &self.addr)
            .field("valid", &self.valid)
            .field("access_time", &self.access_time)
            .finish()
    }
}
