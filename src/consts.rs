//! JBOD 常量定义
//!
//! 这个模块包含了阵列几何、线路协议和缓存相关的所有常量。

//=============================================================================
// 阵列几何
//=============================================================================

/// 磁盘数量
pub const JBOD_NUM_DISKS: u32 = 16;

/// 每个磁盘的块数
pub const JBOD_NUM_BLOCKS_PER_DISK: u32 = 256;

/// 块大小（字节）
pub const JBOD_BLOCK_SIZE: usize = 256;

/// 单个磁盘大小（字节，65536）
pub const JBOD_DISK_SIZE: u32 = JBOD_NUM_BLOCKS_PER_DISK * JBOD_BLOCK_SIZE as u32;

/// 整个线性地址空间大小（字节，1048576）
pub const JBOD_TOTAL_SIZE: u32 = JBOD_NUM_DISKS * JBOD_DISK_SIZE;

/// 单次读写的最大长度（字节）
pub const JBOD_MAX_IO_SIZE: usize = 1024;

//=============================================================================
// 线路协议
//=============================================================================

/// 帧头长度：length(2) + op(4) + return code(2)
pub const JBOD_HEADER_LEN: usize = 8;

/// 携带块数据的帧长度
pub const JBOD_FRAME_WITH_BLOCK_LEN: usize = JBOD_HEADER_LEN + JBOD_BLOCK_SIZE;

/// 默认服务端地址
pub const JBOD_SERVER: &str = "127.0.0.1";

/// 默认服务端端口
pub const JBOD_PORT: u16 = 3333;

//=============================================================================
// 缓存
//=============================================================================

/// 缓存最小条目数
pub const CACHE_MIN_ENTRIES: usize = 2;

/// 缓存最大条目数
pub const CACHE_MAX_ENTRIES: usize = 4096;

/// 默认缓存条目数
pub const DEFAULT_CACHE_ENTRIES: usize = 1024;
