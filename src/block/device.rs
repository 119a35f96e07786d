//! JBOD 设备会话

use crate::{
    cache::{BlockCache, CacheStats},
    consts::{JBOD_BLOCK_SIZE, JBOD_NUM_BLOCKS_PER_DISK},
    error::{Error, ErrorKind, Result},
    proto::{jbod_operation, Operation, Transport},
    types::BlockAddr,
};

/// JBOD 设备会话
///
/// 持有一条到服务端的传输通道、挂载标志、块缓存和 I/O 统计。
/// 所有状态都属于这个对象，多个会话之间互不影响。
///
/// # 并发使用
///
/// JbodDev 本身不包含内部锁，所有操作同步阻塞直到 I/O 完成。
/// 多线程环境下应把整个会话放进一把锁里（缓存、时钟和传输通道必须一起保护）：
///
/// ```rust,ignore
/// use std::sync::{Arc, Mutex};
///
/// let dev = Arc::new(Mutex::new(JbodDev::new(transport)));
/// ```
pub struct JbodDev<T> {
    /// 传输通道
    transport: T,
    /// 是否已挂载
    mounted: bool,
    /// 块缓存（未创建时不可用）
    cache: BlockCache,
    /// 服务端当前 (disk, block) 位置，未知时为 None
    cursor: Option<BlockAddr>,
    /// 逻辑读取次数
    read_count: u64,
    /// 逻辑写入次数
    write_count: u64,
    /// 物理读块次数（实际网络操作）
    physical_read_count: u64,
    /// 物理写块次数（实际网络操作）
    physical_write_count: u64,
}

impl<T: Transport> JbodDev<T> {
    /// 创建未挂载、无缓存的会话
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            mounted: false,
            cache: BlockCache::new(),
            cursor: None,
            read_count: 0,
            write_count: 0,
            physical_read_count: 0,
            physical_write_count: 0,
        }
    }

    /// 创建带缓存的会话
    ///
    /// # 参数
    ///
    /// * `transport` - 已连接的传输通道
    /// * `cache_entries` - 缓存条目数（2..=4096）
    pub fn new_with_cache(transport: T, cache_entries: usize) -> Result<Self> {
        let mut dev = Self::new(transport);
        dev.create_cache(cache_entries)?;
        Ok(dev)
    }

    /// 获取传输通道的引用
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// 获取传输通道的可变引用
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// 取回传输通道
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// 是否已挂载
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// 挂载阵列
    ///
    /// 传输失败或服务端拒绝时返回错误，挂载状态不变。
    pub fn mount(&mut self) -> Result<()> {
        self.operation(Operation::mount(), None)?;
        self.mounted = true;
        self.cursor = None;
        log::debug!("[JBOD] mounted");
        Ok(())
    }

    /// 卸载阵列
    ///
    /// 传输失败或服务端拒绝时返回错误，挂载状态不变。
    pub fn unmount(&mut self) -> Result<()> {
        self.operation(Operation::unmount(), None)?;
        self.mounted = false;
        self.cursor = None;
        log::debug!("[JBOD] unmounted");
        Ok(())
    }

    // ===== 缓存管理接口 =====

    /// 创建块缓存
    pub fn create_cache(&mut self, entries: usize) -> Result<()> {
        self.cache.create(entries)
    }

    /// 销毁块缓存
    pub fn destroy_cache(&mut self) -> Result<()> {
        self.cache.destroy()
    }

    /// 缓存是否可用
    pub fn cache_enabled(&self) -> bool {
        self.cache.enabled()
    }

    /// 获取块缓存的引用
    pub fn cache(&self) -> &BlockCache {
        &self.cache
    }

    /// 获取缓存统计信息
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    // ===== 统计 =====

    /// 获取逻辑读取次数
    pub fn read_count(&self) -> u64 {
        self.read_count
    }

    /// 获取逻辑写入次数
    pub fn write_count(&self) -> u64 {
        self.write_count
    }

    /// 获取物理读块次数
    pub fn physical_read_count(&self) -> u64 {
        self.physical_read_count
    }

    /// 获取物理写块次数
    pub fn physical_write_count(&self) -> u64 {
        self.physical_write_count
    }

    // 内部辅助方法

    pub(super) fn ensure_mounted(&self) -> Result<()> {
        if !self.mounted {
            return Err(Error::new(ErrorKind::NotMounted, "jbod is not mounted"));
        }
        Ok(())
    }

    pub(super) fn inc_read_count(&mut self) {
        self.read_count += 1;
    }

    pub(super) fn inc_write_count(&mut self) {
        self.write_count += 1;
    }

    /// 执行一次请求/应答；失败后服务端位置视为未知
    fn operation(&mut self, op: Operation, block: Option<&mut [u8; JBOD_BLOCK_SIZE]>) -> Result<()> {
        let result = jbod_operation(&mut self.transport, op, block);
        if result.is_err() {
            self.cursor = None;
        }
        result
    }

    /// 把服务端位置移动到 `target`
    ///
    /// 换盘会把块位置归零，所以先定位磁盘再定位块。
    fn seek(&mut self, target: BlockAddr) -> Result<()> {
        if self.cursor.map(|c| c.disk) != Some(target.disk) {
            log::debug!("[JBOD] seek disk {}", target.disk);
            self.operation(Operation::seek_to_disk(target.disk), None)?;
            self.cursor = Some(BlockAddr::new(target.disk, 0));
        }
        if self.cursor != Some(target) {
            log::trace!("[JBOD] seek block {}", target.block);
            self.operation(Operation::seek_to_block(target.block), None)?;
            self.cursor = Some(target);
        }
        Ok(())
    }

    /// 读写一个块之后服务端块位置 +1；越过盘尾后位置未知
    fn advance_cursor(&mut self, addr: BlockAddr) {
        self.cursor = if addr.block + 1 < JBOD_NUM_BLOCKS_PER_DISK {
            Some(BlockAddr::new(addr.disk, addr.block + 1))
        } else {
            None
        };
    }

    /// 从服务端读取一个块（不经过缓存）
    pub(super) fn read_block_remote(
        &mut self,
        addr: BlockAddr,
        buf: &mut [u8; JBOD_BLOCK_SIZE],
    ) -> Result<()> {
        self.seek(addr)?;
        self.operation(Operation::read_block(), Some(buf))?;
        self.advance_cursor(addr);
        self.physical_read_count += 1;
        Ok(())
    }

    /// 向服务端写入一个块（不经过缓存）
    pub(super) fn write_block_remote(
        &mut self,
        addr: BlockAddr,
        buf: &[u8; JBOD_BLOCK_SIZE],
    ) -> Result<()> {
        self.seek(addr)?;
        let mut staging = *buf;
        self.operation(Operation::write_block(), Some(&mut staging))?;
        self.advance_cursor(addr);
        self.physical_write_count += 1;
        Ok(())
    }

    /// 取得一个块的当前内容
    ///
    /// 先查缓存；未命中则从服务端读取并插入缓存。
    pub(super) fn fetch_block(
        &mut self,
        addr: BlockAddr,
        buf: &mut [u8; JBOD_BLOCK_SIZE],
    ) -> Result<()> {
        if self.cache.lookup(addr.disk, addr.block, buf) {
            return Ok(());
        }

        log::debug!("[JBOD] fetch disk={} block={} from server", addr.disk, addr.block);
        self.read_block_remote(addr, buf)?;
        if self.cache.enabled() {
            self.cache.insert(addr.disk, addr.block, buf)?;
        }
        Ok(())
    }

    /// 写穿一个块，并保持已缓存副本一致
    pub(super) fn store_block(
        &mut self,
        addr: BlockAddr,
        buf: &[u8; JBOD_BLOCK_SIZE],
    ) -> Result<()> {
        self.write_block_remote(addr, buf)?;
        self.cache.update(addr.disk, addr.block, buf);
        Ok(())
    }
}

#[cfg(feature = "std")]
impl JbodDev<crate::proto::TcpTransport> {
    /// 按配置连接服务端
    ///
    /// 返回的会话处于未挂载状态；`cache_entries` 非 0 时同时创建缓存。
    pub fn connect(config: &crate::config::JbodConfig) -> Result<Self> {
        config.validate()?;
        let transport = crate::proto::TcpTransport::connect(&config.server, config.port)?;
        let mut dev = Self::new(transport);
        if config.cache_entries != 0 {
            dev.create_cache(config.cache_entries)?;
        }
        Ok(dev)
    }

    /// 断开与服务端的连接
    pub fn disconnect(&mut self) {
        self.transport.disconnect();
        self.mounted = false;
        self.cursor = None;
    }
}

impl<T> core::fmt::Debug for JbodDev<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("JbodDev")
            .field("mounted", &self.mounted)
            .field("cursor", &self.cursor)
            .field("cache", &self.cache)
            .field("read_count", &self.read_count)
            .field("write_count", &self.write_count)
            .field("physical_read_count", &self.physical_read_count)
            .field("physical_write_count", &self.physical_write_count)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::mock::MockJbod;
    use crate::proto::Command;

    #[test]
    fn test_new_is_unmounted() {
        let dev = JbodDev::new(MockJbod::new());
        assert!(!dev.is_mounted());
        assert!(!dev.cache_enabled());
    }

    #[test]
    fn test_mount_unmount() {
        let mut dev = JbodDev::new(MockJbod::new());

        dev.mount().unwrap();
        assert!(dev.is_mounted());
        assert!(dev.transport().mounted);

        dev.unmount().unwrap();
        assert!(!dev.is_mounted());
        assert!(!dev.transport().mounted);

        assert_eq!(dev.transport().count(Command::Mount), 1);
        assert_eq!(dev.transport().count(Command::Unmount), 1);

        let server = dev.into_transport();
        assert_eq!(server.ops.len(), 2);
        assert!(!server.mounted);
    }

    #[test]
    fn test_mount_failure_keeps_state() {
        let mut dev = JbodDev::new(MockJbod::new());
        dev.transport_mut().broken = true;

        assert_eq!(dev.mount().unwrap_err().kind(), ErrorKind::Io);
        assert!(!dev.is_mounted());

        dev.transport_mut().broken = false;
        dev.mount().unwrap();
        dev.transport_mut().broken = true;

        assert_eq!(dev.unmount().unwrap_err().kind(), ErrorKind::Io);
        assert!(dev.is_mounted());
    }

    #[test]
    fn test_mount_rejected_by_server() {
        let mut dev = JbodDev::new(MockJbod::new());
        dev.transport_mut().mounted = true;

        assert_eq!(dev.mount().unwrap_err().kind(), ErrorKind::Protocol);
        assert!(!dev.is_mounted());
    }

    #[test]
    fn test_cache_management() {
        let mut dev = JbodDev::new_with_cache(MockJbod::new(), 8).unwrap();
        assert!(dev.cache_enabled());
        assert_eq!(dev.cache().capacity(), 8);

        assert_eq!(dev.create_cache(8).unwrap_err().kind(), ErrorKind::Initialization);
        dev.destroy_cache().unwrap();
        assert!(!dev.cache_enabled());
        assert_eq!(dev.destroy_cache().unwrap_err().kind(), ErrorKind::Initialization);
    }

    #[test]
    fn test_seek_skips_redundant_operations() {
        let mut dev = JbodDev::new(MockJbod::new());
        dev.mount().unwrap();
        dev.transport_mut().clear_ops();

        let mut buf = [0u8; JBOD_BLOCK_SIZE];
        dev.read_block_remote(BlockAddr::new(2, 5), &mut buf).unwrap();
        dev.read_block_remote(BlockAddr::new(2, 6), &mut buf).unwrap();

        let ops = &dev.transport().ops;
        assert_eq!(
            ops.as_slice(),
            &[
                Operation::seek_to_disk(2),
                Operation::seek_to_block(5),
                Operation::read_block(),
                Operation::read_block(),
            ]
        );
    }

    #[test]
    fn test_seek_after_disk_end() {
        let mut dev = JbodDev::new(MockJbod::new());
        dev.mount().unwrap();

        let mut buf = [0u8; JBOD_BLOCK_SIZE];
        dev.read_block_remote(BlockAddr::new(0, 255), &mut buf).unwrap();
        dev.transport_mut().clear_ops();
        dev.read_block_remote(BlockAddr::new(1, 0), &mut buf).unwrap();

        // 换盘后块位置已是 0，不需要再定位块
        assert_eq!(
            dev.transport().ops.as_slice(),
            &[Operation::seek_to_disk(1), Operation::read_block()]
        );
    }

    #[test]
    fn test_failure_forgets_cursor() {
        let mut dev = JbodDev::new(MockJbod::new());
        dev.mount().unwrap();

        let mut buf = [0u8; JBOD_BLOCK_SIZE];
        dev.read_block_remote(BlockAddr::new(3, 3), &mut buf).unwrap();

        dev.transport_mut().broken = true;
        assert!(dev.read_block_remote(BlockAddr::new(3, 4), &mut buf).is_err());
        dev.transport_mut().broken = false;

        dev.transport_mut().clear_ops();
        dev.read_block_remote(BlockAddr::new(3, 4), &mut buf).unwrap();
        assert_eq!(
            dev.transport().ops.as_slice(),
            &[
                Operation::seek_to_disk(3),
                Operation::seek_to_block(4),
                Operation::read_block(),
            ]
        );
    }

    #[test]
    fn test_fetch_populates_cache() {
        let mut dev = JbodDev::new_with_cache(MockJbod::new(), 4).unwrap();
        dev.transport_mut().fill_pattern();
        dev.mount().unwrap();

        let addr = BlockAddr::new(7, 9);
        let mut buf = [0u8; JBOD_BLOCK_SIZE];
        dev.fetch_block(addr, &mut buf).unwrap();
        assert_eq!(&buf[..], dev.transport().block(addr));
        assert_eq!(dev.physical_read_count(), 1);

        let mut again = [0u8; JBOD_BLOCK_SIZE];
        dev.fetch_block(addr, &mut again).unwrap();
        assert_eq!(again, buf);
        assert_eq!(dev.physical_read_count(), 1);
        assert_eq!(dev.cache_stats().hits, 1);
    }

    #[test]
    fn test_store_updates_cached_only() {
        let mut dev = JbodDev::new_with_cache(MockJbod::new(), 4).unwrap();
        dev.mount().unwrap();

        let cached = BlockAddr::new(0, 1);
        let mut buf = [0u8; JBOD_BLOCK_SIZE];
        dev.fetch_block(cached, &mut buf).unwrap();

        let data = [0x77u8; JBOD_BLOCK_SIZE];
        dev.store_block(cached, &data).unwrap();
        dev.store_block(BlockAddr::new(0, 2), &data).unwrap();

        assert!(dev.cache().contains(0, 1));
        assert!(!dev.cache().contains(0, 2));
        assert_eq!(dev.transport().block(BlockAddr::new(0, 2)), &data[..]);

        let mut out = [0u8; JBOD_BLOCK_SIZE];
        dev.fetch_block(cached, &mut out).unwrap();
        assert_eq!(out, data);
        assert_eq!(dev.physical_read_count(), 1);
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_connect_refused() {
        use crate::config::JbodConfig;

        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let config = JbodConfig {
            port,
            ..JbodConfig::default()
        };
        assert_eq!(JbodDev::connect(&config).unwrap_err().kind(), ErrorKind::Io);
    }
}
