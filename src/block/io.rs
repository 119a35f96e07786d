//! 字节范围 I/O 实现

use super::JbodDev;
use crate::{
    consts::{JBOD_BLOCK_SIZE, JBOD_MAX_IO_SIZE, JBOD_TOTAL_SIZE},
    error::{Error, ErrorKind, Result},
    proto::Transport,
    types::decompose,
};

impl<T: Transport> JbodDev<T> {
    /// 检查字节范围
    fn check_range(addr: u32, len: usize, buf_len: usize) -> Result<()> {
        if len > JBOD_MAX_IO_SIZE {
            return Err(Error::new(ErrorKind::OutOfBounds, "length exceeds 1024 bytes"));
        }
        if addr as u64 + len as u64 > JBOD_TOTAL_SIZE as u64 {
            return Err(Error::new(
                ErrorKind::OutOfBounds,
                "range exceeds the linear address space",
            ));
        }
        if buf_len < len {
            return Err(Error::new(ErrorKind::InvalidInput, "buffer shorter than length"));
        }
        Ok(())
    }

    /// 读取字节
    ///
    /// 从线性地址 `addr` 读取 `len` 字节到 `buf[..len]`，自动处理跨块、跨盘情况。
    /// 每个涉及的块先查缓存，未命中时从服务端读取并插入缓存。
    ///
    /// # 参数
    ///
    /// * `addr` - 线性字节地址
    /// * `len` - 读取长度（不超过 1024）
    /// * `buf` - 目标缓冲区（长度至少为 `len`）
    ///
    /// # 返回
    ///
    /// 成功返回读取的字节数（等于 `len`）
    ///
    /// # 错误
    ///
    /// - 未挂载：`NotMounted`
    /// - `len > 1024` 或 `addr + len > 1048576`：`OutOfBounds`
    /// - `buf` 短于 `len`：`InvalidInput`
    /// - 传输失败：`Io`
    ///
    /// # 示例
    ///
    /// ```rust,ignore
    /// let mut buf = [0u8; 300];
    /// dev.read(65500, 300, &mut buf)?; // 跨越磁盘 0 和磁盘 1
    /// ```
    pub fn read(&mut self, addr: u32, len: usize, buf: &mut [u8]) -> Result<usize> {
        self.ensure_mounted()?;
        Self::check_range(addr, len, buf.len())?;
        self.inc_read_count();

        let end = addr + len as u32;
        let mut pos = addr;
        let mut done = 0;
        let mut staging = [0u8; JBOD_BLOCK_SIZE];

        while pos < end {
            let (block_addr, offset) = decompose(pos);
            let n = (JBOD_BLOCK_SIZE - offset).min((end - pos) as usize);

            self.fetch_block(block_addr, &mut staging)?;
            buf[done..done + n].copy_from_slice(&staging[offset..offset + n]);

            pos += n as u32;
            done += n;
        }

        Ok(len)
    }

    /// 写入字节
    ///
    /// 向线性地址 `addr` 写入 `buf[..len]`，每个涉及的块都整块写穿到服务端。
    /// 只覆盖块的一部分时，先取得该块的当前内容（缓存或服务端），
    /// 保证未写入的字节不变。
    ///
    /// 写入只通过 `update` 刷新已缓存的块，不会把新块插入缓存。
    ///
    /// # 参数
    ///
    /// * `addr` - 线性字节地址
    /// * `len` - 写入长度（不超过 1024）
    /// * `buf` - 源数据缓冲区（长度至少为 `len`）
    ///
    /// # 返回
    ///
    /// 成功返回写入的字节数（等于 `len`）；`len == 0` 且缓冲区为空时直接返回 0，
    /// 其余情况（包括 `len == 0` 但给出了数据）仍要求已挂载且地址合法
    pub fn write(&mut self, addr: u32, len: usize, buf: &[u8]) -> Result<usize> {
        if len == 0 && buf.is_empty() {
            return Ok(0);
        }
        self.ensure_mounted()?;
        Self::check_range(addr, len, buf.len())?;
        if len == 0 {
            return Ok(0);
        }
        self.inc_write_count();

        let end = addr + len as u32;
        let mut pos = addr;
        let mut done = 0;
        let mut staging = [0u8; JBOD_BLOCK_SIZE];

        while pos < end {
            let (block_addr, offset) = decompose(pos);
            let n = (JBOD_BLOCK_SIZE - offset).min((end - pos) as usize);

            if n < JBOD_BLOCK_SIZE {
                // 部分写：保留块内其余字节
                self.fetch_block(block_addr, &mut staging)?;
            }
            staging[offset..offset + n].copy_from_slice(&buf[done..done + n]);
            self.store_block(block_addr, &staging)?;

            pos += n as u32;
            done += n;
        }

        Ok(len)
    }

    /// 读取整个块
    ///
    /// `addr` 可以是块内任意地址。
    pub fn read_block(&mut self, addr: u32, buf: &mut [u8; JBOD_BLOCK_SIZE]) -> Result<usize> {
        let start = addr - addr % JBOD_BLOCK_SIZE as u32;
        self.read(start, JBOD_BLOCK_SIZE, buf)
    }
}
