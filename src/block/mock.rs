//! 测试用内存 JBOD 服务端
//!
//! 解析真实的请求帧，按服务端语义维护挂载状态和 (disk, block) 游标，
//! 并把应答帧排队等待客户端接收。

use crate::{
    consts::{
        JBOD_BLOCK_SIZE, JBOD_FRAME_WITH_BLOCK_LEN, JBOD_HEADER_LEN, JBOD_NUM_BLOCKS_PER_DISK,
        JBOD_NUM_DISKS, JBOD_TOTAL_SIZE,
    },
    error::{Error, ErrorKind, Result},
    proto::{Command, Header, Operation, Transport},
    types::BlockAddr,
};
use alloc::collections::VecDeque;
use alloc::vec::Vec;

/// 服务端失败返回码（-1）
const RET_FAILURE: u16 = 0xffff;

/// 内存 JBOD 服务端，实现 [`Transport`]
pub(crate) struct MockJbod {
    /// 16 × 256 × 256 字节存储
    pub storage: Vec<u8>,
    /// 服务端挂载状态
    pub mounted: bool,
    disk: u32,
    block: u32,
    /// 已执行的操作（按顺序）
    pub ops: Vec<Operation>,
    /// 每次 send/recv 最多传输的字节数
    pub chunk: usize,
    /// 置位后所有 send 返回 Io 错误
    pub broken: bool,
    inbox: Vec<u8>,
    outbox: VecDeque<u8>,
}

impl Default for MockJbod {
    fn default() -> Self {
        Self::new()
    }
}

impl MockJbod {
    /// 未挂载、存储全 0 的服务端
    pub fn new() -> Self {
        Self {
            storage: alloc::vec![0u8; JBOD_TOTAL_SIZE as usize],
            mounted: false,
            disk: 0,
            block: 0,
            ops: Vec::new(),
            chunk: usize::MAX,
            broken: false,
            inbox: Vec::new(),
            outbox: VecDeque::new(),
        }
    }

    /// 每次只传输 `chunk` 字节
    pub fn with_chunk(chunk: usize) -> Self {
        Self {
            chunk,
            ..Self::new()
        }
    }

    /// 用确定的伪随机内容填满存储
    pub fn fill_pattern(&mut self) {
        for (i, b) in self.storage.iter_mut().enumerate() {
            *b = (i.wrapping_mul(31) ^ (i >> 8)) as u8;
        }
    }

    /// 直接读取某个块的存储内容
    pub fn block(&self, addr: BlockAddr) -> &[u8] {
        let start = addr.start_addr() as usize;
        &self.storage[start..start + JBOD_BLOCK_SIZE]
    }

    /// 已执行操作中某命令出现的次数
    pub fn count(&self, command: Command) -> usize {
        self.ops.iter().filter(|op| op.command == command).count()
    }

    /// 清空操作记录
    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }

    fn process_frames(&mut self) {
        while self.inbox.len() >= JBOD_HEADER_LEN {
            let mut raw = [0u8; JBOD_HEADER_LEN];
            raw.copy_from_slice(&self.inbox[..JBOD_HEADER_LEN]);
            let header = Header::decode(&raw);
            let length = header.length as usize;
            if self.inbox.len() < length {
                return;
            }

            let frame: Vec<u8> = self.inbox.drain(..length).collect();
            let mut payload = [0u8; JBOD_BLOCK_SIZE];
            if length == JBOD_FRAME_WITH_BLOCK_LEN {
                payload.copy_from_slice(&frame[JBOD_HEADER_LEN..]);
            }

            let (ret, data) = match Operation::decode(header.op) {
                Ok(op) => {
                    self.ops.push(op);
                    self.execute(op, &payload)
                }
                Err(_) => (RET_FAILURE, None),
            };

            let reply_len = if data.is_some() {
                JBOD_FRAME_WITH_BLOCK_LEN
            } else {
                JBOD_HEADER_LEN
            };
            let reply = Header {
                length: reply_len as u16,
                op: header.op,
                ret,
            };
            self.outbox.extend(reply.encode());
            if let Some(data) = data {
                self.outbox.extend(data);
            }
        }
    }

    fn execute(
        &mut self,
        op: Operation,
        payload: &[u8; JBOD_BLOCK_SIZE],
    ) -> (u16, Option<[u8; JBOD_BLOCK_SIZE]>) {
        match op.command {
            Command::Mount => {
                if self.mounted {
                    return (RET_FAILURE, None);
                }
                self.mounted = true;
                (0, None)
            }
            Command::Unmount => {
                if !self.mounted {
                    return (RET_FAILURE, None);
                }
                self.mounted = false;
                (0, None)
            }
            _ if !self.mounted => (RET_FAILURE, None),
            Command::SeekToDisk => {
                if op.disk >= JBOD_NUM_DISKS {
                    return (RET_FAILURE, None);
                }
                self.disk = op.disk;
                self.block = 0;
                (0, None)
            }
            Command::SeekToBlock => {
                if op.block >= JBOD_NUM_BLOCKS_PER_DISK {
                    return (RET_FAILURE, None);
                }
                self.block = op.block;
                (0, None)
            }
            Command::ReadBlock => {
                if self.block >= JBOD_NUM_BLOCKS_PER_DISK {
                    return (RET_FAILURE, None);
                }
                let start = BlockAddr::new(self.disk, self.block).start_addr() as usize;
                let mut data = [0u8; JBOD_BLOCK_SIZE];
                data.copy_from_slice(&self.storage[start..start + JBOD_BLOCK_SIZE]);
                self.block += 1;
                (0, Some(data))
            }
            Command::WriteBlock => {
                if self.block >= JBOD_NUM_BLOCKS_PER_DISK {
                    return (RET_FAILURE, None);
                }
                let start = BlockAddr::new(self.disk, self.block).start_addr() as usize;
                self.storage[start..start + JBOD_BLOCK_SIZE].copy_from_slice(payload);
                self.block += 1;
                (0, None)
            }
        }
    }
}

impl Transport for MockJbod {
    fn send(&mut self, buf: &[u8]) -> Result<usize> {
        if self.broken {
            return Err(Error::new(ErrorKind::Io, "mock transport broken"));
        }
        let n = buf.len().min(self.chunk);
        self.inbox.extend_from_slice(&buf[..n]);
        self.process_frames();
        Ok(n)
    }

    fn recv(&mut self, buf: &mut [u8]) -> Result<usize> {
        let n = buf.len().min(self.chunk).min(self.outbox.len());
        for (slot, byte) in buf.iter_mut().zip(self.outbox.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}
