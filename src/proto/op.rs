//! 操作字编解码
//!
//! 32 位操作字布局：
//!
//! ```text
//!  31    28 27          20 19      14 13          0
//! +--------+--------------+----------+-------------+
//! |  disk  |    block     | command  |  reserved   |
//! +--------+--------------+----------+-------------+
//! ```

use crate::error::{Error, ErrorKind, Result};

const OP_COMMAND_SHIFT: u32 = 14;
const OP_COMMAND_MASK: u32 = 0x3f;
const OP_BLOCK_SHIFT: u32 = 20;
const OP_BLOCK_MASK: u32 = 0xff;
const OP_DISK_SHIFT: u32 = 28;
const OP_DISK_MASK: u32 = 0x0f;

/// JBOD 命令
///
/// 数值是与服务端约定的线路常量。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Command {
    /// 挂载阵列
    Mount = 0,
    /// 卸载阵列
    Unmount = 1,
    /// 定位到磁盘（块位置归零）
    SeekToDisk = 2,
    /// 定位到当前磁盘内的块
    SeekToBlock = 3,
    /// 读取当前块，块位置 +1
    ReadBlock = 4,
    /// 写入当前块，块位置 +1
    WriteBlock = 5,
}

impl Command {
    /// 命令的线路编码
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// 从线路编码解析命令
    pub fn from_code(code: u32) -> Result<Self> {
        match code {
            0 => Ok(Command::Mount),
            1 => Ok(Command::Unmount),
            2 => Ok(Command::SeekToDisk),
            3 => Ok(Command::SeekToBlock),
            4 => Ok(Command::ReadBlock),
            5 => Ok(Command::WriteBlock),
            _ => Err(Error::new(ErrorKind::Protocol, "unknown command code")),
        }
    }
}

/// 结构化的操作
///
/// 引擎内部只使用这个结构，只在线路边界上调用 [`Operation::encode`] /
/// [`Operation::decode`]。未用到的字段保持为 0。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    /// 命令
    pub command: Command,
    /// 磁盘号（仅 SeekToDisk 使用）
    pub disk: u32,
    /// 块号（仅 SeekToBlock 使用）
    pub block: u32,
}

impl Operation {
    /// 创建操作
    pub const fn new(command: Command, disk: u32, block: u32) -> Self {
        Self {
            command,
            disk,
            block,
        }
    }

    /// 挂载
    pub const fn mount() -> Self {
        Self::new(Command::Mount, 0, 0)
    }

    /// 卸载
    pub const fn unmount() -> Self {
        Self::new(Command::Unmount, 0, 0)
    }

    /// 定位到磁盘
    pub const fn seek_to_disk(disk: u32) -> Self {
        Self::new(Command::SeekToDisk, disk, 0)
    }

    /// 定位到块
    pub const fn seek_to_block(block: u32) -> Self {
        Self::new(Command::SeekToBlock, 0, block)
    }

    /// 读当前块
    pub const fn read_block() -> Self {
        Self::new(Command::ReadBlock, 0, 0)
    }

    /// 写当前块
    pub const fn write_block() -> Self {
        Self::new(Command::WriteBlock, 0, 0)
    }

    /// 编码为 32 位操作字
    pub const fn encode(&self) -> u32 {
        (self.command.code() & OP_COMMAND_MASK) << OP_COMMAND_SHIFT
            | (self.disk & OP_DISK_MASK) << OP_DISK_SHIFT
            | (self.block & OP_BLOCK_MASK) << OP_BLOCK_SHIFT
    }

    /// 从 32 位操作字解码
    ///
    /// 保留位被忽略。
    pub fn decode(word: u32) -> Result<Self> {
        Ok(Self {
            command: Command::from_code(command_bits(word))?,
            disk: (word >> OP_DISK_SHIFT) & OP_DISK_MASK,
            block: (word >> OP_BLOCK_SHIFT) & OP_BLOCK_MASK,
        })
    }
}

/// 操作字中的命令字段（未校验）
#[inline]
pub const fn command_bits(word: u32) -> u32 {
    (word >> OP_COMMAND_SHIFT) & OP_COMMAND_MASK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_layout() {
        assert_eq!(Operation::mount().encode(), 0);
        assert_eq!(Operation::unmount().encode(), 1u32 << 14);
        assert_eq!(Operation::seek_to_disk(15).encode(), (2u32 << 14) | (0xfu32 << 28));
        assert_eq!(Operation::seek_to_block(255).encode(), (3u32 << 14) | (0xffu32 << 20));
        assert_eq!(Operation::read_block().encode(), 4u32 << 14);
        assert_eq!(Operation::write_block().encode(), 5u32 << 14);
    }

    #[test]
    fn test_encode_does_not_bleed_between_fields() {
        let op = Operation::new(Command::WriteBlock, 0xf, 0xff);
        let word = op.encode();
        assert_eq!(word & 0x3fff, 0);
        assert_eq!(word, 0xfff1_4000);
        assert_eq!(Operation::decode(word).unwrap(), op);
    }

    #[test]
    fn test_decode_ignores_reserved_bits() {
        let word = Operation::seek_to_disk(7).encode() | 0x1234;
        assert_eq!(Operation::decode(word).unwrap(), Operation::seek_to_disk(7));
    }

    #[test]
    fn test_decode_unknown_command() {
        let word = 0x3fu32 << 14;
        assert_eq!(Operation::decode(word).unwrap_err().kind(), ErrorKind::Protocol);
        assert_eq!(command_bits(word), 0x3f);
    }
}
