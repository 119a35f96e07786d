//! 帧编解码
//!
//! 帧格式（整数均为大端序）：
//!
//! ```text
//! +-------------+-----------+-----------------+--------------------+
//! | length: u16 | op: u32   | return code: u16| block: [u8; 256]?  |
//! +-------------+-----------+-----------------+--------------------+
//! ```
//!
//! 请求只有 WriteBlock 携带块数据；应答只有 ReadBlock 成功时携带块数据。

use super::op::{command_bits, Command, Operation};
use super::transport::Transport;
use crate::{
    consts::{JBOD_BLOCK_SIZE, JBOD_FRAME_WITH_BLOCK_LEN, JBOD_HEADER_LEN},
    error::{Error, ErrorKind, Result},
};
use byteorder::{BigEndian, ByteOrder};

/// 帧头
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// 帧总长度（含帧头）
    pub length: u16,
    /// 原始操作字
    pub op: u32,
    /// 返回码，0 表示成功
    pub ret: u16,
}

impl Header {
    /// 编码帧头
    pub fn encode(&self) -> [u8; JBOD_HEADER_LEN] {
        let mut raw = [0u8; JBOD_HEADER_LEN];
        BigEndian::write_u16(&mut raw[0..2], self.length);
        BigEndian::write_u32(&mut raw[2..6], self.op);
        BigEndian::write_u16(&mut raw[6..8], self.ret);
        raw
    }

    /// 解码帧头
    pub fn decode(raw: &[u8; JBOD_HEADER_LEN]) -> Self {
        Self {
            length: BigEndian::read_u16(&raw[0..2]),
            op: BigEndian::read_u32(&raw[2..6]),
            ret: BigEndian::read_u16(&raw[6..8]),
        }
    }

    /// 帧是否携带块数据
    pub fn carries_block(&self) -> bool {
        self.length as usize == JBOD_FRAME_WITH_BLOCK_LEN
    }
}

/// 发送整个缓冲区
///
/// 部分发送时继续发送剩余部分，直到全部发出或传输层报错。
/// 一次发送 0 字节视为连接已断开。
pub fn send_all<T: Transport + ?Sized>(transport: &mut T, mut buf: &[u8]) -> Result<()> {
    while !buf.is_empty() {
        let n = transport.send(buf)?;
        if n == 0 {
            log::error!("[NET] send made no progress, {} bytes left", buf.len());
            return Err(Error::new(ErrorKind::Io, "connection closed while sending"));
        }
        buf = &buf[n..];
    }
    Ok(())
}

/// 接收恰好 `buf.len()` 字节
///
/// 部分接收时继续接收，直到填满或传输层报错；对端关闭视为错误。
pub fn recv_exact<T: Transport + ?Sized>(transport: &mut T, buf: &mut [u8]) -> Result<()> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = transport.recv(&mut buf[filled..])?;
        if n == 0 {
            log::error!("[NET] peer closed with {} bytes outstanding", buf.len() - filled);
            return Err(Error::new(ErrorKind::Io, "connection closed while receiving"));
        }
        filled += n;
    }
    Ok(())
}

/// 发送请求帧
///
/// 操作字中的命令为 WriteBlock 时附带 `block`，此时 `block` 必须提供。
pub fn send_packet<T: Transport + ?Sized>(
    transport: &mut T,
    op: u32,
    block: Option<&[u8; JBOD_BLOCK_SIZE]>,
) -> Result<()> {
    let mut frame = [0u8; JBOD_FRAME_WITH_BLOCK_LEN];

    let length = if command_bits(op) == Command::WriteBlock.code() {
        let block = block.ok_or(Error::new(
            ErrorKind::InvalidInput,
            "write-block request requires a block",
        ))?;
        frame[JBOD_HEADER_LEN..].copy_from_slice(block);
        JBOD_FRAME_WITH_BLOCK_LEN
    } else {
        JBOD_HEADER_LEN
    };

    let header = Header {
        length: length as u16,
        op,
        ret: 0,
    };
    frame[..JBOD_HEADER_LEN].copy_from_slice(&header.encode());

    log::trace!("[NET] send op={:#010x} len={}", op, length);
    send_all(transport, &frame[..length])
}

/// 接收应答帧
///
/// 长度为 8+256 且返回码为 0 时，把块数据读入 `block`；
/// 没有提供 `block` 时读出并丢弃，保持流同步。
///
/// # 错误
///
/// 传输失败返回 `Io`；长度既不是 8 也不是 8+256 时返回 `Protocol`
pub fn recv_packet<T: Transport + ?Sized>(
    transport: &mut T,
    block: Option<&mut [u8; JBOD_BLOCK_SIZE]>,
) -> Result<Header> {
    let mut raw = [0u8; JBOD_HEADER_LEN];
    recv_exact(transport, &mut raw)?;
    let header = Header::decode(&raw);
    log::trace!(
        "[NET] recv op={:#010x} len={} ret={}",
        header.op,
        header.length,
        header.ret
    );

    if header.carries_block() {
        if header.ret == 0 {
            match block {
                Some(block) => recv_exact(transport, block)?,
                None => {
                    let mut discard = [0u8; JBOD_BLOCK_SIZE];
                    recv_exact(transport, &mut discard)?;
                }
            }
        }
    } else if header.length as usize != JBOD_HEADER_LEN {
        log::error!("[NET] invalid frame length {}", header.length);
        return Err(Error::new(ErrorKind::Protocol, "invalid frame length"));
    }

    Ok(header)
}

/// 执行一次 JBOD 操作：发送一个请求，接收一个应答
///
/// `block` 对 WriteBlock 是要写入的数据，对 ReadBlock 是读出数据的目标。
///
/// # 错误
///
/// - 传输失败：`Io`
/// - 服务端返回非 0 返回码：`Protocol`
pub fn jbod_operation<T: Transport + ?Sized>(
    transport: &mut T,
    op: Operation,
    mut block: Option<&mut [u8; JBOD_BLOCK_SIZE]>,
) -> Result<()> {
    if !transport.is_connected() {
        return Err(Error::new(ErrorKind::Io, "transport not connected"));
    }

    let word = op.encode();
    send_packet(transport, word, block.as_deref())?;
    let header = recv_packet(transport, block.as_deref_mut())?;

    if header.op != word {
        log::warn!(
            "[NET] response op {:#010x} does not match request {:#010x}",
            header.op,
            word
        );
    }
    if header.ret != 0 {
        log::warn!("[NET] server rejected {:?} with code {}", op.command, header.ret);
        return Err(Error::new(ErrorKind::Protocol, "server rejected operation"));
    }
    Ok(())
}
