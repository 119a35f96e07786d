//! 传输层接口
//!
//! 编解码器只依赖 [`Transport`]：一次调用可以只传输部分字节，
//! 凑齐整帧的重试循环由编解码器负责。

use crate::error::Result;

/// 字节流传输接口
///
/// 实现此 trait 以提供到 JBOD 服务端的已连接字节流。
///
/// # 示例
///
/// ```rust,ignore
/// use jbod_core::{proto::Transport, Result};
///
/// struct MyChannel {
///     // ...
/// }
///
/// impl Transport for MyChannel {
///     fn send(&mut self, buf: &[u8]) -> Result<usize> {
///         // 发送尽可能多的字节
///         Ok(buf.len())
///     }
///
///     fn recv(&mut self, buf: &mut [u8]) -> Result<usize> {
///         // 接收至少一个字节，对端关闭时返回 0
///         Ok(buf.len())
///     }
/// }
/// ```
pub trait Transport {
    /// 发送字节
    ///
    /// # 返回
    ///
    /// 成功返回实际发送的字节数（可能少于 `buf.len()`）
    fn send(&mut self, buf: &[u8]) -> Result<usize>;

    /// 接收字节
    ///
    /// # 返回
    ///
    /// 成功返回实际接收的字节数；返回 0 表示对端已关闭
    fn recv(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// 是否已连接
    fn is_connected(&self) -> bool {
        true
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn send(&mut self, buf: &[u8]) -> Result<usize> {
        (**self).send(buf)
    }

    fn recv(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).recv(buf)
    }

    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }
}

impl<T: Transport + ?Sized> Transport for alloc::boxed::Box<T> {
    fn send(&mut self, buf: &[u8]) -> Result<usize> {
        (**self).send(buf)
    }

    fn recv(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).recv(buf)
    }

    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }
}

#[cfg(feature = "std")]
mod tcp {
    use super::Transport;
    use crate::error::{Error, ErrorKind, Result};
    use std::io::{self, Read, Write};
    use std::net::{Shutdown, TcpStream};

    /// TCP 传输
    ///
    /// 持有到 JBOD 服务端的连接，`disconnect` 之后所有收发都失败。
    #[derive(Debug, Default)]
    pub struct TcpTransport {
        stream: Option<TcpStream>,
    }

    impl TcpTransport {
        /// 连接到 `ip:port`
        pub fn connect(ip: &str, port: u16) -> Result<Self> {
            let stream = TcpStream::connect((ip, port))?;
            // 每次请求都等待应答，关闭 Nagle 避免小帧被延迟
            stream.set_nodelay(true)?;
            log::debug!("[NET] connected to {}:{}", ip, port);
            Ok(Self {
                stream: Some(stream),
            })
        }

        /// 使用已建立的连接
        pub fn from_stream(stream: TcpStream) -> Self {
            Self {
                stream: Some(stream),
            }
        }

        /// 断开连接
        ///
        /// 重复调用无副作用。
        pub fn disconnect(&mut self) {
            if let Some(stream) = self.stream.take() {
                let _ = stream.shutdown(Shutdown::Both);
                log::debug!("[NET] disconnected");
            }
        }

        fn stream(&mut self) -> Result<&mut TcpStream> {
            self.stream
                .as_mut()
                .ok_or(Error::new(ErrorKind::Io, "transport not connected"))
        }
    }

    impl Transport for TcpTransport {
        fn send(&mut self, buf: &[u8]) -> Result<usize> {
            let stream = self.stream()?;
            loop {
                match stream.write(buf) {
                    Ok(n) => return Ok(n),
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e.into()),
                }
            }
        }

        fn recv(&mut self, buf: &mut [u8]) -> Result<usize> {
            let stream = self.stream()?;
            loop {
                match stream.read(buf) {
                    Ok(n) => return Ok(n),
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e.into()),
                }
            }
        }

        fn is_connected(&self) -> bool {
            self.stream.is_some()
        }
    }
}

#[cfg(feature = "std")]
pub use tcp::TcpTransport;
