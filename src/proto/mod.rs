//! JBOD 线路协议
//!
//! proto/op.rs 负责 32 位操作字与结构化 [`Operation`] 之间的转换，
//! 引擎内部只传递 [`Operation`]。

//! proto/codec.rs 负责帧的编解码和"发一帧、收一帧"的请求/应答交换，
//! 所有整数按大端序写入线路。

//! proto/transport.rs 定义编解码器依赖的 [`Transport`]，以及 std 下的 TCP 实现。

mod codec;
mod op;
mod transport;

pub use codec::{jbod_operation, recv_exact, recv_packet, send_all, send_packet, Header};
pub use op::{command_bits, Command, Operation};
pub use transport::Transport;

#[cfg(feature = "std")]
pub use transport::TcpTransport;
