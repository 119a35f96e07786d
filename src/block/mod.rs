//! 块 I/O 引擎
//!
//! 把任意字节范围的读写拆成 256 字节块操作。
//! block/device.rs 提供会话对象：挂载状态、缓存、服务端位置跟踪和单块收发，
//! 单块收发只在位置变化时才发出 seek 操作

//! block/io.rs 提供字节范围读写：读时每块先查缓存，未命中则从服务端读取并填充缓存；
//! 写时总是整块写穿到服务端，部分写先取得块的原内容，已缓存的块通过 update 保持一致

mod device;
mod io;

#[cfg(test)]
pub(crate) mod mock;

pub use device::JbodDev;
