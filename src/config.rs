//! 客户端配置

use crate::consts::{
    CACHE_MAX_ENTRIES, CACHE_MIN_ENTRIES, DEFAULT_CACHE_ENTRIES, JBOD_PORT, JBOD_SERVER,
};
use crate::error::{Error, ErrorKind, Result};
use alloc::string::{String, ToString};

/// JBOD 客户端配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JbodConfig {
    /// 服务端地址
    pub server: String,
    /// 服务端端口
    pub port: u16,
    /// 缓存条目数，0 表示不使用缓存
    pub cache_entries: usize,
}

impl Default for JbodConfig {
    fn default() -> Self {
        Self {
            server: JBOD_SERVER.to_string(),
            port: JBOD_PORT,
            cache_entries: DEFAULT_CACHE_ENTRIES,
        }
    }
}

impl JbodConfig {
    /// 不使用缓存的默认配置
    pub fn without_cache() -> Self {
        Self {
            cache_entries: 0,
            ..Self::default()
        }
    }

    /// 检查配置
    ///
    /// 缓存条目数必须为 0 或位于 [2, 4096]。
    pub fn validate(&self) -> Result<()> {
        if self.cache_entries != 0
            && !(CACHE_MIN_ENTRIES..=CACHE_MAX_ENTRIES).contains(&self.cache_entries)
        {
            return Err(Error::new(
                ErrorKind::Initialization,
                "cache entries must be 0 or within [2, 4096]",
            ));
        }
        if self.server.is_empty() {
            return Err(Error::new(ErrorKind::InvalidInput, "server address is empty"));
        }
        Ok(())
    }
}
