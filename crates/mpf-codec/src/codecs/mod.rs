//! 内置编解码族.
//!
//! 只包含变换足够简单、可以直接表达的族; 复杂压缩算法由外部族通过
//! [`CodecManager::register`] 接入.

pub mod g711;
pub mod g729;
pub mod l16;

use crate::manager::CodecManager;

/// 注册所有内置编解码族
pub fn register_all_codecs(manager: &mut CodecManager) {
    manager.register(l16::family());
    manager.register(g711::pcmu_family());
    manager.register(g711::pcma_family());
    manager.register(g729::family());
}
