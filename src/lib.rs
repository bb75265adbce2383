//! # mpf
//!
//! 纯 Rust 实现的可插拔音频编解码抽象, 面向 RTP 媒体处理管线.
//!
//! 媒体管线只与统一的编解码器接口打交道: 按帧切分 RTP 负载, 编码/解码,
//! 以及在欠载时填充静音帧. 具体的压缩算法由注册到管理器中的编解码族提供.
//!
//! # 快速开始
//!
//! ```rust
//! use mpf::codec::CodecFrame;
//!
//! let manager = mpf::default_codec_manager();
//! let mut codec = manager.find("PCMA").unwrap().create_codec();
//!
//! let mut frame = CodecFrame::new(80);
//! codec.fill(&mut frame).unwrap();
//! assert!(frame.payload().iter().all(|&b| b == 0xD5));
//! ```
//!
//! # Crate 结构
//!
//! | Crate | 功能 |
//! |-------|------|
//! | `mpf-core` | 错误类型与采样率集合 |
//! | `mpf-codec` | 编解码器抽象、内置编解码族与注册表 |

/// 核心类型
pub use mpf_core as core;

/// 编解码器抽象
pub use mpf_codec as codec;

pub mod config;
pub mod logging;

/// 获取 mpf 版本号
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// 创建已注册所有内置编解码族的管理器
pub fn default_codec_manager() -> mpf_codec::CodecManager {
    let mut manager = mpf_codec::CodecManager::new();
    mpf_codec::register_all(&mut manager);
    manager
}
