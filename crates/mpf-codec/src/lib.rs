//! # mpf-codec
//!
//! 可插拔的音频编解码器抽象. 媒体管线通过统一的 [`Codec`] 完成编码、解码与
//! 帧切分 (dissect), 无需关心具体压缩算法.
//!
//! - [`CodecCapabilities`]: 编解码族实现的操作集合, 每个操作都有明确的默认行为
//! - [`Codec`]: 共享能力集/属性/描述符, 独占编码器与解码器状态
//! - [`CodecManager`]: 编解码族注册表, 负责查找、创建与编解码列表解析
//!
//! ## 使用示例
//!
//! ```rust
//! use mpf_codec::{CodecFrame, CodecManager};
//!
//! let mut manager = CodecManager::new();
//! mpf_codec::register_all(&mut manager);
//!
//! let family = manager.find("PCMU").unwrap();
//! let mut codec = family.create_codec();
//! codec.open_decoder().unwrap();
//!
//! // 一个 RTP 负载中携带两帧 10ms 的 PCMU 数据
//! let payload = vec![0xFFu8; 160];
//! let mut buffer = payload.as_slice();
//! let mut frame = CodecFrame::new(80);
//! while codec.dissect(&mut buffer, &mut frame).is_ok() {
//!     let mut pcm = CodecFrame::new(160);
//!     codec.decode(&frame, &mut pcm).unwrap();
//! }
//! assert!(buffer.is_empty());
//! ```

pub mod attributes;
pub mod capabilities;
pub mod codec;
pub mod codecs;
pub mod descriptor;
pub mod frame;
pub mod manager;

// 重导出常用类型
pub use attributes::CodecAttributes;
pub use capabilities::{CodecCapabilities, default_dissect, default_fill};
pub use codec::{Codec, CodecState};
pub use descriptor::{CodecDescriptor, RTP_PT_DYNAMIC, linear_frame_size};
pub use frame::CodecFrame;
pub use manager::{CodecFamily, CodecManager};

/// 注册所有内置编解码族
pub fn register_all(manager: &mut CodecManager) {
    codecs::register_all_codecs(manager);
}
