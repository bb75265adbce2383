//! G.729 帧切分族.
//!
//! 一个负载由零个或多个 10 字节语音帧组成, 末尾可以跟一个 2 字节的
//! SID (静音描述, Annex B) 帧. 帧大小随帧类型变化, 因此需要自定义切分器.
//! 编解码变换由外部实现提供, 本族不声明编码与解码.

use mpf_core::{MpfError, MpfResult, SampleRates};

use crate::attributes::CodecAttributes;
use crate::capabilities::CodecCapabilities;
use crate::codec::Codec;
use crate::descriptor::CodecDescriptor;
use crate::frame::CodecFrame;
use crate::manager::CodecFamily;

/// 语音帧大小 (10ms @ 8kbps)
pub const SPEECH_FRAME_SIZE: usize = 10;
/// SID 帧大小
pub const SID_FRAME_SIZE: usize = 2;

/// G.729 能力集
pub struct G729;

impl CodecCapabilities for G729 {
    fn dissect(
        &self,
        _codec: &mut Codec,
        buffer: &mut &[u8],
        frame: &mut CodecFrame,
    ) -> MpfResult<()> {
        let size = match buffer.len() {
            0 => return Err(MpfError::NeedMoreData),
            n if n >= SPEECH_FRAME_SIZE => SPEECH_FRAME_SIZE,
            SID_FRAME_SIZE => SID_FRAME_SIZE,
            n => {
                return Err(MpfError::InvalidData(format!(
                    "G.729 负载剩余 {} 字节, 既不是语音帧也不是 SID 帧",
                    n
                )));
            }
        };
        frame.set_size(size)?;
        let (head, tail) = buffer.split_at(size);
        frame.payload_mut().copy_from_slice(head);
        *buffer = tail;
        Ok(())
    }
}

/// G.729 注册条目 (静态负载类型 18)
pub fn family() -> CodecFamily {
    CodecFamily::new(
        G729,
        CodecAttributes::new("G729", 1, SampleRates::RATE_8000),
        Some(CodecDescriptor::new(18, "G729", 8000, 1)),
    )
}
