//! L16 线性 PCM 编解码族.
//!
//! 线上格式为网络字节序 (大端) 的 16 位有符号采样, 内部线性 PCM 为小端.
//! 编码与解码都只做字节序转换, 没有实例状态, 因此不实现任何生命周期方法.

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use mpf_core::{MpfError, MpfResult, SampleRates};

use crate::attributes::CodecAttributes;
use crate::capabilities::CodecCapabilities;
use crate::codec::Codec;
use crate::frame::CodecFrame;
use crate::manager::CodecFamily;

/// 编码名
pub const L16_CODEC_NAME: &str = "L16";

/// L16 能力集
pub struct L16;

/// 校验输入为整数个采样, 且输出缓冲区放得下
fn prepare_output(frame_in: &CodecFrame, frame_out: &mut CodecFrame) -> MpfResult<()> {
    if frame_in.size() % 2 != 0 {
        return Err(MpfError::InvalidData(format!(
            "L16 帧大小 {} 不是 2 的整数倍",
            frame_in.size()
        )));
    }
    frame_out.set_size(frame_in.size())
}

impl CodecCapabilities for L16 {
    fn encode(
        &self,
        _codec: &mut Codec,
        frame_in: &CodecFrame,
        frame_out: &mut CodecFrame,
    ) -> MpfResult<()> {
        prepare_output(frame_in, frame_out)?;
        for (src, dst) in frame_in
            .payload()
            .chunks_exact(2)
            .zip(frame_out.payload_mut().chunks_exact_mut(2))
        {
            BigEndian::write_i16(dst, LittleEndian::read_i16(src));
        }
        Ok(())
    }

    fn decode(
        &self,
        _codec: &mut Codec,
        frame_in: &CodecFrame,
        frame_out: &mut CodecFrame,
    ) -> MpfResult<()> {
        prepare_output(frame_in, frame_out)?;
        for (src, dst) in frame_in
            .payload()
            .chunks_exact(2)
            .zip(frame_out.payload_mut().chunks_exact_mut(2))
        {
            LittleEndian::write_i16(dst, BigEndian::read_i16(src));
        }
        Ok(())
    }

    fn transcodes(&self) -> bool {
        true
    }
}

/// L16 注册条目 (动态负载类型, 无静态描述符)
pub fn family() -> CodecFamily {
    CodecFamily::new(
        L16,
        CodecAttributes::new(L16_CODEC_NAME, 16, SampleRates::SUPPORTED),
        None,
    )
}
