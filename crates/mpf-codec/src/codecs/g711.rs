//! G.711 编解码族 (PCMU / PCMA).
//!
//! 8 位对数压扩, 8 kHz 单声道. 编码输入与解码输出均为小端 S16 线性 PCM.
//! 对数压扩下全零字节并不是静音, 因此两个族都覆盖了静音填充.

use byteorder::{ByteOrder, LittleEndian};
use mpf_core::{MpfError, MpfResult, SampleRates};

use crate::attributes::CodecAttributes;
use crate::capabilities::CodecCapabilities;
use crate::codec::Codec;
use crate::descriptor::CodecDescriptor;
use crate::frame::CodecFrame;
use crate::manager::CodecFamily;

/// µ-law 偏置
const ULAW_BIAS: i32 = 0x84;
/// µ-law 压扩前的限幅值
const ULAW_CLIP: i32 = 32635;
/// A-law 各段的上界 (13 位幅度)
const ALAW_SEG_END: [i32; 8] = [0x1F, 0x3F, 0x7F, 0xFF, 0x1FF, 0x3FF, 0x7FF, 0xFFF];

/// µ-law 静音码字
pub const ULAW_SILENCE: u8 = 0xFF;
/// A-law 静音码字
pub const ALAW_SILENCE: u8 = 0xD5;

/// 16 位线性采样压扩为 µ-law
pub fn linear_to_ulaw(sample: i16) -> u8 {
    let mut pcm = sample as i32;
    let sign = if pcm < 0 {
        pcm = -pcm;
        0x80
    } else {
        0
    };
    pcm = pcm.min(ULAW_CLIP) + ULAW_BIAS;

    // 段号即最高有效位相对 bit 7 的偏移
    let mut exponent = 7;
    let mut mask = 0x4000;
    while exponent > 0 && pcm & mask == 0 {
        exponent -= 1;
        mask >>= 1;
    }
    let mantissa = (pcm >> (exponent + 3)) & 0x0F;
    !(sign | (exponent << 4) | mantissa) as u8
}

/// µ-law 展开为 16 位线性采样
pub fn ulaw_to_linear(code: u8) -> i16 {
    let code = !code;
    let exponent = ((code >> 4) & 0x07) as i32;
    let mantissa = (code & 0x0F) as i32;
    let magnitude = (((mantissa << 3) + ULAW_BIAS) << exponent) - ULAW_BIAS;
    if code & 0x80 != 0 {
        -magnitude as i16
    } else {
        magnitude as i16
    }
}

/// 16 位线性采样压扩为 A-law
pub fn linear_to_alaw(sample: i16) -> u8 {
    let mut pcm = (sample as i32) >> 3;
    let mask = if pcm >= 0 {
        0xD5
    } else {
        pcm = -pcm - 1;
        0x55
    };

    let Some(segment) = ALAW_SEG_END.iter().position(|&end| pcm <= end) else {
        // 超出最大段, 取最大幅度
        return (0x7F ^ mask) as u8;
    };
    let quant = if segment < 2 {
        (pcm >> 1) & 0x0F
    } else {
        (pcm >> segment) & 0x0F
    };
    (((segment as i32) << 4 | quant) ^ mask) as u8
}

/// A-law 展开为 16 位线性采样
pub fn alaw_to_linear(code: u8) -> i16 {
    let code = code ^ 0x55;
    let mut magnitude = ((code & 0x0F) as i32) << 4;
    let segment = ((code & 0x70) >> 4) as i32;
    match segment {
        0 => magnitude += 8,
        1 => magnitude += 0x108,
        _ => {
            magnitude += 0x108;
            magnitude <<= segment - 1;
        }
    }
    if code & 0x80 != 0 {
        magnitude as i16
    } else {
        -magnitude as i16
    }
}

/// 压扩律
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum G711Law {
    /// µ-law (PCMU)
    MuLaw,
    /// A-law (PCMA)
    ALaw,
}

impl G711Law {
    fn compress(self, sample: i16) -> u8 {
        match self {
            Self::MuLaw => linear_to_ulaw(sample),
            Self::ALaw => linear_to_alaw(sample),
        }
    }

    fn expand(self, code: u8) -> i16 {
        match self {
            Self::MuLaw => ulaw_to_linear(code),
            Self::ALaw => alaw_to_linear(code),
        }
    }

    /// 静音码字
    pub fn silence(self) -> u8 {
        match self {
            Self::MuLaw => ULAW_SILENCE,
            Self::ALaw => ALAW_SILENCE,
        }
    }
}

/// G.711 能力集
pub struct G711 {
    law: G711Law,
}

impl G711 {
    pub fn new(law: G711Law) -> Self {
        Self { law }
    }
}

impl CodecCapabilities for G711 {
    fn encode(
        &self,
        _codec: &mut Codec,
        frame_in: &CodecFrame,
        frame_out: &mut CodecFrame,
    ) -> MpfResult<()> {
        if frame_in.size() % 2 != 0 {
            return Err(MpfError::InvalidData(format!(
                "线性 PCM 帧大小 {} 不是 2 的整数倍",
                frame_in.size()
            )));
        }
        frame_out.set_size(frame_in.size() / 2)?;
        for (src, dst) in frame_in
            .payload()
            .chunks_exact(2)
            .zip(frame_out.payload_mut().iter_mut())
        {
            *dst = self.law.compress(LittleEndian::read_i16(src));
        }
        Ok(())
    }

    fn decode(
        &self,
        _codec: &mut Codec,
        frame_in: &CodecFrame,
        frame_out: &mut CodecFrame,
    ) -> MpfResult<()> {
        frame_out.set_size(frame_in.size() * 2)?;
        for (&src, dst) in frame_in
            .payload()
            .iter()
            .zip(frame_out.payload_mut().chunks_exact_mut(2))
        {
            LittleEndian::write_i16(dst, self.law.expand(src));
        }
        Ok(())
    }

    fn fill(&self, _codec: &mut Codec, frame_out: &mut CodecFrame) -> MpfResult<()> {
        frame_out.payload_mut().fill(self.law.silence());
        Ok(())
    }

    fn transcodes(&self) -> bool {
        true
    }
}

/// PCMU 注册条目 (静态负载类型 0)
pub fn pcmu_family() -> CodecFamily {
    CodecFamily::new(
        G711::new(G711Law::MuLaw),
        CodecAttributes::new("PCMU", 8, SampleRates::RATE_8000),
        Some(CodecDescriptor::new(0, "PCMU", 8000, 1)),
    )
}

/// PCMA 注册条目 (静态负载类型 8)
pub fn pcma_family() -> CodecFamily {
    CodecFamily::new(
        G711::new(G711Law::ALaw),
        CodecAttributes::new("PCMA", 8, SampleRates::RATE_8000),
        Some(CodecDescriptor::new(8, "PCMA", 8000, 1)),
    )
}
