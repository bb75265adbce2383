//! 编解码描述符.
//!
//! 描述一个具体的媒体格式: 负载类型、编码名、采样率与声道数.
//! 静态负载类型 (小于 96) 的编解码族在注册时自带描述符, 动态格式则由协商产生.

use std::fmt;

use crate::attributes::CodecAttributes;

/// 第一个动态 RTP 负载类型, 小于该值的负载类型为静态分配
pub const RTP_PT_DYNAMIC: u8 = 96;

/// 帧时长基准 (毫秒)
pub const CODEC_FRAME_TIME_BASE: u32 = 10;

/// 线性 PCM 每个采样的字节数
pub const BYTES_PER_SAMPLE: u32 = 2;

/// 内部线性 PCM 格式的编码名
pub const LPCM_CODEC_NAME: &str = "LPCM";

/// 编解码描述符
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecDescriptor {
    /// RTP 负载类型
    pub payload_type: u8,
    /// 编码名 (如 "PCMU", "L16")
    pub name: String,
    /// 采样率 (Hz)
    pub sampling_rate: u16,
    /// 声道数
    pub channel_count: u8,
    /// 格式参数 (SDP fmtp), 可选
    pub format: Option<String>,
    /// 是否启用
    pub enabled: bool,
}

impl CodecDescriptor {
    /// 创建描述符, 默认启用且无格式参数
    pub fn new(
        payload_type: u8,
        name: impl Into<String>,
        sampling_rate: u16,
        channel_count: u8,
    ) -> Self {
        Self {
            payload_type,
            name: name.into(),
            sampling_rate,
            channel_count,
            format: None,
            enabled: true,
        }
    }

    /// 创建内部线性 PCM 描述符
    pub fn lpcm(sampling_rate: u16, channel_count: u8) -> Self {
        Self::new(RTP_PT_DYNAMIC, LPCM_CODEC_NAME, sampling_rate, channel_count)
    }

    /// 附加格式参数
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// 是否为静态负载类型
    pub fn is_static(&self) -> bool {
        self.payload_type < RTP_PT_DYNAMIC
    }

    /// 按族属性计算一帧编码数据的字节数
    ///
    /// `channels * bits_per_sample * frame_duration * rate / 1000 / 8`
    pub fn frame_size(&self, attributes: &CodecAttributes) -> usize {
        let bits = self.channel_count as usize
            * attributes.bits_per_sample as usize
            * attributes.frame_duration_ms as usize
            * self.sampling_rate as usize
            / 1000;
        bits / 8
    }

    /// 按族属性计算一帧解码后线性 PCM 的字节数
    pub fn linear_frame_size(&self, attributes: &CodecAttributes) -> usize {
        let samples = attributes.frame_duration_ms as usize * self.sampling_rate as usize / 1000;
        samples * self.channel_count as usize * BYTES_PER_SAMPLE as usize
    }

    /// 描述符是否匹配
    ///
    /// 双方都是静态负载类型时只比较负载类型; 否则比较编码名 (不区分大小写)、
    /// 采样率和声道数. 格式参数的比较交给 [`crate::CodecManager::descriptors_match`].
    pub fn matches(&self, other: &CodecDescriptor) -> bool {
        if self.is_static() && other.is_static() {
            return self.payload_type == other.payload_type;
        }
        self.name.eq_ignore_ascii_case(&other.name)
            && self.sampling_rate == other.sampling_rate
            && self.channel_count == other.channel_count
    }

    /// 是否为指定采样率和声道数的线性 PCM
    pub fn is_lpcm(&self, sampling_rate: u16, channel_count: u8) -> bool {
        self.name.eq_ignore_ascii_case(LPCM_CODEC_NAME)
            && self.sampling_rate == sampling_rate
            && self.channel_count == channel_count
    }

    /// 描述符是否能由指定族属性处理
    pub fn matches_attributes(&self, attributes: &CodecAttributes) -> bool {
        attributes.name_matches(&self.name) && attributes.supports_rate(self.sampling_rate)
    }
}

impl fmt::Display for CodecDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.name, self.payload_type, self.sampling_rate, self.channel_count
        )?;
        if let Some(format) = &self.format {
            write!(f, " [{format}]")?;
        }
        Ok(())
    }
}

/// 计算一帧线性 PCM (10ms) 的字节数
pub fn linear_frame_size(sampling_rate: u16, channel_count: u8) -> usize {
    channel_count as usize
        * BYTES_PER_SAMPLE as usize
        * CODEC_FRAME_TIME_BASE as usize
        * sampling_rate as usize
        / 1000
}
