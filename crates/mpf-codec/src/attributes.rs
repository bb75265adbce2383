//! 编解码族属性.
//!
//! 同一编解码族的所有实例共享一份属性, 注册后不再修改.

use mpf_core::SampleRates;

use crate::descriptor::CODEC_FRAME_TIME_BASE;

/// 编解码族属性 (能力元数据)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecAttributes {
    /// 编解码器名称 (与 SDP rtpmap 中的编码名一致, 如 "PCMU")
    pub name: String,
    /// 每个采样的编码位数
    pub bits_per_sample: u8,
    /// 支持的采样率集合
    pub sample_rates: SampleRates,
    /// 帧时长 (毫秒)
    pub frame_duration_ms: u32,
}

impl CodecAttributes {
    /// 创建属性, 帧时长取默认的 10ms
    pub fn new(name: impl Into<String>, bits_per_sample: u8, sample_rates: SampleRates) -> Self {
        Self {
            name: name.into(),
            bits_per_sample,
            sample_rates,
            frame_duration_ms: CODEC_FRAME_TIME_BASE,
        }
    }

    /// 指定帧时长
    pub fn with_frame_duration(mut self, frame_duration_ms: u32) -> Self {
        self.frame_duration_ms = frame_duration_ms;
        self
    }

    /// 是否支持指定采样率
    pub fn supports_rate(&self, rate: u16) -> bool {
        self.sample_rates.supports(rate)
    }

    /// 名称是否匹配 (不区分大小写)
    pub fn name_matches(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_默认帧时长() {
        let attribs = CodecAttributes::new("PCMU", 8, SampleRates::RATE_8000);
        assert_eq!(attribs.frame_duration_ms, 10);
        assert_eq!(attribs.with_frame_duration(20).frame_duration_ms, 20);
    }

    #[test]
    fn test_名称与采样率匹配() {
        let attribs = CodecAttributes::new("L16", 16, SampleRates::SUPPORTED);
        assert!(attribs.name_matches("l16"));
        assert!(!attribs.name_matches("L8"));
        assert!(attribs.supports_rate(16000));
        assert!(!attribs.supports_rate(22050));
    }
}
