//! 采样率掩码定义.
//!
//! 编解码族通过掩码声明自己支持的采样率集合, 协商层据此过滤描述符.

use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// 采样率位掩码, 每个位代表一个受支持的采样率
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SampleRates: u32 {
        /// 8 kHz (窄带电话)
        const RATE_8000  = 1 << 0;
        /// 16 kHz (宽带)
        const RATE_16000 = 1 << 1;
        /// 32 kHz (超宽带)
        const RATE_32000 = 1 << 2;
        /// 48 kHz (全频带)
        const RATE_48000 = 1 << 3;
    }
}

impl SampleRates {
    /// 框架支持的全部采样率
    pub const SUPPORTED: Self = Self::RATE_8000
        .union(Self::RATE_16000)
        .union(Self::RATE_32000)
        .union(Self::RATE_48000);

    /// 将采样率 (Hz) 转换为单个掩码位, 不支持的采样率返回空掩码
    pub const fn from_rate(rate: u16) -> Self {
        match rate {
            8000 => Self::RATE_8000,
            16000 => Self::RATE_16000,
            32000 => Self::RATE_32000,
            48000 => Self::RATE_48000,
            _ => Self::empty(),
        }
    }

    /// 判断是否支持指定采样率
    pub fn supports(&self, rate: u16) -> bool {
        let bit = Self::from_rate(rate);
        !bit.is_empty() && self.contains(bit)
    }

    /// 按升序列出掩码中的采样率 (Hz)
    pub fn rates(&self) -> Vec<u16> {
        [
            (Self::RATE_8000, 8000),
            (Self::RATE_16000, 16000),
            (Self::RATE_32000, 32000),
            (Self::RATE_48000, 48000),
        ]
        .iter()
        .filter(|(bit, _)| self.contains(*bit))
        .map(|(_, rate)| *rate)
        .collect()
    }
}

impl fmt::Display for SampleRates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rates = self.rates();
        if rates.is_empty() {
            return write!(f, "none");
        }
        let names: Vec<String> = rates.iter().map(|r| r.to_string()).collect();
        write!(f, "{}", names.join("|"))
    }
}
