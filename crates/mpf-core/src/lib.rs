//! # mpf-core
//!
//! mpf 音频编解码框架核心库, 提供采样率掩码、错误类型等基础设施.
//!
//! 上层的 `mpf-codec` 在此基础上定义编解码器抽象与帧切分协议.

pub mod error;
pub mod sample_rate;

// 重导出常用类型
pub use error::{MpfError, MpfResult};
pub use sample_rate::SampleRates;
