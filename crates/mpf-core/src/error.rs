//! 统一错误类型定义.
//!
//! 所有 mpf crate 共用的错误类型. 编解码操作在语义上只有成功/失败两种结果,
//! 变体携带的信息仅用于日志与诊断, 核心层不对其做任何重试.

use thiserror::Error;

/// mpf 框架统一错误类型
#[derive(Debug, Error)]
pub enum MpfError {
    /// 无效参数 (如零长度帧、超出缓冲区容量的帧大小)
    #[error("无效参数: {0}")]
    InvalidArgument(String),

    /// 编解码器错误 (由具体编解码族上报)
    #[error("编解码器错误: {0}")]
    Codec(String),

    /// I/O 错误
    #[error("I/O 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 数据不足, 缓冲区中没有完整的一帧
    #[error("数据不足, 需要更多输入")]
    NeedMoreData,

    /// 无效数据 (损坏或截断的码流)
    #[error("无效数据: {0}")]
    InvalidData(String),

    /// 未找到指定的编解码器
    #[error("未找到编解码器: {0}")]
    CodecNotFound(String),

    /// 配置错误 (如编解码列表语法错误)
    #[error("配置错误: {0}")]
    Config(String),
}

/// mpf 框架统一 Result 类型
pub type MpfResult<T> = Result<T, MpfError>;
