//! 编解码帧 (CodecFrame).
//!
//! 一帧编码或解码后的音频负载, 由缓冲区和声明大小组成.
//! 时间戳与时长由上层管线自行维护, 帧本身只描述字节范围.

use bytes::Bytes;
use mpf_core::{MpfError, MpfResult};

/// 编解码帧
///
/// `size` 既是输入约束 ("期望有这么多有效字节"), 也是输出契约
/// ("实际产出了这么多字节"). 缓冲区长度即容量, `size` 永远不会超过容量.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecFrame {
    /// 帧缓冲区, 长度即容量
    buffer: Vec<u8>,
    /// 声明大小 (字节)
    size: usize,
}

impl CodecFrame {
    /// 创建指定容量的全零帧, 声明大小等于容量
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: vec![0; capacity],
            size: capacity,
        }
    }

    /// 从已有负载创建帧, 容量与声明大小都等于负载长度
    pub fn from_payload(data: impl Into<Vec<u8>>) -> Self {
        let buffer = data.into();
        let size = buffer.len();
        Self { buffer, size }
    }

    /// 声明大小 (字节)
    pub fn size(&self) -> usize {
        self.size
    }

    /// 缓冲区容量 (字节)
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// 修改声明大小
    ///
    /// 超出容量时返回 `InvalidArgument`, 声明大小保持不变.
    pub fn set_size(&mut self, size: usize) -> MpfResult<()> {
        if size > self.buffer.len() {
            return Err(MpfError::InvalidArgument(format!(
                "帧大小 {} 超出缓冲区容量 {}",
                size,
                self.buffer.len(),
            )));
        }
        self.size = size;
        Ok(())
    }

    /// 声明范围内的负载
    pub fn payload(&self) -> &[u8] {
        &self.buffer[..self.size]
    }

    /// 声明范围内的可写负载
    pub fn payload_mut(&mut self) -> &mut [u8] {
        &mut self.buffer[..self.size]
    }

    /// 整个缓冲区 (包括声明范围之外的字节)
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    /// 复制负载为 `Bytes`, 便于交给传输层
    pub fn to_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(self.payload())
    }

    /// 声明大小是否为 0
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}
