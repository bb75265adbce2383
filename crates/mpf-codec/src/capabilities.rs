//! 编解码族操作集合 (能力集).
//!
//! 每个编解码族实现 [`CodecCapabilities`] trait. 所有方法都带有默认实现,
//! 默认实现就是"族未声明该操作"时的规定行为:
//!
//! | 操作 | 默认行为 |
//! |------|----------|
//! | 打开/关闭编码器、解码器 | 直接成功, 无副作用 |
//! | 编码/解码 | 直接成功, 输出帧保持原样 |
//! | 切分 | 按 `frame.size` 固定大小切分 ([`default_dissect`]) |
//! | 静音填充 | 声明范围全部置零 ([`default_fill`]) |
//! | 格式匹配 | 返回 `None`, 由协商层退回到精确比较 |
//! | 是否声明编解码变换 | `false` |
//!
//! 无状态的编解码族 (如线性 PCM) 可以省略全部生命周期方法.

use mpf_core::{MpfError, MpfResult};

use crate::codec::Codec;
use crate::frame::CodecFrame;

/// 编解码族操作集合
///
/// 同一族的所有 [`Codec`] 实例共享同一个能力集对象, 因此实现必须是
/// `Send + Sync` 且不持有可变的实例状态; 实例状态存放在 `Codec` 的
/// 编码器/解码器状态槽中.
pub trait CodecCapabilities: Send + Sync {
    /// 打开编码器, 通常在此创建编码器状态 ([`Codec::set_encoder_state`])
    fn open_encoder(&self, _codec: &mut Codec) -> MpfResult<()> {
        Ok(())
    }

    /// 关闭编码器, 释放打开时获取的资源
    fn close_encoder(&self, _codec: &mut Codec) -> MpfResult<()> {
        Ok(())
    }

    /// 打开解码器
    fn open_decoder(&self, _codec: &mut Codec) -> MpfResult<()> {
        Ok(())
    }

    /// 关闭解码器
    fn close_decoder(&self, _codec: &mut Codec) -> MpfResult<()> {
        Ok(())
    }

    /// 编码一帧
    ///
    /// 默认实现不触碰 `frame_out`, 调用方不能假设输出帧被清空或填充.
    fn encode(
        &self,
        _codec: &mut Codec,
        _frame_in: &CodecFrame,
        _frame_out: &mut CodecFrame,
    ) -> MpfResult<()> {
        Ok(())
    }

    /// 解码一帧
    ///
    /// 默认实现不触碰 `frame_out`.
    fn decode(
        &self,
        _codec: &mut Codec,
        _frame_in: &CodecFrame,
        _frame_out: &mut CodecFrame,
    ) -> MpfResult<()> {
        Ok(())
    }

    /// 从缓冲区头部切出一帧
    ///
    /// 帧大小可变的编解码族 (如由带内头部区分静音帧与全速率帧) 需要覆盖此方法.
    /// 覆盖实现的契约: 恰好消费一个逻辑帧对应的前缀, 把负载和真实大小写入
    /// `frame`, 并把 `buffer` 向后推进; 缓冲区中没有完整一帧时返回错误且不消费.
    fn dissect(
        &self,
        _codec: &mut Codec,
        buffer: &mut &[u8],
        frame: &mut CodecFrame,
    ) -> MpfResult<()> {
        default_dissect(buffer, frame)
    }

    /// 用静音填充输出帧
    ///
    /// 全零字节不代表静音的编解码族 (如对数压扩的 G.711) 需要覆盖此方法.
    fn fill(&self, _codec: &mut Codec, frame_out: &mut CodecFrame) -> MpfResult<()> {
        default_fill(frame_out);
        Ok(())
    }

    /// 是否声明了编码与解码变换
    ///
    /// 覆盖了 `encode`/`decode` 的族应当返回 `true`. 返回 `false` 时两者都是
    /// 不触碰输出的空操作, 面向用户的工具据此拒绝转码而不是写出未变换的缓冲区.
    fn transcodes(&self) -> bool {
        false
    }

    /// 判断两组格式参数是否可视为同一种可用格式
    ///
    /// 返回 `None` 表示该族不支持动态匹配, 协商层应退回到精确比较.
    fn match_formats(&self, _format1: &str, _format2: &str) -> Option<bool> {
        None
    }
}

/// 默认的固定大小切分
///
/// 以 `frame.size()` 作为期望帧长 `F`:
/// - `F == 0` 返回 `InvalidArgument`
/// - 剩余字节少于 `F` 返回 `NeedMoreData`
/// - 否则拷贝头部 `F` 字节到帧中, 并把 `buffer` 推进 `F` 字节
///
/// 失败时 `buffer` 保持不变. 剩余字节恰好等于 `F` 时切分成功.
pub fn default_dissect(buffer: &mut &[u8], frame: &mut CodecFrame) -> MpfResult<()> {
    let size = frame.size();
    if size == 0 {
        return Err(MpfError::InvalidArgument("切分帧大小为 0".into()));
    }
    if buffer.len() < size {
        return Err(MpfError::NeedMoreData);
    }
    let (head, tail) = buffer.split_at(size);
    frame.payload_mut().copy_from_slice(head);
    *buffer = tail;
    Ok(())
}

/// 默认的静音填充: 声明范围全部置零
pub fn default_fill(frame: &mut CodecFrame) {
    frame.payload_mut().fill(0);
}
