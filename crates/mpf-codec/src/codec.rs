//! 编解码器实例 (Codec).
//!
//! `Codec` 把一个编解码族的能力集、属性和可选的静态描述符组合在一起,
//! 并独占本实例的编码器/解码器状态. 所有对外操作都是 `Codec` 的方法,
//! 由它分派到族实现或规定的默认行为.
//!
//! 一个实例只由一个流处理者同步驱动; 多路并发流通过 [`Clone`] 得到各自独立的状态.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use log::{debug, warn};
use mpf_core::MpfResult;

use crate::attributes::CodecAttributes;
use crate::capabilities::CodecCapabilities;
use crate::descriptor::CodecDescriptor;
use crate::frame::CodecFrame;

/// 编码器/解码器的不透明状态, 由编解码族创建和解释
pub type CodecState = Box<dyn Any + Send>;

/// 编解码器实例
pub struct Codec {
    /// 族能力集 (同族实例共享)
    capabilities: Arc<dyn CodecCapabilities>,
    /// 族属性 (同族实例共享, 不可变)
    attributes: Arc<CodecAttributes>,
    /// 静态描述符 (仅静态负载类型存在)
    descriptor: Option<Arc<CodecDescriptor>>,
    /// 编码器状态
    encoder: Option<CodecState>,
    /// 解码器状态
    decoder: Option<CodecState>,
    /// 编码器是否已打开
    encoder_open: bool,
    /// 解码器是否已打开
    decoder_open: bool,
}

impl Codec {
    /// 创建编解码器实例, 编码器与解码器状态均为空
    ///
    /// 不校验能力集与属性是否属于同一族, 由调用方保证.
    pub fn new(
        capabilities: Arc<dyn CodecCapabilities>,
        attributes: Arc<CodecAttributes>,
        descriptor: Option<Arc<CodecDescriptor>>,
    ) -> Self {
        Self {
            capabilities,
            attributes,
            descriptor,
            encoder: None,
            decoder: None,
            encoder_open: false,
            decoder_open: false,
        }
    }

    /// 族能力集
    pub fn capabilities(&self) -> &Arc<dyn CodecCapabilities> {
        &self.capabilities
    }

    /// 族属性
    pub fn attributes(&self) -> &Arc<CodecAttributes> {
        &self.attributes
    }

    /// 静态描述符
    pub fn descriptor(&self) -> Option<&Arc<CodecDescriptor>> {
        self.descriptor.as_ref()
    }

    /// 编解码器名称
    pub fn name(&self) -> &str {
        &self.attributes.name
    }

    /// 族是否声明了编码与解码变换
    pub fn transcodes(&self) -> bool {
        self.capabilities.transcodes()
    }

    /// 按静态描述符计算的编码帧大小, 动态格式返回 `None`
    pub fn frame_size(&self) -> Option<usize> {
        self.descriptor
            .as_ref()
            .map(|desc| desc.frame_size(&self.attributes))
    }

    /// 编码器是否已打开
    pub fn is_encoder_open(&self) -> bool {
        self.encoder_open
    }

    /// 解码器是否已打开
    pub fn is_decoder_open(&self) -> bool {
        self.decoder_open
    }

    // ============================================================
    // 状态槽, 供编解码族实现读写
    // ============================================================

    /// 设置编码器状态, 替换已有状态
    pub fn set_encoder_state<T: Any + Send>(&mut self, state: T) {
        self.encoder = Some(Box::new(state));
    }

    /// 按具体类型读取编码器状态
    pub fn encoder_state<T: Any>(&self) -> Option<&T> {
        self.encoder.as_deref()?.downcast_ref::<T>()
    }

    /// 按具体类型可变地读取编码器状态
    pub fn encoder_state_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.encoder.as_deref_mut()?.downcast_mut::<T>()
    }

    /// 取出编码器状态
    pub fn take_encoder_state(&mut self) -> Option<CodecState> {
        self.encoder.take()
    }

    /// 设置解码器状态, 替换已有状态
    pub fn set_decoder_state<T: Any + Send>(&mut self, state: T) {
        self.decoder = Some(Box::new(state));
    }

    /// 按具体类型读取解码器状态
    pub fn decoder_state<T: Any>(&self) -> Option<&T> {
        self.decoder.as_deref()?.downcast_ref::<T>()
    }

    /// 按具体类型可变地读取解码器状态
    pub fn decoder_state_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.decoder.as_deref_mut()?.downcast_mut::<T>()
    }

    /// 取出解码器状态
    pub fn take_decoder_state(&mut self) -> Option<CodecState> {
        self.decoder.take()
    }

    // ============================================================
    // 生命周期
    // ============================================================

    /// 打开编码器
    pub fn open_encoder(&mut self) -> MpfResult<()> {
        let caps = Arc::clone(&self.capabilities);
        caps.open_encoder(self)?;
        self.encoder_open = true;
        debug!("打开 {} 编码器", self.name());
        Ok(())
    }

    /// 关闭编码器
    pub fn close_encoder(&mut self) -> MpfResult<()> {
        let caps = Arc::clone(&self.capabilities);
        caps.close_encoder(self)?;
        self.encoder_open = false;
        debug!("关闭 {} 编码器", self.name());
        Ok(())
    }

    /// 打开解码器
    pub fn open_decoder(&mut self) -> MpfResult<()> {
        let caps = Arc::clone(&self.capabilities);
        caps.open_decoder(self)?;
        self.decoder_open = true;
        debug!("打开 {} 解码器", self.name());
        Ok(())
    }

    /// 关闭解码器
    pub fn close_decoder(&mut self) -> MpfResult<()> {
        let caps = Arc::clone(&self.capabilities);
        caps.close_decoder(self)?;
        self.decoder_open = false;
        debug!("关闭 {} 解码器", self.name());
        Ok(())
    }

    // ============================================================
    // 编解码分派
    // ============================================================

    /// 编码一帧
    pub fn encode(&mut self, frame_in: &CodecFrame, frame_out: &mut CodecFrame) -> MpfResult<()> {
        let caps = Arc::clone(&self.capabilities);
        caps.encode(self, frame_in, frame_out)
    }

    /// 解码一帧
    pub fn decode(&mut self, frame_in: &CodecFrame, frame_out: &mut CodecFrame) -> MpfResult<()> {
        let caps = Arc::clone(&self.capabilities);
        caps.decode(self, frame_in, frame_out)
    }

    /// 从缓冲区头部切出下一帧
    ///
    /// `buffer` 的长度即剩余字节数; 成功时向后推进, 失败时保持不变.
    pub fn dissect(&mut self, buffer: &mut &[u8], frame: &mut CodecFrame) -> MpfResult<()> {
        let caps = Arc::clone(&self.capabilities);
        caps.dissect(self, buffer, frame)
    }

    /// 用静音填充输出帧
    pub fn fill(&mut self, frame_out: &mut CodecFrame) -> MpfResult<()> {
        let caps = Arc::clone(&self.capabilities);
        caps.fill(self, frame_out)
    }

    /// 切分缓冲区中的全部完整帧
    ///
    /// 每帧以容量为 `frame_size` 的新帧承接. 返回切出的帧以及无法继续切分的剩余字节.
    pub fn dissect_all<'a>(
        &mut self,
        mut buffer: &'a [u8],
        frame_size: usize,
    ) -> (Vec<CodecFrame>, &'a [u8]) {
        let mut frames = Vec::new();
        loop {
            let before = buffer.len();
            let mut frame = CodecFrame::new(frame_size);
            if self.dissect(&mut buffer, &mut frame).is_err() {
                break;
            }
            if buffer.len() >= before {
                // 切分成功却没有消费字节, 继续循环不会结束
                warn!("{} 切分器未消费任何字节, 停止切分", self.name());
                break;
            }
            frames.push(frame);
        }
        (frames, buffer)
    }
}

impl Clone for Codec {
    /// 克隆共享能力集、属性与描述符, 编码器/解码器状态不会被复制
    fn clone(&self) -> Self {
        Self::new(
            Arc::clone(&self.capabilities),
            Arc::clone(&self.attributes),
            self.descriptor.clone(),
        )
    }
}

impl Drop for Codec {
    fn drop(&mut self) {
        if self.encoder_open {
            if let Err(e) = self.close_encoder() {
                warn!("释放 {} 时关闭编码器失败: {}", self.name(), e);
            }
        }
        if self.decoder_open {
            if let Err(e) = self.close_decoder() {
                warn!("释放 {} 时关闭解码器失败: {}", self.name(), e);
            }
        }
    }
}

impl fmt::Debug for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Codec")
            .field("attributes", &self.attributes)
            .field("descriptor", &self.descriptor)
            .field("encoder_open", &self.encoder_open)
            .field("decoder_open", &self.decoder_open)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mpf_core::{MpfError, SampleRates};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// 没有覆盖任何操作的族
    struct PlainFamily;

    impl CodecCapabilities for PlainFamily {}

    /// 编码器计数状态
    struct EncodeCounter {
        encoded: usize,
    }

    /// 带状态的族, 记录关闭次数
    struct StatefulFamily {
        closes: Arc<AtomicUsize>,
    }

    impl CodecCapabilities for StatefulFamily {
        fn open_encoder(&self, codec: &mut Codec) -> MpfResult<()> {
            codec.set_encoder_state(EncodeCounter { encoded: 0 });
            Ok(())
        }

        fn close_encoder(&self, codec: &mut Codec) -> MpfResult<()> {
            codec.take_encoder_state();
            self.closes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn open_decoder(&self, codec: &mut Codec) -> MpfResult<()> {
            codec.set_decoder_state(0u32);
            Ok(())
        }

        fn close_decoder(&self, codec: &mut Codec) -> MpfResult<()> {
            codec.take_decoder_state();
            self.closes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn encode(
            &self,
            codec: &mut Codec,
            frame_in: &CodecFrame,
            frame_out: &mut CodecFrame,
        ) -> MpfResult<()> {
            let counter = codec
                .encoder_state_mut::<EncodeCounter>()
                .ok_or_else(|| MpfError::Codec("编码器未打开".into()))?;
            counter.encoded += 1;
            frame_out.set_size(frame_in.size())?;
            frame_out.payload_mut().copy_from_slice(frame_in.payload());
            Ok(())
        }

        fn transcodes(&self) -> bool {
            true
        }
    }

    /// 首字节声明帧长的族
    struct LengthPrefixedFamily;

    impl CodecCapabilities for LengthPrefixedFamily {
        fn dissect(
            &self,
            _codec: &mut Codec,
            buffer: &mut &[u8],
            frame: &mut CodecFrame,
        ) -> MpfResult<()> {
            let len = *buffer.first().ok_or(MpfError::NeedMoreData)? as usize;
            if buffer.len() < len + 1 {
                return Err(MpfError::NeedMoreData);
            }
            frame.set_size(len)?;
            frame.payload_mut().copy_from_slice(&buffer[1..=len]);
            *buffer = &buffer[len + 1..];
            Ok(())
        }
    }

    fn make_codec(caps: impl CodecCapabilities + 'static) -> Codec {
        Codec::new(
            Arc::new(caps),
            Arc::new(CodecAttributes::new("TEST", 8, SampleRates::RATE_8000)),
            None,
        )
    }

    #[test]
    fn test_未声明的生命周期操作直接成功() {
        let mut codec = make_codec(PlainFamily);
        codec.open_encoder().unwrap();
        codec.open_decoder().unwrap();
        assert!(codec.is_encoder_open());
        assert!(codec.is_decoder_open());
        codec.close_encoder().unwrap();
        codec.close_decoder().unwrap();
        assert!(!codec.is_encoder_open());
        assert!(!codec.is_decoder_open());
    }

    #[test]
    fn test_变换声明() {
        assert!(!make_codec(PlainFamily).transcodes());
        let stateful = StatefulFamily {
            closes: Arc::new(AtomicUsize::new(0)),
        };
        assert!(make_codec(stateful).transcodes());
    }

    #[test]
    fn test_未声明编解码时输出帧保持不变() {
        let mut codec = make_codec(PlainFamily);
        let input = CodecFrame::from_payload(vec![1u8, 2, 3, 4]);
        let mut output = CodecFrame::from_payload(vec![0x5Au8; 6]);
        output.set_size(3).unwrap();
        let before = output.clone();

        codec.encode(&input, &mut output).unwrap();
        assert_eq!(output, before);
        codec.decode(&input, &mut output).unwrap();
        assert_eq!(output, before);
    }

    #[test]
    fn test_切分50字节帧长20() {
        let mut codec = make_codec(PlainFamily);
        let data: Vec<u8> = (0..50).collect();
        let mut buffer = data.as_slice();
        let mut frame = CodecFrame::new(20);

        codec.dissect(&mut buffer, &mut frame).unwrap();
        assert_eq!(frame.payload(), &data[0..20]);
        codec.dissect(&mut buffer, &mut frame).unwrap();
        assert_eq!(frame.payload(), &data[20..40]);
        assert_eq!(buffer.len(), 10);

        assert!(codec.dissect(&mut buffer, &mut frame).is_err());
        assert_eq!(buffer.len(), 10);
        assert_eq!(buffer, &data[40..]);
    }

    #[test]
    fn test_默认切分耗尽性质() {
        let mut codec = make_codec(PlainFamily);
        for total in 0..64usize {
            for frame_size in 1..16usize {
                let data = vec![0xC3u8; total];
                let mut buffer = data.as_slice();
                let mut frame = CodecFrame::new(frame_size);
                let mut successes = 0;
                while codec.dissect(&mut buffer, &mut frame).is_ok() {
                    successes += 1;
                }
                assert_eq!(successes, total / frame_size);
                assert_eq!(buffer.len(), total % frame_size);
            }
        }
    }

    #[test]
    fn test_零长度帧切分失败且不修改缓冲区() {
        let mut codec = make_codec(PlainFamily);
        let data = [9u8; 12];
        let mut buffer = &data[..];
        let mut frame = CodecFrame::new(0);
        for _ in 0..3 {
            assert!(codec.dissect(&mut buffer, &mut frame).is_err());
            assert_eq!(buffer.len(), 12);
        }
    }

    #[test]
    fn test_默认静音填充为全零() {
        let mut codec = make_codec(PlainFamily);
        let mut frame = CodecFrame::from_payload(vec![0xFFu8; 33]);
        codec.fill(&mut frame).unwrap();
        assert!(frame.payload().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_克隆状态互相独立() {
        let closes = Arc::new(AtomicUsize::new(0));
        let mut source = make_codec(StatefulFamily {
            closes: Arc::clone(&closes),
        });
        let mut cloned = source.clone();

        assert!(Arc::ptr_eq(source.attributes(), cloned.attributes()));
        assert!(Arc::ptr_eq(source.capabilities(), cloned.capabilities()));

        cloned.open_encoder().unwrap();
        assert!(cloned.is_encoder_open());
        assert!(!source.is_encoder_open());
        assert!(source.encoder_state::<EncodeCounter>().is_none());

        source.open_decoder().unwrap();
        assert!(source.is_decoder_open());
        assert!(!cloned.is_decoder_open());

        // 已打开的实例克隆出的新实例状态为空
        let fresh = cloned.clone();
        assert!(!fresh.is_encoder_open());
        assert!(fresh.encoder_state::<EncodeCounter>().is_none());
    }

    #[test]
    fn test_编码器状态随编码更新() {
        let closes = Arc::new(AtomicUsize::new(0));
        let mut codec = make_codec(StatefulFamily {
            closes: Arc::clone(&closes),
        });
        let input = CodecFrame::from_payload(vec![1u8, 2, 3]);
        let mut output = CodecFrame::new(8);

        // 未打开时由族实现上报错误
        assert!(codec.encode(&input, &mut output).is_err());

        codec.open_encoder().unwrap();
        codec.encode(&input, &mut output).unwrap();
        codec.encode(&input, &mut output).unwrap();
        assert_eq!(output.payload(), &[1, 2, 3]);
        assert_eq!(
            codec
                .encoder_state::<EncodeCounter>()
                .map(|c| c.encoded),
            Some(2)
        );
    }

    #[test]
    fn test_释放时关闭仍打开的一侧() {
        let closes = Arc::new(AtomicUsize::new(0));
        {
            let mut codec = make_codec(StatefulFamily {
                closes: Arc::clone(&closes),
            });
            codec.open_encoder().unwrap();
            codec.open_decoder().unwrap();
        }
        assert_eq!(closes.load(Ordering::SeqCst), 2);

        {
            let mut codec = make_codec(StatefulFamily {
                closes: Arc::clone(&closes),
            });
            codec.open_encoder().unwrap();
            codec.close_encoder().unwrap();
        }
        // 已手动关闭的一侧不会重复关闭
        assert_eq!(closes.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_自定义切分器完全接管() {
        let mut codec = make_codec(LengthPrefixedFamily);
        let data = [2u8, 0xA, 0xB, 3, 1, 2, 3, 5, 0];
        let (frames, rest) = codec.dissect_all(&data, 8);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].payload(), &[0xA, 0xB]);
        assert_eq!(frames[1].payload(), &[1, 2, 3]);
        // 最后一帧声明 5 字节但只剩 1 字节
        assert_eq!(rest, &[5, 0]);
    }

    #[test]
    fn test_批量切分返回剩余字节() {
        let mut codec = make_codec(PlainFamily);
        let data = [0u8; 45];
        let (frames, rest) = codec.dissect_all(&data, 20);
        assert_eq!(frames.len(), 2);
        assert_eq!(rest.len(), 5);

        let (frames, rest) = codec.dissect_all(&data, 0);
        assert!(frames.is_empty());
        assert_eq!(rest.len(), 45);
    }
}
