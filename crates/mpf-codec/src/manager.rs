//! 编解码族注册表.
//!
//! 编解码族在启动时通过 [`CodecManager::register`] 注册能力集、属性和
//! (静态负载类型的) 描述符, 这是新增编解码器的唯一入口.
//! 注册表负责按名称/描述符查找族并创建实例, 以及解析编解码列表配置.

use std::sync::Arc;

use log::{debug, warn};
use mpf_core::{MpfError, MpfResult};

use crate::attributes::CodecAttributes;
use crate::capabilities::CodecCapabilities;
use crate::codec::Codec;
use crate::descriptor::CodecDescriptor;

/// 未指定采样率时使用的默认值
const DEFAULT_SAMPLING_RATE: u16 = 8000;

/// 未指定声道数时使用的默认值
const DEFAULT_CHANNEL_COUNT: u8 = 1;

/// 编解码族注册条目
#[derive(Clone)]
pub struct CodecFamily {
    /// 能力集
    pub capabilities: Arc<dyn CodecCapabilities>,
    /// 属性
    pub attributes: Arc<CodecAttributes>,
    /// 静态描述符 (仅静态负载类型)
    pub static_descriptor: Option<Arc<CodecDescriptor>>,
}

impl CodecFamily {
    /// 创建注册条目
    pub fn new(
        capabilities: impl CodecCapabilities + 'static,
        attributes: CodecAttributes,
        static_descriptor: Option<CodecDescriptor>,
    ) -> Self {
        Self {
            capabilities: Arc::new(capabilities),
            attributes: Arc::new(attributes),
            static_descriptor: static_descriptor.map(Arc::new),
        }
    }

    /// 族名称
    pub fn name(&self) -> &str {
        &self.attributes.name
    }

    /// 创建该族的新实例, 状态为空
    pub fn create_codec(&self) -> Codec {
        Codec::new(
            Arc::clone(&self.capabilities),
            Arc::clone(&self.attributes),
            self.static_descriptor.clone(),
        )
    }

    /// 描述符是否由该族处理
    pub fn handles(&self, descriptor: &CodecDescriptor) -> bool {
        if let Some(static_desc) = &self.static_descriptor {
            if descriptor.is_static() && static_desc.matches(descriptor) {
                return true;
            }
        }
        descriptor.matches_attributes(&self.attributes)
    }
}

/// 编解码族注册表
#[derive(Default)]
pub struct CodecManager {
    /// 已注册的族, 按注册顺序排列, 同名时先注册者优先
    families: Vec<CodecFamily>,
}

impl CodecManager {
    /// 创建空的注册表
    pub fn new() -> Self {
        Self {
            families: Vec::new(),
        }
    }

    /// 注册一个编解码族
    pub fn register(&mut self, family: CodecFamily) {
        debug!(
            "注册编解码族: {} ({} bit, {})",
            family.name(),
            family.attributes.bits_per_sample,
            family.attributes.sample_rates,
        );
        self.families.push(family);
    }

    /// 按名称查找族 (不区分大小写)
    pub fn find(&self, name: &str) -> Option<&CodecFamily> {
        self.families
            .iter()
            .find(|family| family.attributes.name_matches(name))
    }

    /// 为描述符创建编解码器实例
    pub fn get(&self, descriptor: &CodecDescriptor) -> MpfResult<Codec> {
        self.families
            .iter()
            .find(|family| family.handles(descriptor))
            .map(CodecFamily::create_codec)
            .ok_or_else(|| MpfError::CodecNotFound(format!("未找到 {} 的编解码族", descriptor)))
    }

    /// 已注册的全部族
    pub fn families(&self) -> &[CodecFamily] {
        &self.families
    }

    /// 解析编解码列表配置
    ///
    /// 配置由空白分隔的条目组成, 每个条目形如 `name[/pt[/rate[/channels]]]`,
    /// 例如 `"PCMU PCMA L16/96/8000"`.
    /// - 未注册的编码名或族不支持的采样率会被跳过并记录警告
    /// - 数字字段格式错误返回 `Config` 错误
    /// - 动态族必须显式给出负载类型, 否则跳过
    pub fn load_codec_list(&self, config: &str) -> MpfResult<Vec<CodecDescriptor>> {
        let mut list = Vec::new();
        for token in config.split_whitespace() {
            if let Some(descriptor) = self.parse_codec_entry(token)? {
                debug!("加载编解码描述符: {}", descriptor);
                list.push(descriptor);
            }
        }
        Ok(list)
    }

    fn parse_codec_entry(&self, token: &str) -> MpfResult<Option<CodecDescriptor>> {
        let mut fields = token.split('/');
        let name = fields.next().unwrap_or_default();
        let payload_type = parse_field::<u8>(fields.next(), token, "负载类型")?;
        let sampling_rate = parse_field::<u16>(fields.next(), token, "采样率")?;
        let channel_count = parse_field::<u8>(fields.next(), token, "声道数")?;
        if fields.next().is_some() {
            return Err(MpfError::Config(format!("编解码条目字段过多: {token}")));
        }

        let Some(family) = self.find(name) else {
            warn!("忽略未注册的编解码器: {}", name);
            return Ok(None);
        };

        let static_desc = family.static_descriptor.as_deref();
        let payload_type = match (payload_type, static_desc) {
            (Some(pt), _) => pt,
            (None, Some(desc)) => desc.payload_type,
            (None, None) => {
                warn!("动态编解码器 {} 未指定负载类型, 已忽略", name);
                return Ok(None);
            }
        };
        if payload_type >= 128 {
            return Err(MpfError::Config(format!("负载类型超出范围: {token}")));
        }

        let sampling_rate = sampling_rate
            .or(static_desc.map(|d| d.sampling_rate))
            .unwrap_or(DEFAULT_SAMPLING_RATE);
        if !family.attributes.supports_rate(sampling_rate) {
            warn!("编解码器 {} 不支持采样率 {}, 已忽略", name, sampling_rate);
            return Ok(None);
        }
        let channel_count = channel_count
            .or(static_desc.map(|d| d.channel_count))
            .unwrap_or(DEFAULT_CHANNEL_COUNT);

        Ok(Some(CodecDescriptor::new(
            payload_type,
            family.name(),
            sampling_rate,
            channel_count,
        )))
    }

    /// 判断两个描述符是否表示同一种可用格式
    ///
    /// 先做基础匹配 ([`CodecDescriptor::matches`]), 再比较格式参数:
    /// 参数完全相同视为匹配; 否则交给族的格式匹配器, 族不支持动态匹配时视为不匹配.
    pub fn descriptors_match(&self, a: &CodecDescriptor, b: &CodecDescriptor) -> bool {
        if !a.matches(b) {
            return false;
        }
        let format1 = a.format.as_deref().unwrap_or_default();
        let format2 = b.format.as_deref().unwrap_or_default();
        if format1 == format2 {
            return true;
        }
        self.families
            .iter()
            .find(|family| family.handles(a))
            .and_then(|family| family.capabilities.match_formats(format1, format2))
            .unwrap_or(false)
    }
}

/// 解析可选的数字字段, 空字段视为未指定
fn parse_field<T: std::str::FromStr>(
    field: Option<&str>,
    token: &str,
    what: &str,
) -> MpfResult<Option<T>> {
    match field {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<T>()
            .map(Some)
            .map_err(|_| MpfError::Config(format!("{what}格式错误: {token}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mpf_core::SampleRates;

    /// 忽略 "octet-align" 以外参数差异的族
    struct FmtpFamily;

    impl CodecCapabilities for FmtpFamily {
        fn match_formats(&self, format1: &str, format2: &str) -> Option<bool> {
            let octet_align = |f: &str| f.contains("octet-align=1");
            Some(octet_align(format1) == octet_align(format2))
        }
    }

    /// 没有格式匹配器的族
    struct PlainFamily;

    impl CodecCapabilities for PlainFamily {}

    fn make_manager() -> CodecManager {
        let mut manager = CodecManager::new();
        crate::register_all(&mut manager);
        manager.register(CodecFamily::new(
            FmtpFamily,
            CodecAttributes::new("AMR", 8, SampleRates::RATE_8000),
            None,
        ));
        manager.register(CodecFamily::new(
            PlainFamily,
            CodecAttributes::new("OPAQUE", 8, SampleRates::RATE_8000),
            None,
        ));
        manager
    }

    #[test]
    fn test_按名称查找() {
        let manager = make_manager();
        assert!(manager.find("pcmu").is_some());
        assert!(manager.find("L16").is_some());
        assert!(manager.find("G722").is_none());
    }

    #[test]
    fn test_按描述符创建实例() {
        let manager = make_manager();
        let codec = manager.get(&CodecDescriptor::new(8, "PCMA", 8000, 1)).unwrap();
        assert_eq!(codec.name(), "PCMA");
        assert_eq!(codec.frame_size(), Some(80));

        // 动态负载类型按名称和采样率查找
        let codec = manager.get(&CodecDescriptor::new(96, "L16", 16000, 1)).unwrap();
        assert_eq!(codec.name(), "L16");
        assert!(codec.descriptor().is_none());

        let err = manager
            .get(&CodecDescriptor::new(96, "L16", 11025, 1))
            .unwrap_err();
        assert!(matches!(err, MpfError::CodecNotFound(_)));
    }

    #[test]
    fn test_同族实例共享属性() {
        let manager = make_manager();
        let a = manager.get(&CodecDescriptor::new(0, "PCMU", 8000, 1)).unwrap();
        let b = manager.get(&CodecDescriptor::new(0, "PCMU", 8000, 1)).unwrap();
        assert!(Arc::ptr_eq(a.attributes(), b.attributes()));
    }

    #[test]
    fn test_解析编解码列表() {
        let manager = make_manager();
        let list = manager
            .load_codec_list("PCMU  PCMA L16/96/16000 G729 L16/97/48000/2")
            .unwrap();
        let names: Vec<String> = list.iter().map(|d| d.to_string()).collect();
        assert_eq!(
            names,
            vec![
                "PCMU/0/8000/1",
                "PCMA/8/8000/1",
                "L16/96/16000/1",
                "G729/18/8000/1",
                "L16/97/48000/2",
            ]
        );
    }

    #[test]
    fn test_解析编解码列表跳过无效条目() {
        let manager = make_manager();
        // 未注册的名称、动态族缺少负载类型、不支持的采样率都被跳过
        let list = manager
            .load_codec_list("G722 L16 PCMU/0/16000 PCMA")
            .unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].name, "PCMA");
    }

    #[test]
    fn test_解析编解码列表格式错误() {
        let manager = make_manager();
        for config in ["L16/abc/8000", "PCMU/0/8000/1/9", "L16/200/8000", "PCMU/0/99999"] {
            let err = manager.load_codec_list(config).unwrap_err();
            assert!(matches!(err, MpfError::Config(_)), "{config} 应当报配置错误");
        }
    }

    #[test]
    fn test_格式参数匹配() {
        let manager = make_manager();
        let a = CodecDescriptor::new(96, "AMR", 8000, 1).with_format("octet-align=1; mode-set=2");
        let b = CodecDescriptor::new(97, "AMR", 8000, 1).with_format("octet-align=1");
        let c = CodecDescriptor::new(97, "AMR", 8000, 1);
        assert!(manager.descriptors_match(&a, &b));
        assert!(!manager.descriptors_match(&a, &c));
    }

    #[test]
    fn test_无格式匹配器时退回精确比较() {
        let manager = make_manager();
        let a = CodecDescriptor::new(96, "OPAQUE", 8000, 1).with_format("x=1");
        let b = CodecDescriptor::new(96, "OPAQUE", 8000, 1).with_format("x=1");
        let c = CodecDescriptor::new(96, "OPAQUE", 8000, 1).with_format("x=2");
        assert!(manager.descriptors_match(&a, &b));
        assert!(!manager.descriptors_match(&a, &c));
        // 基础匹配失败时不再比较参数
        let d = CodecDescriptor::new(96, "OPAQUE", 16000, 1).with_format("x=1");
        assert!(!manager.descriptors_match(&a, &d));
    }
}
