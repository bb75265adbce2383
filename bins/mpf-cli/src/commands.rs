//! 子命令实现.
//!
//! 输入输出均为裸数据文件: 编码数据为按 RTP 负载拼接的字节流,
//! 线性 PCM 为小端 S16.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use log::{debug, info, warn};
use mpf_codec::{Codec, CodecDescriptor, CodecFrame, CodecManager};
use serde::Serialize;

/// 编解码族概要
#[derive(Debug, Serialize)]
pub struct FamilyInfo {
    pub name: String,
    pub bits_per_sample: u8,
    pub sample_rates: Vec<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload_type: Option<u8>,
}

/// 切分结果
#[derive(Debug, Serialize)]
pub struct DissectReport {
    pub codec: String,
    pub frame_sizes: Vec<usize>,
    pub remaining: usize,
}

/// 将 `name[/pt[/rate[/channels]]]` 解析为描述符并创建实例
pub fn resolve_codec(manager: &CodecManager, entry: &str) -> Result<(CodecDescriptor, Codec)> {
    let mut list = manager
        .load_codec_list(entry)
        .with_context(|| format!("编解码条目无效: {entry}"))?;
    if list.len() != 1 {
        bail!("无法识别的编解码器: {entry}");
    }
    let descriptor = list.remove(0);
    let codec = manager.get(&descriptor)?;
    debug!("使用编解码器 {}", descriptor);
    Ok((descriptor, codec))
}

/// 创建用于编码或解码的实例, 未声明变换的族 (如 G.729) 直接拒绝
fn resolve_transcoder(manager: &CodecManager, entry: &str) -> Result<(CodecDescriptor, Codec)> {
    let (descriptor, codec) = resolve_codec(manager, entry)?;
    if !codec.transcodes() {
        bail!("{} 未提供编解码变换, 只支持切分与静音填充", descriptor);
    }
    Ok((descriptor, codec))
}

/// 列出已注册的编解码族
pub fn list_families(manager: &CodecManager) -> Vec<FamilyInfo> {
    manager
        .families()
        .iter()
        .map(|family| FamilyInfo {
            name: family.name().to_string(),
            bits_per_sample: family.attributes.bits_per_sample,
            sample_rates: family.attributes.sample_rates.rates(),
            payload_type: family.static_descriptor.as_ref().map(|d| d.payload_type),
        })
        .collect()
}

/// 按帧切分负载, 返回各帧大小与未消费的字节数
pub fn dissect(manager: &CodecManager, entry: &str, payload: &[u8]) -> Result<DissectReport> {
    let (descriptor, mut codec) = resolve_codec(manager, entry)?;
    let frame_size = descriptor.frame_size(codec.attributes());
    let (frames, rest) = codec.dissect_all(payload, frame_size);
    if !rest.is_empty() {
        warn!("负载末尾剩余 {} 字节未能组成完整帧", rest.len());
    }
    Ok(DissectReport {
        codec: descriptor.to_string(),
        frame_sizes: frames.iter().map(CodecFrame::size).collect(),
        remaining: rest.len(),
    })
}

/// 切分并解码为线性 PCM
///
/// 与 [`dissect`] 相同, 无法切分的尾部只记录警告, 已解码的帧全部保留.
pub fn decode(manager: &CodecManager, entry: &str, payload: &[u8]) -> Result<Vec<u8>> {
    let (descriptor, mut codec) = resolve_transcoder(manager, entry)?;
    let frame_size = descriptor.frame_size(codec.attributes());
    let linear_size = descriptor.linear_frame_size(codec.attributes());

    codec.open_decoder()?;
    let (frames, rest) = codec.dissect_all(payload, frame_size);
    let mut output = Vec::with_capacity(frames.len() * linear_size);
    for frame in &frames {
        let mut pcm = CodecFrame::new(linear_size);
        codec.decode(frame, &mut pcm)?;
        output.extend_from_slice(pcm.payload());
    }
    codec.close_decoder()?;

    if !rest.is_empty() {
        warn!("负载末尾剩余 {} 字节未能组成完整帧, 未解码", rest.len());
    }
    info!("解码 {} 字节负载, 输出 {} 字节 PCM", payload.len(), output.len());
    Ok(output)
}

/// 按 10ms 分块编码线性 PCM
pub fn encode(manager: &CodecManager, entry: &str, pcm: &[u8]) -> Result<Vec<u8>> {
    let (descriptor, mut codec) = resolve_transcoder(manager, entry)?;
    let frame_size = descriptor.frame_size(codec.attributes());
    let linear_size = descriptor.linear_frame_size(codec.attributes());
    if linear_size == 0 {
        bail!("{} 的线性帧大小为 0", descriptor);
    }

    codec.open_encoder()?;
    let mut output = Vec::with_capacity(pcm.len());
    for chunk in pcm.chunks(linear_size) {
        let input = CodecFrame::from_payload(chunk);
        let mut encoded = CodecFrame::new(frame_size.max(chunk.len()));
        codec.encode(&input, &mut encoded)?;
        output.extend_from_slice(encoded.payload());
    }
    codec.close_encoder()?;

    info!("编码 {} 字节 PCM, 输出 {} 字节负载", pcm.len(), output.len());
    Ok(output)
}

/// 生成指定帧数的静音负载
pub fn silence(manager: &CodecManager, entry: &str, frames: usize) -> Result<Vec<u8>> {
    let (descriptor, mut codec) = resolve_codec(manager, entry)?;
    let mut frame = CodecFrame::new(descriptor.frame_size(codec.attributes()));
    let Some(total) = frame.capacity().checked_mul(frames) else {
        bail!("静音帧数过大: {frames}");
    };
    let mut output = Vec::with_capacity(total);
    for _ in 0..frames {
        codec.fill(&mut frame)?;
        output.extend_from_slice(frame.payload());
    }
    Ok(output)
}

/// 读取输入文件
pub fn read_input(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("读取输入文件失败, path={}", path.display()))
}

/// 写入输出文件
pub fn write_output(path: &Path, data: &[u8], overwrite: bool) -> Result<()> {
    if !overwrite && path.exists() {
        bail!("输出文件已存在 '{}', 使用 -y 覆盖", path.display());
    }
    fs::write(path, data).with_context(|| format!("写入输出文件失败, path={}", path.display()))
}
