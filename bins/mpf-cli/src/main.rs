//! mpf-cli - 编解码命令行工具
//!
//! 对裸 RTP 负载文件做帧切分、解码、编码, 以及生成静音帧.
//! 编解码器以 `name[/pt[/rate[/channels]]]` 指定, 例如 `PCMU`、`L16/96/16000`.

mod commands;
mod logging;

use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::info;
use mpf::config::MpfConfig;

#[derive(Parser, Debug)]
#[command(name = "mpf-cli", version, about = "可插拔音频编解码工具")]
struct Cli {
    /// JSON 配置文件路径
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 输出 JSON 格式
    #[arg(long, global = true)]
    json: bool,

    /// 日志级别 (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 列出已注册的编解码族及配置中的编解码列表
    List,
    /// 按帧切分负载并显示每帧大小
    Dissect {
        /// 编解码器
        #[arg(short, long)]
        codec: String,
        /// 负载文件
        #[arg(short, long)]
        input: PathBuf,
    },
    /// 解码负载为小端 S16 PCM
    Decode {
        #[arg(short, long)]
        codec: String,
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        /// 覆盖输出文件
        #[arg(short = 'y', long)]
        overwrite: bool,
    },
    /// 编码小端 S16 PCM 为负载
    Encode {
        #[arg(short, long)]
        codec: String,
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        #[arg(short = 'y', long)]
        overwrite: bool,
    },
    /// 生成静音负载
    Silence {
        #[arg(short, long)]
        codec: String,
        /// 帧数 (每帧 10ms)
        #[arg(short = 'n', long, default_value_t = 50)]
        frames: usize,
        #[arg(short, long)]
        output: PathBuf,
        #[arg(short = 'y', long)]
        overwrite: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => MpfConfig::load(path),
        None => Ok(MpfConfig::default()),
    };
    let config = config.unwrap_or_else(|e| {
        eprintln!("错误: {e:#}");
        process::exit(1);
    });

    // 运行时承载日志维护任务, 必须存活到命令结束
    let _log_runtime = match logging::init(config.logging.as_ref(), cli.verbose) {
        Ok(runtime) => Some(runtime),
        Err(e) => {
            eprintln!("警告: 日志初始化失败: {e:#}");
            None
        }
    };

    if let Err(e) = run(cli, &config) {
        eprintln!("错误: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli, config: &MpfConfig) -> Result<()> {
    let manager = mpf::default_codec_manager();
    info!("mpf {} 启动, 命令: {:?}", mpf::version(), cli.command);

    match cli.command {
        Command::List => {
            let families = commands::list_families(&manager);
            let configured = config.build_codec_list(&manager)?;
            if cli.json {
                let configured: Vec<String> = configured.iter().map(ToString::to_string).collect();
                let output = serde_json::json!({
                    "families": families,
                    "codecs": configured,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                println!("已注册编解码族:");
                for family in &families {
                    let pt = family
                        .payload_type
                        .map_or_else(|| "dynamic".to_string(), |pt| pt.to_string());
                    println!(
                        "  {:<6} pt={:<8} {:>2} bit  {:?}",
                        family.name, pt, family.bits_per_sample, family.sample_rates
                    );
                }
                println!("配置的编解码列表:");
                for descriptor in &configured {
                    println!("  {descriptor}");
                }
            }
        }
        Command::Dissect { codec, input } => {
            let payload = commands::read_input(&input)?;
            let report = commands::dissect(&manager, &codec, &payload)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("编解码器: {}", report.codec);
                for (index, size) in report.frame_sizes.iter().enumerate() {
                    println!("  帧 #{index}: {size} 字节");
                }
                println!("剩余: {} 字节", report.remaining);
            }
        }
        Command::Decode {
            codec,
            input,
            output,
            overwrite,
        } => {
            let payload = commands::read_input(&input)?;
            let pcm = commands::decode(&manager, &codec, &payload)?;
            commands::write_output(&output, &pcm, overwrite)?;
            eprintln!("解码完成: {} -> {} 字节", payload.len(), pcm.len());
        }
        Command::Encode {
            codec,
            input,
            output,
            overwrite,
        } => {
            let pcm = commands::read_input(&input)?;
            let payload = commands::encode(&manager, &codec, &pcm)?;
            commands::write_output(&output, &payload, overwrite)?;
            eprintln!("编码完成: {} -> {} 字节", pcm.len(), payload.len());
        }
        Command::Silence {
            codec,
            frames,
            output,
            overwrite,
        } => {
            let payload = commands::silence(&manager, &codec, frames)?;
            commands::write_output(&output, &payload, overwrite)?;
            eprintln!("已生成 {frames} 帧静音, 共 {} 字节", payload.len());
        }
    }
    Ok(())
}
