//! Scribe - 迭代式研究写作 Agent
//!
//! 入口：解析参数、初始化日志、加载配置与预置来源，运行一次研究写作并把最终文稿打印到 stdout。

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use scribe::config::load_config;
use scribe::research::{PreloadedSources, ResearchEvent};
use scribe::{observability, ResearchAgent};

#[derive(Parser, Debug)]
#[command(name = "scribe", version, about = "Plan, research, draft and revise an essay")]
struct Cli {
    /// 写作任务
    task: String,

    /// 最多修订次数（缺省取配置 research.default_max_revisions）
    #[arg(short = 'r', long)]
    max_revisions: Option<u32>,

    /// 预置来源 JSON（{"files": [...], "websites": [...]}）
    #[arg(short, long)]
    sources: Option<PathBuf>,

    /// 额外配置文件，覆盖 config/default.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 不写消息日志
    #[arg(long)]
    no_log: bool,

    /// debug 级别日志并打印过程事件
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    observability::init_with_default(if cli.verbose { "debug" } else { "info" });

    let cfg = load_config(cli.config.clone()).context("Failed to load config")?;
    let sources = match &cli.sources {
        Some(path) => Some(PreloadedSources::load_json(path)?),
        None => None,
    };

    let mut agent = ResearchAgent::from_config(cfg);
    if cli.no_log {
        agent = agent.without_log();
    }

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<ResearchEvent>();
    let verbose = cli.verbose;
    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if verbose {
                if let Ok(line) = serde_json::to_string(&event) {
                    eprintln!("{}", line);
                }
            }
        }
    });

    let result = agent
        .run_research_with_events(&cli.task, cli.max_revisions, sources, Some(&tx))
        .await;
    drop(tx);
    let _ = printer.await;

    let outcome = result.context("Research run failed")?;
    println!("{}", outcome.draft);
    Ok(())
}
