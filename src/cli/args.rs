use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::infrastructure::config::{validate_config, AppConfig};

#[derive(Parser, Debug)]
#[command(
    name = "reviews",
    version,
    about = "影评存储工具 - 在 MongoDB 的 reviews 集合中创建、查询和维护影评",
)]
pub struct Args {
    /// 配置文件路径 (toml / yaml / json)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// 存储提供商 (mongodb 或 memory)，覆盖配置文件和环境变量
    #[arg(short = 'P', long)]
    pub provider: Option<String>,

    /// 以 JSON 格式输出
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// 输出调试日志
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    /// 命令行参数优先级最高，覆盖后重新验证配置
    pub fn apply_overrides(&self, config: &mut AppConfig) -> anyhow::Result<()> {
        if let Some(provider) = &self.provider {
            config.storage.provider = provider.parse()?;
        }
        if self.verbose {
            config.logging.level = "debug".to_string();
        }

        validate_config(config)?;
        Ok(())
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// 新增影评，未指定 --id 时由存储层分配
    Add {
        body: String,
        #[arg(long)]
        id: Option<String>,
    },
    /// 按标识符查看影评
    Get { id: String },
    /// 列出影评
    List {
        /// 正文包含的文本 (不区分大小写)
        #[arg(long)]
        contains: Option<String>,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        offset: Option<usize>,
        /// 倒序输出
        #[arg(long, default_value_t = false)]
        desc: bool,
    },
    /// 修改影评正文
    Update { id: String, body: String },
    /// 删除影评
    Delete { id: String },
    /// 统计影评数量
    Count,
    /// 检查存储连接
    Health,
}
