use clap::Parser;
use movie_reviews::cli::{execute, Args};
use movie_reviews::infrastructure::{setup_logging, ConfigManager};
use movie_reviews::storage::ReviewRepository;
use tracing::debug;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 配置加载顺序: 默认值 < 配置文件 < .env < 环境变量 < 命令行参数
    let mut manager = ConfigManager::standard(args.config.clone());
    manager.load()?;
    let mut config = manager.into_config();

    args.apply_overrides(&mut config)?;

    setup_logging(&config.logging)?;
    debug!(
        "Using {} storage for {}.{}",
        config.storage.provider, config.storage.database_name, config.storage.collection_name
    );

    let repository = ReviewRepository::connect(config.storage).await?;
    let output = execute(&args.command, &repository).await?;
    println!("{}", output.render(args.json)?);

    if output.is_failure() {
        std::process::exit(1);
    }

    Ok(())
}
