use anyhow::Result;
use document_processor::utils::logging;
use document_processor::{App, Config};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::from_env();

    // 初始化日志
    logging::init(config.verbose_logging);

    // 初始化并运行应用
    let outcome = App::initialize(config).await?.run().await?;
    info!("✅ {}", outcome.message());

    Ok(())
}
