use anyhow::Result;
use clap::Parser;

use study_buddy::cli::Cli;
use study_buddy::utils::logging;
use study_buddy::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let config = Config::from_env();

    // 初始化日志
    logging::init(cli.verbose || config.verbose_logging);

    // 初始化并运行应用
    let app = App::initialize(config, &cli.command)?;
    app.run(cli.command).await?;

    Ok(())
}
