use aula_server::{Config, Server, print_banner, setup_environment};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. 设置环境 (dotenv, 日志)
    setup_environment()?;

    print_banner();

    tracing::info!("Aula server starting...");

    // 2. 加载配置
    let config = Config::from_env();
    config.validate()?;

    // 3. 启动 HTTP 服务器 (Server::run 会初始化状态并启动后台任务)
    let server = Server::new(config);

    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
