use anyhow::Context;
use pronto_server::auth::register_employee;
use pronto_server::{Config, Server, ServerState, print_banner, setup_environment};
use shared::models::{EmployeeCreate, Role};

/// 首次启动时创建超级管理员
///
/// `BOOTSTRAP_ADMIN_EMAIL` + `BOOTSTRAP_ADMIN_PASSWORD` 都设置且账号不存在时创建。
fn bootstrap_admin(state: &ServerState) -> anyhow::Result<()> {
    let (Ok(email), Ok(password)) = (
        std::env::var("BOOTSTRAP_ADMIN_EMAIL"),
        std::env::var("BOOTSTRAP_ADMIN_PASSWORD"),
    ) else {
        return Ok(());
    };

    if state
        .store
        .employee_by_email(&email.trim().to_lowercase())?
        .is_some()
    {
        return Ok(());
    }

    let employee = register_employee(
        &state.store,
        EmployeeCreate {
            email,
            display_name: "Administrator".to_string(),
            password,
            primary_role: Role::SuperAdmin,
            additional_roles: Default::default(),
        },
    )
    .map_err(|e| anyhow::anyhow!("{}", e))?;
    tracing::info!(employee_id = employee.id, email = %employee.email, "Bootstrap admin created");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 设置环境 (dotenv, 日志)
    setup_environment();

    print_banner();

    // 2. 加载配置
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(
        environment = %config.environment,
        work_dir = %config.work_dir,
        "🍽  Pronto server starting..."
    );

    // 3. 初始化服务器状态
    let state = ServerState::initialize(&config).context("Failed to initialize server state")?;
    bootstrap_admin(&state)?;

    // 4. 启动 HTTP 服务器
    let server = Server::with_state(config, state);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
