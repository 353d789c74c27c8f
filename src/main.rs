use std::process::ExitCode;

use sshd_auth_manager::{
    CommandContext, ManagerConfig, Menu, PrivilegeGate, StdioPrompter, SystemCommandRunner,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(e) = PrivilegeGate::check() {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    let config = match ManagerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            log::error!("[main] {}", e);
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    log::debug!("[main] Using configuration: {:?}", config);

    let runner = SystemCommandRunner;
    let mut prompter = StdioPrompter::new();
    let ctx = CommandContext::new(&config, &runner);

    let status = Menu::new(ctx, &mut prompter).run().await;
    ExitCode::from(status as u8)
}
