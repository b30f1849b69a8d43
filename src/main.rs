//! Portal Dashboard Agent - 运维仪表盘代理
//!
//! Usage:
//! - Normal mode: `portal-dashboard-agent`
//! - With custom port: `portal-dashboard-agent --port 9000`

use portal_dashboard_agent::RuntimeConfig;

/// 解析命令行参数
fn parse_args() -> RuntimeConfig {
    let args: Vec<String> = std::env::args().collect();
    let mut config = RuntimeConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--port" if i + 1 < args.len() => {
                config.port_override = args[i + 1].parse().ok();
                i += 2;
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            _ => {
                i += 1;
            }
        }
    }

    config
}

fn print_help() {
    println!("Portal Dashboard Agent - 运维仪表盘代理");
    println!();
    println!("USAGE:");
    println!("    portal-dashboard-agent [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    --port <PORT>    Override the listening port");
    println!("    -h, --help       Print help information");
    println!();
    println!("ENVIRONMENT:");
    println!("    HOST, PORT, COMMAND_TIMEOUT_SECS, PROBE_CONCURRENCY, DOCKER_BIN,");
    println!("    REDIS_CONTAINER, WORDPRESS_CONTAINER, SITE_REGISTRY_FILE, SITE_REGISTRY,");
    println!("    BACKUP_MAILSERVER_ROOT, BACKUP_BLOG_ROOT, RUST_LOG");
}

fn main() {
    let config = parse_args();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create runtime: {}", e);
            std::process::exit(1);
        }
    };
    rt.block_on(async {
        portal_dashboard_agent::init_and_run_agent_with_config(config).await;
    });
}
