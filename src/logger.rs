use std::io::Write;

use chrono::Local;
use env_logger::Env;

/// 初始化日志输出
///
/// - 默认级别为info，可通过`RUST_LOG`环境变量调整
/// - 输出格式: `[2024-01-01 12:00:00,000] 消息内容`
pub fn init() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S,%3f"),
                record.args()
            )
        })
        .init();
}
