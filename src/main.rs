use std::path::Path;

use log::info;
use raspi_motion_sampler::config::{AppConfig, DEFAULT_CONFIG_FILE};
use raspi_motion_sampler::control::ControlState;
use raspi_motion_sampler::logger;
use raspi_motion_sampler::sampler::{Sampler, request_shutdown};
use raspi_motion_sampler::sensor::mpu6050::MPU6050;
use raspi_motion_sampler::store::RedisStore;
use rppal::i2c::I2c;

/// 定时读取MPU6050并写入Redis数据流
///
/// 用法: motion-sampler [配置文件路径]
fn main() -> anyhow::Result<()> {
    logger::init();

    // 唯一的可选参数为配置文件路径
    let config_file = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());

    info!("读取配置文件 {}", config_file);
    let config = AppConfig::load(Path::new(&config_file))?;

    info!(
        "连接Redis: host={}, port={}, db={}",
        config.redis.host, config.redis.port, config.redis.db
    );
    let store = RedisStore::connect(&config.redis)?;

    // 初始化I2C通信总线
    info!(
        "打开I2C总线 {}，传感器地址 0x{:02X}",
        config.sensor.bus, config.sensor.address
    );
    let i2c_bus = I2c::with_bus(config.sensor.bus)?;
    let sensor = MPU6050::new(i2c_bus, config.sensor.address);

    // 第一次Ctrl-C通知主循环在等待时退出，上一次通知还没被处理时直接退出进程
    let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded(1);
    ctrlc::set_handler(move || {
        if !request_shutdown(&shutdown_tx) {
            info!("再次收到中断信号，立即退出");
            std::process::exit(0);
        }
    })?;

    let mut sampler = Sampler::new(
        store,
        sensor,
        ControlState::new(config.interval_seconds),
        shutdown_rx,
    );
    sampler.run()
}
