use std::path::Path;

use ini::Ini;
use log::warn;

use crate::control::parse_interval;
use crate::sensor::mpu6050;

/// 默认配置文件(当前工作目录下)
pub const DEFAULT_CONFIG_FILE: &str = "app.conf";

/// 默认I2C总线编号
pub const DEFAULT_I2C_BUS: u8 = 1;

/// Redis连接参数
#[derive(Debug, Clone, PartialEq)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub db: i64,
}

/// 传感器总线参数
#[derive(Debug, Clone, PartialEq)]
pub struct SensorConfig {
    /// I2C总线编号，树莓派通常为1
    pub bus: u8,
    /// 传感器从设备地址
    pub address: u8,
}

/// 程序配置
///
/// 每一项都优先取环境变量(非空时)，其次取配置文件
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub redis: RedisConfig,
    /// 默认测量间隔(秒)
    pub interval_seconds: f64,
    pub sensor: SensorConfig,
}

impl AppConfig {
    /// 读取配置文件并合并环境变量
    ///
    /// 配置文件不存在时不报错，所需的值可以全部来自环境变量
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let ini = if path.exists() {
            Ini::load_from_file(path)?
        } else {
            warn!("配置文件 {} 不存在，仅使用环境变量", path.display());
            Ini::new()
        };
        Self::resolve(&ini, |name| std::env::var(name).ok())
    }

    /// 按"环境变量 > 配置文件 > 默认值"的顺序解析配置
    pub fn resolve(ini: &Ini, env: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let source = Source { ini, env };

        let host = source.required("REDIS_HOST", "redis", "host")?;
        let port = source.required("REDIS_PORT", "redis", "port")?;
        let db = source.required("REDIS_DB", "redis", "db")?;
        let interval = source.required("INTERVAL_SECONDS", "measurement", "interval_seconds")?;

        let bus = match source.lookup("I2C_BUS", "sensor", "bus") {
            Some(raw) => raw
                .trim()
                .parse::<u8>()
                .map_err(|err| anyhow::anyhow!("无效的I2C总线编号 {:?}: {}", raw, err))?,
            None => DEFAULT_I2C_BUS,
        };
        let address = match source.lookup("I2C_ADDRESS", "sensor", "address") {
            Some(raw) => parse_address(&raw)?,
            None => mpu6050::DEFAULT_ADDR,
        };

        Ok(Self {
            redis: RedisConfig {
                host,
                port: port
                    .trim()
                    .parse()
                    .map_err(|err| anyhow::anyhow!("无效的Redis端口 {:?}: {}", port, err))?,
                db: db
                    .trim()
                    .parse()
                    .map_err(|err| anyhow::anyhow!("无效的Redis数据库编号 {:?}: {}", db, err))?,
            },
            interval_seconds: parse_interval(&interval)?,
            sensor: SensorConfig { bus, address },
        })
    }
}

/// 配置来源
struct Source<'a, F> {
    ini: &'a Ini,
    env: F,
}

impl<F: Fn(&str) -> Option<String>> Source<'_, F> {
    /// 查找配置项，空的环境变量视为未设置
    fn lookup(&self, var: &str, section: &str, key: &str) -> Option<String> {
        (self.env)(var)
            .filter(|value| !value.is_empty())
            .or_else(|| self.ini.get_from(Some(section), key).map(str::to_string))
    }

    /// 查找必需的配置项
    fn required(&self, var: &str, section: &str, key: &str) -> anyhow::Result<String> {
        self.lookup(var, section, key).ok_or_else(|| {
            anyhow::anyhow!("缺少配置项 [{}] {} (或环境变量 {})", section, key, var)
        })
    }
}

/// 解析I2C地址，支持十进制和`0x`开头的十六进制
pub fn parse_address(raw: &str) -> anyhow::Result<u8> {
    let raw = raw.trim();
    let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => raw.parse::<u8>(),
    };
    parsed.map_err(|err| anyhow::anyhow!("无效的I2C地址 {:?}: {}", raw, err))
}
