//! 测量控制状态
//!
//! 本地保存最近一次有效的"是否测量"和"测量间隔"，
//! 远程键存在时以远程值为准，不存在时沿用本地值。

/// 远程键: 是否进行测量，值为`"0"`时暂停，其他任意值均视为继续
pub const KEY_MEASUREMENT_ENABLED: &str = "measurement:enabled";
/// 远程键: 两次测量之间的间隔秒数
pub const KEY_MEASUREMENT_INTERVAL: &str = "measurement:interval";

/// 解析远程的"是否测量"值
///
/// 只有字符串`"0"`表示暂停，空字符串或任何其他内容都表示继续
pub fn parse_enabled(raw: &str) -> bool {
    raw != "0"
}

/// 解析远程的测量间隔(秒)
///
/// 允许首尾空白，无法解析为浮点数时返回错误；不对负数或0做修正
pub fn parse_interval(raw: &str) -> anyhow::Result<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|err| anyhow::anyhow!("无效的测量间隔 {:?}: {}", raw, err))
}

/// 最近一次有效的控制状态
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlState {
    /// 是否进行测量
    pub enabled: bool,
    /// 测量间隔(秒)
    pub interval_seconds: f64,
}

impl ControlState {
    /// 以配置的默认间隔创建，初始为启用状态
    pub fn new(interval_seconds: f64) -> Self {
        Self {
            enabled: true,
            interval_seconds,
        }
    }

    /// 合并远程的"是否测量"值，`None`表示远程未设置
    pub fn apply_enabled(self, remote: Option<&str>) -> Self {
        match remote {
            Some(raw) => Self {
                enabled: parse_enabled(raw),
                ..self
            },
            None => self,
        }
    }

    /// 合并远程的测量间隔，`None`表示远程未设置
    pub fn apply_interval(self, remote: Option<&str>) -> anyhow::Result<Self> {
        match remote {
            Some(raw) => Ok(Self {
                interval_seconds: parse_interval(raw)?,
                ..self
            }),
            None => Ok(self),
        }
    }
}
