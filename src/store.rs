use redis::Commands;

use crate::config::RedisConfig;

/// 远程数据流键: 测量数据
pub const KEY_MEASUREMENT_VALUES: &str = "measurement:values";

/// 远程键值/数据流存储
pub trait RemoteStore {
    /// 读取字符串键，键不存在时返回`None`
    fn get(&mut self, key: &str) -> anyhow::Result<Option<String>>;

    /// 向数据流追加一条记录，返回记录ID
    fn append(&mut self, stream: &str, fields: &[(&str, String)]) -> anyhow::Result<String>;
}

/// 基于Redis的远程存储
pub struct RedisStore {
    /// Redis连接
    conn: redis::Connection,
}

impl RedisStore {
    /// 连接Redis
    pub fn connect(config: &RedisConfig) -> anyhow::Result<Self> {
        let url = format!("redis://{}:{}/{}", config.host, config.port, config.db);
        let client = redis::Client::open(url)?;
        let conn = client.get_connection()?;
        Ok(Self { conn })
    }
}

impl RemoteStore for RedisStore {
    fn get(&mut self, key: &str) -> anyhow::Result<Option<String>> {
        let value: Option<String> = self.conn.get(key)?;
        Ok(value)
    }

    fn append(&mut self, stream: &str, fields: &[(&str, String)]) -> anyhow::Result<String> {
        // "*"由服务端生成记录ID
        let id: String = self.conn.xadd(stream, "*", fields)?;
        Ok(id)
    }
}
