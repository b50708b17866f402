//! 采样主循环
//!
//! 每一轮依次执行：确认是否测量 → 测量并保存 → 确认测量间隔 → 等待。
//! 任何错误都直接返回给调用方，只有中断信号会让循环正常结束。

use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use embedded_hal::i2c::I2c;
use log::info;

use crate::control::{ControlState, KEY_MEASUREMENT_ENABLED, KEY_MEASUREMENT_INTERVAL};
use crate::sensor::mpu6050::MPU6050;
use crate::store::{KEY_MEASUREMENT_VALUES, RemoteStore};

/// 发出中断通知
///
/// 通知被主循环取走之前再次调用会返回`false`(主循环可能卡在Redis或I2C调用中)，
/// 此时调用方应直接结束进程
pub fn request_shutdown(shutdown: &Sender<()>) -> bool {
    shutdown.try_send(()).is_ok()
}

/// 采样器
pub struct Sampler<S, I2C> {
    /// 远程存储(控制键 + 数据流)
    store: S,
    /// 六轴传感器
    sensor: MPU6050<I2C>,
    /// 最近一次有效的控制状态
    state: ControlState,
    /// 中断通知
    shutdown: Receiver<()>,
}

impl<S: RemoteStore, I2C: I2c> Sampler<S, I2C> {
    /// 创建采样器
    pub fn new(
        store: S,
        sensor: MPU6050<I2C>,
        state: ControlState,
        shutdown: Receiver<()>,
    ) -> Self {
        Self {
            store,
            sensor,
            state,
            shutdown,
        }
    }

    /// 当前控制状态
    pub fn state(&self) -> ControlState {
        self.state
    }

    /// 远程存储
    pub fn store(&self) -> &S {
        &self.store
    }

    /// 远程存储(可变)
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// 循环采样，直到收到中断通知
    pub fn run(&mut self) -> anyhow::Result<()> {
        loop {
            let wait = self.cycle()?;
            match self.shutdown.recv_timeout(wait) {
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {}
            }
        }
        info!("收到中断信号，停止测量");
        Ok(())
    }

    /// 执行一轮采样，返回本轮之后需要等待的时长
    pub fn cycle(&mut self) -> anyhow::Result<Duration> {
        if self.is_measurement_enabled()? {
            info!("开始新的测量");
            let measurement = self.sensor.read()?;
            let id = self
                .store
                .append(KEY_MEASUREMENT_VALUES, &measurement.fields())?;
            info!("已保存测量数据 {}: {}", id, measurement);
        }

        let interval_seconds = self.read_measurement_interval()?;
        // 负数、NaN、无穷大无法等待
        Duration::try_from_secs_f64(interval_seconds)
            .map_err(|err| anyhow::anyhow!("无法按 {} 秒等待: {}", interval_seconds, err))
    }

    /// 读取远程的"是否测量"，远程未设置时沿用上一次的值
    fn is_measurement_enabled(&mut self) -> anyhow::Result<bool> {
        let remote = self.store.get(KEY_MEASUREMENT_ENABLED)?;
        let next = self.state.apply_enabled(remote.as_deref());

        if next.enabled != self.state.enabled {
            info!(
                "{}",
                if next.enabled {
                    "测量已恢复"
                } else {
                    "测量已暂停"
                }
            );
        }

        self.state = next;
        Ok(next.enabled)
    }

    /// 读取远程的测量间隔，远程未设置时沿用上一次的值
    fn read_measurement_interval(&mut self) -> anyhow::Result<f64> {
        let remote = self.store.get(KEY_MEASUREMENT_INTERVAL)?;
        let next = self.state.apply_interval(remote.as_deref())?;

        if next.interval_seconds != self.state.interval_seconds {
            info!("新的测量间隔: {} 秒", next.interval_seconds);
        }

        self.state = next;
        Ok(next.interval_seconds)
    }
}
