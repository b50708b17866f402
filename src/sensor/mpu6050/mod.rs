use embedded_hal::i2c::I2c;

use crate::measurement::Measurement;

/// MPU6050默认I2C从设备地址(AD0接地)
pub const DEFAULT_ADDR: u8 = 0x68;

/// 电源管理寄存器1，写0唤醒传感器
const REG_PWR_MGMT_1: u8 = 0x6B;

// 加速度数据寄存器(高字节地址，低字节紧随其后)
const REG_ACCEL_XOUT_H: u8 = 0x3B;
const REG_ACCEL_YOUT_H: u8 = 0x3D;
const REG_ACCEL_ZOUT_H: u8 = 0x3F;

// 陀螺仪数据寄存器(高字节地址，低字节紧随其后)
const REG_GYRO_XOUT_H: u8 = 0x43;
const REG_GYRO_YOUT_H: u8 = 0x45;
const REG_GYRO_ZOUT_H: u8 = 0x47;

/// 加速度计灵敏度(±2g量程下每g对应的LSB)
pub const ACCEL_SENSITIVITY: f64 = 16384.0;

/// 将高低两个字节按大端序组合为16位有符号整数(二进制补码)
///
/// - 组合值 >= 0x8000 时为负数，即 `value - 65536`
pub fn decode_word(high: u8, low: u8) -> i16 {
    i16::from_be_bytes([high, low])
}

/// 将加速度原始值换算为重力加速度单位(g)
pub fn scale_acceleration(raw: i16) -> f64 {
    raw as f64 / ACCEL_SENSITIVITY
}

/// MPU6050六轴(加速度 + 陀螺仪)传感器封装对象
///
/// 总线类型只要求实现`embedded_hal::i2c::I2c`，
/// 树莓派上使用`rppal::i2c::I2c`即可
pub struct MPU6050<I2C> {
    /// I2C通信句柄
    i2c_handle: I2C,
    /// I2C从设备地址
    /// - MPU6050的地址通常为: 0x68
    i2c_addr: u8,
}

/// 实现MPU6050传感器操作
impl<I2C: I2c> MPU6050<I2C> {
    /// 创建MPU6050传感器实例
    pub fn new(i2c_handle: I2C, i2c_addr: u8) -> Self {
        Self {
            i2c_handle,
            i2c_addr,
        }
    }

    /// 取回I2C通信句柄
    pub fn release(self) -> I2C {
        self.i2c_handle
    }

    /// 写单个寄存器
    fn write_register(&mut self, reg: u8, value: u8) -> anyhow::Result<()> {
        self.i2c_handle
            .write(self.i2c_addr, &[reg, value])
            .map_err(|err| anyhow::anyhow!("写寄存器0x{:02X}失败: {:?}", reg, err))
    }

    /// 读单个寄存器
    fn read_register(&mut self, reg: u8) -> anyhow::Result<u8> {
        let mut data = [0u8; 1];
        self.i2c_handle
            .write_read(self.i2c_addr, &[reg], &mut data)
            .map_err(|err| anyhow::anyhow!("读寄存器0x{:02X}失败: {:?}", reg, err))?;
        Ok(data[0])
    }

    /// 读取16位有符号数据
    ///
    /// 高字节位于`reg`，低字节位于`reg + 1`，分两次单字节读取
    fn read_word(&mut self, reg: u8) -> anyhow::Result<i16> {
        let high = self.read_register(reg)?;
        let low = self.read_register(reg + 1)?;
        Ok(decode_word(high, low))
    }

    /// 唤醒传感器(上电后默认处于休眠状态，读到的数据无效)
    pub fn wake(&mut self) -> anyhow::Result<()> {
        self.write_register(REG_PWR_MGMT_1, 0x00)
    }

    /// 读取一次六轴数据
    ///
    /// 每次读取前都会重新唤醒传感器，任何总线错误直接返回，不做重试
    pub fn read(&mut self) -> anyhow::Result<Measurement> {
        // 唤醒传感器
        self.wake()?;

        // 读取陀螺仪原始数据
        let gyro_x = self.read_word(REG_GYRO_XOUT_H)?;
        let gyro_y = self.read_word(REG_GYRO_YOUT_H)?;
        let gyro_z = self.read_word(REG_GYRO_ZOUT_H)?;

        // 读取加速度原始数据
        let accel_x = self.read_word(REG_ACCEL_XOUT_H)?;
        let accel_y = self.read_word(REG_ACCEL_YOUT_H)?;
        let accel_z = self.read_word(REG_ACCEL_ZOUT_H)?;

        // 加速度换算为g，角速度保持原始值
        Ok(Measurement {
            x_acceleration: scale_acceleration(accel_x),
            y_acceleration: scale_acceleration(accel_y),
            z_acceleration: scale_acceleration(accel_z),
            x_rotation: gyro_x,
            y_rotation: gyro_y,
            z_rotation: gyro_z,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{ErrorKind, ErrorType, Operation};

    /// 模拟寄存器的I2C总线
    struct RegisterBus {
        regs: [u8; 256],
        pointer: u8,
        writes: Vec<(u8, u8)>,
        addresses: Vec<u8>,
    }

    impl RegisterBus {
        fn new() -> Self {
            Self {
                regs: [0u8; 256],
                pointer: 0,
                writes: Vec::new(),
                addresses: Vec::new(),
            }
        }

        fn set_word(&mut self, reg: u8, value: i16) {
            let [high, low] = value.to_be_bytes();
            self.regs[reg as usize] = high;
            self.regs[reg as usize + 1] = low;
        }
    }

    impl ErrorType for RegisterBus {
        type Error = ErrorKind;
    }

    impl I2c for RegisterBus {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            self.addresses.push(address);
            for op in operations {
                match op {
                    Operation::Write(bytes) => {
                        self.pointer = bytes[0];
                        if let Some(value) = bytes.get(1) {
                            self.regs[self.pointer as usize] = *value;
                            self.writes.push((self.pointer, *value));
                        }
                    }
                    Operation::Read(buf) => {
                        for b in buf.iter_mut() {
                            *b = self.regs[self.pointer as usize];
                            self.pointer = self.pointer.wrapping_add(1);
                        }
                    }
                }
            }
            Ok(())
        }
    }

    /// 始终失败的总线
    struct BrokenBus;

    impl ErrorType for BrokenBus {
        type Error = ErrorKind;
    }

    impl I2c for BrokenBus {
        fn transaction(&mut self, _: u8, _: &mut [Operation<'_>]) -> Result<(), Self::Error> {
            Err(ErrorKind::Other)
        }
    }

    #[test]
    fn decode_word_twos_complement() {
        assert_eq!(decode_word(0x00, 0x01), 1);
        assert_eq!(decode_word(0x80, 0x00), -32768);
        assert_eq!(decode_word(0xFF, 0xFF), -1);
        assert_eq!(decode_word(0x7F, 0xFF), 32767);
    }

    #[test]
    fn acceleration_scaled_to_g() {
        assert_eq!(scale_acceleration(16384), 1.0);
        assert_eq!(scale_acceleration(-8192), -0.5);
        assert_eq!(scale_acceleration(0), 0.0);
    }

    #[test]
    fn read_wakes_then_decodes_all_axes() {
        let mut bus = RegisterBus::new();
        // 休眠位
        bus.regs[REG_PWR_MGMT_1 as usize] = 0x40;
        bus.set_word(REG_ACCEL_XOUT_H, 16384);
        bus.set_word(REG_ACCEL_YOUT_H, -16384);
        bus.set_word(REG_ACCEL_ZOUT_H, 8192);
        bus.set_word(REG_GYRO_XOUT_H, 131);
        bus.set_word(REG_GYRO_YOUT_H, -262);
        bus.set_word(REG_GYRO_ZOUT_H, -1);

        let mut sensor = MPU6050::new(bus, DEFAULT_ADDR);
        let measurement = sensor.read().unwrap();

        assert_eq!(
            measurement,
            Measurement {
                x_acceleration: 1.0,
                y_acceleration: -1.0,
                z_acceleration: 0.5,
                x_rotation: 131,
                y_rotation: -262,
                z_rotation: -1,
            }
        );

        let bus = sensor.release();
        assert_eq!(bus.writes, vec![(REG_PWR_MGMT_1, 0x00)]);
        assert!(bus.addresses.iter().all(|addr| *addr == DEFAULT_ADDR));
        // 1次唤醒 + 6个通道各2次单字节读取
        assert_eq!(bus.addresses.len(), 13);
    }

    #[test]
    fn read_wakes_on_every_call() {
        let mut sensor = MPU6050::new(RegisterBus::new(), DEFAULT_ADDR);
        sensor.read().unwrap();
        sensor.read().unwrap();
        assert_eq!(sensor.release().writes.len(), 2);
    }

    #[test]
    fn bus_error_propagates() {
        let mut sensor = MPU6050::new(BrokenBus, DEFAULT_ADDR);
        let err = sensor.read().unwrap_err();
        assert!(err.to_string().contains("0x6B"));
    }
}
