use std::fmt;

/// 一次测量得到的六轴数据
///
/// - 加速度已按量程换算为重力加速度单位(g)
/// - 角速度保持传感器原始值，未做换算
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    /// X轴加速度(g)
    pub x_acceleration: f64,
    /// Y轴加速度(g)
    pub y_acceleration: f64,
    /// Z轴加速度(g)
    pub z_acceleration: f64,
    /// X轴角速度(原始值)
    pub x_rotation: i16,
    /// Y轴角速度(原始值)
    pub y_rotation: i16,
    /// Z轴角速度(原始值)
    pub z_rotation: i16,
}

/// 字段名称，顺序即写入数据流的顺序
pub const FIELD_NAMES: [&str; 6] = [
    "X_acceleration",
    "Y_acceleration",
    "Z_acceleration",
    "X_rotation",
    "Y_rotation",
    "Z_rotation",
];

impl Measurement {
    /// 转换为有序的(字段名, 字段值)列表
    ///
    /// 浮点数格式见[`format_float`]
    pub fn fields(&self) -> [(&'static str, String); 6] {
        [
            (FIELD_NAMES[0], format_float(self.x_acceleration)),
            (FIELD_NAMES[1], format_float(self.y_acceleration)),
            (FIELD_NAMES[2], format_float(self.z_acceleration)),
            (FIELD_NAMES[3], self.x_rotation.to_string()),
            (FIELD_NAMES[4], self.y_rotation.to_string()),
            (FIELD_NAMES[5], self.z_rotation.to_string()),
        ]
    }
}

/// 浮点数转字符串
///
/// - 始终带小数点，例如`1.0`
/// - 科学计数法的指数带符号且至少两位，例如`6.103515625e-05`、`1e+16`
pub fn format_float(value: f64) -> String {
    let text = format!("{:?}", value);
    match text.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => text,
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.fields().iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", name, value)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Measurement {
        Measurement {
            x_acceleration: 1.0,
            y_acceleration: -0.5,
            z_acceleration: 0.25,
            x_rotation: 12,
            y_rotation: -1,
            z_rotation: 0,
        }
    }

    #[test]
    fn fields_keep_order_and_decimal_point() {
        let fields = sample().fields();
        let names: Vec<&str> = fields.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, FIELD_NAMES);
        assert_eq!(fields[0].1, "1.0");
        assert_eq!(fields[1].1, "-0.5");
        assert_eq!(fields[4].1, "-1");
    }

    #[test]
    fn small_values_use_two_digit_exponent() {
        let fields = Measurement {
            x_acceleration: 1.0 / 16384.0,
            y_acceleration: -1.0 / 16384.0,
            ..sample()
        }
        .fields();
        assert_eq!(fields[0].1, "6.103515625e-05");
        assert_eq!(fields[1].1, "-6.103515625e-05");
    }

    #[test]
    fn format_float_matches_plain_and_scientific_forms() {
        assert_eq!(format_float(0.0), "0.0");
        assert_eq!(format_float(2.0), "2.0");
        assert_eq!(format_float(0.0001), "0.0001");
        assert_eq!(format_float(1e-5), "1e-05");
        assert_eq!(format_float(1.5e-10), "1.5e-10");
        assert_eq!(format_float(1e16), "1e+16");
        assert_eq!(format_float(1e100), "1e+100");
    }

    #[test]
    fn display_lists_every_field() {
        let text = sample().to_string();
        assert!(text.starts_with("{X_acceleration: 1.0, "));
        assert!(text.ends_with("Z_rotation: 0}"));
    }
}
