//! 展示层数值格式化
//!
//! 内部保留原始精度，只在序列化时四舍五入到两位小数

use serde::Serializer;

pub const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// 四舍五入到两位小数
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// serde `serialize_with`：输出两位小数
pub fn two_decimals<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(round2(*value))
}

/// 字节数转 MB
pub fn bytes_to_mb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MB
}

/// 百分比，分母为 0 时返回 0
pub fn percent(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}
