//! 模块参数
//!
//! 子系统启动前一次性提供，启动后不可修改。
//! 支持 insmod 风格的参数串，例如 `"num_dev=4 major=240"`。

use crate::ChrdevError;
use crate::devno::MINORMASK;

/// 默认设备数量
pub const DEFAULT_NUM_DEV: u32 = 1;

/// 子系统启动参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleParams {
    /// 设备数量，至少为 1
    pub num_dev: u32,
    /// 期望的 major，0 表示由分配器挑选
    pub major: u32,
}

impl Default for ModuleParams {
    fn default() -> Self {
        Self {
            num_dev: DEFAULT_NUM_DEV,
            major: 0,
        }
    }
}

impl ModuleParams {
    /// 创建并校验参数
    pub fn new(num_dev: u32, major: u32) -> Result<Self, ChrdevError> {
        let params = Self { num_dev, major };
        params.validate()?;
        Ok(params)
    }

    /// 解析 `key=value` 形式、以空白分隔的参数串
    ///
    /// 未出现的参数取默认值；未知参数或非法取值返回 [`ChrdevError::InvalidArgument`]。
    pub fn parse(cmdline: &str) -> Result<Self, ChrdevError> {
        let mut params = Self::default();
        for item in cmdline.split_whitespace() {
            let (key, value) = item.split_once('=').ok_or(ChrdevError::InvalidArgument)?;
            match key {
                "num_dev" => params.num_dev = parse_uint(value.as_bytes())?,
                "major" => params.major = parse_uint(value.as_bytes())?,
                _ => {
                    log::warn!("chrdev: unknown parameter '{}'", key);
                    return Err(ChrdevError::InvalidArgument);
                }
            }
        }
        params.validate()?;
        Ok(params)
    }

    /// 校验取值范围
    pub fn validate(&self) -> Result<(), ChrdevError> {
        if self.num_dev == 0 || self.num_dev > MINORMASK + 1 {
            return Err(ChrdevError::InvalidArgument);
        }
        Ok(())
    }
}

/// 按内核 `kstrtouint(s, 0, ...)` 的规则解析无符号整数
///
/// - 可选的 `+` 前缀
/// - `0x`/`0X` 为十六进制，单独的前导 `0` 为八进制，其余为十进制
/// - 允许末尾带一个换行符
pub fn parse_uint(text: &[u8]) -> Result<u32, ChrdevError> {
    let text = text.strip_suffix(b"\n").unwrap_or(text);
    let text = core::str::from_utf8(text).map_err(|_| ChrdevError::InvalidArgument)?;
    let text = text.strip_prefix('+').unwrap_or(text);

    let (digits, radix) = if let Some(hex) = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
    {
        (hex, 16)
    } else if text.len() > 1 && text.starts_with('0') {
        (&text[1..], 8)
    } else {
        (text, 10)
    };

    // from_str_radix 会接受符号前缀，这里只允许纯数字
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(ChrdevError::InvalidArgument);
    }
    u32::from_str_radix(digits, radix).map_err(|_| ChrdevError::InvalidArgument)
}
