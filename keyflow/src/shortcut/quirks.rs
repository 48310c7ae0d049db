//! 平台兼容修正模块
//!
//! 为固定白名单内的快捷键补注一个小键盘旧式加速键。
//! 历史上缩放快捷键在部分键盘布局下只能通过小键盘的 `+`/`-`/`0` 触发，
//! 因此当这些快捷键仍保持出厂默认按键时，额外注册一个 `numadd`/`numsub`/`num0`
//! 变体。用户自定义过按键后不再补注。
//!
//! 白名单是唯一的扩展点，不从任何通用规则推导。

use super::accelerator;

/// 小键盘修正白名单：快捷键名称 → 小键盘按键 token
const NUMPAD_QUIRKS: &[(&str, &str)] = &[
    ("zoom_in", "numadd"),
    ("zoom_out", "numsub"),
    ("zoom_reset", "num0"),
];

/// 计算快捷键的小键盘附加加速键
///
/// 仅当快捷键在白名单内、且解析后的按键序列与定义默认值完全一致
/// （长度和顺序都相同）时返回附加加速键；否则返回 `None`。
pub fn numpad_variant(name: &str, resolved_key: &[String], default_key: &[String]) -> Option<String> {
    let pad_token = NUMPAD_QUIRKS
        .iter()
        .find(|(quirk_name, _)| *quirk_name == name)
        .map(|(_, token)| *token)?;

    if resolved_key != default_key {
        return None;
    }

    // 保留修饰键，把末位按键替换为小键盘按键
    let mut tokens: Vec<String> = resolved_key.to_vec();
    *tokens.last_mut()? = pad_token.to_string();

    match accelerator::translate(&tokens) {
        Ok(accel) => Some(accel),
        Err(e) => {
            tracing::warn!(shortcut = %name, error = %e, "Numpad variant translation failed");
            None
        }
    }
}
