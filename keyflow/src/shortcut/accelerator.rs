//! 加速键翻译模块
//!
//! 将有序的语义按键 token 序列翻译为单个系统加速键字符串。
//! 所有平台相关的按键命名差异都收敛在本模块和 `quirks` 模块内，
//! 其余组件只接触语义 token。
//!
//! # 翻译规则
//!
//! - 别名表做平台中立名称的归一化（`ArrowUp` → `Up`、`Slash` → `/` 等）
//! - `KeyX` / `DigitN` 前缀（Web KeyboardEvent.code 风格）剥离为字面按键
//! - 归一化后的 token 必须是已知修饰键、已知命名按键、F1-F24 或单个可见字符
//! - 任一 token 无法识别则整个组合翻译失败，绝不输出部分加速键

use super::error::{ShortcutError, ShortcutResult};

/// 别名表：平台中立名称 → 加速键 token
///
/// 表中没有的 token 原样通过（按字面按键处理，如 `A`、`F5`）
fn alias(token: &str) -> Option<&'static str> {
    Some(match token {
        "Command" | "Cmd" | "CommandOrControl" | "CmdOrCtrl" => "CommandOrControl",
        "Control" | "Ctrl" => "Ctrl",
        "Option" | "Alt" => "Alt",
        "Meta" => "Super",
        "Return" => "Enter",
        "ArrowUp" => "Up",
        "ArrowDown" => "Down",
        "ArrowLeft" => "Left",
        "ArrowRight" => "Right",
        "Slash" => "/",
        "Backslash" => "\\",
        "BracketLeft" => "[",
        "BracketRight" => "]",
        "Semicolon" => ";",
        "Quote" => "'",
        "Comma" => ",",
        "Period" => ".",
        "Minus" => "-",
        "Equal" => "=",
        "Backquote" => "`",
        _ => return None,
    })
}

/// 将单个 token 归一化为加速键 token
fn normalize(token: &str) -> String {
    if let Some(mapped) = alias(token) {
        return mapped.to_string();
    }

    // Web KeyboardEvent.code 风格：KeyA / Digit3
    if let Some(rest) = token.strip_prefix("Key") {
        if rest.len() == 1 && rest.chars().all(|c| c.is_ascii_uppercase()) {
            return rest.to_string();
        }
    }
    if let Some(rest) = token.strip_prefix("Digit") {
        if rest.len() == 1 && rest.chars().all(|c| c.is_ascii_digit()) {
            return rest.to_string();
        }
    }

    token.to_string()
}

/// 检查归一化后的 token 是否为修饰键
pub fn is_modifier(token: &str) -> bool {
    matches!(
        token,
        "CommandOrControl" | "Ctrl" | "Alt" | "Shift" | "Super" | "AltGr"
    )
}

/// 检查归一化后的 token 是否为已知命名按键
fn is_named_key(token: &str) -> bool {
    matches!(
        token,
        "Up" | "Down"
            | "Left"
            | "Right"
            | "Space"
            | "Tab"
            | "Enter"
            | "Escape"
            | "Esc"
            | "Backspace"
            | "Delete"
            | "Insert"
            | "Home"
            | "End"
            | "PageUp"
            | "PageDown"
            | "PrintScreen"
            | "CapsLock"
            | "NumLock"
            | "ScrollLock"
            | "numadd"
            | "numsub"
            | "nummult"
            | "numdiv"
            | "numdec"
    ) || is_numpad_digit(token)
}

fn is_numpad_digit(token: &str) -> bool {
    token
        .strip_prefix("num")
        .is_some_and(|rest| rest.len() == 1 && rest.chars().all(|c| c.is_ascii_digit()))
}

/// 检查是否为功能键 F1-F24
fn is_function_key(token: &str) -> bool {
    token
        .strip_prefix('F')
        .and_then(|rest| rest.parse::<u8>().ok())
        .is_some_and(|n| (1..=24).contains(&n))
}

/// 检查归一化后的 token 是否可以出现在加速键中
fn is_valid(token: &str) -> bool {
    if is_modifier(token) || is_named_key(token) || is_function_key(token) {
        return true;
    }
    // 单个可见 ASCII 字符按字面按键处理
    let mut chars = token.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if c.is_ascii_graphic())
}

/// 将语义 token 序列翻译为加速键字符串
///
/// token 按输入顺序以 `+` 连接。任一 token 无法识别时整个组合失败，
/// 返回 [`ShortcutError::UnknownToken`]；空序列返回
/// [`ShortcutError::EmptyCombination`]。
///
/// # Examples
///
/// ```
/// use keyflow::shortcut::translate;
///
/// assert_eq!(
///     translate(&["CommandOrControl", "Shift", "F"]).unwrap(),
///     "CommandOrControl+Shift+F"
/// );
/// assert_eq!(translate(&["ArrowUp"]).unwrap(), "Up");
/// assert_eq!(translate(&["Comma"]).unwrap(), ",");
/// assert!(translate(&["NotAKey???"]).is_err());
/// ```
pub fn translate<S: AsRef<str>>(tokens: &[S]) -> ShortcutResult<String> {
    if tokens.is_empty() {
        return Err(ShortcutError::EmptyCombination);
    }

    let mut parts = Vec::with_capacity(tokens.len());
    for token in tokens {
        let raw = token.as_ref();
        let normalized = normalize(raw);
        if !is_valid(&normalized) {
            return Err(ShortcutError::UnknownToken(raw.to_string()));
        }
        parts.push(normalized);
    }

    Ok(parts.join("+"))
}
