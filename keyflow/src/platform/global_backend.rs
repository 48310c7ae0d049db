//! global-hotkey 后端
//!
//! 基于 `global-hotkey` crate 的系统热键设施实现。
//! 负责把加速键字符串解析为 `Modifiers` + `Code`，并维护
//! 加速键 ↔ 热键 id 的映射供事件回查。
//!
//! # 使用示例
//!
//! ```ignore
//! use keyflow::platform::GlobalHotkeyBackend;
//! use global_hotkey::GlobalHotKeyEvent;
//!
//! // 必须在主线程创建
//! let backend = std::sync::Arc::new(GlobalHotkeyBackend::new()?);
//!
//! // 宿主事件循环中，把热键事件回查为加速键再交给管理器
//! if let Ok(event) = GlobalHotKeyEvent::receiver().try_recv() {
//!     if let Some(accel) = backend.accelerator_for(event.id) {
//!         manager.handle_key_event(&accel, None);
//!     }
//! }
//! ```

use std::collections::HashMap;
use std::sync::Mutex;

use global_hotkey::{
    GlobalHotKeyManager,
    hotkey::{Code, HotKey, Modifiers},
};

use super::backend::{BackendError, BackendResult, HotkeyBackend};

/// 平台对应的 `CommandOrControl` 修饰键
fn command_or_control() -> Modifiers {
    #[cfg(target_os = "macos")]
    {
        Modifiers::META
    }
    #[cfg(not(target_os = "macos"))]
    {
        Modifiers::CONTROL
    }
}

/// 解析修饰键 token
fn modifier(token: &str) -> Option<Modifiers> {
    Some(match token {
        "CommandOrControl" => command_or_control(),
        "Ctrl" => Modifiers::CONTROL,
        "Alt" => Modifiers::ALT,
        "Shift" => Modifiers::SHIFT,
        "Super" => Modifiers::SUPER,
        "AltGr" => Modifiers::ALT_GRAPH,
        _ => return None,
    })
}

/// 解析按键 token
fn key_code(token: &str) -> Option<Code> {
    // 单字母 / 单数字
    let mut chars = token.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        let code = match c {
            'A' => Code::KeyA,
            'B' => Code::KeyB,
            'C' => Code::KeyC,
            'D' => Code::KeyD,
            'E' => Code::KeyE,
            'F' => Code::KeyF,
            'G' => Code::KeyG,
            'H' => Code::KeyH,
            'I' => Code::KeyI,
            'J' => Code::KeyJ,
            'K' => Code::KeyK,
            'L' => Code::KeyL,
            'M' => Code::KeyM,
            'N' => Code::KeyN,
            'O' => Code::KeyO,
            'P' => Code::KeyP,
            'Q' => Code::KeyQ,
            'R' => Code::KeyR,
            'S' => Code::KeyS,
            'T' => Code::KeyT,
            'U' => Code::KeyU,
            'V' => Code::KeyV,
            'W' => Code::KeyW,
            'X' => Code::KeyX,
            'Y' => Code::KeyY,
            'Z' => Code::KeyZ,
            '0' => Code::Digit0,
            '1' => Code::Digit1,
            '2' => Code::Digit2,
            '3' => Code::Digit3,
            '4' => Code::Digit4,
            '5' => Code::Digit5,
            '6' => Code::Digit6,
            '7' => Code::Digit7,
            '8' => Code::Digit8,
            '9' => Code::Digit9,
            '=' => Code::Equal,
            '-' => Code::Minus,
            ',' => Code::Comma,
            '.' => Code::Period,
            '/' => Code::Slash,
            ';' => Code::Semicolon,
            '\'' => Code::Quote,
            '[' => Code::BracketLeft,
            ']' => Code::BracketRight,
            '\\' => Code::Backslash,
            '`' => Code::Backquote,
            _ => return None,
        };
        return Some(code);
    }

    let code = match token {
        "Space" => Code::Space,
        "Tab" => Code::Tab,
        "Enter" => Code::Enter,
        "Escape" | "Esc" => Code::Escape,
        "Backspace" => Code::Backspace,
        "Delete" => Code::Delete,
        "Insert" => Code::Insert,
        "Home" => Code::Home,
        "End" => Code::End,
        "PageUp" => Code::PageUp,
        "PageDown" => Code::PageDown,
        "Up" => Code::ArrowUp,
        "Down" => Code::ArrowDown,
        "Left" => Code::ArrowLeft,
        "Right" => Code::ArrowRight,
        "PrintScreen" => Code::PrintScreen,
        "CapsLock" => Code::CapsLock,
        "NumLock" => Code::NumLock,
        "ScrollLock" => Code::ScrollLock,
        "numadd" => Code::NumpadAdd,
        "numsub" => Code::NumpadSubtract,
        "nummult" => Code::NumpadMultiply,
        "numdiv" => Code::NumpadDivide,
        "numdec" => Code::NumpadDecimal,
        "num0" => Code::Numpad0,
        "num1" => Code::Numpad1,
        "num2" => Code::Numpad2,
        "num3" => Code::Numpad3,
        "num4" => Code::Numpad4,
        "num5" => Code::Numpad5,
        "num6" => Code::Numpad6,
        "num7" => Code::Numpad7,
        "num8" => Code::Numpad8,
        "num9" => Code::Numpad9,
        "F1" => Code::F1,
        "F2" => Code::F2,
        "F3" => Code::F3,
        "F4" => Code::F4,
        "F5" => Code::F5,
        "F6" => Code::F6,
        "F7" => Code::F7,
        "F8" => Code::F8,
        "F9" => Code::F9,
        "F10" => Code::F10,
        "F11" => Code::F11,
        "F12" => Code::F12,
        "F13" => Code::F13,
        "F14" => Code::F14,
        "F15" => Code::F15,
        "F16" => Code::F16,
        "F17" => Code::F17,
        "F18" => Code::F18,
        "F19" => Code::F19,
        "F20" => Code::F20,
        "F21" => Code::F21,
        "F22" => Code::F22,
        "F23" => Code::F23,
        "F24" => Code::F24,
        _ => return None,
    };
    Some(code)
}

fn parse_error(accelerator: &str, reason: impl Into<String>) -> BackendError {
    BackendError::Failed {
        accelerator: accelerator.to_string(),
        reason: reason.into(),
    }
}

/// 把加速键字符串解析为 `HotKey`
///
/// 要求零或多个修饰键加恰好一个按键
pub fn parse_accelerator(accelerator: &str) -> BackendResult<HotKey> {
    let mut mods = Modifiers::empty();
    let mut code: Option<Code> = None;

    for token in accelerator.split('+').filter(|t| !t.is_empty()) {
        if let Some(modifier) = modifier(token) {
            mods |= modifier;
            continue;
        }
        let key = key_code(token)
            .ok_or_else(|| parse_error(accelerator, format!("unsupported key '{token}'")))?;
        if code.replace(key).is_some() {
            return Err(parse_error(accelerator, "more than one key code"));
        }
    }

    let code = code.ok_or_else(|| parse_error(accelerator, "no key code"))?;
    let mods = if mods.is_empty() { None } else { Some(mods) };
    Ok(HotKey::new(mods, code))
}

/// 基于 `global-hotkey` 的系统热键后端
///
/// 注意：`GlobalHotKeyManager` 必须在主线程创建
pub struct GlobalHotkeyBackend {
    manager: Mutex<GlobalHotKeyManager>,
    by_accelerator: Mutex<HashMap<String, HotKey>>,
    by_id: Mutex<HashMap<u32, String>>,
}

impl GlobalHotkeyBackend {
    /// 创建后端
    pub fn new() -> anyhow::Result<Self> {
        let manager = GlobalHotKeyManager::new()
            .map_err(|e| anyhow::anyhow!("Failed to create global hotkey manager: {e}"))?;

        Ok(Self {
            manager: Mutex::new(manager),
            by_accelerator: Mutex::new(HashMap::new()),
            by_id: Mutex::new(HashMap::new()),
        })
    }

    /// 按热键 id 回查加速键字符串
    ///
    /// 宿主事件循环用它把 `GlobalHotKeyEvent` 还原为加速键
    pub fn accelerator_for(&self, hotkey_id: u32) -> Option<String> {
        self.by_id.lock().ok()?.get(&hotkey_id).cloned()
    }
}

impl HotkeyBackend for GlobalHotkeyBackend {
    fn register(&self, accelerator: &str) -> BackendResult<()> {
        let hotkey = parse_accelerator(accelerator)?;

        let manager = self
            .manager
            .lock()
            .map_err(|_| parse_error(accelerator, "hotkey manager lock poisoned"))?;

        if let Err(e) = manager.register(hotkey) {
            return Err(match e {
                global_hotkey::Error::AlreadyRegistered(_) => BackendError::Rejected {
                    accelerator: accelerator.to_string(),
                    reason: "already registered by another consumer".to_string(),
                },
                global_hotkey::Error::FailedToRegister(msg) => BackendError::Rejected {
                    accelerator: accelerator.to_string(),
                    reason: msg,
                },
                other => BackendError::Failed {
                    accelerator: accelerator.to_string(),
                    reason: other.to_string(),
                },
            });
        }

        if let Ok(mut map) = self.by_accelerator.lock() {
            map.insert(accelerator.to_string(), hotkey);
        }
        if let Ok(mut map) = self.by_id.lock() {
            map.insert(hotkey.id(), accelerator.to_string());
        }

        tracing::debug!(accelerator = %accelerator, id = hotkey.id(), "Registered OS hotkey");
        Ok(())
    }

    fn unregister(&self, accelerator: &str) -> BackendResult<()> {
        let hotkey = match self.by_accelerator.lock() {
            Ok(mut map) => map.remove(accelerator),
            Err(_) => return Err(parse_error(accelerator, "hotkey map lock poisoned")),
        };

        // 未注册过视为无操作
        let Some(hotkey) = hotkey else {
            return Ok(());
        };

        if let Ok(mut map) = self.by_id.lock() {
            map.remove(&hotkey.id());
        }

        let manager = self
            .manager
            .lock()
            .map_err(|_| parse_error(accelerator, "hotkey manager lock poisoned"))?;

        manager.unregister(hotkey).map_err(|e| BackendError::Failed {
            accelerator: accelerator.to_string(),
            reason: e.to_string(),
        })?;

        tracing::debug!(accelerator = %accelerator, "Unregistered OS hotkey");
        Ok(())
    }
}
