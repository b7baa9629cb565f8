use crate::guide::state::InteractionMode;
use anyhow::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    Escape,
    F5,
    Plus,
    Minus,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyModifiers {
    pub ctrl: bool,
    pub shift: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyEvent {
    pub const fn new(key: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { key, modifiers }
    }

    pub const fn plain(key: KeyCode) -> Self {
        Self {
            key,
            modifiers: KeyModifiers {
                ctrl: false,
                shift: false,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjustDirection {
    Increase,
    Decrease,
}

impl AdjustDirection {
    pub fn sign(self) -> f32 {
        match self {
            Self::Increase => 1.0,
            Self::Decrease => -1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    Quit,
    ToggleMode,
    AdjustGhostRadius(AdjustDirection),
    AdjustPocketWidths(AdjustDirection),
}

/// Commands bound to a key press. Ctrl and Shift can be held together, in
/// which case both adjustments apply.
pub fn map_key_event_to_commands(event: KeyEvent) -> Vec<KeyCommand> {
    let direction = match event.key {
        KeyCode::Escape => return vec![KeyCommand::Quit],
        KeyCode::F5 => return vec![KeyCommand::ToggleMode],
        KeyCode::Plus => AdjustDirection::Increase,
        KeyCode::Minus => AdjustDirection::Decrease,
        KeyCode::Other => return Vec::new(),
    };

    let mut commands = Vec::with_capacity(2);
    if event.modifiers.ctrl {
        commands.push(KeyCommand::AdjustGhostRadius(direction));
    }
    if event.modifiers.shift {
        commands.push(KeyCommand::AdjustPocketWidths(direction));
    }
    commands
}

/// Whether the global hook should swallow the key instead of passing it to the
/// focused application. The hook is system-wide, so anything swallowed here
/// never reaches the game or any other window.
///
/// Only F5 is swallowed in Play mode; Ctrl/Shift with plus or minus still
/// adjust the guide but also reach the game (chat input, bindings). Escape
/// always passes through.
pub fn should_consume_key_event(event: KeyEvent, mode: InteractionMode) -> bool {
    map_key_event_to_commands(event)
        .iter()
        .any(|command| match command {
            KeyCommand::Quit => false,
            KeyCommand::ToggleMode => true,
            KeyCommand::AdjustGhostRadius(_) | KeyCommand::AdjustPocketWidths(_) => {
                mode.is_interactive()
            }
        })
}

#[derive(Debug, Default)]
pub struct KeyboardHook {
    active: bool,
    mode: InteractionMode,
    #[cfg(windows)]
    backend: platform::KeyboardHookBackend,
}

impl KeyboardHook {
    /// Installs the hook on the calling thread. The callback runs inside that
    /// thread's message loop, so it must be the thread that pumps messages.
    pub fn activate(&mut self) -> Result<()> {
        if self.active {
            return Ok(());
        }

        #[cfg(windows)]
        self.backend.install()?;

        self.active = true;
        tracing::debug!("guide keyboard hook installed");
        Ok(())
    }

    pub fn deactivate(&mut self) {
        if !self.active {
            return;
        }

        #[cfg(windows)]
        if let Err(err) = self.backend.uninstall() {
            tracing::warn!(?err, "failed to uninstall guide keyboard hook");
        }

        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        #[cfg(windows)]
        {
            self.active && self.backend.is_installed()
        }
        #[cfg(not(windows))]
        {
            self.active
        }
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    /// Mode the hook uses to decide which bound keys it swallows.
    pub fn set_mode(&mut self, mode: InteractionMode) {
        if self.mode == mode {
            return;
        }
        self.mode = mode;

        #[cfg(windows)]
        platform::set_hook_mode(mode);
    }

    pub fn drain_events(&self) -> Vec<KeyEvent> {
        #[cfg(windows)]
        {
            self.backend.drain_events()
        }
        #[cfg(not(windows))]
        {
            Vec::new()
        }
    }
}

impl Drop for KeyboardHook {
    fn drop(&mut self) {
        self.deactivate();
    }
}

#[cfg(windows)]
pub(crate) mod platform {
    use super::{should_consume_key_event, KeyCode, KeyEvent, KeyModifiers};
    use crate::guide::state::InteractionMode;
    use anyhow::{anyhow, Result};
    use once_cell::sync::Lazy;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::mpsc::{channel, Receiver, Sender};
    use std::sync::Mutex;
    use windows::Win32::Foundation::{LPARAM, LRESULT, WPARAM};
    use windows::Win32::System::LibraryLoader::GetModuleHandleW;
    use windows::Win32::System::Threading::GetCurrentThreadId;
    use windows::Win32::UI::Input::KeyboardAndMouse::{
        GetAsyncKeyState, VK_ADD, VK_CONTROL, VK_ESCAPE, VK_F5, VK_OEM_MINUS, VK_OEM_PLUS,
        VK_SHIFT, VK_SUBTRACT,
    };
    use windows::Win32::UI::WindowsAndMessaging::{
        CallNextHookEx, PostThreadMessageW, SetWindowsHookExW, UnhookWindowsHookEx, HC_ACTION,
        HHOOK, KBDLLHOOKSTRUCT, KBDLLHOOKSTRUCT_FLAGS, WH_KEYBOARD_LL, WM_APP, WM_KEYDOWN,
        WM_SYSKEYDOWN,
    };

    /// Posted to the hook thread after each key event so a blocking
    /// `GetMessageW` loop wakes up and drains the queue.
    pub const WM_GUIDE_KEY_WAKE: u32 = WM_APP + 1;

    static KEY_EVENT_SENDER: Lazy<Mutex<Option<Sender<KeyEvent>>>> =
        Lazy::new(|| Mutex::new(None));

    static HOOK_MODE_INTERACTIVE: AtomicBool = AtomicBool::new(true);

    pub fn set_hook_mode(mode: InteractionMode) {
        HOOK_MODE_INTERACTIVE.store(mode.is_interactive(), Ordering::Relaxed);
    }

    fn hook_mode() -> InteractionMode {
        if HOOK_MODE_INTERACTIVE.load(Ordering::Relaxed) {
            InteractionMode::Edit
        } else {
            InteractionMode::Play
        }
    }

    #[derive(Debug, Default)]
    pub struct KeyboardHookBackend {
        hook: Option<HHOOK>,
        receiver: Option<Receiver<KeyEvent>>,
    }

    impl KeyboardHookBackend {
        pub fn install(&mut self) -> Result<()> {
            if self.hook.is_some() {
                return Ok(());
            }

            let (event_tx, event_rx) = channel::<KeyEvent>();
            if let Ok(mut guard) = KEY_EVENT_SENDER.lock() {
                *guard = Some(event_tx);
            }

            let hmodule = unsafe { GetModuleHandleW(None) }.map_err(|err| anyhow!(err))?;
            let hook = unsafe {
                SetWindowsHookExW(WH_KEYBOARD_LL, Some(keyboard_hook_proc), hmodule, 0)
            }
            .map_err(|err| anyhow!("SetWindowsHookExW failed: {err}"))?;
            if hook.0.is_null() {
                return Err(anyhow!(windows::core::Error::from_win32()));
            }

            self.hook = Some(hook);
            self.receiver = Some(event_rx);
            Ok(())
        }

        pub fn uninstall(&mut self) -> Result<()> {
            if let Ok(mut guard) = KEY_EVENT_SENDER.lock() {
                *guard = None;
            }
            self.receiver = None;

            if let Some(hook) = self.hook.take() {
                unsafe { UnhookWindowsHookEx(hook) }
                    .map_err(|err| anyhow!("UnhookWindowsHookEx failed: {err}"))?;
            }
            Ok(())
        }

        pub fn is_installed(&self) -> bool {
            self.hook.is_some()
        }

        pub fn drain_events(&self) -> Vec<KeyEvent> {
            let mut events = Vec::new();
            if let Some(rx) = &self.receiver {
                while let Ok(event) = rx.try_recv() {
                    events.push(event);
                }
            }
            events
        }
    }

    fn key_modifiers_snapshot() -> KeyModifiers {
        let ctrl = unsafe { GetAsyncKeyState(VK_CONTROL.0 as i32) } < 0;
        let shift = unsafe { GetAsyncKeyState(VK_SHIFT.0 as i32) } < 0;
        KeyModifiers { ctrl, shift }
    }

    fn map_vk_to_keycode(vk_code: u32) -> KeyCode {
        match vk_code {
            code if code == VK_ESCAPE.0 as u32 => KeyCode::Escape,
            code if code == VK_F5.0 as u32 => KeyCode::F5,
            code if code == VK_OEM_PLUS.0 as u32 || code == VK_ADD.0 as u32 => KeyCode::Plus,
            code if code == VK_OEM_MINUS.0 as u32 || code == VK_SUBTRACT.0 as u32 => {
                KeyCode::Minus
            }
            _ => KeyCode::Other,
        }
    }

    unsafe extern "system" fn keyboard_hook_proc(
        n_code: i32,
        w_param: WPARAM,
        l_param: LPARAM,
    ) -> LRESULT {
        if n_code == HC_ACTION as i32 {
            let msg = w_param.0 as u32;
            if msg == WM_KEYDOWN || msg == WM_SYSKEYDOWN {
                let info = unsafe { &*(l_param.0 as *const KBDLLHOOKSTRUCT) };
                let injected =
                    (info.flags & KBDLLHOOKSTRUCT_FLAGS(0x10)) != KBDLLHOOKSTRUCT_FLAGS(0);
                let key = map_vk_to_keycode(info.vkCode);
                if !injected && key != KeyCode::Other {
                    let event = KeyEvent {
                        key,
                        modifiers: key_modifiers_snapshot(),
                    };

                    if let Ok(guard) = KEY_EVENT_SENDER.lock() {
                        if let Some(sender) = guard.as_ref() {
                            let _ = sender.send(event);
                            let _ = unsafe {
                                PostThreadMessageW(
                                    GetCurrentThreadId(),
                                    WM_GUIDE_KEY_WAKE,
                                    WPARAM(0),
                                    LPARAM(0),
                                )
                            };
                        }
                    }

                    if should_consume_key_event(event, hook_mode()) {
                        return LRESULT(1);
                    }
                }
            }
        }

        unsafe { CallNextHookEx(HHOOK(std::ptr::null_mut()), n_code, w_param, l_param) }
    }
}
