use crate::guide::input::GuideSession;
use crate::guide::messages::{GuideEvent, HostEffect};
use crate::guide::model::ScreenSize;
use crate::guide::render::{render_guide, FrameBuffer, GuideStyle};
use anyhow::Result;

/// The window side of the overlay: the pieces of the host the session drives.
pub trait HostWindow {
    fn surface_size(&self) -> (u32, u32);
    fn set_interactive(&mut self, interactive: bool);
    fn capture_pointer(&mut self);
    fn release_pointer(&mut self);
    /// Hands a finished frame to the window; it is shown in a single blit.
    fn present(&mut self, frame: &FrameBuffer);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Quit,
}

/// Feeds host events into the session and turns its effects into window calls.
/// Redraw requests within one batch collapse into a single render.
#[derive(Debug)]
pub struct OverlayDriver {
    session: GuideSession,
    style: GuideStyle,
    frame: FrameBuffer,
    frames_presented: u64,
}

impl OverlayDriver {
    pub fn new(session: GuideSession, style: GuideStyle) -> Self {
        Self {
            session,
            style,
            frame: FrameBuffer::default(),
            frames_presented: 0,
        }
    }

    pub fn session(&self) -> &GuideSession {
        &self.session
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    pub fn start<H: HostWindow>(&mut self, host: &mut H) -> LoopControl {
        let effects = self.session.startup_effects();
        self.apply_effects(effects, host)
    }

    pub fn dispatch<H, I>(&mut self, events: I, host: &mut H) -> LoopControl
    where
        H: HostWindow,
        I: IntoIterator<Item = GuideEvent>,
    {
        let mut effects = Vec::new();
        for event in events {
            let produced = self.session.handle_event(event);
            let quit = produced.contains(&HostEffect::Quit);
            effects.extend(produced);
            if quit {
                break;
            }
        }
        self.apply_effects(effects, host)
    }

    fn apply_effects<H: HostWindow>(&mut self, effects: Vec<HostEffect>, host: &mut H) -> LoopControl {
        let mut redraw = false;
        for effect in effects {
            match effect {
                HostEffect::RequestRedraw => redraw = true,
                HostEffect::SetInteractive(interactive) => host.set_interactive(interactive),
                HostEffect::CapturePointer => host.capture_pointer(),
                HostEffect::ReleasePointer => host.release_pointer(),
                HostEffect::Quit => {
                    tracing::info!("guide overlay quit requested");
                    return LoopControl::Quit;
                }
            }
        }

        if redraw {
            self.redraw(host);
        }
        LoopControl::Continue
    }

    fn redraw<H: HostWindow>(&mut self, host: &mut H) {
        let (width, height) = host.surface_size();
        self.frame.ensure_size(width, height);
        if render_guide(self.session.model(), &self.style, &mut self.frame) {
            host.present(&self.frame);
            self.frames_presented += 1;
        }
    }
}

/// Primary display size, used for the default pocket layout.
pub fn primary_screen_size() -> Option<ScreenSize> {
    #[cfg(windows)]
    {
        platform::primary_screen_size()
    }

    #[cfg(not(windows))]
    {
        None
    }
}

/// Creates the overlay window and pumps messages until the session quits.
pub fn run_overlay(session: GuideSession, style: GuideStyle) -> Result<()> {
    #[cfg(windows)]
    {
        platform::run(session, style)
    }

    #[cfg(not(windows))]
    {
        let _ = (session, style);
        Err(anyhow::anyhow!(
            "the guide overlay host is only available on Windows"
        ))
    }
}

#[cfg(windows)]
mod platform {
    use super::{HostWindow, LoopControl, OverlayDriver};
    use crate::guide::input::GuideSession;
    use crate::guide::keyboard_hook::KeyboardHook;
    use crate::guide::messages::GuideEvent;
    use crate::guide::model::{Point, ScreenSize};
    use crate::guide::render::{FrameBuffer, GuideStyle, TRANSPARENCY_COLORKEY};
    use anyhow::{anyhow, bail, Context, Result};
    use once_cell::sync::Lazy;
    use std::mem;
    use std::ptr;
    use std::sync::mpsc::{channel, Receiver, Sender};
    use std::sync::Mutex;
    use std::sync::Once;
    use windows::core::{w, PCWSTR};
    use windows::Win32::Foundation::{COLORREF, HINSTANCE, HWND, LPARAM, LRESULT, WPARAM};
    use windows::Win32::Graphics::Gdi::{
        BeginPaint, BitBlt, CreateCompatibleDC, CreateDIBSection, DeleteDC, DeleteObject, EndPaint,
        GdiFlush, InvalidateRect, SelectObject, BITMAPINFO, BITMAPINFOHEADER, BI_RGB, DIB_RGB_COLORS,
        HBITMAP, HDC, HGDIOBJ, PAINTSTRUCT, SRCCOPY,
    };
    use windows::Win32::System::LibraryLoader::GetModuleHandleW;
    use windows::Win32::UI::Input::KeyboardAndMouse::{ReleaseCapture, SetCapture};
    use windows::Win32::UI::WindowsAndMessaging::{
        CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW, GetMessageW,
        GetSystemMetrics, GetWindowLongPtrW, LoadCursorW, RegisterClassW,
        SetLayeredWindowAttributes, SetWindowLongPtrW, SetWindowPos, TranslateMessage,
        GWLP_USERDATA, GWL_EXSTYLE, HWND_TOPMOST, IDC_ARROW, LWA_COLORKEY, MSG, SM_CXSCREEN,
        SM_CYSCREEN, SWP_FRAMECHANGED, SWP_NOACTIVATE, SWP_NOMOVE, SWP_NOSIZE, SWP_SHOWWINDOW,
        WINDOW_EX_STYLE, WM_ACTIVATE, WM_CAPTURECHANGED, WM_CLOSE, WM_ERASEBKGND,
        WM_KILLFOCUS, WM_LBUTTONDOWN, WM_LBUTTONUP, WM_MOUSEMOVE, WM_PAINT, WM_SHOWWINDOW,
        WNDCLASSW, WS_EX_LAYERED, WS_EX_NOACTIVATE, WS_EX_TOOLWINDOW, WS_EX_TOPMOST,
        WS_EX_TRANSPARENT, WS_POPUP,
    };

    const CLASS_NAME: PCWSTR = w!("PoolGuideOverlay");

    static EVENT_SENDER: Lazy<Mutex<Option<Sender<GuideEvent>>>> = Lazy::new(|| Mutex::new(None));

    pub fn compose_overlay_window_ex_style(interactive: bool) -> WINDOW_EX_STYLE {
        let base = WS_EX_LAYERED | WS_EX_TOPMOST | WS_EX_TOOLWINDOW | WS_EX_NOACTIVATE;
        if interactive {
            base
        } else {
            base | WS_EX_TRANSPARENT
        }
    }

    pub fn transparency_colorkey() -> COLORREF {
        COLORREF(
            (TRANSPARENCY_COLORKEY.r as u32)
                | ((TRANSPARENCY_COLORKEY.g as u32) << 8)
                | ((TRANSPARENCY_COLORKEY.b as u32) << 16),
        )
    }

    pub fn primary_screen_size() -> Option<ScreenSize> {
        let width = unsafe { GetSystemMetrics(SM_CXSCREEN) };
        let height = unsafe { GetSystemMetrics(SM_CYSCREEN) };
        if width <= 0 || height <= 0 {
            return None;
        }
        Some(ScreenSize::new(width as u32, height as u32))
    }

    fn send_event(event: GuideEvent) {
        if let Ok(guard) = EVENT_SENDER.lock() {
            if let Some(tx) = guard.as_ref() {
                let _ = tx.send(event);
            }
        }
    }

    fn pointer_from_lparam(lparam: LPARAM) -> Point {
        let x = (lparam.0 & 0xffff) as i16 as i32;
        let y = ((lparam.0 >> 16) & 0xffff) as i16 as i32;
        Point::new(x as f32, y as f32)
    }

    unsafe extern "system" fn overlay_wndproc(
        hwnd: HWND,
        msg: u32,
        wparam: WPARAM,
        lparam: LPARAM,
    ) -> LRESULT {
        match msg {
            WM_ERASEBKGND => LRESULT(1),
            WM_PAINT => {
                let mut ps = PAINTSTRUCT::default();
                let hdc = unsafe { BeginPaint(hwnd, &mut ps) };
                if !hdc.0.is_null() {
                    let mem_dc = HDC(unsafe { GetWindowLongPtrW(hwnd, GWLP_USERDATA) } as *mut _);
                    if !mem_dc.0.is_null() {
                        let width = ps.rcPaint.right - ps.rcPaint.left;
                        let height = ps.rcPaint.bottom - ps.rcPaint.top;
                        let _ = unsafe {
                            BitBlt(
                                hdc,
                                ps.rcPaint.left,
                                ps.rcPaint.top,
                                width,
                                height,
                                mem_dc,
                                ps.rcPaint.left,
                                ps.rcPaint.top,
                                SRCCOPY,
                            )
                        };
                    }
                }
                unsafe {
                    let _ = EndPaint(hwnd, &ps);
                }
                LRESULT(0)
            }
            WM_SHOWWINDOW | WM_ACTIVATE => {
                let _ = unsafe {
                    SetWindowPos(
                        hwnd,
                        HWND_TOPMOST,
                        0,
                        0,
                        0,
                        0,
                        SWP_NOMOVE | SWP_NOSIZE | SWP_NOACTIVATE,
                    )
                };
                unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) }
            }
            WM_LBUTTONDOWN => {
                send_event(GuideEvent::PointerDown(pointer_from_lparam(lparam)));
                LRESULT(0)
            }
            WM_MOUSEMOVE => {
                send_event(GuideEvent::PointerMove(pointer_from_lparam(lparam)));
                LRESULT(0)
            }
            WM_LBUTTONUP => {
                send_event(GuideEvent::PointerUp);
                LRESULT(0)
            }
            WM_KILLFOCUS | WM_CAPTURECHANGED => {
                send_event(GuideEvent::FocusLost);
                unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) }
            }
            WM_CLOSE => {
                send_event(GuideEvent::CloseRequested);
                LRESULT(0)
            }
            _ => unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) },
        }
    }

    #[derive(Debug)]
    pub struct OverlayWindow {
        hwnd: HWND,
        mem_dc: HDC,
        dib: HBITMAP,
        old_bitmap: HGDIOBJ,
        bits: *mut u8,
        size_bytes: usize,
        size: ScreenSize,
        event_rx: Receiver<GuideEvent>,
    }

    impl OverlayWindow {
        pub fn create_fullscreen() -> Result<Self> {
            let size = primary_screen_size().ok_or_else(|| anyhow!("primary screen size unavailable"))?;
            let hinstance: HINSTANCE = unsafe { GetModuleHandleW(None) }
                .context("resolve module handle")?
                .into();

            static REGISTER_CLASS: Once = Once::new();
            REGISTER_CLASS.call_once(|| unsafe {
                let wc = WNDCLASSW {
                    hInstance: hinstance,
                    lpszClassName: CLASS_NAME,
                    lpfnWndProc: Some(overlay_wndproc),
                    hCursor: LoadCursorW(None, IDC_ARROW).unwrap_or_default(),
                    ..Default::default()
                };
                let _ = RegisterClassW(&wc);
            });

            let hwnd = unsafe {
                CreateWindowExW(
                    compose_overlay_window_ex_style(true),
                    CLASS_NAME,
                    PCWSTR::null(),
                    WS_POPUP,
                    0,
                    0,
                    size.width as i32,
                    size.height as i32,
                    None,
                    None,
                    hinstance,
                    None,
                )
            }
            .context("create overlay window")?;

            if let Err(err) =
                unsafe { SetLayeredWindowAttributes(hwnd, transparency_colorkey(), 0, LWA_COLORKEY) }
            {
                unsafe {
                    let _ = DestroyWindow(hwnd);
                }
                bail!("configure layered window colorkey: {err}");
            }

            let mem_dc = unsafe { CreateCompatibleDC(HDC::default()) };
            if mem_dc.0.is_null() {
                unsafe {
                    let _ = DestroyWindow(hwnd);
                }
                bail!("create overlay memory DC");
            }

            let mut bmi = BITMAPINFO::default();
            bmi.bmiHeader = BITMAPINFOHEADER {
                biSize: mem::size_of::<BITMAPINFOHEADER>() as u32,
                biWidth: size.width as i32,
                biHeight: -(size.height as i32),
                biPlanes: 1,
                biBitCount: 32,
                biCompression: BI_RGB.0,
                ..Default::default()
            };

            let mut bits: *mut core::ffi::c_void = ptr::null_mut();
            let dib = match unsafe {
                CreateDIBSection(
                    mem_dc,
                    &bmi,
                    DIB_RGB_COLORS,
                    &mut bits,
                    windows::Win32::Foundation::HANDLE::default(),
                    0,
                )
            } {
                Ok(dib) if !bits.is_null() => dib,
                _ => {
                    unsafe {
                        let _ = DeleteDC(mem_dc);
                        let _ = DestroyWindow(hwnd);
                    }
                    bail!("create overlay back buffer");
                }
            };

            let old_bitmap = unsafe { SelectObject(mem_dc, dib) };
            unsafe {
                let _ = SetWindowLongPtrW(hwnd, GWLP_USERDATA, mem_dc.0 as isize);
            }

            let (event_tx, event_rx) = channel::<GuideEvent>();
            if let Ok(mut guard) = EVENT_SENDER.lock() {
                *guard = Some(event_tx);
            }

            let size_bytes = (size.width as usize)
                .saturating_mul(size.height as usize)
                .saturating_mul(4);

            tracing::info!(width = size.width, height = size.height, "guide overlay window created");
            Ok(Self {
                hwnd,
                mem_dc,
                dib,
                old_bitmap,
                bits: bits as *mut u8,
                size_bytes,
                size,
                event_rx,
            })
        }

        pub fn show(&self) {
            unsafe {
                let _ = SetWindowPos(
                    self.hwnd,
                    HWND_TOPMOST,
                    0,
                    0,
                    0,
                    0,
                    SWP_NOMOVE | SWP_NOSIZE | SWP_NOACTIVATE | SWP_SHOWWINDOW,
                );
            }
        }

        pub fn drain_events(&self) -> Vec<GuideEvent> {
            self.event_rx.try_iter().collect()
        }

        fn with_bitmap_mut<F>(&mut self, f: F)
        where
            F: FnOnce(&mut [u8]),
        {
            if self.bits.is_null() || self.size_bytes == 0 {
                return;
            }
            let pixels = unsafe { std::slice::from_raw_parts_mut(self.bits, self.size_bytes) };
            f(pixels);
        }

        pub fn shutdown(&mut self) {
            unsafe {
                if !self.mem_dc.0.is_null() {
                    let _ = SelectObject(self.mem_dc, self.old_bitmap);
                }
                if !self.dib.0.is_null() {
                    let _ = DeleteObject(self.dib);
                    self.dib = HBITMAP::default();
                }
                if !self.mem_dc.0.is_null() {
                    let _ = DeleteDC(self.mem_dc);
                    self.mem_dc = HDC::default();
                }
                if !self.hwnd.0.is_null() {
                    if let Ok(mut guard) = EVENT_SENDER.lock() {
                        *guard = None;
                    }
                    let _ = DestroyWindow(self.hwnd);
                    self.hwnd = HWND::default();
                }
            }
            self.bits = ptr::null_mut();
            self.size_bytes = 0;
        }
    }

    impl HostWindow for OverlayWindow {
        fn surface_size(&self) -> (u32, u32) {
            if self.bits.is_null() {
                return (0, 0);
            }
            (self.size.width, self.size.height)
        }

        fn set_interactive(&mut self, interactive: bool) {
            let style = compose_overlay_window_ex_style(interactive);
            unsafe {
                let _ = SetWindowLongPtrW(self.hwnd, GWL_EXSTYLE, style.0 as isize);
                let _ = SetWindowPos(
                    self.hwnd,
                    HWND_TOPMOST,
                    0,
                    0,
                    0,
                    0,
                    SWP_NOMOVE | SWP_NOSIZE | SWP_NOACTIVATE | SWP_FRAMECHANGED,
                );
            }
            tracing::debug!(interactive, "overlay click-through updated");
        }

        fn capture_pointer(&mut self) {
            let _ = unsafe { SetCapture(self.hwnd) };
        }

        fn release_pointer(&mut self) {
            let _ = unsafe { ReleaseCapture() };
        }

        fn present(&mut self, frame: &FrameBuffer) {
            // Pending GDI work on the memory DC must land before the bits are
            // touched directly.
            unsafe {
                let _ = GdiFlush();
            }
            let mut copied = false;
            self.with_bitmap_mut(|dib| copied = frame.copy_to_bgra(dib));
            if copied {
                unsafe {
                    let _ = InvalidateRect(self.hwnd, None, false);
                }
            }
        }
    }

    impl Drop for OverlayWindow {
        fn drop(&mut self) {
            self.shutdown();
        }
    }

    pub fn run(session: GuideSession, style: GuideStyle) -> Result<()> {
        let mut window = OverlayWindow::create_fullscreen()?;
        let mut keyboard = KeyboardHook::default();
        keyboard
            .activate()
            .context("install guide keyboard hook")?;

        let mut driver = OverlayDriver::new(session, style);
        window.show();
        let mut control = driver.start(&mut window);
        keyboard.set_mode(driver.session().mode());

        while control == LoopControl::Continue {
            let mut msg = MSG::default();
            let status = unsafe { GetMessageW(&mut msg, None, 0, 0) };
            if status.0 == -1 {
                keyboard.deactivate();
                bail!("GetMessageW failed: {}", windows::core::Error::from_win32());
            }
            if status.0 == 0 {
                break;
            }
            unsafe {
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }

            let mut events = window.drain_events();
            events.extend(keyboard.drain_events().into_iter().map(GuideEvent::KeyDown));
            if !events.is_empty() {
                control = driver.dispatch(events, &mut window);
                keyboard.set_mode(driver.session().mode());
            }
        }

        keyboard.deactivate();
        window.shutdown();
        tracing::info!(frames = driver.frames_presented(), "guide overlay closed");
        Ok(())
    }

}
