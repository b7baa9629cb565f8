use crate::guide::keyboard_hook::KeyEvent;
use crate::guide::model::Point;

/// Input delivered by the host, in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GuideEvent {
    PointerDown(Point),
    PointerMove(Point),
    PointerUp,
    KeyDown(KeyEvent),
    /// Focus or pointer capture was taken away by the system.
    FocusLost,
    CloseRequested,
}

/// Requests the session makes of the host window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEffect {
    /// Advisory; the host may coalesce several into one repaint.
    RequestRedraw,
    /// `true` captures pointer input, `false` makes the window click-through.
    SetInteractive(bool),
    CapturePointer,
    ReleasePointer,
    Quit,
}
