#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionMode {
    #[default]
    Edit,
    Play,
}

impl InteractionMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Edit => Self::Play,
            Self::Play => Self::Edit,
        }
    }

    pub fn is_interactive(self) -> bool {
        matches!(self, Self::Edit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragTarget {
    Cue,
    Pocket(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionPhase {
    Idle,
    Dragging(DragTarget),
    Play,
}

/// Mode plus the entity under the pointer. A drag only exists in edit mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InteractionState {
    mode: InteractionMode,
    drag: Option<DragTarget>,
}

impl InteractionState {
    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn drag_target(&self) -> Option<DragTarget> {
        self.drag
    }

    pub fn phase(&self) -> InteractionPhase {
        match (self.mode, self.drag) {
            (InteractionMode::Play, _) => InteractionPhase::Play,
            (InteractionMode::Edit, Some(target)) => InteractionPhase::Dragging(target),
            (InteractionMode::Edit, None) => InteractionPhase::Idle,
        }
    }

    /// Starts a drag. Refused outside edit mode or while another drag is held.
    pub fn begin_drag(&mut self, target: DragTarget) -> bool {
        let next = InteractionPhase::Dragging(target);
        if !can_transition(self.phase(), next) || self.phase() == next {
            return false;
        }
        self.drag = Some(target);
        true
    }

    /// Clears any drag, returning the one that was active.
    pub fn end_drag(&mut self) -> Option<DragTarget> {
        self.drag.take()
    }

    /// Flips the mode. Leaving edit mode drops the active drag, which is
    /// returned.
    pub fn toggle_mode(&mut self) -> Option<DragTarget> {
        let cancelled = self.drag.take();
        self.mode = self.mode.toggled();
        cancelled
    }
}

pub fn can_transition(from: InteractionPhase, to: InteractionPhase) -> bool {
    matches!(
        (from, to),
        (InteractionPhase::Idle, InteractionPhase::Dragging(_))
            | (InteractionPhase::Idle, InteractionPhase::Play)
            | (InteractionPhase::Dragging(_), InteractionPhase::Idle)
            | (InteractionPhase::Dragging(_), InteractionPhase::Play)
            | (InteractionPhase::Play, InteractionPhase::Idle)
    ) || from == to
}
