use crate::guide::hit_test::hit_test;
use crate::guide::keyboard_hook::{map_key_event_to_commands, KeyCommand, KeyEvent};
use crate::guide::messages::{GuideEvent, HostEffect};
use crate::guide::model::{GuideModel, Point, DEFAULT_GRAB_RADIUS};
use crate::guide::state::{DragTarget, InteractionMode, InteractionState};

pub const DEFAULT_GHOST_RADIUS_STEP: f32 = 1.0;
pub const DEFAULT_HALF_WIDTH_STEP: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuideTuning {
    pub grab_radius: f32,
    pub ghost_radius_step: f32,
    pub half_width_step: f32,
}

impl Default for GuideTuning {
    fn default() -> Self {
        Self {
            grab_radius: DEFAULT_GRAB_RADIUS,
            ghost_radius_step: DEFAULT_GHOST_RADIUS_STEP,
            half_width_step: DEFAULT_HALF_WIDTH_STEP,
        }
    }
}

/// Owns the guide geometry and the edit/play interaction state for one overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct GuideSession {
    model: GuideModel,
    interaction: InteractionState,
    tuning: GuideTuning,
}

impl GuideSession {
    pub fn new(model: GuideModel, tuning: GuideTuning) -> Self {
        Self {
            model,
            interaction: InteractionState::default(),
            tuning,
        }
    }

    pub fn model(&self) -> &GuideModel {
        &self.model
    }

    pub fn interaction(&self) -> InteractionState {
        self.interaction
    }

    pub fn mode(&self) -> InteractionMode {
        self.interaction.mode()
    }

    pub fn drag_target(&self) -> Option<DragTarget> {
        self.interaction.drag_target()
    }

    /// Effects the host applies once before the first event.
    pub fn startup_effects(&self) -> Vec<HostEffect> {
        vec![
            HostEffect::SetInteractive(self.mode().is_interactive()),
            HostEffect::RequestRedraw,
        ]
    }

    pub fn handle_event(&mut self, event: GuideEvent) -> Vec<HostEffect> {
        match event {
            GuideEvent::PointerDown(point) => self.handle_pointer_down(point),
            GuideEvent::PointerMove(point) => self.handle_pointer_move(point),
            GuideEvent::PointerUp => self.handle_pointer_up(),
            GuideEvent::KeyDown(key) => self.handle_key_event(key),
            GuideEvent::FocusLost => self.handle_focus_lost(),
            GuideEvent::CloseRequested => vec![HostEffect::Quit],
        }
    }

    pub fn handle_pointer_down(&mut self, point: Point) -> Vec<HostEffect> {
        if !self.mode().is_interactive() || self.drag_target().is_some() {
            return Vec::new();
        }

        let Some(target) = hit_test(&self.model, point, self.tuning.grab_radius) else {
            return Vec::new();
        };

        if !self.interaction.begin_drag(target) {
            return Vec::new();
        }
        tracing::debug!(?target, x = point.x, y = point.y, "guide drag started");
        vec![HostEffect::CapturePointer]
    }

    pub fn handle_pointer_move(&mut self, point: Point) -> Vec<HostEffect> {
        match self.drag_target() {
            Some(DragTarget::Cue) => self.model.set_cue_position(point),
            Some(DragTarget::Pocket(index)) => {
                let applied = self.model.set_pocket_center(index, point);
                debug_assert!(applied, "drag target pocket {index} out of range");
                if !applied {
                    tracing::warn!(index, "drag target pocket out of range; dropping drag");
                    self.interaction.end_drag();
                    return Vec::new();
                }
            }
            None => return Vec::new(),
        }
        vec![HostEffect::RequestRedraw]
    }

    /// Always releases capture, even when no drag is active.
    pub fn handle_pointer_up(&mut self) -> Vec<HostEffect> {
        if let Some(target) = self.interaction.end_drag() {
            tracing::debug!(?target, "guide drag finished");
        }
        vec![HostEffect::ReleasePointer]
    }

    pub fn handle_focus_lost(&mut self) -> Vec<HostEffect> {
        match self.interaction.end_drag() {
            Some(target) => {
                tracing::debug!(?target, "guide drag cancelled by focus loss");
                vec![HostEffect::ReleasePointer]
            }
            None => Vec::new(),
        }
    }

    pub fn handle_key_event(&mut self, event: KeyEvent) -> Vec<HostEffect> {
        let mut effects = Vec::new();
        let mut redraw = false;

        for command in map_key_event_to_commands(event) {
            match command {
                KeyCommand::Quit => effects.push(HostEffect::Quit),
                KeyCommand::ToggleMode => {
                    effects.extend(self.toggle_mode());
                    redraw = true;
                }
                KeyCommand::AdjustGhostRadius(direction) => {
                    self.model
                        .adjust_ghost_radius(direction.sign() * self.tuning.ghost_radius_step);
                    redraw = true;
                }
                KeyCommand::AdjustPocketWidths(direction) => {
                    self.model.adjust_all_pocket_half_widths(
                        direction.sign() * self.tuning.half_width_step,
                    );
                    redraw = true;
                }
            }
        }

        if redraw {
            effects.push(HostEffect::RequestRedraw);
        }
        effects
    }

    fn toggle_mode(&mut self) -> Vec<HostEffect> {
        let mut effects = Vec::new();
        if let Some(target) = self.interaction.toggle_mode() {
            tracing::debug!(?target, "guide drag cancelled by mode toggle");
            effects.push(HostEffect::ReleasePointer);
        }
        let mode = self.mode();
        tracing::info!(?mode, "guide overlay mode changed");
        effects.push(HostEffect::SetInteractive(mode.is_interactive()));
        effects
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guide::keyboard_hook::{KeyCode, KeyModifiers};
    use crate::guide::model::{ScreenSize, DEFAULT_GHOST_RADIUS, MAX_HALF_WIDTH};

    fn session() -> GuideSession {
        GuideSession::new(
            GuideModel::default_layout(ScreenSize::new(1920, 1080), DEFAULT_GHOST_RADIUS),
            GuideTuning::default(),
        )
    }

    fn toggle() -> GuideEvent {
        GuideEvent::KeyDown(KeyEvent::plain(KeyCode::F5))
    }

    fn shift(key: KeyCode) -> GuideEvent {
        GuideEvent::KeyDown(KeyEvent::new(
            key,
            KeyModifiers {
                ctrl: false,
                shift: true,
            },
        ))
    }

    fn ctrl(key: KeyCode) -> GuideEvent {
        GuideEvent::KeyDown(KeyEvent::new(
            key,
            KeyModifiers {
                ctrl: true,
                shift: false,
            },
        ))
    }

    #[test]
    fn startup_requests_interactive_window_and_first_frame() {
        assert_eq!(
            session().startup_effects(),
            vec![HostEffect::SetInteractive(true), HostEffect::RequestRedraw]
        );
    }

    #[test]
    fn dragging_cue_moves_it_and_release_clears_drag() {
        let mut s = session();
        assert_eq!(
            s.handle_event(GuideEvent::PointerDown(Point::new(960.0, 540.0))),
            vec![HostEffect::CapturePointer]
        );
        assert_eq!(s.drag_target(), Some(DragTarget::Cue));

        assert_eq!(
            s.handle_event(GuideEvent::PointerMove(Point::new(700.0, 600.0))),
            vec![HostEffect::RequestRedraw]
        );
        s.handle_event(GuideEvent::PointerMove(Point::new(500.0, 500.0)));
        assert_eq!(
            s.handle_event(GuideEvent::PointerUp),
            vec![HostEffect::ReleasePointer]
        );

        assert_eq!(s.model().cue().position, Point::new(500.0, 500.0));
        assert_eq!(s.drag_target(), None);
    }

    #[test]
    fn dragging_pocket_moves_only_that_pocket() {
        let mut s = session();
        let before = s.model().pockets().to_vec();

        s.handle_event(GuideEvent::PointerDown(Point::new(1795.0, 118.0)));
        assert_eq!(s.drag_target(), Some(DragTarget::Pocket(2)));
        s.handle_event(GuideEvent::PointerMove(Point::new(1700.0, 200.0)));
        s.handle_event(GuideEvent::PointerUp);

        for (index, (old, new)) in before.iter().zip(s.model().pockets()).enumerate() {
            if index == 2 {
                assert_eq!(new.center, Point::new(1700.0, 200.0));
                assert_eq!(new.half_width, old.half_width);
            } else {
                assert_eq!(new, old);
            }
        }
    }

    #[test]
    fn pointer_down_on_empty_space_is_a_no_op() {
        let mut s = session();
        let before = s.clone();
        assert!(s
            .handle_event(GuideEvent::PointerDown(Point::new(400.0, 400.0)))
            .is_empty());
        assert!(s
            .handle_event(GuideEvent::PointerMove(Point::new(410.0, 410.0)))
            .is_empty());
        assert_eq!(s, before);
    }

    #[test]
    fn second_pointer_down_without_release_is_ignored() {
        let mut s = session();
        s.handle_event(GuideEvent::PointerDown(Point::new(960.0, 540.0)));
        assert!(s
            .handle_event(GuideEvent::PointerDown(Point::new(120.0, 120.0)))
            .is_empty());
        assert_eq!(s.drag_target(), Some(DragTarget::Cue));

        s.handle_event(GuideEvent::PointerMove(Point::new(130.0, 130.0)));
        assert_eq!(s.model().cue().position, Point::new(130.0, 130.0));
        assert_eq!(s.model().pockets()[0].center, Point::new(120.0, 120.0));
    }

    #[test]
    fn pointer_up_twice_is_harmless() {
        let mut s = session();
        let before = s.clone();
        assert_eq!(
            s.handle_event(GuideEvent::PointerUp),
            vec![HostEffect::ReleasePointer]
        );
        assert_eq!(
            s.handle_event(GuideEvent::PointerUp),
            vec![HostEffect::ReleasePointer]
        );
        assert_eq!(s, before);
    }

    #[test]
    fn play_mode_ignores_pointer_input() {
        let mut s = session();
        assert_eq!(
            s.handle_event(toggle()),
            vec![HostEffect::SetInteractive(false), HostEffect::RequestRedraw]
        );
        let model_before = s.model().clone();

        for point in [Point::new(960.0, 540.0), Point::new(120.0, 120.0)] {
            assert!(s.handle_event(GuideEvent::PointerDown(point)).is_empty());
            assert!(s
                .handle_event(GuideEvent::PointerMove(Point::new(5.0, 5.0)))
                .is_empty());
        }
        assert_eq!(s.model(), &model_before);
        assert_eq!(s.drag_target(), None);
    }

    #[test]
    fn toggling_mid_drag_cancels_without_snap_back() {
        let mut s = session();
        s.handle_event(GuideEvent::PointerDown(Point::new(960.0, 540.0)));
        s.handle_event(GuideEvent::PointerMove(Point::new(800.0, 450.0)));

        assert_eq!(
            s.handle_event(toggle()),
            vec![
                HostEffect::ReleasePointer,
                HostEffect::SetInteractive(false),
                HostEffect::RequestRedraw
            ]
        );
        assert_eq!(s.drag_target(), None);
        assert_eq!(s.model().cue().position, Point::new(800.0, 450.0));

        s.handle_event(GuideEvent::PointerMove(Point::new(10.0, 10.0)));
        assert_eq!(s.model().cue().position, Point::new(800.0, 450.0));

        s.handle_event(toggle());
        s.handle_event(GuideEvent::PointerMove(Point::new(10.0, 10.0)));
        assert_eq!(s.model().cue().position, Point::new(800.0, 450.0));

        s.handle_event(GuideEvent::PointerDown(Point::new(800.0, 450.0)));
        s.handle_event(GuideEvent::PointerMove(Point::new(10.0, 10.0)));
        assert_eq!(s.model().cue().position, Point::new(10.0, 10.0));
    }

    #[test]
    fn focus_loss_releases_active_drag_only() {
        let mut s = session();
        assert!(s.handle_event(GuideEvent::FocusLost).is_empty());

        s.handle_event(GuideEvent::PointerDown(Point::new(960.0, 540.0)));
        assert_eq!(
            s.handle_event(GuideEvent::FocusLost),
            vec![HostEffect::ReleasePointer]
        );
        assert_eq!(s.drag_target(), None);
    }

    #[test]
    fn shift_plus_five_times_widens_every_pocket() {
        let mut s = session();
        let before: Vec<f32> = s.model().pockets().iter().map(|p| p.half_width).collect();

        for _ in 0..5 {
            assert_eq!(
                s.handle_event(shift(KeyCode::Plus)),
                vec![HostEffect::RequestRedraw]
            );
        }

        for (old, pocket) in before.iter().zip(s.model().pockets()) {
            assert_eq!(
                pocket.half_width,
                (old + 5.0 * DEFAULT_HALF_WIDTH_STEP).min(MAX_HALF_WIDTH)
            );
        }
    }

    #[test]
    fn ctrl_minus_shrinks_ghost_radius_to_floor() {
        let mut s = session();
        for _ in 0..30 {
            s.handle_event(ctrl(KeyCode::Minus));
        }
        assert_eq!(s.model().cue().ghost_radius, 4.0);

        s.handle_event(ctrl(KeyCode::Plus));
        assert_eq!(s.model().cue().ghost_radius, 5.0);
    }

    #[test]
    fn adjustments_apply_in_play_mode() {
        let mut s = session();
        s.handle_event(toggle());
        s.handle_event(ctrl(KeyCode::Plus));
        s.handle_event(shift(KeyCode::Minus));

        assert_eq!(s.mode(), InteractionMode::Play);
        assert_eq!(s.model().cue().ghost_radius, 17.0);
        assert_eq!(s.model().pockets()[0].half_width, 58.0);
    }

    #[test]
    fn escape_quits_in_both_modes() {
        let mut s = session();
        let escape = GuideEvent::KeyDown(KeyEvent::plain(KeyCode::Escape));
        assert_eq!(s.handle_event(escape), vec![HostEffect::Quit]);

        s.handle_event(toggle());
        assert_eq!(s.handle_event(escape), vec![HostEffect::Quit]);

        assert_eq!(
            s.handle_event(GuideEvent::CloseRequested),
            vec![HostEffect::Quit]
        );
    }

    #[test]
    fn unbound_keys_request_nothing() {
        let mut s = session();
        let before = s.clone();
        assert!(s
            .handle_event(GuideEvent::KeyDown(KeyEvent::plain(KeyCode::Other)))
            .is_empty());
        assert!(s.handle_event(shift(KeyCode::Other)).is_empty());
        assert_eq!(s, before);
    }
}
