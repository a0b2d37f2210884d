//! Mouse gesture interpretation.
//!
//! Raw button events drive a small [`Gesture`] state machine. Once per frame
//! the pending press is resolved by a hit test, and the held button selects a
//! single [`TransformChannel`] that receives the pointer delta.

use iced::mouse;

use crate::pointer::PointerTracker;
use crate::transform::TransformState;

/// Physical mouse button as seen by the interaction core
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MouseButton {
    Primary,
    Secondary,
    Auxiliary,
    Other(u16),
}

impl From<mouse::Button> for MouseButton {
    fn from(button: mouse::Button) -> Self {
        match button {
            mouse::Button::Left => MouseButton::Primary,
            mouse::Button::Right => MouseButton::Secondary,
            mouse::Button::Middle => MouseButton::Auxiliary,
            mouse::Button::Back => MouseButton::Other(3),
            mouse::Button::Forward => MouseButton::Other(4),
            mouse::Button::Other(id) => MouseButton::Other(id),
        }
    }
}

/// Transform affected by a drag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TransformChannel {
    Rotate,
    Scale,
    Translate,
}

impl TransformChannel {
    /// Channel driven by a held button, `None` for buttons with no meaning.
    pub(crate) fn for_button(button: MouseButton) -> Option<Self> {
        match button {
            MouseButton::Primary => Some(TransformChannel::Rotate),
            MouseButton::Secondary => Some(TransformChannel::Scale),
            MouseButton::Auxiliary => Some(TransformChannel::Translate),
            MouseButton::Other(_) => None,
        }
    }

    /// Apply one frame of pointer movement to the transform state.
    pub(crate) fn apply(self, state: &mut TransformState, dx: f32, dy: f32, sensitivity: f32) {
        match self {
            TransformChannel::Rotate => {
                state.vertical_angle += dy * sensitivity;
                state.horizontal_angle += dx * sensitivity;
            }
            TransformChannel::Scale => {
                state.scale -= dy * sensitivity;
            }
            TransformChannel::Translate => {
                state.position.x += dx * sensitivity;
                state.position.y -= dy * sensitivity;
            }
        }
    }
}

/// Press/hit state of the current mouse gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum Gesture {
    #[default]
    Idle,
    /// Button went down; the hit test has not run yet
    Pending { button: MouseButton },
    /// The press started away from every shape
    PressedOffObject { button: MouseButton },
    /// The press started over the active shape
    PressedOnObject { button: MouseButton },
}

impl Gesture {
    pub(crate) fn on_press(&mut self, button: MouseButton) {
        *self = match *self {
            Gesture::Idle | Gesture::Pending { .. } => Gesture::Pending { button },
            Gesture::PressedOffObject { .. } => Gesture::PressedOffObject { button },
            Gesture::PressedOnObject { .. } => Gesture::PressedOnObject { button },
        };
    }

    pub(crate) fn on_release(&mut self) {
        *self = Gesture::Idle;
    }

    /// Resolve a pending press with `hit_test`, returning whether the gesture is on the shape.
    ///
    /// The hit test only runs for a pending press; any other state is left untouched.
    pub(crate) fn resolve_pending_hit(&mut self, hit_test: impl FnOnce() -> bool) -> bool {
        if let Gesture::Pending { button } = *self {
            *self = if hit_test() {
                Gesture::PressedOnObject { button }
            } else {
                Gesture::PressedOffObject { button }
            };
        }
        self.hit_active()
    }

    pub(crate) fn pressed(&self) -> bool {
        !matches!(self, Gesture::Idle)
    }

    #[cfg(test)]
    pub(crate) fn fresh_press(&self) -> bool {
        matches!(self, Gesture::Pending { .. })
    }

    pub(crate) fn hit_active(&self) -> bool {
        matches!(self, Gesture::PressedOnObject { .. })
    }

    #[cfg(test)]
    pub(crate) fn button(&self) -> Option<MouseButton> {
        match *self {
            Gesture::Idle => None,
            Gesture::Pending { button }
            | Gesture::PressedOffObject { button }
            | Gesture::PressedOnObject { button } => Some(button),
        }
    }
}

/// Apply this frame's pointer movement to `state` if the gesture grabbed the shape.
///
/// Returns the channel that received the delta.
pub(crate) fn dispatch(
    gesture: &Gesture,
    pointer: &PointerTracker,
    state: &mut TransformState,
    sensitivity: f32,
) -> Option<TransformChannel> {
    let Gesture::PressedOnObject { button } = *gesture else {
        return None;
    };
    let channel = TransformChannel::for_button(button)?;
    let delta = pointer.delta();
    channel.apply(state, delta.x, delta.y, sensitivity);
    log::trace!("{channel:?} += ({}, {})", delta.x, delta.y);
    Some(channel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector2;

    const K: f32 = 0.01;

    fn grabbed(button: MouseButton) -> Gesture {
        let mut gesture = Gesture::Idle;
        gesture.on_press(button);
        gesture.resolve_pending_hit(|| true);
        gesture
    }

    fn pointer_moved(dx: f32, dy: f32) -> PointerTracker {
        let mut pointer = PointerTracker::new(800.0, 600.0);
        pointer.on_move(400.0, 300.0);
        pointer.settle();
        pointer.on_move(400.0 + dx, 300.0 + dy);
        pointer
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn first_press_is_fresh() {
        let mut gesture = Gesture::Idle;
        gesture.on_press(MouseButton::Primary);

        assert!(gesture.pressed());
        assert!(gesture.fresh_press());
        assert!(!gesture.hit_active());
        assert_eq!(gesture.button(), Some(MouseButton::Primary));
    }

    #[test]
    fn second_press_while_held_does_not_retrigger_hit_test() {
        let mut gesture = Gesture::Idle;
        gesture.on_press(MouseButton::Primary);
        gesture.resolve_pending_hit(|| false);

        gesture.on_press(MouseButton::Secondary);

        assert!(!gesture.fresh_press());
        assert_eq!(gesture.button(), Some(MouseButton::Secondary));
        let mut ran = false;
        gesture.resolve_pending_hit(|| {
            ran = true;
            true
        });
        assert!(!ran);
        assert!(!gesture.hit_active());
    }

    #[test]
    fn second_press_keeps_grab_and_switches_channel() {
        let mut gesture = grabbed(MouseButton::Primary);
        gesture.on_press(MouseButton::Auxiliary);

        assert!(gesture.hit_active());
        assert_eq!(gesture.button(), Some(MouseButton::Auxiliary));
    }

    #[test]
    fn resolving_always_consumes_the_fresh_press() {
        let mut hit = Gesture::Idle;
        hit.on_press(MouseButton::Primary);
        assert!(hit.resolve_pending_hit(|| true));
        assert!(!hit.fresh_press());

        let mut miss = Gesture::Idle;
        miss.on_press(MouseButton::Primary);
        assert!(!miss.resolve_pending_hit(|| false));
        assert!(!miss.fresh_press());
        assert!(miss.pressed());
    }

    #[test]
    fn resolving_without_press_is_a_no_op() {
        let mut gesture = Gesture::Idle;
        let mut ran = false;
        assert!(!gesture.resolve_pending_hit(|| {
            ran = true;
            true
        }));
        assert!(!ran);
        assert_eq!(gesture, Gesture::Idle);
    }

    #[test]
    fn release_clears_grab_mid_gesture() {
        let mut gesture = grabbed(MouseButton::Primary);
        assert!(gesture.hit_active());

        gesture.on_release();

        assert!(!gesture.pressed());
        assert!(!gesture.fresh_press());
        assert!(!gesture.hit_active());
        assert_eq!(gesture.button(), None);
    }

    #[test]
    fn primary_drag_rotates_both_axes() {
        let gesture = grabbed(MouseButton::Primary);
        let pointer = pointer_moved(20.0, -10.0);
        let mut state = TransformState::new();

        let channel = dispatch(&gesture, &pointer, &mut state, K);

        assert_eq!(channel, Some(TransformChannel::Rotate));
        assert!(approx(state.horizontal_angle, 0.2));
        assert!(approx(state.vertical_angle, -0.1));
        assert_eq!(state.scale, 1.0);
        assert_eq!(state.position, Vector2::zeros());
    }

    #[test]
    fn rotation_accumulates_over_frames() {
        let gesture = grabbed(MouseButton::Primary);
        let mut pointer = PointerTracker::new(800.0, 600.0);
        let mut state = TransformState::new();

        for _ in 0..10 {
            let current = pointer.current();
            pointer.on_move(current.x + 5.0, current.y + 10.0);
            dispatch(&gesture, &pointer, &mut state, K);
            pointer.settle();
        }

        assert!(approx(state.vertical_angle, 1.0));
        assert!(approx(state.horizontal_angle, 0.5));
    }

    #[test]
    fn secondary_drag_scales_without_clamping() {
        let gesture = grabbed(MouseButton::Secondary);
        let pointer = pointer_moved(7.0, 250.0);
        let mut state = TransformState::new();

        let channel = dispatch(&gesture, &pointer, &mut state, K);

        // Dragging down far enough inverts the shape; that state is accepted.
        assert_eq!(channel, Some(TransformChannel::Scale));
        assert!(approx(state.scale, -1.5));
        assert_eq!(state.vertical_angle, 0.0);
        assert_eq!(state.horizontal_angle, 0.0);
        assert_eq!(state.position, Vector2::zeros());
    }

    #[test]
    fn auxiliary_drag_translates_with_y_flipped() {
        let gesture = grabbed(MouseButton::Auxiliary);
        let pointer = pointer_moved(30.0, 40.0);
        let mut state = TransformState::new();

        let channel = dispatch(&gesture, &pointer, &mut state, K);

        assert_eq!(channel, Some(TransformChannel::Translate));
        assert!(approx(state.position.x, 0.3));
        assert!(approx(state.position.y, -0.4));
        assert_eq!(state.scale, 1.0);
    }

    #[test]
    fn press_away_from_shape_never_scales() {
        let mut gesture = Gesture::Idle;
        gesture.on_press(MouseButton::Secondary);
        gesture.resolve_pending_hit(|| false);

        let mut pointer = PointerTracker::new(800.0, 600.0);
        let mut state = TransformState::new();
        for step in 1..=5 {
            pointer.on_move(100.0, 100.0 + step as f32 * 20.0);
            assert_eq!(dispatch(&gesture, &pointer, &mut state, K), None);
        }

        assert_eq!(state, TransformState::new());
    }

    #[test]
    fn pending_press_does_not_dispatch() {
        let mut gesture = Gesture::Idle;
        gesture.on_press(MouseButton::Primary);
        let pointer = pointer_moved(10.0, 10.0);
        let mut state = TransformState::new();

        assert_eq!(dispatch(&gesture, &pointer, &mut state, K), None);
        assert_eq!(state, TransformState::new());
    }

    #[test]
    fn unrecognized_button_applies_nothing() {
        let gesture = grabbed(MouseButton::Other(7));
        let pointer = pointer_moved(50.0, 50.0);
        let mut state = TransformState::new();

        assert_eq!(dispatch(&gesture, &pointer, &mut state, K), None);
        assert_eq!(state, TransformState::new());
    }

    #[test]
    fn iced_buttons_map_to_channels() {
        assert_eq!(
            TransformChannel::for_button(mouse::Button::Left.into()),
            Some(TransformChannel::Rotate)
        );
        assert_eq!(
            TransformChannel::for_button(mouse::Button::Right.into()),
            Some(TransformChannel::Scale)
        );
        assert_eq!(
            TransformChannel::for_button(mouse::Button::Middle.into()),
            Some(TransformChannel::Translate)
        );
        assert_eq!(TransformChannel::for_button(mouse::Button::Back.into()), None);
    }
}
