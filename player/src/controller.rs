//! Touch controller: turns touch events into emulator commands and owns the
//! on-screen layout preference.
//!
//! Browsers deliver touch events loosely. A finger sliding back onto a
//! button fires a second `touchstart`, and `touchend` may never arrive when
//! the page loses focus. The controller tracks which keys it has pressed so
//! the engine sees exactly one press and one release per hold. A press that
//! found no mounted emulator does not count as held, so the next touch on
//! that key presses again.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::bridge::Controls;
use crate::key::GbaKey;
use crate::log::LogCategory;
use crate::log_debug;
use crate::preference::Preference;

pub const OPACITY_RANGE: RangeInclusive<f64> = 0.0..=1.0;
pub const SCALE_RANGE: RangeInclusive<f64> = 0.5..=2.0;

/// Persisted look of the on-screen controls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ControllerLayout {
    pub opacity: f64,
    pub scale: f64,
    /// Put B where A normally sits and vice versa.
    pub swap_ab: bool,
    pub show_shoulders: bool,
}

impl Default for ControllerLayout {
    fn default() -> Self {
        ControllerLayout {
            opacity: 1.0,
            scale: 1.0,
            swap_ab: false,
            show_shoulders: true,
        }
    }
}

impl ControllerLayout {
    /// The same layout with every number inside its allowed range. Values
    /// written by hand into storage can be anything.
    pub fn clamped(&self) -> ControllerLayout {
        let defaults = ControllerLayout::default();
        ControllerLayout {
            opacity: clamp_or(self.opacity, &OPACITY_RANGE, defaults.opacity),
            scale: clamp_or(self.scale, &SCALE_RANGE, defaults.scale),
            ..self.clone()
        }
    }
}

fn clamp_or(value: f64, range: &RangeInclusive<f64>, fallback: f64) -> f64 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(*range.start(), *range.end())
    }
}

/// The on-screen controller. `C` is whatever forwards commands to the
/// emulator, normally the shell's command handle.
pub struct Controller<C> {
    controls: C,
    layout: Preference<ControllerLayout>,
    held: Vec<GbaKey>,
}

impl<C: Controls<GbaKey>> Controller<C> {
    pub fn new(controls: C, layout: Preference<ControllerLayout>) -> Self {
        let clamped = layout.borrow().clamped();
        if *layout.borrow() != clamped {
            layout.set(clamped);
        }
        Controller {
            controls,
            layout,
            held: Vec::new(),
        }
    }

    pub fn controls(&self) -> &C {
        &self.controls
    }

    /// Finger down on `key`. Pressing a key that is already held does nothing.
    pub fn touch_start(&mut self, key: GbaKey) {
        if self.held.contains(&key) {
            log_debug!(LogCategory::Control, "{key:?} already held");
            return;
        }
        if self.controls.press(key) {
            self.held.push(key);
        }
    }

    /// Finger up from `key`. Releasing a key that is not held does nothing.
    pub fn touch_end(&mut self, key: GbaKey) {
        let Some(pos) = self.held.iter().position(|&k| k == key) else {
            return;
        };
        self.held.remove(pos);
        self.controls.release(key);
    }

    /// Release everything still held, oldest press first.
    pub fn touch_cancel(&mut self) {
        for key in std::mem::take(&mut self.held) {
            self.controls.release(key);
        }
    }

    pub fn restart(&mut self) {
        self.touch_cancel();
        self.controls.restart();
    }

    pub fn held_keys(&self) -> &[GbaKey] {
        &self.held
    }

    pub fn is_held(&self, key: GbaKey) -> bool {
        self.held.contains(&key)
    }

    pub fn layout(&self) -> ControllerLayout {
        self.layout.borrow().clamped()
    }

    pub fn set_opacity(&self, opacity: f64) {
        self.layout.update(|layout| {
            layout.opacity = clamp_or(opacity, &OPACITY_RANGE, layout.opacity);
        });
    }

    pub fn set_scale(&self, scale: f64) {
        self.layout.update(|layout| {
            layout.scale = clamp_or(scale, &SCALE_RANGE, layout.scale);
        });
    }

    pub fn toggle_swap_ab(&self) {
        self.layout.update(|layout| layout.swap_ab = !layout.swap_ab);
    }

    /// Hiding the shoulder buttons also lets go of them.
    pub fn set_show_shoulders(&mut self, show: bool) {
        if !show {
            for key in [GbaKey::L, GbaKey::R] {
                self.touch_end(key);
            }
        }
        self.layout.update(|layout| layout.show_shoulders = show);
    }

    pub fn reset_layout(&self) {
        self.layout.reset();
    }

    /// Keys drawn on screen, in drawing order. With A/B swapped, B takes A's
    /// slot.
    pub fn visible_keys(&self) -> Vec<GbaKey> {
        let layout = self.layout();
        GbaKey::ALL
            .iter()
            .filter(|key| layout.show_shoulders || !key.is_shoulder())
            .map(|&key| match (layout.swap_ab, key) {
                (true, GbaKey::A) => GbaKey::B,
                (true, GbaKey::B) => GbaKey::A,
                _ => key,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{CommandHandle, TargetRef};
    use crate::storage::{MemoryStorage, StorageMedium};
    use crate::testing::{Call, RecordingTarget};
    use std::rc::Rc;

    const KEY: &str = "test.layout";

    fn controller(
        storage: &MemoryStorage,
    ) -> (
        Controller<CommandHandle<RecordingTarget<GbaKey>>>,
        TargetRef<RecordingTarget<GbaKey>>,
    ) {
        let target_ref = TargetRef::new();
        let layout = Preference::load(Rc::new(storage.clone()), KEY, ControllerLayout::default());
        (
            Controller::new(CommandHandle::new(&target_ref), layout),
            target_ref,
        )
    }

    #[test]
    fn test_double_touch_start_presses_once() {
        let storage = MemoryStorage::new();
        let (mut ctrl, target_ref) = controller(&storage);
        let recorder = RecordingTarget::new();
        let _mount = target_ref.mount(recorder.clone());

        ctrl.touch_start(GbaKey::A);
        ctrl.touch_start(GbaKey::A);
        ctrl.touch_end(GbaKey::A);
        ctrl.touch_end(GbaKey::A);

        assert_eq!(
            recorder.calls(),
            vec![Call::Press(GbaKey::A), Call::Release(GbaKey::A)]
        );
    }

    #[test]
    fn test_touch_cancel_releases_in_press_order() {
        let storage = MemoryStorage::new();
        let (mut ctrl, target_ref) = controller(&storage);
        let recorder = RecordingTarget::new();
        let _mount = target_ref.mount(recorder.clone());

        ctrl.touch_start(GbaKey::Up);
        ctrl.touch_start(GbaKey::B);
        ctrl.touch_cancel();

        assert!(ctrl.held_keys().is_empty());
        assert_eq!(
            recorder.calls(),
            vec![
                Call::Press(GbaKey::Up),
                Call::Press(GbaKey::B),
                Call::Release(GbaKey::Up),
                Call::Release(GbaKey::B),
            ]
        );
    }

    #[test]
    fn test_touches_before_mount_are_dropped() {
        let storage = MemoryStorage::new();
        let (mut ctrl, target_ref) = controller(&storage);
        let recorder = RecordingTarget::new();

        ctrl.touch_start(GbaKey::Start);
        assert!(!ctrl.is_held(GbaKey::Start));

        let _mount = target_ref.mount(recorder.clone());
        ctrl.touch_end(GbaKey::Start);
        assert!(recorder.calls().is_empty());
    }

    #[test]
    fn test_touch_before_mount_presses_again_after_mount() {
        let storage = MemoryStorage::new();
        let (mut ctrl, target_ref) = controller(&storage);
        let recorder = RecordingTarget::new();

        ctrl.touch_start(GbaKey::A);
        let _mount = target_ref.mount(recorder.clone());
        ctrl.touch_start(GbaKey::A);
        ctrl.touch_end(GbaKey::A);

        assert_eq!(
            recorder.calls(),
            vec![Call::Press(GbaKey::A), Call::Release(GbaKey::A)]
        );
    }

    #[test]
    fn test_restart_releases_then_restarts() {
        let storage = MemoryStorage::new();
        let (mut ctrl, target_ref) = controller(&storage);
        let recorder = RecordingTarget::new();
        let _mount = target_ref.mount(recorder.clone());

        ctrl.touch_start(GbaKey::L);
        ctrl.restart();

        assert_eq!(
            recorder.calls(),
            vec![
                Call::Press(GbaKey::L),
                Call::Release(GbaKey::L),
                Call::Restart
            ]
        );
    }

    #[test]
    fn test_layout_edits_clamp_and_persist() {
        let storage = MemoryStorage::new();
        let (ctrl, _target_ref) = controller(&storage);

        ctrl.set_opacity(1.7);
        ctrl.set_scale(0.1);
        ctrl.toggle_swap_ab();

        let expected = ControllerLayout {
            opacity: 1.0,
            scale: 0.5,
            swap_ab: true,
            show_shoulders: true,
        };
        assert_eq!(ctrl.layout(), expected);

        let (reloaded, _) = controller(&storage);
        assert_eq!(reloaded.layout(), expected);
    }

    #[test]
    fn test_nan_opacity_is_ignored() {
        let storage = MemoryStorage::new();
        let (ctrl, _target_ref) = controller(&storage);
        ctrl.set_opacity(0.4);
        ctrl.set_opacity(f64::NAN);
        assert_eq!(ctrl.layout().opacity, 0.4);
    }

    #[test]
    fn test_old_stored_layout_fills_defaults() {
        let storage = MemoryStorage::new();
        storage.set_item(KEY, r#"{"opacity": 0.5}"#).unwrap();

        let (ctrl, _target_ref) = controller(&storage);
        assert_eq!(
            ctrl.layout(),
            ControllerLayout {
                opacity: 0.5,
                ..ControllerLayout::default()
            }
        );
    }

    #[test]
    fn test_out_of_range_stored_layout_is_clamped() {
        let storage = MemoryStorage::new();
        storage
            .set_item(KEY, r#"{"opacity": -3.0, "scale": 9.0}"#)
            .unwrap();

        let (ctrl, _target_ref) = controller(&storage);
        assert_eq!(ctrl.layout().opacity, 0.0);
        assert_eq!(ctrl.layout().scale, 2.0);
    }

    #[test]
    fn test_edit_does_not_write_back_out_of_range_values() {
        let storage = MemoryStorage::new();
        storage.set_item(KEY, r#"{"scale": 9.0}"#).unwrap();

        let (ctrl, _target_ref) = controller(&storage);
        ctrl.toggle_swap_ab();

        let stored = storage.get_item(KEY).unwrap().unwrap();
        let stored: ControllerLayout = serde_json::from_str(&stored).unwrap();
        assert_eq!(stored.scale, 2.0);
        assert!(stored.swap_ab);
    }

    #[test]
    fn test_hiding_shoulders_releases_them() {
        let storage = MemoryStorage::new();
        let (mut ctrl, target_ref) = controller(&storage);
        let recorder = RecordingTarget::new();
        let _mount = target_ref.mount(recorder.clone());

        ctrl.touch_start(GbaKey::R);
        ctrl.set_show_shoulders(false);

        assert!(!ctrl.is_held(GbaKey::R));
        assert_eq!(
            recorder.calls(),
            vec![Call::Press(GbaKey::R), Call::Release(GbaKey::R)]
        );
        assert!(!ctrl.visible_keys().contains(&GbaKey::L));
    }

    #[test]
    fn test_visible_keys_follow_swap() {
        let storage = MemoryStorage::new();
        let (ctrl, _target_ref) = controller(&storage);
        assert_eq!(&ctrl.visible_keys()[..2], &[GbaKey::A, GbaKey::B]);

        ctrl.toggle_swap_ab();
        assert_eq!(&ctrl.visible_keys()[..2], &[GbaKey::B, GbaKey::A]);
        assert_eq!(ctrl.visible_keys().len(), 10);
    }

    #[test]
    fn test_reset_layout() {
        let storage = MemoryStorage::new();
        let (ctrl, _target_ref) = controller(&storage);
        ctrl.set_scale(1.5);
        ctrl.reset_layout();

        assert_eq!(ctrl.layout(), ControllerLayout::default());
        assert!(storage.get_item(KEY).unwrap().is_none());
    }
}
