//! Busy state for submit controls.
//!
//! A control that starts an action is disabled and shows [`LOADING_LABEL`]
//! until reset. Each control keeps its own captured label, so any number of
//! them can be busy at once.

use std::collections::BTreeMap;

/// Label shown while an action is in flight.
pub const LOADING_LABEL: &str = "processing...";

#[derive(Debug, Clone, PartialEq, Eq)]
struct Control {
    label: String,
    enabled: bool,
    captured: Option<String>,
}

impl Control {
    fn new(label: String) -> Self {
        Self {
            label,
            enabled: true,
            captured: None,
        }
    }

    fn restore(&mut self) {
        if let Some(original) = self.captured.take() {
            self.label = original;
        }
        self.enabled = true;
    }
}

/// Registry of submit controls keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BusyControls {
    controls: BTreeMap<String, Control>,
}

impl BusyControls {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a control with its idle label. Re-registering an idle control relabels it.
    pub fn register(&mut self, id: impl Into<String>, label: impl Into<String>) {
        let label = label.into();
        self.controls
            .entry(id.into())
            .and_modify(|control| {
                if control.captured.is_none() {
                    control.label.clone_from(&label);
                }
            })
            .or_insert_with(|| Control::new(label));
    }

    /// Mark a control busy: disable it, capture its label and show the loading label.
    ///
    /// Starting a control that is already busy keeps the first captured label.
    pub fn start(&mut self, id: &str) {
        let control = self
            .controls
            .entry(id.to_string())
            .or_insert_with(|| Control::new(String::new()));
        if control.captured.is_none() {
            control.captured = Some(std::mem::replace(
                &mut control.label,
                LOADING_LABEL.to_string(),
            ));
        }
        control.enabled = false;
    }

    /// Restore one control, or every busy control when `id` is `None`.
    pub fn reset(&mut self, id: Option<&str>) {
        match id {
            Some(id) => {
                if let Some(control) = self.controls.get_mut(id) {
                    control.restore();
                }
            }
            None => self
                .controls
                .values_mut()
                .filter(|control| control.captured.is_some())
                .for_each(Control::restore),
        }
    }

    /// Current label of a control.
    #[must_use]
    pub fn label(&self, id: &str) -> Option<&str> {
        self.controls.get(id).map(|control| control.label.as_str())
    }

    /// Whether a control accepts input. Unknown controls are enabled.
    #[must_use]
    pub fn is_enabled(&self, id: &str) -> bool {
        self.controls.get(id).is_none_or(|control| control.enabled)
    }

    /// Whether a control is currently busy.
    #[must_use]
    pub fn is_busy(&self, id: &str) -> bool {
        self.controls
            .get(id)
            .is_some_and(|control| control.captured.is_some())
    }

    /// Ids of every busy control, in id order.
    #[must_use]
    pub fn busy_ids(&self) -> Vec<&str> {
        self.controls
            .iter()
            .filter(|(_, control)| control.captured.is_some())
            .map(|(id, _)| id.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_captures_label_and_reset_restores_it() {
        let mut busy = BusyControls::new();
        busy.register("save", "Save changes");

        busy.start("save");
        assert_eq!(busy.label("save"), Some(LOADING_LABEL));
        assert!(!busy.is_enabled("save"));
        assert!(busy.is_busy("save"));

        busy.reset(Some("save"));
        assert_eq!(busy.label("save"), Some("Save changes"));
        assert!(busy.is_enabled("save"));
        assert!(!busy.is_busy("save"));
    }

    #[test]
    fn targeted_reset_leaves_other_controls_busy() {
        let mut busy = BusyControls::new();
        busy.register("save", "Save");
        busy.register("delete", "Delete selected");
        busy.start("save");
        busy.start("delete");

        busy.reset(Some("delete"));
        assert_eq!(busy.label("delete"), Some("Delete selected"));
        assert!(busy.is_busy("save"));
        assert_eq!(busy.busy_ids(), vec!["save"]);
    }

    #[test]
    fn untargeted_reset_restores_every_busy_control() {
        let mut busy = BusyControls::new();
        busy.register("a", "Alpha");
        busy.register("b", "Beta");
        busy.register("idle", "Idle");
        busy.start("a");
        busy.start("b");

        busy.reset(None);
        assert_eq!(busy.label("a"), Some("Alpha"));
        assert_eq!(busy.label("b"), Some("Beta"));
        assert_eq!(busy.label("idle"), Some("Idle"));
        assert!(busy.busy_ids().is_empty());
    }

    #[test]
    fn double_start_keeps_original_label() {
        let mut busy = BusyControls::new();
        busy.register("keys", "Generate keys");
        busy.start("keys");
        busy.start("keys");
        busy.reset(Some("keys"));
        assert_eq!(busy.label("keys"), Some("Generate keys"));
    }

    #[test]
    fn unknown_controls_register_on_start() {
        let mut busy = BusyControls::new();
        assert!(busy.is_enabled("ghost"));
        busy.start("ghost");
        assert!(!busy.is_enabled("ghost"));
        busy.reset(Some("ghost"));
        assert_eq!(busy.label("ghost"), Some(""));
        busy.reset(Some("never-seen"));
        assert_eq!(busy.label("never-seen"), None);
    }

    #[test]
    fn relabel_while_busy_keeps_captured_label() {
        let mut busy = BusyControls::new();
        busy.register("save", "Save");
        busy.start("save");
        busy.register("save", "Store");
        assert_eq!(busy.label("save"), Some(LOADING_LABEL));
        busy.reset(None);
        assert_eq!(busy.label("save"), Some("Save"));
    }
}
