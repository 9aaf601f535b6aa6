/// Tunables for the automation core, loaded from the environment with
/// sensible defaults for every knob.
#[derive(Clone, Debug)]
pub struct AutomationSettings {
    /// Seconds the undo window stays open before a staged response commits.
    pub undo_window_secs: u64,
    /// Name given to the process generated at account onboarding.
    pub default_process_name: String,
}

impl Default for AutomationSettings {
    fn default() -> Self {
        Self {
            undo_window_secs: 10,
            default_process_name: "תהליך מכירה".to_string(),
        }
    }
}

impl AutomationSettings {
    pub fn load() -> Self {
        let defaults = Self::default();
        let undo_window_secs = std::env::var("BRIZZI_UNDO_WINDOW_SECS")
            .ok()
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(defaults.undo_window_secs);
        let default_process_name = std::env::var("BRIZZI_DEFAULT_PROCESS")
            .ok()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(defaults.default_process_name);
        Self {
            undo_window_secs,
            default_process_name,
        }
    }
}
