//! Morph state of the decorative scene and keyword intent detection.

/// Which of the two precomputed arrangements the scene collaborator should
/// display. Exactly one value is active at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MorphState {
    Assembled,
    Scattered,
}

impl MorphState {
    pub fn toggled(self) -> Self {
        match self {
            MorphState::Assembled => MorphState::Scattered,
            MorphState::Scattered => MorphState::Assembled,
        }
    }

    /// Status label shown in the UI.
    pub fn label(self) -> &'static str {
        match self {
            MorphState::Assembled => "TREE SHAPE",
            MorphState::Scattered => "SCATTERED",
        }
    }

    /// Label for the toggle control: names the transition, not the state.
    pub fn toggle_hint(self) -> &'static str {
        match self {
            MorphState::Assembled => "Disperse",
            MorphState::Scattered => "Manifest",
        }
    }
}

const SCATTER_TRIGGERS: &[&str] = &["scatter", "disperse"];
const ASSEMBLE_TRIGGERS: &[&str] = &["shape", "form", "tree"];

/// Detect morph intent in raw user input.
///
/// Case-insensitive substring match. Scatter intent is checked before
/// assemble intent, so an input containing both trigger sets (e.g. "scatter
/// this tree") resolves to [`MorphState::Scattered`]. Returns `None` when no
/// trigger matches, which leaves the current state unchanged.
pub fn morph_intent(input: &str) -> Option<MorphState> {
    let lowered = input.to_lowercase();

    if SCATTER_TRIGGERS.iter().any(|t| lowered.contains(t)) {
        Some(MorphState::Scattered)
    } else if ASSEMBLE_TRIGGERS.iter().any(|t| lowered.contains(t)) {
        Some(MorphState::Assembled)
    } else {
        None
    }
}
