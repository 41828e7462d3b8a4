use serde::Serialize;

/// Outcome of evaluating one event against one fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Transition {
    Enter,
    Exit,
    Unchanged,
}

impl Transition {
    /// Derive the transition from the previous and the current containment.
    pub fn between(was_at_event: bool, is_at_event: bool) -> Self {
        match (was_at_event, is_at_event) {
            (false, true) => Transition::Enter,
            (true, false) => Transition::Exit,
            _ => Transition::Unchanged,
        }
    }
}
