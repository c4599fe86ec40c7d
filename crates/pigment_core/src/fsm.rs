//! State machines for tool interaction states.
//!
//! Flat machines over caller-defined state and event enums. Events with no
//! matching transition from the current state are ignored.

/// A transition in the state machine
#[derive(Clone, Copy, Debug)]
struct Transition<S, E> {
    from_state: S,
    event: E,
    to_state: S,
}

/// Builder for creating state machines
#[derive(Debug)]
pub struct StateMachineBuilder<S, E> {
    initial_state: S,
    transitions: Vec<Transition<S, E>>,
}

impl<S: Copy + Eq, E: Copy + Eq> StateMachineBuilder<S, E> {
    pub fn new(initial_state: S) -> Self {
        Self {
            initial_state,
            transitions: Vec::new(),
        }
    }

    /// Add a simple transition (from, event, to)
    pub fn on(mut self, from: S, event: E, to: S) -> Self {
        self.transitions.push(Transition {
            from_state: from,
            event,
            to_state: to,
        });
        self
    }

    /// Add the same transition from several source states
    pub fn on_any(mut self, from: &[S], event: E, to: S) -> Self {
        for &state in from {
            self = self.on(state, event, to);
        }
        self
    }

    /// Build the state machine
    pub fn build(self) -> StateMachine<S, E> {
        StateMachine {
            current_state: self.initial_state,
            transitions: self.transitions,
        }
    }
}

/// A state machine instance
pub struct StateMachine<S, E> {
    current_state: S,
    transitions: Vec<Transition<S, E>>,
}

impl<S: Copy + Eq, E: Copy + Eq> StateMachine<S, E> {
    /// Create a builder for a state machine
    pub fn builder(initial_state: S) -> StateMachineBuilder<S, E> {
        StateMachineBuilder::new(initial_state)
    }

    /// Get the current state
    pub fn current_state(&self) -> S {
        self.current_state
    }

    /// Check if we're in a specific state
    pub fn is_in(&self, state: S) -> bool {
        self.current_state == state
    }

    /// Send an event, returning the state after it was handled
    pub fn send(&mut self, event: E) -> S {
        let current = self.current_state;
        if let Some(transition) = self
            .transitions
            .iter()
            .find(|t| t.from_state == current && t.event == event)
        {
            self.current_state = transition.to_state;
        }
        self.current_state
    }
}

impl<S: std::fmt::Debug, E> std::fmt::Debug for StateMachine<S, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateMachine")
            .field("current_state", &self.current_state)
            .field("transitions", &self.transitions.len())
            .finish()
    }
}
