//! `ClientAgentMode` — the WORKING / CONNECTION_ESTABLISHMENT / CONNECTED
//! state machine a client agent cycles through while deciding when to
//! chase down a router connection (spec.md §4.7).

use dtn_core::AgentId;

/// Number of ticks a client stays independent of the network before it must
/// work toward reconnecting.
pub const RECONNECTION_INTERVAL: u64 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClientAgentMode {
    Working,
    ConnectionEstablishment,
    Connected,
}

#[derive(Clone, Debug)]
pub struct ClientState {
    pub mode: ClientAgentMode,
    pub working_steps_remaining: u64,
    pub pursuit_target: Option<AgentId>,
}

impl Default for ClientState {
    fn default() -> Self {
        Self {
            mode: ClientAgentMode::Working,
            working_steps_remaining: RECONNECTION_INTERVAL,
            pursuit_target: None,
        }
    }
}

impl ClientState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the mode for this tick. Must run before any
    /// connection-establishment logic so that a router connected last tick
    /// resets the countdown before this tick's decisions are made.
    pub fn step_mode(&mut self) {
        match self.mode {
            ClientAgentMode::Connected => {
                self.mode = ClientAgentMode::Working;
                self.working_steps_remaining = RECONNECTION_INTERVAL;
                self.pursuit_target = None;
            }
            ClientAgentMode::Working => {
                self.working_steps_remaining = self.working_steps_remaining.saturating_sub(1);
                if self.working_steps_remaining == 0 {
                    self.mode = ClientAgentMode::ConnectionEstablishment;
                }
            }
            ClientAgentMode::ConnectionEstablishment => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_down_to_connection_establishment() {
        let mut state = ClientState::new();
        for _ in 0..RECONNECTION_INTERVAL - 1 {
            state.step_mode();
            assert_eq!(state.mode, ClientAgentMode::Working);
        }
        state.step_mode();
        assert_eq!(state.mode, ClientAgentMode::ConnectionEstablishment);
    }

    #[test]
    fn connected_resets_to_working() {
        let mut state = ClientState::new();
        state.mode = ClientAgentMode::Connected;
        state.pursuit_target = Some(AgentId::new("r0"));
        state.step_mode();
        assert_eq!(state.mode, ClientAgentMode::Working);
        assert_eq!(state.working_steps_remaining, RECONNECTION_INTERVAL);
        assert!(state.pursuit_target.is_none());
    }
}
