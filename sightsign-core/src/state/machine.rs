//! Connection state machine

use super::events::ConnectionEvent;

/// Controller link states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No link, moves only update local state
    #[default]
    Disconnected,
    /// Link open, moves reach the arm
    Connected,
}

impl ConnectionState {
    /// Check if moves should be dispatched
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }

    /// Process an event and return the next state
    pub fn transition(self, event: ConnectionEvent) -> Self {
        use ConnectionEvent::*;
        use ConnectionState::*;

        match (self, event) {
            (Disconnected, ConnectSucceeded) => Connected,
            (Disconnected, ConnectFailed) => Disconnected,
            (Connected, Disconnect) => Disconnected,

            // Default: stay in current state
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect() {
        let next = ConnectionState::Disconnected.transition(ConnectionEvent::ConnectSucceeded);
        assert_eq!(next, ConnectionState::Connected);
    }

    #[test]
    fn test_failed_connect_stays_disconnected() {
        let next = ConnectionState::Disconnected.transition(ConnectionEvent::ConnectFailed);
        assert_eq!(next, ConnectionState::Disconnected);
    }

    #[test]
    fn test_disconnect_only_from_connected() {
        assert_eq!(
            ConnectionState::Connected.transition(ConnectionEvent::Disconnect),
            ConnectionState::Disconnected
        );
        assert_eq!(
            ConnectionState::Disconnected.transition(ConnectionEvent::Disconnect),
            ConnectionState::Disconnected
        );
    }

    #[test]
    fn test_connected_ignores_connect_events() {
        for event in [ConnectionEvent::ConnectSucceeded, ConnectionEvent::ConnectFailed] {
            assert_eq!(
                ConnectionState::Connected.transition(event),
                ConnectionState::Connected
            );
        }
    }
}
