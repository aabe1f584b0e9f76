//! Events for the connection machine and controller observers

/// Inputs to the connection state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// Backend connect and handshake succeeded
    ConnectSucceeded,
    /// Backend connect failed (port missing or handshake error)
    ConnectFailed,
    /// Operator or shutdown asked to release the arm
    Disconnect,
}

/// Controller changes visible to observers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmEvent {
    /// Connection state flipped
    ConnectedChanged(bool),
    /// Pen raised or lowered
    PenChanged(bool),
}

impl ArmEvent {
    /// Check if this event reports the link
    pub fn is_connection_event(&self) -> bool {
        matches!(self, ArmEvent::ConnectedChanged(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_events() {
        assert!(ArmEvent::ConnectedChanged(true).is_connection_event());
        assert!(!ArmEvent::PenChanged(true).is_connection_event());
    }
}
