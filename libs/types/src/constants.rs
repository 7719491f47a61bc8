//! Protocol constants: validation token, reserved id space, socket paths.

use num_enum::TryFromPrimitive;

/// Validation token merged into the high 16 bits of `msg_id` on the wire.
///
/// Every frame sent by a friendly peer carries this exact value; anything
/// else in those bits marks the frame as foreign or corrupt.
pub const WIRE_TOKEN: u16 = 0xFEED;

/// First reserved message id. Ids below this are application-defined,
/// ids at or above it belong to the protocol itself.
pub const CONTROL_ID_BASE: u16 = 0xFF00;

/// Default directory for broker sockets (`<dir>/<server-name>`).
pub const DEFAULT_SOCKET_DIR: &str = "/tmp/msgbus";

/// Reserved protocol control message ids
///
/// These live in the `>= CONTROL_ID_BASE` range of the 16-bit id space and
/// drive the connect/register/notify handshakes. Application traffic must
/// stay below [`CONTROL_ID_BASE`].
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive)]
pub enum ControlId {
    /// Connection negotiation; reply carries the assigned identity
    Connect = 0xFF01,
    /// Subscribe with a topic mask (and optional registration payload)
    Register = 0xFF02,
    /// Subscriber is ready; broker may start delivering notifications
    Sync = 0xFF03,
    /// Best-effort subscription teardown
    Unregister = 0xFF04,
    /// Carrier for a notify envelope (pub/sub delivery)
    Notify = 0xFF05,
    /// Positive acknowledgement reply
    Success = 0xFF06,
}

impl ControlId {
    /// True if `id` falls in the reserved control range.
    pub fn is_reserved(id: u16) -> bool {
        id >= CONTROL_ID_BASE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_ids_are_reserved() {
        for id in [
            ControlId::Connect,
            ControlId::Register,
            ControlId::Sync,
            ControlId::Unregister,
            ControlId::Notify,
            ControlId::Success,
        ] {
            assert!(ControlId::is_reserved(id as u16));
        }
        assert!(!ControlId::is_reserved(5));
        assert!(!ControlId::is_reserved(CONTROL_ID_BASE - 1));
    }

    #[test]
    fn control_id_round_trip() {
        let id = ControlId::try_from(0xFF05).unwrap();
        assert_eq!(id, ControlId::Notify);
        assert!(ControlId::try_from(0xFF99u16).is_err());
    }
}
