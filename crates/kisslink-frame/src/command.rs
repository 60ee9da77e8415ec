//! KISS command codes.
//!
//! Only [`Command::DataFrame`] may arrive from a TNC. Everything else is
//! host-to-TNC only.

/// KISS command carried in the low nibble of the header byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Command {
    /// Data frame for transmission / received data.
    DataFrame = 0x00,
    /// Transmitter keyup delay, in 10 ms units.
    TxDelay = 0x01,
    /// Persistence parameter `p`.
    Persistence = 0x02,
    /// Slot interval, in 10 ms units.
    SlotTime = 0x03,
    /// Time to hold up the transmitter after the frame, in 10 ms units.
    TxTail = 0x04,
    /// Nonzero for full duplex, zero for half duplex.
    FullDuplex = 0x05,
    /// TNC-specific hardware command.
    SetHardware = 0x06,
    /// Exit KISS mode.
    Return = 0xFF,
}

impl Command {
    /// All commands, in code order.
    pub const ALL: [Command; 8] = [
        Command::DataFrame,
        Command::TxDelay,
        Command::Persistence,
        Command::SlotTime,
        Command::TxTail,
        Command::FullDuplex,
        Command::SetHardware,
        Command::Return,
    ];

    /// The command code as sent on the wire.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Map a decoded header nibble back to a command.
    ///
    /// `0x0F` maps to [`Command::Return`], since a Return header byte
    /// (`0xFF`) decodes to nibble `0x0F` on port 15.
    pub fn from_nibble(nibble: u8) -> Option<Self> {
        match nibble & 0x0F {
            0x00 => Some(Command::DataFrame),
            0x01 => Some(Command::TxDelay),
            0x02 => Some(Command::Persistence),
            0x03 => Some(Command::SlotTime),
            0x04 => Some(Command::TxTail),
            0x05 => Some(Command::FullDuplex),
            0x06 => Some(Command::SetHardware),
            0x0F => Some(Command::Return),
            _ => None,
        }
    }

    /// Human-readable command name.
    pub fn name(self) -> &'static str {
        match self {
            Command::DataFrame => "DATA",
            Command::TxDelay => "TXDELAY",
            Command::Persistence => "PERSISTENCE",
            Command::SlotTime => "SLOTTIME",
            Command::TxTail => "TXTAIL",
            Command::FullDuplex => "FULLDUPLEX",
            Command::SetHardware => "SETHARDWARE",
            Command::Return => "RETURN",
        }
    }

    /// Returns true if a TNC may legally send this command to the host.
    pub fn is_inbound_legal(self) -> bool {
        self == Command::DataFrame
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_protocol() {
        assert_eq!(Command::DataFrame.code(), 0x00);
        assert_eq!(Command::TxDelay.code(), 0x01);
        assert_eq!(Command::Persistence.code(), 0x02);
        assert_eq!(Command::SlotTime.code(), 0x03);
        assert_eq!(Command::TxTail.code(), 0x04);
        assert_eq!(Command::FullDuplex.code(), 0x05);
        assert_eq!(Command::SetHardware.code(), 0x06);
        assert_eq!(Command::Return.code(), 0xFF);
    }

    #[test]
    fn nibble_roundtrip() {
        for command in Command::ALL {
            assert_eq!(Command::from_nibble(command.code() & 0x0F), Some(command));
        }
        assert_eq!(Command::from_nibble(0x07), None);
        assert_eq!(Command::from_nibble(0x0E), None);
    }

    #[test]
    fn only_data_is_inbound_legal() {
        let legal: Vec<_> = Command::ALL
            .into_iter()
            .filter(|c| c.is_inbound_legal())
            .collect();
        assert_eq!(legal, vec![Command::DataFrame]);
    }
}
