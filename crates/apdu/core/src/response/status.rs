//! The trailing `SW1 SW2` pair of a card response

use std::fmt;

/// Status word closing every response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusWord {
    /// SW1
    pub sw1: u8,
    /// SW2
    pub sw2: u8,
}

impl StatusWord {
    /// Status word from its two bytes
    pub const fn new(sw1: u8, sw2: u8) -> Self {
        Self { sw1, sw2 }
    }

    /// Status word from its big-endian `u16` form, e.g. `0x9000`
    pub const fn from_u16(status: u16) -> Self {
        let [sw1, sw2] = status.to_be_bytes();
        Self { sw1, sw2 }
    }

    /// Big-endian `u16` form
    pub const fn to_u16(&self) -> u16 {
        u16::from_be_bytes([self.sw1, self.sw2])
    }

    /// Whether the card reported `90 00`
    pub const fn is_success(&self) -> bool {
        matches!((self.sw1, self.sw2), (0x90, 0x00))
    }

    /// Short ISO 7816-4 meaning, for logs
    pub const fn description(&self) -> &'static str {
        match (self.sw1, self.sw2) {
            (0x90, 0x00) => "Success",
            (0x63, _) => "Verification failed, retries in SW2",
            (0x67, 0x00) => "Wrong length",
            (0x68, 0x81) => "Logical channel not supported",
            (0x68, 0x82) => "Secure messaging not supported",
            (0x69, 0x82) => "Security status not satisfied",
            (0x69, 0x85) => "Conditions of use not satisfied",
            (0x69, 0x99) => "Applet selection failed",
            (0x6A, 0x80) => "Incorrect data field",
            (0x6A, 0x82) => "Application not found",
            (0x6A, 0x86) => "Incorrect P1-P2",
            (0x6B, 0x00) => "Wrong P1-P2",
            (0x6C, _) => "Wrong Le, exact length in SW2",
            (0x6D, 0x00) => "Instruction not supported",
            (0x6E, 0x00) => "Class not supported",
            _ => "Unrecognised status",
        }
    }
}

impl From<(u8, u8)> for StatusWord {
    fn from((sw1, sw2): (u8, u8)) -> Self {
        Self::new(sw1, sw2)
    }
}

impl From<[u8; 2]> for StatusWord {
    fn from([sw1, sw2]: [u8; 2]) -> Self {
        Self::new(sw1, sw2)
    }
}

impl From<u16> for StatusWord {
    fn from(status: u16) -> Self {
        Self::from_u16(status)
    }
}

impl From<StatusWord> for u16 {
    fn from(status: StatusWord) -> Self {
        status.to_u16()
    }
}

impl fmt::Display for StatusWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X} {:02X}", self.sw1, self.sw2)
    }
}

/// Status words the wallet card application answers with
pub mod common {
    use super::StatusWord;

    /// `90 00`
    pub const SUCCESS: StatusWord = StatusWord::new(0x90, 0x00);
    /// `67 00`
    pub const WRONG_LENGTH: StatusWord = StatusWord::new(0x67, 0x00);
    /// `68 81`, the logical channel to the applet is gone
    pub const LOGICAL_CHANNEL_NOT_SUPPORTED: StatusWord = StatusWord::new(0x68, 0x81);
    /// `68 82`, the secure messaging context is gone
    pub const SECURE_MESSAGING_NOT_SUPPORTED: StatusWord = StatusWord::new(0x68, 0x82);
    /// `69 99`
    pub const APPLET_SELECTION_FAILED: StatusWord = StatusWord::new(0x69, 0x99);
    /// `6A 80`
    pub const INCORRECT_DATA: StatusWord = StatusWord::new(0x6A, 0x80);
    /// `6A 82`
    pub const FILE_NOT_FOUND: StatusWord = StatusWord::new(0x6A, 0x82);
    /// `6A 86`
    pub const INCORRECT_P1P2: StatusWord = StatusWord::new(0x6A, 0x86);
    /// `6B 00`
    pub const WRONG_P1P2: StatusWord = StatusWord::new(0x6B, 0x00);
    /// `6D 00`
    pub const INVALID_INSTRUCTION: StatusWord = StatusWord::new(0x6D, 0x00);
    /// `6E 00`
    pub const CLASS_NOT_SUPPORTED: StatusWord = StatusWord::new(0x6E, 0x00);
}
