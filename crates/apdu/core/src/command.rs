//! APDU command definitions
//!
//! Short APDUs according to ISO/IEC 7816-4. Contactless wallet cards never use
//! extended lengths, so `Lc` and `Le` are always single bytes.

use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};

use crate::CommandError;

/// Expected length type for APDU commands
pub type ExpectedLength = u8;

/// Generic APDU command structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Command class byte
    pub cla: u8,
    /// Instruction byte
    pub ins: u8,
    /// Parameter 1
    pub p1: u8,
    /// Parameter 2
    pub p2: u8,
    /// Command data (optional)
    pub data: Option<Bytes>,
    /// Expected length (optional)
    pub le: Option<ExpectedLength>,
}

impl Command {
    /// Create a new command with just the header bytes
    pub const fn new(cla: u8, ins: u8, p1: u8, p2: u8) -> Self {
        Self {
            cla,
            ins,
            p1,
            p2,
            data: None,
            le: None,
        }
    }

    /// Set the data field
    pub fn with_data<T: Into<Bytes>>(mut self, data: T) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Set the expected length field
    pub const fn with_le(mut self, le: ExpectedLength) -> Self {
        self.le = Some(le);
        self
    }

    /// Calculate length of serialized command
    pub fn command_length(&self) -> usize {
        4 + self.data.as_ref().map_or(0, |data| 1 + data.len()) + usize::from(self.le.is_some())
    }

    /// Convert to raw APDU bytes
    pub fn to_bytes(&self) -> Result<Bytes, CommandError> {
        let mut buffer = BytesMut::with_capacity(self.command_length());

        buffer.put_u8(self.cla);
        buffer.put_u8(self.ins);
        buffer.put_u8(self.p1);
        buffer.put_u8(self.p2);

        if let Some(data) = &self.data {
            let lc = u8::try_from(data.len()).map_err(|_| CommandError::DataTooLong(data.len()))?;
            buffer.put_u8(lc);
            buffer.put_slice(data);
        }

        if let Some(le) = self.le {
            buffer.put_u8(le);
        }

        Ok(buffer.freeze())
    }

    /// Parse a command from raw bytes
    pub fn from_bytes(data: &[u8]) -> Result<Self, CommandError> {
        let [cla, ins, p1, p2, body @ ..] = data else {
            return Err(CommandError::InvalidLength(data.len()));
        };

        let mut command = Self::new(*cla, *ins, *p1, *p2);

        match body {
            [] => {}
            // Only Le present, no data
            [le] => command.le = Some(*le),
            [lc, rest @ ..] => {
                let lc = usize::from(*lc);
                match rest.len().checked_sub(lc) {
                    Some(0) => {}
                    Some(1) => command.le = Some(rest[lc]),
                    _ => return Err(CommandError::InvalidLength(data.len())),
                }
                if lc > 0 {
                    command.data = Some(Bytes::copy_from_slice(&rest[..lc]));
                }
            }
        }

        Ok(command)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02X} {:02X} {:02X} {:02X}",
            self.cla, self.ins, self.p1, self.p2
        )?;
        if let Some(data) = &self.data {
            write!(f, " [{}]", hex::encode_upper(data))?;
        }
        if let Some(le) = self.le {
            write!(f, " Le={le:02X}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_serialization() {
        let data = Bytes::from_static(&[0xA0, 0x00, 0x00, 0x01, 0x51, 0x00]);
        let cmd = Command::new(0x00, 0xA4, 0x04, 0x00).with_data(data).with_le(0);
        let bytes = cmd.to_bytes().unwrap();

        assert_eq!(
            bytes.as_ref(),
            &[0x00, 0xA4, 0x04, 0x00, 0x06, 0xA0, 0x00, 0x00, 0x01, 0x51, 0x00, 0x00]
        );
        assert_eq!(cmd.command_length(), bytes.len());
    }

    #[test]
    fn test_command_data_too_long() {
        let cmd = Command::new(0x80, 0x20, 0x00, 0x00).with_data(vec![0u8; 256]);
        assert_eq!(cmd.to_bytes(), Err(CommandError::DataTooLong(256)));
    }

    #[test]
    fn test_command_from_bytes() {
        let cmd = Command::from_bytes(&[0x00, 0xA4, 0x04, 0x00]).unwrap();
        assert!(cmd.data.is_none());
        assert!(cmd.le.is_none());

        let cmd = Command::from_bytes(&[0x00, 0xA4, 0x04, 0x00, 0x03, 0x01, 0x02, 0x03]).unwrap();
        assert_eq!(cmd.data.as_deref(), Some(&[0x01, 0x02, 0x03][..]));
        assert!(cmd.le.is_none());

        let cmd =
            Command::from_bytes(&[0x00, 0xA4, 0x04, 0x00, 0x03, 0x01, 0x02, 0x03, 0xFF]).unwrap();
        assert_eq!(cmd.data.as_deref(), Some(&[0x01, 0x02, 0x03][..]));
        assert_eq!(cmd.le, Some(0xFF));

        let cmd = Command::from_bytes(&[0x00, 0xB0, 0x00, 0x00, 0x00]).unwrap();
        assert!(cmd.data.is_none());
        assert_eq!(cmd.le, Some(0));
    }

    #[test]
    fn test_command_from_bytes_rejects_bad_lengths() {
        assert_eq!(
            Command::from_bytes(&[0x00, 0xA4, 0x04]),
            Err(CommandError::InvalidLength(3))
        );
        // Lc says 4 bytes, only 2 follow
        assert_eq!(
            Command::from_bytes(&[0x00, 0xA4, 0x04, 0x00, 0x04, 0x01, 0x02]),
            Err(CommandError::InvalidLength(7))
        );
    }

    #[test]
    fn test_command_display() {
        let cmd = Command::new(0x80, 0xCA, 0x00, 0x00)
            .with_data(vec![0xAB])
            .with_le(0x10);
        assert_eq!(cmd.to_string(), "80 CA 00 00 [AB] Le=10");
    }
}
