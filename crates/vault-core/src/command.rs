//! Data-vault ledger command codes

/// Command byte carried in a data-vault transaction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i8)]
pub enum Command {
    Upsert = 1,
    Delete = 2,
    ConfirmSync = 3,
    SyncConfirm = 4,
}

impl Command {
    #[inline]
    pub fn code(self) -> i8 {
        self as i8
    }

    pub fn from_code(code: i8) -> Option<Self> {
        match code {
            1 => Some(Command::Upsert),
            2 => Some(Command::Delete),
            3 => Some(Command::ConfirmSync),
            4 => Some(Command::SyncConfirm),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_codes() {
        for cmd in [
            Command::Upsert,
            Command::Delete,
            Command::ConfirmSync,
            Command::SyncConfirm,
        ] {
            assert_eq!(Command::from_code(cmd.code()), Some(cmd));
        }
        assert_eq!(Command::Upsert.code(), 1);
        assert_eq!(Command::from_code(0), None);
    }
}
