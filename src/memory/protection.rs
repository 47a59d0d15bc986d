// Mon Feb 02 2026 - Alex

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protection {
    None = 0,
    Read = 1,
    Write = 2,
    ReadWrite = 3,
    Execute = 4,
    ReadExecute = 5,
    ReadWriteExecute = 7,
}

impl Protection {
    pub fn from_flags(flags: u32) -> Self {
        match flags & 7 {
            0 => Self::None,
            1 => Self::Read,
            2 => Self::Write,
            3 => Self::ReadWrite,
            4 => Self::Execute,
            5 => Self::ReadExecute,
            7 => Self::ReadWriteExecute,
            _ => Self::None,
        }
    }

    /// Parse the `rwx` prefix of a procfs maps permission field ("r-xp").
    pub fn from_perms(perms: &str) -> Self {
        let mut flags = 0;
        let mut chars = perms.chars();
        if chars.next() == Some('r') {
            flags |= 1;
        }
        if chars.next() == Some('w') {
            flags |= 2;
        }
        if chars.next() == Some('x') {
            flags |= 4;
        }
        Self::from_flags(flags)
    }

    pub fn to_flags(self) -> u32 {
        self as u32
    }

    pub fn can_read(self) -> bool {
        matches!(self, Self::Read | Self::ReadWrite | Self::ReadExecute | Self::ReadWriteExecute)
    }

    pub fn can_write(self) -> bool {
        matches!(self, Self::Write | Self::ReadWrite | Self::ReadWriteExecute)
    }

    pub fn can_execute(self) -> bool {
        matches!(self, Self::Execute | Self::ReadExecute | Self::ReadWriteExecute)
    }

    pub fn is_readable(self) -> bool {
        self.can_read()
    }
}

impl fmt::Display for Protection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "---"),
            Self::Read => write!(f, "r--"),
            Self::Write => write!(f, "-w-"),
            Self::ReadWrite => write!(f, "rw-"),
            Self::Execute => write!(f, "--x"),
            Self::ReadExecute => write!(f, "r-x"),
            Self::ReadWriteExecute => write!(f, "rwx"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_perms() {
        assert_eq!(Protection::from_perms("r-xp"), Protection::ReadExecute);
        assert_eq!(Protection::from_perms("rw-p"), Protection::ReadWrite);
        assert_eq!(Protection::from_perms("---p"), Protection::None);
        assert_eq!(Protection::from_perms("rwxs"), Protection::ReadWriteExecute);
    }

    #[test]
    fn test_display() {
        assert_eq!(Protection::ReadExecute.to_string(), "r-x");
        assert_eq!(Protection::None.to_string(), "---");
    }
}
