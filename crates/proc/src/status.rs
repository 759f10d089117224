//! TEAM_431: Wait status word delivered by waitpid.
//!
//! Layout: the low two bits tag how the process ended, the remaining bits
//! carry the value (exit code or signal number).
//!
//! | tag | meaning              |
//! |-----|----------------------|
//! | 0   | exited normally      |
//! | 1   | killed by signal     |
//! | 2   | killed, core dumped  |
//! | 3   | stopped              |

const TAG_BITS: u32 = 2;
const TAG_MASK: i32 = (1 << TAG_BITS) - 1;

/// How a process ended, decoded from a [`WaitStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Exited(i32),
    Signaled(i32),
    CoreDumped(i32),
    Stopped(i32),
}

/// Encoded wait status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct WaitStatus(i32);

impl WaitStatus {
    const EXITED: i32 = 0;
    const SIGNALED: i32 = 1;
    const CORE: i32 = 2;
    const STOPPED: i32 = 3;

    /// Status for a normal exit with `code`.
    pub const fn exited(code: i32) -> Self {
        Self((code << TAG_BITS) | Self::EXITED)
    }

    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> i32 {
        self.0
    }

    pub const fn termination(self) -> Termination {
        let value = self.0 >> TAG_BITS;
        match self.0 & TAG_MASK {
            Self::EXITED => Termination::Exited(value),
            Self::SIGNALED => Termination::Signaled(value),
            Self::CORE => Termination::CoreDumped(value),
            _ => Termination::Stopped(value),
        }
    }

    pub const fn is_exited(self) -> bool {
        self.0 & TAG_MASK == Self::EXITED
    }

    /// Exit code, if the process exited normally.
    pub const fn exit_code(self) -> Option<i32> {
        match self.termination() {
            Termination::Exited(code) => Some(code),
            _ => None,
        }
    }

    pub const fn is_stopped(self) -> bool {
        self.0 & TAG_MASK == Self::STOPPED
    }

    /// Bytes as stored in user memory.
    pub const fn to_bytes(self) -> [u8; 4] {
        self.0.to_ne_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_encoding() {
        let status = WaitStatus::exited(7);
        assert_eq!(status.raw(), 28);
        assert!(status.is_exited());
        assert_eq!(status.exit_code(), Some(7));
        assert_eq!(status.termination(), Termination::Exited(7));
    }

    #[test]
    fn test_negative_exit_code_survives() {
        assert_eq!(WaitStatus::exited(-1).exit_code(), Some(-1));
        assert_eq!(WaitStatus::exited(0).raw(), 0);
    }

    #[test]
    fn test_other_tags_are_not_exits() {
        let killed = WaitStatus::from_raw((9 << 2) | 1);
        assert!(!killed.is_exited());
        assert_eq!(killed.exit_code(), None);
        assert_eq!(killed.termination(), Termination::Signaled(9));

        assert_eq!(
            WaitStatus::from_raw((11 << 2) | 2).termination(),
            Termination::CoreDumped(11)
        );
        assert!(WaitStatus::from_raw((19 << 2) | 3).is_stopped());
    }

    #[test]
    fn test_bytes_are_native_endian_word() {
        let status = WaitStatus::exited(3);
        assert_eq!(i32::from_ne_bytes(status.to_bytes()), 12);
    }
}
