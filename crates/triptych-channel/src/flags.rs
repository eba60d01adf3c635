//! The packed control word: role indices plus the changed bit.
//!
//! The whole role state lives in one `u8` so that a single atomic
//! operation rotates roles and raises/clears the changed bit together.
//!
//! ```text
//! bit 7 6 5 4 3 2 1 0
//!     0 c t t w w r r
//! ```
//!
//! `c` — changed: a snapshot has been published and not yet adopted.
//! `tt` — index of the region in the temp (handoff) role.
//! `ww` — index of the region the producer writes into.
//! `rr` — index of the region the consumer reads from.

use std::fmt;

const READ_MASK: u8 = 0b0000_0011;
const WRITE_MASK: u8 = 0b0000_1100;
const TEMP_MASK: u8 = 0b0011_0000;
const CHANGED_BIT: u8 = 0b0100_0000;

/// A decoded-on-demand view of the control word.
///
/// Pure value type: the two swap operations return the next word, they
/// do not touch shared state. The channel installs the result with a
/// compare-exchange so the whole role rotation is one atomic step.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Flags(u8);

impl Flags {
    /// Initial word: changed = 0, temp = 0, write = 1, read = 2.
    pub const INITIAL: Flags = Flags(0b0000_0110);

    /// Reconstruct from a raw control-word value.
    pub fn from_bits(bits: u8) -> Flags {
        Flags(bits)
    }

    /// The raw control-word value.
    pub fn bits(self) -> u8 {
        self.0
    }

    /// Index of the region in the read role.
    pub fn read_index(self) -> usize {
        (self.0 & READ_MASK) as usize
    }

    /// Index of the region in the write role.
    pub fn write_index(self) -> usize {
        ((self.0 & WRITE_MASK) >> 2) as usize
    }

    /// Index of the region in the temp (handoff) role.
    pub fn temp_index(self) -> usize {
        ((self.0 & TEMP_MASK) >> 4) as usize
    }

    /// Whether a published snapshot is awaiting adoption.
    pub fn changed(self) -> bool {
        self.0 & CHANGED_BIT != 0
    }

    /// The word after a producer publish: write and temp indices
    /// exchanged, changed set, read index untouched.
    pub fn swap_write_with_temp(self) -> Flags {
        Flags(
            CHANGED_BIT
                | (self.0 & READ_MASK)
                | ((self.0 & WRITE_MASK) << 2)
                | ((self.0 & TEMP_MASK) >> 2),
        )
    }

    /// The word after a consumer adoption: read and temp indices
    /// exchanged, changed cleared, write index untouched.
    pub fn swap_read_with_temp(self) -> Flags {
        Flags(
            (self.0 & WRITE_MASK)
                | ((self.0 & READ_MASK) << 4)
                | ((self.0 & TEMP_MASK) >> 4),
        )
    }

    /// Whether {read, write, temp} form a permutation of {0, 1, 2}.
    ///
    /// Holds for every word reachable from [`Flags::INITIAL`]; checked
    /// by tests, never at runtime.
    pub fn is_role_permutation(self) -> bool {
        let mut seen = [false; 4];
        seen[self.read_index()] = true;
        seen[self.write_index()] = true;
        seen[self.temp_index()] = true;
        seen[0] as u8 + seen[1] as u8 + seen[2] as u8 == 3
    }
}

impl fmt::Debug for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Flags")
            .field("changed", &self.changed())
            .field("temp", &self.temp_index())
            .field("write", &self.write_index())
            .field("read", &self.read_index())
            .finish()
    }
}
