//! # Dmrx Common Announcement Channel
//! The CACH is the 24-bit prefix of base station bursts. Seven TACT bits are interleaved
//! with a 17-bit short LC / CSBK fragment; the TACT carries the access type, the timeslot of
//! the following burst and the LC start/stop flags, protected by a Hamming (7,4,3) code.
//! An invalid TACT is not fatal: the message framer falls back to timeslot toggling.

use bitvec::prelude::*;

/// CACH bit positions of the TACT codeword (ETSI TS 102 361-1 §9.3.4 interleaving).
const TACT_POSITIONS: [usize; 7] = [0, 4, 8, 12, 14, 18, 22];

/// Decoded CACH prefix of a base station burst.
#[derive(Debug, Clone)]
pub struct Cach {
    access_type: bool,
    timeslot: u8,
    lcss: u8,
    valid: bool,
    payload: BitVec<u8, Msb0>,
}

impl Cach {
    /// Decodes the leading 24 bits of a burst.
    pub fn decode(bits: &BitSlice<u8, Msb0>) -> Self {
        assert!(bits.len() >= 24, "CACH requires 24 bits (got {})", bits.len());

        let tact: [bool; 7] = TACT_POSITIONS.map(|position| bits[position]);
        let payload = bits[..24]
            .iter()
            .enumerate()
            .filter(|(position, _)| !TACT_POSITIONS.contains(position))
            .map(|(_, bit)| *bit)
            .collect();

        Self {
            access_type: tact[0],
            timeslot: tact[1] as u8,
            lcss: (tact[2] as u8) << 1 | tact[3] as u8,
            valid: hamming_7_4_syndrome(&tact) == 0,
            payload,
        }
    }

    /// Whether the TACT Hamming (7,4,3) parity checks out.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Timeslot of the burst following this CACH, 0 or 1.
    pub fn timeslot(&self) -> u8 {
        self.timeslot
    }

    pub fn is_timeslot0(&self) -> bool {
        self.timeslot == 0
    }

    /// Access type bit: true when the inbound channel is busy.
    pub fn is_inbound_busy(&self) -> bool {
        self.access_type
    }

    /// Link control start/stop flags, 0..=3.
    pub fn lcss(&self) -> u8 {
        self.lcss
    }

    /// The 17-bit short LC / CSBK fragment.
    pub fn payload(&self) -> &BitSlice<u8, Msb0> {
        &self.payload
    }
}

/// Syndrome of the TACT codeword: information bits t0..t3, parity bits t4..t6 generated by
/// p0 = i0+i1+i2, p1 = i1+i2+i3, p2 = i0+i1+i3.
fn hamming_7_4_syndrome(tact: &[bool; 7]) -> u8 {
    let s0 = tact[0] ^ tact[1] ^ tact[2] ^ tact[4];
    let s1 = tact[1] ^ tact[2] ^ tact[3] ^ tact[5];
    let s2 = tact[0] ^ tact[1] ^ tact[3] ^ tact[6];
    (s0 as u8) << 2 | (s1 as u8) << 1 | s2 as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a 24-bit CACH with encoded TACT and the given payload fill.
    fn encode_cach(access_type: bool, timeslot: u8, lcss: u8, fill: bool) -> BitVec<u8, Msb0> {
        let info = [access_type, timeslot != 0, lcss & 0b10 != 0, lcss & 0b01 != 0];
        let tact = [
            info[0],
            info[1],
            info[2],
            info[3],
            info[0] ^ info[1] ^ info[2],
            info[1] ^ info[2] ^ info[3],
            info[0] ^ info[1] ^ info[3],
        ];

        let mut bits: BitVec<u8, Msb0> = BitVec::repeat(fill, 24);
        for (index, position) in TACT_POSITIONS.iter().enumerate() {
            bits.set(*position, tact[index]);
        }
        bits
    }

    #[test]
    fn test_decode_valid_tact() {
        let bits = encode_cach(true, 1, 0b10, false);
        let cach = Cach::decode(&bits);
        assert!(cach.is_valid());
        assert!(cach.is_inbound_busy());
        assert_eq!(cach.timeslot(), 1);
        assert_eq!(cach.lcss(), 0b10);
        assert_eq!(cach.payload().len(), 17);
        assert!(cach.payload().not_any());
    }

    #[test]
    fn test_all_zero_cach_is_the_zero_codeword() {
        let bits: BitVec<u8, Msb0> = BitVec::repeat(false, 24);
        let cach = Cach::decode(&bits);
        assert!(cach.is_valid());
        assert!(cach.is_timeslot0());
    }

    #[test]
    fn test_single_tact_bit_error_invalidates() {
        for position in TACT_POSITIONS {
            let mut bits = encode_cach(false, 1, 0b01, true);
            let flipped = !bits[position];
            bits.set(position, flipped);
            assert!(!Cach::decode(&bits).is_valid(), "flip at {position}");
        }
    }

    #[test]
    fn test_payload_bit_errors_do_not_invalidate() {
        let mut bits = encode_cach(false, 0, 0, false);
        bits.set(1, true);
        bits.set(23, true);
        let cach = Cach::decode(&bits);
        assert!(cach.is_valid());
        assert_eq!(cach.payload().count_ones(), 2);
    }
}
