use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const ALPHABET_LEN: i32 = 26;

/// Cell address (0-indexed internally)
///
/// Ordering is lexicographic: first by row, then by column.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Address {
    pub row: i32,
    pub col: i32,
}

impl Address {
    /// Number of addressable rows
    pub const MAX_ROWS: i32 = 16_384;
    /// Number of addressable columns (column XFD)
    pub const MAX_COLS: i32 = 16_384;
    /// Longest accepted A1 notation
    pub const MAX_LEN: usize = 8;

    /// Sentinel for "no address"
    pub const NONE: Address = Address { row: -1, col: -1 };

    pub const fn new(row: i32, col: i32) -> Self {
        Address { row, col }
    }

    /// Check if this address lies inside the sheet
    pub fn is_valid(&self) -> bool {
        (0..Self::MAX_ROWS).contains(&self.row) && (0..Self::MAX_COLS).contains(&self.col)
    }

    /// Parse A1 notation (e.g., "A1" -> (0, 0), "B2" -> (1, 1))
    ///
    /// Returns [`Address::NONE`] for anything that is not a valid, in-range,
    /// upper-case reference.
    pub fn from_a1(notation: &str) -> Self {
        Self::parse_a1(notation).unwrap_or(Self::NONE)
    }

    fn parse_a1(notation: &str) -> Option<Self> {
        if notation.is_empty() || notation.len() > Self::MAX_LEN {
            return None;
        }

        let bytes = notation.as_bytes();
        let split = bytes.iter().take_while(|b| b.is_ascii_uppercase()).count();
        let (letters, digits) = notation.split_at(split);

        if letters.is_empty() || digits.is_empty() {
            return None;
        }
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let col = col_from_label(letters)?;
        let row: i32 = digits.parse().ok()?;
        if row <= 0 {
            return None;
        }

        let address = Address::new(row - 1, col);
        address.is_valid().then_some(address)
    }

    /// Convert to A1 notation (e.g., (0, 0) -> "A1")
    ///
    /// Invalid addresses have no notation and produce an empty string.
    pub fn to_a1(&self) -> String {
        if !self.is_valid() {
            return String::new();
        }
        format!("{}{}", col_to_label(self.col), self.row + 1)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1())
    }
}

impl FromStr for Address {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_a1(s).ok_or_else(|| format!("Invalid cell address: {}", s))
    }
}

/// Convert column index (0-indexed) to label (A, B, ..., Z, AA, AB, ...)
pub fn col_to_label(col: i32) -> String {
    let mut letters = Vec::new();
    let mut n = col;

    loop {
        letters.push(b'A' + (n % ALPHABET_LEN) as u8);
        n = n / ALPHABET_LEN - 1;
        if n < 0 {
            break;
        }
    }

    letters.iter().rev().map(|&b| char::from(b)).collect()
}

/// Convert upper-case column label (A, B, ..., Z, AA, AB, ...) to index (0-indexed)
///
/// Labels that would overflow or contain anything but `A`-`Z` yield `None`.
pub fn col_from_label(label: &str) -> Option<i32> {
    if label.is_empty() {
        return None;
    }

    let mut col: i32 = 0;
    for b in label.bytes() {
        if !b.is_ascii_uppercase() {
            return None;
        }
        let digit = i32::from(b - b'A') + 1;
        col = col.checked_mul(ALPHABET_LEN)?.checked_add(digit)?;
    }

    Some(col - 1)
}

/// Smallest rectangle covering every occupied address
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub rows: i32,
    pub cols: i32,
}

impl Size {
    pub const fn new(rows: i32, cols: i32) -> Self {
        Size { rows, cols }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.rows, self.cols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_round_trip(address: Address, notation: &str) {
        assert_eq!(address.to_a1(), notation);
        assert_eq!(Address::from_a1(notation), address);
    }

    #[test]
    fn test_a1_round_trip() {
        for i in 0..25 {
            let label = format!("{}{}", char::from(b'A' + i as u8), i + 1);
            assert_round_trip(Address::new(i, i), &label);
        }

        assert_round_trip(Address::new(0, 0), "A1");
        assert_round_trip(Address::new(0, 1), "B1");
        assert_round_trip(Address::new(0, 25), "Z1");
        assert_round_trip(Address::new(0, 26), "AA1");
        assert_round_trip(Address::new(0, 27), "AB1");
        assert_round_trip(Address::new(0, 51), "AZ1");
        assert_round_trip(Address::new(0, 52), "BA1");
        assert_round_trip(Address::new(0, 77), "BZ1");
        assert_round_trip(Address::new(0, 78), "CA1");
        assert_round_trip(Address::new(0, 701), "ZZ1");
        assert_round_trip(Address::new(0, 702), "AAA1");
        assert_round_trip(Address::new(136, 2), "C137");
        assert_round_trip(
            Address::new(Address::MAX_ROWS - 1, Address::MAX_COLS - 1),
            "XFD16384",
        );
    }

    #[test]
    fn test_every_column_round_trips() {
        for col in 0..Address::MAX_COLS {
            let address = Address::new(col % 97, col);
            assert_eq!(Address::from_a1(&address.to_a1()), address);
        }
    }

    #[test]
    fn test_invalid_to_a1_is_empty() {
        assert_eq!(Address::NONE.to_a1(), "");
        assert_eq!(Address::new(-10, 0).to_a1(), "");
        assert_eq!(Address::new(1, -3).to_a1(), "");
        assert_eq!(Address::new(Address::MAX_ROWS, 0).to_a1(), "");
    }

    #[test]
    fn test_from_a1_rejects_malformed_input() {
        for input in [
            "",
            "A",
            "1",
            "e2",
            "a1",
            "A0",
            "A-1",
            "A+1",
            "+A1",
            "R2D2",
            "C3PO",
            "XFD16385",
            "XFE16384",
            "A1234567890123456789",
            "ABCDEFGHIJKLMNOPQRS8",
            "AAAAAAA1",
            "A 1",
        ] {
            assert_eq!(Address::from_a1(input), Address::NONE, "input {:?}", input);
            assert!(input.parse::<Address>().is_err());
        }
    }

    #[test]
    fn test_ordering_is_row_major() {
        let mut addresses = vec![
            Address::new(2, 0),
            Address::new(0, 5),
            Address::new(1, 1),
            Address::new(0, 1),
        ];
        addresses.sort();
        assert_eq!(
            addresses,
            vec![
                Address::new(0, 1),
                Address::new(0, 5),
                Address::new(1, 1),
                Address::new(2, 0),
            ]
        );
    }

    #[test]
    fn test_col_label_helpers() {
        assert_eq!(col_to_label(0), "A");
        assert_eq!(col_to_label(26), "AA");
        assert_eq!(col_from_label("ZZ"), Some(701));
        assert_eq!(col_from_label("a"), None);
        assert_eq!(col_from_label(""), None);
        assert_eq!(col_from_label(&"Z".repeat(40)), None);
    }

    #[test]
    fn test_size_display() {
        assert_eq!(Size::new(5, 4).to_string(), "(5, 4)");
        assert_eq!(Size::default(), Size::new(0, 0));
    }
}
