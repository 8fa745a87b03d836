//! Splits a free-text street line into street name and house number.
//!
//! This is a heuristic kept for output compatibility with existing gateway records.

const HOUSE_NUMBER_TRIM: &[char] = &[',', ' ', '\t', '\n', '\r', '\0', '\x0B'];
const WHITESPACE_TRIM: &[char] = &[' ', '\t', '\n', '\r', '\0', '\x0B'];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreetAddress {
    pub street_name: String,
    pub house_number: String,
}

pub fn split_street(input: &str) -> StreetAddress {
    let bytes = input.as_bytes();
    let mut street_name = input;
    let mut house_number = "";

    // Spaces are ASCII, so every index found here is a char boundary.
    for (offset, _) in input.rmatch_indices(' ') {
        if bytes.get(offset + 1).is_some_and(u8::is_ascii_digit) {
            street_name = input[..offset].trim_matches(WHITESPACE_TRIM);
            house_number = input[offset + 1..].trim_matches(WHITESPACE_TRIM);
            break;
        }
    }

    if (house_number.is_empty() || house_number == "0")
        && bytes.first().is_some_and(u8::is_ascii_digit)
    {
        if let Some(pos) = input.find(' ') {
            house_number = input[..pos].trim_matches(HOUSE_NUMBER_TRIM);
            street_name = input[pos + 1..].trim_matches(WHITESPACE_TRIM);
        }
    }

    StreetAddress {
        street_name: street_name.to_string(),
        house_number: house_number.to_string(),
    }
}
