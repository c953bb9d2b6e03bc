//! S-57 COLOUR attribute handling
//!
//! COLOUR Attribute values from S-57 specification:
//! ID  | Meaning  | INT 1 | S-4
//! ----|----------|-------|--------
//! 1   | white    | IP 11.1 | 450.2-3
//! 2   | black    |       |
//! 3   | red      | IP 11.2 | 450.2-3
//! 4   | green    | IP 11.3 | 450.2-3
//! 5   | blue     | IP 11.4 | 450.2-3
//! 6   | yellow   | IP 11.6 | 450.2-3
//! 7   | grey     |       |
//! 8   | brown    |       |
//! 9   | amber    | IP 11.8 | 450.2-3
//! 10  | violet   | IP 11.5 | 450.2-3
//! 11  | orange   | IP 11.7 | 450.2-3
//! 12  | magenta  |       |
//! 13  | pink     |       |

use crate::attribute::AttrList;

/// S-57 COLOUR attribute enum
///
/// Represents standardized colors used in maritime navigation features
/// such as lights, buoys, and beacons. The integer discriminants match
/// the S-57 specification exactly.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Colour {
    White = 1,
    Black = 2,
    Red = 3,
    Green = 4,
    Blue = 5,
    Yellow = 6,
    Grey = 7,
    Brown = 8,
    Amber = 9,
    Violet = 10,
    Orange = 11,
    Magenta = 12,
    Pink = 13,
}

impl Colour {
    /// Parse a COLOUR value from S-57 integer code
    pub fn from_code(val: u16) -> Option<Self> {
        match val {
            1 => Some(Colour::White),
            2 => Some(Colour::Black),
            3 => Some(Colour::Red),
            4 => Some(Colour::Green),
            5 => Some(Colour::Blue),
            6 => Some(Colour::Yellow),
            7 => Some(Colour::Grey),
            8 => Some(Colour::Brown),
            9 => Some(Colour::Amber),
            10 => Some(Colour::Violet),
            11 => Some(Colour::Orange),
            12 => Some(Colour::Magenta),
            13 => Some(Colour::Pink),
            _ => None,
        }
    }

    /// Abbreviation used in light characteristics (INT 1 P 11).
    pub fn abbreviation(self) -> &'static str {
        match self {
            Colour::White => "W",
            Colour::Black => "Bl",
            Colour::Red => "R",
            Colour::Green => "G",
            Colour::Blue => "Bu",
            Colour::Yellow => "Y",
            Colour::Grey => "Gy",
            Colour::Brown => "Br",
            Colour::Amber => "Am",
            Colour::Violet => "Vi",
            Colour::Orange => "Or",
            Colour::Magenta => "Mg",
            Colour::Pink => "Pk",
        }
    }
}

/// Parse the COLOUR list of a feature.
///
/// Unknown codes are dropped. Empty if COLOUR is missing or invalid.
pub fn parse_colours(list: &AttrList) -> Vec<Colour> {
    list.iter().filter_map(Colour::from_code).collect()
}

/// S-52 color token used for light sectors and flares of the given colours.
///
/// White/red and white/green combinations (sector lights seen as one light)
/// take the colour of the non-white component.
pub fn light_color_token(colours: &[Colour]) -> &'static str {
    match colours {
        [Colour::Red] | [Colour::White, Colour::Red] | [Colour::Red, Colour::White] => "LITRD",
        [Colour::Green] | [Colour::White, Colour::Green] | [Colour::Green, Colour::White] => {
            "LITGN"
        }
        [Colour::White | Colour::Yellow | Colour::Amber | Colour::Orange] => "LITYW",
        _ => "CHMGD",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_colours() {
        let colours = parse_colours(&AttrList::from([1, 3, 99]));
        assert_eq!(colours, vec![Colour::White, Colour::Red]);
    }

    #[test]
    fn test_light_color_token() {
        assert_eq!(light_color_token(&[Colour::Red]), "LITRD");
        assert_eq!(light_color_token(&[Colour::White, Colour::Green]), "LITGN");
        assert_eq!(light_color_token(&[Colour::Yellow]), "LITYW");
        assert_eq!(light_color_token(&[Colour::Blue]), "CHMGD");
        assert_eq!(light_color_token(&[]), "CHMGD");
    }
}
