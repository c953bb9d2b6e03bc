//! Drawing instructions of the presentation library, e.g.
//! `AC(DEPVS);AP(DRGARE01);LS(DASH,1,CHGRF);CS(DEPARE02)`.

use std::fmt;

use crate::error::CatalogError;
use crate::procedures::Procedure;

/// Simple line pattern of an `LS` instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinePattern {
    Solid,
    Dash,
    Dot,
}

impl LinePattern {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "SOLD" | "SOLID" => Some(LinePattern::Solid),
            "DASH" => Some(LinePattern::Dash),
            "DOTT" | "DOT" => Some(LinePattern::Dot),
            _ => None,
        }
    }

    fn code(self) -> &'static str {
        match self {
            LinePattern::Solid => "SOLD",
            LinePattern::Dash => "DASH",
            LinePattern::Dot => "DOTT",
        }
    }
}

/// Symbol rotation of an `SY` instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum Rotation {
    Degrees(f64),
    /// Rotation taken from a feature attribute such as `ORIENT`.
    Attribute(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// `AC(color[,transparency])`
    AreaColor { color: String, transparency: u8 },
    /// `AP(pattern)`
    AreaPattern(String),
    /// `LS(pattern,width,color)`
    LineStyle {
        pattern: LinePattern,
        width: u8,
        color: String,
    },
    /// `LC(linestyle)`
    LineComplex(String),
    /// `SY(symbol[,rotation])`
    Symbol {
        name: String,
        rotation: Option<Rotation>,
    },
    /// `TX(attribute,...)` or `TE('format','attribute',...)`
    Text {
        attribute: String,
        format: Option<String>,
    },
    /// `CS(procedure)`
    Conditional(Procedure),
}

impl Instruction {
    pub fn area_color(color: &str) -> Self {
        Instruction::AreaColor {
            color: color.into(),
            transparency: 0,
        }
    }

    pub fn area_pattern(pattern: &str) -> Self {
        Instruction::AreaPattern(pattern.into())
    }

    pub fn line(pattern: LinePattern, width: u8, color: &str) -> Self {
        Instruction::LineStyle {
            pattern,
            width,
            color: color.into(),
        }
    }

    pub fn line_complex(style: &str) -> Self {
        Instruction::LineComplex(style.into())
    }

    pub fn symbol(name: &str) -> Self {
        Instruction::Symbol {
            name: name.into(),
            rotation: None,
        }
    }

    pub fn rotated_symbol(name: &str, degrees: f64) -> Self {
        Instruction::Symbol {
            name: name.into(),
            rotation: Some(Rotation::Degrees(degrees)),
        }
    }

    /// Parse a single `XX(args)` directive.
    pub fn parse(directive: &str) -> Result<Self, CatalogError> {
        let invalid = || CatalogError::InvalidInstruction(directive.to_string());
        let directive = directive.trim();
        let open = directive.find('(').ok_or_else(invalid)?;
        if !directive.ends_with(')') {
            return Err(invalid());
        }
        let code = &directive[..open];
        let args = split_args(&directive[open + 1..directive.len() - 1]);
        let arg = |i: usize| args.get(i).map(|s| unquote(s)).ok_or_else(invalid);

        let instruction = match code {
            "AC" => Instruction::AreaColor {
                color: arg(0)?.to_string(),
                transparency: args
                    .get(1)
                    .map(|t| t.parse().map_err(|_| invalid()))
                    .transpose()?
                    .unwrap_or(0),
            },
            "AP" => Instruction::AreaPattern(arg(0)?.to_string()),
            "LS" => Instruction::LineStyle {
                pattern: LinePattern::parse(arg(0)?).ok_or_else(invalid)?,
                width: arg(1)?.parse().map_err(|_| invalid())?,
                color: arg(2)?.to_string(),
            },
            "LC" => Instruction::LineComplex(arg(0)?.to_string()),
            "SY" => Instruction::Symbol {
                name: arg(0)?.to_string(),
                rotation: args.get(1).map(|r| {
                    let r = unquote(r);
                    match r.parse::<f64>() {
                        Ok(deg) => Rotation::Degrees(deg),
                        Err(_) => Rotation::Attribute(r.to_string()),
                    }
                }),
            },
            "TX" => Instruction::Text {
                attribute: arg(0)?.to_string(),
                format: None,
            },
            "TE" => Instruction::Text {
                attribute: arg(1)?.to_string(),
                format: Some(arg(0)?.to_string()),
            },
            "CS" => Instruction::Conditional(Procedure::from_name(arg(0)?)),
            _ => return Err(invalid()),
        };
        Ok(instruction)
    }
}

/// Parse a `;` separated instruction list. Empty directives are ignored.
pub fn parse_instructions(s: &str) -> Result<Vec<Instruction>, CatalogError> {
    split_top_level(s, ';')
        .into_iter()
        .filter(|d| !d.trim().is_empty())
        .map(Instruction::parse)
        .collect()
}

fn split_args(s: &str) -> Vec<&str> {
    split_top_level(s, ',').into_iter().map(str::trim).collect()
}

/// Split on `sep`, ignoring separators inside quotes and parentheses.
fn split_top_level(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut quoted = false;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '\'' => quoted = !quoted,
            '(' if !quoted => depth += 1,
            ')' if !quoted => depth -= 1,
            c if c == sep && !quoted && depth == 0 => {
                parts.push(&s[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

fn unquote(s: &str) -> &str {
    s.trim().trim_matches('\'')
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::AreaColor {
                color,
                transparency: 0,
            } => write!(f, "AC({})", color),
            Instruction::AreaColor {
                color,
                transparency,
            } => write!(f, "AC({},{})", color, transparency),
            Instruction::AreaPattern(p) => write!(f, "AP({})", p),
            Instruction::LineStyle {
                pattern,
                width,
                color,
            } => write!(f, "LS({},{},{})", pattern.code(), width, color),
            Instruction::LineComplex(s) => write!(f, "LC({})", s),
            Instruction::Symbol {
                name,
                rotation: None,
            } => write!(f, "SY({})", name),
            Instruction::Symbol {
                name,
                rotation: Some(Rotation::Degrees(d)),
            } => write!(f, "SY({},{})", name, d),
            Instruction::Symbol {
                name,
                rotation: Some(Rotation::Attribute(a)),
            } => write!(f, "SY({},{})", name, a),
            Instruction::Text {
                attribute,
                format: None,
            } => write!(f, "TX({})", attribute),
            Instruction::Text {
                attribute,
                format: Some(fmt_str),
            } => write!(f, "TE('{}','{}')", fmt_str, attribute),
            Instruction::Conditional(p) => write!(f, "CS({})", p),
        }
    }
}

/// Render an instruction list in presentation library form.
pub fn format_instructions(instructions: &[Instruction]) -> String {
    instructions
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(";")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list() {
        let list = parse_instructions("AC(DEPVS);AP(DRGARE01);LS(DASH,1,CHGRF);CS(DEPARE02)").unwrap();
        assert_eq!(
            list,
            vec![
                Instruction::area_color("DEPVS"),
                Instruction::area_pattern("DRGARE01"),
                Instruction::line(LinePattern::Dash, 1, "CHGRF"),
                Instruction::Conditional(Procedure::Depare),
            ]
        );
        assert_eq!(
            format_instructions(&list),
            "AC(DEPVS);AP(DRGARE01);LS(DASH,1,CHGRF);CS(DEPARE02)"
        );
    }

    #[test]
    fn test_parse_text_and_rotation() {
        let list =
            parse_instructions("TE('by %s','OBJNAM',2,1,2,'15110',0,0,CHBLK,26);SY(BOYLAT13,ORIENT)")
                .unwrap();
        assert_eq!(
            list[0],
            Instruction::Text {
                attribute: "OBJNAM".into(),
                format: Some("by %s".into())
            }
        );
        assert_eq!(
            list[1],
            Instruction::Symbol {
                name: "BOYLAT13".into(),
                rotation: Some(Rotation::Attribute("ORIENT".into()))
            }
        );
    }

    #[test]
    fn test_invalid_directive() {
        assert!(parse_instructions("AC(DEPVS").is_err());
        assert!(parse_instructions("ZZ(FOO)").is_err());
        assert!(parse_instructions("LS(WAVY,1,CHBLK)").is_err());
    }
}
