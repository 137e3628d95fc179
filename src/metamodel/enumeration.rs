use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Display colour of an enumeration literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// Parses the export notation `rgb(r,g,b)`.
    pub fn parse_rgb(value: &str) -> Option<Self> {
        let inner = value.trim().strip_prefix("rgb(")?.strip_suffix(')')?;
        let mut parts = inner.split(',').map(|part| part.trim().parse::<u8>());
        let color = Color {
            r: parts.next()?.ok()?,
            g: parts.next()?.ok()?,
            b: parts.next()?.ok()?,
        };
        match parts.next() {
            None => Some(color),
            Some(_) => None,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({},{},{})", self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Literal {
    pub persistent_name: String,
    pub name: String,
    pub plural_name: String,
    pub description: String,
    pub color: Color,
    pub index: i32,
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A named enumeration; literals are kept ordered by display name.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumerationExpression {
    pub persistent_name: String,
    pub name: String,
    pub plural_name: String,
    pub description: String,
    pub literals: Vec<Arc<Literal>>,
}

impl EnumerationExpression {
    pub fn literal(&self, persistent_name: &str) -> Option<&Arc<Literal>> {
        self.literals
            .iter()
            .find(|literal| literal.persistent_name == persistent_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rgb() {
        assert_eq!(
            Color::parse_rgb("rgb(12, 200,3)"),
            Some(Color { r: 12, g: 200, b: 3 })
        );
        assert_eq!(Color::parse_rgb("rgb(1,2)"), None);
        assert_eq!(Color::parse_rgb("rgb(1,2,3,4)"), None);
        assert_eq!(Color::parse_rgb("#ffffff"), None);
        assert_eq!(Color::parse_rgb("rgb(300,0,0)"), None);
    }
}
