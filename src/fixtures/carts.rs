//! Cart Fixtures

use serde::Deserialize;

/// Wrapper for a cart in YAML
#[derive(Debug, Deserialize)]
pub struct CartFixture {
    /// Ordered cart lines
    pub lines: Vec<CartLineFixture>,
}

/// Cart line fixture from YAML
#[derive(Debug, Deserialize)]
pub struct CartLineFixture {
    /// Product fixture key
    pub product: String,

    /// Quantity
    pub quantity: u32,

    /// Selected size
    #[serde(default)]
    pub size: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cart_fixture_parses_lines_with_optional_size() -> Result<(), serde_norway::Error> {
        let yaml = r"
lines:
  - product: tshirt
    quantity: 2
    size: M
  - product: sneakers
    quantity: 1
";
        let fixture: CartFixture = serde_norway::from_str(yaml)?;

        assert_eq!(fixture.lines.len(), 2);
        assert!(matches!(
            fixture.lines.first(),
            Some(line) if line.size.as_deref() == Some("M")
        ));
        assert!(matches!(
            fixture.lines.get(1),
            Some(line) if line.size.is_none()
        ));

        Ok(())
    }
}
