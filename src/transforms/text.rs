//! In-process text stages.

use super::{Result, Transform};
use crate::placeholder::{substitute, PlaceholderMap};

/// Returns its input unchanged.
#[derive(Debug, Clone)]
pub struct Passthrough {
    name: String,
}

impl Passthrough {
    pub fn new(name: &str) -> Self {
        Self { name: name.to_string() }
    }
}

impl Transform for Passthrough {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, input: &str) -> Result<String> {
        Ok(input.to_string())
    }
}

/// Applies a placeholder map in a single pass.
#[derive(Debug, Clone)]
pub struct Substitute {
    map: PlaceholderMap,
}

impl Substitute {
    pub fn new(map: PlaceholderMap) -> Self {
        Self { map }
    }
}

impl Transform for Substitute {
    fn name(&self) -> &str {
        "substitute"
    }

    fn apply(&self, input: &str) -> Result<String> {
        Ok(substitute(input, &self.map))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitute_stage() {
        let stage = Substitute::new(PlaceholderMap::new().with("##DATE##", "today"));
        assert_eq!(stage.apply("Built ##DATE##").unwrap(), "Built today");
    }
}
