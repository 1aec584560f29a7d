use std::sync::Arc;

use crate::container::{BuildProgress, Part};
use crate::error::ValidationError;

/// One build-instruction stage: the parts handled together, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    name: Option<String>,
    parts: Vec<Arc<Part>>,
}

impl Step {
    pub fn new(name: Option<String>, parts: Vec<Arc<Part>>) -> Result<Self, ValidationError> {
        if name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(ValidationError::EmptyName { kind: "step" });
        }
        if parts.is_empty() {
            return Err(ValidationError::EmptyStep);
        }
        Ok(Self { name, parts })
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn parts(&self) -> &[Arc<Part>] {
        &self.parts
    }

    /// Parts of this step called `name`.
    pub fn find(&self, name: &str) -> Vec<&Arc<Part>> {
        self.parts.iter().filter(|p| p.name() == name).collect()
    }
}

impl BuildProgress for Step {
    fn is_painted(&self) -> bool {
        self.parts.iter().all(|p| p.is_painted())
    }

    fn is_decaled(&self) -> bool {
        self.parts.iter().all(|p| p.is_decaled())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_needs_a_part() {
        assert_eq!(Step::new(None, vec![]), Err(ValidationError::EmptyStep));
        assert_eq!(
            Step::new(Some(String::new()), vec![]),
            Err(ValidationError::EmptyName { kind: "step" })
        );
    }

    #[test]
    fn find_preserves_order() {
        let a = Arc::new(Part::unfinished("B2", vec![], vec![]).unwrap());
        let b = Arc::new(Part::unfinished("B3", vec![], vec![]).unwrap());
        let c = Arc::new(Part::unfinished("B2", vec![], vec![]).unwrap());
        let step = Step::new(Some("1".into()), vec![a.clone(), b, c.clone()]).unwrap();
        let found = step.find("B2");
        assert_eq!(found.len(), 2);
        assert!(Arc::ptr_eq(found[0], &a));
        assert!(Arc::ptr_eq(found[1], &c));
    }
}
