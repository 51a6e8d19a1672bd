use super::{DetectorError, GrammarDetector, SpellingDetector};

/// Stands in for a backend that is switched off or failed to start.
///
/// Never reports anything.
#[derive(Debug, Clone, Default)]
pub struct DisabledDetector {
    reason: Option<String>,
}

impl DisabledDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Disabled because a backend could not be initialised
    pub fn because(reason: impl Into<String>) -> Self {
        Self {
            reason: Some(reason.into()),
        }
    }

    /// Why the backend is off; `None` when it was switched off on purpose
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }
}

impl SpellingDetector for DisabledDetector {
    fn name(&self) -> &str {
        "disabled"
    }

    fn check(&self, _text: &str) -> Result<Vec<String>, DetectorError> {
        Ok(Vec::new())
    }
}

impl GrammarDetector for DisabledDetector {
    fn name(&self) -> &str {
        "disabled"
    }

    fn check(&self, _text: &str) -> Result<Vec<String>, DetectorError> {
        Ok(Vec::new())
    }
}
