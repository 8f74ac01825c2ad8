//! Appliance: identity of the oven behind the attribute store.

use serde::{Deserialize, Serialize};

use crate::error::{SixthSenseError, ValidationError};
use crate::id::Said;

/// Identity and display metadata of one connected appliance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplianceInfo {
    pub said: Said,
    pub name: String,
    pub model: Option<String>,
}

impl ApplianceInfo {
    /// Create a builder for constructing an [`ApplianceInfo`].
    #[must_use]
    pub fn builder() -> ApplianceInfoBuilder {
        ApplianceInfoBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`SixthSenseError::Validation`] when `name` is blank.
    pub fn validate(&self) -> Result<(), SixthSenseError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        Ok(())
    }
}

/// Step-by-step builder for [`ApplianceInfo`].
#[derive(Debug, Default)]
pub struct ApplianceInfoBuilder {
    said: Option<String>,
    name: Option<String>,
    model: Option<String>,
}

impl ApplianceInfoBuilder {
    #[must_use]
    pub fn said(mut self, said: impl Into<String>) -> Self {
        self.said = Some(said.into());
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Consume the builder, validate, and return an [`ApplianceInfo`].
    ///
    /// A missing name falls back to the said.
    ///
    /// # Errors
    ///
    /// Returns [`SixthSenseError::Validation`] if `said` is missing or blank.
    pub fn build(self) -> Result<ApplianceInfo, SixthSenseError> {
        let said = Said::new(self.said.unwrap_or_default())?;
        let name = self.name.unwrap_or_else(|| said.to_string());
        let info = ApplianceInfo {
            said,
            name,
            model: self.model,
        };
        info.validate()?;
        Ok(info)
    }
}
