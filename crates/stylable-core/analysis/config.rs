//! Host configuration for an analysis run

use super::diagnostics::Severity;
use crate::utils::{CoreError, Result};

/// Configuration for processing behavior
///
/// The default reports every diagnostic with no limit and checks plain
/// properties against the built-in CSS property list.
///
/// # Example
///
/// ```rust
/// use stylable_core::analysis::{ProcessConfig, Severity};
///
/// let config = ProcessConfig::default()
///     .with_min_severity(Severity::Warning)
///     .with_max_diagnostics(50)
///     .with_extra_property("composes");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessConfig {
    /// Minimum severity level to report
    pub min_severity: Severity,
    /// Maximum number of diagnostics to report (0 = unlimited)
    pub max_diagnostics: usize,
    /// Report `unknown rule` for unrecognized plain properties
    pub check_properties: bool,
    /// Property names accepted in addition to the built-in list
    pub extra_properties: Vec<String>,
    /// Pseudo-element names accepted in addition to the native list
    pub extra_pseudo_elements: Vec<String>,
    /// Rule ids that never report
    pub disabled_rules: Vec<&'static str>,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            min_severity: Severity::Warning,
            max_diagnostics: 0, // Unlimited
            check_properties: true,
            extra_properties: Vec::new(),
            extra_pseudo_elements: Vec::new(),
            disabled_rules: Vec::new(),
        }
    }
}

impl ProcessConfig {
    /// Set minimum severity level
    #[must_use]
    pub fn with_min_severity(mut self, severity: Severity) -> Self {
        self.min_severity = severity;
        self
    }

    /// Set maximum number of diagnostics
    #[must_use]
    pub fn with_max_diagnostics(mut self, max: usize) -> Self {
        self.max_diagnostics = max;
        self
    }

    /// Enable or disable plain property checking
    #[must_use]
    pub fn with_property_checks(mut self, enabled: bool) -> Self {
        self.check_properties = enabled;
        self
    }

    /// Accept an additional property name
    #[must_use]
    pub fn with_extra_property(mut self, name: impl Into<String>) -> Self {
        self.extra_properties.push(name.into());
        self
    }

    /// Accept an additional pseudo-element name
    #[must_use]
    pub fn with_extra_pseudo_element(mut self, name: impl Into<String>) -> Self {
        self.extra_pseudo_elements.push(name.into());
        self
    }

    /// Silence a rule by id
    #[must_use]
    pub fn with_disabled_rule(mut self, rule: &'static str) -> Self {
        self.disabled_rules.push(rule);
        self
    }

    /// Check if a rule is enabled
    #[must_use]
    pub fn is_rule_enabled(&self, rule: &str) -> bool {
        !self.disabled_rules.iter().any(|disabled| *disabled == rule)
    }

    /// Check if severity should be reported
    #[must_use]
    pub fn should_report_severity(&self, severity: Severity) -> bool {
        severity >= self.min_severity
    }

    /// Check configured names
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Config`] when an extra property or pseudo-element
    /// name is empty or contains whitespace.
    pub fn validate(&self) -> Result<()> {
        let extras = self
            .extra_properties
            .iter()
            .map(|name| ("property", name))
            .chain(
                self.extra_pseudo_elements
                    .iter()
                    .map(|name| ("pseudo-element", name)),
            );
        for (what, name) in extras {
            if name.is_empty() || name.chars().any(char::is_whitespace) {
                return Err(CoreError::config(format!(
                    "extra {what} name \"{name}\" must be a non-empty identifier"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::diagnostics::rules;

    #[test]
    fn default_reports_everything() {
        let config = ProcessConfig::default();
        assert!(config.should_report_severity(Severity::Warning));
        assert!(config.is_rule_enabled(rules::UNKNOWN_STATE));
        assert!(config.check_properties);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder_sets_fields() {
        let config = ProcessConfig::default()
            .with_min_severity(Severity::Error)
            .with_property_checks(false)
            .with_extra_pseudo_element("thumb")
            .with_disabled_rule(rules::CONFLICTING_EXTENDS);
        assert!(!config.should_report_severity(Severity::Warning));
        assert!(!config.check_properties);
        assert_eq!(config.extra_pseudo_elements, vec!["thumb".to_string()]);
        assert!(!config.is_rule_enabled(rules::CONFLICTING_EXTENDS));
    }

    #[test]
    fn validate_rejects_bad_names() {
        let err = ProcessConfig::default()
            .with_extra_property("bad name")
            .validate()
            .unwrap_err();
        assert_eq!(err.category(), crate::utils::ErrorCategory::Configuration);
        assert!(ProcessConfig::default()
            .with_extra_pseudo_element("")
            .validate()
            .is_err());
    }
}
