//! Compiler options.

use serde::Deserialize;

/// Options controlling how pipeline documents are compiled.
///
/// ```rust,ignore
/// let options: CompilerOptions = serde_json::from_value(json!({
///     "controllerSuffix": "Handler",
/// }))?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompilerOptions {
    /// Suffix stripped from a controller's type name when deriving its
    /// filter's `contextName`.
    pub controller_suffix: String,
    /// Whether missing `contextName` entries are derived at all.
    pub derive_context_names: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            controller_suffix: "Controller".to_owned(),
            derive_context_names: true,
        }
    }
}
