//! Target-agnostic description of the aggregated module.

use serde::Serialize;

/// Default import of one validator module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportBinding {
    /// Local name, `validate<ID>`.
    pub binding: String,
    /// Relative module specifier without extension, e.g. `./user.validate`.
    pub specifier: String,
}

/// Public wrapper around one imported validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicFunction {
    /// Exported function name, `validate<Definition>`.
    pub name: String,
    /// Definition the function was generated for.
    pub definition: String,
    /// Import binding the function calls.
    pub validator: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GeneratedModule {
    /// Comment lines at the top of the file.
    pub header: Vec<String>,
    pub imports: Vec<ImportBinding>,
    pub functions: Vec<PublicFunction>,
}

/// `validate<Definition>` with every character that cannot appear in an
/// identifier replaced by `_`.
#[must_use]
pub fn function_name(definition: &str) -> String {
    let sanitized: String = definition
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '$' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("validate{sanitized}")
}
