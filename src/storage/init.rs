//! Storage initialization
//!
//! First-run setup: directories plus the built-in budget templates.

use crate::config::paths::LensPaths;
use crate::error::LensResult;
use crate::models::{BudgetTemplate, Money};

use super::budget::TemplateMap;
use super::file_io::write_json_atomic;

/// Initialize storage for a fresh installation
///
/// Existing files are left untouched.
pub fn initialize_storage(paths: &LensPaths) -> LensResult<()> {
    paths.ensure_directories()?;

    if !paths.templates_file().exists() {
        let templates: TemplateMap = builtin_templates()
            .into_iter()
            .map(|t| (t.name, t.amounts))
            .collect();
        write_json_atomic(paths.templates_file(), &templates)?;
    }

    Ok(())
}

/// The Conservative, Moderate and Aggressive presets
pub fn builtin_templates() -> Vec<BudgetTemplate> {
    let presets: [(&str, [i64; 7]); 3] = [
        ("Conservative", [3_000, 3_000, 5_000, 500, 8_000, 14_500, 66_000]),
        ("Moderate", [5_000, 4_000, 8_000, 800, 10_000, 18_500, 66_000]),
        ("Aggressive", [8_000, 5_000, 12_000, 1_000, 12_000, 26_500, 66_000]),
    ];
    let categories = [
        "Food",
        "Petrol",
        "Shopping",
        "Subscriptions",
        "Health",
        "Investments",
        "Loans",
    ];

    presets
        .iter()
        .map(|(name, amounts)| {
            categories
                .iter()
                .zip(amounts)
                .fold(BudgetTemplate::new(*name), |template, (category, units)| {
                    template.with(*category, Money::from_units(*units))
                })
        })
        .collect()
}

/// Check if storage needs initialization
pub fn needs_initialization(paths: &LensPaths) -> bool {
    !paths.is_initialized()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::file_io::read_json;
    use tempfile::TempDir;

    #[test]
    fn test_initialize_seeds_templates() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LensPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert!(needs_initialization(&paths));
        initialize_storage(&paths).unwrap();

        let templates: TemplateMap = read_json(paths.templates_file()).unwrap();
        let names: Vec<_> = templates.keys().cloned().collect();
        assert_eq!(names, vec!["Aggressive", "Conservative", "Moderate"]);
        assert_eq!(
            templates["Conservative"]["Food"],
            Money::from_units(3_000)
        );
    }

    #[test]
    fn test_initialize_keeps_existing_templates() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LensPaths::with_base_dir(temp_dir.path().to_path_buf());
        paths.ensure_directories().unwrap();
        write_json_atomic(paths.templates_file(), &TemplateMap::new()).unwrap();

        initialize_storage(&paths).unwrap();

        let templates: TemplateMap = read_json(paths.templates_file()).unwrap();
        assert!(templates.is_empty());
    }

    #[test]
    fn test_builtin_templates_are_valid() {
        for template in builtin_templates() {
            assert!(template.validate().is_ok());
            assert_eq!(template.amounts.len(), 7);
        }
    }
}
