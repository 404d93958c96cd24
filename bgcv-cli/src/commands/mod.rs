//! Command implementations for the bgcv CLI

pub mod convert;
pub mod regions;
pub mod render;

use anyhow::{Context, Result};
use std::path::Path;

use crate::error::CliError;

/// Read a UTF-8 input file, reporting a missing path as [`CliError::FileNotFound`].
pub(crate) fn read_input(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(CliError::file_not_found(path.to_path_buf()).into());
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// `--region 3` and `--region region_3` name the same region.
pub(crate) fn region_id(region: &str) -> String {
    if region.chars().all(|c| c.is_ascii_digit()) {
        format!("region_{}", region)
    } else {
        region.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_id() {
        assert_eq!(region_id("3"), "region_3");
        assert_eq!(region_id("region_12"), "region_12");
    }

    #[test]
    fn test_missing_input_is_file_not_found() {
        let err = read_input(Path::new("/nonexistent/record.json")).unwrap_err();
        assert!(matches!(err.downcast_ref::<CliError>(), Some(CliError::FileNotFound { .. })));
    }
}
