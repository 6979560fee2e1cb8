//! Compiler version extraction from pragma directives

use regex::Regex;
use std::sync::OnceLock;

/// Error reported when a candidate carries no pragma directive
pub const MISSING_PRAGMA: &str = "No Solidity version specified in the pragma statement.";

fn pragma_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"pragma\s+solidity\s+([^;]+);").expect("static pragma pattern")
    })
}

fn version_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+)\.(\d+)(?:\.(\d+))?").expect("static version pattern"))
}

/// Extract the version requirement from the first `pragma solidity` directive
pub fn pragma_requirement(source: &str) -> Option<String> {
    pragma_regex()
        .captures(source)
        .map(|caps| caps[1].trim().to_string())
}

/// Reduce a pragma requirement to a concrete `x.y.z` version
///
/// Range operators are dropped and the first version literal wins; a missing
/// patch component defaults to zero. `^0.8.19` resolves to `0.8.19`,
/// `>=0.7.0 <0.9.0` to `0.7.0`, `^0.8` to `0.8.0`.
pub fn normalize_requirement(requirement: &str) -> Option<String> {
    let caps = version_regex().captures(requirement)?;
    let major = &caps[1];
    let minor = &caps[2];
    let patch = caps.get(3).map(|m| m.as_str()).unwrap_or("0");
    Some(format!("{}.{}.{}", major, minor, patch))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pragma_extraction() {
        let source = "// SPDX-License-Identifier: MIT\npragma solidity ^0.8.19;\ncontract A {}";
        assert_eq!(pragma_requirement(source).as_deref(), Some("^0.8.19"));
    }

    #[test]
    fn test_pragma_missing() {
        assert_eq!(pragma_requirement("contract A {}"), None);
    }

    #[test]
    fn test_pragma_with_range() {
        let source = "pragma solidity >=0.7.0 <0.9.0;";
        assert_eq!(pragma_requirement(source).as_deref(), Some(">=0.7.0 <0.9.0"));
    }

    #[test]
    fn test_normalize_caret() {
        assert_eq!(normalize_requirement("^0.8.19").as_deref(), Some("0.8.19"));
    }

    #[test]
    fn test_normalize_range_takes_lower_bound() {
        assert_eq!(
            normalize_requirement(">=0.7.0 <0.9.0").as_deref(),
            Some("0.7.0")
        );
    }

    #[test]
    fn test_normalize_missing_patch() {
        assert_eq!(normalize_requirement("^0.8").as_deref(), Some("0.8.0"));
    }

    #[test]
    fn test_normalize_garbage() {
        assert_eq!(normalize_requirement("latest"), None);
    }
}
