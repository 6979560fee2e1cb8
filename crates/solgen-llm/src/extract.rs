//! Source extraction from model replies
//!
//! Models frequently wrap code in markdown fences despite being told not to.
//! The loop only ever wants the bare source, so the first fenced block wins
//! when one is present.

/// Extract candidate source from a model reply, stripping markdown fences
pub fn extract_source(reply: &str) -> String {
    let trimmed = reply.trim();

    let Some(open) = trimmed.find("```") else {
        return trimmed.to_string();
    };

    // Skip the fence line itself, including any language tag
    let after_fence = &trimmed[open + 3..];
    let body_start = after_fence.find('\n').map(|i| i + 1).unwrap_or(0);
    let body = &after_fence[body_start..];

    match body.find("```") {
        Some(close) => body[..close].trim().to_string(),
        None => body.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "pragma solidity ^0.8.0;\n\ncontract Counter {}";

    #[test]
    fn test_plain_reply_passes_through() {
        assert_eq!(extract_source(SOURCE), SOURCE);
    }

    #[test]
    fn test_fenced_reply() {
        let reply = format!("```\n{}\n```", SOURCE);
        assert_eq!(extract_source(&reply), SOURCE);
    }

    #[test]
    fn test_fenced_reply_with_language_tag() {
        let reply = format!("```solidity\n{}\n```", SOURCE);
        assert_eq!(extract_source(&reply), SOURCE);
    }

    #[test]
    fn test_fence_with_surrounding_prose() {
        let reply = format!(
            "Here is the corrected contract:\n\n```solidity\n{}\n```\n\nLet me know!",
            SOURCE
        );
        assert_eq!(extract_source(&reply), SOURCE);
    }

    #[test]
    fn test_unterminated_fence() {
        let reply = format!("```solidity\n{}", SOURCE);
        assert_eq!(extract_source(&reply), SOURCE);
    }

    #[test]
    fn test_empty_reply() {
        assert_eq!(extract_source("   \n"), "");
    }
}
