//! Compatibility checking
//!
//! Decides whether a token produced at some version can be rendered by a
//! client that declares a compatibility floor, or whether the client has to
//! show a fallback instead.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::token::TokenTree;
use crate::version::SemanticVersion;

/// `true` iff the token's version is at least its own `minSupportedVersion`
/// and is compatible with the client floor. Tokens whose versions cannot be
/// read are never compatible.
pub fn is_compatible<T: TokenTree>(token: &T, floor: &SemanticVersion) -> bool {
    let (Ok(version), Ok(min_supported)) = (token.version(), token.min_supported_version()) else {
        return false;
    };
    version >= min_supported && version.is_compatible_with(floor)
}

/// [`is_compatible`] for clients that still declare an integer floor `n`,
/// read as `n.0.0`
pub fn is_compatible_legacy<T: TokenTree>(token: &T, floor: u64) -> bool {
    is_compatible(token, &SemanticVersion::from(floor))
}

/// Result of checking a whole tree against one floor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityReport {
    pub floor: SemanticVersion,
    /// Number of nodes visited
    pub checked: usize,
    /// Ids of nodes the client must replace with a fallback, in pre-order
    pub fallback_ids: Vec<String>,
}

impl CompatibilityReport {
    pub fn is_compatible(&self) -> bool {
        self.fallback_ids.is_empty()
    }

    pub fn summary(&self) -> String {
        if self.is_compatible() {
            format!("all {} tokens render at floor {}", self.checked, self.floor)
        } else {
            format!(
                "{} of {} tokens need a fallback at floor {}",
                self.fallback_ids.len(),
                self.checked,
                self.floor
            )
        }
    }
}

/// Compatibility checker bound to one client floor
#[derive(Debug, Clone, Copy)]
pub struct CompatibilityChecker {
    floor: SemanticVersion,
}

impl CompatibilityChecker {
    pub fn new(floor: SemanticVersion) -> Self {
        Self { floor }
    }

    pub fn floor(&self) -> SemanticVersion {
        self.floor
    }

    pub fn is_compatible<T: TokenTree>(&self, token: &T) -> bool {
        is_compatible(token, &self.floor)
    }

    /// Check every node of `tree`, including lazy-list placeholders
    pub fn report<T: TokenTree>(&self, tree: &T) -> CompatibilityReport {
        let mut report = CompatibilityReport {
            floor: self.floor,
            checked: 0,
            fallback_ids: Vec::new(),
        };
        self.visit(tree, &mut report);
        report
    }

    fn visit<T: TokenTree>(&self, node: &T, report: &mut CompatibilityReport) {
        report.checked += 1;
        if !self.is_compatible(node) {
            debug!(token = node.token_id(), floor = %self.floor, "token needs fallback");
            report.fallback_ids.push(node.token_id().to_string());
        }

        for child in node.children().unwrap_or_default() {
            self.visit(&child, report);
        }
        if let Some(placeholder) = node.field("placeholder").filter(|v| v.is_object()) {
            if let Ok(placeholder) = T::from_value(placeholder) {
                self.visit(&placeholder, report);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenDocument;
    use serde_json::json;

    fn text(id: &str, version: &str, min_supported: &str) -> TokenDocument {
        TokenDocument::from_value(json!({
            "type": "TextToken",
            "id": id,
            "version": version,
            "minSupportedVersion": min_supported,
            "text": "hi",
            "style": { "fontSize": 12 }
        }))
        .unwrap()
    }

    #[test]
    fn test_patch_is_ignored() {
        let token = text("t", "1.2.9", "1.0.0");
        assert!(is_compatible(&token, &SemanticVersion::new(1, 2, 0)));
        assert!(!is_compatible(&token, &SemanticVersion::new(1, 1, 99)));
    }

    #[test]
    fn test_major_mismatch() {
        let token = text("t", "2.0.0", "0.0.0");
        assert!(!is_compatible(&token, &SemanticVersion::new(1, 9, 0)));
        assert!(!is_compatible(&token, &SemanticVersion::new(3, 0, 0)));
    }

    #[test]
    fn test_min_supported_above_version() {
        let token = text("t", "1.0.0", "1.1.0");
        assert!(!is_compatible(&token, &SemanticVersion::new(1, 5, 0)));
    }

    #[test]
    fn test_legacy_integer_floor() {
        let token = text("t", "1.0.3", "0.0.0");
        assert!(is_compatible_legacy(&token, 1));
        assert!(!is_compatible_legacy(&token, 2));
    }

    #[test]
    fn test_report_lists_fallbacks_in_pre_order() {
        let tree = TokenDocument::from_value(json!({
            "type": "LazyColumnToken",
            "id": "list",
            "version": "1.0.0",
            "placeholder": { "type": "SpacerToken", "id": "ph", "version": "1.3.0" },
            "children": [
                { "type": "SpacerToken", "id": "a", "version": "1.0.0" },
                { "type": "SpacerToken", "id": "b", "version": "1.2.0" }
            ]
        }))
        .unwrap();

        let report = CompatibilityChecker::new(SemanticVersion::new(1, 1, 0)).report(&tree);
        assert_eq!(report.checked, 4);
        assert_eq!(report.fallback_ids, vec!["b", "ph"]);
        assert!(!report.is_compatible());
        assert_eq!(report.summary(), "2 of 4 tokens need a fallback at floor 1.1.0");
    }
}
