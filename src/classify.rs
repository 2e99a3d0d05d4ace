use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Label used when no rule matches
pub const DEFAULT_CATEGORY: &str = "기타";

/// One keyword rule: if `pattern` matches, the item belongs to `label`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub pattern: String,
    pub label: String,
}

impl CategoryRule {
    pub fn new(pattern: &str, label: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            label: label.to_string(),
        }
    }
}

/// Default keyword table, evaluated in order
pub fn default_rules() -> Vec<CategoryRule> {
    vec![
        CategoryRule::new("구매|주문|결제|계약", "구매/주문"),
        CategoryRule::new("배송|인도|수령", "배송/인도"),
        CategoryRule::new("정비|서비스|수리|점검", "정비/서비스"),
        CategoryRule::new("보증|보험|AS", "보증/보험"),
        CategoryRule::new("충전|연료|주유", "충전/연료"),
        CategoryRule::new("앱|기술", "앱/서비스"),
        CategoryRule::new("환불|교환|반품", "환불/교환"),
        CategoryRule::new("기타|문의|상담", DEFAULT_CATEGORY),
    ]
}

/// Assigns a category label to free text using an ordered regex table
#[derive(Debug)]
pub struct CategoryClassifier {
    rules: Vec<(Regex, String)>,
    default_label: String,
}

impl Default for CategoryClassifier {
    fn default() -> Self {
        Self::new(&default_rules(), DEFAULT_CATEGORY).expect("Default rule patterns should be valid")
    }
}

impl CategoryClassifier {
    /// Compile the rule table
    pub fn new(rules: &[CategoryRule], default_label: &str) -> Result<Self, regex::Error> {
        let mut compiled = Vec::with_capacity(rules.len());
        for rule in rules {
            compiled.push((Regex::new(&rule.pattern)?, rule.label.clone()));
        }

        Ok(Self {
            rules: compiled,
            default_label: default_label.to_string(),
        })
    }

    /// Label of the first matching rule, or the default label
    pub fn classify(&self, text: &str) -> &str {
        if text.trim().is_empty() {
            return &self.default_label;
        }

        for (regex, label) in &self.rules {
            if regex.is_match(text) {
                return label;
            }
        }

        &self.default_label
    }
}

static DEFAULT_CLASSIFIER: LazyLock<CategoryClassifier> = LazyLock::new(CategoryClassifier::default);

/// Classify text with the default keyword table
pub fn extract_category_from_text(text: &str) -> String {
    DEFAULT_CLASSIFIER.classify(text).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_label() {
        assert_eq!(extract_category_from_text(""), "기타");
        assert_eq!(extract_category_from_text("   "), "기타");
        assert_eq!(extract_category_from_text("How tall is the tower?"), "기타");
    }

    #[test]
    fn test_first_match_wins() {
        // "결제" (payment) and "보험" (insurance) both appear; the purchase rule comes first
        assert_eq!(
            extract_category_from_text("보험료 결제는 어떻게 하나요?"),
            "구매/주문"
        );
        assert_eq!(extract_category_from_text("점검 예약 방법"), "정비/서비스");
        assert_eq!(extract_category_from_text("전기차 충전 요금"), "충전/연료");
        assert_eq!(extract_category_from_text("앱 로그인 오류"), "앱/서비스");
        assert_eq!(extract_category_from_text("반품 절차"), "환불/교환");
    }

    #[test]
    fn test_custom_table() {
        let rules = vec![
            CategoryRule::new(r"(?i)\bwarranty\b", "Warranty"),
            CategoryRule::new(r"(?i)charg(e|ing)", "Charging"),
        ];
        let classifier = CategoryClassifier::new(&rules, "Other").unwrap();
        assert_eq!(classifier.classify("Is charging covered by the WARRANTY?"), "Warranty");
        assert_eq!(classifier.classify("Home charging setup"), "Charging");
        assert_eq!(classifier.classify("Opening hours"), "Other");
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let rules = vec![CategoryRule::new("(unclosed", "Broken")];
        assert!(CategoryClassifier::new(&rules, "Other").is_err());
    }
}
