//! Intent classification using ordered keyword rules.
//!
//! Each rule pairs an intent with a set of lowercase tokens. Rules are
//! evaluated in priority order and the first rule with a token contained
//! in the lowercased input wins. Nothing matched means `Intent::General`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Detected intent type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Website projects (website, web, site)
    WebsiteInquiry,
    /// Mobile app projects (mobile, app, android, ios)
    MobileAppInquiry,
    /// Prices and quotes (price, cost, quote, estimate)
    PricingInquiry,
    /// Booking a consultation (consultation, meeting, book, schedule)
    ConsultationBooking,
    /// Technology stack questions (technology, tech, stack, framework)
    TechnologyInquiry,
    /// Greeting (hello, hi, hey)
    Greeting,
    /// Thanks (thank, thanks)
    Thanks,
    /// Default when no rule matches
    General,
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl Intent {
    pub const ALL: [Intent; 8] = [
        Intent::WebsiteInquiry,
        Intent::MobileAppInquiry,
        Intent::PricingInquiry,
        Intent::ConsultationBooking,
        Intent::TechnologyInquiry,
        Intent::Greeting,
        Intent::Thanks,
        Intent::General,
    ];

    /// Returns the stable label used in logs and serialized data
    pub fn label(&self) -> &'static str {
        match self {
            Intent::WebsiteInquiry => "website_inquiry",
            Intent::MobileAppInquiry => "mobile_app_inquiry",
            Intent::PricingInquiry => "pricing_inquiry",
            Intent::ConsultationBooking => "consultation_booking",
            Intent::TechnologyInquiry => "technology_inquiry",
            Intent::Greeting => "greeting",
            Intent::Thanks => "thanks",
            Intent::General => "general",
        }
    }

    /// Parses a label produced by [`Intent::label`].
    pub fn from_label(label: &str) -> Option<Intent> {
        Intent::ALL.into_iter().find(|intent| intent.label() == label)
    }
}

/// An intent together with the tokens that select it
#[derive(Debug, Clone, Copy)]
pub struct KeywordRule {
    pub intent: Intent,
    pub keywords: &'static [&'static str],
}

impl KeywordRule {
    /// First keyword of this rule contained in `normalized`, if any.
    fn first_hit(&self, normalized: &str) -> Option<&'static str> {
        self.keywords
            .iter()
            .copied()
            .find(|keyword| normalized.contains(keyword))
    }
}

/// Priority order matters: keyword sets overlap ("website app"), so the
/// earlier rule takes the input.
pub static DEFAULT_RULES: &[KeywordRule] = &[
    KeywordRule {
        intent: Intent::WebsiteInquiry,
        keywords: &["website", "web", "site"],
    },
    KeywordRule {
        intent: Intent::MobileAppInquiry,
        keywords: &["mobile", "app", "android", "ios"],
    },
    KeywordRule {
        intent: Intent::PricingInquiry,
        keywords: &["price", "cost", "quote", "estimate"],
    },
    KeywordRule {
        intent: Intent::ConsultationBooking,
        keywords: &["consultation", "meeting", "book", "schedule"],
    },
    KeywordRule {
        intent: Intent::TechnologyInquiry,
        keywords: &["technology", "tech", "stack", "framework"],
    },
    KeywordRule {
        intent: Intent::Greeting,
        keywords: &["hello", "hi", "hey"],
    },
    KeywordRule {
        intent: Intent::Thanks,
        keywords: &["thank", "thanks"],
    },
];

/// Result of intent classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    /// Detected intent
    pub intent: Intent,
    /// Keyword that decided the match; `None` for the General fallback
    pub matched_keyword: Option<&'static str>,
}

/// Intent classifier over a static, ordered rule table
#[derive(Debug, Clone, Copy)]
pub struct IntentClassifier {
    rules: &'static [KeywordRule],
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl IntentClassifier {
    /// Create a classifier with the built-in rule table
    pub fn new() -> Self {
        Self::with_rules(DEFAULT_RULES)
    }

    pub fn with_rules(rules: &'static [KeywordRule]) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &'static [KeywordRule] {
        self.rules
    }

    /// Classify the intent of a text
    pub fn classify(&self, text: &str) -> Intent {
        self.classify_detailed(text).intent
    }

    /// Classify and report which keyword decided the result
    pub fn classify_detailed(&self, text: &str) -> Classification {
        let normalized = text.to_lowercase();

        self.rules
            .iter()
            .find_map(|rule| {
                rule.first_hit(&normalized).map(|keyword| Classification {
                    intent: rule.intent,
                    matched_keyword: Some(keyword),
                })
            })
            .unwrap_or(Classification {
                intent: Intent::General,
                matched_keyword: None,
            })
    }
}
