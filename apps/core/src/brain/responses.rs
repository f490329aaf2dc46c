//! Canned response handlers, one per intent.
//!
//! Handlers are pure: they build a fresh payload on every call and never
//! touch the conversation log or storage.

use serde::{Deserialize, Serialize};

use super::intent::Intent;

/// A labelled value such as a price range or a timeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fact {
    pub label: String,
    pub value: String,
}

impl Fact {
    fn new(label: &str, value: &str) -> Self {
        Self {
            label: label.to_string(),
            value: value.to_string(),
        }
    }
}

/// One block of a structured reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Section {
    Paragraph(String),
    List { heading: String, items: Vec<String> },
    Facts(Vec<Fact>),
}

impl Section {
    fn paragraph(text: &str) -> Self {
        Section::Paragraph(text.to_string())
    }

    fn list(heading: &str, items: &[&str]) -> Self {
        Section::List {
            heading: heading.to_string(),
            items: items.iter().map(|item| item.to_string()).collect(),
        }
    }

    fn facts(facts: &[(&str, &str)]) -> Self {
        Section::Facts(
            facts
                .iter()
                .map(|(label, value)| Fact::new(label, value))
                .collect(),
        )
    }
}

/// Structured reply made of headings, bullet lists and key-value facts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichContent {
    pub sections: Vec<Section>,
}

/// The bot's reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "body", rename_all = "snake_case")]
pub enum ResponsePayload {
    PlainText(String),
    RichContent(RichContent),
}

impl ResponsePayload {
    pub fn text(text: impl Into<String>) -> Self {
        ResponsePayload::PlainText(text.into())
    }

    pub fn is_rich(&self) -> bool {
        matches!(self, ResponsePayload::RichContent(_))
    }

    /// Plain text body, if this is a text payload
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponsePayload::PlainText(text) => Some(text),
            ResponsePayload::RichContent(_) => None,
        }
    }
}

pub type ResponseHandler = fn(&str) -> ResponsePayload;

/// Returns the handler associated with `intent`
pub fn handler_for(intent: Intent) -> ResponseHandler {
    match intent {
        Intent::WebsiteInquiry => website_inquiry,
        Intent::MobileAppInquiry => mobile_app_inquiry,
        Intent::PricingInquiry => pricing_inquiry,
        Intent::ConsultationBooking => consultation_booking,
        Intent::TechnologyInquiry => technology_inquiry,
        Intent::Greeting => greeting,
        Intent::Thanks => thanks,
        Intent::General => general_inquiry,
    }
}

/// Builds the reply for `intent`. `raw_input` is passed through to the
/// handler but the built-in replies do not depend on it.
pub fn respond(intent: Intent, raw_input: &str) -> ResponsePayload {
    handler_for(intent)(raw_input)
}

fn website_inquiry(_input: &str) -> ResponsePayload {
    ResponsePayload::RichContent(RichContent {
        sections: vec![
            Section::paragraph(
                "Great! I'd love to help you with your website project. Let me ask a few questions to provide you with the best estimate:",
            ),
            Section::list(
                "What type of website do you need?",
                &[
                    "Business/Corporate Website",
                    "E-commerce/Online Store",
                    "Portfolio/Personal Website",
                    "Blog/Content Website",
                    "Web Application",
                ],
            ),
            Section::facts(&[
                ("Estimated Timeline", "2-8 weeks"),
                ("Starting Price", "₹25,000 - ₹2,00,000"),
            ]),
            Section::paragraph("Would you like me to create a detailed quote for you?"),
        ],
    })
}

fn mobile_app_inquiry(_input: &str) -> ResponsePayload {
    ResponsePayload::RichContent(RichContent {
        sections: vec![
            Section::paragraph(
                "Excellent choice! Mobile apps are a great way to reach your customers. Here's what I need to know:",
            ),
            Section::list(
                "Platform",
                &[
                    "iOS (iPhone/iPad)",
                    "Android",
                    "Cross-platform (React Native/Flutter)",
                ],
            ),
            Section::list(
                "App Type",
                &[
                    "Business App",
                    "E-commerce App",
                    "Social/Community App",
                    "Utility/Tool App",
                    "Entertainment App",
                ],
            ),
            Section::facts(&[
                ("Estimated Timeline", "3-12 weeks"),
                ("Starting Price", "₹50,000 - ₹5,00,000"),
            ]),
        ],
    })
}

fn consultation_booking(_input: &str) -> ResponsePayload {
    ResponsePayload::RichContent(RichContent {
        sections: vec![
            Section::paragraph(
                "Perfect! Let's schedule a consultation to discuss your project in detail.",
            ),
            Section::list(
                "Available Time Slots",
                &[
                    "Monday - Friday: 10:00 AM - 7:00 PM",
                    "Saturday: 10:00 AM - 5:00 PM",
                ],
            ),
            Section::list(
                "Consultation Options",
                &[
                    "Video Call (Zoom/Google Meet)",
                    "Phone Call",
                    "WhatsApp Video Call",
                ],
            ),
            Section::paragraph(
                "Please provide your preferred date and time, and I'll confirm the booking. You can also contact us directly:",
            ),
            Section::facts(&[
                ("📞 Phone", "+91 98765 43210"),
                ("📱 WhatsApp", "+91 98765 43210"),
            ]),
        ],
    })
}

const PRICING_TEXT: &str = "Here's our transparent pricing structure:

💰 Website Development:
• Basic Website: ₹25,000 - ₹50,000
• E-commerce: ₹75,000 - ₹2,00,000
• Custom Web App: ₹1,00,000 - ₹5,00,000

📱 Mobile App Development:
• Simple App: ₹50,000 - ₹1,00,000
• Complex App: ₹1,50,000 - ₹5,00,000
• Enterprise App: ₹3,00,000+

🎨 UI/UX Design:
• Website Design: ₹15,000 - ₹50,000
• App Design: ₹25,000 - ₹75,000

💼 Consultation:
• 1-hour Session: ₹2,500
• Project Planning: ₹5,000

All prices are in INR and include:
✅ Responsive Design
✅ SEO Optimization
✅ 3 Months Support
✅ Training & Documentation

Would you like a custom quote for your specific project?";

fn pricing_inquiry(_input: &str) -> ResponsePayload {
    ResponsePayload::text(PRICING_TEXT)
}

const TECHNOLOGY_TEXT: &str = "Here are the cutting-edge technologies we specialize in:

🛠️ Frontend Technologies:
• React.js, Angular, Vue.js
• Next.js, Nuxt.js
• TypeScript, JavaScript

📱 Mobile Development:
• React Native (Cross-platform)
• Flutter (Cross-platform)
• Native iOS (Swift)
• Native Android (Kotlin)

⚙️ Backend Technologies:
• Node.js, Python, PHP
• Django, Laravel, Express.js
• PostgreSQL, MongoDB, MySQL

☁️ Cloud & DevOps:
• AWS, Google Cloud, Azure
• Docker, Kubernetes
• CI/CD Pipelines

🤖 AI & Machine Learning:
• TensorFlow, PyTorch
• OpenAI API Integration
• Custom AI Solutions

Which technology interests you most for your project?";

fn technology_inquiry(_input: &str) -> ResponsePayload {
    ResponsePayload::text(TECHNOLOGY_TEXT)
}

const GREETING_TEXT: &str = "Hello! 👋 Welcome to CoderBrothers! I'm your AI assistant, ready to help you bring your digital ideas to life.

I can help you with:
• 🎯 Project planning and estimation
• 💰 Pricing and quotes
• 📅 Consultation booking
• 🛠️ Technology recommendations
• 📱 Website and app development

What would you like to discuss today?";

fn greeting(_input: &str) -> ResponsePayload {
    ResponsePayload::text(GREETING_TEXT)
}

const THANKS_TEXT: &str = "You're very welcome! 😊

I'm here to help make your digital journey smooth and successful. If you have any more questions or need assistance with your project, feel free to ask anytime.

Don't forget to check out our portfolio to see some amazing projects we've delivered! 🚀";

fn thanks(_input: &str) -> ResponsePayload {
    ResponsePayload::text(THANKS_TEXT)
}

const GENERAL_TEXT: &str = "Thank you for your message! I'm here to help you with all things related to web and mobile development.

Could you please provide more details about what you're looking for? For example:
• What type of project do you have in mind?
• Are you looking for a website, mobile app, or something else?
• Do you have a specific timeline or budget in mind?

This will help me provide you with the most relevant information and accurate estimates.";

fn general_inquiry(_input: &str) -> ResponsePayload {
    ResponsePayload::text(GENERAL_TEXT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pricing_lists_all_categories() {
        let payload = respond(Intent::PricingInquiry, "how much?");
        let text = payload.as_text().expect("pricing is plain text");

        for category in [
            "Website Development",
            "Mobile App Development",
            "UI/UX Design",
            "Consultation",
        ] {
            assert!(text.contains(category), "missing '{}'", category);
        }
    }

    #[test]
    fn test_payload_shapes() {
        let rich = [
            Intent::WebsiteInquiry,
            Intent::MobileAppInquiry,
            Intent::ConsultationBooking,
        ];

        for intent in Intent::ALL {
            let payload = respond(intent, "");
            assert_eq!(payload.is_rich(), rich.contains(&intent), "{}", intent);
        }
    }

    #[test]
    fn test_website_facts() {
        let ResponsePayload::RichContent(content) = respond(Intent::WebsiteInquiry, "") else {
            panic!("website reply should be rich content");
        };

        let facts: Vec<&Fact> = content
            .sections
            .iter()
            .filter_map(|section| match section {
                Section::Facts(facts) => Some(facts),
                _ => None,
            })
            .flatten()
            .collect();

        assert!(facts
            .iter()
            .any(|f| f.label == "Estimated Timeline" && f.value == "2-8 weeks"));
        assert!(facts.iter().any(|f| f.label == "Starting Price"));
    }

    #[test]
    fn test_input_does_not_change_reply() {
        assert_eq!(
            respond(Intent::Thanks, "thanks!"),
            respond(Intent::Thanks, "thank you so much")
        );
    }
}
