//! Digest assembly and Markdown rendering.
//!
//! A digest is built fresh for every broadcast or on-demand request, never
//! cached. Topics that yield nothing are dropped from the message; a cycle
//! where every topic comes back empty produces no digest at all.

use serde::{Deserialize, Serialize};

use crate::providers::ContentProvider;

/// Per-topic cap on headlines carried into a digest.
pub const MAX_ITEMS_PER_TOPIC: usize = 3;

/// One headline ready for rendering: cleaned title, its translation, and the
/// article link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub title: String,
    pub translation: String,
    pub link: String,
}

/// A configured subject of interest: the query sent to the news source and
/// the heading shown above its section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    pub query: String,
    pub label: String,
}

impl Topic {
    pub fn new(query: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicSection {
    pub label: String,
    pub items: Vec<ContentItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    pub sections: Vec<TopicSection>,
}

impl Digest {
    /// Keep only sections that actually have items. `None` means there is
    /// nothing worth sending this cycle.
    pub fn assemble(sections: Vec<TopicSection>) -> Option<Self> {
        let sections: Vec<TopicSection> =
            sections.into_iter().filter(|s| !s.items.is_empty()).collect();
        if sections.is_empty() {
            None
        } else {
            Some(Self { sections })
        }
    }

    pub fn item_count(&self) -> usize {
        self.sections.iter().map(|s| s.items.len()).sum()
    }
}

/// Renders a digest into the Telegram Markdown layout. The pieces that vary
/// by deployment (header line, translation label) are fields so the caller
/// can interpolate schedule or language without touching the layout.
#[derive(Debug, Clone)]
pub struct DigestFormatter {
    header: String,
    translation_label: String,
    footer: String,
}

impl Default for DigestFormatter {
    fn default() -> Self {
        Self {
            header: "📰 *DAILY NEWS UPDATES*".to_string(),
            translation_label: "Hindi".to_string(),
            footer: "Subscribe for more! /news".to_string(),
        }
    }
}

impl DigestFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }

    pub fn with_translation_label(mut self, label: impl Into<String>) -> Self {
        self.translation_label = label.into();
        self
    }

    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = footer.into();
        self
    }

    pub fn render(&self, digest: &Digest) -> String {
        let mut out = String::new();
        out.push_str(&self.header);
        out.push_str("\n\n");
        for section in &digest.sections {
            out.push_str(&format!("*{}*\n", section.label));
            for item in &section.items {
                out.push_str(&format!("🔹 *English:* {}\n", item.title));
                out.push_str(&format!(
                    "🔸 *{}:* {}\n",
                    self.translation_label, item.translation
                ));
                out.push_str(&format!("🔗 [Read More]({})\n\n", item.link));
            }
        }
        out.push_str(&self.footer);
        out
    }
}

/// Fetch every topic through `provider` and assemble the result. Topic order
/// in the digest follows the configured order, whatever each fetch returned.
pub async fn collect(provider: &dyn ContentProvider, topics: &[Topic]) -> Option<Digest> {
    let mut sections = Vec::with_capacity(topics.len());
    for topic in topics {
        let items = provider.fetch(&topic.query).await;
        sections.push(TopicSection {
            label: topic.label.clone(),
            items,
        });
    }
    Digest::assemble(sections)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str, translation: &str, link: &str) -> ContentItem {
        ContentItem {
            title: title.to_string(),
            translation: translation.to_string(),
            link: link.to_string(),
        }
    }

    #[test]
    fn assemble_drops_empty_sections() {
        let digest = Digest::assemble(vec![
            TopicSection {
                label: "A".into(),
                items: vec![item("t", "h", "l")],
            },
            TopicSection {
                label: "B".into(),
                items: vec![],
            },
        ])
        .expect("one non-empty section");
        assert_eq!(digest.sections.len(), 1);
        assert_eq!(digest.sections[0].label, "A");
    }

    #[test]
    fn assemble_with_nothing_yields_none() {
        assert!(Digest::assemble(vec![]).is_none());
        let all_empty = vec![TopicSection {
            label: "A".into(),
            items: vec![],
        }];
        assert!(Digest::assemble(all_empty).is_none());
    }

    #[test]
    fn render_follows_the_broadcast_layout() {
        let digest = Digest {
            sections: vec![TopicSection {
                label: "📍 CHHATTISGARH".into(),
                items: vec![item(
                    "Raipur metro plan approved",
                    "रायपुर मेट्रो योजना स्वीकृत",
                    "https://example.com/metro",
                )],
            }],
        };
        let text = DigestFormatter::new()
            .with_header("📰 *DAILY NEWS UPDATES (8:00 AM)*")
            .render(&digest);
        assert_eq!(
            text,
            "📰 *DAILY NEWS UPDATES (8:00 AM)*\n\n\
             *📍 CHHATTISGARH*\n\
             🔹 *English:* Raipur metro plan approved\n\
             🔸 *Hindi:* रायपुर मेट्रो योजना स्वीकृत\n\
             🔗 [Read More](https://example.com/metro)\n\n\
             Subscribe for more! /news"
        );
    }
}
