//! Core types for Skymirror

use serde::{Deserialize, Serialize};

/// One unit of content observed at the external source during a fetch.
///
/// Items are constructed fresh on every fetch and discarded after the tick
/// that processed them; only the derived identifier survives in the seen-log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Body text, used both for publishing and identifier derivation
    pub text: String,
    /// Ordered media references attached to the item, possibly empty
    pub media: Vec<String>,
}

impl Item {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            media: Vec::new(),
        }
    }

    pub fn with_media(text: impl Into<String>, media: Vec<String>) -> Self {
        Self {
            text: text.into(),
            media,
        }
    }

    /// Render the text that gets handed to the publisher.
    ///
    /// Media references are appended below the body. An empty body still
    /// renders (and publishes) as-is; the mirror applies no content filter.
    pub fn render(&self) -> String {
        if self.media.is_empty() {
            return self.text.clone();
        }
        let mut rendered = self.text.clone();
        for reference in &self.media {
            if !rendered.is_empty() {
                rendered.push('\n');
            }
            rendered.push_str(reference);
        }
        rendered
    }
}

/// History row for one successfully mirrored publish
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MirrorRecord {
    pub id: Option<i64>,
    /// Content digest that keyed the dedup decision
    pub identifier: String,
    /// Rendered text as published
    pub content: String,
    /// Source reference the item was observed at
    pub source: String,
    /// Publishing platform name
    pub platform: String,
    /// Platform-specific post id returned by the publisher
    pub platform_post_id: Option<String>,
    pub published_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_text_only() {
        let item = Item::new("hello world");
        assert_eq!(item.render(), "hello world");
    }

    #[test]
    fn test_render_with_media() {
        let item = Item::with_media(
            "look at this",
            vec![
                "https://cdn.example/a.jpg".to_string(),
                "https://cdn.example/b.jpg".to_string(),
            ],
        );
        assert_eq!(
            item.render(),
            "look at this\nhttps://cdn.example/a.jpg\nhttps://cdn.example/b.jpg"
        );
    }

    #[test]
    fn test_render_empty_text_still_renders() {
        let item = Item::new("");
        assert_eq!(item.render(), "");

        let with_media = Item::with_media("", vec!["https://cdn.example/a.jpg".to_string()]);
        assert_eq!(with_media.render(), "https://cdn.example/a.jpg");
    }
}
