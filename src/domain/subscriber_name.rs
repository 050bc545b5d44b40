use unicode_segmentation::UnicodeSegmentation;

const MAX_CHAR_LENGHT: usize = 256;

/// Optional display name given on a signup form.
///
/// Names are informational only: they are never rendered into emails and never reject a
/// signup. Input is trimmed and cut to 256 graphemes; a blank name is no name.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SubscriberName(String);

impl SubscriberName {
    pub fn parse(name: Option<String>) -> Option<SubscriberName> {
        let name = name?;
        let name = name.trim();

        if name.is_empty() {
            return None;
        }

        Some(Self(name.graphemes(true).take(MAX_CHAR_LENGHT).collect()))
    }
}

impl AsRef<str> for SubscriberName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
