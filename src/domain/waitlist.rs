use crate::domain::language::Language;
use crate::domain::subscriber_email::SubscriberEmail;
use crate::domain::subscriber_name::SubscriberName;

/// Product a waitlist signup is interested in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Product {
    Perch,
    Cache,
    #[default]
    Both,
}

impl Product {
    pub fn parse_or_default(value: Option<&str>) -> Product {
        match value.map(str::trim) {
            Some("perch") => Product::Perch,
            Some("cache") => Product::Cache,
            _ => Product::Both,
        }
    }
}

impl AsRef<str> for Product {
    fn as_ref(&self) -> &str {
        match self {
            Product::Perch => "perch",
            Product::Cache => "cache",
            Product::Both => "both",
        }
    }
}

pub struct NewWaitlistEntry {
    pub email: SubscriberEmail,
    pub name: Option<SubscriberName>,
    pub product: Product,
    pub language: Language,
    pub ip_address: String,
}
