/// Interest category of a subscriber, and the target filter of a newsletter.
///
/// A subscriber interested in `All` receives every newsletter; a newsletter targeted
/// at `All` goes to every confirmed subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Audience {
    #[default]
    All,
    Perch,
    Cache,
    Announcements,
}

impl Audience {
    pub fn parse(value: &str) -> Result<Audience, String> {
        match value {
            "all" => Ok(Audience::All),
            "perch" => Ok(Audience::Perch),
            "cache" => Ok(Audience::Cache),
            "announcements" => Ok(Audience::Announcements),
            _ => Err(format!("{} is not a valid audience", value)),
        }
    }

    /// Form input is never rejected for its audience: unknown or missing values widen to `All`.
    pub fn parse_or_default(value: Option<&str>) -> Audience {
        value
            .and_then(|value| Self::parse(value.trim()).ok())
            .unwrap_or_default()
    }
}

impl AsRef<str> for Audience {
    fn as_ref(&self) -> &str {
        match self {
            Audience::All => "all",
            Audience::Perch => "perch",
            Audience::Cache => "cache",
            Audience::Announcements => "announcements",
        }
    }
}
