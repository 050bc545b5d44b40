use actix_web::HttpRequest;

const DUTCH_SPEAKING_COUNTRIES: [&str; 3] = ["NL", "BE", "SR"];

pub const LANGUAGE_COOKIE: &str = "lang";

/// The two languages the site and its newsletters are written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Nl,
}

impl Language {
    /// Strict two-letter lookup; anything but `en` or `nl` is `None`.
    pub fn parse(code: &str) -> Option<Language> {
        match code.trim().to_lowercase().as_str() {
            "en" => Some(Language::En),
            "nl" => Some(Language::Nl),
            _ => None,
        }
    }

    /// Lenient lookup used for stored values: Dutch only when it says so.
    pub fn parse_or_default(code: &str) -> Language {
        Self::parse(code).unwrap_or_default()
    }

    /// Resolves the language of an incoming request.
    ///
    /// Priority: `?lang=` query parameter, `lang` cookie, `Accept-Language`,
    /// geo-IP country headers set by the edge proxy, English.
    pub fn from_request(request: &HttpRequest) -> Language {
        let from_query = request.query_string().split('&').find_map(|pair| {
            pair.strip_prefix("lang=").and_then(Language::parse)
        });
        if let Some(language) = from_query {
            return language;
        }

        if let Some(language) = request
            .cookie(LANGUAGE_COOKIE)
            .and_then(|cookie| Language::parse(cookie.value()))
        {
            return language;
        }

        let accept_language = header_value(request, "accept-language");
        for part in accept_language.split(',') {
            let code = part.split(';').next().unwrap_or("").trim().to_lowercase();
            if code.starts_with("nl") {
                return Language::Nl;
            }
            if code.starts_with("en") {
                return Language::En;
            }
        }

        let mut country = header_value(request, "cf-ipcountry");
        if country.is_empty() {
            country = header_value(request, "fly-client-country");
        }
        if DUTCH_SPEAKING_COUNTRIES.contains(&country.to_uppercase().as_str()) {
            return Language::Nl;
        }

        Language::default()
    }
}

fn header_value(request: &HttpRequest, name: &str) -> String {
    request
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
        .to_string()
}

impl AsRef<str> for Language {
    fn as_ref(&self) -> &str {
        match self {
            Language::En => "en",
            Language::Nl => "nl",
        }
    }
}
