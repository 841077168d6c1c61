use crate::types::Language;

/// Target languages offered out of the box, as `(code, name)`.
pub const SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
    ("es", "Spanish"),
    ("fr", "French"),
    ("de", "German"),
    ("zh", "Chinese (Simplified)"),
    ("ja", "Japanese"),
    ("en", "English"),
];

pub fn language_name(code: &str) -> Option<&'static str> {
    SUPPORTED_LANGUAGES
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code))
        .map(|(_, name)| *name)
}

pub fn supported_languages() -> Vec<Language> {
    SUPPORTED_LANGUAGES
        .iter()
        .map(|(code, name)| Language {
            code: code.to_string(),
            name: name.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looks_up_names() {
        assert_eq!(language_name("zh"), Some("Chinese (Simplified)"));
        assert_eq!(language_name("JA"), Some("Japanese"));
        assert_eq!(language_name("xx"), None);
    }

    #[test]
    fn catalog_order_is_stable() {
        let codes: Vec<_> = supported_languages().into_iter().map(|l| l.code).collect();
        assert_eq!(codes, ["es", "fr", "de", "zh", "ja", "en"]);
    }
}
