const LOCALES: &[(&str, &str)] = &[
    ("nl", "nl_NL"),
    ("en", "en_GB"),
    ("fr", "fr_FR"),
    ("es", "es_ES"),
    ("de", "de_DE"),
    ("it", "it_IT"),
    ("sv", "sv_SE"),
    ("tr", "tr_TR"),
    ("cs", "cs_CZ"),
    ("pl", "pl_PL"),
    ("pt", "pt_PT"),
    ("he", "he_IL"),
    ("ru", "ru_RU"),
    ("ar", "ar_AR"),
    ("cn", "zh_CN"),
    ("ro", "ro_RO"),
    ("da", "da_DK"),
    ("fi", "fi_FI"),
    ("no", "no_NO"),
];

/// Gateway locale for a storefront language code, if the gateway knows it.
pub fn locale_for_language(code: &str) -> Option<&'static str> {
    let code = code.trim();
    LOCALES
        .iter()
        .find(|(lang, _)| lang.eq_ignore_ascii_case(code))
        .map(|(_, locale)| *locale)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_languages() {
        assert_eq!(locale_for_language("nl"), Some("nl_NL"));
        assert_eq!(locale_for_language("EN"), Some("en_GB"));
        assert_eq!(locale_for_language("cn"), Some("zh_CN"));
    }

    #[test]
    fn test_unknown_language() {
        assert_eq!(locale_for_language("xx"), None);
        assert_eq!(locale_for_language(""), None);
    }
}
