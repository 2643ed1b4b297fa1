//! Placeholder substitution.
//!
//! `{{ name }}` is replaced with a field of the [`ServiceInfo`]; whitespace
//! inside the braces is optional. Unknown names become an empty string.
//!
//! | Placeholder | Value |
//! |---|---|
//! | `service_id`, `id` | service id |
//! | `version`, `latest_version` | latest version |
//! | `deployed_version` | deployed version |
//! | `service_url` | lookup URL |
//! | `web_url` | the service's web URL, itself rendered |

use std::sync::OnceLock;

use regex::{Captures, Regex};

use relwatch_status::ServiceInfo;

fn placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{\s*([A-Za-z0-9_]+)\s*\}\}").unwrap())
}

/// Render `template` for `info`.
pub fn render(template: &str, info: &ServiceInfo) -> String {
    substitute(template, info, true)
}

fn substitute(template: &str, info: &ServiceInfo, expand_web_url: bool) -> String {
    if !template.contains("{{") {
        return template.to_string();
    }
    placeholder()
        .replace_all(template, |caps: &Captures<'_>| match &caps[1] {
            "service_id" | "id" => info.id.clone(),
            "version" | "latest_version" => info.latest_version.clone(),
            "deployed_version" => info.deployed_version.clone(),
            "service_url" => info.url.clone(),
            "web_url" if expand_web_url => substitute(&info.web_url, info, false),
            _ => String::new(),
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> ServiceInfo {
        ServiceInfo {
            id: "argus".to_string(),
            url: "https://github.com/release-argus/Argus".to_string(),
            web_url: "https://github.com/release-argus/Argus/releases/tag/{{ version }}".to_string(),
            latest_version: "1.2.3".to_string(),
            deployed_version: "1.2.0".to_string(),
        }
    }

    #[test]
    fn test_known_placeholders() {
        assert_eq!(
            render("{{ service_id }} - {{ version }} released", &info()),
            "argus - 1.2.3 released"
        );
        assert_eq!(render("{{id}}@{{latest_version}}", &info()), "argus@1.2.3");
        assert_eq!(render("from {{ deployed_version }}", &info()), "from 1.2.0");
        assert_eq!(
            render("{{ service_url }}", &info()),
            "https://github.com/release-argus/Argus"
        );
    }

    #[test]
    fn test_web_url_rendered() {
        assert_eq!(
            render("<{{ web_url }}>", &info()),
            "<https://github.com/release-argus/Argus/releases/tag/1.2.3>"
        );
    }

    #[test]
    fn test_web_url_does_not_recurse() {
        let mut info = info();
        info.web_url = "x{{ web_url }}y".to_string();
        assert_eq!(render("{{ web_url }}", &info), "xy");
    }

    #[test]
    fn test_unknown_placeholder_is_empty() {
        assert_eq!(render("a{{ nope }}b", &info()), "ab");
        assert_eq!(render("{{ Version }}", &info()), "");
    }

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(render("no placeholders {here}", &info()), "no placeholders {here}");
        assert_eq!(render("", &info()), "");
    }
}
