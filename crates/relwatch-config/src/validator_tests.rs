use super::*;
use crate::loader::ConfigLoader;

fn validate(content: &str) -> ValidationResult {
    let config = ConfigLoader::load_str(content).unwrap();
    ConfigValidator::validate(&config).unwrap()
}

const VALID: &str = r#"
    [notify.team]
    type = "slack"
    url_fields = { token = "abc" }

    [service.argus]
    options = { interval = "5m" }

    [service.argus.latest_version]
    type = "github"
    url = "release-argus/Argus"
    url_commands = [{ type = "regex", regex = "v([0-9.]+)" }]

    [service.argus.notify.team]

    [service.argus.webhook.deploy]
    options = { url = "https://ci.example.com/hook", max_tries = 2 }
"#;

#[test]
fn test_validate_valid_config() {
    let result = validate(VALID);
    assert!(result.is_valid(), "{:?}", result.errors);
    assert!(result.warnings.is_empty(), "{:?}", result.warnings);
}

#[test]
fn test_validate_empty_config_warns() {
    let result = validate("");
    assert!(result.is_valid());
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].path, "service");
}

#[test]
fn test_validate_bad_regex() {
    let result = validate(
        r#"
        [service.a.latest_version]
        type = "url"
        url = "https://example.com/releases"
        url_commands = [{ type = "regex", regex = "v([0-9.]+" }]
        "#,
    );
    assert!(!result.is_valid());
    assert!(result.has_error_at("service.a.latest_version.url_commands[0].regex"));
}

#[test]
fn test_validate_bad_require_regex() {
    let result = validate(
        r#"
        [service.a.latest_version]
        type = "github"
        url = "owner/repo"
        require = { regex_version = "[" }
        "#,
    );
    assert!(result.has_error_at("service.a.latest_version.require.regex_version"));
}

#[test]
fn test_validate_bad_max_tries() {
    let result = validate(
        r#"
        [service.a.latest_version]
        type = "github"
        url = "owner/repo"

        [service.a.notify.ops]
        type = "gotify"
        options = { max_tries = "three" }
        "#,
    );
    assert!(result.has_error_at("service.a.notify.ops.options.max_tries"));
}

#[test]
fn test_validate_bad_max_tries_from_main() {
    let result = validate(
        r#"
        [notify.ops]
        type = "gotify"
        options = { max_tries = "-1" }

        [service.a.latest_version]
        type = "github"
        url = "owner/repo"

        [service.a.notify.ops]
        "#,
    );
    assert!(result.has_error_at("service.a.notify.ops.options.max_tries"));
}

#[test]
fn test_validate_bad_delay() {
    let result = validate(
        r#"
        [defaults.notify.slack]
        options = { delay = "soon" }

        [service.a.latest_version]
        type = "github"
        url = "owner/repo"

        [service.a.notify.slack]
        "#,
    );
    assert!(result.has_error_at("service.a.notify.slack.options.delay"));
}

#[test]
fn test_validate_unknown_notify_type() {
    let result = validate(
        r#"
        [service.a.latest_version]
        type = "github"
        url = "owner/repo"

        [service.a.notify.carrier_pigeon]
        "#,
    );
    assert!(result.has_error_at("service.a.notify.carrier_pigeon.type"));
}

#[test]
fn test_validate_notify_type_from_id() {
    let result = validate(
        r#"
        [service.a.latest_version]
        type = "github"
        url = "owner/repo"

        [service.a.notify.discord]
        "#,
    );
    assert!(result.is_valid(), "{:?}", result.errors);
}

#[test]
fn test_validate_unknown_lookup_type() {
    let result = validate(
        r#"
        [service.a.latest_version]
        type = "gitlab"
        url = "owner/repo"
        "#,
    );
    assert!(result.has_error_at("service.a.latest_version.type"));
}

#[test]
fn test_validate_github_url_forms() {
    for url in ["owner/repo", "https://github.com/owner/repo", "https://github.com/owner/repo/"] {
        let content = format!(
            "[service.a.latest_version]\ntype = \"github\"\nurl = \"{url}\"\n"
        );
        let result = validate(&content);
        assert!(result.is_valid(), "{url}: {:?}", result.errors);
    }

    for url in ["", "owner", "owner/repo/extra", "https://gitlab.com/owner/repo"] {
        let content = format!(
            "[service.a.latest_version]\ntype = \"github\"\nurl = \"{url}\"\n"
        );
        let result = validate(&content);
        assert!(result.has_error_at("service.a.latest_version.url"), "{url}");
    }
}

#[test]
fn test_validate_zero_interval() {
    let result = validate(
        r#"
        [service.a]
        options = { interval = "0s" }

        [service.a.latest_version]
        type = "github"
        url = "owner/repo"
        "#,
    );
    assert!(result.has_error_at("service.a.options.interval"));
}

#[test]
fn test_validate_bad_timeout_in_defaults() {
    let result = validate(
        r#"
        [defaults.service.options]
        timeout = "30"

        [service.a.latest_version]
        type = "github"
        url = "owner/repo"
        "#,
    );
    assert!(result.has_error_at("service.a.options.timeout"));
}

#[test]
fn test_validate_webhook_without_url() {
    let result = validate(
        r#"
        [service.a.latest_version]
        type = "github"
        url = "owner/repo"

        [service.a.webhook.deploy]
        "#,
    );
    assert!(result.has_error_at("service.a.webhook.deploy.options.url"));
}

#[test]
fn test_validate_webhook_bad_status_code() {
    let result = validate(
        r#"
        [webhook.deploy]
        options = { url = "https://ci.example.com", desired_status_code = "ok" }

        [service.a.latest_version]
        type = "github"
        url = "owner/repo"

        [service.a.webhook.deploy]
        "#,
    );
    assert!(result.has_error_at("service.a.webhook.deploy.options.desired_status_code"));
}

#[test]
fn test_validate_deployed_version() {
    let result = validate(
        r#"
        [service.a.latest_version]
        type = "github"
        url = "owner/repo"

        [service.a.deployed_version]
        url = "not a url"
        regex = "(["
        "#,
    );
    assert!(result.has_error_at("service.a.deployed_version.url"));
    assert!(result.has_error_at("service.a.deployed_version.regex"));
}

#[test]
fn test_validate_empty_split_text() {
    let result = validate(
        r#"
        [service.a.latest_version]
        type = "url"
        url = "https://example.com"
        url_commands = [{ type = "split", text = "" }]
        "#,
    );
    assert!(result.has_error_at("service.a.latest_version.url_commands[0].text"));
}

#[test]
fn test_validate_zero_sink_capacity() {
    let result = validate("[settings]\nsink_capacity = 0\n");
    assert!(result.has_error_at("settings.sink_capacity"));
}
