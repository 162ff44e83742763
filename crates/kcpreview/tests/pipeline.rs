//! End-to-end runs over a complete theme tree in a temp directory.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use kcpreview::Cli;
use serde_json::{json, Value};

struct Workspace {
    _temp: tempfile::TempDir,
    root: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path().to_path_buf();
        let ws = Self { _temp: temp, root };

        ws.write(
            "upstream/base/login/theme.properties",
            "parent=\nkcBodyClass=login-pf\n",
        );
        ws.write(
            "upstream/base/messages/messages_en.properties",
            "# upstream\nloginTitle=Sign in to {0}\n",
        );
        ws.write(
            "upstream/base/login/template.ftl",
            "<html><body class=\"{{ properties.kcBodyClass }}\">{% block content %}{% endblock %}</body></html>",
        );
        ws.write(
            "upstream/base/login/login.ftl",
            "{% extends \"template.ftl\" %}{% block content %}{{ msg('loginTitle', realm.displayName) }}{% endblock %}",
        );
        ws.write(
            "upstream/base/login/info.ftl",
            "{% extends \"template.ftl\" %}{% block content %}<p data-kc-hint=\"x\">{{ message.summary }}</p>{% endblock %}",
        );

        ws.write("upstream/v2/login/theme.properties", "parent=base\nkcBodyClass=v2-body\n");
        ws.write(
            "upstream/v2/messages/messages_en.properties",
            "loginTitle=Welcome to {0}\n",
        );

        ws.write(
            "presets/modern-gradient/login/messages/messages_en.properties",
            "loginTitle=Gradient {0}\n",
        );

        ws.write(
            "mocks/context.json",
            &json!({
                "common": { "realm": { "displayName": "Demo" }, "url": { "loginAction": "#" } },
                "pages": {
                    "login.ftl": {},
                    "login@otp": { "realm": { "displayName": "OTP" } },
                    "info": { "message": { "summary": "Done" } }
                }
            })
            .to_string(),
        );
        ws
    }

    fn path(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    fn write(&self, rel: &str, content: &str) {
        let path = self.path(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn cli(&self, extra: &[&str]) -> Cli {
        let p = |rel: &str| self.path(rel).display().to_string();
        let mut args = vec![
            "kcpreview".to_string(),
            "--input".into(),
            p("upstream"),
            "--overrides".into(),
            p("overrides"),
            "--presets".into(),
            p("presets"),
            "--output".into(),
            p("out"),
            "--context-mocks".into(),
            p("mocks/context.json"),
            "--tag".into(),
            "26.1".into(),
        ];
        for arg in extra {
            args.push(match arg.strip_prefix('@') {
                Some(rel) => p(rel),
                None => arg.to_string(),
            });
        }
        Cli::try_parse_from(args).unwrap()
    }

    fn run(&self, extra: &[&str]) -> Value {
        let written = kcpreview::run(&self.cli(extra)).unwrap();
        assert_eq!(written, self.path("out/pages.json"));
        let text = fs::read_to_string(&written).unwrap();
        assert!(text.ends_with('\n'));
        serde_json::from_str(&text).unwrap()
    }
}

fn page<'a>(artifact: &'a Value, variant: &str, page: &str) -> &'a Value {
    &artifact["variants"][variant][page]
}

#[test]
fn test_builtin_variants_end_to_end() {
    let ws = Workspace::new();
    let artifact = ws.run(&[]);

    assert_eq!(artifact["keycloakTag"], "26.1");
    assert!(artifact["generatedAt"].as_str().unwrap().contains('T'));
    assert!(artifact.get("scenarios").is_none());

    let variants: Vec<&String> = artifact["variants"].as_object().unwrap().keys().collect();
    assert_eq!(variants, vec!["base", "v2", "modern-gradient", "horizontal-card"]);

    let pages: Vec<&String> = artifact["variants"]["base"].as_object().unwrap().keys().collect();
    assert_eq!(pages, vec!["info.html", "login.html"]);

    assert_eq!(
        page(&artifact, "base", "login.html")["default"],
        "<html><body class=\"login-pf\" data-page-id=\"login-login\">Sign in to Demo</body></html>"
    );
    assert_eq!(
        page(&artifact, "base", "login.html")["otp"],
        "<html><body class=\"login-pf\" data-page-id=\"login-login\">Sign in to OTP</body></html>"
    );
    assert_eq!(
        page(&artifact, "base", "info.html")["default"],
        "<html><body class=\"login-pf\" data-page-id=\"login-info\"><p>Done</p></body></html>"
    );
}

#[test]
fn test_layer_precedence_across_variants() {
    let ws = Workspace::new();
    let artifact = ws.run(&[]);

    // v2 has no templates of its own and inherits them from base
    assert_eq!(
        page(&artifact, "v2", "login.html")["default"],
        "<html><body class=\"v2-body\" data-page-id=\"login-login\">Welcome to Demo</body></html>"
    );
    assert_eq!(
        page(&artifact, "modern-gradient", "login.html")["default"],
        "<html><body class=\"login-pf\" data-page-id=\"login-login\">Gradient Demo</body></html>"
    );
    assert_eq!(
        page(&artifact, "horizontal-card", "login.html"),
        page(&artifact, "base", "login.html")
    );
}

#[test]
fn test_custom_mocks_override_builtin() {
    let ws = Workspace::new();
    ws.write(
        "mocks/custom.json",
        &json!({ "common": { "realm": { "displayName": "Custom" } } }).to_string(),
    );
    let artifact = ws.run(&["--custom-mocks", "@mocks/custom.json"]);

    assert_eq!(
        page(&artifact, "base", "login.html")["default"],
        "<html><body class=\"login-pf\" data-page-id=\"login-login\">Sign in to Custom</body></html>"
    );
    // the scenario fragment still sits on top of the merged common layer
    assert_eq!(
        page(&artifact, "base", "login.html")["otp"],
        "<html><body class=\"login-pf\" data-page-id=\"login-login\">Sign in to OTP</body></html>"
    );
}

#[test]
fn test_absent_custom_mocks_are_ignored() {
    let ws = Workspace::new();
    let artifact = ws.run(&["--custom-mocks", "@mocks/none.json"]);
    assert_eq!(
        page(&artifact, "base", "login.html")["default"],
        "<html><body class=\"login-pf\" data-page-id=\"login-login\">Sign in to Demo</body></html>"
    );
}

#[test]
fn test_variants_file_and_user_themes() {
    let ws = Workspace::new();
    ws.write(
        "variants.yaml",
        "- id: plain\n  base_theme: base\n  stamp_page_id: false\n- id: ghost\n  base_theme: missing\n",
    );
    ws.write("themes/acme/login/theme.properties", "parent=keycloak.v2\n");
    ws.write(
        "themes/acme/login/login.ftl",
        "<body>{{ msg('loginTitle', realm.displayName) }} by acme</body>",
    );
    ws.write("themes/plain/login/theme.properties", "parent=keycloak\n");

    let artifact = ws.run(&["--variants", "@variants.yaml", "--user-theme", "@themes"]);

    let variants: Vec<&String> = artifact["variants"].as_object().unwrap().keys().collect();
    assert_eq!(variants, vec!["plain", "acme"]);
    assert_eq!(
        page(&artifact, "plain", "login.html")["default"],
        "<html><body class=\"login-pf\">Sign in to Demo</body></html>"
    );
    assert_eq!(
        page(&artifact, "acme", "login.html")["default"],
        "<body data-page-id=\"login-login\">Welcome to Demo by acme</body>"
    );
}

#[test]
fn test_external_scenarios_with_fallback() {
    let ws = Workspace::new();
    ws.write("variants.yaml", "- id: base\n  base_theme: base\n");
    ws.write(
        "stories/login.stories.json",
        &json!({ "page": "login.ftl", "stories": [ { "id": "otp" }, { "id": "gone" } ] })
            .to_string(),
    );
    ws.write(
        "scenario-html/base/login/otp.html",
        "<p>pre-rendered</p><script src=\"story.js\"></script>",
    );

    let artifact = ws.run(&[
        "--variants",
        "@variants.yaml",
        "--scenario-stories",
        "@stories",
        "--scenario-html",
        "@scenario-html",
    ]);

    let default = page(&artifact, "base", "login.html")["default"].clone();
    assert!(page(&artifact, "base", "login.html").get("otp").is_none());
    assert_eq!(
        artifact["scenarios"]["base"]["login.html"],
        json!({ "otp": "<p>pre-rendered</p>", "gone": default })
    );
}

#[test]
fn test_malformed_manifest_is_fatal() {
    let ws = Workspace::new();
    ws.write(
        "stories/login.stories.json",
        &json!({ "page": "login", "stories": [ {} ] }).to_string(),
    );
    let result = kcpreview::run(&ws.cli(&["--scenario-stories", "@stories"]));
    let message = format!("{:#}", result.unwrap_err());
    assert!(message.contains("is missing \"id\""), "{}", message);
    assert!(!ws.path("out/pages.json").exists());
}

#[test]
fn test_missing_input_root_is_fatal() {
    let ws = Workspace::new();
    fs::remove_dir_all(ws.path("upstream")).unwrap();
    let err = kcpreview::run(&ws.cli(&[])).unwrap_err();
    assert!(err.to_string().starts_with("Input root not found"));
    assert!(!Path::new(&ws.path("out/pages.json")).exists());
}
