use std::sync::LazyLock;

use regex::Regex;
use reqwest::Url;

use crate::credentials::Credentials;
use crate::http::FormMethod;

/// Form field the archive expects the username in.
pub const USER_FIELD: &str = "userid";
/// Form field the archive expects the password in.
pub const PASSWORD_FIELD: &str = "password";

static FORM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<form\b([^>]*)>(.*?)(?:</form\s*>|\z)").unwrap());
static FIELD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)<input\b(?P<input>[^>]*)>|<textarea\b(?P<textarea>[^>]*)>(?P<text>.*?)</textarea\s*>|<select\b(?P<select>[^>]*)>(?P<options>.*?)</select\s*>",
    )
    .unwrap()
});
static OPTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<option\b([^>]*)>([^<]*)").unwrap());
static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)([a-z_:][-a-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#).unwrap()
});

/// First form found on an authentication challenge page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginForm {
    pub method: FormMethod,
    pub action: String,
    pub fields: Vec<(String, String)>,
}

impl LoginForm {
    /// Parses the first `<form>` of `html`. Relative actions are resolved
    /// against `page_url`; a missing action posts back to the page itself.
    pub fn parse(html: &str, page_url: &str) -> Option<Self> {
        let captures = FORM_RE.captures(html)?;
        let attrs = attributes(captures.get(1).map_or("", |m| m.as_str()));
        let body = captures.get(2).map_or("", |m| m.as_str());

        let method = match attr(&attrs, "method") {
            Some(value) if value.eq_ignore_ascii_case("post") => FormMethod::Post,
            _ => FormMethod::Get,
        };
        let action = resolve_action(page_url, attr(&attrs, "action").unwrap_or_default());

        let mut fields = Vec::new();
        let mut submit_seen = false;
        for field in FIELD_RE.captures_iter(body) {
            if let Some(tag) = field.name("textarea") {
                let attrs = attributes(tag.as_str());
                if let Some(name) = attr(&attrs, "name") {
                    let text = field.name("text").map_or("", |m| m.as_str());
                    fields.push((name.to_string(), decode_entities(text)));
                }
                continue;
            }
            if let Some(tag) = field.name("select") {
                let attrs = attributes(tag.as_str());
                let options = field.name("options").map_or("", |m| m.as_str());
                if let (Some(name), Some(value)) = (attr(&attrs, "name"), selected_option(options)) {
                    fields.push((name.to_string(), value));
                }
                continue;
            }

            let attrs = attributes(field.name("input").map_or("", |m| m.as_str()));
            let Some(name) = attr(&attrs, "name") else {
                continue;
            };
            let kind = attr(&attrs, "type").unwrap_or("text").to_ascii_lowercase();
            match kind.as_str() {
                "button" | "reset" | "image" | "file" => continue,
                "submit" if submit_seen => continue,
                "submit" => submit_seen = true,
                "checkbox" | "radio" if attr(&attrs, "checked").is_none() => continue,
                _ => {}
            }
            let value = attr(&attrs, "value").unwrap_or_default();
            fields.push((name.to_string(), value.to_string()));
        }

        Some(Self {
            method,
            action,
            fields,
        })
    }

    /// Puts the credentials into the username and password fields, adding
    /// them when the page did not declare them.
    pub fn fill(&mut self, credentials: &Credentials) {
        self.set(USER_FIELD, &credentials.username);
        self.set(PASSWORD_FIELD, &credentials.password);
    }

    fn set(&mut self, name: &str, value: &str) {
        match self.fields.iter_mut().find(|(field, _)| field == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self.fields.push((name.to_string(), value.to_string())),
        }
    }
}

fn attributes(tag: &str) -> Vec<(String, String)> {
    ATTR_RE
        .captures_iter(tag)
        .map(|cap| {
            let name = cap[1].to_ascii_lowercase();
            let value = cap
                .get(2)
                .or_else(|| cap.get(3))
                .or_else(|| cap.get(4))
                .map_or("", |m| m.as_str());
            (name, decode_entities(value))
        })
        .chain(bare_flags(tag))
        .collect()
}

// Valueless attributes such as `checked`.
fn bare_flags(tag: &str) -> Vec<(String, String)> {
    let stripped = ATTR_RE.replace_all(tag, " ");
    stripped
        .split(|ch: char| ch.is_whitespace() || ch == '/')
        .filter(|word| !word.is_empty())
        .map(|word| (word.to_ascii_lowercase(), String::new()))
        .collect()
}

/// Value of the `selected` option, else of the first one. An option without a
/// `value` attribute submits its text.
fn selected_option(options: &str) -> Option<String> {
    let parsed: Vec<(Vec<(String, String)>, String)> = OPTION_RE
        .captures_iter(options)
        .map(|cap| {
            let attrs = attributes(cap.get(1).map_or("", |m| m.as_str()));
            let text = cap.get(2).map_or("", |m| m.as_str()).trim().to_string();
            (attrs, text)
        })
        .collect();
    let chosen = parsed
        .iter()
        .find(|(attrs, _)| attr(attrs, "selected").is_some())
        .or_else(|| parsed.first())?;
    let (attrs, text) = chosen;
    Some(
        attr(attrs, "value")
            .map(str::to_string)
            .unwrap_or_else(|| decode_entities(text)),
    )
}

fn attr<'a>(attrs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

fn decode_entities(value: &str) -> String {
    value
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

fn resolve_action(page_url: &str, action: &str) -> String {
    let action = action.trim();
    match Url::parse(page_url) {
        Ok(base) if action.is_empty() => base.to_string(),
        Ok(base) => base
            .join(action)
            .map(|url| url.to_string())
            .unwrap_or_else(|_| action.to_string()),
        Err(_) if action.is_empty() => page_url.to_string(),
        Err(_) => action.to_string(),
    }
}
