use serde_json::Value;

use super::source::{ConfigEntry, ConfigSource};
use super::ConfigError;

/// Environment variable overrides, e.g. `NETTPACK__PUBLIC_PATH=/assets`.
#[derive(Debug, Clone)]
pub struct EnvSource {
    prefix: String,
    separator: String,
}

impl EnvSource {
    pub fn new(prefix: impl Into<String>, separator: impl Into<String>) -> Self {
        let separator = separator.into();
        assert!(!separator.is_empty(), "separator must not be empty");
        Self {
            prefix: prefix.into(),
            separator,
        }
    }

    fn entries_from<I>(&self, vars: I) -> Vec<ConfigEntry>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let prefix_with_sep = format!("{}{}", self.prefix, self.separator);
        let mut entries = Vec::new();

        for (key, value) in vars {
            if let Some(path_str) = key.strip_prefix(&prefix_with_sep) {
                if path_str.is_empty() {
                    continue;
                }

                let path: Vec<String> = path_str.split(&self.separator).map(camel_case).collect();

                tracing::debug!(variable = %key, "applying environment override");
                entries.push(ConfigEntry::at_path(path, coerce_value(&value)));
            }
        }

        entries
    }
}

impl ConfigSource for EnvSource {
    fn entries(&self) -> Result<Vec<ConfigEntry>, ConfigError> {
        Ok(self.entries_from(std::env::vars()))
    }
}

/// `PUBLIC_PATH` -> `publicPath`, `WEBPACK_HMR` -> `webpackHmr`.
fn camel_case(segment: &str) -> String {
    let mut result = String::with_capacity(segment.len());
    for (index, word) in segment.split('_').filter(|w| !w.is_empty()).enumerate() {
        let lower = word.to_lowercase();
        if index == 0 {
            result.push_str(&lower);
            continue;
        }
        let mut chars = lower.chars();
        if let Some(first) = chars.next() {
            result.extend(first.to_uppercase());
            result.push_str(chars.as_str());
        }
    }
    result
}

fn coerce_value(s: &str) -> Value {
    if s.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if s.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }

    if looks_like_integer(s) {
        if let Ok(i) = s.parse::<i64>() {
            return Value::from(i);
        }
    }

    if s.contains('.') {
        if let Ok(f) = s.parse::<f64>() {
            if let Some(number) = serde_json::Number::from_f64(f) {
                return Value::Number(number);
            }
        }
    }

    Value::String(s.to_string())
}

fn looks_like_integer(s: &str) -> bool {
    let s = s.strip_prefix('-').unwrap_or(s);
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("PORT"), "port");
        assert_eq!(camel_case("PUBLIC_PATH"), "publicPath");
        assert_eq!(camel_case("COMPOSER_LOCK_FILE"), "composerLockFile");
    }

    #[test]
    fn test_prefixed_variables_become_entries() {
        let source = EnvSource::new("NETTPACK", "__");
        let entries = source.entries_from(vars(&[
            ("NETTPACK__PORT", "3000"),
            ("NETTPACK__DEV__PUBLIC_PATH", "/assets"),
            ("NETTPACK__", "ignored"),
            ("OTHER__PORT", "1"),
        ]));

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].path, ["port"]);
        assert_eq!(entries[0].value, json!(3000));
        assert_eq!(entries[1].path, ["dev", "publicPath"]);
        assert_eq!(entries[1].value, json!("/assets"));
    }

    #[test]
    fn test_coerce_value() {
        assert_eq!(coerce_value("TRUE"), json!(true));
        assert_eq!(coerce_value("-12"), json!(-12));
        assert_eq!(coerce_value("1.5"), json!(1.5));
        assert_eq!(coerce_value("./vendor"), json!("./vendor"));
        assert_eq!(coerce_value("http://localhost"), json!("http://localhost"));
    }
}
