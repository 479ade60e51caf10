//! Internationalization (i18n) support
//!
//! UI strings for the rendered pages. English and Brazilian Portuguese
//! ship embedded in the binary; a site can override or extend them with
//! YAML files in its languages directory.

use anyhow::Result;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Embedded default locales
const EMBEDDED: &[(&str, &str)] = &[
    ("en", include_str!("locales/en.yml")),
    ("pt-br", include_str!("locales/pt-br.yml")),
];

/// Internationalization handler
pub struct I18n {
    /// Current language
    language: String,
    /// Language data: lang -> key -> translation
    translations: HashMap<String, HashMap<String, serde_yaml::Value>>,
}

impl I18n {
    /// Create a new i18n handler with the embedded locales loaded
    pub fn new(language: &str) -> Self {
        let mut translations = HashMap::new();
        for (lang, raw) in EMBEDDED {
            // embedded files are compiled in; a parse failure is a bug
            let data: HashMap<String, serde_yaml::Value> =
                serde_yaml::from_str(raw).unwrap_or_default();
            translations.insert((*lang).to_string(), data);
        }
        Self {
            language: language.to_lowercase(),
            translations,
        }
    }

    /// Load site-provided language files, overriding embedded keys
    pub fn load_languages<P: AsRef<Path>>(&mut self, dir: P) -> Result<()> {
        let dir = dir.as_ref();
        if !dir.exists() {
            return Ok(());
        }

        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();

            if !path.is_file() {
                continue;
            }
            let ext = path.extension().and_then(|e| e.to_str());
            if !matches!(ext, Some("yml") | Some("yaml")) {
                continue;
            }
            let lang = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("en")
                .to_lowercase();

            let content = fs::read_to_string(&path)?;
            match serde_yaml::from_str::<HashMap<String, serde_yaml::Value>>(&content) {
                Ok(data) => {
                    self.translations.entry(lang).or_default().extend(data);
                    tracing::debug!("Loaded language file: {:?}", path);
                }
                Err(e) => {
                    tracing::warn!("Failed to parse language file {:?}: {}", path, e);
                }
            }
        }

        Ok(())
    }

    /// Get a translation by key
    pub fn get(&self, key: &str) -> String {
        if let Some(data) = self.translations.get(&self.language) {
            if let Some(value) = data.get(key) {
                return yaml_value_to_string(value);
            }
        }

        // Fallback to English
        if self.language != "en" {
            if let Some(data) = self.translations.get("en") {
                if let Some(value) = data.get(key) {
                    return yaml_value_to_string(value);
                }
            }
        }

        // Return key as fallback
        key.to_string()
    }

    /// Get a list-valued translation (e.g. month abbreviations)
    pub fn get_list(&self, key: &str) -> Vec<String> {
        for lang in [self.language.as_str(), "en"] {
            if let Some(serde_yaml::Value::Sequence(seq)) =
                self.translations.get(lang).and_then(|data| data.get(key))
            {
                return seq.iter().map(yaml_value_to_string).collect();
            }
        }
        Vec::new()
    }

    /// Get a translation with `%d` replaced by a count
    pub fn get_count(&self, key: &str, count: usize) -> String {
        self.get(key).replace("%d", &count.to_string())
    }
}

/// Convert a YAML value to a string
fn yaml_value_to_string(value: &serde_yaml::Value) -> String {
    match value {
        serde_yaml::Value::String(s) => s.clone(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Null => String::new(),
        _ => format!("{:?}", value),
    }
}

impl Default for I18n {
    fn default() -> Self {
        Self::new("en")
    }
}
