use std::sync::OnceLock;

use regex::Regex;

use crate::config_store::ConfigSnapshot;

static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();

fn placeholder_regex() -> &'static Regex {
    PLACEHOLDER.get_or_init(|| {
        #[allow(clippy::unwrap_used)]
        Regex::new(r"\{\{\s*\.([A-Za-z0-9_.\-]+)\s*\}\}").unwrap()
    })
}

/// Failure to render a message template.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    /// A placeholder names a variable that the snapshot does not define
    #[error("no variable named '{name}' in the current configuration")]
    UnknownVariable {
        /// The missing variable
        name: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Literal(String),
    Variable(String),
}

/// A message with `{{.name}}` placeholders.
///
/// Parsing never fails: text that is not a well-formed placeholder is kept
/// literally. Rendering is a pure function of the template and a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplate {
    source: String,
    parts: Vec<Part>,
}

impl MessageTemplate {
    /// Splits `source` into literal text and placeholders.
    pub fn parse(source: &str) -> Self {
        let mut parts = Vec::new();
        let mut last = 0;

        for captures in placeholder_regex().captures_iter(source) {
            let (whole, [name]) = captures.extract();
            let start = captures.get(0).map(|m| m.start()).unwrap_or(last);

            if start > last {
                parts.push(Part::Literal(source[last..start].to_string()));
            }
            parts.push(Part::Variable(name.to_string()));
            last = start + whole.len();
        }

        if last < source.len() {
            parts.push(Part::Literal(source[last..].to_string()));
        }

        Self {
            source: source.to_string(),
            parts,
        }
    }

    /// The original template text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Names of all referenced variables, in order of appearance.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().filter_map(|part| match part {
            Part::Variable(name) => Some(name.as_str()),
            Part::Literal(_) => None,
        })
    }

    /// Substitutes every placeholder with its value from `vars`.
    ///
    /// # Errors
    /// Returns `RenderError::UnknownVariable` for the first placeholder that
    /// `vars` does not define.
    pub fn render(&self, vars: &ConfigSnapshot) -> Result<String, RenderError> {
        let mut out = String::with_capacity(self.source.len());

        for part in &self.parts {
            match part {
                Part::Literal(text) => out.push_str(text),
                Part::Variable(name) => {
                    let value = vars.get(name).ok_or_else(|| RenderError::UnknownVariable {
                        name: name.clone(),
                    })?;
                    out.push_str(value);
                }
            }
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> ConfigSnapshot {
        pairs.iter().copied().collect()
    }

    #[test]
    fn renders_named_variable() {
        let template = MessageTemplate::parse("hello {{.name}}");
        assert_eq!(
            template.render(&vars(&[("name", "world")])),
            Ok("hello world".to_string())
        );
    }

    #[test]
    fn unknown_variable_is_an_error() {
        let template = MessageTemplate::parse("hello {{.missing}}");
        assert_eq!(
            template.render(&vars(&[("name", "world")])),
            Err(RenderError::UnknownVariable {
                name: "missing".to_string()
            })
        );
    }

    #[test]
    fn allows_whitespace_and_repeats() {
        let template = MessageTemplate::parse("{{ .a }}-{{.b}}-{{.a}}");
        assert_eq!(
            template.render(&vars(&[("a", "1"), ("b", "2")])),
            Ok("1-2-1".to_string())
        );
        assert_eq!(template.placeholders().collect::<Vec<_>>(), vec!["a", "b", "a"]);
    }

    #[test]
    fn plain_text_renders_verbatim() {
        let template = MessageTemplate::parse("no placeholders {{here");
        assert_eq!(template.render(&vars(&[])), Ok("no placeholders {{here".to_string()));
        assert_eq!(template.placeholders().count(), 0);
    }

    #[test]
    fn empty_template_renders_empty() {
        assert_eq!(MessageTemplate::parse("").render(&vars(&[])), Ok(String::new()));
    }
}
