use std::fmt;

/// Inline CSS declarations parsed from a `style` attribute.
///
/// Declarations keep their source order so that rewriting a style attribute
/// only moves the properties that actually changed. Property names are
/// lowercased; values are kept verbatim (trimmed).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Style {
    decls: Vec<(String, String)>,
}

impl Style {
    /// Parses `a: b; c: d`. Malformed declarations (no colon, empty name)
    /// are dropped.
    pub fn parse(source: &str) -> Self {
        let decls = source
            .split(';')
            .filter_map(|decl| {
                let (name, value) = decl.split_once(':')?;
                let name = name.trim().to_ascii_lowercase();
                let value = value.trim();
                if name.is_empty() || value.is_empty() {
                    return None;
                }
                Some((name, value.to_string()))
            })
            .collect();
        Self { decls }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.decls
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Sets a property, replacing it in place if present.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.decls.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value,
            None => self.decls.push((name.to_string(), value)),
        }
        // Later duplicates would shadow the slot we just wrote
        let mut seen = false;
        self.decls.retain(|(n, _)| {
            if n != name {
                return true;
            }
            let keep = !seen;
            seen = true;
            keep
        });
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let mut removed = None;
        self.decls.retain(|(n, v)| {
            if n == name {
                removed = Some(v.clone());
                false
            } else {
                true
            }
        });
        removed
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.decls.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.decls.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{name}: {value};")?;
        }
        Ok(())
    }
}

/// Parses a CSS pixel length such as `8px`, `8` or `8.5px`.
pub fn parse_px(value: &str) -> Option<f64> {
    let value = value.trim();
    let number = value.strip_suffix("px").unwrap_or(value).trim();
    number.parse::<f64>().ok().filter(|n| n.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_and_display() {
        let style = Style::parse("color:red ;  Font-Weight: bold;;bogus");
        assert_eq!(style.get("color"), Some("red"));
        assert_eq!(style.get("font-weight"), Some("bold"));
        assert_eq!(style.to_string(), "color: red; font-weight: bold;");
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut style = Style::parse("color: red; width: 10px");
        style.set("color", "blue");
        assert_eq!(style.to_string(), "color: blue; width: 10px;");
    }

    #[test]
    fn test_set_collapses_duplicates() {
        let mut style = Style::parse("color: red; color: green");
        assert_eq!(style.get("color"), Some("green"));
        style.set("color", "blue");
        assert_eq!(style.to_string(), "color: blue;");
    }

    #[test]
    fn test_remove() {
        let mut style = Style::parse("color: red; width: 10px");
        assert_eq!(style.remove("color"), Some("red".to_string()));
        assert_eq!(style.remove("color"), None);
        assert_eq!(style.to_string(), "width: 10px;");
    }

    #[test]
    fn test_value_with_colon_is_kept() {
        let style = Style::parse("background-image: url(http://x/y.png)");
        assert_eq!(style.get("background-image"), Some("url(http://x/y.png)"));
    }

    #[test]
    fn test_parse_px() {
        assert_eq!(parse_px("8px"), Some(8.0));
        assert_eq!(parse_px(" 40 "), Some(40.0));
        assert_eq!(parse_px("1.5px"), Some(1.5));
        assert_eq!(parse_px("auto"), None);
    }
}
