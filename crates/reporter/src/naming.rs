//! Emitted metric names.

/// Builds wire names from registered names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Naming {
    prefix: String,
    add_suffix: bool,
}

impl Naming {
    /// Create a naming strategy
    pub fn new(prefix: impl Into<String>, add_suffix: bool) -> Self {
        Self {
            prefix: prefix.into(),
            add_suffix,
        }
    }

    /// `[prefix.]name[.suffix...]`
    ///
    /// Suffixes are only appended when suffixes are enabled. An empty `name`
    /// still yields a string; rejecting it is left to the sender.
    pub fn prepare_name(&self, name: &str, suffixes: &[&str]) -> String {
        let mut out = String::with_capacity(self.prefix.len() + name.len() + 16);
        if !self.prefix.is_empty() {
            out.push_str(&self.prefix);
            out.push('.');
        }
        out.push_str(name);
        if self.add_suffix {
            for suffix in suffixes {
                out.push('.');
                out.push_str(suffix);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_and_suffix() {
        let naming = Naming::new("prefix", true);
        assert_eq!(naming.prepare_name("name", &["count"]), "prefix.name.count");
        assert_eq!(naming.prepare_name("name", &[]), "prefix.name");

        let naming = Naming::new("", false);
        assert_eq!(naming.prepare_name("name", &["count"]), "name");
    }

    #[test]
    fn test_suffix_without_prefix() {
        let naming = Naming::new("", true);
        assert_eq!(naming.prepare_name("name", &["value"]), "name.value");
        assert_eq!(naming.prepare_name("a", &["b", "c"]), "a.b.c");
    }

    #[test]
    fn test_empty_base_name() {
        assert_eq!(Naming::new("", true).prepare_name("", &["count"]), ".count");
        assert_eq!(Naming::new("p", false).prepare_name("", &[]), "p.");
    }
}
