/// Named style strings shared by features, e.g. `"red" => "PEN(c:#FF0000)"`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StyleTable {
    styles: Vec<(String, String)>,
}

impl StyleTable {
    pub fn new() -> StyleTable {
        StyleTable::default()
    }

    /// Add a style, returning `false` if `name` is already taken.
    pub fn add_style(&mut self, name: &str, style: &str) -> bool {
        if self.find(name).is_some() {
            return false;
        }
        self.styles.push((name.to_string(), style.to_string()));
        true
    }

    pub fn find(&self, name: &str) -> Option<&str> {
        self.styles
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, s)| s.as_str())
    }

    pub fn remove_style(&mut self, name: &str) -> bool {
        let before = self.styles.len();
        self.styles.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
        self.styles.len() != before
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.styles.iter().map(|(n, s)| (n.as_str(), s.as_str()))
    }
}
