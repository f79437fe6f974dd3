use crate::error::{SignError, SignResult};

/**
    Parsed `Cookie` request header.

    Entries are split on `;` and trimmed; the name ends at the first `=`.
    Later duplicates do not replace earlier entries.
*/
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cookies {
    entries: Vec<(String, String)>,
}

impl Cookies {
    pub fn parse(header: &str) -> Self {
        let entries = header
            .split(';')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| match entry.split_once('=') {
                Some((name, value)) => (name.trim().to_owned(), value.trim().to_owned()),
                None => (entry.to_owned(), String::new()),
            })
            .collect();
        Self { entries }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /**
        Like [`Self::get`], but a missing or empty value is an error naming
        the cookie.
    */
    pub fn require(&self, name: &str) -> SignResult<&str> {
        match self.get(name) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(SignError::MissingField(name.to_owned())),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
