use std::borrow::Cow;
use urlencoding::decode;

/// Parsed `name=value; name2=value2` cookie string, in original order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    pairs: Vec<(String, String)>,
}

impl CookieJar {
    pub fn parse(header: &str) -> Self {
        let pairs = header
            .split(';')
            .filter_map(|pair| {
                let (name, value) = pair.split_once('=')?;
                let name = name.trim();
                if name.is_empty() {
                    return None;
                }
                let value = value.trim().trim_matches('"');
                Some((name.to_string(), percent_decode(value)))
            })
            .collect();
        Self { pairs }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

fn percent_decode(value: &str) -> String {
    decode(value)
        .map(Cow::into_owned)
        .unwrap_or_else(|_| value.to_string())
}
