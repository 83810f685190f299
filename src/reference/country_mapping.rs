//! Country alias resolution.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::error::ReferenceError;

/// Built-in aliases: lowercased variant -> canonical lowercased name.
const DEFAULT_ALIASES: &[(&str, &str)] = &[
    ("korea, south", "south korea"),
    ("korea, north", "north korea"),
    ("cote d ivoire", "ivory coast"),
    ("côte d'ivoire", "ivory coast"),
    ("cote d'ivoire", "ivory coast"),
    ("the gambia", "gambia"),
    ("netherlands", "the netherlands"),
    ("holland", "the netherlands"),
    (
        "congo, democratic republic of the",
        "democratic republic of the congo",
    ),
    ("drc", "democratic republic of the congo"),
    ("congo, republic of the", "republic of the congo"),
    ("burma", "myanmar"),
    ("bonaire", "bonaire, saint eustatius and saba"),
    ("usa", "united states"),
    ("us", "united states"),
    ("united states of america", "united states"),
    ("uk", "united kingdom"),
    ("great britain", "united kingdom"),
    ("britain", "united kingdom"),
    ("uae", "united arab emirates"),
    ("u.s.a.", "united states"),
    ("u.s.", "united states"),
    ("u.k.", "united kingdom"),
];

/// Resolved country span at the tail of a comma-split address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountrySpan {
    /// Canonical lowercased country name
    pub name: String,
    /// How many trailing segments the country occupies (1 or 2)
    pub segments: usize,
}

/// Read-only alias table for country names.
#[derive(Debug, Clone)]
pub struct CountryMapping {
    aliases: HashMap<String, String>,
}

impl Default for CountryMapping {
    fn default() -> Self {
        Self {
            aliases: DEFAULT_ALIASES
                .iter()
                .map(|(alias, canonical)| (alias.to_string(), canonical.to_string()))
                .collect(),
        }
    }
}

impl CountryMapping {
    /// An empty mapping (every name normalizes to itself)
    pub fn empty() -> Self {
        Self {
            aliases: HashMap::new(),
        }
    }

    /// Built-in aliases plus the JSON object `{ "alias": "canonical" }` in `path`.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ReferenceError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ReferenceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let extra: HashMap<String, String> =
            serde_json::from_str(&content).map_err(|source| ReferenceError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let mut mapping = Self::default();
        let count = extra.len();
        mapping.extend(extra);
        info!("Loaded {} extra country aliases from {}", count, path.display());
        Ok(mapping)
    }

    /// Add aliases; keys and values are case-folded.
    pub fn extend<I: IntoIterator<Item = (String, String)>>(&mut self, aliases: I) {
        for (alias, canonical) in aliases {
            self.aliases
                .insert(alias.trim().to_lowercase(), canonical.trim().to_lowercase());
        }
    }

    /// Raw lookup of an already case-folded key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.aliases.get(key).map(String::as_str)
    }

    /// Case-fold and trim `country`, then resolve it as a single phrase.
    /// Unmapped names normalize to themselves.
    pub fn normalize(&self, country: &str) -> String {
        let key = country.trim().to_lowercase();
        match self.aliases.get(&key) {
            Some(canonical) => canonical.clone(),
            None => key,
        }
    }

    /// Resolve the country from the tail of already case-folded, trimmed
    /// address segments.
    ///
    /// With `two_segment` set, the last two segments are joined as "x, y" and
    /// used only if that phrase has a distinct alias entry. Otherwise the last
    /// segment alone is normalized. A two-segment name with no alias entry
    /// therefore falls back to the single-segment reading.
    pub fn resolve_tail(&self, segments: &[&str], two_segment: bool) -> Option<CountrySpan> {
        let last = *segments.last()?;

        if two_segment && segments.len() >= 2 {
            let phrase = format!("{}, {}", segments[segments.len() - 2], last);
            if let Some(canonical) = self.aliases.get(&phrase) {
                if *canonical != phrase {
                    return Some(CountrySpan {
                        name: canonical.clone(),
                        segments: 2,
                    });
                }
            }
        }

        Some(CountrySpan {
            name: self.get(last).unwrap_or(last).to_string(),
            segments: 1,
        })
    }

    /// Number of aliases
    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    /// Check if the mapping has no aliases
    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_common_aliases() {
        let mapping = CountryMapping::default();
        assert_eq!(mapping.normalize("USA"), "united states");
        assert_eq!(mapping.normalize("U.S.A."), "united states");
        assert_eq!(mapping.normalize("  Burma "), "myanmar");
        assert_eq!(mapping.normalize("DRC"), "democratic republic of the congo");
        assert_eq!(
            mapping.normalize("Congo, Republic of the"),
            "republic of the congo"
        );
    }

    #[test]
    fn test_canonical_names_are_fixed_points() {
        let mapping = CountryMapping::default();
        for (_, canonical) in DEFAULT_ALIASES {
            assert_eq!(mapping.normalize(canonical), *canonical);
        }
        assert_eq!(mapping.normalize("Yemen"), "yemen");
    }

    #[test]
    fn test_resolve_tail_single_segment() {
        let mapping = CountryMapping::default();
        let span = mapping.resolve_tail(&["10 main st", "leeds", "uk"], false).unwrap();
        assert_eq!(span.name, "united kingdom");
        assert_eq!(span.segments, 1);
    }

    #[test]
    fn test_resolve_tail_two_segments() {
        let mapping = CountryMapping::default();
        let segments = ["rue 12", "brazzaville", "congo", "republic of the"];

        let span = mapping.resolve_tail(&segments, true).unwrap();
        assert_eq!(span.name, "republic of the congo");
        assert_eq!(span.segments, 2);

        // Without the flag only the last segment is considered
        let span = mapping.resolve_tail(&segments, false).unwrap();
        assert_eq!(span.name, "republic of the");
        assert_eq!(span.segments, 1);
    }

    #[test]
    fn test_unmapped_two_segment_name_falls_back() {
        let mapping = CountryMapping::default();
        let span = mapping
            .resolve_tail(&["1 high st", "saint helena", "ascension"], true)
            .unwrap();
        assert_eq!(span.name, "ascension");
        assert_eq!(span.segments, 1);
    }

    #[test]
    fn test_resolve_tail_empty() {
        assert!(CountryMapping::default().resolve_tail(&[], false).is_none());
    }

    #[test]
    fn test_load_from_file_merges() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "Czechia": "Czech Republic" }}"#).unwrap();

        let mapping = CountryMapping::load_from_file(file.path()).unwrap();
        assert_eq!(mapping.normalize("czechia"), "czech republic");
        assert_eq!(mapping.normalize("usa"), "united states");
        assert_eq!(mapping.len(), DEFAULT_ALIASES.len() + 1);
    }
}
