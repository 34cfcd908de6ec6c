// ============================================================
// Layer 3 — Concepts and Identifier Ordering
// ============================================================
// Concepts (knowledge components) arrive as arbitrary text ids
// such as "kc05" or "102334". The model needs them as a dense
// index 0..concept_num, assigned in sorted id order.
//
// Sorting rule (IdKey):
//   - ids that parse as i64 compare numerically
//   - integer ids sort before any text id
//   - text ids compare lexicographically
//
// The same rule orders student ids when sequences are grouped,
// so the extractor and every auxiliary-table universe agree on
// which concept sits at which index.
//
// Reference: Rust Book §10 (Traits), §8 (Collections)

use std::collections::HashMap;

use crate::domain::error::{PrepError, PrepResult};

/// Sort key for a categorical identifier.
/// Variant order matters: `Int` sorts before `Text`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IdKey {
    Int(i64),
    Text(String),
}

impl IdKey {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.parse::<i64>() {
            Ok(n)  => IdKey::Int(n),
            Err(_) => IdKey::Text(trimmed.to_string()),
        }
    }
}

/// Width of the locality suffix used by the two-hop filter.
const LOCALITY_SUFFIX_LEN: usize = 2;

/// A sorted, deduplicated set of concept ids.
///
/// Position in the list is the dense concept index.
#[derive(Debug, Clone, Default)]
pub struct ConceptUniverse {
    ids:   Vec<String>,
    index: HashMap<String, usize>,
}

impl ConceptUniverse {
    /// Build a universe from any collection of ids.
    /// Duplicates collapse; surrounding whitespace is ignored.
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut keyed: Vec<(IdKey, String)> = ids
            .into_iter()
            .map(|s| {
                let s = s.as_ref().trim().to_string();
                (IdKey::parse(&s), s)
            })
            .collect();
        keyed.sort();
        keyed.dedup_by(|a, b| a.0 == b.0);

        let ids: Vec<String> = keyed.into_iter().map(|(_, s)| s).collect();
        let index = ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();

        Self { ids, index }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn id(&self, index: usize) -> Option<&str> {
        self.ids.get(index).map(String::as_str)
    }

    /// Dense index of a concept id.
    ///
    /// `source_table` names the table the id came from so the
    /// error points at the offending file.
    pub fn index_of(&self, id: &str, source_table: &str) -> PrepResult<usize> {
        let id = id.trim();
        self.index
            .get(id)
            .copied()
            .or_else(|| {
                // "007" and "7" share an IdKey but not a map entry
                let key = IdKey::parse(id);
                self.ids.binary_search_by(|probe| IdKey::parse(probe).cmp(&key)).ok()
            })
            .ok_or_else(|| PrepError::ConceptNotFound {
                id:           id.to_string(),
                source_table: source_table.to_string(),
            })
    }

    /// Integer locality key of the concept at `index`: the last
    /// two characters of its id, e.g. "kc05" → 5, "kc20" → 20.
    pub fn locality_key(&self, index: usize) -> PrepResult<i64> {
        let id = self.ids.get(index).ok_or_else(|| PrepError::ConceptNotFound {
            id:           format!("#{index}"),
            source_table: "concept universe".to_string(),
        })?;
        locality_key_of(id)
    }
}

fn locality_key_of(id: &str) -> PrepResult<i64> {
    let chars: Vec<char> = id.chars().collect();
    let start  = chars.len().saturating_sub(LOCALITY_SUFFIX_LEN);
    let suffix: String = chars[start..].iter().collect();

    suffix
        .trim()
        .parse::<i64>()
        .map_err(|_| PrepError::InvalidLocalityKey { id: id.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_ids_sort_numerically() {
        let u = ConceptUniverse::from_ids(["10", "9", "100", "9"]);
        assert_eq!(u.ids(), &["9", "10", "100"]);
    }

    #[test]
    fn test_integer_ids_before_text_ids() {
        let u = ConceptUniverse::from_ids(["kc02", "5", "kc01"]);
        assert_eq!(u.ids(), &["5", "kc01", "kc02"]);
    }

    #[test]
    fn test_index_of_and_not_found() {
        let u = ConceptUniverse::from_ids(["b", "a", "c"]);
        assert_eq!(u.index_of("c", "t.csv").unwrap(), 2);
        assert!(matches!(
            u.index_of("z", "t.csv"),
            Err(PrepError::ConceptNotFound { .. })
        ));
    }

    #[test]
    fn test_locality_key_from_suffix() {
        let u = ConceptUniverse::from_ids(["kc05", "kc20", "q107"]);
        let keys: Vec<i64> = (0..u.len()).map(|i| u.locality_key(i).unwrap()).collect();
        assert_eq!(keys, vec![5, 20, 7]);
    }

    #[test]
    fn test_locality_key_rejects_text_suffix() {
        let u = ConceptUniverse::from_ids(["kcab"]);
        assert!(matches!(
            u.locality_key(0),
            Err(PrepError::InvalidLocalityKey { .. })
        ));
    }
}
