// ============================================================
// Layer 5 — Relation-Table Graphs
// ============================================================
// Graphs read from prerequisite / relation tables produced by
// other analyses. Every table names concepts by their original
// id; ids are mapped through a ConceptUniverse and the matching
// cells are set to 1 before row normalization.
//
//   MyGraph  from,to                    universe = ids in the table
//            (My2HopD maps the same pairs through the dataset's
//            concepts instead, see PairGraph::edges_in)
//   MyHMM    before,after,hmm_direction universe = dedup table
//            (only "forward" rows)
//   MyERF    before,after               first 5 `after` values per
//                                       concept, in file order
//   MyFIR    target,auc,rel*            the best-AUC row per concept,
//                                       its first 5 `rel*` values
//
// Fewer than 5 relations:
//   RelationShortfall::Truncate links whatever is available (maybe
//   nothing) and logs a warning. RelationShortfall::Fail stops
//   with InsufficientRelations.
//
// An id that is not in the universe is always an error.

use std::{collections::HashMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::data::loader::{is_missing, CsvTable};
use crate::domain::adjacency::AdjacencyMatrix;
use crate::domain::concept::{ConceptUniverse, IdKey};
use crate::domain::error::{PrepError, PrepResult};
use crate::domain::traits::GraphBuilder;

/// Relations kept per concept by the ranked graphs (MyERF, MyFIR).
pub const TOP_K_RELATIONS: usize = 5;

/// Direction value kept by the HMM graph.
const HMM_FORWARD: &str = "forward";

/// What to do when a concept has fewer than TOP_K_RELATIONS.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationShortfall {
    /// Link the relations that exist.
    #[default]
    Truncate,
    /// Fail with `PrepError::InsufficientRelations`.
    Fail,
}

impl fmt::Display for RelationShortfall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationShortfall::Truncate => f.write_str("truncate"),
            RelationShortfall::Fail     => f.write_str("fail"),
        }
    }
}

impl FromStr for RelationShortfall {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "truncate" => Ok(RelationShortfall::Truncate),
            "fail"     => Ok(RelationShortfall::Fail),
            other      => Err(format!("unknown shortfall policy '{other}', expected truncate or fail")),
        }
    }
}

impl RelationShortfall {
    /// Keep the first TOP_K_RELATIONS of `available`, applying the
    /// policy when there are fewer.
    fn top_k<'t>(&self, concept: &str, mut available: Vec<&'t str>) -> PrepResult<Vec<&'t str>> {
        if available.len() >= TOP_K_RELATIONS {
            available.truncate(TOP_K_RELATIONS);
            return Ok(available);
        }
        match self {
            RelationShortfall::Truncate => {
                tracing::warn!(
                    "Concept '{}' has only {} of {} ranked relations",
                    concept,
                    available.len(),
                    TOP_K_RELATIONS
                );
                Ok(available)
            }
            RelationShortfall::Fail => Err(PrepError::InsufficientRelations {
                concept: concept.to_string(),
                wanted:  TOP_K_RELATIONS,
                found:   available.len(),
            }),
        }
    }
}

/// Universe from one column of a table, e.g. `kc_uid` of the
/// concept dedup table.
pub fn column_universe(table: &CsvTable, column: &str) -> PrepResult<ConceptUniverse> {
    let values = table.column_values(column)?;
    Ok(ConceptUniverse::from_ids(values.into_iter().filter(|v| !is_missing(v))))
}

/// Set `from → to` for every pair, mapping ids through `universe`.
fn mark_edges<'t>(
    universe: &ConceptUniverse,
    source:   &str,
    pairs:    impl IntoIterator<Item = (&'t str, &'t str)>,
) -> PrepResult<AdjacencyMatrix> {
    let mut graph = AdjacencyMatrix::zeros(universe.len());
    for (from, to) in pairs {
        let i = universe.index_of(from, source)?;
        let j = universe.index_of(to, source)?;
        graph.set(i, j, 1.0);
    }
    Ok(graph)
}

// ─── MyGraph ──────────────────────────────────────────────────────────────────
/// Edges straight from a `from`,`to` table.
pub struct PairGraph<'a> {
    table: &'a CsvTable,
}

impl<'a> PairGraph<'a> {
    pub fn new(table: &'a CsvTable) -> Self {
        Self { table }
    }

    /// Every concept named in either column.
    pub fn universe(&self) -> PrepResult<ConceptUniverse> {
        let from = self.table.column_values("from")?;
        let to   = self.table.column_values("to")?;
        Ok(ConceptUniverse::from_ids(
            from.into_iter().chain(to).filter(|v| !is_missing(v)),
        ))
    }

    /// Unnormalized 0/1 edges indexed by `universe`. The table may
    /// cover only part of it; an id outside it is ConceptNotFound.
    pub fn edges_in(&self, universe: &ConceptUniverse) -> PrepResult<AdjacencyMatrix> {
        let from = self.table.column_values("from")?;
        let to   = self.table.column_values("to")?;

        let pairs = from
            .into_iter()
            .zip(to)
            .filter(|(a, b)| !is_missing(a) && !is_missing(b));
        mark_edges(universe, self.table.source(), pairs)
    }
}

impl GraphBuilder for PairGraph<'_> {
    fn name(&self) -> &'static str {
        "MyGraph"
    }

    fn build(&self) -> PrepResult<AdjacencyMatrix> {
        let mut graph = self.edges_in(&self.universe()?)?;
        graph.row_normalize();
        Ok(graph)
    }
}

// ─── MyHMM ────────────────────────────────────────────────────────────────────
/// Forward transitions of a hidden-Markov analysis.
pub struct HmmGraph<'a> {
    table:    &'a CsvTable,
    universe: &'a ConceptUniverse,
}

impl<'a> HmmGraph<'a> {
    pub fn new(table: &'a CsvTable, universe: &'a ConceptUniverse) -> Self {
        Self { table, universe }
    }
}

impl GraphBuilder for HmmGraph<'_> {
    fn name(&self) -> &'static str {
        "MyHMM"
    }

    fn build(&self) -> PrepResult<AdjacencyMatrix> {
        let before    = self.table.column_values("before")?;
        let after     = self.table.column_values("after")?;
        let direction = self.table.column_values("hmm_direction")?;

        let pairs = before
            .into_iter()
            .zip(after)
            .zip(direction)
            .filter(|(_, dir)| dir.trim() == HMM_FORWARD)
            .map(|(pair, _)| pair);
        let mut graph = mark_edges(self.universe, self.table.source(), pairs)?;
        graph.row_normalize();
        Ok(graph)
    }
}

// ─── MyERF ────────────────────────────────────────────────────────────────────
/// Top-ranked successors from an ElasticNet + random-forest
/// relation table, already ordered best first.
pub struct ErfGraph<'a> {
    table:     &'a CsvTable,
    universe:  &'a ConceptUniverse,
    shortfall: RelationShortfall,
}

impl<'a> ErfGraph<'a> {
    pub fn new(table: &'a CsvTable, universe: &'a ConceptUniverse, shortfall: RelationShortfall) -> Self {
        Self { table, universe, shortfall }
    }
}

impl GraphBuilder for ErfGraph<'_> {
    fn name(&self) -> &'static str {
        "MyERF"
    }

    fn build(&self) -> PrepResult<AdjacencyMatrix> {
        let before = self.table.column_values("before")?;
        let after  = self.table.column_values("after")?;

        let mut successors: HashMap<IdKey, Vec<&str>> = HashMap::new();
        for (b, a) in before.into_iter().zip(after) {
            if is_missing(b) || is_missing(a) {
                continue;
            }
            successors.entry(IdKey::parse(b)).or_default().push(a);
        }

        let mut pairs = Vec::new();
        for id in self.universe.ids() {
            let available = successors.remove(&IdKey::parse(id)).unwrap_or_default();
            for next in self.shortfall.top_k(id, available)? {
                pairs.push((id.as_str(), next));
            }
        }

        let mut graph = mark_edges(self.universe, self.table.source(), pairs)?;
        graph.row_normalize();
        Ok(graph)
    }
}

// ─── MyFIR ────────────────────────────────────────────────────────────────────
/// Best relation set per target from a feature-importance
/// ranking: one row per (target, candidate set) with its AUC.
pub struct FirGraph<'a> {
    table:     &'a CsvTable,
    universe:  &'a ConceptUniverse,
    shortfall: RelationShortfall,
}

impl<'a> FirGraph<'a> {
    pub fn new(table: &'a CsvTable, universe: &'a ConceptUniverse, shortfall: RelationShortfall) -> Self {
        Self { table, universe, shortfall }
    }

    /// Row with the highest AUC for each target; the first row wins ties.
    fn best_rows(&self) -> PrepResult<HashMap<IdKey, usize>> {
        let target_col = self.table.column("target")?;
        let auc_col    = self.table.column("auc")?;
        let rows       = self.table.rows();

        let mut best: HashMap<IdKey, (usize, f64)> = HashMap::new();
        for (i, row) in rows.iter().enumerate() {
            if is_missing(&row[target_col]) {
                continue;
            }
            let auc = self.table.parse_f64(i, auc_col)?;
            best.entry(IdKey::parse(&row[target_col]))
                .and_modify(|(idx, top)| {
                    if auc > *top {
                        *idx = i;
                        *top = auc;
                    }
                })
                .or_insert((i, auc));
        }
        Ok(best.into_iter().map(|(k, (idx, _))| (k, idx)).collect())
    }
}

impl GraphBuilder for FirGraph<'_> {
    fn name(&self) -> &'static str {
        "MyFIR"
    }

    fn build(&self) -> PrepResult<AdjacencyMatrix> {
        let rel_cols = self.table.columns_containing("rel");
        let best     = self.best_rows()?;
        let rows     = self.table.rows();

        let mut pairs = Vec::new();
        for id in self.universe.ids() {
            let available: Vec<&str> = match best.get(&IdKey::parse(id)) {
                Some(&row) => rel_cols
                    .iter()
                    .map(|&c| rows[row][c].as_str())
                    .filter(|v| !is_missing(v))
                    .collect(),
                None => Vec::new(),
            };
            for next in self.shortfall.top_k(id, available)? {
                pairs.push((id.as_str(), next));
            }
        }

        let mut graph = mark_edges(self.universe, self.table.source(), pairs)?;
        graph.row_normalize();
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::adjacency::tests::assert_row_stochastic;

    fn table(name: &str, csv: &str) -> CsvTable {
        CsvTable::from_reader(name, csv.as_bytes()).unwrap()
    }

    fn universe(ids: &[&str]) -> ConceptUniverse {
        ConceptUniverse::from_ids(ids.iter().copied())
    }

    #[test]
    fn test_pair_graph_universe_from_both_columns() {
        let t = table("gt.csv", "from,to\nk2,k1\nk2,k3\nk3,k1\n");
        let builder = PairGraph::new(&t);
        assert_eq!(builder.universe().unwrap().ids(), &["k1", "k2", "k3"]);

        let g = builder.build().unwrap();
        assert_row_stochastic(&g);
        assert_eq!(g.row(1), &[0.5, 0.0, 0.5]);
        assert_eq!(g.row(2), &[1.0, 0.0, 0.0]);
        assert_eq!(g.row_sum(0), 0.0);
    }

    #[test]
    fn test_pair_edges_in_wider_universe() {
        let t = table("gt.csv", "from,to\nk3,k1\n");
        let u = universe(&["k1", "k2", "k3", "k4"]);
        let g = PairGraph::new(&t).edges_in(&u).unwrap();
        assert_eq!(g.size(), 4);
        assert_eq!(g.get(2, 0), 1.0);
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn test_pair_edges_in_unknown_concept() {
        let t = table("gt.csv", "from,to\nk1,k2\nk3,k9\n");
        let u = universe(&["k1", "k2", "k3", "k4"]);
        assert!(matches!(
            PairGraph::new(&t).edges_in(&u),
            Err(PrepError::ConceptNotFound { ref id, .. }) if id == "k9"
        ));
    }

    #[test]
    fn test_pair_graph_requires_columns() {
        let t = table("gt.csv", "src,dst\na,b\n");
        assert!(matches!(
            PairGraph::new(&t).build(),
            Err(PrepError::MissingColumn { ref column, .. }) if column == "from"
        ));
    }

    #[test]
    fn test_hmm_graph_keeps_forward_rows() {
        let t = table(
            "hmm.csv",
            "before,after,hmm_direction,note\na,b,forward,x\na,c,backward,y\nb,c,forward,z\n",
        );
        let u = universe(&["a", "b", "c", "d"]);
        let g = HmmGraph::new(&t, &u).build().unwrap();
        assert_eq!(g.row(0), &[0.0, 1.0, 0.0, 0.0]);
        assert_eq!(g.row(1), &[0.0, 0.0, 1.0, 0.0]);
        assert_eq!(g.edge_count(), 2);
    }

    #[test]
    fn test_hmm_graph_unknown_concept() {
        let t = table("hmm.csv", "before,after,hmm_direction\na,zz,forward\n");
        let u = universe(&["a", "b"]);
        assert!(matches!(
            HmmGraph::new(&t, &u).build(),
            Err(PrepError::ConceptNotFound { ref id, .. }) if id == "zz"
        ));
    }

    const ERF: &str = "\
before,after
k1,k2
k1,k3
k1,k4
k1,k5
k1,k6
k1,k7
k2,k1
";

    fn seven() -> ConceptUniverse {
        universe(&["k1", "k2", "k3", "k4", "k5", "k6", "k7"])
    }

    #[test]
    fn test_erf_graph_takes_first_five_in_file_order() {
        let t = table("erf.csv", ERF);
        let u = seven();
        let g = ErfGraph::new(&t, &u, RelationShortfall::Truncate).build().unwrap();
        assert_row_stochastic(&g);
        // k7 is the sixth relation of k1 and is cut
        assert_eq!(g.row(0), &[0.0, 0.2, 0.2, 0.2, 0.2, 0.2, 0.0]);
        // k2 has a single relation, linked under truncate
        assert_eq!(g.row(1), &[1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        // k3 has none
        assert_eq!(g.row_sum(2), 0.0);
    }

    #[test]
    fn test_erf_graph_fail_policy() {
        let t = table("erf.csv", ERF);
        let u = seven();
        let err = ErfGraph::new(&t, &u, RelationShortfall::Fail).build().unwrap_err();
        assert!(matches!(
            err,
            PrepError::InsufficientRelations { ref concept, wanted: 5, found: 1 } if concept == "k2"
        ));
    }

    const FIR: &str = "\
target,auc,rel_1,rel_2,rel_3,rel_4,rel_5,rel_6
k1,0.61,k7,k6,k5,k4,k3,k2
k1,0.72,k2,k3,k4,k5,k6,k7
k2,0.55,k1,,,,,
";

    #[test]
    fn test_fir_graph_uses_best_auc_row() {
        let t = table("fir.csv", FIR);
        let u = seven();
        let g = FirGraph::new(&t, &u, RelationShortfall::Truncate).build().unwrap();
        assert_row_stochastic(&g);
        // second k1 row wins; rel_6 (k7) is beyond the top five
        assert_eq!(g.row(0), &[0.0, 0.2, 0.2, 0.2, 0.2, 0.2, 0.0]);
        assert_eq!(g.row(1), &[1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_fir_graph_first_row_wins_auc_tie() {
        let t = table(
            "fir.csv",
            "target,auc,rel_1\nk1,0.70,k2\nk1,0.70,k3\nk1,0.40,k4\n",
        );
        let u = universe(&["k1", "k2", "k3", "k4"]);
        let g = FirGraph::new(&t, &u, RelationShortfall::Truncate).build().unwrap();
        assert_eq!(g.row(0), &[0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_erf_graph_unknown_successor() {
        let t = table("erf.csv", "before,after\nk1,k2\nk1,k8\n");
        let u = universe(&["k1", "k2"]);
        assert!(matches!(
            ErfGraph::new(&t, &u, RelationShortfall::Truncate).build(),
            Err(PrepError::ConceptNotFound { ref id, .. }) if id == "k8"
        ));
    }

    #[test]
    fn test_fir_graph_unknown_relation() {
        let t = table("fir.csv", "target,auc,rel_1,rel_2\nk1,0.8,k2,k8\n");
        let u = universe(&["k1", "k2"]);
        assert!(matches!(
            FirGraph::new(&t, &u, RelationShortfall::Truncate).build(),
            Err(PrepError::ConceptNotFound { ref id, .. }) if id == "k8"
        ));
    }

    #[test]
    fn test_fir_graph_fail_policy_on_missing_target() {
        let t = table("fir.csv", "target,auc,rel_1,rel_2,rel_3,rel_4,rel_5\nk1,0.9,k2,k3,k4,k5,k6\n");
        let u = universe(&["k1", "k2", "k3", "k4", "k5", "k6"]);
        let err = FirGraph::new(&t, &u, RelationShortfall::Fail).build().unwrap_err();
        assert!(matches!(err, PrepError::InsufficientRelations { found: 0, .. }));
    }

    #[test]
    fn test_fir_graph_bad_auc() {
        let t = table("fir.csv", "target,auc,rel_1\nk1,high,k2\n");
        let u = universe(&["k1", "k2"]);
        assert!(matches!(
            FirGraph::new(&t, &u, RelationShortfall::Truncate).build(),
            Err(PrepError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_column_universe_skips_missing() {
        let t = table("kc.csv", "kc_uid\nk2\n\nk1\nk2\n");
        assert_eq!(column_universe(&t, "kc_uid").unwrap().ids(), &["k1", "k2"]);
    }

    #[test]
    fn test_shortfall_policy_parse() {
        assert_eq!("FAIL".parse::<RelationShortfall>().unwrap(), RelationShortfall::Fail);
        assert!("pad".parse::<RelationShortfall>().is_err());
    }
}
