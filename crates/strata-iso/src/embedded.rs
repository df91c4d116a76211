//! Level graphs embedded into a generalised stratum.
//!
//! An [`EmbeddedLevelGraph`] couples a [`LevelGraph`] with the stratum it
//! degenerates, via a bijection between the graph's markings and the
//! stratum's marked points and a dictionary normalising the graph's
//! internal level names. Expensive derived data (automorphisms, level
//! strata, the two-level splitting) is computed once and cached.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use strata_core::{
    iso_error, Edge, LegId, ResidueMatrix, StrataError, Stratum, StratumPoint,
    VertexId,
};
use strata_graph::{AuxGraph, LevelGraph, LevelStratum};

use crate::isomorphism::{isomorphisms, Isomorphism};

/// The two-level splitting of a graph with exactly one level passage: the
/// strata of its top and bottom level together with the gluing data.
#[derive(Debug, Clone)]
pub struct SplitData {
    /// The stratum of the top level.
    pub top: Arc<LevelStratum>,
    /// The stratum of the bottom level.
    pub bot: Arc<LevelStratum>,
    /// For every edge, the top point glued to the bottom point.
    pub clutch_dict: BTreeMap<StratumPoint, StratumPoint>,
    /// Top-level points of marked legs, as points of the ambient stratum.
    pub emb_top: BTreeMap<StratumPoint, StratumPoint>,
    /// Bottom-level points of marked legs, as points of the ambient stratum.
    pub emb_bot: BTreeMap<StratumPoint, StratumPoint>,
}

/// A level graph embedded into a stratum.
pub struct EmbeddedLevelGraph<S> {
    stratum: S,
    lg: LevelGraph,
    dmp: BTreeMap<LegId, StratumPoint>,
    dmp_inv: BTreeMap<StratumPoint, LegId>,
    dlevels: BTreeMap<i64, i64>,
    aux: AuxGraph,
    automorphism_cache: OnceCell<Vec<Isomorphism>>,
    split_cache: OnceCell<SplitData>,
    ell_cache: OnceCell<u64>,
    level_cache: Mutex<BTreeMap<i64, Arc<LevelStratum>>>,
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

fn lcm(a: u64, b: u64) -> u64 {
    if a == 0 || b == 0 {
        0
    } else {
        a / gcd(a, b) * b
    }
}

impl<S: Stratum + Clone> EmbeddedLevelGraph<S> {
    /// Embeds a level graph into a stratum.
    ///
    /// `dmp` must map the graph's markings bijectively onto marked points
    /// of the stratum, covering every point a residue condition of the
    /// stratum names. `dlevels` must rename exactly the graph's internal
    /// levels, injectively.
    pub fn new(
        stratum: S,
        lg: LevelGraph,
        dmp: BTreeMap<LegId, StratumPoint>,
        dlevels: BTreeMap<i64, i64>,
    ) -> Result<Self, StrataError> {
        let markings: BTreeSet<LegId> = lg.markings().into_iter().collect();
        let dmp_keys: BTreeSet<LegId> = dmp.keys().copied().collect();
        if dmp_keys != markings {
            return Err(iso_error(
                "iso-dmp-domain",
                "the marked point dictionary must cover exactly the markings",
            ));
        }
        let mut dmp_inv = BTreeMap::new();
        for (&leg, &point) in &dmp {
            if stratum.point_order(point).is_none() {
                return Err(iso_error(
                    "iso-dmp-unknown-point",
                    "a marking maps to a point outside the stratum",
                )
                .with_context("leg", leg)
                .with_context("point", point));
            }
            if dmp_inv.insert(point, leg).is_some() {
                return Err(iso_error(
                    "iso-dmp-injective",
                    "two markings map to the same stratum point",
                )
                .with_context("point", point));
            }
        }
        let levels: BTreeSet<i64> = lg.levels().iter().copied().collect();
        let dlevel_keys: BTreeSet<i64> = dlevels.keys().copied().collect();
        if dlevel_keys != levels {
            return Err(iso_error(
                "iso-dlevels-domain",
                "the level dictionary must cover exactly the internal levels",
            ));
        }
        let dlevel_values: BTreeSet<i64> = dlevels.values().copied().collect();
        if dlevel_values.len() != dlevels.len() {
            return Err(iso_error(
                "iso-dlevels-injective",
                "two internal levels map to the same level name",
            ));
        }

        // The residue conditions of the ambient stratum travel along the
        // embedding: one vertex at infinity per condition.
        let mut aux = AuxGraph::from_level_graph(&lg)?;
        for (idx, condition) in stratum.residue_conditions().iter().enumerate() {
            let mut attachments = Vec::new();
            for point in condition {
                let leg = *dmp_inv.get(point).ok_or_else(|| {
                    iso_error(
                        "iso-dmp-missing-point",
                        "a residue condition names a point outside the embedding",
                    )
                    .with_context("point", point)
                })?;
                attachments.push((lg.vertex(leg)?, leg));
            }
            aux.attach_infinity(idx, &attachments);
        }

        Ok(Self {
            stratum,
            lg,
            dmp,
            dmp_inv,
            dlevels,
            aux,
            automorphism_cache: OnceCell::new(),
            split_cache: OnceCell::new(),
            ell_cache: OnceCell::new(),
            level_cache: Mutex::new(BTreeMap::new()),
        })
    }

    /// The underlying level graph.
    pub fn level_graph(&self) -> &LevelGraph {
        &self.lg
    }

    /// The ambient stratum.
    pub fn stratum(&self) -> &S {
        &self.stratum
    }

    /// The marking-to-point dictionary.
    pub fn dmp(&self) -> &BTreeMap<LegId, StratumPoint> {
        &self.dmp
    }

    /// The point-to-marking dictionary.
    pub fn dmp_inv(&self) -> &BTreeMap<StratumPoint, LegId> {
        &self.dmp_inv
    }

    /// The internal-level renaming dictionary.
    pub fn dlevels(&self) -> &BTreeMap<i64, i64> {
        &self.dlevels
    }

    /// The auxiliary graph, residue conditions attached.
    pub fn aux_graph(&self) -> &AuxGraph {
        &self.aux
    }

    /// Whether the graph has exactly two levels and no horizontal edge.
    pub fn is_bic(&self) -> bool {
        self.lg.is_bic()
    }

    fn require_bic(&self) -> Result<(), StrataError> {
        if !self.is_bic() {
            return Err(iso_error(
                "iso-not-bic",
                "this operation needs a two-level graph without horizontal edges",
            )
            .with_context("levels", self.lg.number_of_levels()));
        }
        Ok(())
    }

    /// The least common multiple of the prongs of a two-level graph.
    pub fn ell(&self) -> Result<u64, StrataError> {
        self.require_bic()?;
        self.ell_cache
            .get_or_try_init(|| {
                let mut acc = 1u64;
                for (&edge, &prong) in self.lg.prongs() {
                    let prong = u64::try_from(prong).map_err(|_| {
                        iso_error("iso-bad-prong", "edge with non-positive prong")
                            .with_context("edge", edge)
                    })?;
                    acc = lcm(acc, prong);
                }
                Ok(acc)
            })
            .copied()
    }

    /// The marked poles whose residues are pinned by conditions of the
    /// ambient stratum, as graph legs.
    fn excluded_poles(&self) -> BTreeSet<LegId> {
        self.stratum
            .residue_conditions()
            .iter()
            .flatten()
            .filter_map(|point| self.dmp_inv.get(point).copied())
            .collect()
    }

    /// All isomorphisms onto another embedding that respect the markings,
    /// produced lazily.
    pub fn isomorphisms<'a>(
        &'a self,
        other: &'a Self,
    ) -> Box<dyn Iterator<Item = Isomorphism> + 'a> {
        isomorphisms(&self.lg, &self.dmp, &other.lg, &other.dmp)
    }

    /// Whether an isomorphism onto the other embedding exists.
    pub fn is_isomorphic(&self, other: &Self) -> bool {
        self.isomorphisms(other).next().is_some()
    }

    /// All automorphisms, computed once.
    pub fn automorphisms(&self) -> &[Isomorphism] {
        self.automorphism_cache
            .get_or_init(|| self.isomorphisms(self).collect())
    }

    /// The automorphisms whose leg map fixes every leg of the tuple.
    pub fn automorphisms_stabilising_legs(&self, legs: &[LegId]) -> Vec<Isomorphism> {
        self.automorphisms()
            .iter()
            .filter(|auto| auto.stabilises_legs(legs))
            .cloned()
            .collect()
    }

    /// The generalised stratum of the level at relative position `l` from
    /// the top, with the automorphism orbits of its points recorded.
    pub fn level(&self, l: i64) -> Result<Arc<LevelStratum>, StrataError> {
        if let Some(cached) = self.level_cache.lock().get(&l) {
            return Ok(Arc::clone(cached));
        }
        // The automorphism group is needed for the orbits; compute it
        // before taking the cache lock.
        let autos = self.automorphisms().to_vec();
        let excluded = self.excluded_poles();
        let mut stratum = self.lg.stratum_from_level(&self.aux, l, &excluded)?;

        let mut orbits: Vec<Vec<StratumPoint>> = Vec::new();
        let mut seen: BTreeSet<StratumPoint> = BTreeSet::new();
        for &(leg, point) in stratum.leg_dict() {
            if seen.contains(&point) {
                continue;
            }
            let mut orbit: BTreeSet<StratumPoint> = BTreeSet::new();
            for auto in &autos {
                let image = *auto.leg_map.get(&leg).ok_or_else(|| {
                    iso_error("iso-partial-automorphism", "automorphism misses a leg")
                        .with_context("leg", leg)
                })?;
                orbit.insert(stratum.stratum_number(image)?);
            }
            seen.extend(orbit.iter().copied());
            orbits.push(orbit.into_iter().collect());
        }
        stratum.set_leg_orbits(orbits);

        let arc = Arc::new(stratum);
        let mut cache = self.level_cache.lock();
        Ok(Arc::clone(cache.entry(l).or_insert(arc)))
    }

    /// The residue matrix of the ambient stratum stacked with one residue
    /// theorem row per graph vertex carrying poles of the stratum.
    fn full_residue_matrix(&self) -> Result<ResidueMatrix, StrataError> {
        let pole_list = self.stratum.pole_list();
        let mut matrix = self.stratum.residue_matrix()?;
        for idx in 0..self.lg.num_vertices() {
            let vertex = VertexId::from_index(idx);
            let mut row = vec![0u8; pole_list.len()];
            let mut nonzero = false;
            for (column, point) in pole_list.iter().enumerate() {
                if let Some(&leg) = self.dmp_inv.get(point) {
                    if self.lg.vertex(leg)? == vertex {
                        row[column] = 1;
                        nonzero = true;
                    }
                }
            }
            if nonzero {
                matrix.push_row(row)?;
            }
        }
        Ok(matrix)
    }

    /// Whether the residue of a marked pole of the ambient stratum is
    /// forced to vanish on this graph.
    pub fn residue_zero(&self, pole: StratumPoint) -> Result<bool, StrataError> {
        let pole_list = self.stratum.pole_list();
        let column = pole_list.iter().position(|p| *p == pole).ok_or_else(|| {
            iso_error("iso-missing-pole", "the point is not a pole of the stratum")
                .with_context("point", pole)
        })?;
        let matrix = self.full_residue_matrix()?;
        if matrix.row_count() == 0 {
            return Ok(false);
        }
        Ok(matrix.append_unit_row(column)?.rank() == matrix.rank())
    }

    /// Whether the graph passes all legality checks inside its stratum:
    /// no empty level stratum in the presence of simple poles, no illegal
    /// vertex and no illegal edge.
    pub fn is_legal(&self) -> Result<bool, StrataError> {
        if !self.stratum.simple_poles().is_empty() {
            for rank in 0..self.lg.number_of_levels() as i64 {
                if self.level(rank)?.is_empty()? {
                    return Ok(false);
                }
            }
        }
        self.lg.is_legal(&self.aux, &self.excluded_poles())
    }

    /// The orbit of an edge under the automorphism group.
    pub fn edge_orbit(&self, edge: Edge) -> Result<Vec<Edge>, StrataError> {
        if !self.lg.edges().contains(&edge) {
            return Err(iso_error("iso-missing-edge", "no such edge")
                .with_context("edge", edge));
        }
        let edges: BTreeSet<Edge> = self.lg.edges().iter().copied().collect();
        let mut orbit = BTreeSet::new();
        for auto in self.automorphisms() {
            let a = *auto.leg_map.get(&edge.0).ok_or_else(|| {
                iso_error("iso-partial-automorphism", "automorphism misses a leg")
                    .with_context("leg", edge.0)
            })?;
            let b = *auto.leg_map.get(&edge.1).ok_or_else(|| {
                iso_error("iso-partial-automorphism", "automorphism misses a leg")
                    .with_context("leg", edge.1)
            })?;
            let image = Edge(a, b);
            if edges.contains(&image) {
                orbit.insert(image);
            } else {
                orbit.insert(Edge(b, a));
            }
        }
        Ok(orbit.into_iter().collect())
    }

    /// The size of an edge's automorphism orbit.
    pub fn len_edge_orbit(&self, edge: Edge) -> Result<usize, StrataError> {
        Ok(self.edge_orbit(edge)?.len())
    }

    /// Whether two legs lie on the same level and in the same automorphism
    /// orbit.
    pub fn legs_are_isomorphic(&self, a: LegId, b: LegId) -> Result<bool, StrataError> {
        let level_a = self.lg.level_of_leg(a)?;
        let level_b = self.lg.level_of_leg(b)?;
        if level_a != level_b {
            return Ok(false);
        }
        let rank = self.lg.level_number(level_a).ok_or_else(|| {
            iso_error("iso-missing-level", "leg on an unknown level")
                .with_context("leg", a)
        })?;
        let stratum = self.level(rank as i64)?;
        let point_a = stratum.stratum_number(a)?;
        let point_b = stratum.stratum_number(b)?;
        let orbit = stratum
            .leg_orbits()
            .iter()
            .find(|orbit| orbit.contains(&point_a))
            .ok_or_else(|| {
                iso_error("iso-missing-orbit", "no orbit recorded for this point")
                    .with_context("point", point_a)
            })?;
        Ok(orbit.contains(&point_b))
    }

    /// A canonical renaming of all legs: marked legs are numbered the way
    /// the ambient stratum numbers its marked points, half-edges follow in
    /// leg order.
    pub fn standard_markings(&self) -> BTreeMap<LegId, u32> {
        let mut offsets = vec![0usize; self.stratum.components()];
        let mut total = 0usize;
        for (component, sig) in self.stratum.signatures().iter().enumerate() {
            offsets[component] = total;
            total += sig.n();
        }
        let mut legs: Vec<LegId> = self.lg.leg_list().to_vec();
        legs.sort_unstable();
        let marked = self.dmp.len();
        let mut next_half_edge = 0u32;
        let mut names = BTreeMap::new();
        for leg in legs {
            let name = match self.dmp.get(&leg) {
                Some(point) => (point.index + offsets[point.component] + 1) as u32,
                None => {
                    next_half_edge += 1;
                    marked as u32 + next_half_edge
                }
            };
            names.insert(leg, name);
        }
        names
    }

    /// The embedding with all legs renamed according to the map, which
    /// must be a total injective renaming of the graph's legs.
    pub fn relabel(&self, map: &BTreeMap<LegId, LegId>) -> Result<Self, StrataError> {
        let lg = self.lg.relabel(map)?;
        let mut dmp = BTreeMap::new();
        for (&leg, &point) in &self.dmp {
            let renamed = *map.get(&leg).ok_or_else(|| {
                iso_error("iso-relabel-partial", "the renaming misses a marking")
                    .with_context("leg", leg)
            })?;
            dmp.insert(renamed, point);
        }
        Self::new(self.stratum.clone(), lg, dmp, self.dlevels.clone())
    }

    /// The embedding with all legs renamed to their standard markings.
    pub fn with_standard_markings(&self) -> Result<Self, StrataError> {
        let map = self
            .standard_markings()
            .into_iter()
            .map(|(leg, name)| (leg, LegId::from_raw(name)))
            .collect();
        self.relabel(&map)
    }

    fn rebuild(&self, lg: LevelGraph) -> Result<Self, StrataError> {
        let dlevels = lg
            .levels()
            .iter()
            .filter_map(|&level| {
                lg.level_number(level)
                    .map(|rank| (level, -(rank as i64)))
            })
            .collect();
        Self::new(self.stratum.clone(), lg, self.dmp.clone(), dlevels)
    }

    /// Contracts all vertical edges between the level at relative position
    /// `relative` and the next one below. An out-of-range position leaves
    /// the embedding unchanged.
    pub fn squish_vertical(&self, relative: i64) -> Result<Self, StrataError> {
        let Some(internal) = self.lg.internal_level_number(relative) else {
            return Ok(self.clone());
        };
        let outcome = self.lg.squish_vertical(internal)?;
        self.rebuild(outcome.graph)
    }

    /// Contracts all level passages except the `|i|`-th one, producing a
    /// two-level graph.
    pub fn delta(&self, i: i64) -> Result<Self, StrataError> {
        let outcome = self.lg.delta(i)?;
        self.rebuild(outcome.graph)
    }

    fn split_data(&self) -> Result<&SplitData, StrataError> {
        self.require_bic()?;
        self.split_cache.get_or_try_init(|| {
            let top = self.level(0)?;
            let bot = self.level(1)?;
            let mut clutch_dict = BTreeMap::new();
            for &edge in self.lg.edges() {
                clutch_dict
                    .insert(top.stratum_number(edge.0)?, bot.stratum_number(edge.1)?);
            }
            let mut emb_top = BTreeMap::new();
            let mut emb_bot = BTreeMap::new();
            let top_level = self.lg.internal_level_number(0);
            for (&leg, &point) in &self.dmp {
                if Some(self.lg.level_of_leg(leg)?) == top_level {
                    emb_top.insert(top.stratum_number(leg)?, point);
                } else {
                    emb_bot.insert(bot.stratum_number(leg)?, point);
                }
            }
            Ok(SplitData { top, bot, clutch_dict, emb_top, emb_bot })
        })
    }

    /// The splitting of a two-level graph into its top and bottom stratum
    /// with clutching and embedding data.
    pub fn split(&self) -> Result<SplitData, StrataError> {
        self.split_data().cloned()
    }

    /// The stratum of the top level of a two-level graph.
    pub fn top(&self) -> Result<Arc<LevelStratum>, StrataError> {
        Ok(Arc::clone(&self.split_data()?.top))
    }

    /// The stratum of the bottom level of a two-level graph.
    pub fn bot(&self) -> Result<Arc<LevelStratum>, StrataError> {
        Ok(Arc::clone(&self.split_data()?.bot))
    }

    /// The edge gluing map of a two-level graph.
    pub fn clutch_dict(&self) -> Result<BTreeMap<StratumPoint, StratumPoint>, StrataError> {
        Ok(self.split_data()?.clutch_dict.clone())
    }

    /// The ambient points of the marked legs on the top level.
    pub fn emb_top(&self) -> Result<BTreeMap<StratumPoint, StratumPoint>, StrataError> {
        Ok(self.split_data()?.emb_top.clone())
    }

    /// The ambient points of the marked legs on the bottom level.
    pub fn emb_bot(&self) -> Result<BTreeMap<StratumPoint, StratumPoint>, StrataError> {
        Ok(self.split_data()?.emb_bot.clone())
    }
}

impl<S: Clone> Clone for EmbeddedLevelGraph<S> {
    fn clone(&self) -> Self {
        Self {
            stratum: self.stratum.clone(),
            lg: self.lg.clone(),
            dmp: self.dmp.clone(),
            dmp_inv: self.dmp_inv.clone(),
            dlevels: self.dlevels.clone(),
            aux: self.aux.clone(),
            automorphism_cache: self.automorphism_cache.clone(),
            split_cache: self.split_cache.clone(),
            ell_cache: self.ell_cache.clone(),
            level_cache: Mutex::new(self.level_cache.lock().clone()),
        }
    }
}

impl<S> PartialEq for EmbeddedLevelGraph<S> {
    fn eq(&self, other: &Self) -> bool {
        self.lg == other.lg && self.dmp == other.dmp && self.dlevels == other.dlevels
    }
}

impl<S> fmt::Debug for EmbeddedLevelGraph<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddedLevelGraph")
            .field("lg", &self.lg)
            .field("dmp", &self.dmp)
            .field("dlevels", &self.dlevels)
            .finish()
    }
}
