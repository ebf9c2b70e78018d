use std::collections::{BTreeMap, BTreeSet, VecDeque};

use fuzzer_model::{ExternalOp, InternalEndpoint, InternalOperation};

/// One confidence layer of the reachability map (§4.7): both directions are
/// maintained explicitly, no back-references, so every mutator updates
/// both (§9).
///
/// Keyed with `BTreeMap` rather than `HashMap` for the same reason as
/// `DependencyGraph` (`ExternalOp` carries non-`Hash` schema `Value`s but
/// does implement a total `Ord`).
#[derive(Debug, Clone, Default)]
struct ReachabilityLayer {
    external_to_internal: BTreeMap<ExternalOp, Vec<InternalEndpoint>>,
    internal_to_external: BTreeMap<InternalEndpoint, Vec<ExternalOp>>,
}

impl ReachabilityLayer {
    fn insert(&mut self, external: ExternalOp, internal: InternalEndpoint) {
        self.external_to_internal
            .entry(external.clone())
            .or_default()
            .push(internal.clone());
        self.internal_to_external.entry(internal).or_default().push(external);
    }

    fn reachable_internals(&self, external: &ExternalOp) -> &[InternalEndpoint] {
        self.external_to_internal
            .get(external)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn reachable_externals(&self, internal: &InternalEndpoint) -> &[ExternalOp] {
        self.internal_to_external
            .get(internal)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Bidirectional map between external operations and the internal
/// endpoints they transitively call, split by confidence (§4.7).
///
/// High-confidence entries come from successful execution + trace
/// conversion (populated by the fuzzer loop as it runs); low-confidence
/// entries come from static inference at startup (`seed_low_confidence`).
#[derive(Debug, Clone, Default)]
pub struct ReachabilityMap {
    high_confidence: ReachabilityLayer,
    low_confidence: ReachabilityLayer,
}

impl ReachabilityMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one `(external, internal)` association at the given
    /// confidence. Per §9 Open Question #2, duplicate entries are *not*
    /// suppressed here — tests must not depend on exact list lengths.
    pub fn insert(&mut self, external: ExternalOp, internal: InternalEndpoint, high_confidence: bool) {
        let layer = if high_confidence {
            &mut self.high_confidence
        } else {
            &mut self.low_confidence
        };
        layer.insert(external, internal);
    }

    /// Reachable internal endpoints for `external`. `high_confidence_only`
    /// (§4.1.1 Pass B requires this for the scenario's own ops) restricts
    /// to the high-confidence layer; otherwise both layers are unioned.
    pub fn reachable_internals(&self, external: &ExternalOp, high_confidence_only: bool) -> Vec<InternalEndpoint> {
        if high_confidence_only {
            return self.high_confidence.reachable_internals(external).to_vec();
        }
        let mut out = self.high_confidence.reachable_internals(external).to_vec();
        out.extend_from_slice(self.low_confidence.reachable_internals(external));
        out
    }

    /// External operations that reach `internal`, across whichever
    /// confidence layers `high_confidence_only` selects (§4.1.1 Pass B:
    /// "in either confidence layer").
    pub fn reachable_externals(&self, internal: &InternalEndpoint, high_confidence_only: bool) -> Vec<ExternalOp> {
        if high_confidence_only {
            return self.high_confidence.reachable_externals(internal).to_vec();
        }
        let mut out = self.high_confidence.reachable_externals(internal).to_vec();
        out.extend_from_slice(self.low_confidence.reachable_externals(internal));
        out
    }

    /// Every `(external, internal)` pair in the high-confidence layer, for
    /// the persisted internal-service report (§6: "high-confidence
    /// reachability map").
    pub fn high_confidence_pairs(&self) -> Vec<(ExternalOp, InternalEndpoint)> {
        self.high_confidence
            .external_to_internal
            .iter()
            .flat_map(|(external, internals)| internals.iter().map(move |internal| (external.clone(), internal.clone())))
            .collect()
    }

    /// Bidirectional-consistency check used by property tests (§8):
    /// `external ∈ Internal2External[internal] ⇔ internal ∈ External2Internal[external]`.
    pub fn is_consistent(&self) -> bool {
        Self::layer_consistent(&self.high_confidence) && Self::layer_consistent(&self.low_confidence)
    }

    fn layer_consistent(layer: &ReachabilityLayer) -> bool {
        for (external, internals) in &layer.external_to_internal {
            for internal in internals {
                if !layer.internal_to_external.get(internal).is_some_and(|v| v.contains(external)) {
                    return false;
                }
            }
        }
        for (internal, externals) in &layer.internal_to_external {
            for external in externals {
                if !layer.external_to_internal.get(external).is_some_and(|v| v.contains(internal)) {
                    return false;
                }
            }
        }
        true
    }

    /// Seed the low-confidence layer by parameter/body name matching
    /// between external and internal operations, then a BFS over the
    /// static dataflow graph to add every transitively-reachable internal
    /// endpoint (§4.7: "populated from static dataflow-graph BFS").
    pub fn seed_low_confidence(
        &mut self,
        external_ops: &[ExternalOp],
        internal_ops: &[InternalOperation],
        dataflow_edges: &[(InternalEndpoint, InternalEndpoint)],
    ) {
        let mut adjacency: BTreeMap<InternalEndpoint, Vec<InternalEndpoint>> = BTreeMap::new();
        for (src, dst) in dataflow_edges {
            adjacency.entry(src.clone()).or_default().push(dst.clone());
        }

        for external in external_ops {
            let names = name_surface(external.param_names_all(), external.body_property_names());
            let seeds: Vec<InternalEndpoint> = internal_ops
                .iter()
                .filter(|internal| {
                    let internal_names =
                        name_surface(internal.param_names_all(), internal.body_property_names());
                    names.intersection(&internal_names).next().is_some()
                })
                .map(|internal| internal.key.clone())
                .collect();

            for seed in &seeds {
                self.insert(external.clone(), seed.clone(), false);
            }

            for reachable in bfs(&seeds, &adjacency) {
                self.insert(external.clone(), reachable, false);
            }
        }
    }
}

fn name_surface(params: Vec<&str>, body: Vec<String>) -> BTreeSet<String> {
    let mut set: BTreeSet<String> = params.into_iter().map(String::from).collect();
    set.extend(body);
    set
}

fn bfs(
    seeds: &[InternalEndpoint],
    adjacency: &BTreeMap<InternalEndpoint, Vec<InternalEndpoint>>,
) -> Vec<InternalEndpoint> {
    let mut visited: BTreeSet<InternalEndpoint> = seeds.iter().cloned().collect();
    let mut queue: VecDeque<InternalEndpoint> = seeds.iter().cloned().collect();
    let mut reached = Vec::new();

    while let Some(current) = queue.pop_front() {
        let Some(neighbors) = adjacency.get(&current) else { continue };
        for neighbor in neighbors {
            if visited.insert(neighbor.clone()) {
                reached.push(neighbor.clone());
                queue.push_back(neighbor.clone());
            }
        }
    }
    reached
}
