//! Pattern tracking: creation, merging, and completion detection.
//!
//! A pattern is a connected region of one terrain spanning one or more tiles.
//! Patterns live in a slot map and every placed tile segment stores the key of
//! the pattern it belongs to. Merging moves the members of the smaller pattern
//! into the larger one and rewrites their keys.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde::Serialize;
use slotmap::{new_key_type, SlotMap};

use super::players::PlayerId;
use super::tile::Tile;
use super::types::*;

new_key_type! {
    /// Stable handle of a pattern in the tracker arena.
    pub struct PatternId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternStatus {
    Open,
    /// Closed during play; scored at full value.
    Complete,
    /// Closed by the end-of-game pass; scored at reduced value.
    ForceClosed,
}

/// One tile segment that belongs to a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SegmentRef {
    pub coord: Coord,
    pub segment: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlacedMeeple {
    pub owner: PlayerId,
    pub coord: Coord,
    pub position: Direction,
}

#[derive(Debug, Clone)]
pub struct GridPattern {
    terrain: TerrainType,
    members: Vec<SegmentRef>,
    tiles: BTreeSet<Coord>,
    /// Castle and road edges not yet joined to a neighbour.
    open_edges: HashSet<(Coord, Direction)>,
    shields: u32,
    meeples: Vec<PlacedMeeple>,
    status: PatternStatus,
    scored: bool,
}

impl GridPattern {
    pub fn terrain(&self) -> TerrainType {
        self.terrain
    }

    pub fn members(&self) -> &[SegmentRef] {
        &self.members
    }

    pub fn tiles(&self) -> impl Iterator<Item = Coord> + '_ {
        self.tiles.iter().copied()
    }

    /// Number of distinct tiles the pattern spans.
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn shields(&self) -> u32 {
        self.shields
    }

    pub fn open_edge_count(&self) -> usize {
        self.open_edges.len()
    }

    pub fn meeples(&self) -> &[PlacedMeeple] {
        &self.meeples
    }

    pub fn meeple_count(&self) -> usize {
        self.meeples.len()
    }

    /// Meeples per owner.
    pub fn meeple_counts(&self) -> BTreeMap<PlayerId, u32> {
        let mut counts = BTreeMap::new();
        for m in &self.meeples {
            *counts.entry(m.owner).or_insert(0) += 1;
        }
        counts
    }

    pub fn is_claimed(&self) -> bool {
        !self.meeples.is_empty()
    }

    pub fn status(&self) -> PatternStatus {
        self.status
    }

    pub fn is_open(&self) -> bool {
        self.status == PatternStatus::Open
    }

    pub fn is_complete(&self) -> bool {
        self.status == PatternStatus::Complete
    }

    pub fn is_scored(&self) -> bool {
        self.scored
    }

    pub(crate) fn add_meeple(&mut self, meeple: PlacedMeeple) {
        assert!(!self.scored, "meeple placed on an already scored pattern");
        self.meeples.push(meeple);
    }

    pub(crate) fn take_meeples(&mut self) -> Vec<PlacedMeeple> {
        std::mem::take(&mut self.meeples)
    }

    pub(crate) fn mark_scored(&mut self) {
        assert!(!self.scored, "pattern scored twice");
        self.scored = true;
    }
}

impl std::fmt::Display for GridPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:?} pattern [{:?}, {} tiles, {} meeples, {} open edges]",
            self.terrain,
            self.status,
            self.tiles.len(),
            self.meeples.len(),
            self.open_edges.len(),
        )
    }
}

/// A pair of segments that touch across the edge of a newly placed tile.
struct Join {
    own: SegmentRef,
    theirs: SegmentRef,
    /// Set when the join is between edge positions, which closes both edges.
    edge: Option<Direction>,
}

#[derive(Debug, Clone, Default)]
pub struct PatternTracker {
    patterns: SlotMap<PatternId, GridPattern>,
    /// Completions not yet taken by the caller.
    completed: Vec<PatternId>,
}

impl PatternTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: PatternId) -> Option<&GridPattern> {
        self.patterns.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: PatternId) -> Option<&mut GridPattern> {
        self.patterns.get_mut(id)
    }

    /// All live patterns in a stable order.
    pub fn iter(&self) -> impl Iterator<Item = (PatternId, &GridPattern)> {
        self.patterns.iter()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Patterns completed since the last call.
    pub fn take_completed(&mut self) -> Vec<PatternId> {
        std::mem::take(&mut self.completed)
    }

    /// Add the segments of the tile at `coord` and merge them with their
    /// neighbours. Returns the patterns completed by this placement.
    pub(crate) fn integrate(
        &mut self,
        tiles: &mut HashMap<Coord, Tile>,
        coord: Coord,
    ) -> Vec<PatternId> {
        self.create_tile_patterns(tiles, coord);

        let joins = collect_joins(tiles, coord);
        for join in joins {
            let a = pattern_of(tiles, join.own);
            let b = pattern_of(tiles, join.theirs);
            if self.patterns[a].terrain != self.patterns[b].terrain {
                continue;
            }
            let merged = self.union(tiles, a, b);
            if let Some(edge) = join.edge {
                let pattern = &mut self.patterns[merged];
                pattern.open_edges.remove(&(coord, edge));
                pattern.open_edges.remove(&(coord.neighbor(edge), edge.opposite()));
            }
        }

        self.detect_completion(tiles, coord)
    }

    /// Close an open pattern at game end.
    pub(crate) fn force_close(&mut self, id: PatternId) {
        let pattern = &mut self.patterns[id];
        assert!(
            pattern.is_open(),
            "force-closing a pattern that is already {:?}",
            pattern.status
        );
        pattern.status = PatternStatus::ForceClosed;
    }

    fn create_tile_patterns(&mut self, tiles: &mut HashMap<Coord, Tile>, coord: Coord) {
        let tile = tiles
            .get_mut(&coord)
            .expect("patterns are only created for placed tiles");

        for segment in 0..tile.segment_count() {
            let def = tile.segment(segment);
            let open_edges: HashSet<(Coord, Direction)> =
                if matches!(def.terrain, TerrainType::Castle | TerrainType::Road) {
                    tile.segment_positions(segment)
                        .filter(|p| p.is_edge())
                        .map(|p| (coord, p))
                        .collect()
                } else {
                    HashSet::new()
                };

            let id = self.patterns.insert(GridPattern {
                terrain: def.terrain,
                members: vec![SegmentRef { coord, segment }],
                tiles: BTreeSet::from([coord]),
                open_edges,
                shields: u32::from(def.shield),
                meeples: Vec::new(),
                status: PatternStatus::Open,
                scored: false,
            });
            tile.set_segment_pattern(segment, id);
        }
    }

    /// Merge two patterns. The one with fewer members is absorbed; on a tie
    /// `b`, the pattern already on the board, survives.
    fn union(&mut self, tiles: &mut HashMap<Coord, Tile>, a: PatternId, b: PatternId) -> PatternId {
        if a == b {
            return a;
        }
        let (keep, absorb) = if self.patterns[a].members.len() > self.patterns[b].members.len() {
            (a, b)
        } else {
            (b, a)
        };

        let absorbed = self
            .patterns
            .remove(absorb)
            .expect("absorbed pattern is live");
        for member in &absorbed.members {
            if let Some(tile) = tiles.get_mut(&member.coord) {
                tile.set_segment_pattern(member.segment, keep);
            }
        }

        let survivor = &mut self.patterns[keep];
        debug_assert_eq!(survivor.terrain, absorbed.terrain);
        survivor.members.extend(absorbed.members);
        survivor.tiles.extend(absorbed.tiles);
        survivor.open_edges.extend(absorbed.open_edges);
        survivor.shields += absorbed.shields;
        survivor.meeples.extend(absorbed.meeples);

        tracing::trace!(
            terrain = ?survivor.terrain,
            members = survivor.members.len(),
            meeples = survivor.meeples.len(),
            "patterns merged"
        );
        keep
    }

    /// Check patterns on the placed tile and monasteries around it.
    fn detect_completion(&mut self, tiles: &HashMap<Coord, Tile>, coord: Coord) -> Vec<PatternId> {
        let mut candidates = tiles[&coord].patterns();
        for around in coord.all_surrounding() {
            let Some(tile) = tiles.get(&around) else {
                continue;
            };
            if let Some(id) = tile.pattern_at(Direction::Middle) {
                if self.patterns[id].terrain == TerrainType::Monastery && !candidates.contains(&id) {
                    candidates.push(id);
                }
            }
        }

        let mut newly_completed = Vec::new();
        for id in candidates {
            let pattern = &mut self.patterns[id];
            if !pattern.is_open() || !is_pattern_complete(pattern, tiles) {
                continue;
            }
            pattern.status = PatternStatus::Complete;
            tracing::debug!(
                terrain = ?pattern.terrain,
                tiles = pattern.tiles.len(),
                meeples = pattern.meeples.len(),
                "pattern completed"
            );
            newly_completed.push(id);
            self.completed.push(id);
        }
        newly_completed
    }
}

/// Check whether a pattern is topologically closed on the current board.
pub fn is_pattern_complete(pattern: &GridPattern, tiles: &HashMap<Coord, Tile>) -> bool {
    match pattern.terrain {
        TerrainType::Fields | TerrainType::Other => false,
        TerrainType::Monastery => pattern
            .tiles
            .iter()
            .next()
            .map(|center| center.all_surrounding().all(|c| tiles.contains_key(&c)))
            .unwrap_or(false),
        TerrainType::Castle | TerrainType::Road => pattern.open_edges.is_empty(),
    }
}

fn pattern_of(tiles: &HashMap<Coord, Tile>, segment: SegmentRef) -> PatternId {
    tiles[&segment.coord]
        .pattern_of_segment(segment.segment)
        .expect("every placed segment belongs to a pattern")
}

/// Find all segment pairs connecting the tile at `coord` to its neighbours.
fn collect_joins(tiles: &HashMap<Coord, Tile>, coord: Coord) -> Vec<Join> {
    let tile = &tiles[&coord];
    let mut joins = Vec::new();

    for edge in Direction::EDGES {
        let neighbor_coord = coord.neighbor(edge);
        let Some(neighbor) = tiles.get(&neighbor_coord) else {
            continue;
        };
        let facing = edge.opposite();
        let edge_terrain = tile.terrain(edge);
        if !edge_terrain.matches(neighbor.terrain(facing)) {
            continue;
        }

        let mut pairs = vec![(edge, facing, true)];
        if edge_terrain == TerrainType::Road {
            // The fields on either side of a road continue past the edge.
            for &corner in edge.flanking_corners() {
                pairs.push((corner, corner.mirror_across(edge), false));
            }
        }

        for (own, theirs, is_edge) in pairs {
            let (Some(own_segment), Some(their_segment)) =
                (tile.segment_at(own), neighbor.segment_at(theirs))
            else {
                continue;
            };
            joins.push(Join {
                own: SegmentRef { coord, segment: own_segment },
                theirs: SegmentRef { coord: neighbor_coord, segment: their_segment },
                edge: is_edge.then_some(edge),
            });
        }
    }

    joins
}
