use std::collections::BTreeSet;
use std::f64::consts::PI;

use crate::component::{ComponentSet, ElementType, SelectionCollection, SelectionUpdate};
use crate::config::{CoplanarConfig, Preferences, Tolerance};
use crate::error::{Result, SelectionError};
use crate::math::{angle_between, is_equivalent, Vector3};
use crate::topology::{MeshRef, Topology};

use super::convert::Convert;
use super::partition::{Partition, ShellGroup};

/// Where coplanar growth may reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoplanarMode {
    /// Faces reachable from the seed through faces that pass the test.
    Contiguous,
    /// Every normal bucket of the seed mesh that passes the test.
    Object,
    /// Every face of the hilited meshes within an angular bound.
    Hilited,
}

/// Faces found by one growth pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Growth {
    pub selection: SelectionCollection,
    /// Ring expansions that accepted at least one face (contiguous mode).
    pub passes: usize,
}

/// The selected faces of one mesh and the normal they grow against.
#[derive(Debug)]
struct Seed {
    faces: ComponentSet,
    normal: Vector3,
    /// Normal buckets of the whole mesh (object mode).
    buckets: Vec<ShellGroup>,
}

/// State frozen at the start of one coplanar gesture.
#[derive(Debug)]
pub struct CoplanarSession {
    mode: CoplanarMode,
    original: SelectionCollection,
    seeds: Vec<Seed>,
    tolerance: Tolerance,
    config: CoplanarConfig,
    candidates: Vec<(MeshRef, Vec<(u32, Vector3)>)>,
}

impl CoplanarSession {
    /// Starts a gesture seeded by every face component of `selection`.
    ///
    /// Each mesh grows against the normal of its first selected face. The
    /// tolerance starts at the persisted default. Object mode partitions each
    /// seed mesh by normal once here; hilited mode caches the normals of every
    /// hilited mesh (the seed meshes if none is hilited) and compares them
    /// with the first seed's normal.
    ///
    /// # Errors
    ///
    /// Returns an error if the selection holds no face, or the persisted
    /// default lies outside the configured bounds.
    pub fn begin<T: Topology + ?Sized>(
        topology: &T,
        selection: &SelectionCollection,
        mode: CoplanarMode,
        preferences: &Preferences,
        hilited: &[MeshRef],
        config: &CoplanarConfig,
    ) -> Result<Self> {
        let mut seeds = Vec::new();
        for faces in selection.merged().iter() {
            if faces.element() != ElementType::Face {
                continue;
            }
            let mesh = faces.mesh();
            let Some(&first) = faces
                .resolve(topology.element_count(mesh, ElementType::Face))
                .first()
            else {
                continue;
            };
            let buckets = if mode == CoplanarMode::Object {
                Partition::new(ComponentSet::complete(mesh, ElementType::Face))
                    .keyed(true)
                    .execute(topology)?
            } else {
                Vec::new()
            };
            seeds.push(Seed {
                faces: faces.clone(),
                normal: topology.face_normal(mesh, first),
                buckets,
            });
        }
        if seeds.is_empty() {
            return Err(SelectionError::NoValidSeed.into());
        }
        let tolerance = Tolerance::coplanar(config, preferences.coplanar_threshold)?;

        let candidates = if mode == CoplanarMode::Hilited {
            let meshes = if hilited.is_empty() {
                seeds.iter().map(|seed| seed.faces.mesh()).collect()
            } else {
                hilited.to_vec()
            };
            meshes
                .into_iter()
                .map(|m| {
                    let count = topology.element_count(m, ElementType::Face);
                    let normals = (0..count)
                        .filter_map(|f| u32::try_from(f).ok())
                        .map(|f| (f, topology.face_normal(m, f)))
                        .collect();
                    (m, normals)
                })
                .collect()
        } else {
            Vec::new()
        };

        tracing::debug!(
            ?mode,
            seeds = seeds.len(),
            buckets = seeds.iter().map(|seed| seed.buckets.len()).sum::<usize>(),
            "coplanar gesture started"
        );
        Ok(Self {
            mode,
            original: selection.clone(),
            seeds,
            tolerance,
            config: config.clone(),
            candidates,
        })
    }

    #[must_use]
    pub fn mode(&self) -> CoplanarMode {
        self.mode
    }

    #[must_use]
    pub fn tolerance(&self) -> &Tolerance {
        &self.tolerance
    }

    /// Sets the live tolerance, clamped to the configured bounds.
    pub fn set_threshold(&mut self, value: f64) {
        self.tolerance.set_live(value);
    }

    /// Moves the live tolerance by a gesture delta from the anchor.
    pub fn drag(&mut self, delta: f64) {
        self.tolerance.drag(delta, self.config.drag_scale);
    }

    /// The selection to apply for the live tolerance.
    ///
    /// # Errors
    ///
    /// Propagates conversion and set-combination errors.
    pub fn update<T: Topology + ?Sized>(&self, topology: &T) -> Result<SelectionUpdate> {
        Ok(SelectionUpdate::Replace(self.grow(topology)?.selection))
    }

    /// Recomputes the grown faces from the frozen seeds.
    ///
    /// # Errors
    ///
    /// Propagates conversion and set-combination errors.
    pub fn grow<T: Topology + ?Sized>(&self, topology: &T) -> Result<Growth> {
        let live = self.tolerance.live();
        let mut selection = SelectionCollection::new();
        let mut passes = 0;
        match self.mode {
            CoplanarMode::Contiguous => {
                let threshold = live * self.config.contiguous_factor;
                for seed in &self.seeds {
                    let (faces, seed_passes) = grow_contiguous(topology, seed, threshold)?;
                    selection.add(faces)?;
                    passes = passes.max(seed_passes);
                }
            }
            CoplanarMode::Object => {
                for seed in &self.seeds {
                    let mut faces = seed.faces.clone();
                    for bucket in &seed.buckets {
                        let Some(normal) = bucket.normal else {
                            continue;
                        };
                        if is_equivalent(&seed.normal, &normal, live) {
                            faces = faces.union(&bucket.components)?;
                        }
                    }
                    selection.add(faces)?;
                }
            }
            CoplanarMode::Hilited => {
                let bound = live * PI;
                let seed_normal = self.seeds[0].normal;
                for seed in &self.seeds {
                    selection.add(seed.faces.clone())?;
                }
                for (mesh, normals) in &self.candidates {
                    let matching: Vec<u32> = normals
                        .iter()
                        .filter(|(_, n)| angle_between(&seed_normal, n) <= bound)
                        .map(|&(f, _)| f)
                        .collect();
                    if !matching.is_empty() {
                        selection.add(ComponentSet::from_indices(*mesh, ElementType::Face, matching))?;
                    }
                }
            }
        }
        Ok(Growth { selection, passes })
    }

    /// Ends the gesture, persisting the live tolerance as the new default.
    pub fn commit(mut self, preferences: &mut Preferences) -> f64 {
        self.tolerance.commit();
        preferences.coplanar_threshold = self.tolerance.default_value();
        preferences.coplanar_threshold
    }

    /// Aborts the gesture, returning the selection to restore.
    #[must_use]
    pub fn cancel(self) -> SelectionUpdate {
        SelectionUpdate::Replace(self.original)
    }
}

/// Grows one seed ring by ring until no neighbouring face passes the test.
fn grow_contiguous<T: Topology + ?Sized>(
    topology: &T,
    seed: &Seed,
    threshold: f64,
) -> Result<(ComponentSet, usize)> {
    let mesh = seed.faces.mesh();
    let mut accepted = seed.faces.resolve(topology.element_count(mesh, ElementType::Face));
    let mut frontier = accepted.clone();
    let mut passes = 0;

    loop {
        let ring = ring_around(topology, &seed.faces, &frontier)?;
        let added: BTreeSet<u32> = ring
            .into_iter()
            .filter(|f| !accepted.contains(f))
            .filter(|&f| is_equivalent(&seed.normal, &topology.face_normal(mesh, f), threshold))
            .collect();
        if added.is_empty() {
            break;
        }
        passes += 1;
        accepted.extend(&added);
        frontier = added;
    }

    tracing::debug!(faces = accepted.len(), passes, threshold, "contiguous growth converged");
    Ok((ComponentSet::from_indices(mesh, ElementType::Face, accepted), passes))
}

/// Faces sharing a vertex with `faces`, on the mesh of `seed`.
fn ring_around<T: Topology + ?Sized>(
    topology: &T,
    seed: &ComponentSet,
    faces: &BTreeSet<u32>,
) -> Result<BTreeSet<u32>> {
    let Some(frontier) = seed.with_indices(faces.iter().copied()) else {
        return Ok(BTreeSet::new());
    };
    let Some(vertices) = Convert::new(frontier.clone(), ElementType::Vertex)
        .execute(topology)?
        .into_set(&frontier)
    else {
        return Ok(BTreeSet::new());
    };
    let grown = Convert::new(vertices.clone(), ElementType::Face)
        .execute(topology)?
        .into_set(&vertices);
    Ok(grown
        .filter(|set| set.mesh() == seed.mesh())
        .map(|set| set.indices().clone())
        .unwrap_or_default())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::component::Pick;
    use crate::error::MeshselError;
    use crate::topology::fixtures::{flat_block, two_islands, FLAT_FACES};
    use crate::topology::{MeshStore, PolyMesh};

    fn seeded(mesh: PolyMesh, face: u32) -> (MeshStore, MeshRef, SelectionCollection) {
        let mut store = MeshStore::new();
        let id = store.add_mesh(mesh);
        let selection = SelectionCollection::from_picks([Pick::new(id, ElementType::Face, face)]);
        (store, id, selection)
    }

    fn begin(
        store: &MeshStore,
        selection: &SelectionCollection,
        mode: CoplanarMode,
        threshold: f64,
    ) -> CoplanarSession {
        let prefs = Preferences {
            coplanar_threshold: threshold,
            ..Preferences::default()
        };
        CoplanarSession::begin(store, selection, mode, &prefs, &[], &CoplanarConfig::default())
            .unwrap()
    }

    fn grown_faces(growth: &Growth, mesh: MeshRef) -> BTreeSet<u32> {
        growth
            .selection
            .get(mesh, ElementType::Face)
            .map(|s| s.indices().clone())
            .unwrap_or_default()
    }

    #[test]
    fn flat_block_converges_in_one_pass() {
        let (store, mesh, selection) = seeded(flat_block(), FLAT_FACES[0]);
        let session = begin(&store, &selection, CoplanarMode::Contiguous, 0.1);
        let growth = session.grow(&store).unwrap();
        assert_eq!(grown_faces(&growth, mesh), BTreeSet::from(FLAT_FACES));
        assert_eq!(growth.passes, 1);
    }

    #[test]
    fn growth_is_monotone_in_tolerance() {
        let (store, mesh, selection) = seeded(PolyMesh::tube(8, 2, 1.0, 1.0), 0);
        let mut session = begin(&store, &selection, CoplanarMode::Contiguous, 0.0);
        let mut previous = BTreeSet::new();
        for t in [0.0, 0.2, 0.4, 0.6, 0.8, 1.0] {
            session.set_threshold(t);
            let faces = grown_faces(&session.grow(&store).unwrap(), mesh);
            assert!(previous.is_subset(&faces), "shrank at {t}");
            previous = faces;
        }
        assert!(previous.len() > 2);
    }

    #[test]
    fn lowering_threshold_shrinks_result() {
        let (store, mesh, selection) = seeded(PolyMesh::tube(8, 1, 1.0, 1.0), 0);
        let mut session = begin(&store, &selection, CoplanarMode::Contiguous, 0.5);
        let wide = grown_faces(&session.grow(&store).unwrap(), mesh);
        session.set_threshold(0.05);
        let narrow = grown_faces(&session.grow(&store).unwrap(), mesh);
        assert!(narrow.len() < wide.len());
        assert_eq!(narrow, BTreeSet::from([0]));
    }

    #[test]
    fn object_mode_reaches_disconnected_faces() {
        let (store, mesh, selection) = seeded(two_islands(), 0);
        let contiguous = begin(&store, &selection, CoplanarMode::Contiguous, 0.1);
        let object = begin(&store, &selection, CoplanarMode::Object, 0.1);

        assert_eq!(grown_faces(&contiguous.grow(&store).unwrap(), mesh), BTreeSet::from([0]));
        assert_eq!(grown_faces(&object.grow(&store).unwrap(), mesh), BTreeSet::from([0, 1]));
    }

    #[test]
    fn object_mode_filters_buckets() {
        let (store, mesh, selection) = seeded(flat_block(), FLAT_FACES[3]);
        let session = begin(&store, &selection, CoplanarMode::Object, 0.1);
        assert_eq!(
            grown_faces(&session.grow(&store).unwrap(), mesh),
            BTreeSet::from(FLAT_FACES)
        );
    }

    #[test]
    fn hilited_mode_uses_angular_bound() {
        let (store, mesh, selection) = seeded(flat_block(), FLAT_FACES[1]);
        let mut session = begin(&store, &selection, CoplanarMode::Hilited, 0.1);
        assert_eq!(
            grown_faces(&session.grow(&store).unwrap(), mesh),
            BTreeSet::from(FLAT_FACES)
        );
        // 45° slopes pass once the bound reaches a quarter turn
        session.set_threshold(0.5);
        assert!(grown_faces(&session.grow(&store).unwrap(), mesh).len() > 4);
    }

    #[test]
    fn every_selected_mesh_grows() {
        let mut store = MeshStore::new();
        let a = store.add_mesh(PolyMesh::grid(2, 2, 1.0));
        let b = store.add_mesh(flat_block());
        let selection = SelectionCollection::from_picks([
            Pick::new(a, ElementType::Face, 0),
            Pick::new(b, ElementType::Face, FLAT_FACES[2]),
        ]);

        for mode in [CoplanarMode::Contiguous, CoplanarMode::Object] {
            let session = begin(&store, &selection, mode, 0.1);
            let growth = session.grow(&store).unwrap();
            assert_eq!(grown_faces(&growth, a), BTreeSet::from([0, 1, 2, 3]), "{mode:?}");
            assert_eq!(grown_faces(&growth, b), BTreeSet::from(FLAT_FACES), "{mode:?}");
        }
    }

    #[test]
    fn edge_selection_has_no_seed() {
        let mut store = MeshStore::new();
        let mesh = store.add_mesh(PolyMesh::grid(2, 2, 1.0));
        let selection = SelectionCollection::from_picks([Pick::new(mesh, ElementType::Edge, 0)]);
        let err = CoplanarSession::begin(
            &store,
            &selection,
            CoplanarMode::Contiguous,
            &Preferences::default(),
            &[],
            &CoplanarConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            MeshselError::Selection(SelectionError::NoValidSeed)
        ));
    }

    #[test]
    fn commit_persists_and_cancel_restores() {
        let (store, _, selection) = seeded(flat_block(), FLAT_FACES[0]);
        let mut prefs = Preferences::default();

        let mut session = begin(&store, &selection, CoplanarMode::Contiguous, 0.1);
        session.drag(100.0);
        assert!((session.tolerance().live() - 0.2).abs() < 1e-12);
        assert_eq!(session.cancel(), SelectionUpdate::Replace(selection.clone()));
        assert!((prefs.coplanar_threshold - 0.1).abs() < 1e-12);

        let mut session = begin(&store, &selection, CoplanarMode::Contiguous, 0.1);
        session.drag(100.0);
        let committed = session.commit(&mut prefs);
        assert!((committed - 0.2).abs() < 1e-12);
        assert!((prefs.coplanar_threshold - 0.2).abs() < 1e-12);
    }
}
