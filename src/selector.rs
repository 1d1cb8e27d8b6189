use log::debug;
use thiserror::Error;

use crate::cuts::{Candidate, TrackCuts};
use crate::event::{
    Event, EventFormat, EventObject, NameTaken, SharedIndexMap, SharedParticles,
};
use crate::index_map::TrackIndexMap;
use crate::particle::{McParticle, SelectionFlags, MC_PARTICLES_BRANCH};
use crate::truth::TruthEvent;

/// What the analysis framework provides to a task on each event
pub trait Host {
    /// The event currently being processed
    fn event(&mut self) -> Option<&mut Event>;

    /// The truth record of the current event
    fn truth(&self) -> Option<&dyn TruthEvent>;
}

/// Fatal setup errors
///
/// Any of these aborts the run. Missing individual track records are not
/// errors; such tracks are silently left out of the selection.
#[derive(Debug, Clone, Error)]
pub enum SelectError {
    #[error("no event to process")]
    NoEvent,
    #[error("truth record unavailable")]
    NoTruthEvent,
    #[error(transparent)]
    NameTaken(#[from] NameTaken),
    #[error("MC particle collection `{0}` missing from the event")]
    MissingParticles(String),
    #[error("`{0}` does not hold MC particles")]
    NotParticles(String),
}

/// Fixed on the first event from the event format
enum Strategy {
    /// Convert raw truth tracks into the output schema
    Convert,
    /// Filter an existing flattened collection
    Copy(SharedParticles),
}

struct Active {
    strategy: Strategy,
    out: SharedParticles,
    map: SharedIndexMap,
}

/// Filters MC truth particles into a normalized, compacted collection
///
/// Once per event the selector runs every particle of the event's MC
/// record through its cuts and appends the survivors, in source order, to
/// its output collection. The collection is stored in the event under the
/// configured name; a map from truth track id to output position is
/// stored alongside it under `<name>_Map`.
///
/// Both objects are allocated on the first event and refilled in place
/// afterwards, so consumers may keep the handles across events. Events
/// carrying a flattened MC particle collection are filtered by copying;
/// otherwise the raw truth tracks are converted.
pub struct McTrackSelector {
    out_name: String,
    cuts: TrackCuts,
    active: Option<Active>,
}

impl Default for McTrackSelector {
    fn default() -> Self {
        Self::new(Self::DEFAULT_NAME)
    }
}

impl McTrackSelector {
    pub const DEFAULT_NAME: &'static str = "MCParticlesSelected";

    /// Selector with default cuts, writing to the collection `out_name`
    pub fn new(out_name: impl Into<String>) -> Self {
        Self::with_cuts(out_name, TrackCuts::default())
    }

    pub fn with_cuts(out_name: impl Into<String>, cuts: TrackCuts) -> Self {
        Self {
            out_name: out_name.into(),
            cuts,
            active: None,
        }
    }

    /// Run the selection for the current event
    ///
    /// The first call fixes the input strategy from the event format and
    /// stores the output collections in the event.
    pub fn process(&mut self, host: &mut dyn Host) -> Result<(), SelectError> {
        if self.active.is_none() {
            self.active = Some(init(&self.out_name, host)?);
        }
        if let Some(active) = &self.active {
            match &active.strategy {
                Strategy::Convert => {
                    let truth = host.truth().ok_or(SelectError::NoTruthEvent)?;
                    convert_tracks(
                        truth,
                        &self.cuts,
                        &mut active.out.borrow_mut(),
                        &mut active.map.borrow_mut(),
                    );
                }
                Strategy::Copy(input) => {
                    let input = input.borrow();
                    copy_particles(
                        &input,
                        &self.cuts,
                        &mut active.out.borrow_mut(),
                        &mut active.map.borrow_mut(),
                    );
                }
            }
        }
        Ok(())
    }
}

fn init(out_name: &str, host: &mut dyn Host) -> Result<Active, SelectError> {
    let active = {
        let event = host.event().ok_or(SelectError::NoEvent)?;
        let format = event.format();

        let out = SharedParticles::default();
        event.publish(out_name, EventObject::Particles(out.clone()))?;
        let map = SharedIndexMap::default();
        event.publish(format!("{out_name}_Map"), EventObject::IndexMap(map.clone()))?;

        let strategy = match format {
            EventFormat::TruthOnly => Strategy::Convert,
            EventFormat::Flat => {
                let input = match event.find(MC_PARTICLES_BRANCH) {
                    Some(EventObject::Particles(input)) => input.clone(),
                    Some(_) => {
                        return Err(SelectError::NotParticles(MC_PARTICLES_BRANCH.into()))
                    }
                    None => {
                        return Err(SelectError::MissingParticles(MC_PARTICLES_BRANCH.into()))
                    }
                };
                Strategy::Copy(input)
            }
        };
        debug!("storing selected MC particles as `{out_name}` ({format:?} input)");
        Active { strategy, out, map }
    };
    if host.truth().is_none() {
        return Err(SelectError::NoTruthEvent);
    }
    Ok(active)
}

fn convert_tracks(
    truth: &dyn TruthEvent,
    cuts: &TrackCuts,
    out: &mut Vec<McParticle>,
    map: &mut TrackIndexMap,
) {
    out.clear();
    let ntracks = truth.track_count();
    let nprim = truth.primary_count();
    map.reset(ntracks);

    let mut nacc = 0;
    for id in 0..ntracks {
        let Some(track) = truth.track(id) else {
            continue;
        };
        let physical_primary = truth.is_physical_primary(id);
        if !cuts.keep(&Candidate::from((&track, physical_primary))) {
            continue;
        }
        map.insert(id, nacc);

        let mut flags = SelectionFlags::empty();
        if id < nprim {
            flags |= SelectionFlags::PRIMARY;
        }
        if physical_primary {
            flags |= SelectionFlags::PHYSICAL_PRIMARY;
        }
        if truth.is_secondary_from_weak_decay(id) {
            flags |= SelectionFlags::SECONDARY_FROM_WEAK_DECAY;
        }
        if truth.is_secondary_from_material(id) {
            flags |= SelectionFlags::SECONDARY_FROM_MATERIAL;
        }
        out.push(McParticle::from((&track, id, flags)));
        nacc += 1;
    }
}

fn copy_particles(
    input: &[McParticle],
    cuts: &TrackCuts,
    out: &mut Vec<McParticle>,
    map: &mut TrackIndexMap,
) {
    out.clear();
    map.reset(input.len());

    let mut nacc = 0;
    for (pos, part) in input.iter().enumerate() {
        if !cuts.keep(&Candidate::from(part)) {
            continue;
        }
        map.insert(pos, nacc);
        out.push(part.clone());
        nacc += 1;
    }
}
