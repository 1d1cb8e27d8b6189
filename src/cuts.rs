//! Cuts deciding which MC particles enter the selected collection

use particle_id::ParticleID;

use crate::particle::McParticle;
use crate::truth::{TruthTrack, PRIMARY_GENERATOR};

const K0_LONG: i32 = 130;
const NEUTRON: i32 = 2112;

/// Cut configuration
///
/// All cuts are independent. A candidate is kept only if it passes every
/// active cut.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TrackCuts {
    /// Maximum |η|, non-positive values disable the cut
    pub eta_max: f64,
    /// Reject K⁰_L and neutrons
    pub reject_k0l_and_neutrons: bool,
    /// Keep charged particles only
    pub charged_only: bool,
    /// Keep only tracks from the primary generator
    pub primary_generator_only: bool,
    /// Keep only physical primaries
    pub physical_primary_only: bool,
}

impl Default for TrackCuts {
    fn default() -> Self {
        Self {
            eta_max: 1.,
            reject_k0l_and_neutrons: false,
            charged_only: false,
            primary_generator_only: false,
            physical_primary_only: true,
        }
    }
}

/// The particle properties inspected by the cuts
///
/// Both the raw truth tracks and the flattened particles reduce to this
/// view, so one candidate is cut the same way regardless of where it
/// came from.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Candidate {
    pub id: ParticleID,
    pub eta: f64,
    pub charge: i32,
    pub generator_index: i32,
    pub physical_primary: bool,
}

impl From<(&TruthTrack, bool)> for Candidate {
    fn from((track, physical_primary): (&TruthTrack, bool)) -> Self {
        Self {
            id: track.id,
            eta: track.eta,
            charge: track.charge,
            generator_index: track.generator_index,
            physical_primary,
        }
    }
}

impl From<&McParticle> for Candidate {
    fn from(part: &McParticle) -> Self {
        Self {
            id: part.id,
            eta: part.eta,
            charge: part.charge,
            generator_index: part.generator_index,
            physical_primary: part.is_physical_primary(),
        }
    }
}

impl TrackCuts {
    /// Decide whether a candidate passes all active cuts
    pub fn keep(&self, c: &Candidate) -> bool {
        if self.eta_max > 0. && c.eta.abs() > self.eta_max {
            return false;
        }
        if self.reject_k0l_and_neutrons && (c.id.id() == K0_LONG || c.id.id() == NEUTRON) {
            return false;
        }
        if self.charged_only && c.charge == 0 {
            return false;
        }
        if self.primary_generator_only && c.generator_index != PRIMARY_GENERATOR {
            return false;
        }
        if self.physical_primary_only && !c.physical_primary {
            return false;
        }
        true
    }
}
