use std::cell::RefCell;
use std::collections::hash_map::Entry;
use std::rc::Rc;

use ahash::AHashMap;
use thiserror::Error;

use crate::index_map::TrackIndexMap;
use crate::particle::McParticle;

/// How the MC information of an event is laid out
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum EventFormat {
    /// Only the raw truth record is available
    TruthOnly,
    /// The event carries a flattened MC particle collection
    Flat,
}

/// Shared handle to a particle collection stored in an event
///
/// Analysis code runs single-threaded, one event at a time, so shared
/// ownership with interior mutability is enough. The task that stored the
/// collection is its sole mutator; everyone else only reads.
pub type SharedParticles = Rc<RefCell<Vec<McParticle>>>;

/// Shared handle to a track index map stored in an event
pub type SharedIndexMap = Rc<RefCell<TrackIndexMap>>;

/// An object stored in an event under a name
#[derive(Clone, Debug)]
pub enum EventObject {
    Particles(SharedParticles),
    IndexMap(SharedIndexMap),
}

/// Error storing an object under a name that is already in use
#[derive(Debug, Clone, Error)]
#[error("an object named `{0}` is already stored in the event")]
pub struct NameTaken(pub String);

/// A collision event as seen by analysis tasks
///
/// Besides its format tag the event is a namespace of shared objects.
/// Names are unique, registering is explicit, and a handle stays valid
/// for the whole run: tasks clear and refill their collections in place
/// rather than replacing them.
#[derive(Clone, Debug)]
pub struct Event {
    format: EventFormat,
    objects: AHashMap<String, EventObject>,
}

impl Event {
    pub fn new(format: EventFormat) -> Self {
        Self {
            format,
            objects: AHashMap::new(),
        }
    }

    pub fn format(&self) -> EventFormat {
        self.format
    }

    /// Look up a named object
    pub fn find(&self, name: &str) -> Option<&EventObject> {
        self.objects.get(name)
    }

    /// Store an object under a name
    pub fn publish(
        &mut self,
        name: impl Into<String>,
        object: EventObject,
    ) -> Result<(), NameTaken> {
        match self.objects.entry(name.into()) {
            Entry::Occupied(entry) => Err(NameTaken(entry.key().clone())),
            Entry::Vacant(entry) => {
                entry.insert(object);
                Ok(())
            }
        }
    }
}
