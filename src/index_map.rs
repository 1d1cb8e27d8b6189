/// Map from truth track id to the position of the corresponding entry in
/// the selected collection
///
/// Track ids are dense non-negative integers, so the map is a plain
/// growable array indexed by id. `reset` keeps the backing storage alive
/// between events and grows it to twice the input size whenever an event
/// would not fit, amortizing growth over a run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrackIndexMap {
    slots: Vec<Option<usize>>,
}

impl TrackIndexMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all entries and make room for `tracks` ids
    pub fn reset(&mut self, tracks: usize) {
        self.slots.fill(None);
        if self.slots.len() <= tracks {
            self.slots.resize(tracks * 2, None);
        }
    }

    /// Record that track `track` was selected at position `selected`
    pub fn insert(&mut self, track: usize, selected: usize) {
        if track >= self.slots.len() {
            self.slots.resize(track + 1, None);
        }
        self.slots[track] = Some(selected);
    }

    /// Position in the selected collection, `None` if the track was not
    /// selected
    pub fn get(&self, track: usize) -> Option<usize> {
        self.slots.get(track).copied().flatten()
    }

    /// Size of the backing storage
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}
