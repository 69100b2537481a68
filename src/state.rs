use crate::config::CounterLookup;
use crate::models::{
    CounterElement, CounterKey, LikeableElement, PageSnapshot, ResourceId, ToggleOutcome,
};
use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};
use tokio::{sync::Mutex, task::AbortHandle};
use tracing::warn;

/// In-memory record of the page: every likeable element and counter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Board {
    order: Vec<ResourceId>,
    elements: BTreeMap<ResourceId, LikeableElement>,
    counters: HashMap<CounterKey, CounterElement>,
}

impl Board {
    pub fn from_snapshot(snapshot: &PageSnapshot) -> Self {
        let mut board = Self::default();
        for element in &snapshot.elements {
            if board.elements.contains_key(&element.id) {
                warn!("duplicate likeable element {}, keeping the first", element.id);
                continue;
            }
            board.order.push(element.id.clone());
            board.elements.insert(
                element.id.clone(),
                LikeableElement {
                    id: element.id.clone(),
                    action: element.action,
                    url: element.url.clone(),
                },
            );
        }
        if let Some(total) = &snapshot.total {
            board
                .counters
                .insert(CounterKey::Shared, CounterElement::new(total.as_str()));
        }
        for (id, text) in &snapshot.counters {
            board.counters.insert(
                CounterKey::Resource(ResourceId::new(id.as_str())),
                CounterElement::new(text.as_str()),
            );
        }
        board
    }

    /// Elements in document order.
    pub fn elements(&self) -> impl Iterator<Item = &LikeableElement> {
        self.order.iter().filter_map(|id| self.elements.get(id))
    }

    pub fn element(&self, id: &ResourceId) -> Option<&LikeableElement> {
        self.elements.get(id)
    }

    pub fn first(&self) -> Option<&LikeableElement> {
        self.elements().next()
    }

    pub fn counter(&self, key: &CounterKey) -> Option<&CounterElement> {
        self.counters.get(key)
    }

    pub fn counter_for(&self, id: &ResourceId, lookup: CounterLookup) -> Option<&CounterElement> {
        self.counter(&counter_key(id, lookup))
    }

    /// Applies a toggle the server confirmed: flip the mode, then move the
    /// counter by +1 if the element was in `like` mode and -1 otherwise.
    pub fn apply_confirmed_toggle(
        &mut self,
        id: &ResourceId,
        lookup: CounterLookup,
    ) -> Option<ToggleOutcome> {
        let element = self.elements.get_mut(id)?;
        let previous = element.action;
        element.action = previous.flipped();
        let current = element.action;

        let key = counter_key(id, lookup);
        let count = match self.counters.get_mut(&key) {
            Some(counter) => {
                let adjusted = counter.adjust(previous.counter_delta());
                if adjusted.is_none() {
                    warn!("counter for {id} holds '{}', not an integer", counter.text());
                }
                adjusted
            }
            None => {
                warn!("no counter found for {id}");
                None
            }
        };

        Some(ToggleOutcome {
            id: id.clone(),
            previous,
            current,
            count,
        })
    }
}

pub fn counter_key(id: &ResourceId, lookup: CounterLookup) -> CounterKey {
    match lookup {
        CounterLookup::Shared => CounterKey::Shared,
        CounterLookup::ById => CounterKey::Resource(id.clone()),
    }
}

/// Marker for a dispatched request that has not completed yet.
#[derive(Debug)]
pub struct InFlight {
    pub generation: u64,
    pub abort: AbortHandle,
}

#[derive(Debug, Default)]
pub struct PageData {
    pub board: Board,
    pub in_flight: HashMap<ResourceId, InFlight>,
    next_generation: u64,
    toggle_epoch: u64,
}

impl PageData {
    pub fn new(board: Board) -> Self {
        Self {
            board,
            ..Self::default()
        }
    }

    pub fn next_generation(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }

    /// Bumped by every confirmed toggle. A reload started at one epoch must
    /// not install its snapshot once a later toggle has landed.
    pub fn toggle_epoch(&self) -> u64 {
        self.toggle_epoch
    }

    pub fn apply_confirmed_toggle(
        &mut self,
        id: &ResourceId,
        lookup: CounterLookup,
    ) -> Option<ToggleOutcome> {
        let outcome = self.board.apply_confirmed_toggle(id, lookup)?;
        self.toggle_epoch += 1;
        Some(outcome)
    }

    /// Installs a reloaded snapshot unless a toggle landed after `epoch`.
    pub fn replace_board(&mut self, snapshot: &PageSnapshot, epoch: u64) -> bool {
        if self.toggle_epoch != epoch {
            return false;
        }
        self.board = Board::from_snapshot(snapshot);
        true
    }

    pub fn is_current(&self, id: &ResourceId, generation: u64) -> bool {
        self.in_flight
            .get(id)
            .is_some_and(|marker| marker.generation == generation)
    }

    /// Clears the marker only if it still belongs to `generation`.
    pub fn finish(&mut self, id: &ResourceId, generation: u64) -> bool {
        if self.is_current(id, generation) {
            self.in_flight.remove(id);
            true
        } else {
            false
        }
    }
}

#[derive(Clone, Default)]
pub struct ToggleState {
    pub page: Arc<Mutex<PageData>>,
}

impl ToggleState {
    pub fn new(board: Board) -> Self {
        Self {
            page: Arc::new(Mutex::new(PageData::new(board))),
        }
    }
}
