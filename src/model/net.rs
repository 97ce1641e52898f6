//! Net system: a Petri net plus its current marking.

use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};

/// Internal identifier of a stored net.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NetId(pub i64);

impl std::fmt::Display for NetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlaceId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransitionId(pub u32);

/// A transition. Silent transitions carry no (or a blank) label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub id: TransitionId,
    pub label: Option<String>,
}

impl Transition {
    pub fn is_silent(&self) -> bool {
        self.label.as_deref().is_none_or(|l| l.trim().is_empty())
    }
}

/// A directed arc between a place and a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Flow {
    PlaceToTransition(PlaceId, TransitionId),
    TransitionToPlace(TransitionId, PlaceId),
}

/// Tokens per place. Places absent from the map hold no tokens.
pub type Marking = HashMap<PlaceId, u32>;

/// A Petri net with a marking, as restored from persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetSystem {
    pub id: NetId,
    /// External identifier the net was registered under.
    pub identifier: String,
    pub places: Vec<PlaceId>,
    pub transitions: Vec<Transition>,
    pub flows: Vec<Flow>,
    pub marking: Marking,
}

impl NetSystem {
    pub fn new(id: NetId, identifier: impl Into<String>) -> Self {
        Self {
            id,
            identifier: identifier.into(),
            places: Vec::new(),
            transitions: Vec::new(),
            flows: Vec::new(),
            marking: Marking::new(),
        }
    }

    pub fn add_place(&mut self) -> PlaceId {
        let id = PlaceId(self.places.len() as u32);
        self.places.push(id);
        id
    }

    /// Add a labelled transition. Pass `None` for a silent one.
    pub fn add_transition(&mut self, label: Option<&str>) -> TransitionId {
        let id = TransitionId(self.transitions.len() as u32);
        self.transitions.push(Transition { id, label: label.map(str::to_string) });
        id
    }

    pub fn add_flow(&mut self, flow: Flow) {
        self.flows.push(flow);
    }

    pub fn silent_transitions(&self) -> impl Iterator<Item = &Transition> {
        self.transitions.iter().filter(|t| t.is_silent())
    }

    pub fn observable_transitions(&self) -> impl Iterator<Item = &Transition> {
        self.transitions.iter().filter(|t| !t.is_silent())
    }

    /// Places with no incoming arc.
    pub fn source_places(&self) -> Vec<PlaceId> {
        let fed: HashSet<PlaceId> = self
            .flows
            .iter()
            .filter_map(|f| match f {
                Flow::TransitionToPlace(_, p) => Some(*p),
                Flow::PlaceToTransition(..) => None,
            })
            .collect();
        self.places.iter().copied().filter(|p| !fed.contains(p)).collect()
    }

    /// Replace the marking with the natural one: one token on every source place.
    pub fn load_natural_marking(&mut self) {
        self.marking = self.source_places().into_iter().map(|p| (p, 1)).collect();
    }

    pub fn tokens(&self, place: PlaceId) -> u32 {
        self.marking.get(&place).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// p0 -> A -> p1 -> tau -> p2
    fn sequence() -> NetSystem {
        let mut net = NetSystem::new(NetId(1), "seq");
        let p0 = net.add_place();
        let p1 = net.add_place();
        let p2 = net.add_place();
        let a = net.add_transition(Some("A"));
        let tau = net.add_transition(None);
        net.add_flow(Flow::PlaceToTransition(p0, a));
        net.add_flow(Flow::TransitionToPlace(a, p1));
        net.add_flow(Flow::PlaceToTransition(p1, tau));
        net.add_flow(Flow::TransitionToPlace(tau, p2));
        net
    }

    #[test]
    fn test_natural_marking_marks_source_places() {
        let mut net = sequence();
        net.marking.insert(PlaceId(2), 5);
        net.load_natural_marking();

        assert_eq!(net.tokens(PlaceId(0)), 1);
        assert_eq!(net.tokens(PlaceId(1)), 0);
        assert_eq!(net.tokens(PlaceId(2)), 0);
    }

    #[test]
    fn test_silent_transitions() {
        let mut net = sequence();
        net.add_transition(Some("   "));

        assert_eq!(net.silent_transitions().count(), 2);
        let labels: Vec<_> = net
            .observable_transitions()
            .filter_map(|t| t.label.as_deref())
            .collect();
        assert_eq!(labels, vec!["A"]);
    }
}
