use super::nfa::Nfa;
use crate::GenError;
use lrkit::RangeTransition;
use std::collections::{BTreeSet, HashMap, VecDeque};

/// A DFA produced by subset construction; state 0 is the start state.
#[derive(Debug, Clone, Default)]
pub struct Dfa {
    /// Per-state transitions, sorted by `from` and disjoint.
    pub transitions: Vec<Vec<RangeTransition>>,
    /// Accept priority per state, if accepting.
    pub accepts: Vec<Option<usize>>,
}

impl Dfa {
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Runs the DFA over all of `input`; returns the accept priority of the final state.
    #[cfg(test)]
    pub(crate) fn matches(&self, input: &str) -> Option<usize> {
        let mut state = 0;
        for c in input.chars() {
            let c = c as u32;
            state = self.transitions[state]
                .iter()
                .find(|t| t.contains(c))?
                .next;
        }
        self.accepts[state]
    }
}

fn closure(nfa: &Nfa, seed: impl IntoIterator<Item = usize>) -> BTreeSet<usize> {
    let mut set = BTreeSet::new();
    let mut stack: Vec<usize> = seed.into_iter().collect();
    while let Some(s) = stack.pop() {
        if set.insert(s) {
            stack.extend(nfa.states[s].eps.iter().copied());
        }
    }
    set
}

/// Subset construction over range edges.
///
/// The outgoing edges of a DFA state are split into elementary intervals at
/// every range boundary; intervals leading to the same DFA state are then
/// merged when adjacent. States are numbered in discovery (BFS) order.
pub fn build(nfa: &Nfa, max_states: usize) -> Result<Dfa, GenError> {
    let mut dfa = Dfa::default();
    let mut index: HashMap<BTreeSet<usize>, usize> = HashMap::new();
    let mut queue: VecDeque<BTreeSet<usize>> = VecDeque::new();

    let start = closure(nfa, [0]);
    index.insert(start.clone(), 0);
    queue.push_back(start);
    dfa.transitions.push(Vec::new());
    dfa.accepts.push(None);

    while let Some(set) = queue.pop_front() {
        let id = index[&set];
        dfa.accepts[id] = set.iter().filter_map(|&s| nfa.states[s].accept).min();

        let edges: Vec<(u32, u32, usize)> = set
            .iter()
            .flat_map(|&s| nfa.states[s].edges.iter().copied())
            .collect();
        let mut bounds: Vec<u32> = edges
            .iter()
            .flat_map(|&(lo, hi, _)| [lo, hi + 1])
            .collect();
        bounds.sort_unstable();
        bounds.dedup();

        let mut out: Vec<RangeTransition> = Vec::new();
        for w in bounds.windows(2) {
            let (lo, hi) = (w[0], w[1] - 1);
            let targets = edges
                .iter()
                .filter(|&&(a, b, _)| a <= lo && lo <= b)
                .map(|&(_, _, t)| t);
            let target = closure(nfa, targets);
            if target.is_empty() {
                continue;
            }
            let next = match index.get(&target) {
                Some(&n) => n,
                None => {
                    let n = dfa.transitions.len();
                    if n >= max_states {
                        return Err(GenError::Capacity {
                            what: "lexer DFA",
                            limit: max_states,
                        });
                    }
                    dfa.transitions.push(Vec::new());
                    dfa.accepts.push(None);
                    index.insert(target.clone(), n);
                    queue.push_back(target);
                    n
                }
            };
            match out.last_mut() {
                Some(last) if last.next == next && last.to + 1 == lo => last.to = hi,
                _ => out.push(RangeTransition::new(lo, hi, next)),
            }
        }
        log::trace!("DFA state {} <- NFA {:?}: {} ranges", id, set, out.len());
        dfa.transitions[id] = out;
    }
    Ok(dfa)
}
