use super::regex::Regex;

/// One NFA state: epsilon moves, range edges, and an optional accept priority.
#[derive(Debug, Clone, Default)]
pub struct NfaState {
    pub eps: Vec<usize>,
    pub edges: Vec<(u32, u32, usize)>,
    /// Priority of the rule accepted here; lower wins.
    pub accept: Option<usize>,
}

/// A Thompson NFA whose start state is 0.
#[derive(Debug, Clone)]
pub struct Nfa {
    pub states: Vec<NfaState>,
}

impl Nfa {
    /// Builds the union of `rules`; rule `i` accepts with priority `i`.
    pub fn build<'r>(rules: impl IntoIterator<Item = &'r Regex>) -> Self {
        let mut nfa = Nfa {
            states: vec![NfaState::default()],
        };
        for (priority, re) in rules.into_iter().enumerate() {
            let (start, end) = nfa.fragment(re);
            nfa.states[0].eps.push(start);
            nfa.states[end].accept = Some(priority);
        }
        log::trace!("NFA has {} states", nfa.states.len());
        nfa
    }

    fn add_state(&mut self) -> usize {
        self.states.push(NfaState::default());
        self.states.len() - 1
    }

    fn eps(&mut self, from: usize, to: usize) {
        self.states[from].eps.push(to);
    }

    /// Thompson construction; returns the fragment's entry and exit states.
    fn fragment(&mut self, re: &Regex) -> (usize, usize) {
        match re {
            Regex::Literal(s) => {
                let start = self.add_state();
                let mut cur = start;
                for c in s.chars() {
                    let next = self.add_state();
                    self.states[cur].edges.push((c as u32, c as u32, next));
                    cur = next;
                }
                (start, cur)
            }
            Regex::Range(lo, hi) => {
                let start = self.add_state();
                let end = self.add_state();
                self.states[start].edges.push((*lo, *hi, end));
                (start, end)
            }
            Regex::Concat(parts) => {
                let start = self.add_state();
                let mut cur = start;
                for part in parts {
                    let (s, e) = self.fragment(part);
                    self.eps(cur, s);
                    cur = e;
                }
                (start, cur)
            }
            Regex::Alt(alts) => {
                let start = self.add_state();
                let end = self.add_state();
                for alt in alts {
                    let (s, e) = self.fragment(alt);
                    self.eps(start, s);
                    self.eps(e, end);
                }
                (start, end)
            }
            Regex::Optional(inner) => {
                let start = self.add_state();
                let end = self.add_state();
                let (s, e) = self.fragment(inner);
                self.eps(start, s);
                self.eps(e, end);
                self.eps(start, end);
                (start, end)
            }
            Regex::Star(inner) => {
                let start = self.add_state();
                let end = self.add_state();
                let (s, e) = self.fragment(inner);
                self.eps(start, s);
                self.eps(e, s);
                self.eps(e, end);
                self.eps(start, end);
                (start, end)
            }
        }
    }
}
