use std::{fmt, ops::Range};

use munch_util::make_type_idx;
use petgraph::{
    dot::Dot,
    graph::{DiGraph, NodeIndex},
};
use tracing::debug;

use crate::{
    regex::{RegexConfig, RegexError, Regnode},
    simulate::Simulation,
    AsciiChar,
};

pub const EPSILON: AsciiChar = 0;
pub const NUM_SYMBOLS: usize = 128;

// status given to accepting states when a regex is compiled on its own
pub const DEFAULT_FINAL_STATUS: u16 = 1;

// pointer-based graphs in safe rust are somewhat tricky, so states live in one Vec
// and transitions refer to each other by index
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct State {
    // sorted by symbol, destinations are never repeated for one symbol
    transitions: Vec<(AsciiChar, Vec<StateIdx>)>,
    // 0 = not accepting, otherwise the status of the rule that accepts here
    final_status: u16,
}

make_type_idx!(pub StateIdx, State);

impl State {
    fn new(final_status: u16) -> Self {
        Self {
            transitions: Vec::new(),
            final_status,
        }
    }

    fn add_transition(&mut self, symbol: AsciiChar, dest: StateIdx) {
        match self.transitions.binary_search_by_key(&symbol, |(s, _)| *s) {
            Ok(i) => {
                let targets = &mut self.transitions[i].1;
                if !targets.contains(&dest) {
                    targets.push(dest);
                }
            }
            Err(i) => self.transitions.insert(i, (symbol, vec![dest])),
        }
    }

    pub fn targets(&self, symbol: AsciiChar) -> &[StateIdx] {
        match self.transitions.binary_search_by_key(&symbol, |(s, _)| *s) {
            Ok(i) => &self.transitions[i].1,
            Err(_) => &[],
        }
    }

    pub fn transitions(&self) -> impl Iterator<Item = (AsciiChar, &[StateIdx])> {
        self.transitions.iter().map(|(s, t)| (*s, t.as_slice()))
    }

    pub fn final_status(&self) -> u16 {
        self.final_status
    }

    pub fn is_accepting(&self) -> bool {
        self.final_status != 0
    }
}

// a sub-automaton under construction: where to enter it, and which states were
// created for it (always a contiguous run, since states are only ever appended)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub entry: StateIdx,
    pub states: Range<usize>,
}

#[derive(Debug, Default)]
pub struct NfaBuilder {
    states: Vec<State>,
}

impl NfaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn new_state(&mut self, final_status: u16) -> StateIdx {
        StateIdx::from_push(&mut self.states, State::new(final_status))
    }

    // invariant: both ends already exist, so every index stored in a transition is valid
    fn add_transition(&mut self, src: StateIdx, symbol: AsciiChar, dest: StateIdx) {
        debug_assert!(dest.index() < self.states.len());
        self.states[src].add_transition(symbol, dest);
    }

    // strip accepting status from every state of `fragment`, handing back which ones had it
    fn take_accepting(&mut self, fragment: &Fragment) -> Vec<StateIdx> {
        let mut accepting = Vec::new();
        for i in fragment.states.clone() {
            let state = &mut self.states[i];
            if state.is_accepting() {
                state.final_status = 0;
                accepting.push(StateIdx::from_index(i));
            }
        }
        accepting
    }

    // Thompson's construction. `final_status` is stamped on every accepting state the
    // fragment ends up with.
    pub fn build(&mut self, re: &Regnode, final_status: u16) -> Fragment {
        let start = self.states.len();
        let entry = match re {
            Regnode::Char(c) => {
                let entry = self.new_state(0);
                let end = self.new_state(final_status);
                self.add_transition(entry, *c, end);
                entry
            }
            Regnode::Class(class) => {
                let entry = self.new_state(0);
                let end = self.new_state(final_status);
                for c in class.symbols() {
                    self.add_transition(entry, c, end);
                }
                entry
            }
            Regnode::Empty => self.new_state(final_status),
            Regnode::Concatenation(left, right) => {
                let left = self.build(left, final_status);
                let right = self.build(right, final_status);
                for state in self.take_accepting(&left) {
                    self.add_transition(state, EPSILON, right.entry);
                }
                left.entry
            }
            Regnode::Alternation(left, right) => {
                let left = self.build(left, final_status);
                let right = self.build(right, final_status);
                let entry = self.new_state(0);
                self.add_transition(entry, EPSILON, left.entry);
                self.add_transition(entry, EPSILON, right.entry);
                entry
            }
            Regnode::Kleene(inner) => {
                let inner = self.build(inner, final_status);
                let end = self.new_state(final_status);
                let entry = self.new_state(0);
                self.add_transition(entry, EPSILON, inner.entry);
                self.add_transition(entry, EPSILON, end);
                for state in self.take_accepting(&inner) {
                    self.add_transition(state, EPSILON, inner.entry);
                    self.add_transition(state, EPSILON, end);
                }
                entry
            }
        };

        Fragment {
            entry,
            states: start..self.states.len(),
        }
    }

    pub fn finish(self, start: StateIdx) -> Nfa {
        Nfa {
            states: self.states,
            start,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nfa {
    pub(crate) states: Vec<State>,
    pub(crate) start: StateIdx,
}

impl Nfa {
    pub fn from_regnode(re: &Regnode, final_status: u16) -> Nfa {
        let mut builder = NfaBuilder::new();
        let fragment = builder.build(re, final_status);
        builder.finish(fragment.entry)
    }

    pub fn from_regex_str(re_str: &str, config: &RegexConfig) -> Result<Nfa, RegexError> {
        let re = Regnode::from_str_with_config(re_str, config)?;
        Ok(Self::from_regnode(&re, DEFAULT_FINAL_STATUS))
    }

    // one root state with an epsilon edge into every rule, so all rules run at once;
    // each rule keeps its own status so the simulation can tell them apart
    pub fn combine(rules: &[(Regnode, u16)]) -> Nfa {
        let mut builder = NfaBuilder::new();
        let entries: Vec<StateIdx> = rules
            .iter()
            .map(|(re, status)| builder.build(re, *status).entry)
            .collect();

        let root = builder.new_state(0);
        for entry in entries {
            builder.add_transition(root, EPSILON, entry);
        }

        let nfa = builder.finish(root);
        debug!(rules = rules.len(), states = nfa.len(), "combined rule automaton");
        nfa
    }

    pub fn start(&self) -> StateIdx {
        self.start
    }

    pub fn state(&self, idx: StateIdx) -> &State {
        &self.states[idx]
    }

    pub fn states(&self) -> impl Iterator<Item = (StateIdx, &State)> {
        self.states
            .iter()
            .enumerate()
            .map(|(i, s)| (StateIdx::from_index(i), s))
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    // runs the whole input and reports the status left standing at the end, 0 on reject
    pub fn match_status(&self, input: &[u8]) -> u16 {
        let mut simulation = Simulation::new(self);
        simulation.init();
        for &c in input {
            simulation.step(c);
            if simulation.is_dead() {
                return 0;
            }
        }
        simulation.final_status()
    }

    pub fn accepts(&self, input: &[u8]) -> bool {
        self.match_status(input) != 0
    }

    pub fn to_graph(&self) -> DiGraph<String, String> {
        let mut graph = DiGraph::with_capacity(self.states.len(), 0);
        let nodes: Vec<NodeIndex> = self
            .states()
            .map(|(idx, state)| {
                let mut label = idx.to_string();
                if idx == self.start {
                    label.push_str(" start");
                }
                if state.is_accepting() {
                    label.push_str(&format!(" [{}]", state.final_status));
                }
                graph.add_node(label)
            })
            .collect();

        for (idx, state) in self.states() {
            for (symbol, targets) in state.transitions() {
                for target in targets {
                    graph.add_edge(nodes[idx.index()], nodes[target.index()], symbol_label(symbol));
                }
            }
        }

        graph
    }

    pub fn to_dot(&self) -> String {
        format!("{}", Dot::new(&self.to_graph()))
    }
}

fn symbol_label(symbol: AsciiChar) -> String {
    match symbol {
        EPSILON => "ε".to_string(),
        b'\n' => "\\n".to_string(),
        b'\t' => "\\t".to_string(),
        b' ' => "' '".to_string(),
        c => (c as char).to_string(),
    }
}

// transition table dump, one row per (state, symbol)
impl fmt::Display for Nfa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "start: {}", self.start)?;
        writeln!(f, "states: {}", self.states.len())?;
        for (idx, state) in self.states() {
            write!(f, "{:>4}", idx.index())?;
            if state.is_accepting() {
                write!(f, " [{}]", state.final_status)?;
            }
            writeln!(f)?;
            for (symbol, targets) in state.transitions() {
                write!(f, "     {:>3} ->", symbol_label(symbol))?;
                for target in targets {
                    write!(f, " {}", target)?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
