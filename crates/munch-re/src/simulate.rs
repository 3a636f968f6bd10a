use bit_set::BitSet;
use tracing::trace;

use crate::{
    nfa::{Nfa, StateIdx, EPSILON, NUM_SYMBOLS},
    AsciiChar,
};

// runs an NFA directly, tracking the set of states it could be in instead of
// building a DFA up front. `now` is the active set, `tmp` is where the next one
// gets assembled; the two are swapped after every move and every closure so a
// step never reads its own half-written output.
pub struct Simulation<'nfa> {
    nfa: &'nfa Nfa,
    now: BitSet,
    tmp: BitSet,
    worklist: Vec<StateIdx>,

    state_count: usize,
    final_count: usize,
    final_status: u16,
}

impl<'nfa> Simulation<'nfa> {
    pub fn new(nfa: &'nfa Nfa) -> Self {
        Self {
            nfa,
            now: BitSet::with_capacity(nfa.len()),
            tmp: BitSet::with_capacity(nfa.len()),
            worklist: Vec::new(),
            state_count: 0,
            final_count: 0,
            final_status: 0,
        }
    }

    pub fn init(&mut self) {
        self.now.clear();
        self.now.insert(self.nfa.start.index());
        self.epsilon_closure();
    }

    // grows the active set by everything reachable over epsilon edges. recounts the
    // active and accepting states as it goes; when several accepting states are
    // active the highest status wins
    pub fn epsilon_closure(&mut self) {
        self.tmp.clear();
        self.state_count = 0;
        self.final_count = 0;
        self.final_status = 0;

        self.worklist
            .extend(self.now.iter().map(StateIdx::from_index));
        while let Some(idx) = self.worklist.pop() {
            if !self.tmp.insert(idx.index()) {
                continue;
            }

            let state = &self.nfa.states[idx];
            self.state_count += 1;
            if state.is_accepting() {
                self.final_count += 1;
                self.final_status = self.final_status.max(state.final_status());
            }

            for next in state.targets(EPSILON) {
                if !self.tmp.contains(next.index()) {
                    self.worklist.push(*next);
                }
            }
        }

        std::mem::swap(&mut self.now, &mut self.tmp);
    }

    // consume one input symbol. epsilon and anything outside the alphabet match nothing
    pub fn step(&mut self, symbol: AsciiChar) {
        self.tmp.clear();
        if symbol != EPSILON && (symbol as usize) < NUM_SYMBOLS {
            for i in self.now.iter() {
                for next in self.nfa.states[i].targets(symbol) {
                    self.tmp.insert(next.index());
                }
            }
        }

        std::mem::swap(&mut self.now, &mut self.tmp);
        self.epsilon_closure();
        trace!(
            symbol,
            active = self.state_count,
            status = self.final_status,
            "step"
        );
    }

    pub fn active_count(&self) -> usize {
        self.state_count
    }

    pub fn final_count(&self) -> usize {
        self.final_count
    }

    // highest status among active accepting states, 0 if none is accepting
    pub fn final_status(&self) -> u16 {
        self.final_status
    }

    pub fn is_dead(&self) -> bool {
        self.state_count == 0
    }

    pub fn is_active(&self, state: StateIdx) -> bool {
        self.now.contains(state.index())
    }

    pub fn active_states(&self) -> impl Iterator<Item = StateIdx> + '_ {
        self.now.iter().map(StateIdx::from_index)
    }
}
