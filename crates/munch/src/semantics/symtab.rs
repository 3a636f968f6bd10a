use munch_util::make_type_idx;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_CAPACITY: usize = 1024;

const HASH_MULTIPLIER: u32 = 131;

// same text can live in several namespaces without clashing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolClass {
    Identifier,
    Keyword,
    Literal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub class: SymbolClass,
    pub text: String,
}

make_type_idx!(pub SymbolIdx, Option<Symbol>);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SymtabError {
    #[error("symbol table is full ({capacity} entries)")]
    Full { capacity: usize },
}

// fixed size, open addressing with linear probing. a symbol's index is the slot it
// landed in, and never changes since nothing is ever removed
#[derive(Debug)]
pub struct SymbolTable {
    slots: Vec<Option<Symbol>>,
    len: usize,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl SymbolTable {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity.max(1)],
            len: 0,
        }
    }

    // polynomial rolling hash over the bytes of `text`
    pub fn hash(text: &str) -> u32 {
        text.bytes().fold(0u32, |h, b| {
            h.wrapping_mul(HASH_MULTIPLIER).wrapping_add(b as u32)
        })
    }

    fn home_slot(&self, text: &str) -> usize {
        Self::hash(text) as usize % self.slots.len()
    }

    // interning: equal (class, text) pairs always come back as the same index
    pub fn intern(&mut self, class: SymbolClass, text: &str) -> Result<SymbolIdx, SymtabError> {
        let capacity = self.slots.len();
        let mut slot = self.home_slot(text);

        for _ in 0..capacity {
            match &self.slots[slot] {
                None => {
                    self.slots[slot] = Some(Symbol {
                        class,
                        text: text.to_string(),
                    });
                    self.len += 1;
                    debug!(?class, text, slot, "interned symbol");
                    return Ok(SymbolIdx::from_index(slot));
                }
                Some(symbol) if symbol.class == class && symbol.text == text => {
                    return Ok(SymbolIdx::from_index(slot));
                }
                Some(_) => slot = (slot + 1) % capacity,
            }
        }

        Err(SymtabError::Full { capacity })
    }

    pub fn lookup(&self, class: SymbolClass, text: &str) -> Option<SymbolIdx> {
        let capacity = self.slots.len();
        let mut slot = self.home_slot(text);

        for _ in 0..capacity {
            match &self.slots[slot] {
                None => return None,
                Some(symbol) if symbol.class == class && symbol.text == text => {
                    return Some(SymbolIdx::from_index(slot));
                }
                Some(_) => slot = (slot + 1) % capacity,
            }
        }

        None
    }

    pub fn get(&self, idx: SymbolIdx) -> Option<&Symbol> {
        self.slots.get(idx.index()).and_then(Option::as_ref)
    }

    pub fn text(&self, idx: SymbolIdx) -> Option<&str> {
        self.get(idx).map(|x| x.text.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (SymbolIdx, &Symbol)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, x)| x.as_ref().map(|x| (SymbolIdx::from_index(i), x)))
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}
