use bitvec::{bitvec, order::Lsb0, vec::BitVec};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Packed bits plus the number of keys committed into them.
///
/// Both live behind the same lock so a reader never observes a count that
/// disagrees with the bits.
pub struct BitField {
    bits: BitVec<u8, Lsb0>,
    element_count: u64,
}

impl BitField {
    fn new(bit_vector_size: usize) -> Self {
        Self {
            bits: bitvec![u8, Lsb0; 0; bit_vector_size],
            element_count: 0,
        }
    }

    /// Addressable bits, `m`.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn element_count(&self) -> u64 {
        self.element_count
    }

    pub fn get(&self, position: usize) -> bool {
        self.bits[position]
    }

    pub fn count_ones(&self) -> usize {
        self.bits.count_ones()
    }

    /// Backing bytes, `ceil(m / 8)` of them. Bit `p` lives in byte `p / 8`
    /// at offset `p % 8`.
    pub fn as_bytes(&self) -> &[u8] {
        self.bits.as_raw_slice()
    }

    /// Bits in `[start, end)`.
    pub fn window(&self, start: usize, end: usize) -> Vec<bool> {
        self.bits[start..end].iter().by_vals().collect()
    }

    fn test_all(&self, positions: &[usize]) -> bool {
        positions.iter().all(|&position| self.bits[position])
    }

    fn set_all(&mut self, positions: &[usize]) {
        for &position in positions {
            self.bits.set(position, true);
        }
    }
}

/// Fixed-length bit array guarded by one reader/writer lock.
///
/// Bits are only ever set, so a guard recovered from a poisoned lock still
/// holds a consistent state and is used as is.
pub struct BitFieldStore {
    inner: RwLock<BitField>,
    bit_vector_size: usize,
}

impl BitFieldStore {
    pub fn new(bit_vector_size: usize) -> Self {
        Self {
            inner: RwLock::new(BitField::new(bit_vector_size)),
            bit_vector_size,
        }
    }

    pub fn bit_vector_size(&self) -> usize {
        self.bit_vector_size
    }

    /// True iff every position is set. Holds the read lock for the scan.
    pub fn test_all(&self, positions: &[usize]) -> bool {
        self.read().test_all(positions)
    }

    /// Answers several position sets under a single read lock.
    pub fn test_each(&self, position_sets: &[Vec<usize>]) -> Vec<bool> {
        let field = self.read();
        position_sets
            .iter()
            .map(|positions| field.test_all(positions))
            .collect()
    }

    /// Sets every position and counts `key_count` keys as committed, all
    /// under one write lock acquisition.
    pub fn set_many(&self, positions: &[usize], key_count: u64) {
        let mut field = self.write();
        field.set_all(positions);
        field.element_count += key_count;
    }

    pub fn element_count(&self) -> u64 {
        self.read().element_count
    }

    pub fn read(&self) -> RwLockReadGuard<'_, BitField> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BitField> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}
