/// Fixed-width bitset over entity positions, stored in 32-bit limbs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Mask {
    limbs: Vec<u32>,
    bits: usize,
}

impl Mask {
    pub fn new(bits: usize) -> Self {
        Mask {
            limbs: vec![0; bits.div_ceil(32)],
            bits,
        }
    }

    pub fn full(bits: usize) -> Self {
        let mut m = Mask::new(bits);
        for pos in 0..bits {
            m.insert(pos);
        }
        m
    }

    pub fn width(&self) -> usize {
        self.bits
    }

    pub fn insert(&mut self, pos: usize) {
        debug_assert!(pos < self.bits);
        self.limbs[pos / 32] |= 1 << (pos % 32);
    }

    pub fn contains(&self, pos: usize) -> bool {
        pos < self.bits && self.limbs[pos / 32] & (1 << (pos % 32)) != 0
    }

    pub fn count(&self) -> usize {
        self.limbs.iter().map(|l| l.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.limbs.iter().all(|&l| l == 0)
    }

    pub fn intersects(&self, other: &Mask) -> bool {
        self.limbs.iter().zip(&other.limbs).any(|(a, b)| a & b != 0)
    }

    pub fn intersection_count(&self, other: &Mask) -> usize {
        self.limbs
            .iter()
            .zip(&other.limbs)
            .map(|(a, b)| (a & b).count_ones() as usize)
            .sum()
    }

    pub fn and_with(&mut self, other: &Mask) {
        for (a, b) in self.limbs.iter_mut().zip(&other.limbs) {
            *a &= *b;
        }
    }

    pub fn remove(&mut self, pos: usize) {
        if pos < self.bits {
            self.limbs[pos / 32] &= !(1 << (pos % 32));
        }
    }

    /// Set positions in ascending order.
    pub fn ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.limbs.iter().enumerate().flat_map(|(i, &limb)| {
            (0..32).filter(move |b| limb & (1 << b) != 0).map(move |b| i * 32 + b)
        })
    }
}
