/// One bit per possible input symbol.
///
/// Callers own the bitmap and decide when to reset it, which lets a single
/// bitmap be shared by every state of an epsilon closure while scanning for
/// duplicate symbols.
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct SymbolBitmap([u64; 4]);

impl SymbolBitmap {
    pub fn new() -> Self {
        SymbolBitmap([0; 4])
    }

    #[inline]
    pub fn get(&self, symbol: u8) -> bool {
        self.0[(symbol >> 6) as usize] & (1 << (symbol & 63)) != 0
    }

    #[inline]
    pub fn set(&mut self, symbol: u8) {
        self.0[(symbol >> 6) as usize] |= 1 << (symbol & 63);
    }

    pub fn reset(&mut self) {
        self.0 = [0; 4];
    }

    pub fn count(&self) -> usize {
        self.0.iter().map(|word| word.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|word| *word == 0)
    }

    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (0..=u8::MAX).filter(move |symbol| self.get(*symbol))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_works() {
        let mut bm = SymbolBitmap::new();
        assert!(bm.is_empty());

        for symbol in [0, 63, 64, 127, 128, 255] {
            assert!(!bm.get(symbol));
            bm.set(symbol);
            assert!(bm.get(symbol));
        }
        bm.set(64);

        assert_eq!(bm.count(), 6);
        assert_eq!(bm.iter().collect::<Vec<_>>(), vec![0, 63, 64, 127, 128, 255]);
        assert!(!bm.get(1));
        assert!(!bm.get(254));

        bm.reset();
        assert!(bm.is_empty());
        assert_eq!(bm.count(), 0);
    }
}
