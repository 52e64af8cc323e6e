use crate::segment::Segment;
use std::hash::Hash;

/// Iterator over cloned entries that visits segments in index order.
///
/// Each segment is read-locked just long enough to copy its entries into a
/// buffer; no lock is held between calls to `next`. Segments not yet reached
/// can therefore change while iteration is in progress, and the result is
/// not a snapshot of the whole map.
pub struct Iter<'a, K, V> {
    segments: &'a [Segment<K, V>],
    current_segment: usize,
    buffer: std::vec::IntoIter<(K, V)>,
}

impl<'a, K, V> Iter<'a, K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    pub(crate) fn new(segments: &'a [Segment<K, V>]) -> Self {
        Self {
            segments,
            current_segment: 0,
            buffer: Vec::new().into_iter(),
        }
    }

    /// Fill the buffer from the next non-empty segment.
    fn fill_buffer(&mut self) -> bool {
        while self.current_segment < self.segments.len() {
            let entries: Vec<(K, V)> = {
                let guard = self.segments[self.current_segment].read_lock();
                guard
                    .iter()
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect()
            };
            self.current_segment += 1;

            if !entries.is_empty() {
                self.buffer = entries.into_iter();
                return true;
            }
        }

        false
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(item) = self.buffer.next() {
            return Some(item);
        }
        if !self.fill_buffer() {
            return None;
        }
        self.buffer.next()
    }
}
