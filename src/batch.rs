use crate::types::TimeSeries;

use std::slice::Chunks;

/// Splits one tick's series into consecutive batches of at most `batch_size`, preserving order.
///
/// The last batch may be short and empty input yields no batches. A `batch_size` of zero is
/// treated as one (validated writer configurations never pass zero).
#[inline]
pub fn batches(series: &[TimeSeries], batch_size: usize) -> Chunks<'_, TimeSeries> {
    series.chunks(batch_size.max(1))
}

/// Number of batches `batches` yields for `len` series.
#[inline]
pub fn batch_count(len: usize, batch_size: usize) -> usize {
    len.div_ceil(batch_size.max(1))
}
