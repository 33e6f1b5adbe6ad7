//! Data-parallel loops over independent output slots.
//!
//! With the `parallel` feature the closures run on the rayon thread pool, otherwise they
//! run sequentially in index order. Every closure writes only to the slot it is handed,
//! so both paths produce identical output.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Calls `f(index, &mut slot)` for every element of `slice`.
pub fn for_each_indexed_mut<T, F>(slice: &mut [T], f: F)
where
    T: Send,
    F: Fn(usize, &mut T) + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        slice
            .par_iter_mut()
            .enumerate()
            .for_each(|(idx, value)| f(idx, value));
    }

    #[cfg(not(feature = "parallel"))]
    {
        for (idx, value) in slice.iter_mut().enumerate() {
            f(idx, value);
        }
    }
}

/// Calls `f(chunk_index, chunk)` for every consecutive chunk of `chunk_len` elements.
///
/// Used for scanline-parallel volume loops, where one chunk is one row of voxels.
pub fn for_each_chunk_mut<T, F>(slice: &mut [T], chunk_len: usize, f: F)
where
    T: Send,
    F: Fn(usize, &mut [T]) + Sync + Send,
{
    if chunk_len == 0 {
        return;
    }

    #[cfg(feature = "parallel")]
    {
        slice
            .par_chunks_mut(chunk_len)
            .enumerate()
            .for_each(|(idx, chunk)| f(idx, chunk));
    }

    #[cfg(not(feature = "parallel"))]
    {
        for (idx, chunk) in slice.chunks_mut(chunk_len).enumerate() {
            f(idx, chunk);
        }
    }
}

/// Builds a vector of `len` elements, computing element `i` with `f(i)`.
pub fn map_indexed<T, F>(len: usize, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> T + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        (0..len).into_par_iter().map(f).collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        (0..len).map(f).collect()
    }
}
