//! Adjacency row codec.
//!
//! Each node owns one fixed-width row of `max_degree` signed 32-bit cells in
//! the adjacency table. A cell is either a live internal ID (>= 0) or the
//! empty sentinel [`NO_NEIGHBOR`]. Writers place pruned neighbor lists in
//! ascending distance from the owning node (ties by ascending internal ID)
//! and pad the remainder, so stored rows are deterministic for a given graph.

/// Sentinel marking an empty adjacency cell.
pub(crate) const NO_NEIGHBOR: i32 = -1;

/// Decodes a fixed-width row into the compact list of neighbor IDs.
///
/// Scans all cells and drops sentinels; cell order is preserved.
#[allow(clippy::cast_sign_loss)]
pub(crate) fn decode_row(row: &[i32]) -> Vec<u32> {
    row.iter()
        .filter(|&&cell| cell != NO_NEIGHBOR)
        .map(|&cell| {
            debug_assert!(cell >= 0, "negative non-sentinel adjacency cell {cell}");
            cell as u32
        })
        .collect()
}

/// Encodes a compact neighbor list into a fixed-width row, padding with
/// sentinels.
///
/// # Panics
///
/// Panics if more than `max_degree` neighbors are given or an ID does not
/// fit an `i32` cell.
pub(crate) fn encode_row(neighbors: &[u32], max_degree: usize) -> Vec<i32> {
    assert!(
        neighbors.len() <= max_degree,
        "neighbor list length {} exceeds max_degree {}",
        neighbors.len(),
        max_degree
    );

    let mut row = vec![NO_NEIGHBOR; max_degree];
    for (cell, &id) in row.iter_mut().zip(neighbors.iter()) {
        *cell = i32::try_from(id).expect("internal ID exceeds adjacency cell range");
    }
    row
}
