//! Tests for `adjacency` module.

use super::adjacency::{decode_row, encode_row, NO_NEIGHBOR};

#[test]
fn test_encode_pads_with_sentinel() {
    let row = encode_row(&[3, 1, 7], 6);
    assert_eq!(row, vec![3, 1, 7, NO_NEIGHBOR, NO_NEIGHBOR, NO_NEIGHBOR]);
}

#[test]
fn test_encode_empty_is_all_sentinel() {
    let row = encode_row(&[], 4);
    assert_eq!(row, vec![NO_NEIGHBOR; 4]);
}

#[test]
fn test_decode_drops_sentinels() {
    let row = vec![5, NO_NEIGHBOR, 2, NO_NEIGHBOR];
    assert_eq!(decode_row(&row), vec![5, 2]);
}

#[test]
fn test_decode_full_row() {
    let row = encode_row(&[0, 1, 2, 3], 4);
    assert_eq!(decode_row(&row), vec![0, 1, 2, 3]);
}

#[test]
fn test_roundtrip_preserves_order() {
    let neighbors = vec![9, 4, 11, 2];
    assert_eq!(decode_row(&encode_row(&neighbors, 8)), neighbors);
}

#[test]
#[should_panic(expected = "exceeds max_degree")]
fn test_encode_over_capacity_panics() {
    let _ = encode_row(&[1, 2, 3], 2);
}
