//! Tests for `element` module.

use super::element::{Element, ElementType};
use half::f16;

#[test]
fn test_bytes_per_element() {
    assert_eq!(ElementType::F16.bytes_per_element(), 2);
    assert_eq!(ElementType::F32.bytes_per_element(), 4);
    assert_eq!(ElementType::F64.bytes_per_element(), 8);
}

#[test]
fn test_kind_tags() {
    assert_eq!(f16::KIND, ElementType::F16);
    assert_eq!(f32::KIND, ElementType::F32);
    assert_eq!(f64::KIND, ElementType::F64);
}

#[test]
fn test_squared_l2_f32() {
    let a = [0.0f32, 0.0, 0.0];
    let b = [3.0f32, 4.0, 0.0];
    assert!((f32::squared_l2(&a, &b) - 25.0).abs() < 1e-6);
}

#[test]
fn test_squared_l2_f64_accumulates_in_f64() {
    let a = [0.0f64; 4];
    let b = [0.5f64; 4];
    assert!((f64::squared_l2(&a, &b) - 1.0).abs() < 1e-6);
}

#[test]
fn test_squared_l2_f16_widens() {
    let a: Vec<f16> = [1.0f32, 0.0].iter().map(|&v| f16::from_f32(v)).collect();
    let b: Vec<f16> = [0.0f32, 1.0].iter().map(|&v| f16::from_f32(v)).collect();
    assert!((f16::squared_l2(&a, &b) - 2.0).abs() < 1e-3);
}

#[test]
fn test_dot_and_norm() {
    let a = [1.0f32, 2.0, 3.0];
    let b = [4.0f32, 5.0, 6.0];
    assert!((f32::dot(&a, &b) - 32.0).abs() < 1e-6);
    assert!((f32::norm_sq(&a) - 14.0).abs() < 1e-6);
}

#[test]
fn test_f64_roundtrip_is_lossless() {
    let v = 0.123_456_789_012_345_f64;
    assert_eq!(f64::from_f64(v.to_f64()), v);
}
