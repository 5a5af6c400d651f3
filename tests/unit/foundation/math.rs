use super::*;

#[test]
fn fnv_hash_is_stable_across_split_writes() {
    let mut a = Fnv1a64::new_default();
    a.write_bytes(b"loopback");
    let mut b = Fnv1a64::new_default();
    b.write_bytes(b"loop");
    b.write_bytes(b"back");
    assert_eq!(a.finish(), b.finish());

    let mut c = Fnv1a64::new_default();
    c.write_u64(42);
    assert_ne!(c.finish(), Fnv1a64::new_default().finish());
}

#[test]
fn clamp_u8_rounds_and_saturates() {
    assert_eq!(clamp_u8(-3.0), 0);
    assert_eq!(clamp_u8(12.5), 13);
    assert_eq!(clamp_u8(300.0), 255);
    assert_eq!(lerp(2.0, 4.0, 0.25), 2.5);
}
