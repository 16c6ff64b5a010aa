use super::*;

#[test]
fn same_seed_same_sequence() {
    let mut a = Rng64::new(42);
    let mut b = Rng64::new(42);
    for _ in 0..16 {
        assert_eq!(a.next_u64(), b.next_u64());
    }
}

#[test]
fn unit_interval_and_bounds_hold() {
    let mut rng = Rng64::new(7);
    for _ in 0..1000 {
        let v = rng.next_f64_01();
        assert!((0.0..1.0).contains(&v));
        assert!(rng.below(600) < 600);
    }
    assert_eq!(rng.below(0), 0);
}

struct Fixed(f64);

impl UnitRandom for Fixed {
    fn next_f64_01(&mut self) -> f64 {
        self.0
    }
}

#[test]
fn below_scales_and_clamps() {
    assert_eq!(Fixed(0.625).below(80), 50);
    assert_eq!(Fixed(0.0).below(80), 0);
    assert_eq!(Fixed(0.999_999_999_999).below(3), 2);
    assert!(Fixed(0.25).coin());
    assert!(!Fixed(0.75).coin());
}
