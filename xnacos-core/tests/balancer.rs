//! Weighted random choice.

use rand::rngs::StdRng;
use rand::SeedableRng;
use xnacos_core::balancer::choose_weighted;
use xnacos_core::Instance;

fn weighted(ip: &str, weight: f64) -> Instance {
    Instance {
        weight,
        ..Instance::new(ip, 8080)
    }
}

#[test]
fn nothing_to_choose_from() {
    let mut rng = StdRng::seed_from_u64(7);
    assert!(choose_weighted(&[], &mut rng).is_none());
    let zeros = [weighted("a", 0.0), weighted("b", 0.0)];
    assert!(choose_weighted(&zeros, &mut rng).is_none());
}

#[test]
fn zero_weight_is_never_chosen() {
    let mut rng = StdRng::seed_from_u64(1);
    let instances = [weighted("zero", 0.0), weighted("one", 1.0), weighted("nan", f64::NAN)];
    for _ in 0..500 {
        assert_eq!(choose_weighted(&instances, &mut rng).unwrap().ip, "one");
    }
}

#[test]
fn heavier_instance_is_chosen_more_often() {
    let mut rng = StdRng::seed_from_u64(42);
    let instances = [weighted("light", 1.0), weighted("heavy", 9.0)];
    let heavy = (0..2000)
        .filter(|_| choose_weighted(&instances, &mut rng).unwrap().ip == "heavy")
        .count();
    assert!(heavy > 1600, "heavy chosen {heavy} times");
}

#[test]
fn huge_weights_do_not_overflow() {
    let mut rng = StdRng::seed_from_u64(3);
    let instances = [weighted("a", 1e308), weighted("b", 1e308)];
    let mut seen = [0usize; 2];
    for _ in 0..200 {
        match choose_weighted(&instances, &mut rng).unwrap().ip.as_str() {
            "a" => seen[0] += 1,
            _ => seen[1] += 1,
        }
    }
    assert!(seen[0] > 0 && seen[1] > 0, "{seen:?}");
}
