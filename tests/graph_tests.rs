use std::collections::HashSet;
use std::f64::consts::PI;

use approx::assert_relative_eq;
use rand::{rngs::StdRng, Rng, SeedableRng};
use tapegrad::{GradCheck, NodeRef, Var, Vector};

fn node_id(node: &NodeRef) -> *const tapegrad::Node {
    &**node as *const tapegrad::Node
}

/// Depth-first walk that fails if any node is reachable from itself.
fn assert_acyclic(root: &NodeRef) {
    type Seen = HashSet<*const tapegrad::Node>;

    fn visit(node: &NodeRef, on_path: &mut Seen, done: &mut Seen) {
        let id = node_id(node);
        if done.contains(&id) {
            return;
        }
        assert!(on_path.insert(id), "cycle through node with value {}", node.value());
        for operand in node.operands() {
            visit(operand, on_path, done);
        }
        on_path.remove(&id);
        done.insert(id);
    }

    visit(root, &mut HashSet::new(), &mut HashSet::new());
}

/// Builds a random expression over `leaves`, reusing earlier sub-expressions.
fn random_graph(rng: &mut StdRng, leaves: &[Var], steps: usize) -> Var {
    let mut pool: Vec<Var> = leaves.to_vec();
    for _ in 0..steps {
        let a = pool[rng.gen_range(0..pool.len())].clone();
        let b = pool[rng.gen_range(0..pool.len())].clone();
        let next = match rng.gen_range(0..6) {
            0 => &a + &b,
            1 => &a - &b,
            2 => a.sin() * &b,
            3 => &a * 0.5,
            4 => a.sin(),
            _ => b.cos() + 1.0,
        };
        pool.push(next);
    }
    pool.pop().unwrap_or_default()
}

#[test]
fn test_scenario_add() {
    let a = Var::new(1.0);
    let b = Var::new(2.0);
    let s = &a + &b;
    s.backward();
    assert_relative_eq!(s.value(), 3.0);
    assert_relative_eq!(a.grad(), 1.0);
    assert_relative_eq!(b.grad(), 1.0);
}

#[test]
fn test_scenario_div() {
    let a = Var::new(1.0);
    let b = Var::new(2.0);
    let q = &a / &b;
    q.backward();
    assert_relative_eq!(q.value(), 0.5);
    assert_relative_eq!(a.grad(), 0.5);
    assert_relative_eq!(b.grad(), -0.25);
}

#[test]
fn test_scenario_abs_and_sin() {
    let a = Var::new(-5.0);
    let abs = a.abs();
    abs.backward();
    assert_relative_eq!(abs.value(), 5.0);
    assert_relative_eq!(a.grad(), -1.0);

    let a = Var::new(PI);
    let sin = a.sin();
    sin.backward();
    assert_relative_eq!(sin.value(), 0.0, epsilon = 1e-10);
    assert_relative_eq!(a.grad(), -1.0, epsilon = 1e-10);
}

#[test]
fn test_scenario_vector_composite() {
    let a = Vector::from_values(&[1.0, 1.0]);
    let b = Vector::from_values(&[2.0, 2.0]);
    let c = Vector::from_values(&[PI, PI]);

    let ab = (&a * &b).unwrap();
    let o = (&ab + &c.sin()).unwrap().exp().log();
    o.backward();

    let grads = a.grad().into_iter().zip(b.grad()).zip(c.grad());
    for ((da, db), dc) in grads {
        assert_relative_eq!(da, 2.0, epsilon = 1e-10);
        assert_relative_eq!(db, 1.0, epsilon = 1e-10);
        assert_relative_eq!(dc, -1.0, epsilon = 1e-10);
    }
}

#[test]
fn test_vector_quadratic_form() {
    let a = Vector::from(vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    let b = Vector::from(vec![5.0, 4.0, 3.0, 2.0, 1.0]);
    let q = ((3.0 * &a * &a).unwrap() - (&b * &b).unwrap()).unwrap();
    q.backward();

    for (grad, gold) in a.grad().into_iter().zip((6.0 * &a).values()) {
        assert_relative_eq!(grad, gold, epsilon = 1e-10);
    }
    for (grad, gold) in b.grad().into_iter().zip((-2.0 * &b).values()) {
        assert_relative_eq!(grad, gold, epsilon = 1e-10);
    }
}

#[test]
fn test_vector_trig_mix() {
    let a: Vector = (0..10_i32).map(f64::from).collect();
    let b: Vector = (0..10_i32).map(|i| f64::from(i * 2 + 1)).collect();
    let q = ((a.sin() + b.cos()).unwrap() + (&a * 5.0)).unwrap();
    let q = (q - (&b + 2.0)).unwrap();
    q.backward();

    for (grad, gold) in a.grad().into_iter().zip((a.cos() + 5.0).values()) {
        assert_relative_eq!(grad, gold, epsilon = 1e-10);
    }
    for (grad, gold) in b.grad().into_iter().zip(((-1.0 * b.sin()) - 1.0).values()) {
        assert_relative_eq!(grad, gold, epsilon = 1e-10);
    }
}

#[test]
fn test_vector_log_exp_product() {
    let a: Vector = (0..10_i32).map(|i| f64::from(i + 1)).collect();
    let b: Vector = (0..10_i32).map(|i| f64::from(i * 2 + 1)).collect();
    let q = (a.log() * b.exp()).unwrap();
    q.backward();

    let gold_a = ((1.0 / &a) * b.exp()).unwrap();
    for (grad, gold) in a.grad().into_iter().zip(gold_a.values()) {
        assert_relative_eq!(grad, gold, max_relative = 1e-12);
    }
    for (grad, gold) in b.grad().into_iter().zip(q.values()) {
        assert_relative_eq!(grad, gold, max_relative = 1e-12);
    }
}

#[test]
fn test_random_graphs_are_acyclic_and_match_finite_differences() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut rng = StdRng::seed_from_u64(7);

    for trial in 0..20 {
        let point: Vec<f64> = (0..3).map(|_| rng.gen_range(-1.0..1.0)).collect();
        let seed = 1000 + trial;

        let build = |leaves: &[Var]| {
            let mut rng = StdRng::seed_from_u64(seed);
            random_graph(&mut rng, leaves, 8)
        };
        let eval = |values: &[f64]| {
            let leaves: Vec<Var> = values.iter().copied().map(Var::new).collect();
            build(&leaves).value()
        };

        let leaves: Vec<Var> = point.iter().copied().map(Var::new).collect();
        assert_acyclic(build(&leaves).node());

        let config = GradCheck::default()
            .with_step(1e-5)
            .with_abs_tol(1e-4)
            .with_rel_tol(1e-3);
        let report = config.check(eval, &build, &point);
        assert!(report.passed, "trial {trial}: {report:?}");
    }
}

#[test]
fn test_propagation_from_several_roots_accumulates() {
    let x = Var::new(0.3);
    let y = x.exp();
    let z = &y * &y;

    y.backward();
    z.backward();
    let expected = 0.3_f64.exp() + 2.0 * (0.6_f64).exp();
    assert_relative_eq!(x.grad(), expected, epsilon = 1e-12);

    x.zero_grad();
    z.propagate(0.5);
    assert_relative_eq!(x.grad(), 0.6_f64.exp(), epsilon = 1e-12);
}

#[test]
fn test_shared_subgraph_revisited_per_path() {
    // each level doubles the number of paths back to the leaf
    let x = Var::new(1.0);
    let mut y = x.clone();
    for _ in 0..10 {
        y = &y + &y;
    }
    y.backward();
    assert_relative_eq!(y.value(), 1024.0);
    assert_relative_eq!(x.grad(), 1024.0);
}

#[test]
fn test_long_running_sum_drops_cleanly() {
    let x = Var::new(1.0);
    let mut sum = Var::new(0.0);
    for _ in 0..200_000 {
        sum = &sum + &x;
    }
    assert_relative_eq!(sum.value(), 200_000.0);
    drop(sum);
    assert_relative_eq!(x.value(), 1.0);
    assert_eq!(x.grad(), 0.0);
}

#[test]
fn test_nan_propagates_without_error() {
    let x = Var::new(-4.0);
    let y = x.sqrt() * 2.0;
    assert!(y.value().is_nan());
    y.backward();
    assert!(x.grad().is_nan());
}
