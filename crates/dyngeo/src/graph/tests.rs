use super::*;
use crate::algo::AlgoKind;
use crate::ctx::Mode;
use crate::numeric::{direction, same_line, Conic, Expr, Function};
use crate::object::{Number, ObjectKind};
use crate::rand::{drag_free_points, populate, RandomCfg, ReplayToken};
use nalgebra::{vector, Vector2};
use proptest::prelude::*;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::f64::consts::PI;
use std::rc::Rc;

#[derive(Clone, Default)]
struct Recorder(Rc<RefCell<Vec<Vec<ObjectId>>>>);

impl UpdateListener for Recorder {
    fn updated(&mut self, ids: &[ObjectId]) {
        self.0.borrow_mut().push(ids.to_vec());
    }
}

fn two_points_and_line(cons: &mut Construction) -> (ObjectId, ObjectId, AlgoId, ObjectId) {
    let a = cons.create_object(Payload::point(0.0, 0.0));
    let b = cons.create_object(Payload::point(1.0, 1.0));
    let algo = cons.create_algorithm(AlgoKind::LineThroughPoints, &[a, b]).unwrap();
    let l = cons.algorithm(algo).unwrap().outputs[0];
    (a, b, algo, l)
}

/// Structure and values, with payloads compared through `Debug` so NaN
/// placeholders compare equal.
fn snapshot(cons: &Construction) -> Vec<(ObjectId, String, bool, String, Option<AlgoId>)> {
    cons.store()
        .objects()
        .map(|o| (o.id, o.label.clone(), o.defined, format!("{:?}", o.payload), o.parent))
        .collect()
}

/// Every input produced by an algorithm is produced earlier in `order`.
fn respects_producers(cons: &Construction, order: &[AlgoId]) -> bool {
    let pos: std::collections::HashMap<AlgoId, usize> =
        order.iter().enumerate().map(|(i, a)| (*a, i)).collect();
    cons.store().algorithms().all(|node| {
        node.inputs.iter().all(|i| {
            match cons.object(*i).and_then(|o| o.parent) {
                Some(p) => pos[&p] < pos[&node.id],
                None => true,
            }
        })
    })
}

#[test]
fn labels_are_automatic_and_unique() {
    let mut cons = Construction::new();
    let (a, b, _, l) = two_points_and_line(&mut cons);
    assert_eq!(cons.label(a), Some("P1"));
    assert_eq!(cons.label(b), Some("P2"));
    assert_eq!(cons.label(l), Some("l1"));
    assert_eq!(cons.find("P2"), Some(b));

    let err = cons.create_object_labeled("P1", Payload::point(3.0, 3.0)).unwrap_err();
    assert_eq!(err, GraphError::DuplicateLabel("P1".into()));
    let c = cons.create_object_labeled("P3", Payload::point(3.0, 3.0)).unwrap();
    // the counter skips labels taken by hand
    let d = cons.create_object(Payload::point(4.0, 4.0));
    assert_eq!(cons.label(c), Some("P3"));
    assert_eq!(cons.label(d), Some("P4"));

    cons.relabel(d, "D").unwrap();
    assert_eq!(cons.find("D"), Some(d));
    assert_eq!(cons.find("P4"), None);
    assert!(cons.relabel(c, "D").is_err());
}

#[test]
fn invalid_algorithms_are_rejected_without_mutation() {
    let mut cons = Construction::new();
    let (a, _, _, l) = two_points_and_line(&mut cons);
    let before = snapshot(&cons);

    let err = cons.create_algorithm(AlgoKind::IntersectLines, &[l, a]).unwrap_err();
    assert!(matches!(err, GraphError::ArityMismatch { algo: "IntersectLines", .. }), "{err}");
    let err = cons.create_algorithm(AlgoKind::IntersectLines, &[l]).unwrap_err();
    assert!(matches!(err, GraphError::ArityMismatch { .. }));
    let err = cons.create_algorithm(AlgoKind::ConvexHull, &[]).unwrap_err();
    assert!(matches!(err, GraphError::ArityMismatch { .. }));
    let err = cons.create_algorithm(AlgoKind::LineThroughPoints, &[a, ObjectId(42)]).unwrap_err();
    assert_eq!(err, GraphError::UnknownObject(ObjectId(42)));

    assert_eq!(snapshot(&cons), before);
    assert_eq!(cons.topo_order().len(), 1);
}

#[test]
fn cycle_closing_redefinition_fails_and_leaves_graph_unchanged() {
    let mut cons = Construction::new();
    let (a, _, _, l) = two_points_and_line(&mut cons);
    let m = cons.create_object(Payload::line(1.0, 0.0, -2.0));
    let before = snapshot(&cons);
    let order_before = cons.topo_order().to_vec();

    // A would be computed from l, which is computed from A
    let err = cons.redefine(a, AlgoKind::IntersectLines, &[l, m]).unwrap_err();
    assert_eq!(err, GraphError::CyclicDependency { target: a });
    let err = cons.redefine(l, AlgoKind::LineThroughPoints, &[a, a]).unwrap_err();
    assert_eq!(err, GraphError::NotFree(l));
    let err = cons.redefine(m, AlgoKind::IntersectLines, &[l, m]).unwrap_err();
    assert_eq!(err, GraphError::CyclicDependency { target: m });

    assert_eq!(snapshot(&cons), before);
    assert_eq!(cons.topo_order(), order_before.as_slice());
}

#[test]
fn redefinition_reorders_and_recomputes() {
    let mut cons = Construction::new();
    let (a, b, line_algo, l) = two_points_and_line(&mut cons);
    let g = cons.create_object(Payload::line(1.0, 0.0, -2.0));
    let h = cons.create_object(Payload::line(0.0, 1.0, 0.0));

    let err = cons.redefine(a, AlgoKind::LineThroughPoints, &[b, b]).unwrap_err();
    assert!(matches!(err, GraphError::KindMismatch { .. }));

    let x = cons.redefine(a, AlgoKind::IntersectLines, &[g, h]).unwrap();
    assert_eq!(cons.object(a).unwrap().parent, Some(x));
    // the new producer runs before the older consumer
    assert_eq!(cons.topo_order(), &[x, line_algo]);
    assert_eq!(cons.object(a).unwrap().payload.as_xy(), Some(vector![2.0, 0.0]));
    let line = *cons.object_state(l).unwrap().1.as_line().unwrap();
    assert!(same_line(&line, &vector![1.0, 1.0, -2.0], 1e-12));

    assert_eq!(
        cons.set_input_value(a, Payload::point(0.0, 0.0)).unwrap_err(),
        GraphError::NotFree(a)
    );
    cons.set_input_value(g, Payload::line(1.0, 0.0, 3.0)).unwrap();
    assert_eq!(cons.object(a).unwrap().payload.as_xy(), Some(vector![-3.0, 0.0]));
}

#[test]
fn removal_orphans_consumers_and_keeps_labels() {
    let mut cons = Construction::new();
    let (a, b, line_algo, l) = two_points_and_line(&mut cons);
    let m = cons.create_object(Payload::line(1.0, 0.0, -2.0));
    let x_algo = cons.create_algorithm(AlgoKind::IntersectLines, &[l, m]).unwrap();
    let x = cons.algorithm(x_algo).unwrap().outputs[0];
    assert!(cons.object_state(x).unwrap().0);

    assert_eq!(cons.remove_object(l).unwrap_err(), GraphError::NotFree(l));
    cons.remove_object(a).unwrap();
    assert!(cons.object(a).is_none());
    assert_eq!(cons.find("P1"), None);
    assert!(!cons.object_state(l).unwrap().0);
    assert!(!cons.object_state(x).unwrap().0);
    assert_eq!(cons.label(l), Some("l1"));
    assert_eq!(cons.label(x), Some("P3"));
    // the dangling input stays, so moving the other input changes nothing
    assert_eq!(cons.algorithm(line_algo).unwrap().inputs, vec![a, b]);
    cons.set_input_value(b, Payload::point(5.0, 5.0)).unwrap();
    assert!(!cons.object_state(x).unwrap().0);

    cons.remove_algorithm(line_algo).unwrap();
    assert!(cons.object(l).is_none());
    assert_eq!(cons.find("l1"), None);
    assert_eq!(cons.topo_order(), &[x_algo]);
    assert_eq!(
        cons.remove_algorithm(line_algo).unwrap_err(),
        GraphError::UnknownAlgorithm(line_algo)
    );
}

#[test]
fn set_input_value_checks_kind_and_clamps_numbers() {
    let mut cons = Construction::new();
    let p = cons.create_object(Payload::point(0.0, 0.0));
    let r = cons.create_object(Payload::Number(Number::slider(1.0, 0.0, 2.0)));
    let circle = cons.create_algorithm(AlgoKind::CirclePointRadius, &[p, r]).unwrap();
    let c = cons.algorithm(circle).unwrap().outputs[0];

    let err = cons.set_input_value(p, Payload::number(3.0)).unwrap_err();
    assert_eq!(
        err,
        GraphError::KindMismatch {
            id: p,
            expected: ObjectKind::Point,
            actual: ObjectKind::Number
        }
    );
    let touched = cons.set_input_value(r, Payload::number(7.0)).unwrap();
    assert_eq!(touched, vec![r, c]);
    assert_eq!(cons.object_state(r).unwrap().1.as_number(), Some(2.0));
    let conic = *cons.object_state(c).unwrap().1.as_conic().unwrap();
    assert!(conic.eval(2.0, 0.0).abs() < 1e-12);

    // free numbers have no bounds and can go negative: circle undefined
    let s = cons.create_object(Payload::number(1.0));
    let circle2 = cons.create_algorithm(AlgoKind::CirclePointRadius, &[p, s]).unwrap();
    let c2 = cons.algorithm(circle2).unwrap().outputs[0];
    cons.set_input_value(s, Payload::number(-1.0)).unwrap();
    assert!(!cons.object_state(c2).unwrap().0);
}

#[test]
fn bisectors_through_the_graph() {
    let mut cons = Construction::new();
    let g = cons.create_object(Payload::line(0.0, 1.0, 0.0));
    let h = cons.create_object(Payload::line(0.0, 1.0, -1.0));
    let bis = cons.create_algorithm(AlgoKind::AngularBisector, &[g, h]).unwrap();
    let outs = cons.algorithm(bis).unwrap().outputs.clone();
    let (d0, p0) = cons.object_state(outs[0]).unwrap();
    assert!(d0 && same_line(p0.as_line().unwrap(), &vector![0.0, 1.0, -0.5], 1e-12));
    assert!(!cons.object_state(outs[1]).unwrap().0);

    // turning h makes both bisectors defined again
    cons.set_input_value(h, Payload::line(1.0, 0.0, 0.0)).unwrap();
    assert!(outs.iter().all(|o| cons.object_state(*o).unwrap().0));
}

#[test]
fn function_conic_intersection_follows_edits() {
    let mut cons = Construction::new();
    let f = cons.create_object(Payload::Function(Function::new(Expr::poly(&[-1.0, 0.0, 1.0]), -10.0, 10.0)));
    let c = cons.create_object(Payload::Conic(Conic::x_axis()));
    let algo = cons
        .create_algorithm(AlgoKind::IntersectFunctionConic { slots: 0 }, &[f, c])
        .unwrap();
    let outs = cons.algorithm(algo).unwrap().outputs.clone();
    assert_eq!(outs.len(), 4);
    let xs: Vec<Vector2<f64>> = outs
        .iter()
        .filter_map(|o| cons.store().value(*o).and_then(|p| p.as_xy()))
        .collect();
    assert_eq!(xs.len(), 2);
    assert!((xs[0].x + 1.0).abs() < 1e-12 && (xs[1].x - 1.0).abs() < 1e-12);

    // x² - 4: same slots, new roots
    cons.set_input_value(f, Payload::Function(Function::new(Expr::poly(&[-4.0, 0.0, 1.0]), -10.0, 10.0)))
        .unwrap();
    let p0 = cons.store().value(outs[0]).and_then(|p| p.as_xy()).unwrap();
    assert!((p0.x + 2.0).abs() < 1e-12);
}

/// Slot-0 direction of the bisector of the x-axis and a line through the
/// origin at angle `theta`, for each step of a sweep.
fn sweep_slot0(continuous: bool, steps: usize) -> Vec<Option<Vector2<f64>>> {
    let mut cons = Construction::new();
    cons.set_continuous_mode(continuous);
    let g = cons.create_object(Payload::line(0.0, 1.0, 0.0));
    let h = cons.create_object(Payload::line(0.0, 1.0, 0.0));
    let bis = cons.create_algorithm(AlgoKind::AngularBisector, &[g, h]).unwrap();
    let out = cons.algorithm(bis).unwrap().outputs[0];
    (1..steps)
        .map(|k| {
            let theta = 2.0 * PI * k as f64 / steps as f64;
            cons.set_input_value(h, Payload::line(-theta.sin(), theta.cos(), 0.0))
                .unwrap();
            let (defined, p) = cons.object_state(out).unwrap();
            defined.then(|| direction(p.as_line().unwrap()))
        })
        .collect()
}

fn flips(dirs: &[Option<Vector2<f64>>]) -> usize {
    let defined: Vec<Vector2<f64>> = dirs.iter().flatten().copied().collect();
    defined.windows(2).filter(|w| w[0].dot(&w[1]) < 0.0).count()
}

#[test]
fn continuous_sweep_through_parallel_never_flips() {
    let dirs = sweep_slot0(true, 100);
    // at theta = pi the lines are parallel and slot 0 is undefined
    assert!(dirs[49].is_none());
    assert_eq!(dirs.iter().filter(|d| d.is_none()).count(), 1);
    assert_eq!(flips(&dirs), 0);

    let dirs = sweep_slot0(false, 100);
    assert!(flips(&dirs) >= 1);
}

/// Slide a unit circle along the x-axis under `y = 0.5` restricted to
/// `[-1, 1]`; intersections enter and leave the domain on both sides.
fn slide_circle(continuous: bool) -> Vec<Vec<Option<Vector2<f64>>>> {
    let mut cons = Construction::new();
    cons.set_continuous_mode(continuous);
    let m = cons.create_object(Payload::point(-2.5, 0.0));
    let r = cons.create_object(Payload::number(1.0));
    let half = Expr::Sqrt(Box::new(Expr::Const(0.25)));
    let f = cons.create_object(Payload::Function(Function::new(half, -1.0, 1.0)));
    let circle = cons.create_algorithm(AlgoKind::CirclePointRadius, &[m, r]).unwrap();
    let k = cons.algorithm(circle).unwrap().outputs[0];
    let meet = cons
        .create_algorithm(AlgoKind::IntersectFunctionConic { slots: 0 }, &[f, k])
        .unwrap();
    let outs = cons.algorithm(meet).unwrap().outputs.clone();
    (0..=100)
        .map(|i| {
            let cx = -2.5 + 0.05 * i as f64;
            cons.set_input_value(m, Payload::point(cx, 0.0)).unwrap();
            outs.iter()
                .map(|&o| {
                    let (defined, p) = cons.object_state(o).unwrap();
                    if defined { p.as_xy() } else { None }
                })
                .collect()
        })
        .collect()
}

/// Largest move of any slot between consecutive steps where it is defined.
fn largest_slot_jump(frames: &[Vec<Option<Vector2<f64>>>]) -> f64 {
    frames
        .windows(2)
        .flat_map(|w| w[0].iter().zip(&w[1]))
        .filter_map(|(a, b)| Some((a.as_ref()? - b.as_ref()?).norm()))
        .fold(0.0, f64::max)
}

#[test]
fn continuous_intersections_keep_their_slots_as_roots_come_and_go() {
    let frames = slide_circle(true);
    let counts: Vec<usize> = frames.iter().map(|f| f.iter().flatten().count()).collect();
    assert_eq!(counts[0], 0);
    assert!(counts.contains(&1) && counts.contains(&2), "{counts:?}");
    assert_eq!(*counts.last().unwrap(), 0);
    // each defined slot only follows the circle
    assert!(largest_slot_jump(&frames) < 0.05 + 1e-9);
    for p in frames.iter().flatten().flatten() {
        assert!((p.y - 0.5).abs() < 1e-12 && p.x.abs() <= 1.0);
    }

    // canonical order swaps the surviving point into slot 0
    assert!(largest_slot_jump(&slide_circle(false)) > 1.0);
}

#[test]
fn quiet_scope_suppresses_listeners_and_restores() {
    let mut cons = Construction::new();
    let rec = Recorder::default();
    cons.add_listener(Box::new(rec.clone()));
    let (a, _, _, l) = two_points_and_line(&mut cons);
    let seen = rec.0.borrow().len();
    assert!(seen >= 1);

    {
        let mut quiet = cons.scoped(Mode::Quiet, true);
        assert!(quiet.ctx().quiet);
        quiet.set_input_value(a, Payload::point(-1.0, 0.0)).unwrap();
        {
            let inner = quiet.scoped(Mode::Quiet, false);
            assert!(!inner.ctx().quiet);
        }
        assert!(quiet.ctx().quiet);
    }
    assert!(!cons.ctx().quiet);
    assert_eq!(rec.0.borrow().len(), seen);
    // the values were still recomputed
    let line = *cons.object_state(l).unwrap().1.as_line().unwrap();
    assert!(same_line(&line, &vector![1.0, -2.0, 1.0], 1e-12));

    cons.set_input_value(a, Payload::point(0.0, 0.0)).unwrap();
    let log = rec.0.borrow();
    assert_eq!(log.len(), seen + 1);
    assert_eq!(log.last().unwrap(), &vec![a, l]);
}

#[test]
fn mode_scope_restores_on_unwind() {
    let mut cons = Construction::new();
    let r = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let _cont = cons.scoped(Mode::Continuous, true);
        panic!("abort mid-update");
    }));
    assert!(r.is_err());
    assert!(!cons.ctx().continuous);
}

#[test]
fn recompute_touches_only_the_dependent_closure() {
    let mut cons = Construction::new();
    let (a, _, _, l) = two_points_and_line(&mut cons);
    let c = cons.create_object(Payload::point(3.0, 0.0));
    let r = cons.create_object(Payload::number(1.0));
    let circle = cons.create_algorithm(AlgoKind::CirclePointRadius, &[c, r]).unwrap();
    let k = cons.algorithm(circle).unwrap().outputs[0];

    let touched = cons.recompute(&BTreeSet::from([a]));
    assert_eq!(touched, vec![a, l]);
    let touched = cons.recompute_all();
    assert_eq!(touched.len(), 2);
    assert!(touched.contains(&l) && touched.contains(&k));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn random_constructions_stay_topologically_ordered(seed in any::<u64>(), steps in 1usize..30) {
        let mut cons = Construction::new();
        let cfg = RandomCfg { free_points: 5, steps, extent: 4.0 };
        populate(&mut cons, cfg, ReplayToken::new(seed, 0)).unwrap();
        let order = cons.topo_order().to_vec();
        let live: BTreeSet<AlgoId> = cons.store().algorithms().map(|a| a.id).collect();
        prop_assert_eq!(order.len(), live.len());
        prop_assert_eq!(order.iter().copied().collect::<BTreeSet<_>>(), live);
        prop_assert!(respects_producers(&cons, &order));
    }

    #[test]
    fn replay_is_deterministic(seed in any::<u64>(), continuous in any::<bool>()) {
        let build = || {
            let mut cons = Construction::new();
            cons.set_continuous_mode(continuous);
            populate(&mut cons, RandomCfg::default(), ReplayToken::new(seed, 0)).unwrap();
            for i in 1..4 {
                drag_free_points(&mut cons, 0.3, ReplayToken::new(seed, i)).unwrap();
            }
            snapshot(&cons)
        };
        prop_assert_eq!(build(), build());
    }
}
