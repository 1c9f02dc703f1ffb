use super::*;

fn vars(n: usize) -> (VarPool, Vec<Var>) {
    let mut pool = VarPool::new();
    let vs = (0..n).map(|_| pool.fresh()).collect();
    (pool, vs)
}

#[test]
fn arithmetic_cancels_to_zero() {
    let (_, v) = vars(2);
    let x = Polynomial::var(v[0]);
    let y = Polynomial::var(v[1]);
    // (x+y)² - x² - 2xy - y² = 0
    let lhs = (&x + &y).sqr();
    let rhs = &(&x.sqr() + &(&Polynomial::constant(2) * &(&x * &y))) + &y.sqr();
    assert!((lhs - rhs).is_zero());
    assert!((&x - &x).is_zero());
    assert_eq!(-(-x.clone()), x);
}

#[test]
fn display_is_deterministic() {
    let (_, v) = vars(2);
    let x = Polynomial::var(v[0]);
    let y = Polynomial::var(v[1]);
    let p = &(&Polynomial::constant(3) * &x.sqr()) - &(&y - &Polynomial::constant(1));
    assert_eq!(p.to_string(), "3*v1^2 - v2 + 1");
    assert_eq!(Polynomial::zero().to_string(), "0");
    assert_eq!(p.degree(), 2);
    assert_eq!(p.vars(), vec![v[0], v[1]]);
}

#[test]
fn collinear_vanishes_on_a_line() {
    let (_, v) = vars(6);
    let p = Polynomial::collinear(v[0], v[1], v[2], v[3], v[4], v[5]);
    // (0,0), (1,1), (3,3) collinear
    let on = [0.0, 0.0, 1.0, 1.0, 3.0, 3.0];
    let val = p.eval(|x| on.get(x.0 as usize - 1).copied()).unwrap();
    assert_eq!(val, 0.0);
    // (0,0), (1,0), (0,1): twice the signed area
    let off = [0.0, 0.0, 1.0, 0.0, 0.0, 1.0];
    let val = p.eval(|x| off.get(x.0 as usize - 1).copied()).unwrap();
    assert_eq!(val.abs(), 1.0);
    assert!(p.eval(|_| None).is_none());
}

#[test]
fn pool_never_reuses_ids() {
    let mut pool = VarPool::new();
    let [a, b] = pool.fresh_pair();
    let c = pool.fresh();
    assert!(a < b && b < c);
    assert_eq!(pool.issued(), 3);
}
