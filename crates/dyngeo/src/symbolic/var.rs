use std::fmt;

/// Symbolic variable, identified by allocation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Var(pub u32);

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Allocator for fresh variables. Ids start at 1 and are never reused.
#[derive(Clone, Debug, Default)]
pub struct VarPool {
    issued: u32,
}

impl VarPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fresh(&mut self) -> Var {
        self.issued += 1;
        Var(self.issued)
    }

    /// Two fresh variables, e.g. the coordinates of a point.
    pub fn fresh_pair(&mut self) -> [Var; 2] {
        [self.fresh(), self.fresh()]
    }

    pub fn issued(&self) -> u32 {
        self.issued
    }
}
