//! Evaluation context threaded into every `compute` call.
//!
//! Replaces session-wide flags: the graph owns one `EvalCtx` and hands a copy
//! to each algorithm. Sub-computations that need a different mode derive a
//! modified copy, so there is nothing to restore on their side. Toggles on the
//! graph itself go through [`ModeScope`], which restores the prior value on
//! drop.

use std::ops::{Deref, DerefMut};

use crate::graph::Construction;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EvalCtx {
    /// Pick the branch nearest to the previous state for multi-valued outputs.
    pub continuous: bool,
    /// Suppress update notifications and per-step logging.
    pub quiet: bool,
}

impl EvalCtx {
    #[inline]
    pub fn quieted(self) -> Self {
        Self {
            quiet: true,
            ..self
        }
    }

    #[inline]
    pub fn get(&self, mode: Mode) -> bool {
        match mode {
            Mode::Continuous => self.continuous,
            Mode::Quiet => self.quiet,
        }
    }

    #[inline]
    pub fn set(&mut self, mode: Mode, on: bool) {
        match mode {
            Mode::Continuous => self.continuous = on,
            Mode::Quiet => self.quiet = on,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Continuous,
    Quiet,
}

/// Mutable borrow of a construction with one mode temporarily overridden.
///
/// Derefs to the construction; the previous mode value comes back when the
/// scope is dropped, including on early return and unwinding.
pub struct ModeScope<'a> {
    cons: &'a mut Construction,
    mode: Mode,
    prior: bool,
}

impl<'a> ModeScope<'a> {
    pub(crate) fn new(cons: &'a mut Construction, mode: Mode, on: bool) -> Self {
        let prior = cons.ctx().get(mode);
        cons.ctx_mut().set(mode, on);
        Self { cons, mode, prior }
    }
}

impl Deref for ModeScope<'_> {
    type Target = Construction;
    fn deref(&self) -> &Construction {
        self.cons
    }
}

impl DerefMut for ModeScope<'_> {
    fn deref_mut(&mut self) -> &mut Construction {
        self.cons
    }
}

impl Drop for ModeScope<'_> {
    fn drop(&mut self) {
        self.cons.ctx_mut().set(self.mode, self.prior);
    }
}
