/*
    Copyright (C) 2020-2022  Rafal Michalski

    This file is part of ZXSTATE, a Rust library for ZX Spectrum machine state.

    For the full copyright notice, see the lib.rs file.
*/
//! A gate suspending asynchronous input sampling.
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use log::trace;

/// A cloneable handle shared between the machine and the input sampling thread.
///
/// Input sampling should be suspended while [InputGate::is_paused] returns `true`.
#[derive(Clone, Debug, Default)]
pub struct InputGate {
    pauses: Arc<AtomicUsize>
}

/// Keeps the input sampling paused until dropped.
#[derive(Debug)]
#[must_use = "input sampling resumes as soon as the guard is dropped"]
pub struct PauseGuard {
    pauses: Arc<AtomicUsize>
}

impl InputGate {
    pub fn new() -> Self {
        InputGate::default()
    }
    /// Pauses input sampling for the lifetime of the returned guard.
    pub fn pause(&self) -> PauseGuard {
        let prev = self.pauses.fetch_add(1, Ordering::AcqRel);
        trace!("input sampling paused: {}", prev + 1);
        PauseGuard { pauses: Arc::clone(&self.pauses) }
    }
    /// Returns `true` while any [PauseGuard] is alive.
    pub fn is_paused(&self) -> bool {
        self.pauses.load(Ordering::Acquire) != 0
    }
}

impl Drop for PauseGuard {
    fn drop(&mut self) {
        let prev = self.pauses.fetch_sub(1, Ordering::AcqRel);
        trace!("input sampling resumed: {}", prev - 1);
    }
}
