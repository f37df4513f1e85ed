//! Workload generation and key/value rendering.

use std::fmt::Write;

use rand::seq::SliceRandom;

use crate::config::KEY_WIDTH;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ordering {
    Sequential,
    Random,
}

impl Ordering {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Sequential => "seq",
            Self::Random => "ran",
        }
    }
}

/// Ids `0..num` in the requested order.
///
/// Random order is a uniform permutation drawn from the thread-local RNG;
/// there is no seed, so two runs never share an order.
pub fn workload(num: usize, ordering: Ordering) -> Vec<usize> {
    let mut ids: Vec<usize> = (0..num).collect();
    if ordering == Ordering::Random {
        ids.shuffle(&mut rand::rng());
    }
    ids
}

/// Render `id` as a [`KEY_WIDTH`]-wide, zero-padded key into `buf`.
#[inline]
pub fn write_key(buf: &mut String, id: usize) {
    buf.clear();
    let _ = write!(buf, "{:0width$}", id, width = KEY_WIDTH);
}

/// Render `id` as a `width`-wide, zero-padded value into `buf`.
#[inline]
pub fn write_value(buf: &mut String, id: usize, width: usize) {
    buf.clear();
    let _ = write!(buf, "{:0width$}", id, width = width);
}

pub fn key(id: usize) -> String {
    let mut buf = String::with_capacity(KEY_WIDTH);
    write_key(&mut buf, id);
    buf
}

pub fn value(id: usize, width: usize) -> String {
    let mut buf = String::with_capacity(width);
    write_value(&mut buf, id, width);
    buf
}
