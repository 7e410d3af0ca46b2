// Copyright (c) Sienna Satterwhite, CesiumDB Contributors
// SPDX-License-Identifier: GPL-3.0-only WITH Classpath-exception-2.0

use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SkipListError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: usize, len: usize },
    #[error("position {index} out of bounds for length {len}")]
    PositionOutOfBounds { index: usize, len: usize },
    #[error("list was modified during iteration (expected mod count {expected}, found {found})")]
    ConcurrentModification { expected: u64, found: u64 },
    #[error("no such element")]
    NoSuchElement,
    #[error("os i/o error")]
    Io(#[from] io::Error),
    #[error("corrupted stream: {0}")]
    Corrupted(String),
    #[error("stream has wrong checksum. found: {found} computed: {expected}")]
    ChecksumMismatch { expected: u32, found: u32 },
}
