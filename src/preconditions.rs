// Copyright (c) Sienna Satterwhite, CesiumDB Contributors
// SPDX-License-Identifier: GPL-3.0-only WITH Classpath-exception-2.0

//! Argument and index validation shared by the collections in this crate.
//!
//! Every check returns a [`SkipListError`] instead of panicking, so callers can
//! reject bad input before touching any structure.

use std::fmt::{
    Display,
    Write,
};

use crate::errs::SkipListError;

/// Substitute each `%s` in `template` with the next argument. Arguments left
/// over once the placeholders run out are appended in square brackets, and
/// placeholders left over once the arguments run out are kept verbatim.
pub fn format_template(template: &str, args: &[&dyn Display]) -> String {
    let mut out = String::with_capacity(template.len() + 16 * args.len());
    let mut args = args.iter();
    let mut rest = template;

    while let Some(pos) = rest.find("%s") {
        match args.next() {
            | Some(arg) => {
                out.push_str(&rest[..pos]);
                let _ = write!(out, "{}", arg);
                rest = &rest[pos + 2..];
            },
            | None => break,
        }
    }
    out.push_str(rest);

    let mut extra = args.peekable();
    if extra.peek().is_some() {
        out.push_str(" [");
        let mut first = true;
        for arg in extra {
            if !first {
                out.push_str(", ");
            }
            first = false;
            let _ = write!(out, "{}", arg);
        }
        out.push(']');
    }

    out
}

/// Ensure a caller-provided condition holds.
pub fn check_argument(
    condition: bool,
    template: &str,
    args: &[&dyn Display],
) -> Result<(), SkipListError> {
    if condition {
        Ok(())
    } else {
        Err(SkipListError::InvalidArgument(format_template(template, args)))
    }
}

/// Ensure an optional argument is present, returning it unwrapped.
pub fn check_not_null<T>(
    arg: Option<T>,
    template: &str,
    args: &[&dyn Display],
) -> Result<T, SkipListError> {
    arg.ok_or_else(|| SkipListError::InvalidArgument(format_template(template, args)))
}

/// Ensure `index` addresses an existing element, i.e. `index < len`.
#[inline]
pub fn check_element_index(index: usize, len: usize) -> Result<usize, SkipListError> {
    if index < len {
        Ok(index)
    } else {
        Err(SkipListError::IndexOutOfBounds { index, len })
    }
}

/// Ensure `index` is a valid position between elements, i.e. `index <= len`.
#[inline]
pub fn check_position_index(index: usize, len: usize) -> Result<usize, SkipListError> {
    if index <= len {
        Ok(index)
    } else {
        Err(SkipListError::PositionOutOfBounds { index, len })
    }
}
