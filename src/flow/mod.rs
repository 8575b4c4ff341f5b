// SPDX-License-Identifier: MIT

pub mod definition;
pub mod diagnostics;
pub mod linkexpr;
pub mod scope;
pub mod walker;

pub use diagnostics::{Diagnostics, MemorySink};
pub use walker::walk;
