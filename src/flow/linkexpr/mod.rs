// SPDX-License-Identifier: MIT

//! Link expressions
//!
//! Expression links are written against run-scope attributes with a
//! short reference syntax (`$status`, `$order.total`, `$order["total"]`,
//! `$[node.out]`). At load time each expression is translated into engine
//! form and compiled into a [`LinkExprRegistry`]; at run time the
//! [`LinkGate`] resolves the referenced attributes and evaluates the
//! compiled expression to decide whether the link fires.
//!
//! ```
//! use linkexpr_rs::flow::linkexpr::translate;
//!
//! let t = translate("$order.total > 10 && $status == 'open'");
//! assert_eq!(t.attributes, vec!["order.total", "status"]);
//! assert_eq!(
//!     t.rewritten,
//!     r#"lookup("order.total") > 10 && lookup("status") == 'open'"#
//! );
//! ```

mod gate;
mod registry;
mod resolver;
mod translate;

pub use gate::LinkGate;
pub use registry::{compile_link, LinkExprEntry, LinkExprRegistry};
pub use resolver::{resolve, split_path, try_resolve};
pub use translate::{lookup_form, translate, Translation};
