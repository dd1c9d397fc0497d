//! Resolution strategies used by [`Container`](crate::Container)
//!
//! * [`constructor`] picks and invokes a constructor, resolving its parameters
//! * [`collection`] resolves every binding of a collection element type
//! * [`generic`] serves parameterized requests from open generic bindings

pub mod collection;
pub mod constructor;
pub mod generic;
