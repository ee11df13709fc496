//! Canonical call types for actor dispatch.
//!
//! Every entry point (palette, keybinding layer, scripted hosts) builds an
//! [`ApiParams`] bag, validates it against the target [`ApiMethod`] and gets
//! back exactly one [`ApiResult`] shape regardless of which component served
//! the call.

mod params;
mod result;
mod schema;
mod table;

pub use params::ApiParams;
pub use result::{ApiError, ApiResult, ErrorKind, panic_message};
pub use schema::{ApiMethod, ApiParameter, ParamType};
pub use table::MethodTable;
