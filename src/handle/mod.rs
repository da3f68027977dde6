/*!
 * Handle Layer
 * Opaque native identifiers and the deallocation contract over them
 */

mod raw;
mod release;

pub use raw::Handle;
pub use release::Release;
