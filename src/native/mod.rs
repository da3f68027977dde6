/*!
 * Native Boundary
 * Simulated native library and the reference resource wrapper over it
 */

mod context;
mod library;

pub use context::EchoContext;
pub use library::EchoLib;
