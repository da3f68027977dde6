/*!
 * Resource Module
 * The owning lifecycle state machine and its backup finalizer
 */

mod finalizer;
mod managed;

pub use managed::Managed;
