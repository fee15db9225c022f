//! Event types and observers.
//!
//! Events decouple the systems that detect something (an overlap, a grab, a
//! save request) from the code that reacts to it.
//!
//! Submodules:
//! - [`grab`] – manual grab start/end of an entity
//! - [`loadused`] – a Load was consumed by an Injector
//! - [`scenesave`] – zone teardown and rebuild around a scene save
//! - [`trigger`] – delivery of zone and Load trigger actions to receivers
pub mod grab;
pub mod loadused;
pub mod scenesave;
pub mod trigger;
