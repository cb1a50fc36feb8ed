//! Auxiliary converters and to-canonical mappers for the agent config
//! converter: the algorithms each scanner's output and each emitter's
//! input pass through, factored out because more than one of them
//! shares each algorithm (spec §3, §4.2, §4.5-§4.8).
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod agent_inference;
pub mod hooks;
pub mod mcp;
pub mod model_id;
pub mod permissions;
pub mod to_canonical;
