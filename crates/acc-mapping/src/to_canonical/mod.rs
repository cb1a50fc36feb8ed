// SPDX-License-Identifier: MIT OR Apache-2.0
//! The three to-canonical mappers (spec §4.2): one per source format,
//! each walking a scan result into a [`acc_ir::CanonicalScanResult`].

pub mod claude_code;
pub mod cursor;
pub mod opencode;
mod shared;
