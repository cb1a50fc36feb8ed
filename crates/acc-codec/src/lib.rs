//! Parse/serialize codecs for the file formats the converter reads and
//! writes: markdown-with-YAML-frontmatter, JSONC, and JSONL (spec §6.2).
#![deny(unsafe_code)]
#![warn(missing_docs)]

mod frontmatter;
mod jsonc;
mod jsonl;

pub use frontmatter::{extract_body, parse_frontmatter, serialize_frontmatter, FrontmatterDoc};
pub use jsonc::{parse_jsonc, parse_jsonc_lenient};
pub use jsonl::{parse_jsonl, serialize_jsonl};
