//! Pipeline stages for archive-to-PDF conversion.
//!
//! Each submodule implements exactly one step and is testable on its own.
//! Only [`crate::convert`] strings them together, and only it logs.
//!
//! ## Data Flow
//!
//! ```text
//! classify ──▶ extract ──▶ walk (+ validate) ──▶ order ──▶ assemble
//! (name)       (zip/rar)   (scratch dir)         (sort)    (lopdf)
//! ```
//!
//! 1. [`classify`] — archive family / image pre-filter from the name suffix
//! 2. [`extract`]  — unpack into the per-archive scratch directory
//! 3. [`walk`]     — recursive discovery of candidate images (and archives)
//! 4. [`validate`] — decode, size check, flatten alpha, expand palettes
//! 5. [`order`]    — deterministic page order
//! 6. [`assemble`] — one PDF page per image

pub mod assemble;
pub mod classify;
pub mod extract;
pub mod order;
pub mod validate;
pub mod walk;
