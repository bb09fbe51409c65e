//! # imgconv
//!
//! A small image workbench: load a JPEG or PNG, then compress, rotate,
//! resize, crop, grayscale or convert it. Every step writes a file to the
//! output directory and its result becomes the input of the next step.
//!
//! # Architecture: One Session, Two Front Ends
//!
//! ```text
//! run <INPUT> -s STEP ...   ─┐
//!                            ├─► shell ─► command ─► session ─► imaging
//! shell [INPUT] (stdin)     ─┘                          │
//!                                                       └─► processed_images/
//! ```
//!
//! The [`session`] owns all state: the uploaded image, the current image,
//! the selector choosing between them, and the ledger of written artifacts.
//! Front ends only parse text into commands and print results.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`session`] | Transform pipeline controller: current/original images, selector, artifacts, downloads |
//! | [`imaging`] | Pure-Rust pixel work behind the `ImageBackend` trait, plus parameter types and validation |
//! | [`naming`] | Upload name parsing and fixed artifact file names |
//! | [`command`] | One text line → one typed [`command::Command`], parsed with clap |
//! | [`shell`] | Executes commands: script mode (stop at first failure) and interactive mode |
//! | [`config`] | `imgconv.toml` loading, merging over stock defaults, validation |
//! | [`output`] | CLI output formatting for loads, results, status and history |
//!
//! # Design Decisions
//!
//! ## All-or-Nothing Transforms
//!
//! A transform validates its parameters against the image it will read,
//! renders in memory, writes the artifact, and only then replaces the
//! current image. Any failure along the way returns an error and leaves the
//! session exactly as it was.
//!
//! ## Predictable Artifact Names
//!
//! Names derive from the upload name and the transform kind
//! (`resized_photo.jpg`, `photo.png`, ...), never from a counter. Repeating a
//! transform overwrites its previous file, so the output directory holds at
//! most one file per transform kind and target format.
//!
//! ## Fixed-Canvas Rotation
//!
//! Rotation keeps the source dimensions and fills uncovered corners with
//! zero, matching what users of the interactive tool saw. See
//! [`imaging::rotation`].

pub mod command;
pub mod config;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod session;
pub mod shell;

#[cfg(test)]
pub(crate) mod test_helpers;
