//! ghost-rec - always-on black box audio recorder
//!
//! This crate keeps a rolling window of recent audio in memory, stamps an
//! alignment marker into the stream on request, and exports the slice of
//! history around that marker to a WAV file after the fact.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Ring buffers, the marker pattern, value objects, and errors
//! - **Application**: The recorder use case and port interfaces (traits)
//! - **Infrastructure**: Adapter implementations (cpal, OSC over UDP, hound, XDG config)
//! - **CLI**: Command-line interface, argument parsing, and signal handling

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
