#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Sampling and presentation logic (hardware-agnostic).
//!
//! Everything here talks to a scale through `scale_traits::WeightSource`;
//! which source (live serial or simulated) is chosen once, at startup.
//!
//! ## Architecture
//!
//! - **Sampling**: fixed-interval poll loop and its background-thread form (`sampler`)
//! - **Recovery**: bounded reconnect with exponential backoff (`reconnect`)
//! - **Display**: zero-dip debouncing (`debounce`)
//! - **Payloads**: JSON reading/override shapes for request-driven clients (`payload`)

pub mod conversions;
pub mod debounce;
pub mod error;
pub mod mocks;
pub mod payload;
pub mod reconnect;
pub mod sampler;
pub mod util;

pub use debounce::ZeroDebouncer;
pub use error::{OverrideValidationError, Report, Result};
pub use payload::{OverrideResponse, WeightPayload, apply_override, parse_override};
pub use reconnect::{ReconnectPolicy, run_supervised};
pub use sampler::{LoopExit, SampleEvent, Sampler, SamplingLoop};
