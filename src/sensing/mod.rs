pub mod loop_worker;
pub mod simulators;

pub use loop_worker::{ticker_loop, TickFlow};
pub use simulators::PulseWaveform;
