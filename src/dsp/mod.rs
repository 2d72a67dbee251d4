pub mod bilinear;
pub mod channel_state;
pub mod coefficients;
pub mod realization;
pub mod sample;
pub mod smoother;
pub mod utils;

pub use bilinear::{BiLinearFilter, ProcessSetup};
pub use channel_state::ChannelState;
pub use coefficients::Coefficients;
pub use sample::SampleType;
pub use smoother::{RampKind, SmoothedValue};
