pub mod clock;
pub mod keys;
pub mod token;

pub use clock::{Clock, ManualClock, SystemClock};
pub use keys::{generate_api_key, generate_api_secret};
pub use token::{RandomTokenGenerator, SequenceTokenGenerator, TokenGenerator};
