pub mod dates;
mod reviews;
mod score;
mod submissions;

pub use reviews::*;
pub use score::*;
pub use submissions::*;
