mod gemini;
mod judgment;

pub use gemini::*;
pub use judgment::*;

#[cfg(test)]
pub(crate) use gemini::tests as fixtures;
