mod challenge;
pub use challenge::{AuthRequest, Challenge, Field, LoginOutcome};

mod handshake;
