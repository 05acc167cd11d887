mod continuation;
pub use continuation::Continuation;

mod session;
pub(crate) use session::AuthState;
pub use session::{Request, Session};

mod transport;

pub mod model;
pub use model::{Attachment, Auth, ContinueToken, Document, Method};
