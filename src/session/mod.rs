mod controller;
mod scope;
mod state;
mod tasks;

pub use controller::SessionController;
pub use state::{SessionState, SessionView};
