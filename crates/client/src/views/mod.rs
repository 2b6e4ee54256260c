//! Routed pages.

pub mod dashboard;
pub mod login;
pub mod register;
pub mod shell;

pub use dashboard::Dashboard;
pub use login::Login;
pub use register::Register;
pub use shell::Shell;
