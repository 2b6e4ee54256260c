//! Application routing configuration.

use dioxus::prelude::*;

use crate::views::{Dashboard, Login, Register, Shell};

#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[route("/login")]
    Login {},
    #[route("/register")]
    Register {},

    #[layout(Shell)]
        #[route("/")]
        Dashboard {},
}
