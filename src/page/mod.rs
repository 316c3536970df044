pub mod components;
pub mod element;
pub mod login_page;
pub mod settings;
pub mod wait;
