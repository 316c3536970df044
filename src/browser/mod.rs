pub mod capabilities;
pub mod driver;
pub mod error;
pub mod webdriver;
