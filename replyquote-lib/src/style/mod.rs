pub mod body_selector;
pub mod owned_css;
