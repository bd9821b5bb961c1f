pub mod html;
pub mod pretty;
