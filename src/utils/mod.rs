pub mod date;
pub mod minify;
