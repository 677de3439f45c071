pub mod codec;
pub mod dump;
pub mod errors;
pub mod mapping;
pub mod sanitize;
