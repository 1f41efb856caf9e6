pub mod analysis;
pub mod decode;
pub mod spectrum;
pub mod tempo;
pub mod timeline;
