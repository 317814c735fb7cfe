pub mod abort;
pub mod config;
pub mod geo;
pub mod pipeline;
pub mod resample;
pub mod track;
