pub mod capture;
pub mod recording;
pub mod shared;
pub mod video;
