pub mod audio;
pub mod shared;
pub mod story;
