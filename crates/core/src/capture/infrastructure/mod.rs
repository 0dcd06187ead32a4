pub mod image_file_frame_source;
pub mod synthetic_frame_source;
