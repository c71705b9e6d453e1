pub mod cascade_parser;
pub mod gray_image;
pub mod haar_cascade;
pub mod haar_cascade_detector;
pub mod haar_cascade_loader;
pub mod integral_image;
