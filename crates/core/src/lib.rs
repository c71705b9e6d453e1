//! Haar-cascade face detection for still images.
//!
//! Layers follow a domain / infrastructure split: `domain` modules hold the
//! traits and value types, `infrastructure` modules implement them on top of
//! the `image` crate and OpenCV-format cascade files.

pub mod annotation {
    pub mod domain {
        pub mod annotation_style;
        pub mod frame_annotator;
    }
    pub mod infrastructure;
}

pub mod detection {
    pub mod domain {
        pub mod detection_params;
        pub mod detector_loader;
        pub mod face_detector;
        pub mod region_grouper;
    }
    pub mod infrastructure;
}

pub mod imaging {
    pub mod domain {
        pub mod image_reader;
        pub mod image_writer;
    }
    pub mod infrastructure;
}

pub mod pipeline {
    pub mod annotate_faces_use_case;
    pub mod image_width;
}

pub mod shared {
    pub mod cascade_resolver;
    pub mod constants;
    pub mod frame;
    pub mod region;
}

#[cfg(test)]
pub(crate) mod test_support;
