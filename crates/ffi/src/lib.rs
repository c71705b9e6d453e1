//! C ABI for face annotation and image width queries.
//!
//! Every entry point takes NUL-terminated UTF-8 paths and reports failure
//! through a sentinel return value. Errors are logged through the `log`
//! facade; this library never installs a logger itself. Panics are caught
//! before they reach the caller.

#![allow(clippy::missing_safety_doc)]

use std::ffi::{c_char, c_int, CStr};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;

use facemark_core::annotation::domain::annotation_style::AnnotationStyle;
use facemark_core::detection::domain::detection_params::DetectionParams;
use facemark_core::imaging::infrastructure::image_file_reader::ImageFileReader;
use facemark_core::pipeline::annotate_faces_use_case::AnnotateFacesUseCase;
use facemark_core::pipeline::image_width::image_width;

/// `face_detect` return value when the annotated image was written.
pub const FACE_DETECT_OK: c_int = 1;
/// `face_detect` return value for any failure.
pub const FACE_DETECT_FAILED: c_int = 0;
/// `get_image_width` return value for any failure.
pub const IMAGE_WIDTH_FAILED: c_int = -1;

/// Borrows a C string as a path; `None` for NULL or non-UTF-8 input.
unsafe fn path_arg<'a>(ptr: *const c_char) -> Option<&'a Path> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(Path::new)
}

fn guarded(name: &str, failure: c_int, f: impl FnOnce() -> c_int) -> c_int {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(code) => code,
        Err(_) => {
            log::error!("{name}: panic caught at the C boundary");
            failure
        }
    }
}

/// Detects faces in `image_path` with the cascade at `cascade_path`, draws a
/// red outline around each one and writes the result to `out_path`.
///
/// The output format follows the extension of `out_path`. An image with no
/// faces is written back unchanged.
///
/// @return 1 when the output file was written, 0 otherwise (unreadable
/// image, unloadable cascade, unwritable output, NULL or non-UTF-8 path).
#[no_mangle]
pub unsafe extern "C" fn face_detect(
    image_path: *const c_char,
    cascade_path: *const c_char,
    out_path: *const c_char,
) -> c_int {
    let (Some(image), Some(cascade), Some(output)) = (
        path_arg(image_path),
        path_arg(cascade_path),
        path_arg(out_path),
    ) else {
        log::warn!("face_detect: NULL or non-UTF-8 path argument");
        return FACE_DETECT_FAILED;
    };

    guarded("face_detect", FACE_DETECT_FAILED, || {
        let use_case = AnnotateFacesUseCase::with_defaults(
            DetectionParams::default(),
            AnnotationStyle::default(),
        );
        match use_case.execute(image, cascade, output) {
            Ok(_) => FACE_DETECT_OK,
            Err(e) => {
                log::warn!("face_detect: {e}");
                FACE_DETECT_FAILED
            }
        }
    })
}

/// Decodes the image at `path` and returns its width in pixels.
///
/// @return the width, or -1 when the image cannot be decoded, the path is
/// NULL or non-UTF-8, or the width does not fit in an `int`.
#[no_mangle]
pub unsafe extern "C" fn get_image_width(path: *const c_char) -> c_int {
    let Some(path) = path_arg(path) else {
        log::warn!("get_image_width: NULL or non-UTF-8 path argument");
        return IMAGE_WIDTH_FAILED;
    };

    guarded("get_image_width", IMAGE_WIDTH_FAILED, || {
        match image_width(&ImageFileReader::new(), path) {
            Ok(width) => c_int::try_from(width).unwrap_or_else(|_| {
                log::warn!("get_image_width: width {width} overflows a C int");
                IMAGE_WIDTH_FAILED
            }),
            Err(e) => {
                log::warn!("get_image_width: {}: {e}", path.display());
                IMAGE_WIDTH_FAILED
            }
        }
    })
}
